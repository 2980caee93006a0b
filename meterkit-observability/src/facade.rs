use crate::collector::{self, DefaultMetrics, RuntimeMetrics};
use crate::error::FacadeError;
use crate::exposition::{self, MetricJson};
use crate::logging::Logger;
use crate::metric::{Metric, Update};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use meterkit_core::MetricsConfig;
use prometheus::proto::MetricFamily;
use prometheus::{Counter, Gauge, Histogram, HistogramOpts, Opts, Registry};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

/// Registration and update entry point for application metrics.
///
/// One instance per process, shared as `Arc<MetricsFacade>` with every
/// request handler. All methods take `&self`.
pub struct MetricsFacade {
    registry: Registry,
    prefix: String,
    logger: Logger,
    metrics: DashMap<String, Metric>,
    /// Public names taken by the default metrics.
    reserved: HashSet<String>,
    runtime: Option<RuntimeMetrics>,
    collect_interval: Duration,
    collector: Mutex<Option<DefaultMetrics>>,
}

impl MetricsFacade {
    /// Build the registry and register the default metrics.
    ///
    /// Neither the global subscriber nor the sampler task are touched; see
    /// [`MetricsFacade::configure`] for the full startup sequence.
    pub fn new(config: &MetricsConfig) -> Result<Self, FacadeError> {
        let logger = Logger::new(&config.log_level)?;

        let labels: HashMap<String, String> = config
            .default_labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let registry = if labels.is_empty() {
            Registry::new()
        } else {
            Registry::new_custom(None, Some(labels))?
        };

        let mut reserved = HashSet::new();
        let runtime = if config.default_metrics {
            reserved.extend(collector::register_process_collector(&registry, &config.prefix)?);
            let runtime = RuntimeMetrics::new(&config.prefix)?;
            runtime.register(&registry)?;
            reserved.extend(runtime.names());
            Some(runtime)
        } else {
            None
        };

        Ok(Self {
            registry,
            prefix: config.prefix.clone(),
            logger,
            metrics: DashMap::new(),
            reserved,
            runtime,
            collect_interval: config.collect_interval(),
            collector: Mutex::new(None),
        })
    }

    /// Install the console logger, build the façade and start the default
    /// metrics sampler. Must run inside a tokio runtime when default metrics
    /// are enabled.
    pub fn configure(config: &MetricsConfig) -> Result<Self, FacadeError> {
        Logger::init(&config.log_level)?;
        let facade = Self::new(config)?;
        facade.start_default_metrics()?;
        Ok(facade)
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Registration ──────────────────────────────────────────

    pub fn register_counter(&self, name: &str, help: &str) -> Result<(), FacadeError> {
        let counter = Counter::with_opts(Opts::new(self.public_name(name)?, help))?;
        self.register(name, Metric::Counter(counter))
    }

    pub fn register_gauge(&self, name: &str, help: &str) -> Result<(), FacadeError> {
        let gauge = Gauge::with_opts(Opts::new(self.public_name(name)?, help))?;
        self.register(name, Metric::Gauge(gauge))
    }

    /// `buckets` must be strictly increasing. An empty slice selects the
    /// prometheus default buckets.
    pub fn register_histogram(&self, name: &str, help: &str, buckets: &[f64]) -> Result<(), FacadeError> {
        let buckets = if buckets.is_empty() {
            prometheus::DEFAULT_BUCKETS.to_vec()
        } else {
            buckets.to_vec()
        };
        let opts = HistogramOpts::new(self.public_name(name)?, help).buckets(buckets);
        let histogram = Histogram::with_opts(opts)?;
        self.register(name, Metric::Histogram(histogram))
    }

    fn public_name(&self, name: &str) -> Result<String, FacadeError> {
        if name.trim().is_empty() {
            return Err(FacadeError::InvalidName(name.to_string()));
        }
        let public = format!("{}{}", self.prefix, name);
        if self.reserved.contains(&public) {
            return Err(FacadeError::DuplicateMetric(name.to_string()));
        }
        Ok(public)
    }

    fn register(&self, name: &str, metric: Metric) -> Result<(), FacadeError> {
        match self.metrics.entry(name.to_string()) {
            Entry::Occupied(_) => Err(FacadeError::DuplicateMetric(name.to_string())),
            Entry::Vacant(slot) => {
                self.registry
                    .register(metric.boxed_collector())
                    .map_err(|e| match e {
                        prometheus::Error::AlreadyReg => FacadeError::DuplicateMetric(name.to_string()),
                        other => FacadeError::Prometheus(other),
                    })?;
                let kind = metric.kind();
                slot.insert(metric);
                info!("{name} {kind} registered");
                Ok(())
            }
        }
    }

    // ── Updates ───────────────────────────────────────────────

    /// Apply `value` to the metric registered as `name`.
    ///
    /// Never fails: an unknown name or an unusable value is logged as a
    /// warning and reported through the returned [`Update`].
    pub fn update_metric(&self, name: &str, value: f64) -> Update {
        let Some(metric) = self.metrics.get(name) else {
            warn!("metric '{name}' is not registered");
            return Update::Unknown;
        };
        let outcome = metric.apply(value);
        if let Update::Rejected(kind) = outcome {
            warn!("{kind} '{name}' cannot take value {value}");
        }
        outcome
    }

    /// Handle to a registered metric, mostly for inspection.
    pub fn metric(&self, name: &str) -> Option<Metric> {
        self.metrics.get(name).map(|m| m.value().clone())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    // ── Exposition ────────────────────────────────────────────

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Every registered family in text exposition format.
    pub fn gather_text(&self) -> Result<String, FacadeError> {
        exposition::render_text(&self.gather())
    }

    pub fn gather_json(&self) -> Vec<MetricJson> {
        exposition::to_json(&self.gather())
    }

    pub fn content_type(&self) -> String {
        exposition::text_content_type()
    }

    // ── Default metrics lifecycle ─────────────────────────────

    /// Start the runtime sampler. No-op when already running or when
    /// default metrics are disabled.
    pub fn start_default_metrics(&self) -> Result<(), FacadeError> {
        let Some(runtime) = &self.runtime else {
            return Ok(());
        };
        let mut slot = self.collector.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(DefaultMetrics::is_running) {
            return Ok(());
        }
        *slot = Some(DefaultMetrics::start(runtime.clone(), self.collect_interval)?);
        Ok(())
    }

    /// Stop the runtime sampler and wait for its task to finish.
    pub async fn stop_default_metrics(&self) {
        let running = self.collector.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(collector) = running {
            collector.stop().await;
        }
    }

    pub fn default_metrics_running(&self) -> bool {
        self.collector
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(DefaultMetrics::is_running)
    }
}
