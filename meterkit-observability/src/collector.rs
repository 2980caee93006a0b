//! Default process and runtime metrics.
//!
//! Two sources feed the façade registry:
//! - [`PrefixedCollector`] wraps the prometheus process collector (Linux only)
//!   and renames its families with the configured prefix at gather time.
//! - [`RuntimeMetrics`] gauges sampled by a tokio task started through
//!   [`DefaultMetrics::start`] and released by [`DefaultMetrics::stop`].

use crate::error::FacadeError;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts, Registry};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Renames every family produced by `inner` to `<prefix><name>`.
///
/// The descriptors carry the prefixed names too, so the registry's
/// uniqueness checks see the names that are actually exposed.
pub struct PrefixedCollector<C> {
    prefix: String,
    descs: Vec<Desc>,
    inner: C,
}

impl<C: Collector> PrefixedCollector<C> {
    pub fn new(prefix: impl Into<String>, inner: C) -> Result<Self, FacadeError> {
        let prefix = prefix.into();
        let descs = inner
            .desc()
            .into_iter()
            .map(|d| {
                let const_labels: HashMap<String, String> = d
                    .const_label_pairs
                    .iter()
                    .map(|l| (l.get_name().to_string(), l.get_value().to_string()))
                    .collect();
                Desc::new(
                    format!("{prefix}{}", d.fq_name),
                    d.help.clone(),
                    d.variable_labels.clone(),
                    const_labels,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { prefix, descs, inner })
    }

    /// Public names of the families this collector exposes.
    pub fn names(&self) -> Vec<String> {
        self.descs.iter().map(|d| d.fq_name.clone()).collect()
    }
}

impl<C: Collector> Collector for PrefixedCollector<C> {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.inner.collect();
        if !self.prefix.is_empty() {
            for mf in &mut families {
                let name = format!("{}{}", self.prefix, mf.get_name());
                mf.set_name(name);
            }
        }
        families
    }
}

/// Register the OS-level process collector (CPU, memory, fds, start time).
/// Returns the public family names it claims.
#[cfg(target_os = "linux")]
pub fn register_process_collector(registry: &Registry, prefix: &str) -> Result<Vec<String>, FacadeError> {
    use prometheus::process_collector::ProcessCollector;
    let collector = PrefixedCollector::new(prefix, ProcessCollector::for_self())?;
    let names = collector.names();
    registry.register(Box::new(collector))?;
    Ok(names)
}

#[cfg(not(target_os = "linux"))]
pub fn register_process_collector(_registry: &Registry, _prefix: &str) -> Result<Vec<String>, FacadeError> {
    debug!("process collector unavailable on this platform");
    Ok(Vec::new())
}

/// Gauges describing the async runtime hosting the façade.
#[derive(Clone)]
pub struct RuntimeMetrics {
    tick_lag: Gauge,
    workers: Gauge,
    alive_tasks: Gauge,
    uptime: Gauge,
    started: Instant,
}

impl RuntimeMetrics {
    pub fn new(prefix: &str) -> Result<Self, FacadeError> {
        let gauge = |name: &str, help: &str| Gauge::with_opts(Opts::new(format!("{prefix}{name}"), help));
        Ok(Self {
            tick_lag: gauge(
                "runtime_tick_lag_seconds",
                "Delay between the scheduled and actual sampler tick",
            )?,
            workers: gauge("runtime_workers", "Worker threads of the async runtime")?,
            alive_tasks: gauge("runtime_alive_tasks", "Tasks currently alive in the async runtime")?,
            uptime: gauge("process_uptime_seconds", "Seconds since the metrics façade started")?,
            started: Instant::now(),
        })
    }

    pub fn register(&self, registry: &Registry) -> Result<(), FacadeError> {
        registry.register(Box::new(self.tick_lag.clone()))?;
        registry.register(Box::new(self.workers.clone()))?;
        registry.register(Box::new(self.alive_tasks.clone()))?;
        registry.register(Box::new(self.uptime.clone()))?;
        Ok(())
    }

    /// Public names of the runtime gauges.
    pub fn names(&self) -> Vec<String> {
        [&self.tick_lag, &self.workers, &self.alive_tasks, &self.uptime]
            .into_iter()
            .flat_map(|g| g.desc())
            .map(|d| d.fq_name.clone())
            .collect()
    }

    /// Record one sample. Runtime gauges are only refreshed inside a runtime.
    pub fn sample(&self, lag: Duration) {
        self.tick_lag.set(lag.as_secs_f64());
        self.uptime.set(self.started.elapsed().as_secs_f64());
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let m = handle.metrics();
            self.workers.set(m.num_workers() as f64);
            self.alive_tasks.set(m.num_alive_tasks() as f64);
        }
    }
}

/// Running sampler task. Dropping the handle aborts the task.
pub struct DefaultMetrics {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DefaultMetrics {
    /// Spawn the sampler on the current tokio runtime.
    pub fn start(metrics: RuntimeMetrics, period: Duration) -> Result<Self, FacadeError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| FacadeError::NoRuntime)?;
        let (tx, rx) = oneshot::channel();
        let task = handle.spawn(Self::sample_loop(metrics, period, rx));
        info!(interval_secs = period.as_secs_f64(), "Default metrics collector started");
        Ok(Self { shutdown: Some(tx), task: Some(task) })
    }

    async fn sample_loop(metrics: RuntimeMetrics, period: Duration, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                scheduled = ticker.tick() => {
                    let lag = Instant::now().saturating_duration_since(scheduled.into_std());
                    metrics.sample(lag);
                }
            }
        }
        debug!("Default metrics sampler exited");
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the sampler and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("Default metrics collector stopped");
    }
}

impl Drop for DefaultMetrics {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
