use prometheus::core::Collector;
use prometheus::{Counter, Gauge, Histogram};
use std::fmt;

/// Variant of a registered metric, fixed at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`crate::MetricsFacade::update_metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The value was applied to a metric of this kind.
    Applied(MetricKind),
    /// No metric is registered under the name.
    Unknown,
    /// The value cannot be applied (a negative or NaN counter increment).
    Rejected(MetricKind),
}

/// A registered metric. Handles are cheap clones sharing atomic state with
/// the copy held by the registry.
#[derive(Clone)]
pub enum Metric {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::Histogram(_) => MetricKind::Histogram,
        }
    }

    /// Counters add, gauges replace, histograms observe.
    pub fn apply(&self, value: f64) -> Update {
        let kind = self.kind();
        match self {
            Metric::Counter(c) => {
                // prometheus asserts on negative increments
                if value.is_nan() || value < 0.0 {
                    return Update::Rejected(kind);
                }
                c.inc_by(value);
            }
            Metric::Gauge(g) => g.set(value),
            Metric::Histogram(h) => h.observe(value),
        }
        Update::Applied(kind)
    }

    pub(crate) fn boxed_collector(&self) -> Box<dyn Collector> {
        match self {
            Metric::Counter(c) => Box::new(c.clone()),
            Metric::Gauge(g) => Box::new(g.clone()),
            Metric::Histogram(h) => Box::new(h.clone()),
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match self {
            Metric::Counter(c) => c.desc(),
            Metric::Gauge(g) => g.desc(),
            Metric::Histogram(h) => h.desc(),
        };
        let name = desc.first().map(|d| d.fq_name.as_str()).unwrap_or("");
        f.debug_struct("Metric")
            .field("kind", &self.kind())
            .field("name", &name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{HistogramOpts, Opts};

    fn counter() -> Metric {
        Metric::Counter(Counter::with_opts(Opts::new("c", "a counter")).unwrap())
    }

    #[test]
    fn kind_names_are_lowercase() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
        assert_eq!(MetricKind::Histogram.to_string(), "histogram");
    }

    #[test]
    fn counter_accumulates() {
        let m = counter();
        assert_eq!(m.apply(3.0), Update::Applied(MetricKind::Counter));
        assert_eq!(m.apply(3.0), Update::Applied(MetricKind::Counter));
        let Metric::Counter(c) = &m else { unreachable!() };
        assert_eq!(c.get(), 6.0);
    }

    #[test]
    fn counter_rejects_negative_and_nan() {
        let m = counter();
        assert_eq!(m.apply(-1.0), Update::Rejected(MetricKind::Counter));
        assert_eq!(m.apply(f64::NAN), Update::Rejected(MetricKind::Counter));
        let Metric::Counter(c) = &m else { unreachable!() };
        assert_eq!(c.get(), 0.0);
    }

    #[test]
    fn gauge_last_write_wins() {
        let m = Metric::Gauge(Gauge::with_opts(Opts::new("g", "a gauge")).unwrap());
        m.apply(5.0);
        m.apply(-2.5);
        let Metric::Gauge(g) = &m else { unreachable!() };
        assert_eq!(g.get(), -2.5);
    }

    #[test]
    fn gauge_accepts_nan() {
        let m = Metric::Gauge(Gauge::with_opts(Opts::new("g", "a gauge")).unwrap());
        m.apply(5.0);
        assert_eq!(m.apply(f64::NAN), Update::Applied(MetricKind::Gauge));
        let Metric::Gauge(g) = &m else { unreachable!() };
        assert!(g.get().is_nan());
    }

    #[test]
    fn histogram_accepts_nan() {
        let h = Histogram::with_opts(HistogramOpts::new("h", "a histogram").buckets(vec![1.0])).unwrap();
        let m = Metric::Histogram(h.clone());
        assert_eq!(m.apply(f64::NAN), Update::Applied(MetricKind::Histogram));
        assert_eq!(h.get_sample_count(), 1);
    }

    #[test]
    fn histogram_observes() {
        let h = Histogram::with_opts(HistogramOpts::new("h", "a histogram").buckets(vec![1.0, 5.0]))
            .unwrap();
        let m = Metric::Histogram(h.clone());
        m.apply(0.5);
        m.apply(4.0);
        assert_eq!(h.get_sample_count(), 2);
        assert_eq!(h.get_sample_sum(), 4.5);
    }

    #[test]
    fn debug_shows_name_and_kind() {
        let out = format!("{:?}", counter());
        assert!(out.contains("Counter"));
        assert!(out.contains("\"c\""));
    }
}
