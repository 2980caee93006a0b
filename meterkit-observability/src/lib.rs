//! Metrics façade for meterkit.
//!
//! A [`MetricsFacade`] owns one prometheus [`Registry`](prometheus::Registry),
//! an index from short metric names to typed metrics, and the lifecycle of the
//! default process/runtime collector.

pub mod collector;
pub mod error;
pub mod exposition;
pub mod facade;
pub mod logging;
pub mod metric;

pub use error::FacadeError;
pub use facade::MetricsFacade;
pub use logging::Logger;
pub use metric::{Metric, MetricKind, Update};
