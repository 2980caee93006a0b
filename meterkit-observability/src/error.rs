use thiserror::Error;

/// Errors surfaced by façade construction and metric registration.
///
/// Updates never produce one of these; see [`crate::Update`].
#[derive(Error, Debug)]
pub enum FacadeError {
    #[error("Metric already registered: {0}")]
    DuplicateMetric(String),

    #[error("Invalid metric name: {0:?}")]
    InvalidName(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Default metrics need a running tokio runtime")]
    NoRuntime,

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}
