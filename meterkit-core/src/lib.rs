pub mod config;
pub mod error;

pub use config::{AppConfig, MetricsConfig, ServerConfig};
pub use error::ConfigError;
