use crate::error::FacadeError;
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Console logger owned by the façade.
///
/// Output goes through `tracing`; this handle records the configured minimum
/// level and installs the coloured fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    /// Parse a level name without touching global state.
    pub fn new(level: &str) -> Result<Self, FacadeError> {
        let level = LevelFilter::from_str(level)
            .map_err(|_| FacadeError::InvalidLogLevel(level.to_string()))?;
        Ok(Self { level })
    }

    /// Parse the level and install the process-wide subscriber.
    ///
    /// `RUST_LOG` takes precedence over `level`. If a subscriber is already
    /// installed it is left in place.
    pub fn init(level: &str) -> Result<Self, FacadeError> {
        let logger = Self::new(level)?;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(logger.level.to_string()));

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(true)
            .with_target(false)
            .try_init();
        if installed.is_err() {
            debug!("tracing subscriber already installed, keeping it");
        }
        Ok(logger)
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self { level: LevelFilter::INFO }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(Logger::new("debug").unwrap().level(), LevelFilter::DEBUG);
        assert_eq!(Logger::new("WARN").unwrap().level(), LevelFilter::WARN);
        assert_eq!(Logger::new("off").unwrap().level(), LevelFilter::OFF);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = Logger::new("loud").unwrap_err();
        assert!(matches!(err, FacadeError::InvalidLogLevel(l) if l == "loud"));
    }

    #[test]
    fn default_is_info() {
        assert_eq!(Logger::default().level(), LevelFilter::INFO);
    }

    #[test]
    fn init_twice_is_harmless() {
        Logger::init("info").unwrap();
        let second = Logger::init("debug").unwrap();
        assert_eq!(second.level(), LevelFilter::DEBUG);
    }
}
