//! Structured logging setup.
//!
//! Logs go to stderr so that stdout only carries results. Nothing is logged
//! unless [LOG_ENV] is set.
use std::env;
use std::fmt::{Display, Formatter};
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive, e.g. `info` or `small_lp=debug`. Defaults to `off`.
pub const LOG_ENV: &str = "SMALL_LP_LOG";
/// `pretty` (default) or `json`
pub const LOG_FORMAT_ENV: &str = "SMALL_LP_LOG_FORMAT";

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line
    Pretty,
    /// One JSON object per line
    Json,
}

/// Why logging could not be set up
#[derive(Debug)]
pub enum LoggingError {
    /// The filter directive did not parse
    InvalidFilter(String),
    /// Unknown value for [LOG_FORMAT_ENV]
    InvalidFormat(String),
    /// Installing the global subscriber failed
    Init(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(e) => write!(f, "Invalid {} filter: {}", LOG_ENV, e),
            LoggingError::InvalidFormat(v) => write!(
                f,
                "Invalid {} '{}' (expected 'json' or 'pretty')",
                LOG_FORMAT_ENV, v
            ),
            LoggingError::Init(e) => write!(f, "Failed to initialize logging: {}", e),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, `off` disables logging
    pub filter: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "off".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Read [LOG_ENV] and [LOG_FORMAT_ENV]
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_values(env::var(LOG_ENV).ok(), env::var(LOG_FORMAT_ENV).ok())
    }

    fn from_values(filter: Option<String>, format: Option<String>) -> Result<Self, LoggingError> {
        let format = match format {
            None => LogFormat::Pretty,
            Some(v) if v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) => return Err(LoggingError::InvalidFormat(v)),
        };
        Ok(LogConfig {
            filter: filter.unwrap_or_else(|| "off".to_string()),
            format,
        })
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        if self.filter.eq_ignore_ascii_case("off") {
            Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
        } else {
            EnvFilter::try_new(&self.filter)
                .map_err(|err| LoggingError::InvalidFilter(err.to_string()))
        }
    }
}

/// Install a global subscriber for `config`.
///
/// Returns `false` without doing anything if a subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .json(),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .pretty(),
            )
            .try_init(),
    };
    result.map_err(|err| LoggingError::Init(err.to_string()))?;
    Ok(true)
}

/// [init] with the configuration read from the environment
pub fn init_from_env() -> Result<bool, LoggingError> {
    init(&LogConfig::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_off() {
        let config = LogConfig::from_values(None, None).unwrap();
        assert_eq!(config, LogConfig::default());
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn parses_format() {
        let config = LogConfig::from_values(Some("debug".into()), Some("JSON".into())).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "debug");
    }

    #[test]
    fn rejects_unknown_format() {
        let err = LogConfig::from_values(None, Some("xml".into())).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn rejects_bad_filter() {
        let config = LogConfig {
            filter: "small_lp=loud".to_string(),
            format: LogFormat::Pretty,
        };
        assert!(matches!(
            config.env_filter(),
            Err(LoggingError::InvalidFilter(_))
        ));
    }
}
