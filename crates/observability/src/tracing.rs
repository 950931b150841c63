//! Tracing/logging initialization.
//!
//! The filter comes from `SHOPKEEP_LOG`, falling back to `RUST_LOG`, then `info`.
//! `SHOPKEEP_LOG_FORMAT` picks between `json` (default), `pretty` and `compact`.
//! Records go to stderr unless `SHOPKEEP_LOG_TARGET=stdout`; stdout belongs to
//! the console front end.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_FILTER_VAR: &str = "SHOPKEEP_LOG";
pub const LOG_FORMAT_VAR: &str = "SHOPKEEP_LOG_FORMAT";
pub const LOG_TARGET_VAR: &str = "SHOPKEEP_LOG_TARGET";
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObservabilityError {
    #[error("unknown log format: {0:?} (expected json, pretty or compact)")]
    UnknownFormat(String),

    #[error("unknown log target: {0:?} (expected stderr or stdout)")]
    UnknownTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ObservabilityError::UnknownFormat(other.to_string())),
        }
    }
}

/// Stream the subscriber writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stderr,
    Stdout,
}

impl LogTarget {
    pub fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        }
    }
}

impl FromStr for LogTarget {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stderr" => Ok(Self::Stderr),
            "stdout" => Ok(Self::Stdout),
            other => Err(ObservabilityError::UnknownTarget(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub filter: String,
    pub format: LogFormat,
    pub target: LogTarget,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            target: LogTarget::default(),
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// An unrecognised format or target falls back to the default rather than
    /// failing startup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup(LOG_FILTER_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = lookup(LOG_FORMAT_VAR)
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();
        let target = lookup(LOG_TARGET_VAR)
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();
        Self {
            filter,
            format,
            target,
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(config.target.make_writer());

    let _ = match config.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_info_json() {
        let config = ObservabilityConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ObservabilityConfig::default());
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn shopkeep_log_wins_over_rust_log() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            ("RUST_LOG", "warn"),
            (LOG_FILTER_VAR, "shopkeep_infra=debug"),
        ]));
        assert_eq!(config.filter, "shopkeep_infra=debug");

        let config = ObservabilityConfig::from_lookup(lookup(&[("RUST_LOG", "warn")]));
        assert_eq!(config.filter, "warn");
    }

    #[test]
    fn format_is_parsed_case_insensitively() {
        let config = ObservabilityConfig::from_lookup(lookup(&[(LOG_FORMAT_VAR, "Pretty")]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn unknown_format_falls_back_to_json() {
        let config = ObservabilityConfig::from_lookup(lookup(&[(LOG_FORMAT_VAR, "xml")]));
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn logs_go_to_stderr_unless_asked() {
        assert_eq!(ObservabilityConfig::default().target, LogTarget::Stderr);
        assert_eq!(
            ObservabilityConfig::from_lookup(lookup(&[])).target,
            LogTarget::Stderr
        );
        assert_eq!(
            ObservabilityConfig::from_lookup(lookup(&[(LOG_TARGET_VAR, "STDOUT")])).target,
            LogTarget::Stdout
        );
        assert_eq!(
            ObservabilityConfig::from_lookup(lookup(&[(LOG_TARGET_VAR, "syslog")])).target,
            LogTarget::Stderr
        );
    }

    #[test]
    fn init_twice_is_harmless() {
        init(&ObservabilityConfig::default());
        init(&ObservabilityConfig::default());
    }
}
