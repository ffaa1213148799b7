//! Tracing/logging initialization.

use poscart_core::{DomainError, DomainResult};
use tracing_subscriber::EnvFilter;

pub const ENV_LOG_FORMAT: &str = "POSCART_LOG_FORMAT";
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    #[default]
    Json,
    /// Human-readable lines, for terminals.
    Pretty,
}

impl core::str::FromStr for LogFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(DomainError::validation(format!(
                "{ENV_LOG_FORMAT}: unknown log format {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `info,poscart_cart=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(filter) = lookup(ENV_LOG_FILTER).filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.format = raw.parse()?;
        }
        Ok(config)
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber.
///
/// Safe to call multiple times (subsequent calls are no-ops). An unparsable
/// filter falls back to `info`.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
