//! Process configuration, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `STOCKCURVE_BIND_ADDR` | `0.0.0.0:8000` | HTTP listen address |
//! | `DATABASE_URL` | unset | Postgres URL; unset selects the in-memory store |
//! | `CORS_ORIGINS` | `*` | `*` or a comma-separated origin list |
//! | `STOCKCURVE_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `ABC_THRESHOLD_A` | `80` | upper cumulative share (percent) for curve A |
//! | `ABC_THRESHOLD_B` | `95` | upper cumulative share (percent) for curve B |
//! | `ABC_ZERO_TOTAL_POLICY` | `uniform` | `uniform` or `stock-rank` |
//!
//! Empty values count as unset.

use std::net::SocketAddr;

use thiserror::Error;

use stockcurve_analytics::{ClassifierConfig, ZeroTotalPolicy};
use stockcurve_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigins {
    #[default]
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            return Self::Any;
        }
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() { Self::Any } else { Self::List(origins) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub cors_origins: CorsOrigins,
    pub log_format: LogFormat,
    pub classifier: ClassifierConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("STOCKCURVE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("STOCKCURVE_BIND_ADDR", &bind_raw, e))?;

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| CorsOrigins::parse(&raw))
            .unwrap_or_default();

        let log_format = match get("STOCKCURVE_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("STOCKCURVE_LOG_FORMAT", &raw, e))?,
            None => LogFormat::default(),
        };

        let defaults = ClassifierConfig::default();
        let a_threshold = parse_percent(get("ABC_THRESHOLD_A"), "ABC_THRESHOLD_A", defaults.a_threshold())?;
        let b_threshold = parse_percent(get("ABC_THRESHOLD_B"), "ABC_THRESHOLD_B", defaults.b_threshold())?;

        let zero_total_policy = match get("ABC_ZERO_TOTAL_POLICY") {
            Some(raw) => raw
                .parse::<ZeroTotalPolicy>()
                .map_err(|e| ConfigError::invalid("ABC_ZERO_TOTAL_POLICY", &raw, e))?,
            None => ZeroTotalPolicy::default(),
        };

        let classifier = ClassifierConfig::new(a_threshold, b_threshold)
            .map_err(|e| {
                ConfigError::invalid("ABC_THRESHOLD_A", &format!("{a_threshold}/{b_threshold}"), e)
            })?
            .with_zero_total_policy(zero_total_policy);

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL").map(|url| url.trim().to_string()),
            cors_origins,
            log_format,
            classifier,
        })
    }
}

fn parse_percent(raw: Option<String>, var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::invalid(var, &raw, e)),
        None => Ok(default),
    }
}
