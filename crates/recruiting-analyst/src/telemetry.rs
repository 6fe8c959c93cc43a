//! Tracing setup. Logs go to stderr so report CSV on stdout stays clean.

use std::env;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

const FILTER_OVERRIDE_VAR: &str = "RUST_LOG";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter `{directive}` is not valid: {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber could not be installed: {0}")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A usable `override_directive` (normally `RUST_LOG`) wins over the configured
/// level; an unusable one is ignored.
pub fn build_filter(
    config: &TelemetryConfig,
    override_directive: Option<&str>,
) -> Result<EnvFilter, TelemetryError> {
    if let Some(directive) = override_directive.map(str::trim).filter(|d| !d.is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return Ok(filter);
        }
    }

    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::InvalidFilter {
        directive: config.log_level.clone(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let override_directive = env::var(FILTER_OVERRIDE_VAR).ok();
    let filter = build_filter(config, override_directive.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}
