use crate::config::ConfigError;
use crate::greenhouse::SourceError;
use crate::jobs::{CacheError, RefreshError};
use crate::report::ReportError;
use crate::telemetry::TelemetryError;
use crate::workflows::pipeline::JobId;
use std::fmt;

/// Everything a CLI command can fail with.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Source(SourceError),
    Cache(CacheError),
    Report(ReportError),
    Csv(csv::Error),
    Io(std::io::Error),
    JobNotCached(JobId),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Source(err) => write!(f, "greenhouse error: {}", err),
            AppError::Cache(err) => write!(f, "job cache error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Csv(err) => write!(f, "csv error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::JobNotCached(id) => write!(
                f,
                "job {} not found in cache; run `analyst jobs refresh-cache`",
                id
            ),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Cache(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Csv(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::JobNotCached(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<CacheError> for AppError {
    fn from(value: CacheError) -> Self {
        Self::Cache(value)
    }
}

impl From<RefreshError> for AppError {
    fn from(value: RefreshError) -> Self {
        match value {
            RefreshError::Source(err) => Self::Source(err),
            RefreshError::Cache(err) => Self::Cache(err),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
