use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the analyst.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub greenhouse: GreenhouseConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("ANALYST_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let api_key = env::var("GREENHOUSE_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let base_url = env::var("GREENHOUSE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let domain = env::var("GREENHOUSE_DOMAIN").unwrap_or_else(|_| DEFAULT_DOMAIN.to_string());
        let max_retries = parse_number::<u32>("GREENHOUSE_MAX_RETRIES", 3)?;

        let fetch_concurrency = parse_number::<usize>("ANALYST_FETCH_CONCURRENCY", 8)?;
        if fetch_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let cache_path = env::var("ANALYST_JOB_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_PATH));
        let departments = env::var("ANALYST_DEPARTMENTS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        let log_level = env::var("ANALYST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            greenhouse: GreenhouseConfig {
                api_key,
                base_url,
                domain,
                max_retries,
            },
            cache: CacheConfig {
                path: cache_path,
                departments,
            },
            report: ReportConfig { fetch_concurrency },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

const DEFAULT_BASE_URL: &str = "https://harvest.greenhouse.io/v1";
const DEFAULT_DOMAIN: &str = "app.greenhouse.io";
const DEFAULT_CACHE_PATH: &str = "config/jobs.yaml";

/// Harvest API access.
#[derive(Debug, Clone)]
pub struct GreenhouseConfig {
    /// Only required by commands that hit the network.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Host used when rendering candidate links in reports.
    pub domain: String,
    pub max_retries: u32,
}

/// Location of the job cache and the departments a refresh pulls in.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub path: PathBuf,
    pub departments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub fetch_concurrency: usize,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_number<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    ZeroConcurrency,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a non-negative integer, got '{value}'")
            }
            ConfigError::ZeroConcurrency => {
                write!(f, "ANALYST_FETCH_CONCURRENCY must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
