use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::board::DuplicatePolicy;

const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub geocode: GeocodeConfig,
    pub board: BoardConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let endpoint =
            env::var("GEOCODE_ENDPOINT").unwrap_or_else(|_| DEFAULT_GEOCODE_ENDPOINT.to_string());
        let api_key = env::var("GEOCODE_API_KEY").unwrap_or_default();
        let timeout_secs = env::var("GEOCODE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidGeocodeTimeout)?;

        let seed_reference_jobs = match env::var("BOARD_SEED_REFERENCE_JOBS") {
            Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidSeedFlag { value })?,
            Err(_) => true,
        };
        let duplicate_policy = match env::var("BOARD_DUPLICATE_POLICY") {
            Ok(value) => value
                .parse::<DuplicatePolicy>()
                .map_err(|_| ConfigError::InvalidDuplicatePolicy {
                    value: value.clone(),
                })?,
            Err(_) => DuplicatePolicy::default(),
        };
        let jobs_csv = env::var("BOARD_JOBS_CSV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            geocode: GeocodeConfig {
                endpoint,
                api_key,
                timeout_secs,
            },
            board: BoardConfig {
                seed_reference_jobs,
                duplicate_policy,
                jobs_csv,
            },
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Geocoding endpoint and credentials.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Job board behavior switches.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Show the built-in reference listings ahead of stored ones.
    pub seed_reference_jobs: bool,
    pub duplicate_policy: DuplicatePolicy,
    /// Optional CSV catalog loaded into the listing store at startup.
    pub jobs_csv: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            seed_reference_jobs: true,
            duplicate_policy: DuplicatePolicy::default(),
            jobs_csv: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidGeocodeTimeout,
    InvalidSeedFlag { value: String },
    InvalidDuplicatePolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidGeocodeTimeout => {
                write!(f, "GEOCODE_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidSeedFlag { value } => write!(
                f,
                "BOARD_SEED_REFERENCE_JOBS must be true or false (got '{}')",
                value
            ),
            ConfigError::InvalidDuplicatePolicy { value } => write!(
                f,
                "BOARD_DUPLICATE_POLICY must be 'append' or 'reject' (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
