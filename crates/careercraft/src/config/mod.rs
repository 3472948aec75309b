use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_TEXT_MAX_LENGTH: usize = 2000;
const DEFAULT_FALLBACK_RECOMMENDATION: &str = "General Career Guidance Recommended";

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
    pub assessment: AssessmentConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            assessment: AssessmentConfig::from_env()?,
        })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Engine-wide assessment policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentConfig {
    /// Directory scanned for authored `*.json` assessment documents.
    pub document_dir: Option<PathBuf>,
    /// Serve the built-in assessments when no authored graph is available.
    pub builtin_fallback: bool,
    /// Upper bound on text answers, in characters. `None` disables the cap.
    pub text_max_length: Option<usize>,
    pub fallback_recommendation: String,
}

impl AssessmentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let document_dir = env::var("ASSESSMENT_DOCUMENT_DIR")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let builtin_fallback = match env::var("ASSESSMENT_BUILTIN_FALLBACK") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "ASSESSMENT_BUILTIN_FALLBACK",
                value: raw,
            })?,
            Err(_) => true,
        };

        let text_max_length = match env::var("ASSESSMENT_TEXT_MAX_LENGTH") {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidTextMaxLength)?;
                (parsed > 0).then_some(parsed)
            }
            Err(_) => Some(DEFAULT_TEXT_MAX_LENGTH),
        };

        let fallback_recommendation = env::var("ASSESSMENT_FALLBACK_RECOMMENDATION")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_RECOMMENDATION.to_string());

        Ok(Self {
            document_dir,
            builtin_fallback,
            text_max_length,
            fallback_recommendation,
        })
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            document_dir: None,
            builtin_fallback: true,
            text_max_length: Some(DEFAULT_TEXT_MAX_LENGTH),
            fallback_recommendation: DEFAULT_FALLBACK_RECOMMENDATION.to_string(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    InvalidTextMaxLength,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false (found '{value}')")
            }
            ConfigError::InvalidTextMaxLength => {
                write!(f, "ASSESSMENT_TEXT_MAX_LENGTH must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidTextMaxLength => None,
        }
    }
}
