use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::eligibility::decision::{
    DecisionThresholds, InvalidThresholds, DEFAULT_APPROVE_THRESHOLD,
    DEFAULT_SOFT_DECLINE_THRESHOLD,
};

/// Deployment stage the service runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value).ok_or(ConfigError::InvalidLogFormat { value })?,
            Err(_) => LogFormat::Compact,
        };

        let approve = threshold("APP_APPROVAL_THRESHOLD", DEFAULT_APPROVE_THRESHOLD)?;
        let soft_decline =
            threshold("APP_SOFT_DECLINE_THRESHOLD", DEFAULT_SOFT_DECLINE_THRESHOLD)?;
        let thresholds = DecisionThresholds::new(approve, soft_decline)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            eligibility: EligibilityConfig { thresholds },
        })
    }
}

fn threshold(variable: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidThreshold { variable }),
        Err(_) => Ok(default),
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Per-deployment decision cut-offs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityConfig {
    pub thresholds: DecisionThresholds,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat { value: String },
    InvalidThreshold { variable: &'static str },
    Thresholds(InvalidThresholds),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{}'", value)
            }
            ConfigError::InvalidThreshold { variable } => {
                write!(f, "{} must be a number between 0 and 1", variable)
            }
            ConfigError::Thresholds(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Thresholds(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat { .. }
            | ConfigError::InvalidThreshold { .. } => None,
        }
    }
}

impl From<InvalidThresholds> for ConfigError {
    fn from(err: InvalidThresholds) -> Self {
        Self::Thresholds(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_APPROVAL_THRESHOLD",
            "APP_SOFT_DECLINE_THRESHOLD",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.eligibility.thresholds, DecisionThresholds::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_threshold_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_APPROVAL_THRESHOLD", "0.8");
        env::set_var("APP_SOFT_DECLINE_THRESHOLD", " 0.5 ");
        env::set_var("APP_LOG_FORMAT", "JSON");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.eligibility.thresholds.approve(), 0.8);
        assert_eq!(config.eligibility.thresholds.soft_decline(), 0.5);
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_APPROVAL_THRESHOLD", "0.4");
        env::set_var("APP_SOFT_DECLINE_THRESHOLD", "0.6");
        let err = AppConfig::load().expect_err("inverted thresholds rejected");
        assert!(matches!(err, ConfigError::Thresholds(_)));
        reset_env();
    }

    #[test]
    fn rejects_unparseable_threshold() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SOFT_DECLINE_THRESHOLD", "half");
        let err = AppConfig::load().expect_err("garbage threshold rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidThreshold {
                variable: "APP_SOFT_DECLINE_THRESHOLD"
            }
        ));
        reset_env();
    }
}
