//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use flashdeck_ai::AiConfig;
use flashdeck_db::DbConfig;

/// Secret used when `JWT_SECRET` is not set. Never valid in production.
pub const DEV_JWT_SECRET: &str = "flashdeck-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,

    /// Text-generation service key; `None` disables generation
    pub ai_api_key: Option<String>,

    pub ai_base_url: String,

    pub ai_model: String,

    pub ai_timeout: Duration,

    /// Study sessions untouched for this long are dropped
    pub study_session_idle: Duration,

    /// Single origin allowed by CORS; any origin when unset
    pub cors_allowed_origin: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            database_path: PathBuf::from("./flashdeck.db"),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            ai_api_key: None,
            ai_base_url: flashdeck_ai::config::DEFAULT_BASE_URL.to_string(),
            ai_model: flashdeck_ai::config::DEFAULT_MODEL.to_string(),
            ai_timeout: flashdeck_ai::config::DEFAULT_TIMEOUT,
            study_session_idle: Duration::from_secs(120 * 60),
            cors_allowed_origin: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: parse_or(&get, "HTTP_PORT", defaults.http_port)?,

            bind_addr: parse_or(&get, "BIND_ADDR", defaults.bind_addr)?,

            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            jwt_secret: get("JWT_SECRET").unwrap_or(defaults.jwt_secret),

            ai_api_key: get("AI_API_KEY"),

            ai_base_url: get("AI_BASE_URL").unwrap_or(defaults.ai_base_url),

            ai_model: get("AI_MODEL").unwrap_or(defaults.ai_model),

            ai_timeout: Duration::from_secs(parse_or(
                &get,
                "AI_TIMEOUT_SECS",
                defaults.ai_timeout.as_secs(),
            )?),

            study_session_idle: Duration::from_secs(
                parse_or::<u64, _>(&get, "STUDY_SESSION_IDLE_MINS", 120)? * 60,
            ),

            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.study_session_idle.is_zero() {
            return Err(ConfigError::InvalidValue("STUDY_SESSION_IDLE_MINS".to_string()));
        }

        Ok(config)
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    /// True when the JWT secret is still the built-in development value.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }

    pub fn ai_config(&self) -> AiConfig {
        let config = AiConfig::default()
            .base_url(&self.ai_base_url)
            .model(&self.ai_model)
            .timeout(self.ai_timeout);

        match &self.ai_api_key {
            Some(key) => config.api_key(key),
            None => config,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
