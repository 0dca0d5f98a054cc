//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub app_service: AppServiceConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub signaling: SignalingConfig,
    pub presence: PresenceConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Listener for websocket connections from the PBX
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity of this app service towards the PBX
#[derive(Clone, Deserialize)]
pub struct AppServiceConfig {
    pub domain: String,
    pub name: String,
    pub instance: String,
    pub password: String,
}

impl AppServiceConfig {
    /// Websocket path the PBX connects to: `/domain/name/instance`
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}/{}/{}", self.domain, self.name, self.instance)
    }
}

impl std::fmt::Debug for AppServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServiceConfig")
            .field("domain", &self.domain)
            .field("name", &self.name)
            .field("instance", &self.instance)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_users_table")]
    pub users_table: String,
    /// SQL type of the users `id` column
    #[serde(default = "default_users_id_type")]
    pub users_id_type: String,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Conferencing signaling settings (topic and key layout)
#[derive(Debug, Clone, Deserialize)]
pub struct SignalingConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

/// Presence settings
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_busy_note")]
    pub busy_note: String,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            busy_note: default_busy_note(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "presence-gateway".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    0
}

fn default_users_table() -> String {
    "users".to_string()
}

fn default_users_id_type() -> String {
    "uuid".to_string()
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_namespace() -> String {
    "k3k-signaling".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_event_buffer() -> usize {
    1024
}

fn default_busy_note() -> String {
    "Free Version / Opentalk Meeting".to_string()
}

/// Read a required, non-empty variable
fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Read an optional variable, rejecting values that do not parse
fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, value)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or a
    /// value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
                log_json: parsed("LOG_JSON", false)?,
            },
            server: ServerConfig {
                host: env::var("HTTP_HOST").unwrap_or_else(|_| default_host()),
                port: parsed("HTTP_PORT", default_port())?,
            },
            app_service: AppServiceConfig {
                domain: required("APP_SERVICE_DOMAIN")?,
                name: required("APP_SERVICE_NAME")?,
                instance: required("APP_SERVICE_INSTANCE")?,
                password: required("APP_SERVICE_PASSWORD")?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: parsed("DATABASE_MIN_CONNECTIONS", default_min_connections())?,
                users_table: env::var("USERS_TABLE").unwrap_or_else(|_| default_users_table()),
                users_id_type: env::var("USERS_ID_TYPE")
                    .unwrap_or_else(|_| default_users_id_type()),
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: parsed(
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections(),
                )?,
            },
            signaling: SignalingConfig {
                namespace: env::var("SIGNALING_NAMESPACE")
                    .unwrap_or_else(|_| default_namespace()),
                reconnect_delay_ms: parsed(
                    "EVENT_RECONNECT_DELAY_MS",
                    default_reconnect_delay_ms(),
                )?,
                event_buffer: parsed("EVENT_BUFFER", default_event_buffer())?,
            },
            presence: PresenceConfig {
                busy_note: env::var("PRESENCE_BUSY_NOTE").unwrap_or_else(|_| default_busy_note()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signaling.event_buffer == 0 {
            return Err(ConfigError::InvalidValue("EVENT_BUFFER", "0".to_string()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MIN_CONNECTIONS",
                self.database.min_connections.to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
