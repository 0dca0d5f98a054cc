//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppServiceConfig, AppSettings, ConfigError, DatabaseConfig, Environment,
    PresenceConfig, RedisConfig, ServerConfig, SignalingConfig,
};
