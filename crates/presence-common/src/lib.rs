//! # presence-common
//!
//! Shared utilities including configuration, error handling, app-service
//! authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{compute_login_digest, generate_challenge, verify_login_digest, LoginParams};
pub use config::{
    AppConfig, AppServiceConfig, AppSettings, ConfigError, DatabaseConfig, Environment,
    PresenceConfig, RedisConfig, ServerConfig, SignalingConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
