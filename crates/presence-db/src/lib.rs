//! # presence-db
//!
//! Relational side of identity resolution: resolves a conferencing user id
//! to the email address stored in the users table.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use presence_db::{create_pool, DatabaseConfig, PgUserEmailRepository};
//! use presence_core::UserEmailRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default())?;
//!     let users = PgUserEmailRepository::new(pool, "users", "uuid")?;
//!     let email = users.email_by_user_id("8a7c0f0e-3b1d-4c52-9d2e-6f1a2b3c4d5e").await?;
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::{InvalidIdentifier, PgUserEmailRepository};
