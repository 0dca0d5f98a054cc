//! Repository implementations
//!
//! PostgreSQL implementations of the lookup ports defined in presence-core.

mod error;
mod user_email;

pub use user_email::{InvalidIdentifier, PgUserEmailRepository};
