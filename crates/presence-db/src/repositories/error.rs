//! Error handling utilities for repositories

use presence_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
///
/// Queries use `fetch_optional`, so any error reaching here means the store
/// itself is unusable.
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::connection(e)
}

/// Whether the store rejected a bound value (`invalid_text_representation`)
pub fn is_invalid_input(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == INVALID_TEXT_REPRESENTATION)
}

const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Create an "email not found" error
pub fn email_not_found(user_id: &str) -> DomainError {
    DomainError::not_found("email", user_id)
}
