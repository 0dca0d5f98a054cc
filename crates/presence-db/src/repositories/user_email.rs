//! PostgreSQL implementation of UserEmailRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use presence_core::{DomainResult, UserEmailRepository};

use super::error::{email_not_found, is_invalid_input, map_db_error};

/// Identifier rejected because it is not plain SQL
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidIdentifier {
    #[error("Invalid users table name: '{0}'")]
    Table(String),
    #[error("Invalid users id type: '{0}'")]
    IdType(String),
}

fn is_valid_identifier(part: &str) -> bool {
    !part.is_empty()
        && !part.starts_with(|c: char| c.is_ascii_digit())
        && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accepts `name` or `schema.name` made of ASCII alphanumerics and `_`
fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2 && parts.iter().all(|part| is_valid_identifier(part))
}

/// PostgreSQL implementation of UserEmailRepository
#[derive(Clone)]
pub struct PgUserEmailRepository {
    pool: PgPool,
    query: String,
}

impl PgUserEmailRepository {
    /// Create a new PgUserEmailRepository reading from `table`
    ///
    /// The user id arrives as text and is cast to `id_type`, the type of the
    /// `id` column, so the lookup stays on the primary key index. Both names
    /// are interpolated into the query and must be plain identifiers.
    pub fn new(pool: PgPool, table: &str, id_type: &str) -> Result<Self, InvalidIdentifier> {
        if !is_valid_table_name(table) {
            return Err(InvalidIdentifier::Table(table.to_string()));
        }
        if !is_valid_identifier(id_type) {
            return Err(InvalidIdentifier::IdType(id_type.to_string()));
        }

        let query = format!("SELECT email FROM {table} WHERE id = $1::{id_type}");
        Ok(Self { pool, query })
    }

    /// SQL used for the lookup
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl UserEmailRepository for PgUserEmailRepository {
    #[instrument(skip(self))]
    async fn email_by_user_id(&self, user_id: &str) -> DomainResult<String> {
        let result = sqlx::query_scalar::<_, Option<String>>(&self.query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await;

        let email = match result {
            Ok(email) => email,
            // The id does not parse as the column type, so no row can match
            Err(e) if is_invalid_input(&e) => return Err(email_not_found(user_id)),
            Err(e) => return Err(map_db_error(e)),
        };

        match email.flatten() {
            Some(email) if !email.is_empty() => Ok(email),
            _ => Err(email_not_found(user_id)),
        }
    }
}
