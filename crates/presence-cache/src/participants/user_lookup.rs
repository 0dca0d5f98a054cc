//! Participant → user id lookup in Redis.

use async_trait::async_trait;
use tracing::instrument;

use presence_core::{DomainError, DomainResult, ParticipantLookup};

use crate::pool::RedisPool;
use crate::pubsub::SignalingKeys;

/// Resolves participants through the `...:participants:attributes:user_id` hash
#[derive(Debug, Clone)]
pub struct RedisParticipantLookup {
    pool: RedisPool,
    keys: SignalingKeys,
}

impl RedisParticipantLookup {
    #[must_use]
    pub fn new(pool: RedisPool, keys: SignalingKeys) -> Self {
        Self { pool, keys }
    }
}

#[async_trait]
impl ParticipantLookup for RedisParticipantLookup {
    #[instrument(skip(self))]
    async fn user_id(&self, room: &str, participant: &str) -> DomainResult<String> {
        let key = self.keys.participant_user_key(room);
        let value = self
            .pool
            .hget(&key, participant)
            .await
            .map_err(DomainError::connection)?;

        match value {
            Some(user_id) if !user_id.is_empty() => Ok(user_id),
            _ => Err(DomainError::not_found(
                "user_id",
                format!("{room}/{participant}"),
            )),
        }
    }
}
