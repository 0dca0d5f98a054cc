//! Identity resolution
//!
//! Turns the participant of a room into the email address of its user. Both
//! lookups must succeed; a failed step aborts the resolution so that no event
//! with a missing email ever reaches the directory.

use tracing::instrument;

use presence_core::{DomainError, DomainEvent, DomainResult, RoomEvent};

use super::context::ServiceContext;

/// Identity resolver
pub struct IdentityResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IdentityResolver<'a> {
    /// Create a new IdentityResolver
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the participant of `event` to a user id and email
    #[instrument(skip(self, event), fields(room = %event.room, participant = %event.participant_id))]
    pub async fn resolve(&self, event: &RoomEvent) -> DomainResult<DomainEvent> {
        let user_id = self
            .ctx
            .participants()
            .user_id(&event.room, &event.participant_id)
            .await?;

        let email = self.ctx.users().email_by_user_id(&user_id).await?;
        if email.is_empty() {
            return Err(DomainError::not_found("email", user_id));
        }

        tracing::debug!(user_id = %user_id, email = %email, "Participant resolved");
        Ok(event.clone().resolved(user_id, email))
    }
}
