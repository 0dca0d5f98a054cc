//! Presence dispatch
//!
//! Sends the presence matching a room event to the PBX the subscriber is
//! registered at.
//!
//! The system domain used for directory lookups comes from the first PBX
//! connection that identified itself. This assumes all connected PBXs share
//! one system domain.

use tracing::instrument;

use presence_core::{
    DomainError, DomainEvent, DomainResult, PbxInfo, PresenceCommand, SharedConnection,
    SubscriberRecord, CAPABILITY_PBX_API,
};

use super::context::ServiceContext;

/// Presence dispatcher
pub struct PresenceDispatcher<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceDispatcher<'a> {
    /// Create a new PresenceDispatcher
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// System domain of the canonical (first registered) connection
    pub fn system_domain(&self) -> DomainResult<String> {
        let info = self
            .ctx
            .registry()
            .connections()
            .into_iter()
            .find_map(|conn| conn.pbx_info())
            .ok_or(DomainError::NoCanonicalConnection)?;

        if info.domain.is_empty() {
            tracing::warn!(pbx = %info.pbx, "System domain of the PBX is empty");
        }
        Ok(info.domain)
    }

    /// Connection of the PBX named `location`
    pub fn connection_for(&self, location: &str) -> DomainResult<(SharedConnection, PbxInfo)> {
        self.ctx
            .registry()
            .connections()
            .into_iter()
            .find_map(|conn| match conn.pbx_info() {
                Some(info) if info.pbx == location => Some((conn, info)),
                _ => None,
            })
            .ok_or_else(|| DomainError::ConnectionMiss {
                location: location.to_string(),
            })
    }

    /// Send the presence for `event` to the PBX of `record`
    ///
    /// Returns the command that was queued on the connection.
    #[instrument(skip(self, event, record), fields(guid = %record.guid, location = %record.location_id))]
    pub async fn dispatch(
        &self,
        event: &DomainEvent,
        record: &SubscriberRecord,
    ) -> DomainResult<PresenceCommand> {
        let (conn, info) = self.connection_for(&record.location_id)?;

        if !info.has_api(CAPABILITY_PBX_API) {
            return Err(DomainError::CapabilityMissing {
                location: info.pbx,
                capability: CAPABILITY_PBX_API,
            });
        }

        let command = PresenceCommand::for_event(event.kind, &record.guid, self.ctx.busy_note());
        let payload = command
            .to_json()
            .map_err(|e| DomainError::SendFailure(e.to_string()))?;

        conn.send(payload).await?;

        tracing::info!(
            connection = %conn.connection_id(),
            h323 = %record.telephony_id,
            activity = %command.activity,
            note = %command.note,
            "Presence sent to PBX"
        );
        Ok(command)
    }
}
