//! PbxTableUsers replication handler
//!
//! Pages through the initial replication with ReplicateNext, staging the
//! objects on the connection until the PBX signals the end, and forwards
//! later changes to the directory sync.

use super::{send_message, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, MessageType, PbxMessage};
use crate::server::GatewayState;
use presence_core::{PbxConnection, RequestId, SubscriberRecord};
use presence_service::ReplicationEvent;

/// Handler for the replication messages
pub struct ReplicationHandler;

impl ReplicationHandler {
    /// Handle one replication message
    pub async fn handle(
        state: &GatewayState,
        connection: &Connection,
        mt: MessageType,
        message: PbxMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        match mt {
            MessageType::ReplicateStartResult => Self::request_next(connection).await,
            MessageType::ReplicateNextResult => {
                Self::handle_next_result(state, connection, &message).await
            }
            MessageType::ReplicateAdd => {
                if let Some(record) = Self::record(connection, &message) {
                    let location = Self::location(connection);
                    Self::forward(state, ReplicationEvent::Added { location, record }).await;
                }
                Ok(None)
            }
            MessageType::ReplicateUpdate => {
                if let Some(record) = Self::record(connection, &message) {
                    let location = Self::location(connection);
                    Self::forward(state, ReplicationEvent::Updated { location, record }).await;
                }
                Ok(None)
            }
            MessageType::ReplicateDel => {
                match Self::deleted_guid(&message) {
                    Some(guid) => Self::forward(state, ReplicationEvent::Deleted { guid }).await,
                    None => tracing::warn!(
                        session_id = %connection.session_id(),
                        "ReplicateDel without guid"
                    ),
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    async fn handle_next_result(
        state: &GatewayState,
        connection: &Connection,
        message: &PbxMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        if message.has_columns() {
            if let Some(record) = Self::record(connection, message) {
                connection.stage_record(record);
            }
            return Self::request_next(connection).await;
        }

        let records = connection.take_staged();
        let location = Self::location(connection);
        tracing::debug!(
            location = %location,
            users = records.len(),
            "Initial replication complete"
        );
        Self::forward(state, ReplicationEvent::InitialDone { location, records }).await;
        Ok(None)
    }

    /// Name of the PBX behind the connection, the source of its records
    fn location(connection: &Connection) -> String {
        connection.pbx_info().map(|i| i.pbx).unwrap_or_default()
    }

    async fn request_next(connection: &Connection) -> HandlerResult<Option<CloseCode>> {
        let next = PbxMessage::replicate_next(Some(RequestId::now().to_string()));
        send_message(connection, &next).await?;
        Ok(None)
    }

    /// Replicated object of a message; malformed objects are skipped
    fn record(connection: &Connection, message: &PbxMessage) -> Option<SubscriberRecord> {
        let record = message.as_replicated_object().map(SubscriberRecord::from);
        if record.is_none() {
            tracing::warn!(
                session_id = %connection.session_id(),
                mt = %message.mt,
                "Skipping malformed replicated object"
            );
        }
        record
    }

    fn deleted_guid(message: &PbxMessage) -> Option<String> {
        message
            .body
            .get("columns")
            .and_then(|c| c.get("guid"))
            .or_else(|| message.body.get("guid"))
            .and_then(|g| g.as_str())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
    }

    async fn forward(state: &GatewayState, event: ReplicationEvent) {
        if let Err(e) = state.replication_tx().send(event).await {
            tracing::warn!(event = ?e.0, "Replication feed is closed");
        }
    }
}
