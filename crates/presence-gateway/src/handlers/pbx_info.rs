//! PbxInfo handler
//!
//! Records location, system domain and APIs of a logged-in PBX and makes the
//! connection part of the registry.

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, PbxMessage};
use crate::server::GatewayState;
use presence_core::{PbxInfo, SharedConnection};
use presence_service::ReplicationEvent;
use std::sync::Arc;

/// Handler for PbxInfo
pub struct PbxInfoHandler;

impl PbxInfoHandler {
    /// Handle a PbxInfo message
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: PbxMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        let payload = message
            .as_pbx_info()
            .ok_or_else(|| HandlerError::InvalidPayload("Invalid PbxInfo payload".to_string()))?;

        let info = PbxInfo::from(payload);
        if info.domain.is_empty() {
            tracing::warn!(
                session_id = %connection.session_id(),
                location = %info.pbx,
                "PBX announced an empty system domain"
            );
        }

        let location = info.pbx.clone();
        let pbx_domain = info.domain.clone();
        let order = state.connection_manager().identify(connection, info);

        tracing::info!(
            session_id = %connection.session_id(),
            location = %location,
            pbx_domain = %pbx_domain,
            order,
            "PBX identified"
        );

        let shared: SharedConnection = connection.clone();
        if state
            .replication_tx()
            .send(ReplicationEvent::Connected(shared))
            .await
            .is_err()
        {
            tracing::warn!(location = %location, "Replication feed is closed");
        }

        Ok(None)
    }
}
