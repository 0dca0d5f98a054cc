//! Message handlers
//!
//! Handles incoming PBX messages based on their message type.

mod error;
mod login;
mod pbx_info;
mod replication;

pub use error::{HandlerError, HandlerResult};
pub use login::LoginHandler;
pub use pbx_info::PbxInfoHandler;
pub use replication::ReplicationHandler;

use crate::connection::Connection;
use crate::protocol::{CloseCode, MessageType, PbxMessage};
use crate::server::GatewayState;
use std::sync::Arc;

/// Queue a message on a connection
pub(crate) async fn send_message(connection: &Connection, message: &PbxMessage) -> HandlerResult<()> {
    let json = message.to_json()?;
    connection
        .send_text(json)
        .await
        .map_err(|_| HandlerError::ConnectionClosed)
}

/// Dispatch incoming PBX messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming PBX message
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: PbxMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        let Some(mt) = message.message_type().filter(|mt| mt.is_pbx_message()) else {
            tracing::warn!(
                session_id = %connection.session_id(),
                mt = %message.mt,
                "Received unknown message type from PBX"
            );
            return Ok(Some(CloseCode::UnknownMessageType));
        };

        if !mt.allowed_before_login() && !connection.is_authenticated() {
            return Err(HandlerError::NotAuthenticated);
        }

        match mt {
            MessageType::AppChallenge => LoginHandler::handle_challenge(connection, message).await,
            MessageType::AppLogin => LoginHandler::handle_login(state, connection, message).await,
            MessageType::PbxInfo => PbxInfoHandler::handle(state, connection, message).await,
            MessageType::ReplicateStartResult
            | MessageType::ReplicateNextResult
            | MessageType::ReplicateAdd
            | MessageType::ReplicateUpdate
            | MessageType::ReplicateDel => {
                ReplicationHandler::handle(state, connection, mt, message).await
            }
            MessageType::SetPresenceResult => {
                tracing::trace!(
                    session_id = %connection.session_id(),
                    src = ?message.src,
                    "SetPresence acknowledged"
                );
                Ok(None)
            }
            // These types should never reach here due to is_pbx_message check
            _ => {
                tracing::error!(mt = %mt, "Unhandled PBX message type");
                Ok(Some(CloseCode::UnknownMessageType))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionManager, Outbound};
    use presence_common::{compute_login_digest, AppServiceConfig, LoginParams};
    use presence_core::{ConnectionRegistry, PbxConnection};
    use presence_service::ReplicationEvent;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    const PASSWORD: &str = "secret";

    struct Harness {
        state: GatewayState,
        connection: Arc<Connection>,
        outbound: mpsc::Receiver<Outbound>,
        replication: mpsc::Receiver<ReplicationEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let manager = ConnectionManager::new_shared();
            let (replication_tx, replication) = mpsc::channel(16);
            let app_service = AppServiceConfig {
                domain: "example.com".to_string(),
                name: "presence".to_string(),
                instance: "main".to_string(),
                password: PASSWORD.to_string(),
            };
            let state = GatewayState::new(manager.clone(), replication_tx, app_service);
            let (tx, outbound) = mpsc::channel(16);
            let connection = manager.add_connection("s1".to_string(), tx);
            Self {
                state,
                connection,
                outbound,
                replication,
            }
        }

        async fn send(&self, value: Value) -> HandlerResult<Option<CloseCode>> {
            let message = PbxMessage::from_json(&value.to_string()).unwrap();
            MessageDispatcher::dispatch(&self.state, &self.connection, message).await
        }

        fn next_json(&mut self) -> Value {
            match self.outbound.try_recv().unwrap() {
                Outbound::Message(text) => serde_json::from_str(&text).unwrap(),
                Outbound::Close(code) => panic!("unexpected close {code}"),
            }
        }

        async fn login(&mut self) {
            self.send(json!({"mt": "AppChallenge"})).await.unwrap();
            let challenge = self.next_json()["challenge"].as_str().unwrap().to_string();
            let digest = compute_login_digest(
                &LoginParams {
                    app: "presence",
                    domain: "example.com",
                    sip: "presence",
                    guid: "g",
                    dn: "Presence",
                    info: "",
                    challenge: &challenge,
                },
                PASSWORD,
            );
            let result = self
                .send(json!({
                    "mt": "AppLogin", "app": "presence", "domain": "example.com",
                    "sip": "presence", "guid": "g", "dn": "Presence", "digest": digest
                }))
                .await
                .unwrap();
            assert_eq!(result, None);
            assert_eq!(self.next_json()["ok"], true);
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut h = Harness::new();
        h.login().await;
        assert!(h.connection.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_wrong_digest_closes() {
        let mut h = Harness::new();
        h.send(json!({"mt": "AppChallenge", "src": "c1"})).await.unwrap();
        let challenge = h.next_json();
        assert_eq!(challenge["mt"], "AppChallengeResult");
        assert_eq!(challenge["src"], "c1");

        let result = h
            .send(json!({
                "mt": "AppLogin", "app": "presence", "domain": "example.com",
                "sip": "presence", "guid": "g", "dn": "Presence", "digest": "00"
            }))
            .await
            .unwrap();

        assert_eq!(result, Some(CloseCode::LoginFailed));
        assert_eq!(h.next_json()["ok"], false);
        assert!(!h.connection.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_without_challenge_fails() {
        let mut h = Harness::new();
        let result = h
            .send(json!({
                "mt": "AppLogin", "app": "a", "domain": "d", "sip": "s",
                "guid": "g", "dn": "n", "digest": "00"
            }))
            .await
            .unwrap();
        assert_eq!(result, Some(CloseCode::LoginFailed));
        assert_eq!(h.next_json()["mt"], "AppLoginResult");
    }

    #[tokio::test]
    async fn test_second_login_rejected() {
        let mut h = Harness::new();
        h.login().await;
        let err = h.send(json!({"mt": "AppChallenge"})).await.unwrap_err();
        assert!(matches!(err, HandlerError::AlreadyAuthenticated));
    }

    #[tokio::test]
    async fn test_pbx_info_requires_login() {
        let h = Harness::new();
        let err = h
            .send(json!({"mt": "PbxInfo", "pbx": "pbx1", "domain": "example.com"}))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::NotAuthenticated));
        assert_eq!(err.to_close_code(), Some(CloseCode::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_unknown_and_server_only_types() {
        let h = Harness::new();
        assert_eq!(
            h.send(json!({"mt": "Heartbeat"})).await.unwrap(),
            Some(CloseCode::UnknownMessageType)
        );
        assert_eq!(
            h.send(json!({"mt": "SetPresence"})).await.unwrap(),
            Some(CloseCode::UnknownMessageType)
        );
    }

    #[tokio::test]
    async fn test_pbx_info_registers_and_notifies() {
        let mut h = Harness::new();
        h.login().await;

        h.send(json!({
            "mt": "PbxInfo", "pbx": "pbx1", "domain": "example.com",
            "apis": ["PbxApi", "PbxTableUsers"]
        }))
        .await
        .unwrap();

        let registered = h.state.connection_manager().connections();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].pbx_info().unwrap().domain, "example.com");

        match h.replication.try_recv().unwrap() {
            ReplicationEvent::Connected(conn) => assert_eq!(conn.connection_id(), "s1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_initial_replication_is_staged() {
        let mut h = Harness::new();
        h.login().await;
        h.send(json!({"mt": "PbxInfo", "pbx": "pbx1", "domain": "example.com", "apis": ["PbxTableUsers"]}))
            .await
            .unwrap();
        let _connected = h.replication.try_recv().unwrap();

        h.send(json!({"api": "PbxTableUsers", "mt": "ReplicateStartResult"}))
            .await
            .unwrap();
        assert_eq!(h.next_json()["mt"], "ReplicateNext");

        for (guid, email) in [("g1", "bob@example.com"), ("g2", "carol")] {
            h.send(json!({
                "api": "PbxTableUsers", "mt": "ReplicateNextResult",
                "columns": {"guid": guid, "h323": guid, "loc": "pbx1", "emails": [{"email": email}]}
            }))
            .await
            .unwrap();
            assert_eq!(h.next_json()["mt"], "ReplicateNext");
        }
        assert!(h.replication.try_recv().is_err());

        h.send(json!({"api": "PbxTableUsers", "mt": "ReplicateNextResult"}))
            .await
            .unwrap();

        match h.replication.try_recv().unwrap() {
            ReplicationEvent::InitialDone { location, records } => {
                assert_eq!(location, "pbx1");
                let guids: Vec<&str> = records.iter().map(|r| r.guid.as_str()).collect();
                assert_eq!(guids, vec!["g1", "g2"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_replication_changes_forwarded() {
        let mut h = Harness::new();
        h.login().await;
        h.send(json!({"mt": "PbxInfo", "pbx": "pbx1", "domain": "example.com"}))
            .await
            .unwrap();
        let _connected = h.replication.try_recv().unwrap();

        h.send(json!({
            "api": "PbxTableUsers", "mt": "ReplicateAdd",
            "columns": {"guid": "g3", "h323": "dave", "loc": "pbx1", "emails": [{"email": "dave"}]}
        }))
        .await
        .unwrap();
        h.send(json!({
            "api": "PbxTableUsers", "mt": "ReplicateUpdate",
            "columns": {"guid": "g3", "h323": "dave", "loc": "pbx2", "emails": []}
        }))
        .await
        .unwrap();
        h.send(json!({"api": "PbxTableUsers", "mt": "ReplicateDel", "columns": {"guid": "g3"}}))
            .await
            .unwrap();

        assert!(matches!(
            h.replication.try_recv().unwrap(),
            ReplicationEvent::Added { location, record } if location == "pbx1" && record.guid == "g3"
        ));
        assert!(matches!(
            h.replication.try_recv().unwrap(),
            ReplicationEvent::Updated { record, .. } if record.location_id == "pbx2"
        ));
        assert!(matches!(
            h.replication.try_recv().unwrap(),
            ReplicationEvent::Deleted { guid } if guid == "g3"
        ));
    }

    #[tokio::test]
    async fn test_set_presence_result_ignored() {
        let mut h = Harness::new();
        h.login().await;
        let result = h
            .send(json!({"api": "PbxApi", "mt": "SetPresenceResult", "src": "1"}))
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(h.outbound.try_recv().is_err());
    }
}
