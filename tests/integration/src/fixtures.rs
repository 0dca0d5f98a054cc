//! Test fixtures
//!
//! In-memory identity lookups and canned PBX messages.

use async_trait::async_trait;
use presence_common::{compute_login_digest, AppServiceConfig, LoginParams};
use presence_core::{DomainError, DomainResult, ParticipantLookup, UserEmailRepository};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Shared app service password used by the test PBX
pub const TEST_PASSWORD: &str = "test-password";

/// App service identity of the test gateway
pub fn test_app_service() -> AppServiceConfig {
    AppServiceConfig {
        domain: "example.com".to_string(),
        name: "presence".to_string(),
        instance: "test".to_string(),
        password: TEST_PASSWORD.to_string(),
    }
}

/// Participant lookup backed by a map
#[derive(Debug, Default)]
pub struct MapParticipants(HashMap<(String, String), String>);

impl MapParticipants {
    pub fn insert(mut self, room: &str, participant: &str, user_id: &str) -> Self {
        self.0
            .insert((room.to_string(), participant.to_string()), user_id.to_string());
        self
    }
}

#[async_trait]
impl ParticipantLookup for MapParticipants {
    async fn user_id(&self, room: &str, participant: &str) -> DomainResult<String> {
        self.0
            .get(&(room.to_string(), participant.to_string()))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user_id", format!("{room}/{participant}")))
    }
}

/// User email lookup backed by a map
#[derive(Debug, Default)]
pub struct MapUsers(HashMap<String, String>);

impl MapUsers {
    pub fn insert(mut self, user_id: &str, email: &str) -> Self {
        self.0.insert(user_id.to_string(), email.to_string());
        self
    }
}

#[async_trait]
impl UserEmailRepository for MapUsers {
    async fn email_by_user_id(&self, user_id: &str) -> DomainResult<String> {
        self.0
            .get(user_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("email", user_id))
    }
}

/// Room event payload as published by the conferencing signaling
pub fn room_event(room: &str, participant: &str, event: &str) -> String {
    json!({"room": room, "participant": participant, "event": event}).to_string()
}

/// AppLogin answering `challenge` with the given password
pub fn app_login(challenge: &str, password: &str) -> Value {
    let params = LoginParams {
        app: "presence",
        domain: "example.com",
        sip: "presence",
        guid: "0000-pbx",
        dn: "Presence",
        info: "",
        challenge,
    };
    json!({
        "mt": "AppLogin",
        "app": params.app,
        "domain": params.domain,
        "sip": params.sip,
        "guid": params.guid,
        "dn": params.dn,
        "digest": compute_login_digest(&params, password),
    })
}

/// PbxInfo of a PBX at `location`
pub fn pbx_info(location: &str, domain: &str, apis: &[&str]) -> Value {
    json!({"mt": "PbxInfo", "pbx": location, "domain": domain, "apis": apis})
}

/// ReplicateNextResult carrying one user object
pub fn replicated_user(guid: &str, location: &str, emails: &[&str]) -> Value {
    let emails: Vec<Value> = emails.iter().map(|e| json!({"email": e})).collect();
    json!({
        "api": "PbxTableUsers",
        "mt": "ReplicateNextResult",
        "columns": {"guid": guid, "h323": guid, "loc": location, "emails": emails}
    })
}

/// ReplicateNextResult ending the initial replication
pub fn replication_end() -> Value {
    json!({"api": "PbxTableUsers", "mt": "ReplicateNextResult"})
}
