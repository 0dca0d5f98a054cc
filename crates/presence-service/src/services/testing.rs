//! Hand-written fakes for the service tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use presence_core::{
    ConnectionRegistry, DomainError, DomainResult, ParticipantLookup, PbxConnection, PbxInfo,
    SharedConnection, UserEmailRepository,
};

/// Participant lookup answering from a map; unknown keys are misses
#[derive(Default)]
pub struct FakeParticipants {
    pub users: HashMap<(String, String), String>,
    pub broken: bool,
}

impl FakeParticipants {
    pub fn with(room: &str, participant: &str, user_id: &str) -> Self {
        let mut users = HashMap::new();
        users.insert((room.to_string(), participant.to_string()), user_id.to_string());
        Self {
            users,
            broken: false,
        }
    }
}

#[async_trait]
impl ParticipantLookup for FakeParticipants {
    async fn user_id(&self, room: &str, participant: &str) -> DomainResult<String> {
        if self.broken {
            return Err(DomainError::connection("connection refused"));
        }
        self.users
            .get(&(room.to_string(), participant.to_string()))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user_id", format!("{room}/{participant}")))
    }
}

/// Email lookup answering from a map; counts its calls
#[derive(Default)]
pub struct FakeUsers {
    pub emails: HashMap<String, String>,
    pub calls: Mutex<u32>,
}

impl FakeUsers {
    pub fn with(user_id: &str, email: &str) -> Self {
        let mut emails = HashMap::new();
        emails.insert(user_id.to_string(), email.to_string());
        Self {
            emails,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl UserEmailRepository for FakeUsers {
    async fn email_by_user_id(&self, user_id: &str) -> DomainResult<String> {
        *self.calls.lock() += 1;
        self.emails
            .get(user_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("email", user_id))
    }
}

/// PBX connection recording what was sent
pub struct FakeConnection {
    pub id: String,
    pub info: Option<PbxInfo>,
    pub sent: Mutex<Vec<String>>,
    pub closed: bool,
}

impl FakeConnection {
    pub fn new(pbx: &str, domain: &str, apis: &[&str]) -> Arc<Self> {
        Self::build(pbx, domain, apis, false)
    }

    /// Connection whose sends fail
    pub fn closed(pbx: &str, domain: &str, apis: &[&str]) -> Arc<Self> {
        Self::build(pbx, domain, apis, true)
    }

    fn build(pbx: &str, domain: &str, apis: &[&str], closed: bool) -> Arc<Self> {
        Arc::new(Self {
            id: format!("conn-{pbx}"),
            info: Some(PbxInfo {
                pbx: pbx.to_string(),
                domain: domain.to_string(),
                apis: apis.iter().map(ToString::to_string).collect(),
            }),
            sent: Mutex::new(Vec::new()),
            closed,
        })
    }

    /// Sent payloads parsed as JSON
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .iter()
            .map(|payload| serde_json::from_str(payload).unwrap())
            .collect()
    }
}

#[async_trait]
impl PbxConnection for FakeConnection {
    fn connection_id(&self) -> &str {
        &self.id
    }

    fn pbx_info(&self) -> Option<PbxInfo> {
        self.info.clone()
    }

    async fn send(&self, payload: String) -> DomainResult<()> {
        if self.closed {
            return Err(DomainError::SendFailure("connection closed".to_string()));
        }
        self.sent.lock().push(payload);
        Ok(())
    }
}

/// Registry over a fixed list of connections
#[derive(Default)]
pub struct FakeRegistry {
    pub connections: Mutex<Vec<SharedConnection>>,
}

impl FakeRegistry {
    pub fn with(connections: Vec<Arc<FakeConnection>>) -> Self {
        let shared = connections
            .into_iter()
            .map(|conn| conn as SharedConnection)
            .collect();
        Self {
            connections: Mutex::new(shared),
        }
    }
}

impl ConnectionRegistry for FakeRegistry {
    fn connections(&self) -> Vec<SharedConnection> {
        self.connections.lock().clone()
    }
}
