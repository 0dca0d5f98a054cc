//! Individual PBX connection
//!
//! Represents a single WebSocket connection from a PBX and its state.

use crate::protocol::CloseCode;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use presence_core::{DomainError, DomainResult, PbxConnection, PbxInfo, SubscriberRecord};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Connection established, waiting for AppLogin
    Connecting,
    /// Login verified
    Authenticated,
    /// Connection is being closed
    Disconnecting,
}

/// Frame queued for the WebSocket writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// JSON text frame
    Message(String),
    /// Close the socket with this code
    Close(CloseCode),
}

/// A single PBX connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Current connection state
    state: RwLock<ConnectionState>,

    /// Challenge handed out by AppChallengeResult
    challenge: Mutex<Option<String>>,

    /// PbxInfo announced after login
    pbx_info: RwLock<Option<PbxInfo>>,

    /// Position in the registry, 0 until PbxInfo was received
    order: AtomicU64,

    /// Records of the initial replication, not yet applied
    staged: Mutex<Vec<SubscriberRecord>>,

    /// Channel to send frames to the WebSocket
    sender: mpsc::Sender<Outbound>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            state: RwLock::new(ConnectionState::Connecting),
            challenge: Mutex::new(None),
            pbx_info: RwLock::new(None),
            order: AtomicU64::new(0),
            staged: Mutex::new(Vec::new()),
            sender,
            created_at: Instant::now(),
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Set the connection state
    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Check if the login was verified
    pub fn is_authenticated(&self) -> bool {
        self.state() == ConnectionState::Authenticated
    }

    /// Remember the challenge handed out to the PBX
    pub fn set_challenge(&self, challenge: String) {
        *self.challenge.lock() = Some(challenge);
    }

    /// Take the challenge; each challenge is good for one login attempt
    pub fn take_challenge(&self) -> Option<String> {
        self.challenge.lock().take()
    }

    /// Record the PbxInfo of this connection
    pub fn set_pbx_info(&self, info: PbxInfo) {
        *self.pbx_info.write() = Some(info);
    }

    /// Get the registry position (0 if not registered)
    pub fn order(&self) -> u64 {
        self.order.load(Ordering::SeqCst)
    }

    /// Assign the registry position once; later calls keep the first one
    pub(crate) fn assign_order(&self, order: u64) -> u64 {
        match self
            .order
            .compare_exchange(0, order, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => order,
            Err(existing) => existing,
        }
    }

    /// Stage one record of the initial replication
    pub fn stage_record(&self, record: SubscriberRecord) {
        self.staged.lock().push(record);
    }

    /// Take all staged records
    pub fn take_staged(&self) -> Vec<SubscriberRecord> {
        std::mem::take(&mut *self.staged.lock())
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Queue a text frame
    pub async fn send_text(&self, text: String) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Message(text)).await
    }

    /// Queue a close frame
    pub async fn close(&self, code: CloseCode) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.set_state(ConnectionState::Disconnecting);
        self.sender.send(Outbound::Close(code)).await
    }

    /// Check if the sender channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl PbxConnection for Connection {
    fn connection_id(&self) -> &str {
        &self.session_id
    }

    fn pbx_info(&self) -> Option<PbxInfo> {
        self.pbx_info.read().clone()
    }

    async fn send(&self, payload: String) -> DomainResult<()> {
        self.send_text(payload).await.map_err(|_| {
            DomainError::SendFailure(format!("connection {} is closed", self.session_id))
        })
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .field("order", &self.order())
            .field("created_at", &self.created_at)
            .finish()
    }
}
