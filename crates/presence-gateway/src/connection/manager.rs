//! Connection manager
//!
//! Manages all active PBX connections using DashMap for thread-safe access,
//! and exposes the identified ones as the connection registry.

use super::{Connection, Outbound};
use dashmap::DashMap;
use presence_core::{ConnectionRegistry, PbxConnection, PbxInfo, SharedConnection};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active PBX connections
pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// Next registry position handed out on PbxInfo
    next_order: AtomicU64,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_order: AtomicU64::new(1),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(&self, session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Remove a connection
    pub fn remove_connection(&self, session_id: &str) {
        if let Some((_, connection)) = self.connections.remove(session_id) {
            tracing::debug!(
                session_id = %session_id,
                location = connection.pbx_info().map(|i| i.pbx).unwrap_or_default(),
                "Connection removed"
            );
        }
    }

    /// Record PbxInfo and make the connection part of the registry
    ///
    /// The registry position is taken from the first PbxInfo; a repeated
    /// PbxInfo updates the info but keeps the position.
    pub fn identify(&self, connection: &Connection, info: PbxInfo) -> u64 {
        connection.set_pbx_info(info);
        let candidate = self.next_order.fetch_add(1, Ordering::SeqCst);
        connection.assign_order(candidate)
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of connections that sent PbxInfo
    pub fn identified_count(&self) -> usize {
        self.connections.iter().filter(|r| r.order() > 0).count()
    }

    /// Check if a session exists
    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }

    /// Identified connections in the order their PbxInfo arrived
    pub fn identified(&self) -> Vec<Arc<Connection>> {
        let mut identified: Vec<Arc<Connection>> = self
            .connections
            .iter()
            .filter(|r| r.order() > 0 && !r.is_closed())
            .map(|r| r.clone())
            .collect();
        identified.sort_by_key(|c| c.order());
        identified
    }
}

impl ConnectionRegistry for ConnectionManager {
    fn connections(&self) -> Vec<SharedConnection> {
        self.identified()
            .into_iter()
            .map(|c| c as SharedConnection)
            .collect()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("identified", &self.identified_count())
            .finish()
    }
}
