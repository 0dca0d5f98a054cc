//! Gateway state
//!
//! Application state for the app service server.

use crate::connection::ConnectionManager;
use presence_common::AppServiceConfig;
use presence_service::ReplicationEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Gateway application state
///
/// Holds all shared dependencies of the WebSocket handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Connection manager for PBX connections, also the connection registry
    connection_manager: Arc<ConnectionManager>,
    /// Feed consumed by the directory sync
    replication_tx: mpsc::Sender<ReplicationEvent>,
    /// Identity and password of this app service
    app_service: Arc<AppServiceConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        replication_tx: mpsc::Sender<ReplicationEvent>,
        app_service: AppServiceConfig,
    ) -> Self {
        Self {
            connection_manager,
            replication_tx,
            app_service: Arc::new(app_service),
        }
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }

    /// Get the replication feed
    pub fn replication_tx(&self) -> &mpsc::Sender<ReplicationEvent> {
        &self.replication_tx
    }

    /// Get the app service configuration
    pub fn app_service(&self) -> &AppServiceConfig {
        &self.app_service
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("app_service", &self.app_service)
            .finish()
    }
}
