//! Directory replication
//!
//! Applies the notifications of the PBX user table replication to the
//! directory. Runs concurrently with the event pipeline for the lifetime of
//! the process.

use std::sync::Arc;
use tokio::sync::mpsc;

use presence_core::{
    DomainError, DomainResult, ReplicateStart, SharedConnection, SubscriberRecord,
    CAPABILITY_PBX_TABLE_USERS,
};

use super::directory::PbxDirectory;

/// Notification of the replication feed
pub enum ReplicationEvent {
    /// A PBX connection identified itself; a full sync may be requested
    Connected(SharedConnection),
    /// The initial sync of a PBX finished with this snapshot
    InitialDone {
        location: String,
        records: Vec<SubscriberRecord>,
    },
    /// A subscriber was added after the initial sync
    Added {
        location: String,
        record: SubscriberRecord,
    },
    /// A subscriber changed after the initial sync
    Updated {
        location: String,
        record: SubscriberRecord,
    },
    /// A subscriber was deleted
    Deleted { guid: String },
}

impl std::fmt::Debug for ReplicationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected(conn) => f
                .debug_tuple("Connected")
                .field(&conn.connection_id())
                .finish(),
            Self::InitialDone { location, records } => f
                .debug_struct("InitialDone")
                .field("location", location)
                .field("records", &records.len())
                .finish(),
            Self::Added { location, record } => f
                .debug_struct("Added")
                .field("location", location)
                .field("guid", &record.guid)
                .finish(),
            Self::Updated { location, record } => f
                .debug_struct("Updated")
                .field("location", location)
                .field("guid", &record.guid)
                .finish(),
            Self::Deleted { guid } => f.debug_struct("Deleted").field("guid", guid).finish(),
        }
    }
}

/// Consumer of the replication feed
#[derive(Debug, Clone)]
pub struct DirectorySync {
    directory: Arc<PbxDirectory>,
}

impl DirectorySync {
    pub fn new(directory: Arc<PbxDirectory>) -> Self {
        Self { directory }
    }

    /// Apply one notification
    pub async fn apply(&self, event: ReplicationEvent) -> DomainResult<()> {
        match event {
            ReplicationEvent::Connected(conn) => Self::request_sync(&conn).await,
            ReplicationEvent::InitialDone { location, records } => {
                let count = records.len();
                let dropped = self.directory.replace_source(&location, records);
                tracing::info!(
                    pbx = %location,
                    users = count,
                    dropped,
                    "Finished syncing PBX users"
                );
                Ok(())
            }
            ReplicationEvent::Added { location, record } => {
                tracing::debug!(pbx = %location, guid = %record.guid, "PBX user added");
                self.directory.upsert_from(location, record.guid.clone(), record);
                Ok(())
            }
            ReplicationEvent::Updated { location, record } => {
                tracing::debug!(pbx = %location, guid = %record.guid, "PBX user updated");
                self.directory.upsert_from(location, record.guid.clone(), record);
                Ok(())
            }
            ReplicationEvent::Deleted { guid } => {
                let existed = self.directory.remove(&guid);
                tracing::debug!(guid = %guid, existed, "PBX user deleted");
                Ok(())
            }
        }
    }

    /// Ask a freshly identified PBX for its complete user table
    async fn request_sync(conn: &SharedConnection) -> DomainResult<()> {
        let Some(info) = conn.pbx_info() else {
            return Ok(());
        };
        if !info.has_api(CAPABILITY_PBX_TABLE_USERS) {
            tracing::debug!(pbx = %info.pbx, "PBX does not replicate its user table");
            return Ok(());
        }

        let payload = ReplicateStart::full()
            .to_json()
            .map_err(|e| DomainError::SendFailure(e.to_string()))?;
        conn.send(payload).await?;

        tracing::info!(pbx = %info.pbx, "Requested replication of PBX users");
        Ok(())
    }

    /// Apply notifications until the feed closes
    pub async fn run(self, mut rx: mpsc::Receiver<ReplicationEvent>) {
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.apply(event).await {
                tracing::warn!(code = e.code(), error = %e, "Failed to apply replication event");
            }
        }
        tracing::info!("Replication feed closed");
    }
}
