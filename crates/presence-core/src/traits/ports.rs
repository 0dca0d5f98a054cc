//! Ports for the external collaborators of the presence pipeline
//!
//! The domain defines what it needs; the cache, database and gateway crates
//! provide the implementations. Implementations map their transport errors
//! to [`DomainError::LookupNotFound`], [`DomainError::LookupConnectionError`]
//! or [`DomainError::SendFailure`].
//!
//! [`DomainError::LookupNotFound`]: crate::error::DomainError::LookupNotFound
//! [`DomainError::LookupConnectionError`]: crate::error::DomainError::LookupConnectionError
//! [`DomainError::SendFailure`]: crate::error::DomainError::SendFailure

use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::PbxInfo;
use crate::error::DomainResult;

// ============================================================================
// Identity lookups
// ============================================================================

/// Participant → user id lookup (key-value store)
#[async_trait]
pub trait ParticipantLookup: Send + Sync {
    /// Resolve a participant of a room to the conferencing user id
    async fn user_id(&self, room: &str, participant: &str) -> DomainResult<String>;
}

/// User id → email lookup (relational store)
#[async_trait]
pub trait UserEmailRepository: Send + Sync {
    /// Get the email address of a user
    async fn email_by_user_id(&self, user_id: &str) -> DomainResult<String>;
}

// ============================================================================
// PBX connections
// ============================================================================

/// Live channel to one PBX instance
#[async_trait]
pub trait PbxConnection: Send + Sync {
    /// Opaque id of the connection
    fn connection_id(&self) -> &str;

    /// PBX identity, `None` until the PBX has announced itself
    fn pbx_info(&self) -> Option<PbxInfo>;

    /// Queue a JSON message for the PBX
    async fn send(&self, payload: String) -> DomainResult<()>;
}

/// Shared handle to a PBX connection
pub type SharedConnection = Arc<dyn PbxConnection>;

/// Registry of the live PBX connections
pub trait ConnectionRegistry: Send + Sync {
    /// Identified connections, in the order they registered
    fn connections(&self) -> Vec<SharedConnection>;
}
