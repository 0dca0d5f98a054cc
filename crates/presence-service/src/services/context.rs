//! Service context - dependency container for services
//!
//! Holds the lookups, the directory, the connection registry and the presence
//! settings needed by the pipeline stages.

use std::sync::Arc;

use presence_core::{ConnectionRegistry, ParticipantLookup, UserEmailRepository};

use super::directory::PbxDirectory;
use super::error::{ServiceError, ServiceResult};

/// Note sent with `Busy` unless configured otherwise
pub const DEFAULT_BUSY_NOTE: &str = "Free Version / Opentalk Meeting";

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Lookups
    participants: Arc<dyn ParticipantLookup>,
    users: Arc<dyn UserEmailRepository>,

    // PBX side
    directory: Arc<PbxDirectory>,
    registry: Arc<dyn ConnectionRegistry>,

    // Settings
    busy_note: Arc<str>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        participants: Arc<dyn ParticipantLookup>,
        users: Arc<dyn UserEmailRepository>,
        directory: Arc<PbxDirectory>,
        registry: Arc<dyn ConnectionRegistry>,
        busy_note: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            participants,
            users,
            directory,
            registry,
            busy_note: busy_note.into(),
        }
    }

    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Get the participant → user lookup
    pub fn participants(&self) -> &dyn ParticipantLookup {
        self.participants.as_ref()
    }

    /// Get the user → email lookup
    pub fn users(&self) -> &dyn UserEmailRepository {
        self.users.as_ref()
    }

    /// Get the PBX directory
    pub fn directory(&self) -> &Arc<PbxDirectory> {
        &self.directory
    }

    /// Get the registry of PBX connections
    pub fn registry(&self) -> &dyn ConnectionRegistry {
        self.registry.as_ref()
    }

    /// Note sent when a subscriber becomes busy
    pub fn busy_note(&self) -> &str {
        &self.busy_note
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("lookups", &"...")
            .field("directory_size", &self.directory.len())
            .field("busy_note", &self.busy_note)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    participants: Option<Arc<dyn ParticipantLookup>>,
    users: Option<Arc<dyn UserEmailRepository>>,
    directory: Option<Arc<PbxDirectory>>,
    registry: Option<Arc<dyn ConnectionRegistry>>,
    busy_note: String,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            participants: None,
            users: None,
            directory: None,
            registry: None,
            busy_note: DEFAULT_BUSY_NOTE.to_string(),
        }
    }

    pub fn participants(mut self, lookup: Arc<dyn ParticipantLookup>) -> Self {
        self.participants = Some(lookup);
        self
    }

    pub fn users(mut self, repo: Arc<dyn UserEmailRepository>) -> Self {
        self.users = Some(repo);
        self
    }

    pub fn directory(mut self, directory: Arc<PbxDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn ConnectionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn busy_note(mut self, note: impl Into<String>) -> Self {
        self.busy_note = note.into();
        self
    }

    /// Build the ServiceContext
    ///
    /// The directory defaults to an empty one.
    ///
    /// # Errors
    /// Returns `ServiceError::MissingDependency` if a lookup or the registry
    /// is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.participants
                .ok_or(ServiceError::MissingDependency("participants"))?,
            self.users.ok_or(ServiceError::MissingDependency("users"))?,
            self.directory.unwrap_or_default(),
            self.registry
                .ok_or(ServiceError::MissingDependency("registry"))?,
            self.busy_note,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
