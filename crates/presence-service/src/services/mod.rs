//! Presence services
//!
//! Each stage of the event pipeline is a small service borrowing the shared
//! [`ServiceContext`]; [`PresencePipeline`] strings them together.

pub mod context;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod replication;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use directory::PbxDirectory;
pub use dispatcher::PresenceDispatcher;
pub use error::{ServiceError, ServiceResult};
pub use identity::IdentityResolver;
pub use pipeline::{PipelineOutcome, PresencePipeline};
pub use replication::{DirectorySync, ReplicationEvent};

#[cfg(test)]
pub(crate) mod testing;
