//! # presence-service
//!
//! Application layer of the presence bridge: resolves room participants to
//! email addresses, looks them up in the replicated PBX directory and sends
//! the matching presence to the PBX.

pub mod services;

pub use services::{
    DirectorySync, IdentityResolver, PbxDirectory, PipelineOutcome, PresenceDispatcher,
    PresencePipeline, ReplicationEvent, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
