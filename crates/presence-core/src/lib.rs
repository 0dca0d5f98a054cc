//! # presence-core
//!
//! Domain layer for the room-to-PBX presence bridge: inbound room events and
//! their decoder, PBX subscriber records, presence commands, the error
//! taxonomy, and the ports implemented by the infrastructure crates.
//! This crate performs no I/O.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Activity, EmailEntry, PbxInfo, PresenceCommand, ReplicateStart, SubscriberRecord,
    CAPABILITY_PBX_API, CAPABILITY_PBX_TABLE_USERS, PRESENCE_URI_SCHEME,
};
pub use error::{DomainError, DomainResult, ErrorStage};
pub use events::{DomainEvent, EventDecoder, EventKind, RawEvent, RoomEvent};
pub use traits::{
    ConnectionRegistry, ParticipantLookup, PbxConnection, SharedConnection, UserEmailRepository,
};
pub use value_objects::RequestId;
