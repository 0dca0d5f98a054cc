//! Ports (traits) implemented by the infrastructure crates

mod ports;

pub use ports::{
    ConnectionRegistry, ParticipantLookup, PbxConnection, SharedConnection, UserEmailRepository,
};
