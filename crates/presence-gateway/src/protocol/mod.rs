//! App service protocol definitions
//!
//! Defines the JSON messages exchanged with the PBX and the close codes.

mod close_codes;
mod message_types;
mod messages;
mod payloads;

pub use close_codes::CloseCode;
pub use message_types::MessageType;
pub use messages::PbxMessage;
pub use payloads::{AppLoginPayload, EmailPayload, PbxInfoPayload, ReplicatedObject};
