//! Room events - inbound join/leave notifications of the conferencing system

mod decoder;
mod room_event;

pub use decoder::EventDecoder;
pub use room_event::{DomainEvent, EventKind, RawEvent, RoomEvent};
