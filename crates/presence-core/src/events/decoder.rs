//! Event decoder - turns a raw broker payload into a [`RoomEvent`]
//!
//! Validation order: schema, `event`, `room`, `participant`, event kind.
//! The first failing rule decides the error.

use super::{EventKind, RawEvent, RoomEvent};
use crate::error::{DomainError, DomainResult};

/// Stateless decoder for broker payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDecoder;

impl EventDecoder {
    /// Decode and validate a payload
    pub fn decode(payload: &str) -> DomainResult<RoomEvent> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| DomainError::ParseError(e.to_string()))?;
        if !value.is_object() {
            return Err(DomainError::ParseError(
                "payload is not a JSON object".to_string(),
            ));
        }

        let raw: RawEvent =
            serde_json::from_value(value).map_err(|e| DomainError::ParseError(e.to_string()))?;
        Self::validate(raw)
    }

    /// Validate an already parsed payload
    pub fn validate(raw: RawEvent) -> DomainResult<RoomEvent> {
        if raw.event.is_empty() {
            return Err(DomainError::MissingField("event"));
        }
        if raw.room.is_empty() {
            return Err(DomainError::MissingField("room"));
        }
        if raw.participant.is_empty() {
            return Err(DomainError::MissingField("participant"));
        }

        let kind: EventKind = raw.event.parse()?;

        Ok(RoomEvent {
            kind,
            room: raw.room,
            participant_id: raw.participant,
        })
    }
}
