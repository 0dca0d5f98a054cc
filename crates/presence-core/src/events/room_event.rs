//! Room event types
//!
//! A broker message goes through three shapes: the untyped [`RawEvent`], the
//! validated [`RoomEvent`], and the fully resolved [`DomainEvent`] that
//! carries the participant's user id and email.

use serde::Deserialize;
use std::str::FromStr;

use crate::error::DomainError;

/// Untyped broker payload
///
/// Absent fields decode to empty strings so they are reported as missing
/// rather than as a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub room: String,
    pub participant: String,
    pub event: String,
}

/// Kind of room event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Joined,
    Left,
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined" => Ok(Self::Joined),
            "left" => Ok(Self::Left),
            other => Err(DomainError::UnknownEventKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Joined => f.write_str("joined"),
            Self::Left => f.write_str("left"),
        }
    }
}

/// Validated room event, not yet resolved to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEvent {
    pub kind: EventKind,
    pub room: String,
    pub participant_id: String,
}

impl RoomEvent {
    /// Attach the resolved identity, producing the final domain event
    pub fn resolved(self, user_id: impl Into<String>, email: impl Into<String>) -> DomainEvent {
        DomainEvent {
            kind: self.kind,
            room: self.room,
            participant_id: self.participant_id,
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

/// Fully resolved room event, consumed by the presence dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEvent {
    pub kind: EventKind,
    pub room: String,
    pub participant_id: String,
    pub user_id: String,
    pub email: String,
}
