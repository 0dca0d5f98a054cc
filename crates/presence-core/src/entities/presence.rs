//! Presence command sent to a PBX connection

use serde::Serialize;

use crate::events::EventKind;
use crate::value_objects::RequestId;

/// URI scheme the presence is set for
pub const PRESENCE_URI_SCHEME: &str = "tel:";

/// Telephony presence activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Activity {
    Busy,
    Available,
}

impl Activity {
    /// Activity a room event maps to
    pub fn for_event(kind: EventKind) -> Self {
        match kind {
            EventKind::Joined => Self::Busy,
            EventKind::Left => Self::Available,
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => f.write_str("Busy"),
            Self::Available => f.write_str("Available"),
        }
    }
}

/// `SetPresence` request of the PBX API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceCommand {
    pub api: &'static str,
    pub mt: &'static str,
    pub guid: String,
    pub uri: &'static str,
    pub activity: Activity,
    pub note: String,
    pub id: RequestId,
}

impl PresenceCommand {
    /// Create a command with an explicit activity and note
    pub fn new(guid: impl Into<String>, activity: Activity, note: impl Into<String>) -> Self {
        Self {
            api: crate::entities::CAPABILITY_PBX_API,
            mt: "SetPresence",
            guid: guid.into(),
            uri: PRESENCE_URI_SCHEME,
            activity,
            note: note.into(),
            id: RequestId::now(),
        }
    }

    /// Create the command for a room event
    ///
    /// Joining sets `Busy` with the configured note, leaving clears the note
    /// and sets `Available`.
    pub fn for_event(kind: EventKind, guid: impl Into<String>, busy_note: &str) -> Self {
        let activity = Activity::for_event(kind);
        let note = match activity {
            Activity::Busy => busy_note,
            Activity::Available => "",
        };
        Self::new(guid, activity, note)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
