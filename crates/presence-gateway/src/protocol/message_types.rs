//! App service message types
//!
//! Every message exchanged with the PBX carries its type in the `mt` field.

/// Message types understood by the app service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// PBX asks for a login challenge
    AppChallenge,
    /// Challenge handed out to the PBX (server only)
    AppChallengeResult,
    /// PBX login with digest
    AppLogin,
    /// Outcome of the login (server only)
    AppLoginResult,
    /// PBX announces its name, system domain and APIs
    PbxInfo,
    /// Replication request (server only)
    ReplicateStart,
    /// Replication accepted
    ReplicateStartResult,
    /// Request for the next replicated object (server only)
    ReplicateNext,
    /// Next replicated object, or end of the initial sync
    ReplicateNextResult,
    /// Object added after the initial sync
    ReplicateAdd,
    /// Object changed after the initial sync
    ReplicateUpdate,
    /// Object deleted
    ReplicateDel,
    /// Presence request (server only)
    SetPresence,
    /// Reply to a presence request
    SetPresenceResult,
}

impl MessageType {
    /// Parse the `mt` field
    #[must_use]
    pub fn parse(mt: &str) -> Option<Self> {
        match mt {
            "AppChallenge" => Some(Self::AppChallenge),
            "AppChallengeResult" => Some(Self::AppChallengeResult),
            "AppLogin" => Some(Self::AppLogin),
            "AppLoginResult" => Some(Self::AppLoginResult),
            "PbxInfo" => Some(Self::PbxInfo),
            "ReplicateStart" => Some(Self::ReplicateStart),
            "ReplicateStartResult" => Some(Self::ReplicateStartResult),
            "ReplicateNext" => Some(Self::ReplicateNext),
            "ReplicateNextResult" => Some(Self::ReplicateNextResult),
            "ReplicateAdd" => Some(Self::ReplicateAdd),
            "ReplicateUpdate" => Some(Self::ReplicateUpdate),
            "ReplicateDel" => Some(Self::ReplicateDel),
            "SetPresence" => Some(Self::SetPresence),
            "SetPresenceResult" => Some(Self::SetPresenceResult),
            _ => None,
        }
    }

    /// Get the wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppChallenge => "AppChallenge",
            Self::AppChallengeResult => "AppChallengeResult",
            Self::AppLogin => "AppLogin",
            Self::AppLoginResult => "AppLoginResult",
            Self::PbxInfo => "PbxInfo",
            Self::ReplicateStart => "ReplicateStart",
            Self::ReplicateStartResult => "ReplicateStartResult",
            Self::ReplicateNext => "ReplicateNext",
            Self::ReplicateNextResult => "ReplicateNextResult",
            Self::ReplicateAdd => "ReplicateAdd",
            Self::ReplicateUpdate => "ReplicateUpdate",
            Self::ReplicateDel => "ReplicateDel",
            Self::SetPresence => "SetPresence",
            Self::SetPresenceResult => "SetPresenceResult",
        }
    }

    /// Check if the PBX may send this message type
    #[must_use]
    pub const fn is_pbx_message(self) -> bool {
        !matches!(
            self,
            Self::AppChallengeResult
                | Self::AppLoginResult
                | Self::ReplicateStart
                | Self::ReplicateNext
                | Self::SetPresence
        )
    }

    /// Check if this message type may be sent before login
    #[must_use]
    pub const fn allowed_before_login(self) -> bool {
        matches!(self, Self::AppChallenge | Self::AppLogin)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
