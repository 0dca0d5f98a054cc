//! Domain errors - the failure taxonomy of the presence pipeline
//!
//! Every per-message failure is terminal for that message only. The pipeline
//! logs it together with the event context and moves on to the next message.

use thiserror::Error;

/// Pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Decode,
    Resolve,
    Directory,
    Dispatch,
    Subscription,
}

impl std::fmt::Display for ErrorStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::Resolve => "resolve",
            Self::Directory => "directory",
            Self::Dispatch => "dispatch",
            Self::Subscription => "subscription",
        };
        f.write_str(name)
    }
}

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Decode Errors
    // =========================================================================
    #[error("Failed to parse event payload: {0}")]
    ParseError(String),

    #[error("Event payload is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    // =========================================================================
    // Resolve Errors
    // =========================================================================
    #[error("{what} not found for '{key}'")]
    LookupNotFound { what: &'static str, key: String },

    #[error("Lookup connection error: {0}")]
    LookupConnectionError(String),

    // =========================================================================
    // Directory Errors
    // =========================================================================
    #[error("No PBX subscriber with email '{email}'")]
    DirectoryMiss { email: String },

    // =========================================================================
    // Dispatch Errors
    // =========================================================================
    #[error("No PBX connection available to provide the system domain")]
    NoCanonicalConnection,

    #[error("No connection of the PBX with location '{location}'")]
    ConnectionMiss { location: String },

    #[error("Connection of PBX '{location}' does not offer capability '{capability}'")]
    CapabilityMissing {
        location: String,
        capability: &'static str,
    },

    #[error("Failed to send to PBX: {0}")]
    SendFailure(String),

    // =========================================================================
    // Subscription Errors
    // =========================================================================
    #[error("Subscription error: {0}")]
    SubscriptionError(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Create a not found error for a lookup
    pub fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::LookupNotFound {
            what,
            key: key.into(),
        }
    }

    /// Create a lookup connection error from any displayable error
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::LookupConnectionError(err.to_string())
    }

    /// Get a stable error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::ParseError(_) => "PARSE_ERROR",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::UnknownEventKind(_) => "UNKNOWN_EVENT_KIND",
            Self::LookupNotFound { .. } => "LOOKUP_NOT_FOUND",
            Self::LookupConnectionError(_) => "LOOKUP_CONNECTION_ERROR",
            Self::DirectoryMiss { .. } => "DIRECTORY_MISS",
            Self::NoCanonicalConnection => "NO_CANONICAL_CONNECTION",
            Self::ConnectionMiss { .. } => "CONNECTION_MISS",
            Self::CapabilityMissing { .. } => "CAPABILITY_MISSING",
            Self::SendFailure(_) => "SEND_FAILURE",
            Self::SubscriptionError(_) => "SUBSCRIPTION_ERROR",
        }
    }

    /// Get the pipeline stage this error belongs to
    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::ParseError(_) | Self::MissingField(_) | Self::UnknownEventKind(_) => {
                ErrorStage::Decode
            }
            Self::LookupNotFound { .. } | Self::LookupConnectionError(_) => ErrorStage::Resolve,
            Self::DirectoryMiss { .. } => ErrorStage::Directory,
            Self::NoCanonicalConnection
            | Self::ConnectionMiss { .. }
            | Self::CapabilityMissing { .. }
            | Self::SendFailure(_) => ErrorStage::Dispatch,
            Self::SubscriptionError(_) => ErrorStage::Subscription,
        }
    }

    /// Check if this is a "not found" style miss (data condition, not a fault)
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            Self::LookupNotFound { .. }
                | Self::DirectoryMiss { .. }
                | Self::NoCanonicalConnection
                | Self::ConnectionMiss { .. }
                | Self::CapabilityMissing { .. }
        )
    }
}
