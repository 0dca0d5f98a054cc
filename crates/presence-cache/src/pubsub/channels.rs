//! Signaling key and channel definitions.
//!
//! Defines the naming conventions the conferencing signaling service uses for
//! its Redis keys and pub/sub channels.

/// Namespace used by the signaling service unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "k3k-signaling";

/// Key and channel names under one signaling namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalingKeys {
    namespace: String,
}

impl SignalingKeys {
    /// Create keys for a namespace
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Pattern matching the participant event channel of every room
    #[must_use]
    pub fn event_pattern(&self) -> String {
        format!("{}:room=*:participant=*:participant:event", self.namespace)
    }

    /// Hash mapping the participants of a room to their user ids
    #[must_use]
    pub fn participant_user_key(&self, room: &str) -> String {
        format!(
            "{}:room={room}:participants:attributes:user_id",
            self.namespace
        )
    }
}

impl Default for SignalingKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl From<&presence_common::SignalingConfig> for SignalingKeys {
    fn from(config: &presence_common::SignalingConfig) -> Self {
        Self::new(config.namespace.clone())
    }
}
