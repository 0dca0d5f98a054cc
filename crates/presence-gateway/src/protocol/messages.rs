//! App service message format
//!
//! Every message is a JSON object carrying its type in `mt`, optionally the
//! `api` it belongs to and a `src` correlation id. The remaining fields
//! depend on the message type.

use super::{AppLoginPayload, MessageType, PbxInfoPayload, ReplicatedObject};
use presence_core::CAPABILITY_PBX_TABLE_USERS;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// App service message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbxMessage {
    /// Message type
    pub mt: String,

    /// API the message belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,

    /// Correlation id, echoed in results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Message type specific fields
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl PbxMessage {
    /// Create an empty message of the given type
    #[must_use]
    pub fn new(mt: MessageType) -> Self {
        Self {
            mt: mt.as_str().to_string(),
            api: None,
            src: None,
            body: Map::new(),
        }
    }

    /// Set the `api` field
    #[must_use]
    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = Some(api.into());
        self
    }

    /// Set the `src` field
    #[must_use]
    pub fn with_src(mut self, src: Option<String>) -> Self {
        self.src = src;
        self
    }

    /// Add a body field
    #[must_use]
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    // === Server Messages ===

    /// Create an `AppChallengeResult`
    #[must_use]
    pub fn challenge_result(challenge: &str, src: Option<String>) -> Self {
        Self::new(MessageType::AppChallengeResult)
            .with_src(src)
            .with_field("challenge", Value::String(challenge.to_string()))
    }

    /// Create an `AppLoginResult`
    #[must_use]
    pub fn login_result(ok: bool, src: Option<String>) -> Self {
        Self::new(MessageType::AppLoginResult)
            .with_src(src)
            .with_field("ok", Value::Bool(ok))
    }

    /// Create a `ReplicateNext` request
    #[must_use]
    pub fn replicate_next(src: Option<String>) -> Self {
        Self::new(MessageType::ReplicateNext)
            .with_api(CAPABILITY_PBX_TABLE_USERS)
            .with_src(src)
    }

    // === Parsing PBX Messages ===

    /// Get the parsed message type
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::parse(&self.mt)
    }

    /// Try to parse as an `AppLogin` payload
    pub fn as_login(&self) -> Option<AppLoginPayload> {
        if self.message_type() != Some(MessageType::AppLogin) {
            return None;
        }
        self.body_as()
    }

    /// Try to parse as a `PbxInfo` payload
    pub fn as_pbx_info(&self) -> Option<PbxInfoPayload> {
        if self.message_type() != Some(MessageType::PbxInfo) {
            return None;
        }
        self.body_as()
    }

    /// Try to parse the replicated object under `columns`
    ///
    /// Returns `None` when the message carries no object, which ends the
    /// initial replication for `ReplicateNextResult`.
    pub fn as_replicated_object(&self) -> Option<ReplicatedObject> {
        self.body
            .get("columns")
            .filter(|c| c.is_object())
            .and_then(|c| serde_json::from_value(c.clone()).ok())
    }

    /// Check whether a `columns` object is present at all
    #[must_use]
    pub fn has_columns(&self) -> bool {
        self.body.get("columns").is_some_and(Value::is_object)
    }

    fn body_as<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.body.clone())).ok()
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for PbxMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PbxMessage(mt={}", self.mt)?;
        if let Some(api) = &self.api {
            write!(f, ", api={api}")?;
        }
        write!(f, ")")
    }
}
