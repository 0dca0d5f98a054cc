//! PBX payload definitions
//!
//! Defines the payload structures of messages sent by the PBX.

use presence_common::LoginParams;
use presence_core::{EmailEntry, PbxInfo, SubscriberRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of `AppLogin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppLoginPayload {
    pub app: String,
    pub domain: String,
    pub sip: String,
    pub guid: String,
    pub dn: String,
    pub digest: String,

    /// Opaque login info, part of the digest input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

impl AppLoginPayload {
    /// Text form of `info` as it enters the digest
    ///
    /// Strings are taken as they are, a missing or null value is empty and
    /// anything else is its compact JSON encoding.
    #[must_use]
    pub fn info_text(&self) -> String {
        match &self.info {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Digest inputs for a login against `challenge`
    #[must_use]
    pub fn login_params<'a>(&'a self, info: &'a str, challenge: &'a str) -> LoginParams<'a> {
        LoginParams {
            app: &self.app,
            domain: &self.domain,
            sip: &self.sip,
            guid: &self.guid,
            dn: &self.dn,
            info,
            challenge,
        }
    }
}

/// Payload of `PbxInfo`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PbxInfoPayload {
    /// Location name of the PBX
    pub pbx: String,

    /// System domain of the PBX
    #[serde(default)]
    pub domain: String,

    /// APIs the PBX offers on this connection
    #[serde(default)]
    pub apis: Vec<String>,
}

impl From<PbxInfoPayload> for PbxInfo {
    fn from(payload: PbxInfoPayload) -> Self {
        Self {
            pbx: payload.pbx,
            domain: payload.domain,
            apis: payload.apis,
        }
    }
}

/// One email of a replicated user object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPayload {
    #[serde(default)]
    pub email: String,
}

/// User object of the `PbxTableUsers` replication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicatedObject {
    pub guid: String,

    #[serde(default)]
    pub cn: Option<String>,

    /// Telephony identity
    #[serde(default)]
    pub h323: String,

    #[serde(default)]
    pub e164: Option<String>,

    /// Location the user is registered at
    #[serde(default)]
    pub loc: String,

    #[serde(default)]
    pub emails: Vec<EmailPayload>,
}

impl From<ReplicatedObject> for SubscriberRecord {
    fn from(obj: ReplicatedObject) -> Self {
        let emails = obj
            .emails
            .into_iter()
            .filter(|e| !e.email.is_empty())
            .map(|e| EmailEntry::new(e.email))
            .collect();

        Self::new(obj.guid, emails, obj.loc, obj.h323)
    }
}
