//! PBX identity and replication requests

use serde::Serialize;
use serde_json::{Map, Value};

use crate::value_objects::RequestId;

/// API a connection must offer to accept presence commands
pub const CAPABILITY_PBX_API: &str = "PbxApi";
/// API a connection must offer to replicate the user table
pub const CAPABILITY_PBX_TABLE_USERS: &str = "PbxTableUsers";

/// Columns requested when replicating the user table
const REPLICATED_COLUMNS: &[&str] = &["guid", "cn", "h323", "e164", "loc", "emails"];

/// Identity a PBX announces for its connection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PbxInfo {
    /// PBX name, the `locationId` subscribers refer to
    pub pbx: String,
    /// System domain used to qualify bare email entries
    pub domain: String,
    /// APIs (capabilities) offered on the connection
    pub apis: Vec<String>,
}

impl PbxInfo {
    /// Check if the connection offers an API
    pub fn has_api(&self, api: &str) -> bool {
        self.apis.iter().any(|a| a == api)
    }
}

/// `ReplicateStart` request of the user-table replication
#[derive(Debug, Clone, Serialize)]
pub struct ReplicateStart {
    pub api: &'static str,
    pub mt: &'static str,
    pub add: bool,
    pub del: bool,
    pub columns: Map<String, Value>,
    pub pseudo: Vec<&'static str>,
    pub src: RequestId,
}

impl ReplicateStart {
    /// Request a full replication including adds and deletes
    pub fn full() -> Self {
        let columns = REPLICATED_COLUMNS
            .iter()
            .map(|c| ((*c).to_string(), Value::Object(Map::new())))
            .collect();

        Self {
            api: CAPABILITY_PBX_TABLE_USERS,
            mt: "ReplicateStart",
            add: true,
            del: true,
            columns,
            pseudo: vec!["", "executive"],
            src: RequestId::now(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
