//! Protocol version discovery

use serde::{Deserialize, Serialize};

/// One supported protocol version and its URL path segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    /// Version tag (e.g. `2025-1`)
    #[serde(rename = "dspace:version")]
    pub version: String,

    /// Path segment under which this version's endpoints live
    #[serde(rename = "dspace:path")]
    pub path: String,
}

/// Reply for the version-discovery endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ProtocolVersions")]
pub struct ProtocolVersions {
    /// JSON-LD context
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Supported versions; at least one
    #[serde(rename = "dspace:protocolVersions")]
    pub protocol_versions: Vec<ProtocolVersion>,
}

impl ProtocolVersions {
    /// Versions this connector implements
    pub fn current() -> Self {
        Self {
            context: vec![crate::DSPACE_CONTEXT.to_string()],
            protocol_versions: vec![ProtocolVersion {
                version: "2025-1".to_string(),
                path: "/2025-1".to_string(),
            }],
        }
    }
}
