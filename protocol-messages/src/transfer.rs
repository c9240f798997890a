//! Transfer-process protocol messages
//!
//! Message shapes for the transfer state machine, the data-address endpoint
//! descriptor, the `TransferProcess` acknowledgement and the JSON-LD error
//! reply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transfer-process states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferState {
    /// Consumer requested the transfer
    Requested,
    /// Provider started moving data
    Started,
    /// Transfer finished (terminal)
    Completed,
    /// Transfer paused by either party
    Suspended,
    /// Transfer aborted (terminal)
    Terminated,
}

impl TransferState {
    /// Whether the state has no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Terminated)
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Requested => "REQUESTED",
            TransferState::Started => "STARTED",
            TransferState::Completed => "COMPLETED",
            TransferState::Suspended => "SUSPENDED",
            TransferState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named property on a data address (auth tokens, headers, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointProperty {
    /// Property name
    #[serde(rename = "dspace:name")]
    pub name: String,

    /// Property value
    #[serde(rename = "dspace:value")]
    pub value: String,
}

/// Transport-specific endpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAddress {
    /// Endpoint type (e.g. `HttpData`, `S3`)
    #[serde(rename = "dspace:endpointType")]
    pub endpoint_type: String,

    /// Endpoint URL or address
    #[serde(rename = "dspace:endpoint", default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Additional endpoint properties
    #[serde(
        rename = "dspace:endpointProperties",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub endpoint_properties: Vec<EndpointProperty>,
}

/// Initiates a transfer for a finalized agreement (sent by Consumer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferRequestMessage")]
pub struct TransferRequestMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id; never set on creation
    #[serde(rename = "dspace:providerPid", default, skip_serializing_if = "Option::is_none")]
    pub provider_pid: Option<String>,

    /// Agreement the transfer executes; must reference a finalized negotiation
    #[serde(rename = "dspace:agreementId")]
    pub agreement_id: String,

    /// Requested data format
    #[serde(rename = "dct:format", default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Consumer data address for push transfers
    #[serde(rename = "dspace:dataAddress", default, skip_serializing_if = "Option::is_none")]
    pub data_address: Option<DataAddress>,

    /// Consumer callback URL
    #[serde(rename = "dspace:callbackAddress")]
    pub callback_address: String,
}

/// Provider signals the transfer has started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferStartMessage")]
pub struct TransferStartMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Provider endpoint for pull transfers
    #[serde(rename = "dspace:dataAddress", default, skip_serializing_if = "Option::is_none")]
    pub data_address: Option<DataAddress>,
}

/// Either party signals successful completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferCompletionMessage")]
pub struct TransferCompletionMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,
}

/// Either party suspends a running transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferSuspensionMessage")]
pub struct TransferSuspensionMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Optional suspension code
    #[serde(rename = "dspace:code", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Optional suspension reasons
    #[serde(rename = "dspace:reason", default, skip_serializing_if = "Vec::is_empty")]
    pub reason: Vec<serde_json::Value>,
}

/// Either party terminates the transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferTerminationMessage")]
pub struct TransferTerminationMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Optional termination code
    #[serde(rename = "dspace:code", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Optional termination reasons
    #[serde(rename = "dspace:reason", default, skip_serializing_if = "Vec::is_empty")]
    pub reason: Vec<serde_json::Value>,
}

/// Union of every inbound transfer message
#[derive(Debug, Clone, PartialEq)]
pub enum TransferMessage {
    /// Transfer request (creates the process)
    Request(TransferRequestMessage),
    /// Transfer start
    Start(TransferStartMessage),
    /// Transfer completion
    Completion(TransferCompletionMessage),
    /// Transfer suspension
    Suspension(TransferSuspensionMessage),
    /// Transfer termination
    Termination(TransferTerminationMessage),
}

impl TransferMessage {
    /// Short message-type name for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            TransferMessage::Request(_) => "TransferRequestMessage",
            TransferMessage::Start(_) => "TransferStartMessage",
            TransferMessage::Completion(_) => "TransferCompletionMessage",
            TransferMessage::Suspension(_) => "TransferSuspensionMessage",
            TransferMessage::Termination(_) => "TransferTerminationMessage",
        }
    }

    /// Consumer process id carried by the message
    pub fn consumer_pid(&self) -> &str {
        match self {
            TransferMessage::Request(m) => &m.consumer_pid,
            TransferMessage::Start(m) => &m.consumer_pid,
            TransferMessage::Completion(m) => &m.consumer_pid,
            TransferMessage::Suspension(m) => &m.consumer_pid,
            TransferMessage::Termination(m) => &m.consumer_pid,
        }
    }

    /// Provider process id carried by the message, if any
    pub fn provider_pid(&self) -> Option<&str> {
        match self {
            TransferMessage::Request(m) => m.provider_pid.as_deref(),
            TransferMessage::Start(m) => Some(&m.provider_pid),
            TransferMessage::Completion(m) => Some(&m.provider_pid),
            TransferMessage::Suspension(m) => Some(&m.provider_pid),
            TransferMessage::Termination(m) => Some(&m.provider_pid),
        }
    }
}

/// Acknowledgement returned on successful state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferProcess")]
pub struct TransferProcessAck {
    /// JSON-LD context
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Transfer id (the provider process id)
    #[serde(rename = "@id")]
    pub id: String,

    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Current transfer state
    #[serde(rename = "dspace:state")]
    pub state: TransferState,
}

/// JSON-LD error reply for the transfer endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:TransferError")]
pub struct TransferError {
    /// JSON-LD context
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Consumer process id, when known
    #[serde(rename = "dspace:consumerPid", default, skip_serializing_if = "Option::is_none")]
    pub consumer_pid: Option<String>,

    /// Provider process id, when known
    #[serde(rename = "dspace:providerPid", default, skip_serializing_if = "Option::is_none")]
    pub provider_pid: Option<String>,

    /// Error code
    #[serde(rename = "dspace:code", default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable reasons
    #[serde(rename = "dspace:reason", default, skip_serializing_if = "Vec::is_empty")]
    pub reason: Vec<serde_json::Value>,
}
