//! Contract-negotiation protocol messages
//!
//! Message shapes for the negotiation state machine, the `ContractNegotiation`
//! acknowledgement returned on successful transitions, and the JSON-LD error
//! reply. State values serialize as bare upper-case strings.

use crate::odrl::{Agreement, Offer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract-negotiation process states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NegotiationState {
    /// Consumer requested a contract
    Requested,
    /// Provider made or countered an offer
    Offered,
    /// Consumer accepted the last offer
    Accepted,
    /// Provider entered the agreement
    Agreed,
    /// Consumer verified the agreement
    Verified,
    /// Provider finalized the negotiation (terminal)
    Finalized,
    /// Either party terminated the negotiation (terminal)
    Terminated,
}

impl NegotiationState {
    /// Whether the state has no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Finalized | NegotiationState::Terminated)
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationState::Requested => "REQUESTED",
            NegotiationState::Offered => "OFFERED",
            NegotiationState::Accepted => "ACCEPTED",
            NegotiationState::Agreed => "AGREED",
            NegotiationState::Verified => "VERIFIED",
            NegotiationState::Finalized => "FINALIZED",
            NegotiationState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event carried by a [`ContractNegotiationEventMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NegotiationEventType {
    /// Consumer accepts the current offer
    Accepted,
    /// Provider finalizes the verified agreement
    Finalized,
}

/// Initiates a negotiation or counters a provider offer (sent by Consumer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractRequestMessage")]
pub struct ContractRequestMessage {
    /// Consumer process id; required on the initial request
    #[serde(rename = "dspace:consumerPid", default, skip_serializing_if = "Option::is_none")]
    pub consumer_pid: Option<String>,

    /// Provider process id; present only on a counter-request
    #[serde(rename = "dspace:providerPid", default, skip_serializing_if = "Option::is_none")]
    pub provider_pid: Option<String>,

    /// Offer under request; must name its target dataset
    #[serde(rename = "dspace:offer")]
    pub offer: Offer,

    /// Consumer callback URL for asynchronous replies
    #[serde(rename = "dspace:callbackAddress")]
    pub callback_address: String,
}

/// Provider offer or counter-offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractOfferMessage")]
pub struct ContractOfferMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid", default, skip_serializing_if = "Option::is_none")]
    pub consumer_pid: Option<String>,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Offer under proposal; must name its target dataset
    #[serde(rename = "dspace:offer")]
    pub offer: Offer,

    /// Provider callback URL
    #[serde(rename = "dspace:callbackAddress", default, skip_serializing_if = "Option::is_none")]
    pub callback_address: Option<String>,
}

/// Provider confirms the agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractAgreementMessage")]
pub struct ContractAgreementMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Complete agreement
    #[serde(rename = "dspace:agreement")]
    pub agreement: Agreement,

    /// Provider callback URL
    #[serde(rename = "dspace:callbackAddress", default, skip_serializing_if = "Option::is_none")]
    pub callback_address: Option<String>,
}

/// Consumer verifies the agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractAgreementVerificationMessage")]
pub struct ContractAgreementVerificationMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,
}

/// State-transition event (ACCEPTED by Consumer, FINALIZED by Provider)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractNegotiationEventMessage")]
pub struct ContractNegotiationEventMessage {
    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Event being signalled
    #[serde(rename = "dspace:eventType")]
    pub event_type: NegotiationEventType,
}

/// Terminates the negotiation (either party)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractNegotiationTerminationMessage")]
pub struct ContractNegotiationTerminationMessage {
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

/// Union of every inbound negotiation message
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationMessage {
    /// Contract request (create or counter)
    Request(ContractRequestMessage),
    /// Provider offer
    Offer(ContractOfferMessage),
    /// Provider agreement
    Agreement(ContractAgreementMessage),
    /// Consumer verification
    Verification(ContractAgreementVerificationMessage),
    /// ACCEPTED/FINALIZED event
    Event(ContractNegotiationEventMessage),
    /// Termination
    Termination(ContractNegotiationTerminationMessage),
}

impl NegotiationMessage {
    /// Short message-type name for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationMessage::Request(_) => "ContractRequestMessage",
            NegotiationMessage::Offer(_) => "ContractOfferMessage",
            NegotiationMessage::Agreement(_) => "ContractAgreementMessage",
            NegotiationMessage::Verification(_) => "ContractAgreementVerificationMessage",
            NegotiationMessage::Event(msg) => match msg.event_type {
                NegotiationEventType::Accepted => "ContractNegotiationEventMessage[ACCEPTED]",
                NegotiationEventType::Finalized => "ContractNegotiationEventMessage[FINALIZED]",
            },
            NegotiationMessage::Termination(_) => "ContractNegotiationTerminationMessage",
        }
    }

    /// Consumer process id carried by the message, if any
    pub fn consumer_pid(&self) -> Option<&str> {
        match self {
            NegotiationMessage::Request(m) => m.consumer_pid.as_deref(),
            NegotiationMessage::Offer(m) => m.consumer_pid.as_deref(),
            NegotiationMessage::Agreement(m) => Some(&m.consumer_pid),
            NegotiationMessage::Verification(m) => Some(&m.consumer_pid),
            NegotiationMessage::Event(m) => Some(&m.consumer_pid),
            NegotiationMessage::Termination(m) => Some(&m.consumer_pid),
        }
    }

    /// Provider process id carried by the message, if any
    pub fn provider_pid(&self) -> Option<&str> {
        match self {
            NegotiationMessage::Request(m) => m.provider_pid.as_deref(),
            NegotiationMessage::Offer(m) => Some(&m.provider_pid),
            NegotiationMessage::Agreement(m) => Some(&m.provider_pid),
            NegotiationMessage::Verification(m) => Some(&m.provider_pid),
            NegotiationMessage::Event(m) => Some(&m.provider_pid),
            NegotiationMessage::Termination(m) => Some(&m.provider_pid),
        }
    }
}

/// Acknowledgement returned on successful state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractNegotiation")]
pub struct ContractNegotiation {
    /// JSON-LD context
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Negotiation id (the provider process id)
    #[serde(rename = "@id")]
    pub id: String,

    /// Consumer process id
    #[serde(rename = "dspace:consumerPid")]
    pub consumer_pid: String,

    /// Provider process id
    #[serde(rename = "dspace:providerPid")]
    pub provider_pid: String,

    /// Current negotiation state
    #[serde(rename = "dspace:state")]
    pub state: NegotiationState,
}

/// JSON-LD error reply for the negotiation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:ContractNegotiationError")]
pub struct ContractNegotiationError {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(NegotiationState::Finalized.is_terminal());
        assert!(NegotiationState::Terminated.is_terminal());
        assert!(!NegotiationState::Requested.is_terminal());
        assert!(!NegotiationState::Verified.is_terminal());
    }

    #[test]
    fn test_state_wire_form() {
        let value = serde_json::to_value(NegotiationState::Agreed).unwrap();
        assert_eq!(value, "AGREED");

        let state: NegotiationState = serde_json::from_value(serde_json::json!("OFFERED")).unwrap();
        assert_eq!(state, NegotiationState::Offered);
    }

    #[test]
    fn test_event_type_rejects_unknown_value() {
        let result: Result<NegotiationEventType, _> =
            serde_json::from_value(serde_json::json!("SUSPENDED"));
        assert!(result.is_err());
    }
}
