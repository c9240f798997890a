//! Discriminator-based message decoding
//!
//! A raw payload is dispatched on its `@type` discriminator and decoded into
//! exactly one typed message. Unknown discriminators are rejected, never
//! passed through.

use crate::catalog::{CatalogRequestMessage, DatasetRequestMessage};
use crate::error::{MessageError, Result};
use crate::negotiation::NegotiationMessage;
use crate::transfer::TransferMessage;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Union of every inbound protocol message
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolMessage {
    /// Contract-negotiation message
    Negotiation(NegotiationMessage),
    /// Transfer-process message
    Transfer(TransferMessage),
    /// Catalog query
    CatalogRequest(CatalogRequestMessage),
    /// Dataset query
    DatasetRequest(DatasetRequestMessage),
}

fn type_tag(value: &Value) -> Result<&str> {
    value
        .get("@type")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingType)
}

fn parse<T: DeserializeOwned>(kind: &'static str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|source| MessageError::Malformed { kind, source })
}

impl NegotiationMessage {
    /// Decode a raw payload into a negotiation message
    pub fn decode(value: &Value) -> Result<Self> {
        match type_tag(value)? {
            "dspace:ContractRequestMessage" => {
                Ok(Self::Request(parse("ContractRequestMessage", value)?))
            }
            "dspace:ContractOfferMessage" => {
                Ok(Self::Offer(parse("ContractOfferMessage", value)?))
            }
            "dspace:ContractAgreementMessage" => {
                Ok(Self::Agreement(parse("ContractAgreementMessage", value)?))
            }
            "dspace:ContractAgreementVerificationMessage" => Ok(Self::Verification(parse(
                "ContractAgreementVerificationMessage",
                value,
            )?)),
            "dspace:ContractNegotiationEventMessage" => {
                Ok(Self::Event(parse("ContractNegotiationEventMessage", value)?))
            }
            "dspace:ContractNegotiationTerminationMessage" => Ok(Self::Termination(parse(
                "ContractNegotiationTerminationMessage",
                value,
            )?)),
            other => {
                warn!(discriminator = other, "rejected non-negotiation payload");
                Err(MessageError::UnknownType(other.to_string()))
            }
        }
    }
}

impl TransferMessage {
    /// Decode a raw payload into a transfer message
    pub fn decode(value: &Value) -> Result<Self> {
        match type_tag(value)? {
            "dspace:TransferRequestMessage" => {
                Ok(Self::Request(parse("TransferRequestMessage", value)?))
            }
            "dspace:TransferStartMessage" => Ok(Self::Start(parse("TransferStartMessage", value)?)),
            "dspace:TransferCompletionMessage" => {
                Ok(Self::Completion(parse("TransferCompletionMessage", value)?))
            }
            "dspace:TransferSuspensionMessage" => {
                Ok(Self::Suspension(parse("TransferSuspensionMessage", value)?))
            }
            "dspace:TransferTerminationMessage" => {
                Ok(Self::Termination(parse("TransferTerminationMessage", value)?))
            }
            other => {
                warn!(discriminator = other, "rejected non-transfer payload");
                Err(MessageError::UnknownType(other.to_string()))
            }
        }
    }
}

/// Decode any protocol message
pub fn decode(value: &Value) -> Result<ProtocolMessage> {
    match type_tag(value)? {
        "dspace:CatalogRequestMessage" => Ok(ProtocolMessage::CatalogRequest(parse(
            "CatalogRequestMessage",
            value,
        )?)),
        "dspace:DatasetRequestMessage" => Ok(ProtocolMessage::DatasetRequest(parse(
            "DatasetRequestMessage",
            value,
        )?)),
        tag if tag.starts_with("dspace:Contract") => {
            Ok(ProtocolMessage::Negotiation(NegotiationMessage::decode(value)?))
        }
        tag if tag.starts_with("dspace:Transfer") => {
            Ok(ProtocolMessage::Transfer(TransferMessage::decode(value)?))
        }
        other => Err(MessageError::UnknownType(other.to_string())),
    }
}
