//! Dataspace Protocol message catalog
//!
//! Typed definitions of every protocol message exchanged between a Provider
//! and a Consumer connector (Dataspace Protocol 2025-1), plus strict
//! discriminator-based decoding of raw JSON-LD payloads.
//!
//! # Message families
//!
//! - **Catalog**: catalog/dataset requests, DCAT catalog and dataset shapes
//! - **Contract negotiation**: request, offer, agreement, verification,
//!   event and termination messages
//! - **Transfer process**: request, start, completion, suspension and
//!   termination messages
//! - **Version discovery**: supported protocol versions
//!
//! Decoding is a pure validation step: a payload either maps onto exactly
//! one typed message or fails with a [`MessageError`]. No permissive
//! pass-through of unknown `@type` discriminators.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod catalog;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod negotiation;
pub mod odrl;
pub mod transfer;

// Re-exports
pub use decode::{decode, ProtocolMessage};
pub use error::{MessageError, Result};
pub use negotiation::{NegotiationMessage, NegotiationState};
pub use odrl::{Agreement, Offer};
pub use transfer::{DataAddress, TransferMessage, TransferState};

/// JSON-LD context shared by all protocol payloads.
pub const DSPACE_CONTEXT: &str = "https://w3id.org/dspace/2025/1/context.jsonld";
