//! Contract-negotiation state machine
//!
//! Drives a negotiation process through
//! REQUESTED → OFFERED → ACCEPTED → AGREED → VERIFIED → FINALIZED, with
//! TERMINATED reachable from every non-terminal state. A process does not
//! exist until the first valid `ContractRequestMessage`; FINALIZED and
//! TERMINATED are absorbing.
//!
//! Transitions are read-modify-write against the process store with a
//! compare-and-swap on the record version, so the state update and the
//! stored offer/agreement update land as one atomic step and concurrent
//! submits on the same process id resolve to exactly one winner.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod engine;
pub mod error;
pub mod transition;

// Re-exports
pub use engine::NegotiationEngine;
pub use error::{NegotiationError, Result};
