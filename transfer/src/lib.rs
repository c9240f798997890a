//! Transfer-process state machine
//!
//! Drives a transfer process through REQUESTED → STARTED → COMPLETED, with
//! SUSPENDED as a resumable detour and TERMINATED reachable from every
//! non-terminal state. A process is only created when its
//! `TransferRequestMessage` references the agreement of a FINALIZED
//! negotiation.
//!
//! Atomicity and concurrency follow the negotiation engine: transitions are
//! read-modify-write with a compare-and-swap on the record version, one
//! winner per process id.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod engine;
pub mod error;
pub mod transition;

// Re-exports
pub use engine::TransferEngine;
pub use error::{Error, Result};
