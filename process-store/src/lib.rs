//! Durable process records for the connector state machines
//!
//! Negotiation and transfer processes are keyed by their
//! `(consumerPid, providerPid)` pair and carry a version token. Writers go
//! through put-if-absent inserts and compare-and-swap updates so that the
//! read-modify-write of a state transition is atomic per process id; a lost
//! race surfaces as a retryable conflict. Reads never take a lock: state is
//! monotonic along the transition tables, so a stale read only ever shows a
//! prior valid state.
//!
//! Two backends:
//!
//! - [`MemoryStore`]: concurrent hash maps, used in tests and single-node
//!   deployments without durability requirements
//! - [`RocksStore`]: RocksDB column families, the durable default
//!
//! Records are never physically deleted; terminated and finalized processes
//! are retained for audit.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod memory;
pub mod rocks;
pub mod store;
pub mod types;

// Re-exports
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use store::ProcessStore;
pub use types::{NegotiationProcess, ProcessId, TransferProcess};
