//! Store contract shared by the memory and RocksDB backends

use crate::error::Result;
use crate::types::{NegotiationProcess, ProcessId, TransferProcess};

/// Durable record store for negotiation and transfer processes
///
/// The two state machines are the sole writers. Inserts are put-if-absent;
/// updates are compare-and-swap on the record's version token and fail with
/// [`crate::StoreError::Conflict`] when a concurrent writer won, leaving the
/// stored record unchanged. Reads are lock-free.
pub trait ProcessStore: Send + Sync {
    /// Create a negotiation record; fails with `Conflict` if the pid pair
    /// already exists
    fn insert_negotiation(&self, record: &NegotiationProcess) -> Result<()>;

    /// Replace a negotiation record iff the stored version matches
    /// `expected_version`
    fn update_negotiation(&self, record: &NegotiationProcess, expected_version: u64)
        -> Result<()>;

    /// Read a negotiation record
    fn get_negotiation(&self, id: &ProcessId) -> Result<Option<NegotiationProcess>>;

    /// Create a transfer record; fails with `Conflict` if the pid pair
    /// already exists
    fn insert_transfer(&self, record: &TransferProcess) -> Result<()>;

    /// Replace a transfer record iff the stored version matches
    /// `expected_version`
    fn update_transfer(&self, record: &TransferProcess, expected_version: u64) -> Result<()>;

    /// Read a transfer record
    fn get_transfer(&self, id: &ProcessId) -> Result<Option<TransferProcess>>;

    /// Look up the negotiation that produced `agreement_id`
    fn find_agreement(&self, agreement_id: &str) -> Result<Option<NegotiationProcess>>;
}
