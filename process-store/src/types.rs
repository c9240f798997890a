//! Process record types
//!
//! The records the two state machines read and write. Each carries a
//! version token bumped on every successful transition; the store's
//! compare-and-swap update uses it for per-process mutual exclusion.

use chrono::{DateTime, Utc};
use protocol_messages::odrl::{Agreement, Offer};
use protocol_messages::transfer::DataAddress;
use protocol_messages::{NegotiationState, TransferState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one negotiation or transfer process
///
/// The pair is immutable once assigned: the creating party picks its own
/// pid, the counterparty pid is minted when the process record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId {
    /// Consumer-assigned process id
    pub consumer_pid: String,

    /// Provider-assigned process id
    pub provider_pid: String,
}

impl ProcessId {
    /// Create a process id pair
    pub fn new(consumer_pid: impl Into<String>, provider_pid: impl Into<String>) -> Self {
        Self {
            consumer_pid: consumer_pid.into(),
            provider_pid: provider_pid.into(),
        }
    }

    /// Stable storage key for this pair
    pub fn storage_key(&self) -> Vec<u8> {
        let mut key = self.consumer_pid.as_bytes().to_vec();
        key.push(b'|');
        key.extend_from_slice(self.provider_pid.as_bytes());
        key
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.consumer_pid, self.provider_pid)
    }
}

/// Durable record of one contract negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationProcess {
    /// Process id pair
    pub process_id: ProcessId,

    /// Current negotiation state
    pub state: NegotiationState,

    /// Offer currently under discussion
    pub offer: Offer,

    /// Agreement; set exactly once, at the AGREED transition
    pub agreement: Option<Agreement>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last transition timestamp
    pub updated_at: DateTime<Utc>,

    /// Version token for optimistic concurrency
    pub version: u64,
}

/// Durable record of one transfer process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferProcess {
    /// Process id pair
    pub process_id: ProcessId,

    /// Current transfer state
    pub state: TransferState,

    /// Agreement this transfer executes
    pub agreement_id: String,

    /// Endpoint descriptor for the data plane
    pub data_address: Option<DataAddress>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last transition timestamp
    pub updated_at: DateTime<Utc>,

    /// Version token for optimistic concurrency
    pub version: u64,
}
