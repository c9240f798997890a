//! Error types for the transfer state machine

use process_store::StoreError;
use protocol_messages::{NegotiationState, TransferState};
use thiserror::Error;

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Transfer errors
#[derive(Error, Debug)]
pub enum Error {
    /// The referenced agreement does not exist
    #[error("agreement not found: {0}")]
    AgreementNotFound(String),

    /// The referenced agreement's negotiation has not finalized yet.
    /// Non-retryable until the negotiation completes.
    #[error("agreement {agreement_id} belongs to a negotiation in state {state}, not FINALIZED")]
    AgreementNotFinalized {
        /// Referenced agreement id
        agreement_id: String,
        /// State the owning negotiation is in
        state: NegotiationState,
    },

    /// Message is not legal from the process's current state
    #[error("{message} is not valid from state {state}")]
    InvalidTransition {
        /// State the process was in
        state: TransferState,
        /// Message that was rejected
        message: &'static str,
    },

    /// Pid fields do not address an existing process consistently
    #[error("process mismatch: {0}")]
    ProcessMismatch(String),

    /// A concurrent submit for the same process id won the race.
    /// Retryable: re-fetch the process and resubmit.
    #[error("conflicting update on process {0}")]
    Conflict(String),

    /// Store failure
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(process) => Error::Conflict(process),
            other => Error::Store(other),
        }
    }
}
