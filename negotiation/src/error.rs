//! Error types for the negotiation state machine

use process_store::StoreError;
use protocol_messages::NegotiationState;
use thiserror::Error;

/// Result type for negotiation operations
pub type Result<T> = std::result::Result<T, NegotiationError>;

/// Negotiation errors
///
/// All variants are local, recoverable outcomes of a single `submit` call;
/// only [`NegotiationError::Conflict`] is worth retrying.
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// Offer violates the target-presence rule or names an unknown dataset
    #[error("invalid offer: {0}")]
    InvalidOffer(String),

    /// Message is not legal from the process's current state
    #[error("{message} is not valid from state {state}")]
    InvalidTransition {
        /// State the process was in
        state: NegotiationState,
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

impl From<StoreError> for NegotiationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(process) => NegotiationError::Conflict(process),
            other => NegotiationError::Store(other),
        }
    }
}
