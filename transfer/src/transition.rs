//! Legal transition table for transfer processes
//!
//! | Message | Valid from | Result |
//! |---|---|---|
//! | TransferStartMessage | REQUESTED, SUSPENDED | STARTED |
//! | TransferCompletionMessage | STARTED | COMPLETED |
//! | TransferSuspensionMessage | STARTED | SUSPENDED |
//! | TransferTerminationMessage | any non-terminal | TERMINATED |
//!
//! `TransferRequestMessage` creates the process and is handled by the
//! engine, not this table.

use protocol_messages::{TransferMessage, TransferState};

/// Resulting state for `message` received in `state`, or `None` when the
/// pair is not a legal edge
pub fn next_state(state: TransferState, message: &TransferMessage) -> Option<TransferState> {
    use TransferMessage as M;
    use TransferState as S;

    match (state, message) {
        (S::Requested | S::Suspended, M::Start(_)) => Some(S::Started),
        (S::Started, M::Completion(_)) => Some(S::Completed),
        (S::Started, M::Suspension(_)) => Some(S::Suspended),
        (state, M::Termination(_)) if !state.is_terminal() => Some(S::Terminated),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_messages::transfer::{
        TransferCompletionMessage, TransferStartMessage, TransferTerminationMessage,
    };

    fn start() -> TransferMessage {
        TransferMessage::Start(TransferStartMessage {
            consumer_pid: "urn:uuid:c1".to_string(),
            provider_pid: "urn:uuid:p1".to_string(),
            data_address: None,
        })
    }

    fn completion() -> TransferMessage {
        TransferMessage::Completion(TransferCompletionMessage {
            consumer_pid: "urn:uuid:c1".to_string(),
            provider_pid: "urn:uuid:p1".to_string(),
        })
    }

    fn termination() -> TransferMessage {
        TransferMessage::Termination(TransferTerminationMessage {
            consumer_pid: "urn:uuid:c1".to_string(),
            provider_pid: "urn:uuid:p1".to_string(),
            code: None,
            reason: vec![],
        })
    }

    #[test]
    fn test_start_resumes_suspended_transfers() {
        assert_eq!(
            next_state(TransferState::Requested, &start()),
            Some(TransferState::Started)
        );
        assert_eq!(
            next_state(TransferState::Suspended, &start()),
            Some(TransferState::Started)
        );
        assert_eq!(next_state(TransferState::Started, &start()), None);
    }

    #[test]
    fn test_completion_only_from_started() {
        assert_eq!(
            next_state(TransferState::Started, &completion()),
            Some(TransferState::Completed)
        );
        assert_eq!(next_state(TransferState::Requested, &completion()), None);
        assert_eq!(next_state(TransferState::Suspended, &completion()), None);
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        for state in [TransferState::Completed, TransferState::Terminated] {
            assert_eq!(next_state(state, &start()), None);
            assert_eq!(next_state(state, &completion()), None);
            assert_eq!(next_state(state, &termination()), None);
        }
    }
}
