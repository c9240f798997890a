//! Legal transition table for contract negotiation
//!
//! | Message | Valid from | Result |
//! |---|---|---|
//! | ContractRequestMessage (counter) | OFFERED | REQUESTED |
//! | ContractOfferMessage | REQUESTED, OFFERED | OFFERED |
//! | EventMessage\[ACCEPTED\] | OFFERED | ACCEPTED |
//! | ContractAgreementMessage | REQUESTED, ACCEPTED | AGREED |
//! | ContractAgreementVerificationMessage | AGREED | VERIFIED |
//! | EventMessage\[FINALIZED\] | VERIFIED | FINALIZED |
//! | ContractNegotiationTerminationMessage | any non-terminal | TERMINATED |
//!
//! The initial `ContractRequestMessage` creates the process and is handled
//! by the engine, not this table.

use protocol_messages::negotiation::NegotiationEventType;
use protocol_messages::{NegotiationMessage, NegotiationState};

/// Resulting state for `message` received in `state`, or `None` when the
/// pair is not a legal edge
pub fn next_state(
    state: NegotiationState,
    message: &NegotiationMessage,
) -> Option<NegotiationState> {
    use NegotiationMessage as M;
    use NegotiationState as S;

    match (state, message) {
        (S::Offered, M::Request(_)) => Some(S::Requested),
        (S::Requested | S::Offered, M::Offer(_)) => Some(S::Offered),
        (S::Offered, M::Event(event)) if event.event_type == NegotiationEventType::Accepted => {
            Some(S::Accepted)
        }
        (S::Requested | S::Accepted, M::Agreement(_)) => Some(S::Agreed),
        (S::Agreed, M::Verification(_)) => Some(S::Verified),
        (S::Verified, M::Event(event)) if event.event_type == NegotiationEventType::Finalized => {
            Some(S::Finalized)
        }
        (state, M::Termination(_)) if !state.is_terminal() => Some(S::Terminated),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_messages::negotiation::{
        ContractNegotiationEventMessage, ContractNegotiationTerminationMessage,
    };

    fn event(event_type: NegotiationEventType) -> NegotiationMessage {
        NegotiationMessage::Event(ContractNegotiationEventMessage {
            consumer_pid: "urn:uuid:c1".to_string(),
            provider_pid: "urn:uuid:p1".to_string(),
            event_type,
        })
    }

    fn termination() -> NegotiationMessage {
        NegotiationMessage::Termination(ContractNegotiationTerminationMessage {
            consumer_pid: "urn:uuid:c1".to_string(),
            provider_pid: "urn:uuid:p1".to_string(),
            code: None,
            reason: vec![],
        })
    }

    #[test]
    fn test_accept_only_from_offered() {
        let accepted = event(NegotiationEventType::Accepted);
        assert_eq!(
            next_state(NegotiationState::Offered, &accepted),
            Some(NegotiationState::Accepted)
        );
        assert_eq!(next_state(NegotiationState::Requested, &accepted), None);
        assert_eq!(next_state(NegotiationState::Agreed, &accepted), None);
    }

    #[test]
    fn test_finalize_only_from_verified() {
        let finalized = event(NegotiationEventType::Finalized);
        assert_eq!(
            next_state(NegotiationState::Verified, &finalized),
            Some(NegotiationState::Finalized)
        );
        assert_eq!(next_state(NegotiationState::Agreed, &finalized), None);
    }

    #[test]
    fn test_termination_from_every_non_terminal_state() {
        let states = [
            NegotiationState::Requested,
            NegotiationState::Offered,
            NegotiationState::Accepted,
            NegotiationState::Agreed,
            NegotiationState::Verified,
        ];
        for state in states {
            assert_eq!(
                next_state(state, &termination()),
                Some(NegotiationState::Terminated)
            );
        }
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        for state in [NegotiationState::Finalized, NegotiationState::Terminated] {
            assert_eq!(next_state(state, &termination()), None);
            assert_eq!(next_state(state, &event(NegotiationEventType::Accepted)), None);
            assert_eq!(next_state(state, &event(NegotiationEventType::Finalized)), None);
        }
    }
}
