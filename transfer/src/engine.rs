//! Transfer engine
//!
//! Applies inbound transfer messages to the process store. Creation is
//! gated on the referenced agreement: it must exist and its negotiation
//! must have reached FINALIZED.

use crate::error::{Error, Result};
use crate::transition;
use chrono::Utc;
use process_store::{ProcessId, ProcessStore, TransferProcess};
use protocol_messages::transfer::TransferRequestMessage;
use protocol_messages::{NegotiationState, TransferMessage, TransferState};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Transfer-process state machine
pub struct TransferEngine {
    /// Process records; this engine is their sole writer
    store: Arc<dyn ProcessStore>,
}

impl TransferEngine {
    /// Create a new engine over the given store
    pub fn new(store: Arc<dyn ProcessStore>) -> Self {
        Self { store }
    }

    /// Apply one inbound message, returning the resulting process record
    pub fn submit(&self, message: TransferMessage) -> Result<TransferProcess> {
        match &message {
            TransferMessage::Request(request) if request.provider_pid.is_none() => {
                self.create(request)
            }
            _ => self.advance(&message),
        }
    }

    /// Read a process record for status queries; takes no lock
    pub fn get(&self, id: &ProcessId) -> Result<Option<TransferProcess>> {
        Ok(self.store.get_transfer(id)?)
    }

    fn create(&self, request: &TransferRequestMessage) -> Result<TransferProcess> {
        let negotiation = self
            .store
            .find_agreement(&request.agreement_id)?
            .ok_or_else(|| Error::AgreementNotFound(request.agreement_id.clone()))?;
        if negotiation.state != NegotiationState::Finalized {
            return Err(Error::AgreementNotFinalized {
                agreement_id: request.agreement_id.clone(),
                state: negotiation.state,
            });
        }

        let now = Utc::now();
        let record = TransferProcess {
            process_id: ProcessId::new(request.consumer_pid.clone(), mint_pid()),
            state: TransferState::Requested,
            agreement_id: request.agreement_id.clone(),
            data_address: request.data_address.clone(),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        self.store.insert_transfer(&record)?;

        info!(
            process = %record.process_id,
            agreement = %record.agreement_id,
            "transfer created"
        );
        Ok(record)
    }

    fn advance(&self, message: &TransferMessage) -> Result<TransferProcess> {
        let id = addressed_process(message)?;
        let current = self
            .store
            .get_transfer(&id)?
            .ok_or_else(|| Error::ProcessMismatch(format!("no transfer for process {}", id)))?;

        let next = transition::next_state(current.state, message).ok_or(
            Error::InvalidTransition {
                state: current.state,
                message: message.kind(),
            },
        )?;

        let mut updated = current.clone();
        updated.state = next;
        match message {
            TransferMessage::Start(start) => {
                if let Some(address) = &start.data_address {
                    updated.data_address = Some(address.clone());
                }
            }
            TransferMessage::Suspension(suspension) => {
                info!(process = %id, code = ?suspension.code, "transfer suspended");
            }
            TransferMessage::Termination(termination) => {
                info!(process = %id, code = ?termination.code, "transfer terminated");
            }
            _ => {}
        }
        updated.updated_at = Utc::now();
        updated.version = current.version + 1;

        self.store.update_transfer(&updated, current.version)?;

        info!(
            process = %id,
            from = %current.state,
            to = %updated.state,
            "transfer transition applied"
        );
        Ok(updated)
    }
}

fn addressed_process(message: &TransferMessage) -> Result<ProcessId> {
    let provider_pid = message.provider_pid().ok_or_else(|| {
        Error::ProcessMismatch(format!("{} carries no providerPid", message.kind()))
    })?;
    Ok(ProcessId::new(message.consumer_pid(), provider_pid))
}

fn mint_pid() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use process_store::{MemoryStore, NegotiationProcess};
    use protocol_messages::odrl::{Agreement, Offer};

    const AGREEMENT: &str = "urn:uuid:agreement-1";

    fn negotiation_record(state: NegotiationState) -> NegotiationProcess {
        let now = Utc::now();
        NegotiationProcess {
            process_id: ProcessId::new("urn:uuid:nc1", "urn:uuid:np1"),
            state,
            offer: Offer {
                id: "urn:uuid:offer-1".to_string(),
                target: Some("urn:uuid:dataset-1".to_string()),
                assigner: None,
                assignee: None,
                permission: vec![],
                prohibition: vec![],
                obligation: vec![],
            },
            agreement: Some(Agreement {
                id: AGREEMENT.to_string(),
                target: "urn:uuid:dataset-1".to_string(),
                timestamp: now,
                assigner: "urn:example:provider".to_string(),
                assignee: "urn:example:consumer".to_string(),
                permission: vec![],
                prohibition: vec![],
                obligation: vec![],
            }),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn store_with_negotiation(state: NegotiationState) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut record = negotiation_record(state);
        // Insert at version 0, then update so the agreement index is built
        record.version = 0;
        record.agreement = None;
        store.insert_negotiation(&record).unwrap();
        store
            .update_negotiation(&negotiation_record(state), 0)
            .unwrap();
        store
    }

    fn request() -> TransferMessage {
        TransferMessage::Request(TransferRequestMessage {
            consumer_pid: "urn:uuid:tc1".to_string(),
            provider_pid: None,
            agreement_id: AGREEMENT.to_string(),
            format: Some("application/json".to_string()),
            data_address: None,
            callback_address: "https://consumer.example.com/callback".to_string(),
        })
    }

    #[test]
    fn test_create_requires_finalized_negotiation() {
        let engine = TransferEngine::new(store_with_negotiation(NegotiationState::Verified));
        let result = engine.submit(request());
        assert!(matches!(
            result,
            Err(Error::AgreementNotFinalized {
                state: NegotiationState::Verified,
                ..
            })
        ));
    }

    #[test]
    fn test_create_rejects_unknown_agreement() {
        let engine = TransferEngine::new(Arc::new(MemoryStore::new()));
        let result = engine.submit(request());
        assert!(matches!(result, Err(Error::AgreementNotFound(_))));
    }

    #[test]
    fn test_create_from_finalized_negotiation() {
        let engine = TransferEngine::new(store_with_negotiation(NegotiationState::Finalized));
        let process = engine.submit(request()).unwrap();

        assert_eq!(process.state, TransferState::Requested);
        assert_eq!(process.agreement_id, AGREEMENT);
        assert_eq!(process.process_id.consumer_pid, "urn:uuid:tc1");
        assert_eq!(process.version, 0);
    }

    #[test]
    fn test_unknown_process_is_a_mismatch() {
        let engine = TransferEngine::new(Arc::new(MemoryStore::new()));
        let result = engine.submit(TransferMessage::Completion(
            protocol_messages::transfer::TransferCompletionMessage {
                consumer_pid: "urn:uuid:ghost-c".to_string(),
                provider_pid: "urn:uuid:ghost-p".to_string(),
            },
        ));
        assert!(matches!(result, Err(Error::ProcessMismatch(_))));
    }
}
