//! Negotiation engine
//!
//! Applies inbound negotiation messages to the process store: creates the
//! process on the initial request, advances it along the transition table,
//! and materializes the immutable agreement at the AGREED transition.

use crate::error::{NegotiationError, Result};
use crate::transition;
use catalog::CatalogStore;
use chrono::Utc;
use process_store::{NegotiationProcess, ProcessId, ProcessStore};
use protocol_messages::negotiation::{ContractAgreementMessage, ContractRequestMessage};
use protocol_messages::odrl::{Agreement, Offer};
use protocol_messages::{NegotiationMessage, NegotiationState};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Contract-negotiation state machine
pub struct NegotiationEngine {
    /// Process records; this engine is their sole writer
    store: Arc<dyn ProcessStore>,

    /// Published datasets, read to validate offer targets
    catalog: Arc<CatalogStore>,
}

impl NegotiationEngine {
    /// Create a new engine over the given store and catalog
    pub fn new(store: Arc<dyn ProcessStore>, catalog: Arc<CatalogStore>) -> Self {
        Self { store, catalog }
    }

    /// Apply one inbound message, returning the resulting process record
    ///
    /// The state update and the stored offer/agreement update happen as one
    /// atomic step; on any error the stored process is unchanged.
    pub fn submit(&self, message: NegotiationMessage) -> Result<NegotiationProcess> {
        match &message {
            NegotiationMessage::Request(request) if request.provider_pid.is_none() => {
                self.create(request)
            }
            _ => self.advance(&message),
        }
    }

    /// Read a process record for status queries; takes no lock
    pub fn get(&self, id: &ProcessId) -> Result<Option<NegotiationProcess>> {
        Ok(self.store.get_negotiation(id)?)
    }

    fn create(&self, request: &ContractRequestMessage) -> Result<NegotiationProcess> {
        let consumer_pid = request.consumer_pid.clone().ok_or_else(|| {
            NegotiationError::ProcessMismatch(
                "initial ContractRequestMessage carries no consumerPid".to_string(),
            )
        })?;
        self.check_offer(&request.offer)?;

        let now = Utc::now();
        let record = NegotiationProcess {
            process_id: ProcessId::new(consumer_pid, mint_pid()),
            state: NegotiationState::Requested,
            offer: request.offer.clone(),
            agreement: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        self.store.insert_negotiation(&record)?;

        info!(process = %record.process_id, target = ?record.offer.target, "negotiation created");
        Ok(record)
    }

    fn advance(&self, message: &NegotiationMessage) -> Result<NegotiationProcess> {
        let id = addressed_process(message)?;
        let current = self.store.get_negotiation(&id)?.ok_or_else(|| {
            NegotiationError::ProcessMismatch(format!("no negotiation for process {}", id))
        })?;

        let next = transition::next_state(current.state, message).ok_or(
            NegotiationError::InvalidTransition {
                state: current.state,
                message: message.kind(),
            },
        )?;

        let mut updated = current.clone();
        updated.state = next;
        match message {
            NegotiationMessage::Request(request) => {
                self.check_offer(&request.offer)?;
                updated.offer = request.offer.clone();
            }
            NegotiationMessage::Offer(offer) => {
                self.check_offer(&offer.offer)?;
                updated.offer = offer.offer.clone();
            }
            NegotiationMessage::Agreement(agreement) => {
                updated.agreement = Some(materialize_agreement(&current.offer, agreement)?);
            }
            NegotiationMessage::Termination(termination) => {
                info!(process = %id, code = ?termination.code, "negotiation terminated");
            }
            _ => {}
        }
        updated.updated_at = Utc::now();
        updated.version = current.version + 1;

        self.store.update_negotiation(&updated, current.version)?;

        info!(
            process = %id,
            from = %current.state,
            to = %updated.state,
            "negotiation transition applied"
        );
        Ok(updated)
    }

    fn check_offer(&self, offer: &Offer) -> Result<()> {
        let Some(target) = offer.target.as_deref().filter(|t| !t.is_empty()) else {
            return Err(NegotiationError::InvalidOffer(
                "offer carries no target".to_string(),
            ));
        };
        if self.catalog.resolve_offer(target).is_none() {
            return Err(NegotiationError::InvalidOffer(format!(
                "target {} is not a published dataset",
                target
            )));
        }
        Ok(())
    }
}

/// Build the agreement stored from AGREED onward: policy body from the
/// offer under discussion, timestamp and participant ids from the message.
fn materialize_agreement(
    offer: &Offer,
    message: &ContractAgreementMessage,
) -> Result<Agreement> {
    let target = offer.target.clone().ok_or_else(|| {
        NegotiationError::InvalidOffer("negotiated offer has no target".to_string())
    })?;
    if message.agreement.target != target {
        return Err(NegotiationError::InvalidOffer(format!(
            "agreement target {} does not match negotiated target {}",
            message.agreement.target, target
        )));
    }

    Ok(Agreement {
        id: message.agreement.id.clone(),
        target,
        timestamp: message.agreement.timestamp,
        assigner: message.agreement.assigner.clone(),
        assignee: message.agreement.assignee.clone(),
        permission: offer.permission.clone(),
        prohibition: offer.prohibition.clone(),
        obligation: offer.obligation.clone(),
    })
}

fn addressed_process(message: &NegotiationMessage) -> Result<ProcessId> {
    let consumer_pid = message.consumer_pid().ok_or_else(|| {
        NegotiationError::ProcessMismatch(format!("{} carries no consumerPid", message.kind()))
    })?;
    let provider_pid = message.provider_pid().ok_or_else(|| {
        NegotiationError::ProcessMismatch(format!("{} carries no providerPid", message.kind()))
    })?;
    Ok(ProcessId::new(consumer_pid, provider_pid))
}

fn mint_pid() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use process_store::MemoryStore;
    use protocol_messages::catalog::{DataService, Dataset};
    use protocol_messages::negotiation::{
        ContractNegotiationEventMessage, ContractOfferMessage, NegotiationEventType,
    };
    use protocol_messages::odrl::Permission;

    const DATASET: &str = "urn:uuid:dataset-1";

    fn published_dataset(id: &str) -> Dataset {
        Dataset {
            id: id.to_string(),
            title: None,
            description: None,
            keyword: vec![],
            issued: None,
            modified: None,
            license: None,
            has_policy: vec![Offer {
                id: format!("{}-policy", id),
                target: None,
                assigner: None,
                assignee: None,
                permission: vec![Permission {
                    action: "use".to_string(),
                    constraint: vec![],
                }],
                prohibition: vec![],
                obligation: vec![],
            }],
            distribution: vec![],
        }
    }

    fn test_engine() -> NegotiationEngine {
        let catalog = Arc::new(CatalogStore::new(
            "urn:example:provider",
            DataService {
                id: "urn:uuid:service-1".to_string(),
                endpoint_url: "https://provider.example.com/connector".to_string(),
            },
        ));
        catalog.upsert_dataset(published_dataset(DATASET)).unwrap();
        NegotiationEngine::new(Arc::new(MemoryStore::new()), catalog)
    }

    fn offer(target: Option<&str>) -> Offer {
        Offer {
            id: "urn:uuid:offer-1".to_string(),
            target: target.map(str::to_string),
            assigner: None,
            assignee: None,
            permission: vec![],
            prohibition: vec![],
            obligation: vec![],
        }
    }

    fn initial_request(target: Option<&str>) -> NegotiationMessage {
        NegotiationMessage::Request(ContractRequestMessage {
            consumer_pid: Some("urn:uuid:consumer-1".to_string()),
            provider_pid: None,
            offer: offer(target),
            callback_address: "https://consumer.example.com/callback".to_string(),
        })
    }

    #[test]
    fn test_create_on_initial_request() {
        let engine = test_engine();
        let process = engine.submit(initial_request(Some(DATASET))).unwrap();

        assert_eq!(process.state, NegotiationState::Requested);
        assert_eq!(process.process_id.consumer_pid, "urn:uuid:consumer-1");
        assert!(process.process_id.provider_pid.starts_with("urn:uuid:"));
        assert_eq!(process.version, 0);
        assert!(process.agreement.is_none());
    }

    #[test]
    fn test_create_rejects_offer_without_target() {
        let engine = test_engine();
        let result = engine.submit(initial_request(None));
        assert!(matches!(result, Err(NegotiationError::InvalidOffer(_))));
    }

    #[test]
    fn test_create_rejects_unknown_target() {
        let engine = test_engine();
        let result = engine.submit(initial_request(Some("urn:uuid:nope")));
        assert!(matches!(result, Err(NegotiationError::InvalidOffer(_))));
    }

    #[test]
    fn test_create_requires_consumer_pid() {
        let engine = test_engine();
        let result = engine.submit(NegotiationMessage::Request(ContractRequestMessage {
            consumer_pid: None,
            provider_pid: None,
            offer: offer(Some(DATASET)),
            callback_address: "https://consumer.example.com/callback".to_string(),
        }));
        assert!(matches!(result, Err(NegotiationError::ProcessMismatch(_))));
    }

    #[test]
    fn test_counter_offer_replaces_stored_offer() {
        let engine = test_engine();
        let process = engine.submit(initial_request(Some(DATASET))).unwrap();

        let mut countered = offer(Some(DATASET));
        countered.id = "urn:uuid:offer-2".to_string();
        let updated = engine
            .submit(NegotiationMessage::Offer(ContractOfferMessage {
                consumer_pid: Some(process.process_id.consumer_pid.clone()),
                provider_pid: process.process_id.provider_pid.clone(),
                offer: countered,
                callback_address: None,
            }))
            .unwrap();

        assert_eq!(updated.state, NegotiationState::Offered);
        assert_eq!(updated.offer.id, "urn:uuid:offer-2");
        assert_eq!(updated.version, 1);
    }

    #[test]
    fn test_event_from_wrong_state_is_invalid_and_leaves_record_unchanged() {
        let engine = test_engine();
        let process = engine.submit(initial_request(Some(DATASET))).unwrap();

        // ACCEPTED is only legal from OFFERED
        let result = engine.submit(NegotiationMessage::Event(ContractNegotiationEventMessage {
            consumer_pid: process.process_id.consumer_pid.clone(),
            provider_pid: process.process_id.provider_pid.clone(),
            event_type: NegotiationEventType::Accepted,
        }));
        assert!(matches!(
            result,
            Err(NegotiationError::InvalidTransition {
                state: NegotiationState::Requested,
                ..
            })
        ));

        let stored = engine.get(&process.process_id).unwrap().unwrap();
        assert_eq!(stored, process);
    }

    #[test]
    fn test_unknown_process_is_a_mismatch() {
        let engine = test_engine();
        let result = engine.submit(NegotiationMessage::Event(ContractNegotiationEventMessage {
            consumer_pid: "urn:uuid:ghost-c".to_string(),
            provider_pid: "urn:uuid:ghost-p".to_string(),
            event_type: NegotiationEventType::Accepted,
        }));
        assert!(matches!(result, Err(NegotiationError::ProcessMismatch(_))));
    }

    #[test]
    fn test_concurrent_submits_have_one_winner() {
        use std::sync::Barrier;

        let engine = Arc::new(test_engine());
        let process = engine.submit(initial_request(Some(DATASET))).unwrap();
        engine
            .submit(NegotiationMessage::Offer(ContractOfferMessage {
                consumer_pid: Some(process.process_id.consumer_pid.clone()),
                provider_pid: process.process_id.provider_pid.clone(),
                offer: offer(Some(DATASET)),
                callback_address: None,
            }))
            .unwrap();

        // ACCEPTED is not self-enabling: once one submit lands, the other
        // must fail, either on the version check or on the moved state.
        let barrier = Arc::new(Barrier::new(2));
        let mut handles = Vec::new();
        for _ in 0..2 {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let consumer_pid = process.process_id.consumer_pid.clone();
            let provider_pid = process.process_id.provider_pid.clone();
            handles.push(std::thread::spawn(move || {
                let message = NegotiationMessage::Event(ContractNegotiationEventMessage {
                    consumer_pid,
                    provider_pid,
                    event_type: NegotiationEventType::Accepted,
                });
                barrier.wait();
                engine.submit(message)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let losers = results
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(NegotiationError::Conflict(_))
                        | Err(NegotiationError::InvalidTransition { .. })
                )
            })
            .count();
        assert_eq!(winners, 1);
        assert_eq!(losers, 1);

        let stored = engine.get(&process.process_id).unwrap().unwrap();
        assert_eq!(stored.state, NegotiationState::Accepted);
        assert_eq!(stored.version, 2);
    }
}
