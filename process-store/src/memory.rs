//! In-memory process store
//!
//! Concurrent hash maps with compare-and-swap under the map's entry guard.
//! The entry guard makes the version check and the replacement a single
//! atomic step per key; different keys proceed in parallel.

use crate::error::{Result, StoreError};
use crate::store::ProcessStore;
use crate::types::{NegotiationProcess, ProcessId, TransferProcess};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

/// Non-durable store backed by concurrent maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    negotiations: DashMap<ProcessId, NegotiationProcess>,
    transfers: DashMap<ProcessId, TransferProcess>,
    // agreement id -> owning negotiation
    agreements: DashMap<String, ProcessId>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessStore for MemoryStore {
    fn insert_negotiation(&self, record: &NegotiationProcess) -> Result<()> {
        match self.negotiations.entry(record.process_id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                debug!(process = %record.process_id, "negotiation record created");
                Ok(())
            }
            Entry::Occupied(_) => Err(StoreError::Conflict(record.process_id.to_string())),
        }
    }

    fn update_negotiation(
        &self,
        record: &NegotiationProcess,
        expected_version: u64,
    ) -> Result<()> {
        match self.negotiations.entry(record.process_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().version != expected_version {
                    return Err(StoreError::Conflict(record.process_id.to_string()));
                }
                entry.insert(record.clone());
            }
            Entry::Vacant(_) => return Err(StoreError::Conflict(record.process_id.to_string())),
        }

        if let Some(agreement) = &record.agreement {
            self.agreements
                .insert(agreement.id.clone(), record.process_id.clone());
        }

        debug!(process = %record.process_id, version = record.version, "negotiation record updated");
        Ok(())
    }

    fn get_negotiation(&self, id: &ProcessId) -> Result<Option<NegotiationProcess>> {
        Ok(self.negotiations.get(id).map(|entry| entry.value().clone()))
    }

    fn insert_transfer(&self, record: &TransferProcess) -> Result<()> {
        match self.transfers.entry(record.process_id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                debug!(process = %record.process_id, "transfer record created");
                Ok(())
            }
            Entry::Occupied(_) => Err(StoreError::Conflict(record.process_id.to_string())),
        }
    }

    fn update_transfer(&self, record: &TransferProcess, expected_version: u64) -> Result<()> {
        match self.transfers.entry(record.process_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().version != expected_version {
                    return Err(StoreError::Conflict(record.process_id.to_string()));
                }
                entry.insert(record.clone());
                debug!(process = %record.process_id, version = record.version, "transfer record updated");
                Ok(())
            }
            Entry::Vacant(_) => Err(StoreError::Conflict(record.process_id.to_string())),
        }
    }

    fn get_transfer(&self, id: &ProcessId) -> Result<Option<TransferProcess>> {
        Ok(self.transfers.get(id).map(|entry| entry.value().clone()))
    }

    fn find_agreement(&self, agreement_id: &str) -> Result<Option<NegotiationProcess>> {
        let Some(process_id) = self.agreements.get(agreement_id) else {
            return Ok(None);
        };
        self.get_negotiation(process_id.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use protocol_messages::odrl::{Agreement, Offer};
    use protocol_messages::NegotiationState;

    fn test_offer(target: &str) -> Offer {
        Offer {
            id: "urn:uuid:policy-1".to_string(),
            target: Some(target.to_string()),
            assigner: None,
            assignee: None,
            permission: vec![],
            prohibition: vec![],
            obligation: vec![],
        }
    }

    fn test_record(id: ProcessId) -> NegotiationProcess {
        let now = Utc::now();
        NegotiationProcess {
            process_id: id,
            state: NegotiationState::Requested,
            offer: test_offer("urn:uuid:dataset-1"),
            agreement: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    #[test]
    fn test_insert_then_get() {
        let store = MemoryStore::new();
        let id = ProcessId::new("urn:uuid:c1", "urn:uuid:p1");
        store.insert_negotiation(&test_record(id.clone())).unwrap();

        let record = store.get_negotiation(&id).unwrap().unwrap();
        assert_eq!(record.state, NegotiationState::Requested);
        assert_eq!(record.version, 0);
    }

    #[test]
    fn test_double_insert_conflicts() {
        let store = MemoryStore::new();
        let id = ProcessId::new("urn:uuid:c1", "urn:uuid:p1");
        store.insert_negotiation(&test_record(id.clone())).unwrap();

        let result = store.insert_negotiation(&test_record(id));
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn test_cas_update_enforces_version() {
        let store = MemoryStore::new();
        let id = ProcessId::new("urn:uuid:c1", "urn:uuid:p1");
        store.insert_negotiation(&test_record(id.clone())).unwrap();

        let mut updated = store.get_negotiation(&id).unwrap().unwrap();
        updated.state = NegotiationState::Offered;
        updated.version = 1;
        store.update_negotiation(&updated, 0).unwrap();

        // Stale writer loses and the stored record is unchanged
        let mut stale = test_record(id.clone());
        stale.state = NegotiationState::Terminated;
        stale.version = 1;
        let result = store.update_negotiation(&stale, 0);
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let stored = store.get_negotiation(&id).unwrap().unwrap();
        assert_eq!(stored.state, NegotiationState::Offered);
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn test_find_agreement_after_update() {
        let store = MemoryStore::new();
        let id = ProcessId::new("urn:uuid:c1", "urn:uuid:p1");
        store.insert_negotiation(&test_record(id.clone())).unwrap();

        let mut updated = store.get_negotiation(&id).unwrap().unwrap();
        updated.state = NegotiationState::Agreed;
        updated.agreement = Some(Agreement {
            id: "urn:uuid:agreement-1".to_string(),
            target: "urn:uuid:dataset-1".to_string(),
            timestamp: Utc::now(),
            assigner: "urn:example:provider".to_string(),
            assignee: "urn:example:consumer".to_string(),
            permission: vec![],
            prohibition: vec![],
            obligation: vec![],
        });
        updated.version = 1;
        store.update_negotiation(&updated, 0).unwrap();

        let found = store.find_agreement("urn:uuid:agreement-1").unwrap().unwrap();
        assert_eq!(found.process_id, id);
        assert!(store.find_agreement("urn:uuid:other").unwrap().is_none());
    }
}
