//! Dataset store and catalog rendering

use crate::error::{CatalogError, Result};
use dashmap::DashMap;
use protocol_messages::catalog::{Catalog, DataService, Dataset};
use protocol_messages::odrl::Offer;
use tracing::info;
use uuid::Uuid;

/// Store of the datasets this connector publishes
///
/// Datasets are keyed by their `@id`. Offers embedded in a dataset must not
/// carry a target; the dataset itself is the target.
pub struct CatalogStore {
    catalog_id: String,
    participant_id: String,
    service: DataService,
    datasets: DashMap<String, Dataset>,
}

impl CatalogStore {
    /// Create an empty catalog for this connector identity
    pub fn new(participant_id: impl Into<String>, service: DataService) -> Self {
        Self {
            catalog_id: format!("urn:uuid:{}", Uuid::new_v4()),
            participant_id: participant_id.into(),
            service,
            datasets: DashMap::new(),
        }
    }

    /// Publish or replace a dataset
    pub fn upsert_dataset(&self, dataset: Dataset) -> Result<()> {
        if dataset.has_policy.is_empty() {
            return Err(CatalogError::NoPolicy(dataset.id.clone()));
        }
        if let Some(policy) = dataset.has_policy.iter().find(|p| p.has_target()) {
            return Err(CatalogError::OfferHasTarget {
                policy: policy.id.clone(),
                dataset: dataset.id.clone(),
            });
        }

        info!(dataset = %dataset.id, "dataset published");
        self.datasets.insert(dataset.id.clone(), dataset);
        Ok(())
    }

    /// Fetch a dataset by id
    pub fn dataset(&self, id: &str) -> Option<Dataset> {
        self.datasets.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a dataset; returns whether it existed
    pub fn remove_dataset(&self, id: &str) -> bool {
        self.datasets.remove(id).is_some()
    }

    /// Render the full DCAT catalog
    pub fn catalog(&self) -> Catalog {
        let mut datasets: Vec<Dataset> =
            self.datasets.iter().map(|entry| entry.value().clone()).collect();
        datasets.sort_by(|a, b| a.id.cmp(&b.id));

        Catalog {
            context: vec![protocol_messages::DSPACE_CONTEXT.to_string()],
            id: self.catalog_id.clone(),
            participant_id: self.participant_id.clone(),
            service: vec![self.service.clone()],
            dataset: datasets,
        }
    }

    /// Resolve a dataset id to its first usage policy
    ///
    /// Used by negotiation to validate that an incoming offer's target
    /// exists. Read-only.
    pub fn resolve_offer(&self, dataset_id: &str) -> Option<Offer> {
        self.datasets
            .get(dataset_id)
            .and_then(|entry| entry.has_policy.first().cloned())
    }

    /// Connector participant identifier
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_messages::odrl::Permission;

    fn test_service() -> DataService {
        DataService {
            id: "urn:uuid:service-1".to_string(),
            endpoint_url: "https://provider.example.com/connector".to_string(),
        }
    }

    fn test_dataset(id: &str, target: Option<&str>) -> Dataset {
        Dataset {
            id: id.to_string(),
            title: Some("Street register".to_string()),
            description: None,
            keyword: vec!["streets".to_string()],
            issued: Some("2025-01-15".to_string()),
            modified: None,
            license: None,
            has_policy: vec![Offer {
                id: format!("{}-policy", id),
                target: target.map(str::to_string),
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

    #[test]
    fn test_upsert_and_resolve() {
        let store = CatalogStore::new("urn:example:provider", test_service());
        store.upsert_dataset(test_dataset("urn:uuid:ds-1", None)).unwrap();

        let offer = store.resolve_offer("urn:uuid:ds-1").unwrap();
        assert_eq!(offer.id, "urn:uuid:ds-1-policy");
        assert!(store.resolve_offer("urn:uuid:unknown").is_none());
    }

    #[test]
    fn test_rejects_policy_with_target() {
        let store = CatalogStore::new("urn:example:provider", test_service());
        let result = store.upsert_dataset(test_dataset("urn:uuid:ds-1", Some("urn:uuid:ds-1")));
        assert!(matches!(result, Err(CatalogError::OfferHasTarget { .. })));
        assert!(store.dataset("urn:uuid:ds-1").is_none());
    }

    #[test]
    fn test_rejects_dataset_without_policy() {
        let store = CatalogStore::new("urn:example:provider", test_service());
        let mut dataset = test_dataset("urn:uuid:ds-1", None);
        dataset.has_policy.clear();
        assert!(matches!(
            store.upsert_dataset(dataset),
            Err(CatalogError::NoPolicy(_))
        ));
    }

    #[test]
    fn test_catalog_renders_sorted_datasets() {
        let store = CatalogStore::new("urn:example:provider", test_service());
        store.upsert_dataset(test_dataset("urn:uuid:ds-b", None)).unwrap();
        store.upsert_dataset(test_dataset("urn:uuid:ds-a", None)).unwrap();

        let catalog = store.catalog();
        assert_eq!(catalog.participant_id, "urn:example:provider");
        assert_eq!(catalog.dataset.len(), 2);
        assert_eq!(catalog.dataset[0].id, "urn:uuid:ds-a");
        assert_eq!(catalog.service[0].id, "urn:uuid:service-1");
    }
}
