//! DCAT catalog and dataset shapes
//!
//! Read-mostly descriptive entities served by the catalog endpoints, plus
//! the request messages that query them. Offers embedded in a dataset never
//! carry a target; the target is the enclosing dataset.

use crate::odrl::Offer;
use serde::{Deserialize, Serialize};

/// Connector service endpoint advertised in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "DataService")]
pub struct DataService {
    /// Service identifier
    #[serde(rename = "@id")]
    pub id: String,

    /// Endpoint URL for negotiation and transfer
    #[serde(rename = "endpointURL")]
    pub endpoint_url: String,
}

/// Accessible form of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "Distribution")]
pub struct Distribution {
    /// Media type or format label
    pub format: String,

    /// Data service serving this distribution (by id)
    #[serde(rename = "accessService")]
    pub access_service: String,
}

/// Dataset with usage policies and distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "Dataset")]
pub struct Dataset {
    /// Dataset identifier
    #[serde(rename = "@id")]
    pub id: String,

    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyword: Vec<String>,

    /// Publication date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,

    /// Last modification date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// License reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Usage policies; at least one, none carrying a target
    #[serde(rename = "hasPolicy")]
    pub has_policy: Vec<Offer>,

    /// Distributions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<Distribution>,
}

/// Collection of datasets served by one connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "Catalog")]
pub struct Catalog {
    /// JSON-LD context
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Catalog identifier
    #[serde(rename = "@id")]
    pub id: String,

    /// Connector participant identifier
    #[serde(rename = "participantId")]
    pub participant_id: String,

    /// Connector service endpoints
    pub service: Vec<DataService>,

    /// Contained datasets; may be empty
    #[serde(default)]
    pub dataset: Vec<Dataset>,
}

/// Query for the full catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:CatalogRequestMessage")]
pub struct CatalogRequestMessage {
    /// Optional filter expressions, kept opaque
    #[serde(rename = "dspace:filter", default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<serde_json::Value>,
}

/// Query for a single dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "dspace:DatasetRequestMessage")]
pub struct DatasetRequestMessage {
    /// Dataset id being requested
    #[serde(rename = "dspace:dataset")]
    pub dataset: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_decodes_catalog_payload() {
        let dataset: Dataset = serde_json::from_value(json!({
            "@id": "urn:uuid:streets-2025",
            "@type": "Dataset",
            "title": "Street register",
            "keyword": ["streets", "public-spaces"],
            "issued": "2025-01-15",
            "hasPolicy": [
                {
                    "@id": "urn:uuid:policy-streets",
                    "@type": "Offer",
                    "permission": [{"action": "use"}]
                }
            ],
            "distribution": [
                {"@type": "Distribution", "format": "application/json",
                 "accessService": "urn:uuid:service-1"}
            ]
        }))
        .unwrap();

        assert_eq!(dataset.id, "urn:uuid:streets-2025");
        assert_eq!(dataset.has_policy.len(), 1);
        assert!(!dataset.has_policy[0].has_target());
        assert_eq!(dataset.distribution[0].format, "application/json");
    }

    #[test]
    fn test_catalog_serializes_with_participant() {
        let catalog = Catalog {
            context: vec![crate::DSPACE_CONTEXT.to_string()],
            id: "urn:uuid:catalog-1".to_string(),
            participant_id: "urn:example:provider".to_string(),
            service: vec![DataService {
                id: "urn:uuid:service-1".to_string(),
                endpoint_url: "https://provider.example.com/connector".to_string(),
            }],
            dataset: vec![],
        };

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["@type"], "Catalog");
        assert_eq!(value["participantId"], "urn:example:provider");
        assert_eq!(value["service"][0]["@type"], "DataService");
    }

    #[test]
    fn test_dataset_request_requires_dataset_id() {
        let result: Result<DatasetRequestMessage, _> = serde_json::from_value(json!({
            "@type": "dspace:DatasetRequestMessage"
        }));
        assert!(result.is_err());
    }
}
