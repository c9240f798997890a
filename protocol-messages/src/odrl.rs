//! ODRL policy structures
//!
//! Open Digital Rights Language offers and agreements in JSON-LD compact
//! form. An [`Offer`] is a usage-policy proposal over a target dataset; an
//! [`Agreement`] is the immutable result of a successful negotiation.
//!
//! Target-presence invariant: an offer carried inside a contract request or
//! contract offer message MUST name its target dataset; an offer embedded in
//! a catalog or dataset MUST NOT (the target is inherited from the
//! enclosing dataset).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Atomic condition on a permission, prohibition or duty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Left operand (e.g. `spatial`, `dateTime`)
    #[serde(rename = "leftOperand")]
    pub left_operand: String,

    /// Comparison operator (e.g. `eq`, `lteq`)
    pub operator: String,

    /// Right operand, kept opaque
    #[serde(rename = "rightOperand")]
    pub right_operand: String,
}

/// Permitted action with optional constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Action the permission grants (e.g. `use`)
    pub action: String,

    /// Constraints that must all hold for the action to be allowed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraint: Vec<Constraint>,
}

/// Forbidden action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prohibition {
    /// Action the prohibition forbids
    pub action: String,

    /// Constraints scoping the prohibition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraint: Vec<Constraint>,
}

/// Duty that must be fulfilled alongside the granted permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duty {
    /// Action the duty requires
    pub action: String,

    /// Constraints scoping the duty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraint: Vec<Constraint>,
}

/// Usage-policy proposal over a target dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "Offer")]
pub struct Offer {
    /// Policy identifier (IRI/URN)
    #[serde(rename = "@id")]
    pub id: String,

    /// Target dataset id; context-dependent, see the module invariant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Provider participant id, optional until agreement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigner: Option<String>,

    /// Consumer participant id, optional until agreement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Granted permissions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permission: Vec<Permission>,

    /// Prohibitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibition: Vec<Prohibition>,

    /// Obligations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obligation: Vec<Duty>,
}

impl Offer {
    /// Whether the offer names a target dataset
    pub fn has_target(&self) -> bool {
        self.target.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Immutable result of a successful negotiation
///
/// Created exactly once per negotiation, when the process reaches AGREED:
/// the policy body comes from the offer under discussion, the timestamp and
/// participant ids from the agreement message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type", rename = "Agreement")]
pub struct Agreement {
    /// Agreement identifier (IRI/URN)
    #[serde(rename = "@id")]
    pub id: String,

    /// Target dataset id, always present in an agreement
    pub target: String,

    /// Time the provider entered the agreement
    #[serde(rename = "dspace:timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Provider participant id
    pub assigner: String,

    /// Consumer participant id
    pub assignee: String,

    /// Granted permissions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permission: Vec<Permission>,

    /// Prohibitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibition: Vec<Prohibition>,

    /// Obligations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obligation: Vec<Duty>,
}
