// models/src/edges.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::medical::EventType;

/// Relationship carried by a directed edge between two clinical events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum RelationType {
    LeadsTo,
    Confirms,
    RulesOut,
    FollowedBy,
    CausedBy,
    TreatedBy,
    Monitors,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::LeadsTo => "leads_to",
            RelationType::Confirms => "confirms",
            RelationType::RulesOut => "rules_out",
            RelationType::FollowedBy => "followed_by",
            RelationType::CausedBy => "caused_by",
            RelationType::TreatedBy => "treated_by",
            RelationType::Monitors => "monitors",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "leads_to" => Ok(RelationType::LeadsTo),
            "confirms" => Ok(RelationType::Confirms),
            "rules_out" => Ok(RelationType::RulesOut),
            "followed_by" => Ok(RelationType::FollowedBy),
            "caused_by" => Ok(RelationType::CausedBy),
            "treated_by" => Ok(RelationType::TreatedBy),
            "monitors" => Ok(RelationType::Monitors),
            other => Err(ValidationError::InvalidIdentifier(other.to_string())),
        }
    }
}

impl TryFrom<String> for RelationType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One row of the relation rule table: events of `from_type` followed by
/// events of `to_type` are linked with `relation`, weighted by `priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRule {
    pub from_type: EventType,
    pub to_type: EventType,
    pub relation: RelationType,
    pub priority: u8,
}

impl EdgeRule {
    pub const fn new(from_type: EventType, to_type: EventType, relation: RelationType, priority: u8) -> Self {
        Self { from_type, to_type, relation, priority }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if !(1..=10).contains(&self.priority) {
            return Err(ValidationError::PriorityOutOfRange(self.priority));
        }
        Ok(())
    }

    /// Upper bound of the confidence an edge produced by this rule can carry.
    pub fn base_confidence(&self) -> f64 {
        f64::from(self.priority) / 10.0
    }
}

/// An edge as requested by the construction engine, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClinicalEventEdge {
    pub patient_id: Uuid,
    pub from_event_id: Uuid,
    pub to_event_id: Uuid,
    pub relation_type: RelationType,
    pub confidence: f64,
}

impl NewClinicalEventEdge {
    /// Key enforced unique by every store.
    pub fn unique_key(&self) -> (Uuid, Uuid, RelationType) {
        (self.from_event_id, self.to_event_id, self.relation_type)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ValidationError::ConfidenceOutOfRange(self.confidence));
        }
        Ok(())
    }

    pub fn into_edge(self, id: Uuid) -> ClinicalEventEdge {
        ClinicalEventEdge {
            id,
            patient_id: self.patient_id,
            from_event_id: self.from_event_id,
            to_event_id: self.to_event_id,
            relation_type: self.relation_type,
            confidence: self.confidence,
        }
    }
}

/// A directed, typed, confidence-weighted relationship between two events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalEventEdge {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub from_event_id: Uuid,
    pub to_event_id: Uuid,
    pub relation_type: RelationType,
    pub confidence: f64,
}

impl ClinicalEventEdge {
    pub fn unique_key(&self) -> (Uuid, Uuid, RelationType) {
        (self.from_event_id, self.to_event_id, self.relation_type)
    }

    pub fn touches(&self, event_id: &Uuid) -> bool {
        self.from_event_id == *event_id || self.to_event_id == *event_id
    }
}
