// models/src/medical/pathway.rs
//! Care-pathway templates and the per-request projection of a patient onto one.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::medical::ProjectionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StepType {
    Investigation,
    Decision,
    Treatment,
    FollowUp,
}

impl FromStr for StepType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "investigation" => Ok(StepType::Investigation),
            "decision" => Ok(StepType::Decision),
            "treatment" => Ok(StepType::Treatment),
            "follow_up" | "followup" => Ok(StepType::FollowUp),
            other => Err(ValidationError::InvalidIdentifier(other.to_string())),
        }
    }
}

impl TryFrom<String> for StepType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A canonical care step. `criteria` keywords are OR-matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayStep {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub criteria: Vec<String>,
}

impl PathwayStep {
    pub fn new(id: &str, label: &str, step_type: StepType, criteria: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            step_type,
            criteria: criteria.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayEdge {
    pub from: String,
    pub to: String,
}

impl PathwayEdge {
    pub fn new(from: &str, to: &str) -> Self {
        Self { from: from.to_string(), to: to.to_string() }
    }
}

/// Immutable, versioned guideline graph for one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayTemplate {
    pub key: String,
    pub condition: String,
    #[serde(default = "default_version")]
    pub version: u32,
    /// Normalized substrings a free-text condition must contain to select this template.
    pub aliases: Vec<String>,
    pub steps: Vec<PathwayStep>,
    pub edges: Vec<PathwayEdge>,
}

fn default_version() -> u32 {
    1
}

impl PathwayTemplate {
    pub fn step(&self, id: &str) -> Option<&PathwayStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Step ids are unique and every edge endpoint names a defined step.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(ValidationError::DuplicateStep {
                    template: self.key.clone(),
                    step: step.id.clone(),
                });
            }
        }
        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(ValidationError::UnknownStep {
                        template: self.key.clone(),
                        step: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Current,
    Completed,
}

/// A template step enriched with the patient's matching events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedStep {
    #[serde(flatten)]
    pub step: PathwayStep,
    pub status: StepStatus,
    pub matched_event: Option<ProjectionEvent>,
    pub matched_events: Vec<ProjectionEvent>,
}

/// Which event set a projection was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    ClinicalEvents,
    ReportFallback,
}

/// Ephemeral result returned to the caller for rendering; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayProjection {
    pub condition: String,
    pub template_key: String,
    pub template_version: u32,
    pub steps: Vec<ProjectedStep>,
    pub edges: Vec<PathwayEdge>,
    pub event_source: EventSource,
}

impl PathwayProjection {
    pub fn step(&self, id: &str) -> Option<&ProjectedStep> {
        self.steps.iter().find(|s| s.step.id == id)
    }

    pub fn current_step(&self) -> Option<&ProjectedStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Current)
    }
}
