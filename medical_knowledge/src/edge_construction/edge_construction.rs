// medical_knowledge/src/edge_construction/edge_construction.rs
//! Edge Construction Engine: confidence-weighted temporal links between a
//! patient's clinical events.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use uuid::Uuid;

use lib::config::CorrelationConfig;
use lib::storage_engine::ClinicalStore;
use models::errors::{GraphError, GraphResult};
use models::{ClinicalEvent, ClinicalEventEdge, EdgeRule, EventType, NewClinicalEventEdge, RelationType};

const STANDARD_RULES: [EdgeRule; 12] = [
    EdgeRule::new(EventType::Symptom, EventType::Investigation, RelationType::LeadsTo, 10),
    EdgeRule::new(EventType::Symptom, EventType::LabResult, RelationType::LeadsTo, 9),
    EdgeRule::new(EventType::Investigation, EventType::Diagnosis, RelationType::Confirms, 9),
    EdgeRule::new(EventType::LabResult, EventType::Diagnosis, RelationType::Confirms, 9),
    EdgeRule::new(EventType::Symptom, EventType::Diagnosis, RelationType::LeadsTo, 8),
    EdgeRule::new(EventType::Diagnosis, EventType::Medication, RelationType::TreatedBy, 7),
    EdgeRule::new(EventType::Diagnosis, EventType::Treatment, RelationType::TreatedBy, 7),
    EdgeRule::new(EventType::Medication, EventType::LabResult, RelationType::Monitors, 6),
    EdgeRule::new(EventType::Medication, EventType::FollowUp, RelationType::Monitors, 5),
    EdgeRule::new(EventType::Treatment, EventType::FollowUp, RelationType::FollowedBy, 5),
    EdgeRule::new(EventType::Diagnosis, EventType::FollowUp, RelationType::FollowedBy, 4),
    EdgeRule::new(EventType::Medication, EventType::Symptom, RelationType::CausedBy, 3),
];

/// Relation rules ordered by priority, highest first. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRuleTable {
    rules: Vec<EdgeRule>,
}

impl EdgeRuleTable {
    pub fn standard() -> Self {
        Self { rules: STANDARD_RULES.to_vec() }
    }

    pub fn from_rules(mut rules: Vec<EdgeRule>) -> GraphResult<Self> {
        if rules.is_empty() {
            return Err(GraphError::ConfigurationError("edge rule table is empty".to_string()));
        }
        for rule in &rules {
            rule.validate()?;
        }
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[EdgeRule] {
        &self.rules
    }
}

impl Default for EdgeRuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationSettings {
    pub max_window_days: i64,
    pub min_decay: f64,
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        Self::from(&CorrelationConfig::default())
    }
}

impl From<&CorrelationConfig> for CorrelationSettings {
    fn from(config: &CorrelationConfig) -> Self {
        Self {
            max_window_days: config.max_window_days,
            min_decay: config.min_decay,
        }
    }
}

impl CorrelationSettings {
    /// Linear decay over the window, floored at `min_decay`. `None` outside
    /// `0..=max_window_days`.
    pub fn decay(&self, days: i64) -> Option<f64> {
        if days < 0 || days > self.max_window_days {
            return None;
        }
        let linear = 1.0 - days as f64 / self.max_window_days as f64;
        Some(linear.max(self.min_decay))
    }
}

/// Every edge the rule table implies for `events`, without touching storage.
/// Undated events never participate.
pub fn derive_edge_candidates(
    patient_id: Uuid,
    events: &[ClinicalEvent],
    rules: &EdgeRuleTable,
    settings: &CorrelationSettings,
) -> Vec<NewClinicalEventEdge> {
    let dated: Vec<&ClinicalEvent> = events.iter().filter(|e| e.event_date.is_some()).collect();
    let mut candidates = Vec::new();

    for rule in rules.rules() {
        for from in dated.iter().filter(|e| e.event_type == rule.from_type) {
            for to in dated.iter().filter(|e| e.event_type == rule.to_type) {
                if from.id == to.id {
                    continue;
                }
                let (Some(from_date), Some(to_date)) = (from.event_date, to.event_date) else {
                    continue;
                };
                let days = to_date.signed_duration_since(from_date).num_days();
                let Some(decay) = settings.decay(days) else {
                    continue;
                };
                candidates.push(NewClinicalEventEdge {
                    patient_id,
                    from_event_id: from.id,
                    to_event_id: to.id,
                    relation_type: rule.relation,
                    confidence: rule.base_confidence() * decay,
                });
            }
        }
    }
    candidates
}

/// Outcome of one construction run. `created_edge_ids` holds only edges that
/// did not exist before.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeConstructionSummary {
    pub created_edge_ids: Vec<Uuid>,
    pub duplicates: usize,
    pub failures: usize,
    pub candidates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: Vec<Uuid>,
    pub edges_created: usize,
}

#[derive(Debug, Clone)]
pub struct EdgeConstructionEngine {
    store: Arc<dyn ClinicalStore>,
    rules: Arc<EdgeRuleTable>,
    settings: CorrelationSettings,
}

impl EdgeConstructionEngine {
    pub fn new(store: Arc<dyn ClinicalStore>, rules: EdgeRuleTable, settings: CorrelationSettings) -> Self {
        Self {
            store,
            rules: Arc::new(rules),
            settings,
        }
    }

    pub fn rules(&self) -> &EdgeRuleTable {
        &self.rules
    }

    /// Best-effort construction: a failed event read yields an empty summary.
    pub async fn construct_edges(&self, patient_id: Uuid) -> EdgeConstructionSummary {
        match self.try_construct_edges(patient_id).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Failed to load events for patient {}: {}", patient_id, e);
                EdgeConstructionSummary::default()
            }
        }
    }

    /// Like [`construct_edges`](Self::construct_edges) but surfaces the read
    /// failure. Insert failures are still isolated per edge.
    pub async fn try_construct_edges(&self, patient_id: Uuid) -> GraphResult<EdgeConstructionSummary> {
        let events = self.store.events_for_patient(patient_id).await?;
        let candidates = derive_edge_candidates(patient_id, &events, &self.rules, &self.settings);
        let mut summary = EdgeConstructionSummary {
            candidates: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            let (from, to, relation) = candidate.unique_key();
            match self.store.insert_edge(candidate).await {
                Ok(edge) => summary.created_edge_ids.push(edge.id),
                Err(e) if e.is_unique_violation() => {
                    debug!("Edge {} -[{}]-> {} already exists", from, relation, to);
                    summary.duplicates += 1;
                }
                Err(e) => {
                    warn!("Failed to insert edge {} -[{}]-> {}: {}", from, relation, to, e);
                    summary.failures += 1;
                }
            }
        }

        info!(
            "Patient {}: {} edges created, {} already present, {} failed",
            patient_id,
            summary.created_edge_ids.len(),
            summary.duplicates,
            summary.failures
        );
        Ok(summary)
    }

    /// Deletes every edge touching an event extracted from `report_id`.
    ///
    /// Returns the number of source events found for the report, NOT the
    /// number of edges deleted.
    pub async fn remove_edges_for_report(&self, report_id: Uuid) -> GraphResult<usize> {
        let event_ids: Vec<Uuid> = self
            .store
            .events_for_report(report_id)
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect();
        if event_ids.is_empty() {
            debug!("Report {} has no extracted events", report_id);
            return Ok(0);
        }
        let deleted = self.store.delete_edges_for_events(&event_ids).await?;
        info!(
            "Removed {} edges touching {} events of report {}",
            deleted,
            event_ids.len(),
            report_id
        );
        Ok(event_ids.len())
    }

    pub async fn edges_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<ClinicalEventEdge>> {
        self.store.edges_for_patient(patient_id).await
    }

    /// Rebuilds edges patient by patient; one failure does not stop the batch.
    pub async fn reprocess_patients(&self, patient_ids: &[Uuid]) -> BatchSummary {
        let mut batch = BatchSummary::default();
        for &patient_id in patient_ids {
            match self.try_construct_edges(patient_id).await {
                Ok(summary) => {
                    batch.succeeded += 1;
                    batch.edges_created += summary.created_edge_ids.len();
                }
                Err(e) => {
                    error!("Reprocessing patient {} failed: {}", patient_id, e);
                    batch.failed.push(patient_id);
                }
            }
        }
        info!(
            "Reprocessed {} patients: {} succeeded, {} failed",
            patient_ids.len(),
            batch.succeeded,
            batch.failed.len()
        );
        batch
    }

    /// For each report, drops the edges of its events and rebuilds the
    /// owning patient's edges.
    pub async fn reprocess_reports(&self, report_ids: &[Uuid]) -> BatchSummary {
        let mut batch = BatchSummary::default();
        for &report_id in report_ids {
            match self.reprocess_report(report_id).await {
                Ok(created) => {
                    batch.succeeded += 1;
                    batch.edges_created += created;
                }
                Err(e) => {
                    error!("Reprocessing report {} failed: {}", report_id, e);
                    batch.failed.push(report_id);
                }
            }
        }
        info!(
            "Reprocessed {} reports: {} succeeded, {} failed",
            report_ids.len(),
            batch.succeeded,
            batch.failed.len()
        );
        batch
    }

    async fn reprocess_report(&self, report_id: Uuid) -> GraphResult<usize> {
        let report = self
            .store
            .get_report(report_id)
            .await?
            .ok_or_else(|| GraphError::NotFound(format!("health report {}", report_id)))?;
        self.remove_edges_for_report(report_id).await?;
        let summary = self.try_construct_edges(report.patient_id).await?;
        Ok(summary.created_edge_ids.len())
    }
}
