use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use models::errors::{GraphError, GraphResult};
use models::{ClinicalEvent, ClinicalEventEdge, HealthReport, NewClinicalEventEdge, RelationType};

use crate::storage_engine::{ClinicalStore, Dataset};

type EdgeKey = (Uuid, Uuid, RelationType);

/// Process-local engine. Locks are always taken in the order
/// reports, events, edges.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    reports: TokioMutex<HashMap<Uuid, HealthReport>>,
    events: TokioMutex<HashMap<Uuid, ClinicalEvent>>,
    edges: TokioMutex<HashMap<EdgeKey, ClinicalEventEdge>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a dataset; reports first so event provenance resolves. Records
    /// that fail validation or collide with an existing id are skipped.
    /// Returns the events and reports actually inserted.
    pub async fn seed(&self, dataset: Dataset) -> (usize, usize) {
        let mut reports = 0;
        for report in dataset.reports {
            let id = report.id;
            match self.insert_report(report).await {
                Ok(()) => reports += 1,
                Err(e) => warn!("Skipping dataset report {}: {}", id, e),
            }
        }
        let mut events = 0;
        for event in dataset.events {
            let id = event.id;
            match self.insert_event(event).await {
                Ok(()) => events += 1,
                Err(e) => warn!("Skipping dataset event {}: {}", id, e),
            }
        }
        (events, reports)
    }

    pub async fn edge_count(&self) -> usize {
        self.edges.lock().await.len()
    }
}

#[async_trait]
impl ClinicalStore for InMemoryStorage {
    fn get_type(&self) -> &'static str {
        "in_memory"
    }

    async fn insert_event(&self, event: ClinicalEvent) -> GraphResult<()> {
        event.validate()?;
        let mut events = self.events.lock().await;
        if events.contains_key(&event.id) {
            return Err(GraphError::AlreadyExists(format!("clinical event {}", event.id)));
        }
        events.insert(event.id, event);
        Ok(())
    }

    async fn events_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<ClinicalEvent>> {
        let events = self.events.lock().await;
        let mut found: Vec<ClinicalEvent> = events
            .values()
            .filter(|e| e.patient_id == patient_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.event_date.is_none(), e.event_date, e.id));
        Ok(found)
    }

    async fn events_for_report(&self, report_id: Uuid) -> GraphResult<Vec<ClinicalEvent>> {
        let events = self.events.lock().await;
        Ok(events
            .values()
            .filter(|e| e.source_report_id == Some(report_id))
            .cloned()
            .collect())
    }

    async fn insert_report(&self, report: HealthReport) -> GraphResult<()> {
        let mut reports = self.reports.lock().await;
        if reports.contains_key(&report.id) {
            return Err(GraphError::AlreadyExists(format!("health report {}", report.id)));
        }
        reports.insert(report.id, report);
        Ok(())
    }

    async fn get_report(&self, report_id: Uuid) -> GraphResult<Option<HealthReport>> {
        Ok(self.reports.lock().await.get(&report_id).cloned())
    }

    async fn reports_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<HealthReport>> {
        let reports = self.reports.lock().await;
        let mut found: Vec<HealthReport> = reports
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.uploaded_at, r.id));
        Ok(found)
    }

    async fn delete_report(&self, report_id: Uuid) -> GraphResult<usize> {
        let mut reports = self.reports.lock().await;
        let mut events = self.events.lock().await;
        let mut edges = self.edges.lock().await;

        if reports.remove(&report_id).is_none() {
            return Err(GraphError::NotFound(format!("health report {}", report_id)));
        }
        let doomed: HashSet<Uuid> = events
            .values()
            .filter(|e| e.source_report_id == Some(report_id))
            .map(|e| e.id)
            .collect();
        events.retain(|id, _| !doomed.contains(id));
        edges.retain(|(from, to, _), _| !doomed.contains(from) && !doomed.contains(to));
        debug!("Deleted report {} with {} events", report_id, doomed.len());
        Ok(doomed.len())
    }

    async fn insert_edge(&self, edge: NewClinicalEventEdge) -> GraphResult<ClinicalEventEdge> {
        edge.validate()?;
        let events = self.events.lock().await;
        for endpoint in [edge.from_event_id, edge.to_event_id] {
            if !events.contains_key(&endpoint) {
                return Err(GraphError::InvalidData(format!(
                    "edge endpoint {} is not a stored clinical event",
                    endpoint
                )));
            }
        }
        let mut edges = self.edges.lock().await;
        let key = edge.unique_key();
        if edges.contains_key(&key) {
            return Err(GraphError::AlreadyExists(format!(
                "edge {} -[{}]-> {}",
                key.0, key.2, key.1
            )));
        }
        let stored = edge.into_edge(Uuid::new_v4());
        edges.insert(key, stored.clone());
        Ok(stored)
    }

    async fn edges_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<ClinicalEventEdge>> {
        let edges = self.edges.lock().await;
        let mut found: Vec<ClinicalEventEdge> = edges
            .values()
            .filter(|e| e.patient_id == patient_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn delete_edges_for_events(&self, event_ids: &[Uuid]) -> GraphResult<usize> {
        let ids: HashSet<&Uuid> = event_ids.iter().collect();
        let mut edges = self.edges.lock().await;
        let before = edges.len();
        edges.retain(|(from, to, _), _| !ids.contains(from) && !ids.contains(to));
        Ok(before - edges.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use models::EventType;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn edge_between(patient: Uuid, from: &ClinicalEvent, to: &ClinicalEvent) -> NewClinicalEventEdge {
        NewClinicalEventEdge {
            patient_id: patient,
            from_event_id: from.id,
            to_event_id: to.id,
            relation_type: RelationType::LeadsTo,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn seeding_skips_invalid_records_and_keeps_the_rest() {
        let storage = InMemoryStorage::new();
        let patient = Uuid::new_v4();
        let report = HealthReport::new(patient, json!({}), Utc::now());
        let good = ClinicalEvent::new(patient, EventType::Symptom, "headache", date(2024, 2, 1))
            .with_source_report(report.id);
        let blank = ClinicalEvent::new(patient, EventType::Symptom, "  ", date(2024, 2, 2));
        let overconfident = ClinicalEvent::new(patient, EventType::Diagnosis, "migraine", date(2024, 2, 3))
            .with_confidence(2.0);
        let later = ClinicalEvent::new(patient, EventType::Medication, "sumatriptan", date(2024, 2, 4));
        let dataset = Dataset {
            events: vec![good.clone(), blank, overconfident, later.clone(), good.clone()],
            reports: vec![report.clone(), report.clone()],
        };

        assert_eq!(storage.seed(dataset).await, (2, 1));
        let stored: Vec<Uuid> = storage
            .events_for_patient(patient)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(stored, vec![good.id, later.id]);
        assert!(storage.get_report(report.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn events_come_back_in_date_order_with_undated_last() {
        let storage = InMemoryStorage::new();
        let patient = Uuid::new_v4();
        let late = ClinicalEvent::new(patient, EventType::Diagnosis, "asthma", date(2024, 3, 1));
        let undated = ClinicalEvent::new(patient, EventType::DoctorNote, "note", None);
        let early = ClinicalEvent::new(patient, EventType::Symptom, "wheeze", date(2024, 1, 1));
        let other_patient = ClinicalEvent::new(Uuid::new_v4(), EventType::Symptom, "cough", date(2023, 1, 1));
        for event in [late.clone(), undated.clone(), early.clone(), other_patient] {
            storage.insert_event(event).await.unwrap();
        }

        let events = storage.events_for_patient(patient).await.unwrap();
        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![early.id, late.id, undated.id]);
    }

    #[tokio::test]
    async fn duplicate_edge_is_reported_as_unique_violation() {
        let storage = InMemoryStorage::new();
        let patient = Uuid::new_v4();
        let a = ClinicalEvent::new(patient, EventType::Symptom, "chest pain", date(2024, 1, 1));
        let b = ClinicalEvent::new(patient, EventType::Investigation, "ECG", date(2024, 1, 3));
        storage.insert_event(a.clone()).await.unwrap();
        storage.insert_event(b.clone()).await.unwrap();

        storage.insert_edge(edge_between(patient, &a, &b)).await.unwrap();
        let err = storage.insert_edge(edge_between(patient, &a, &b)).await.unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(storage.edge_count().await, 1);

        let mut other_relation = edge_between(patient, &a, &b);
        other_relation.relation_type = RelationType::FollowedBy;
        storage.insert_edge(other_relation).await.unwrap();
        assert_eq!(storage.edge_count().await, 2);
    }

    #[tokio::test]
    async fn edge_to_unknown_event_is_rejected() {
        let storage = InMemoryStorage::new();
        let patient = Uuid::new_v4();
        let a = ClinicalEvent::new(patient, EventType::Symptom, "fever", date(2024, 1, 1));
        let ghost = ClinicalEvent::new(patient, EventType::Investigation, "CBC", date(2024, 1, 2));
        storage.insert_event(a.clone()).await.unwrap();

        let err = storage.insert_edge(edge_between(patient, &a, &ghost)).await.unwrap_err();
        assert!(matches!(err, GraphError::InvalidData(_)));
        assert!(!err.is_unique_violation());
    }

    #[tokio::test]
    async fn deleting_a_report_cascades_to_events_and_edges() {
        let storage = InMemoryStorage::new();
        let patient = Uuid::new_v4();
        let report = HealthReport::new(patient, json!({}), Utc::now());
        let report_id = report.id;
        storage.insert_report(report).await.unwrap();

        let from_report = ClinicalEvent::new(patient, EventType::Symptom, "dizziness", date(2024, 2, 1))
            .with_source_report(report_id);
        let kept = ClinicalEvent::new(patient, EventType::Investigation, "BP reading", date(2024, 2, 2));
        storage.insert_event(from_report.clone()).await.unwrap();
        storage.insert_event(kept.clone()).await.unwrap();
        storage.insert_edge(edge_between(patient, &from_report, &kept)).await.unwrap();

        assert_eq!(storage.delete_report(report_id).await.unwrap(), 1);
        assert_eq!(storage.edge_count().await, 0);
        let remaining = storage.events_for_patient(patient).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
        assert!(storage.delete_report(report_id).await.is_err());
    }

    #[tokio::test]
    async fn delete_edges_for_events_counts_edges_removed() {
        let storage = InMemoryStorage::new();
        let patient = Uuid::new_v4();
        let a = ClinicalEvent::new(patient, EventType::Symptom, "a", date(2024, 1, 1));
        let b = ClinicalEvent::new(patient, EventType::Investigation, "b", date(2024, 1, 2));
        let c = ClinicalEvent::new(patient, EventType::Diagnosis, "c", date(2024, 1, 3));
        for event in [a.clone(), b.clone(), c.clone()] {
            storage.insert_event(event).await.unwrap();
        }
        storage.insert_edge(edge_between(patient, &a, &b)).await.unwrap();
        storage.insert_edge(edge_between(patient, &b, &c)).await.unwrap();
        storage.insert_edge(edge_between(patient, &a, &c)).await.unwrap();

        assert_eq!(storage.delete_edges_for_events(&[b.id]).await.unwrap(), 2);
        assert_eq!(storage.edge_count().await, 1);
    }
}
