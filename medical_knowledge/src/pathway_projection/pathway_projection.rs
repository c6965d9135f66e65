// medical_knowledge/src/pathway_projection/pathway_projection.rs
//! Pathway Projection Engine: places a patient's events on a care-pathway
//! template and derives per-step status. Read-only.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use lib::storage_engine::ClinicalStore;
use models::medical::{
    extracted_item_name, EventSource, EventType, HealthReport, PathwayProjection, PathwayTemplate,
    ProjectedStep, ProjectionEvent, StepStatus,
};

use crate::pathway_templates::{normalize_text, PathwayRegistry};

/// Result of a projection request. Only a store-independent absence of
/// template or events is reported here; neither is an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProjectionOutcome {
    Projected(PathwayProjection),
    UnsupportedCondition { condition: String },
    NoEvents { condition: String },
}

impl ProjectionOutcome {
    pub fn into_projection(self) -> Option<PathwayProjection> {
        match self {
            ProjectionOutcome::Projected(projection) => Some(projection),
            _ => None,
        }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, ProjectionOutcome::Projected(_))
    }
}

/// Builds synthetic events from the structured extraction of raw reports.
/// Conditions become diagnoses, parameters lab results, medications
/// medications. The first mention of a `(type, name)` pair wins. Entries
/// without a name are skipped one by one; a report is skipped only when its
/// `data` section is not an object.
pub fn synthesize_from_reports(reports: &[HealthReport]) -> Vec<ProjectionEvent> {
    let mut seen = HashSet::new();
    let mut events = Vec::new();

    for report in reports {
        let extraction = match report.extraction() {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Skipping report {} with unreadable extraction: {}", report.id, e);
                continue;
            }
        };
        let groups = [
            (EventType::Diagnosis, &extraction.conditions),
            (EventType::LabResult, &extraction.parameters),
            (EventType::Medication, &extraction.medications),
        ];
        for (event_type, items) in groups {
            for item in items {
                let Some(name) = extracted_item_name(item) else {
                    warn!("Skipping unnamed {} entry in report {}: {}", event_type, report.id, item);
                    continue;
                };
                let event = ProjectionEvent::from_report_extraction(report, event_type, name);
                if seen.insert(event.dedup_key()) {
                    events.push(event);
                }
            }
        }
    }
    events
}

/// Matches `events` against every step of `template`.
///
/// Pass 1 resolves each step on its own: any substring keyword hit makes it
/// completed, with the most recent hit as `matched_event`. Pass 2 then runs
/// over the fully resolved list and promotes the first pending step to
/// current. Completed steps after it stay completed.
pub fn project_events(template: &PathwayTemplate, events: &[ProjectionEvent]) -> Vec<ProjectedStep> {
    let normalized_names: Vec<String> = events.iter().map(|e| normalize_text(&e.event_name)).collect();

    let mut steps: Vec<ProjectedStep> = template
        .steps
        .iter()
        .map(|step| {
            let keywords: Vec<String> = step
                .criteria
                .iter()
                .map(|k| normalize_text(k))
                .filter(|k| !k.is_empty())
                .collect();
            let matched_events: Vec<ProjectionEvent> = events
                .iter()
                .zip(&normalized_names)
                .filter(|(_, name)| keywords.iter().any(|k| name.contains(k.as_str())))
                .map(|(event, _)| event.clone())
                .collect();
            let matched_event = matched_events.iter().max_by_key(|e| e.event_date).cloned();
            let status = if matched_events.is_empty() {
                StepStatus::Pending
            } else {
                StepStatus::Completed
            };
            ProjectedStep {
                step: step.clone(),
                status,
                matched_event,
                matched_events,
            }
        })
        .collect();

    if let Some(first_pending) = steps.iter_mut().find(|s| s.status == StepStatus::Pending) {
        first_pending.status = StepStatus::Current;
    }
    steps
}

#[derive(Debug, Clone)]
pub struct PathwayProjectionEngine {
    store: Arc<dyn ClinicalStore>,
    registry: Arc<PathwayRegistry>,
}

impl PathwayProjectionEngine {
    pub fn new(store: Arc<dyn ClinicalStore>, registry: Arc<PathwayRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &PathwayRegistry {
        &self.registry
    }

    pub async fn project_pathway(&self, patient_id: Uuid, condition: &str) -> ProjectionOutcome {
        let Some(template) = self.registry.resolve(condition) else {
            info!("No pathway template for condition '{}'", condition);
            return ProjectionOutcome::UnsupportedCondition { condition: condition.to_string() };
        };

        let (events, event_source) = self.load_events(patient_id).await;
        if events.is_empty() {
            info!("Patient {} has no events to project onto {}", patient_id, template.key);
            return ProjectionOutcome::NoEvents { condition: condition.to_string() };
        }

        let steps = project_events(template, &events);
        debug!(
            "Projected {} events for patient {} onto {} v{}",
            events.len(),
            patient_id,
            template.key,
            template.version
        );
        ProjectionOutcome::Projected(PathwayProjection {
            condition: template.condition.clone(),
            template_key: template.key.clone(),
            template_version: template.version,
            steps,
            edges: template.edges.clone(),
            event_source,
        })
    }

    /// Stored events when the patient has any, otherwise events synthesized
    /// from the patient's raw reports. Read failures count as "nothing found".
    async fn load_events(&self, patient_id: Uuid) -> (Vec<ProjectionEvent>, EventSource) {
        let stored = self.store.events_for_patient(patient_id).await.unwrap_or_else(|e| {
            warn!("Failed to load events for patient {}: {}", patient_id, e);
            Vec::new()
        });
        if !stored.is_empty() {
            let events = stored.iter().map(ProjectionEvent::from_stored_event).collect();
            return (events, EventSource::ClinicalEvents);
        }

        let reports = self.store.reports_for_patient(patient_id).await.unwrap_or_else(|e| {
            warn!("Failed to load reports for patient {}: {}", patient_id, e);
            Vec::new()
        });
        debug!(
            "Patient {} has no clinical events; falling back to {} reports",
            patient_id,
            reports.len()
        );
        (synthesize_from_reports(&reports), EventSource::ReportFallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use lib::storage_engine::InMemoryStorage;
    use models::medical::ClinicalEvent;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn engine(store: Arc<InMemoryStorage>) -> PathwayProjectionEngine {
        PathwayProjectionEngine::new(store, Arc::new(PathwayRegistry::standard()))
    }

    fn status_of(projection: &PathwayProjection, step: &str) -> StepStatus {
        projection.step(step).map(|s| s.status).unwrap()
    }

    #[tokio::test]
    async fn single_hba1c_test_completes_screening_only() {
        let store = Arc::new(InMemoryStorage::new());
        let patient = Uuid::new_v4();
        store
            .insert_event(ClinicalEvent::new(patient, EventType::Investigation, "HbA1c test", date(2024, 1, 10)))
            .await
            .unwrap();

        let projection = engine(store)
            .project_pathway(patient, "Type 2 Diabetes")
            .await
            .into_projection()
            .unwrap();

        assert_eq!(projection.template_key, "type_2_diabetes");
        assert_eq!(projection.event_source, EventSource::ClinicalEvents);
        assert_eq!(status_of(&projection, "screening"), StepStatus::Completed);
        assert_eq!(status_of(&projection, "diagnosis_confirmed"), StepStatus::Current);
        for step in &projection.steps[2..] {
            assert_eq!(step.status, StepStatus::Pending, "step {}", step.step.id);
        }
        assert!(!projection.edges.is_empty());
    }

    #[tokio::test]
    async fn unknown_condition_is_unsupported_not_an_error() {
        let store = Arc::new(InMemoryStorage::new());
        let outcome = engine(store).project_pathway(Uuid::new_v4(), "Asthma").await;
        assert_eq!(outcome, ProjectionOutcome::UnsupportedCondition { condition: "Asthma".to_string() });
        assert!(outcome.into_projection().is_none());
    }

    #[tokio::test]
    async fn falls_back_to_report_extraction_without_events() {
        let store = Arc::new(InMemoryStorage::new());
        let patient = Uuid::new_v4();
        store
            .insert_report(HealthReport::new(
                patient,
                json!({ "data": { "conditions": [{ "name": "Type 2 Diabetes" }] } }),
                Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            ))
            .await
            .unwrap();

        let projection = engine(store)
            .project_pathway(patient, "type 2 diabetes")
            .await
            .into_projection()
            .unwrap();

        assert_eq!(projection.event_source, EventSource::ReportFallback);
        let diagnosis = projection.step("diagnosis_confirmed").unwrap();
        assert_eq!(diagnosis.status, StepStatus::Completed);
        let matched = diagnosis.matched_event.as_ref().unwrap();
        assert_eq!(matched.event_type, EventType::Diagnosis);
        assert_eq!(matched.event_date, date(2024, 6, 1));
        assert_eq!(status_of(&projection, "screening"), StepStatus::Current);
    }

    #[tokio::test]
    async fn no_events_and_no_reports_yields_no_projection() {
        let store = Arc::new(InMemoryStorage::new());
        let outcome = engine(store).project_pathway(Uuid::new_v4(), "Hypertension").await;
        assert!(matches!(outcome, ProjectionOutcome::NoEvents { .. }));
    }

    #[test]
    fn out_of_order_completion_is_preserved() {
        let template = PathwayRegistry::standard().resolve("diabetes").cloned().unwrap();
        let patient = Uuid::new_v4();
        let metformin = ClinicalEvent::new(patient, EventType::Medication, "Metformin 500mg", date(2024, 2, 1));
        let steps = project_events(&template, &[ProjectionEvent::from_stored_event(&metformin)]);

        let statuses: Vec<(&str, StepStatus)> = steps.iter().map(|s| (s.step.id.as_str(), s.status)).collect();
        assert_eq!(statuses[0], ("screening", StepStatus::Current));
        assert_eq!(statuses[1], ("diagnosis_confirmed", StepStatus::Pending));
        assert_eq!(statuses[3], ("first_line_therapy", StepStatus::Completed));
        assert_eq!(steps.iter().filter(|s| s.status == StepStatus::Current).count(), 1);
    }

    #[test]
    fn keywords_match_as_substrings_of_longer_names() {
        let template = PathwayRegistry::standard().resolve("T2DM").cloned().unwrap();
        let patient = Uuid::new_v4();
        let events: Vec<ProjectionEvent> = ["Dapagliflozin (SGLT2 inhibitor)", "Empagliflozin"]
            .iter()
            .map(|name| {
                let event = ClinicalEvent::new(patient, EventType::Medication, *name, date(2024, 3, 1));
                ProjectionEvent::from_stored_event(&event)
            })
            .collect();

        let steps = project_events(&template, &events);
        let intensification = steps.iter().find(|s| s.step.id == "therapy_intensification").unwrap();
        assert_eq!(intensification.status, StepStatus::Completed);
        assert_eq!(intensification.matched_events.len(), 2);
    }

    #[test]
    fn matched_event_is_the_most_recent_hit() {
        let template = PathwayRegistry::standard().resolve("diabetes").cloned().unwrap();
        let patient = Uuid::new_v4();
        let events: Vec<ProjectionEvent> = [
            ("HbA1c", date(2024, 1, 5)),
            ("HbA1c", date(2024, 7, 5)),
            ("HbA1c", None),
            ("Fasting glucose", date(2024, 4, 1)),
        ]
        .iter()
        .map(|(name, when)| {
            ProjectionEvent::from_stored_event(&ClinicalEvent::new(patient, EventType::LabResult, *name, *when))
        })
        .collect();

        let steps = project_events(&template, &events);
        let screening = &steps[0];
        assert_eq!(screening.matched_events.len(), 4);
        assert_eq!(screening.matched_event.as_ref().unwrap().event_date, date(2024, 7, 5));
    }

    #[test]
    fn every_step_completed_leaves_no_current_step() {
        let template = PathwayRegistry::standard().resolve("hyperlipidemia").cloned().unwrap();
        let names = ["LDL", "dyslipidemia", "diet counselling", "atorvastatin", "ezetimibe", "repeat lipid panel"];
        let events: Vec<ProjectionEvent> = names
            .iter()
            .map(|n| ProjectionEvent::from_stored_event(&ClinicalEvent::new(Uuid::new_v4(), EventType::Other, *n, None)))
            .collect();
        let steps = project_events(&template, &events);
        assert!(steps.iter().all(|s| s.status == StepStatus::Completed));
    }

    #[test]
    fn synthesized_events_are_deduplicated_across_reports() {
        let patient = Uuid::new_v4();
        let first = HealthReport::new(
            patient,
            json!({ "data": {
                "conditions": ["Hypertension"],
                "parameters": [{ "test_name": "Serum creatinine" }],
                "medications": [{ "name": "Amlodipine" }]
            }}),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let second = HealthReport::new(
            patient,
            json!({ "data": { "medications": ["amlodipine ", "  "], "conditions": [{ "name": "hypertension" }] } }),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        );
        let garbled = HealthReport::new(patient, json!({ "data": "unparsed" }), Utc::now());

        let events = synthesize_from_reports(&[first, second, garbled]);
        let kinds: Vec<(EventType, &str)> = events.iter().map(|e| (e.event_type, e.event_name.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (EventType::Diagnosis, "Hypertension"),
                (EventType::LabResult, "Serum creatinine"),
                (EventType::Medication, "Amlodipine"),
            ]
        );
        assert!(events.iter().all(|e| e.id.is_none() && e.event_date == date(2024, 1, 1)));
    }

    #[test]
    fn one_bad_entry_does_not_drop_its_report() {
        let patient = Uuid::new_v4();
        let report = HealthReport::new(
            patient,
            json!({ "data": {
                "conditions": [{ "name": "Type 2 Diabetes", "condition": "T2DM" }],
                "parameters": [{ "value": "7.9", "unit": "%" }, { "test_name": "HbA1c", "value": "8.1" }],
                "medications": null
            }}),
            Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
        );

        let events = synthesize_from_reports(&[report]);
        let kinds: Vec<(EventType, &str)> = events.iter().map(|e| (e.event_type, e.event_name.as_str())).collect();
        assert_eq!(
            kinds,
            vec![(EventType::Diagnosis, "Type 2 Diabetes"), (EventType::LabResult, "HbA1c")]
        );
    }

    #[tokio::test]
    async fn partially_unreadable_report_still_projects() {
        let store = Arc::new(InMemoryStorage::new());
        let patient = Uuid::new_v4();
        store
            .insert_report(HealthReport::new(
                patient,
                json!({ "data": {
                    "conditions": [{ "name": "Hypertension", "test_name": "Hypertension" }],
                    "parameters": [{ "unit": "mmHg" }],
                    "medications": null
                }}),
                Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap(),
            ))
            .await
            .unwrap();

        let projection = engine(store)
            .project_pathway(patient, "Hypertension")
            .await
            .into_projection()
            .unwrap();

        assert_eq!(projection.event_source, EventSource::ReportFallback);
        assert_eq!(status_of(&projection, "diagnosis_confirmed"), StepStatus::Completed);
        assert_eq!(status_of(&projection, "bp_screening"), StepStatus::Current);
    }
}
