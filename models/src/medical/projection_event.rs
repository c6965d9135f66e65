// models/src/medical/projection_event.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::medical::{ClinicalEvent, EventType, HealthReport};

/// Where a projection event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    Stored,
    ReportExtraction,
}

/// Shape-agnostic event consumed by pathway matching. Stored events and
/// events synthesized from a report's extraction both end up here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionEvent {
    pub id: Option<Uuid>,
    pub event_type: EventType,
    pub event_name: String,
    pub event_date: Option<NaiveDate>,
    pub source_report_id: Option<Uuid>,
    pub origin: EventOrigin,
}

impl ProjectionEvent {
    pub fn from_stored_event(event: &ClinicalEvent) -> Self {
        Self {
            id: Some(event.id),
            event_type: event.event_type,
            event_name: event.event_name.clone(),
            event_date: event.event_date,
            source_report_id: event.source_report_id,
            origin: EventOrigin::Stored,
        }
    }

    /// Synthetic event for one extracted entry; dated by the report upload.
    pub fn from_report_extraction(
        report: &HealthReport,
        event_type: EventType,
        event_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            event_type,
            event_name: event_name.into(),
            event_date: Some(report.uploaded_at.date_naive()),
            source_report_id: Some(report.id),
            origin: EventOrigin::ReportExtraction,
        }
    }

    /// Composite key used to collapse repeated mentions across reports.
    pub fn dedup_key(&self) -> (EventType, String) {
        (self.event_type, self.event_name.trim().to_lowercase())
    }
}
