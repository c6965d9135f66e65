// models/src/medical/clinical_event.rs
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};

/// Kind of a discrete clinical occurrence extracted from a report.
/// Deserialization goes through [`FromStr`], so YAML scalars and JSON strings
/// read the same way; unrecognized kinds become [`EventType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EventType {
    Symptom,
    Investigation,
    Diagnosis,
    LabResult,
    Medication,
    Treatment,
    Procedure,
    FollowUp,
    DoctorNote,
    AiSummary,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Symptom => "symptom",
            EventType::Investigation => "investigation",
            EventType::Diagnosis => "diagnosis",
            EventType::LabResult => "lab_result",
            EventType::Medication => "medication",
            EventType::Treatment => "treatment",
            EventType::Procedure => "procedure",
            EventType::FollowUp => "follow_up",
            EventType::DoctorNote => "doctor_note",
            EventType::AiSummary => "ai_summary",
            EventType::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "symptom" => Ok(EventType::Symptom),
            "investigation" | "test" => Ok(EventType::Investigation),
            "diagnosis" => Ok(EventType::Diagnosis),
            "lab_result" | "lab" => Ok(EventType::LabResult),
            "medication" => Ok(EventType::Medication),
            "treatment" => Ok(EventType::Treatment),
            "procedure" => Ok(EventType::Procedure),
            "follow_up" | "followup" => Ok(EventType::FollowUp),
            "doctor_note" => Ok(EventType::DoctorNote),
            "ai_summary" => Ok(EventType::AiSummary),
            "other" => Ok(EventType::Other),
            other => Err(ValidationError::InvalidIdentifier(other.to_string())),
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(EventType::Other)
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// A dated patient occurrence produced by upstream extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalEvent {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub event_type: EventType,
    pub event_name: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub source_report_id: Option<Uuid>,
}

impl ClinicalEvent {
    pub fn new(
        patient_id: Uuid,
        event_type: EventType,
        event_name: impl Into<String>,
        event_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            event_type,
            event_name: event_name.into(),
            event_date,
            confidence: default_confidence(),
            metadata: serde_json::Value::Null,
            source_report_id: None,
        }
    }

    pub fn with_source_report(mut self, report_id: Uuid) -> Self {
        self.source_report_id = Some(report_id);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ValidationError::ConfidenceOutOfRange(self.confidence));
        }
        if self.event_name.trim().is_empty() {
            return Err(ValidationError::InvalidIdentifier(self.id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&EventType::LabResult).unwrap();
        assert_eq!(json, "\"lab_result\"");
        let parsed: EventType = serde_json::from_str("\"follow_up\"").unwrap();
        assert_eq!(parsed, EventType::FollowUp);
    }

    #[test]
    fn unknown_event_type_maps_to_other() {
        let parsed: EventType = serde_json::from_str("\"imaging_report\"").unwrap();
        assert_eq!(parsed, EventType::Other);
    }

    #[test]
    fn stored_record_deserializes_with_defaults() {
        let raw = r#"{
            "id": "7f1d5e2c-2b0b-4f5f-9a43-2c1f6a3f0d11",
            "patient_id": "0d4b6c8e-1a2b-4c3d-8e9f-a0b1c2d3e4f5",
            "event_type": "symptom",
            "event_name": "chest pain",
            "event_date": "2024-01-01"
        }"#;
        let event: ClinicalEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(event.confidence, 1.0);
        assert!(event.source_report_id.is_none());
        assert!(event.validate().is_ok());
    }

    #[test]
    fn confidence_outside_unit_range_is_rejected() {
        let event = ClinicalEvent::new(Uuid::new_v4(), EventType::Diagnosis, "asthma", None)
            .with_confidence(1.5);
        assert_eq!(event.validate(), Err(ValidationError::ConfidenceOutOfRange(1.5)));
    }

    #[test]
    fn event_type_parses_loose_spellings() {
        assert_eq!("Follow-Up".parse::<EventType>().unwrap(), EventType::FollowUp);
        assert_eq!("lab result".parse::<EventType>().unwrap(), EventType::LabResult);
        assert!("banana".parse::<EventType>().is_err());
    }
}
