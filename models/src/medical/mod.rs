// models/src/medical/mod.rs
pub mod clinical_dates;
pub mod clinical_event;
pub mod health_report;
pub mod pathway;
pub mod projection_event;

pub use clinical_dates::{ClinicalDateField, ClinicalDates};
pub use clinical_event::{ClinicalEvent, EventType};
pub use health_report::{extracted_item_name, HealthReport, ReportExtraction, ITEM_NAME_KEYS};
pub use pathway::{
    EventSource, PathwayEdge, PathwayProjection, PathwayStep, PathwayTemplate, ProjectedStep,
    StepStatus, StepType,
};
pub use projection_event::{EventOrigin, ProjectionEvent};
