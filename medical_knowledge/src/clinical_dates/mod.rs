// medical_knowledge/src/clinical_dates/mod.rs
pub mod clinical_dates;

pub use clinical_dates::{
    clinical_date_for_report,
    extract_clinical_dates,
    normalize_date,
    resolve_primary_clinical_date,
    LabeledPattern,
    FALLBACK_DATE_FORMATS,
};
