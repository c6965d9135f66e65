// medical_knowledge/src/clinical_dates/clinical_dates.rs
//! Clinical Date Resolver: canonical dates from structured metadata or report text

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use models::medical::{ClinicalDateField, ClinicalDates};

/// Layouts tried, in order, after strict ISO fails.
pub const FALLBACK_DATE_FORMATS: [&str; 8] = [
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%Y/%m/%d",
];

/// Structured keys recognized for each field, canonical name first.
const STRUCTURED_KEYS: [(ClinicalDateField, &[&str]); 6] = [
    (ClinicalDateField::Visit, &["visitDate", "visit_date", "dateOfVisit", "consultationDate", "encounterDate"]),
    (ClinicalDateField::Test, &["testDate", "test_date", "investigationDate", "studyDate"]),
    (ClinicalDateField::Prescription, &["prescriptionDate", "prescription_date", "prescribedDate", "rxDate"]),
    (ClinicalDateField::Lab, &["labDate", "lab_date", "collectionDate", "sampleCollectionDate"]),
    (ClinicalDateField::Discharge, &["dischargeDate", "discharge_date", "dateOfDischarge"]),
    (ClinicalDateField::Report, &["reportDate", "report_date", "documentDate", "document_date"]),
];

/// Nested objects that may hold structured dates besides the root.
const STRUCTURED_CONTAINERS: [&str; 3] = ["dates", "metadata", "data"];

const DATE_FRAGMENT: &str = r"(?P<date>\d{4}-\d{1,2}-\d{1,2}|\d{4}/\d{1,2}/\d{1,2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}|[A-Za-z]{3,9}\s+\d{1,2},\s*\d{4}|\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})";

const TEXT_LABELS: [(ClinicalDateField, &[(&str, &str)]); 6] = [
    (ClinicalDateField::Visit, &[
        ("visit date", r"visit\s*date"),
        ("date of visit", r"date\s+of\s+visit"),
        ("consultation date", r"consultation\s+date"),
        ("seen on", r"(?:seen|visited)\s+on"),
    ]),
    (ClinicalDateField::Test, &[
        ("test date", r"test\s*date"),
        ("date of test", r"date\s+of\s+(?:test|investigation)"),
        ("scan date", r"(?:scan|study)\s+date"),
        ("performed on", r"performed\s+on"),
    ]),
    (ClinicalDateField::Prescription, &[
        ("prescription date", r"prescription\s*date"),
        ("date of prescription", r"date\s+of\s+prescription"),
        ("prescribed on", r"prescribed\s+on"),
        ("rx date", r"rx\s+date"),
    ]),
    (ClinicalDateField::Lab, &[
        ("lab date", r"lab(?:oratory)?\s*date"),
        ("collection date", r"collection\s+date"),
        ("sample collected", r"sample\s+(?:collected|collection)(?:\s+(?:on|date))?"),
        ("collected on", r"collected\s+on"),
    ]),
    (ClinicalDateField::Discharge, &[
        ("discharge date", r"discharge\s*date"),
        ("date of discharge", r"date\s+of\s+discharge"),
        ("discharged on", r"discharged\s+on"),
    ]),
    (ClinicalDateField::Report, &[
        ("report date", r"report\s*date"),
        ("date of report", r"date\s+of\s+report"),
        ("reported on", r"reported\s+on"),
        ("printed on", r"printed\s+on"),
        ("date line", r"^\s*date"),
    ]),
];

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("ISO date pattern compiles"));

/// A labeled text pattern with a single `date` capture group.
#[derive(Debug)]
pub struct LabeledPattern {
    pub label: &'static str,
    pub regex: Regex,
}

static TEXT_PATTERNS: Lazy<Vec<(ClinicalDateField, Vec<LabeledPattern>)>> = Lazy::new(|| {
    TEXT_LABELS
        .iter()
        .map(|(field, labels)| {
            let patterns = labels
                .iter()
                .map(|&(label, prefix)| LabeledPattern {
                    label,
                    regex: Regex::new(&format!(r"(?im){}\s*[:\-]?\s*{}", prefix, DATE_FRAGMENT))
                        .expect("built-in clinical date pattern compiles"),
                })
                .collect();
            (*field, patterns)
        })
        .collect()
});

/// Normalizes a date fragment to ISO `YYYY-MM-DD`. Strict ISO is tried first,
/// then [`FALLBACK_DATE_FORMATS`] in order; anything else yields `None`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return None;
    }
    if ISO_DATE.is_match(candidate) {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
            return Some(format_iso(date));
        }
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .filter_map(|layout| NaiveDate::parse_from_str(candidate, layout).ok())
        .find(|date| (1000..=9999).contains(&date.year()))
        .map(format_iso)
}

fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Looks up the raw string for `field` in the root object and the known
/// nested containers. Blank strings count as absent.
fn structured_value<'a>(json: &'a Value, keys: &[&str]) -> Option<&'a str> {
    let containers = std::iter::once(json)
        .chain(STRUCTURED_CONTAINERS.iter().filter_map(|name| json.get(*name)));
    for container in containers {
        for key in keys {
            if let Some(value) = container.get(*key).and_then(Value::as_str) {
                if !value.trim().is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn extract_structured(json: &Value) -> Option<ClinicalDates> {
    let mut dates = ClinicalDates::default();
    let mut found_any = false;
    for (field, keys) in STRUCTURED_KEYS.iter() {
        if let Some(raw) = structured_value(json, keys) {
            found_any = true;
            dates.set(*field, normalize_date(raw));
        }
    }
    found_any.then_some(dates)
}

/// First labeled fragment for a field that normalizes. A fragment that looks
/// like a date but does not parse is skipped, so later labels still apply.
fn extract_from_text(text: &str) -> ClinicalDates {
    let mut dates = ClinicalDates::default();
    for (field, patterns) in TEXT_PATTERNS.iter() {
        let hit = patterns.iter().find_map(|pattern| {
            pattern
                .regex
                .captures_iter(text)
                .filter_map(|caps| caps.name("date"))
                .find_map(|m| match normalize_date(m.as_str()) {
                    Some(date) => {
                        debug!("{} matched '{}' via '{}'", field.key(), m.as_str(), pattern.label);
                        Some(date)
                    }
                    None => {
                        debug!("{} skipped unparseable '{}' via '{}'", field.key(), m.as_str(), pattern.label);
                        None
                    }
                })
        });
        if hit.is_some() {
            dates.set(*field, hit);
        }
    }
    dates
}

/// Extracts the six clinical dates of a report. Structured metadata wins: once
/// any recognized key is present the text is not scanned at all.
pub fn extract_clinical_dates(text: &str, json: &Value) -> ClinicalDates {
    if let Some(dates) = extract_structured(json) {
        return dates;
    }
    extract_from_text(text)
}

/// First non-null field in fixed precedence order
/// visit > test > prescription > lab > discharge > report, returned verbatim.
pub fn resolve_primary_clinical_date(dates: &ClinicalDates) -> Option<String> {
    ClinicalDateField::PRECEDENCE
        .iter()
        .find_map(|field| dates.get(*field).cloned())
}

/// Canonical clinical date of a report, falling back to the upload day.
pub fn clinical_date_for_report(text: &str, json: &Value, uploaded_at: DateTime<Utc>) -> NaiveDate {
    let dates = extract_clinical_dates(text, json);
    resolve_primary_clinical_date(&dates)
        .and_then(|primary| NaiveDate::parse_from_str(&primary, "%Y-%m-%d").ok())
        .unwrap_or_else(|| {
            debug!("No clinical date found; using upload date {}", uploaded_at);
            uploaded_at.date_naive()
        })
}
