// lib/src/storage_engine/dataset.rs
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use models::{ClinicalEvent, HealthReport};

/// JSON export of events and raw reports used to seed a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub events: Vec<ClinicalEvent>,
    pub reports: Vec<HealthReport>,
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dataset JSON: {}", path.display()))?;
    debug!(
        "Loaded dataset {} ({} events, {} reports)",
        path.display(),
        dataset.events.len(),
        dataset.reports.len()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_events_and_reports() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "events": [{{
                    "id": "11111111-1111-4111-8111-111111111111",
                    "patient_id": "22222222-2222-4222-8222-222222222222",
                    "event_type": "symptom",
                    "event_name": "chest pain",
                    "event_date": "2024-01-01"
                }}],
                "reports": [{{
                    "id": "33333333-3333-4333-8333-333333333333",
                    "patient_id": "22222222-2222-4222-8222-222222222222",
                    "report_json": {{ "data": {{ "conditions": [{{ "name": "Hypertension" }}] }} }},
                    "uploaded_at": "2024-01-05T09:00:00Z"
                }}]
            }}"#
        )
        .unwrap();

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.events.len(), 1);
        assert_eq!(dataset.reports.len(), 1);
        assert_eq!(dataset.events[0].event_name, "chest pain");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_dataset(Path::new("/definitely/not/here.json")).is_err());
    }
}
