// models/src/medical/health_report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{GraphError, GraphResult};

/// A raw uploaded report as kept by the ingestion side, including whatever
/// structured extraction the AI collaborator attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(default)]
    pub report_json: Value,
    #[serde(default)]
    pub raw_text: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// The `data` section of a report's structured extraction. Entries are kept
/// raw so one unusable entry never invalidates its siblings; see
/// [`extracted_item_name`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportExtraction {
    pub conditions: Vec<Value>,
    pub parameters: Vec<Value>,
    pub medications: Vec<Value>,
}

/// Keys that may carry an extracted entry's name, in lookup order.
pub const ITEM_NAME_KEYS: [&str; 5] = ["name", "test_name", "parameter", "drug", "condition"];

/// Name of one extracted entry: the string itself, or the first non-blank
/// string under [`ITEM_NAME_KEYS`]. `None` when the entry carries no name.
pub fn extracted_item_name(item: &Value) -> Option<&str> {
    let name = match item {
        Value::String(name) => Some(name.as_str()),
        Value::Object(fields) => ITEM_NAME_KEYS
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .find(|name| !name.trim().is_empty()),
        _ => None,
    };
    name.map(str::trim).filter(|name| !name.is_empty())
}

fn entry_list(data: &Map<String, Value>, key: &str) -> Vec<Value> {
    match data.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(single) => vec![single.clone()],
    }
}

impl HealthReport {
    pub fn new(patient_id: Uuid, report_json: Value, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            report_json,
            raw_text: None,
            uploaded_at,
        }
    }

    /// Splits `report_json.data` into its three entry lists. A missing or
    /// null `data` section, or a null list, is empty. A `data` section that is
    /// not an object is an error.
    pub fn extraction(&self) -> GraphResult<ReportExtraction> {
        match self.report_json.get("data") {
            None | Some(Value::Null) => Ok(ReportExtraction::default()),
            Some(Value::Object(data)) => Ok(ReportExtraction {
                conditions: entry_list(data, "conditions"),
                parameters: entry_list(data, "parameters"),
                medications: entry_list(data, "medications"),
            }),
            Some(other) => Err(GraphError::InvalidData(format!(
                "report {} has a non-object extraction: {}",
                self.id, other
            ))),
        }
    }
}
