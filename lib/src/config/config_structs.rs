use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use models::errors::{GraphError, GraphResult, ValidationError};
use models::EdgeRule;

use crate::config::config_defaults::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StorageEngineType {
    #[default]
    InMemory,
}

impl FromStr for StorageEngineType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "in_memory" | "inmemory" => Ok(StorageEngineType::InMemory),
            other => Err(ValidationError::InvalidIdentifier(format!("storage engine {}", other))),
        }
    }
}

impl TryFrom<String> for StorageEngineType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub engine: StorageEngineType,
    /// JSON dataset used to seed the in-memory engine.
    pub data_path: Option<PathBuf>,
}

/// Tuning for edge construction. `rules`, when present, replaces the
/// built-in relation rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default = "default_max_window_days")]
    pub max_window_days: i64,
    #[serde(default = "default_min_decay")]
    pub min_decay: f64,
    #[serde(default)]
    pub rules: Option<Vec<EdgeRule>>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            min_decay: DEFAULT_MIN_DECAY,
            rules: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwayConfig {
    /// YAML or JSON file replacing the built-in pathway templates.
    pub templates_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub correlation: CorrelationConfig,
    pub pathways: PathwayConfig,
}

impl AppConfig {
    pub fn validate(&self) -> GraphResult<()> {
        let correlation = &self.correlation;
        if correlation.max_window_days <= 0 {
            return Err(GraphError::ConfigurationError(format!(
                "correlation.max_window_days must be positive, got {}",
                correlation.max_window_days
            )));
        }
        if !(0.0..=1.0).contains(&correlation.min_decay) {
            return Err(GraphError::ConfigurationError(format!(
                "correlation.min_decay must lie in [0, 1], got {}",
                correlation.min_decay
            )));
        }
        if let Some(rules) = &correlation.rules {
            if rules.is_empty() {
                return Err(GraphError::ConfigurationError(
                    "correlation.rules must not be empty when set".to_string(),
                ));
            }
            for rule in rules {
                rule.validate().map_err(|e: ValidationError| {
                    GraphError::ConfigurationError(format!("invalid edge rule {:?}: {}", rule, e))
                })?;
            }
        }
        Ok(())
    }
}
