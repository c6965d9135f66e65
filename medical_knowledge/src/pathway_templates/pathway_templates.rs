// medical_knowledge/src/pathway_templates/pathway_templates.rs
//! Pathway Template Registry: static guideline graphs per condition

use std::collections::HashSet;

use log::debug;

use models::errors::{GraphResult, ValidationError};
use models::medical::{PathwayEdge, PathwayStep, PathwayTemplate, StepType};

/// Lowercases and drops everything that is not an ASCII letter or digit.
/// Shared by condition lookup and step keyword matching.
pub fn normalize_text(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Immutable set of pathway templates, built once and handed to the engines.
#[derive(Debug, Clone)]
pub struct PathwayRegistry {
    templates: Vec<PathwayTemplate>,
}

impl PathwayRegistry {
    /// Validates step references and key uniqueness before accepting a set.
    pub fn new(templates: Vec<PathwayTemplate>) -> GraphResult<Self> {
        let mut keys = HashSet::new();
        for template in &templates {
            template.validate()?;
            if !keys.insert(template.key.clone()) {
                return Err(ValidationError::DuplicateTemplate(template.key.clone()).into());
            }
        }
        Ok(Self { templates })
    }

    /// The built-in guideline set.
    pub fn standard() -> Self {
        Self {
            templates: vec![type_2_diabetes(), hypertension(), hyperlipidemia()],
        }
    }

    pub fn templates(&self) -> &[PathwayTemplate] {
        &self.templates
    }

    pub fn get(&self, key: &str) -> Option<&PathwayTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    /// Maps a free-text condition to a template by substring alias match.
    /// `None` means the condition is unsupported.
    pub fn resolve(&self, condition: &str) -> Option<&PathwayTemplate> {
        let normalized = normalize_text(condition);
        if normalized.is_empty() {
            return None;
        }
        let found = self.templates.iter().find(|template| {
            template
                .aliases
                .iter()
                .map(|alias| normalize_text(alias))
                .any(|alias| !alias.is_empty() && normalized.contains(&alias))
        });
        debug!(
            "Condition '{}' resolved to {:?}",
            condition,
            found.map(|t| t.key.as_str())
        );
        found
    }
}

impl Default for PathwayRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn chain(ids: &[&str]) -> Vec<PathwayEdge> {
    ids.windows(2).map(|pair| PathwayEdge::new(pair[0], pair[1])).collect()
}

fn type_2_diabetes() -> PathwayTemplate {
    let mut edges = chain(&[
        "screening",
        "diagnosis_confirmed",
        "lifestyle_modification",
        "first_line_therapy",
        "therapy_intensification",
        "follow_up",
    ]);
    edges.push(PathwayEdge::new("diagnosis_confirmed", "complication_screening"));
    edges.push(PathwayEdge::new("complication_screening", "follow_up"));

    PathwayTemplate {
        key: "type_2_diabetes".to_string(),
        condition: "Type 2 Diabetes".to_string(),
        version: 1,
        aliases: ["type2diabetes", "diabetesmellitus", "diabetes", "t2dm", "t2d", "dm2", "niddm"]
            .iter()
            .map(|a| a.to_string())
            .collect(),
        steps: vec![
            PathwayStep::new(
                "screening",
                "Glycemic screening",
                StepType::Investigation,
                &[
                    "hba1c",
                    "glycated",
                    "fasting glucose",
                    "fasting blood sugar",
                    "fbs",
                    "ogtt",
                    "random blood sugar",
                ],
            ),
            PathwayStep::new(
                "diagnosis_confirmed",
                "Diagnosis confirmed",
                StepType::Decision,
                &["type 2 diabetes", "diabetes mellitus", "t2dm", "dm2", "diabetic"],
            ),
            PathwayStep::new(
                "lifestyle_modification",
                "Lifestyle modification",
                StepType::Treatment,
                &["diet", "exercise", "lifestyle", "nutrition", "weight management"],
            ),
            PathwayStep::new(
                "first_line_therapy",
                "First-line therapy",
                StepType::Treatment,
                &["metformin"],
            ),
            PathwayStep::new(
                "therapy_intensification",
                "Therapy intensification",
                StepType::Treatment,
                &[
                    "sglt2",
                    "gliflozin",
                    "glp1",
                    "glutide",
                    "dpp4",
                    "gliptin",
                    "sulfonylurea",
                    "glimepiride",
                    "gliclazide",
                    "insulin",
                ],
            ),
            PathwayStep::new(
                "complication_screening",
                "Complication screening",
                StepType::Investigation,
                &[
                    "retina",
                    "fundus",
                    "eye exam",
                    "microalbumin",
                    "uacr",
                    "foot exam",
                    "monofilament",
                    "egfr",
                ],
            ),
            PathwayStep::new(
                "follow_up",
                "Follow-up",
                StepType::FollowUp,
                &["follow up", "followup", "review visit", "quarterly review"],
            ),
        ],
        edges,
    }
}

fn hypertension() -> PathwayTemplate {
    PathwayTemplate {
        key: "hypertension".to_string(),
        condition: "Hypertension".to_string(),
        version: 1,
        aliases: ["hypertension", "htn", "highbloodpressure", "elevatedbloodpressure"]
            .iter()
            .map(|a| a.to_string())
            .collect(),
        steps: vec![
            PathwayStep::new(
                "bp_screening",
                "Blood pressure screening",
                StepType::Investigation,
                &["blood pressure", "bp reading", "ambulatory bp", "sphygmomanometer"],
            ),
            PathwayStep::new(
                "diagnosis_confirmed",
                "Diagnosis confirmed",
                StepType::Decision,
                &["hypertension", "htn", "high blood pressure"],
            ),
            PathwayStep::new(
                "baseline_workup",
                "Baseline work-up",
                StepType::Investigation,
                &["ecg", "ekg", "electrolyte", "creatinine", "urinalysis", "lipid profile"],
            ),
            PathwayStep::new(
                "lifestyle_modification",
                "Lifestyle modification",
                StepType::Treatment,
                &["salt", "sodium", "dash diet", "exercise", "weight loss", "lifestyle"],
            ),
            PathwayStep::new(
                "first_line_therapy",
                "First-line therapy",
                StepType::Treatment,
                &[
                    "amlodipine",
                    "dipine",
                    "lisinopril",
                    "pril",
                    "losartan",
                    "sartan",
                    "thiazide",
                    "chlorthalidone",
                ],
            ),
            PathwayStep::new(
                "follow_up",
                "Follow-up",
                StepType::FollowUp,
                &["follow up", "followup", "home bp", "bp review"],
            ),
        ],
        edges: chain(&[
            "bp_screening",
            "diagnosis_confirmed",
            "baseline_workup",
            "lifestyle_modification",
            "first_line_therapy",
            "follow_up",
        ]),
    }
}

fn hyperlipidemia() -> PathwayTemplate {
    PathwayTemplate {
        key: "hyperlipidemia".to_string(),
        condition: "Hyperlipidemia".to_string(),
        version: 1,
        aliases: ["hyperlipidemia", "dyslipidemia", "hypercholesterolemia", "highcholesterol", "lipid"]
            .iter()
            .map(|a| a.to_string())
            .collect(),
        steps: vec![
            PathwayStep::new(
                "lipid_screening",
                "Lipid screening",
                StepType::Investigation,
                &["lipid profile", "lipid panel", "cholesterol", "ldl", "hdl", "triglyceride"],
            ),
            PathwayStep::new(
                "diagnosis_confirmed",
                "Diagnosis confirmed",
                StepType::Decision,
                &["hyperlipidemia", "dyslipidemia", "hypercholesterolemia"],
            ),
            PathwayStep::new(
                "lifestyle_modification",
                "Lifestyle modification",
                StepType::Treatment,
                &["diet", "exercise", "lifestyle"],
            ),
            PathwayStep::new(
                "statin_therapy",
                "Statin therapy",
                StepType::Treatment,
                &["statin"],
            ),
            PathwayStep::new(
                "therapy_intensification",
                "Therapy intensification",
                StepType::Treatment,
                &["ezetimibe", "pcsk9", "evolocumab", "alirocumab", "fenofibrate"],
            ),
            PathwayStep::new(
                "follow_up",
                "Follow-up",
                StepType::FollowUp,
                &["repeat lipid", "follow up", "followup", "liver function", "lft"],
            ),
        ],
        edges: chain(&[
            "lipid_screening",
            "diagnosis_confirmed",
            "lifestyle_modification",
            "statin_therapy",
            "therapy_intensification",
            "follow_up",
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::GraphError;

    #[test]
    fn normalization_strips_everything_but_ascii_alphanumerics() {
        assert_eq!(normalize_text("Type-2 Diabetes (T2DM)"), "type2diabetest2dm");
        assert_eq!(normalize_text("  HbA1c  "), "hba1c");
        assert_eq!(normalize_text("&-- "), "");
    }

    #[test]
    fn built_in_templates_are_valid() {
        let registry = PathwayRegistry::standard();
        let rebuilt = PathwayRegistry::new(registry.templates().to_vec());
        assert!(rebuilt.is_ok());
        assert_eq!(registry.templates().len(), 3);
    }

    #[test]
    fn resolves_free_text_conditions() {
        let registry = PathwayRegistry::standard();
        assert_eq!(registry.resolve("Type 2 Diabetes").map(|t| t.key.as_str()), Some("type_2_diabetes"));
        assert_eq!(registry.resolve("T2DM, uncontrolled").map(|t| t.key.as_str()), Some("type_2_diabetes"));
        assert_eq!(registry.resolve("Essential HTN").map(|t| t.key.as_str()), Some("hypertension"));
        assert_eq!(registry.resolve("high cholesterol").map(|t| t.key.as_str()), Some("hyperlipidemia"));
    }

    #[test]
    fn unknown_condition_is_unsupported() {
        let registry = PathwayRegistry::standard();
        assert!(registry.resolve("Asthma").is_none());
        assert!(registry.resolve("   ").is_none());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = PathwayRegistry::new(vec![hypertension(), hypertension()]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Validation(ValidationError::DuplicateTemplate(ref key)) if key == "hypertension"
        ));
    }

    #[test]
    fn templates_with_dangling_edges_are_rejected() {
        let mut broken = hyperlipidemia();
        broken.edges.push(PathwayEdge::new("statin_therapy", "bariatric_surgery"));
        assert!(PathwayRegistry::new(vec![broken]).is_err());
    }
}
