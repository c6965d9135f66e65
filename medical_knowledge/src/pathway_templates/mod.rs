// medical_knowledge/src/pathway_templates/mod.rs
pub mod pathway_templates;

pub use pathway_templates::{normalize_text, PathwayRegistry};
