// medical_knowledge/src/pathway_projection/mod.rs
pub mod pathway_projection;

pub use pathway_projection::{project_events, synthesize_from_reports, PathwayProjectionEngine, ProjectionOutcome};
