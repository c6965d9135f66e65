// models/src/lib.rs

pub mod edges;
pub mod errors;
pub mod medical;

// Re-export common core types for convenience when other crates use 'models::*'
pub use edges::{ClinicalEventEdge, EdgeRule, NewClinicalEventEdge, RelationType};
pub use errors::{GraphError, GraphResult, ValidationError, ValidationResult};
pub use medical::*;
