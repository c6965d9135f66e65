// medical_knowledge/src/lib.rs

pub mod clinical_dates;
pub mod edge_construction;
pub mod pathway_projection;
pub mod pathway_templates;

pub use clinical_dates::*;
pub use edge_construction::*;
pub use pathway_projection::*;
pub use pathway_templates::*;
