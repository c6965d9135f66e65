// medical_knowledge/src/edge_construction/mod.rs
pub mod edge_construction;

pub use edge_construction::{
    derive_edge_candidates, BatchSummary, CorrelationSettings, EdgeConstructionEngine,
    EdgeConstructionSummary, EdgeRuleTable,
};
