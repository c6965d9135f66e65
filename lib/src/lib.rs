// lib/src/lib.rs

pub mod commands;
pub mod config;
pub mod storage_engine;

pub use commands::*;
pub use config::{load_app_config, load_pathway_templates, AppConfig, CorrelationConfig, PathwayConfig, StorageConfig};
pub use storage_engine::{create_storage, ClinicalStore, InMemoryStorage};

pub use models::errors::{GraphError, GraphResult};
