// lib/src/storage_engine/mod.rs
//! Storage seam for clinical events, raw reports and derived edges.
//!
//! Engines implement [`ClinicalStore`]; everything above this layer holds an
//! `Arc<dyn ClinicalStore>` and never assumes a concrete backend.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use uuid::Uuid;

use models::errors::GraphResult;
use models::{ClinicalEvent, ClinicalEventEdge, HealthReport, NewClinicalEventEdge};

use crate::config::{StorageConfig, StorageEngineType};

pub mod dataset;
pub mod inmemory_storage;

pub use dataset::{load_dataset, Dataset};
pub use inmemory_storage::InMemoryStorage;

#[async_trait]
pub trait ClinicalStore: Send + Sync + Debug + 'static {
    fn get_type(&self) -> &'static str;

    async fn insert_event(&self, event: ClinicalEvent) -> GraphResult<()>;
    /// All events of a patient ordered by `event_date` ascending, undated last.
    async fn events_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<ClinicalEvent>>;
    async fn events_for_report(&self, report_id: Uuid) -> GraphResult<Vec<ClinicalEvent>>;

    async fn insert_report(&self, report: HealthReport) -> GraphResult<()>;
    async fn get_report(&self, report_id: Uuid) -> GraphResult<Option<HealthReport>>;
    /// Reports of a patient ordered by upload time ascending.
    async fn reports_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<HealthReport>>;
    /// Deletes a report, its events and every edge touching them. Returns the
    /// number of events removed.
    async fn delete_report(&self, report_id: Uuid) -> GraphResult<usize>;

    /// Inserts an edge. A row with the same `(from, to, relation)` key fails
    /// with an error for which `is_unique_violation()` holds.
    async fn insert_edge(&self, edge: NewClinicalEventEdge) -> GraphResult<ClinicalEventEdge>;
    async fn edges_for_patient(&self, patient_id: Uuid) -> GraphResult<Vec<ClinicalEventEdge>>;
    /// Deletes every edge with either endpoint in `event_ids`; returns edges deleted.
    async fn delete_edges_for_events(&self, event_ids: &[Uuid]) -> GraphResult<usize>;
}

/// Builds the configured engine and seeds it from `data_path` when one is set.
pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn ClinicalStore>> {
    debug!("Creating storage with config: {:?}", config);
    let storage: Arc<dyn ClinicalStore> = match config.engine {
        StorageEngineType::InMemory => {
            let storage = InMemoryStorage::new();
            if let Some(path) = config.data_path.as_deref() {
                let dataset = load_dataset(path)
                    .with_context(|| format!("Failed to load dataset from {}", path.display()))?;
                let (events, reports) = storage.seed(dataset).await;
                info!("Seeded in-memory storage with {} events and {} reports", events, reports);
            }
            Arc::new(storage)
        }
    };
    info!("Using {} storage engine", storage.get_type());
    Ok(storage)
}
