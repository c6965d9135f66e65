// server/src/cli/handlers_edges.rs

use anyhow::{Context, Result};
use log::info;
use serde_json::{json, Value};

use lib::commands::EdgeCommand;

use crate::cli::cli::CliContext;

pub async fn handle_edge_command(ctx: &CliContext, action: EdgeCommand) -> Result<Value> {
    match action {
        EdgeCommand::Build { patient_id } => {
            let summary = ctx
                .edges
                .try_construct_edges(patient_id)
                .await
                .with_context(|| format!("Failed to build edges for patient {}", patient_id))?;
            Ok(serde_json::to_value(summary)?)
        }
        EdgeCommand::RemoveReport { report_id } => {
            let source_events = ctx
                .edges
                .remove_edges_for_report(report_id)
                .await
                .with_context(|| format!("Failed to remove edges for report {}", report_id))?;
            info!("Report {}: edges removed for {} source events", report_id, source_events);
            Ok(json!({ "report_id": report_id, "source_events": source_events }))
        }
        EdgeCommand::List { patient_id } => {
            let edges = ctx
                .edges
                .edges_for_patient(patient_id)
                .await
                .with_context(|| format!("Failed to list edges for patient {}", patient_id))?;
            Ok(serde_json::to_value(edges)?)
        }
    }
}
