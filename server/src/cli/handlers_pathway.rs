// server/src/cli/handlers_pathway.rs

use anyhow::Result;
use serde_json::{json, Value};

use lib::commands::PathwayCommand;

use crate::cli::cli::CliContext;

pub async fn handle_pathway_command(ctx: &CliContext, action: PathwayCommand) -> Result<Value> {
    match action {
        PathwayCommand::Project { patient_id, condition } => {
            let outcome = ctx.pathways.project_pathway(patient_id, &condition).await;
            Ok(serde_json::to_value(outcome)?)
        }
        PathwayCommand::Templates => {
            let templates: Vec<Value> = ctx
                .pathways
                .registry()
                .templates()
                .iter()
                .map(|t| {
                    json!({
                        "key": t.key,
                        "condition": t.condition,
                        "version": t.version,
                        "aliases": t.aliases,
                        "steps": t.steps.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            Ok(Value::Array(templates))
        }
    }
}
