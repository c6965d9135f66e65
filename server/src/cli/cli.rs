use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use serde_json::Value;

use lib::commands::{CliArgs, Commands};
use lib::config::{load_app_config, load_pathway_templates, AppConfig};
use lib::storage_engine::{create_storage, ClinicalStore};
use medical_knowledge::edge_construction::{CorrelationSettings, EdgeConstructionEngine, EdgeRuleTable};
use medical_knowledge::pathway_projection::PathwayProjectionEngine;
use medical_knowledge::pathway_templates::PathwayRegistry;

use crate::cli::handlers_dates::handle_date_command;
use crate::cli::handlers_edges::handle_edge_command;
use crate::cli::handlers_pathway::handle_pathway_command;
use crate::cli::handlers_reprocess::handle_reprocess_command;

/// Everything a command needs, built once per invocation.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: AppConfig,
    pub store: Arc<dyn ClinicalStore>,
    pub edges: EdgeConstructionEngine,
    pub pathways: PathwayProjectionEngine,
}

impl CliContext {
    pub async fn build(args: &CliArgs) -> Result<Self> {
        let mut config = load_app_config(args.config.as_deref())?;
        if let Some(data) = &args.data {
            debug!("Overriding storage.data_path with {}", data.display());
            config.storage.data_path = Some(data.clone());
        }

        let store = create_storage(&config.storage).await?;

        let rules = match &config.correlation.rules {
            Some(rules) => EdgeRuleTable::from_rules(rules.clone()).context("Invalid correlation.rules")?,
            None => EdgeRuleTable::standard(),
        };
        let registry = match &config.pathways.templates_path {
            Some(path) => {
                let templates = load_pathway_templates(path)?;
                PathwayRegistry::new(templates)
                    .with_context(|| format!("Invalid pathway templates in {}", path.display()))?
            }
            None => PathwayRegistry::standard(),
        };
        info!(
            "Loaded {} edge rules and {} pathway templates",
            rules.rules().len(),
            registry.templates().len()
        );

        let edges = EdgeConstructionEngine::new(
            store.clone(),
            rules,
            CorrelationSettings::from(&config.correlation),
        );
        let pathways = PathwayProjectionEngine::new(store.clone(), Arc::new(registry));

        Ok(Self { config, store, edges, pathways })
    }
}

pub async fn run_command(ctx: &CliContext, command: Commands) -> Result<Value> {
    match command {
        Commands::Edges { action } => handle_edge_command(ctx, action).await,
        Commands::Pathway { action } => handle_pathway_command(ctx, action).await,
        Commands::Dates { action } => handle_date_command(action),
        Commands::Reprocess(args) => handle_reprocess_command(ctx, args).await,
    }
}

pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    let ctx = CliContext::build(&args).await?;
    let output = run_command(&ctx, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
