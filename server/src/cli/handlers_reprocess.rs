// server/src/cli/handlers_reprocess.rs

use anyhow::{bail, Result};
use serde_json::{json, Value};

use lib::commands::ReprocessArgs;

use crate::cli::cli::CliContext;

/// Reports are reprocessed before patients so a patient named in both ends
/// with a full rebuild.
pub async fn handle_reprocess_command(ctx: &CliContext, args: ReprocessArgs) -> Result<Value> {
    if args.patients.is_empty() && args.reports.is_empty() {
        bail!("Nothing to reprocess: pass --patient and/or --report");
    }
    let reports = ctx.edges.reprocess_reports(&args.reports).await;
    let patients = ctx.edges.reprocess_patients(&args.patients).await;
    Ok(json!({ "reports": reports, "patients": patients }))
}
