// server/src/main.rs

// Entry point for the carepath binary. Parses the command line and
// dispatches to the CLI handlers.

use anyhow::Result;
use carepath_server::cli::cli::start_cli;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity
    env_logger::init();

    start_cli().await
}
