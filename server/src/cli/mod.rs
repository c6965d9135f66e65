// server/src/cli/mod.rs

// Command-line front end: argument parsing, engine wiring and one handler
// module per command group.

pub mod cli;
pub mod handlers_dates;
pub mod handlers_edges;
pub mod handlers_pathway;
pub mod handlers_reprocess;

pub use cli::{run_command, start_cli, CliContext};
pub use handlers_dates::handle_date_command;
pub use handlers_edges::handle_edge_command;
pub use handlers_pathway::handle_pathway_command;
pub use handlers_reprocess::handle_reprocess_command;
