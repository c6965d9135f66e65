// lib/src/commands.rs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Clinical event correlation and care-pathway projection", long_about = None)]
#[clap(propagate_version = true)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Commands,

    /// Path to the YAML configuration file
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON dataset (events and reports) used to seed the in-memory store.
    /// Overrides `storage.data_path` from the config file.
    #[clap(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum Commands {
    /// Build, list or remove derived event edges
    Edges {
        #[clap(subcommand)]
        action: EdgeCommand,
    },
    /// Project patients onto care-pathway templates
    Pathway {
        #[clap(subcommand)]
        action: PathwayCommand,
    },
    /// Extract and resolve clinical dates from a report
    Dates {
        #[clap(subcommand)]
        action: DateCommand,
    },
    /// Rebuild edges for many patients or reports, isolating failures per item
    Reprocess(ReprocessArgs),
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum EdgeCommand {
    Build { patient_id: Uuid },
    RemoveReport { report_id: Uuid },
    List { patient_id: Uuid },
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum PathwayCommand {
    Project { patient_id: Uuid, condition: String },
    Templates,
}

#[derive(Subcommand, Debug, PartialEq, Clone)]
pub enum DateCommand {
    Extract {
        /// Plain-text body of the report
        #[arg(long, value_name = "FILE")]
        text: Option<PathBuf>,
        /// Structured metadata attached to the report
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
        /// Upload timestamp used when the report carries no clinical date
        #[arg(long)]
        uploaded_at: Option<DateTime<Utc>>,
    },
}

#[derive(Args, Debug, PartialEq, Clone)]
pub struct ReprocessArgs {
    #[arg(long = "patient", value_name = "UUID")]
    pub patients: Vec<Uuid>,
    #[arg(long = "report", value_name = "UUID")]
    pub reports: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pathway_projection() {
        let patient = Uuid::new_v4();
        let patient_arg = patient.to_string();
        let args = CliArgs::try_parse_from([
            "carepath",
            "--data",
            "dataset.json",
            "pathway",
            "project",
            patient_arg.as_str(),
            "Type 2 Diabetes",
        ])
        .unwrap();
        assert_eq!(args.data, Some(PathBuf::from("dataset.json")));
        assert_eq!(
            args.command,
            Commands::Pathway {
                action: PathwayCommand::Project { patient_id: patient, condition: "Type 2 Diabetes".to_string() }
            }
        );
    }

    #[test]
    fn parses_repeated_reprocess_targets() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (a_arg, b_arg) = (a.to_string(), b.to_string());
        let args = CliArgs::try_parse_from([
            "carepath",
            "reprocess",
            "--patient",
            a_arg.as_str(),
            "--patient",
            b_arg.as_str(),
        ])
        .unwrap();
        match args.command {
            Commands::Reprocess(reprocess) => {
                assert_eq!(reprocess.patients, vec![a, b]);
                assert!(reprocess.reports.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_patient_id() {
        assert!(CliArgs::try_parse_from(["carepath", "edges", "build", "not-a-uuid"]).is_err());
    }
}
