// server/src/cli/handlers_dates.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};

use lib::commands::DateCommand;
use medical_knowledge::clinical_dates::{
    clinical_date_for_report, extract_clinical_dates, resolve_primary_clinical_date,
};

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|p| fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display())))
        .transpose()
}

pub fn handle_date_command(action: DateCommand) -> Result<Value> {
    match action {
        DateCommand::Extract { text, json, uploaded_at } => {
            let text = read_optional(text.as_deref())?.unwrap_or_default();
            let metadata = match read_optional(json.as_deref())? {
                Some(raw) => serde_json::from_str(&raw).context("Report metadata is not valid JSON")?,
                None => Value::Null,
            };

            let dates = extract_clinical_dates(&text, &metadata);
            let primary = resolve_primary_clinical_date(&dates);
            let clinical_date = clinical_date_for_report(&text, &metadata, uploaded_at.unwrap_or_else(Utc::now));
            Ok(json!({
                "dates": dates,
                "primary": primary,
                "clinical_date": clinical_date,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn text_dates_resolve_by_precedence() {
        let mut text = tempfile::NamedTempFile::new().unwrap();
        writeln!(text, "Report Date: 2024-03-09\nVisit Date: 05/03/2024").unwrap();

        let output = handle_date_command(DateCommand::Extract {
            text: Some(text.path().to_path_buf()),
            json: None,
            uploaded_at: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
        })
        .unwrap();

        assert_eq!(output["primary"], "2024-03-05");
        assert_eq!(output["clinical_date"], "2024-03-05");
        assert_eq!(output["dates"]["reportDate"], "2024-03-09");
    }

    #[test]
    fn upload_time_is_used_without_any_date() {
        let output = handle_date_command(DateCommand::Extract {
            text: None,
            json: None,
            uploaded_at: Some(Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()),
        })
        .unwrap();
        assert_eq!(output["primary"], Value::Null);
        assert_eq!(output["clinical_date"], "2024-04-01");
    }
}
