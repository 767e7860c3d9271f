//! Rendering of query results for stdout.

use crate::error::{MysqlCmdError, Result};
use crate::query::QueryOutput;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tab-separated text.
    #[default]
    Text,
    /// JSON value; rows become an array of objects.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Renders the output. An empty row set renders as an empty string in text
/// format.
pub fn render(output: &QueryOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(output)),
        OutputFormat::Json => serde_json::to_string_pretty(output)
            .map_err(|e| MysqlCmdError::query(format!("Failed to encode result: {e}"))),
    }
}

fn render_text(output: &QueryOutput) -> String {
    match output {
        QueryOutput::Scalar(value) => value.to_display_string(),
        QueryOutput::NonQuery(affected) => affected.to_string(),
        QueryOutput::Rows(records) => {
            let mut lines = Vec::with_capacity(records.len() + 1);
            let mut header: Option<&[String]> = None;

            for record in records {
                // Multi-statement commands can switch column lists mid-stream.
                if header != Some(record.columns()) {
                    header = Some(record.columns());
                    lines.push(record.columns().join("\t"));
                }
                lines.push(
                    record
                        .values()
                        .iter()
                        .map(|v| v.to_display_string())
                        .collect::<Vec<_>>()
                        .join("\t"),
                );
            }

            lines.join("\n")
        }
    }
}
