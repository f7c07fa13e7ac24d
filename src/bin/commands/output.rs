//! Rendering of command results
//!
//! Tabular output goes through `tabled`; every JSON flavour goes through
//! `serde_json`. PSV rows are built from the same `Tabled` fields the table
//! shows, so both stay in sync with the row structs.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rounded table
    #[default]
    Table,
    /// Markdown table, for pasting into notes
    #[value(alias = "md")]
    Markdown,
    /// Compact JSON document
    Json,
    /// Indented JSON document
    JsonPretty,
    /// One JSON object per result row
    #[value(alias = "jsonl", alias = "ndjson")]
    JsonLine,
    /// Pipe-separated values with a header row
    Psv,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }
}

/// Print `document` as JSON, pretty when asked for
pub fn print_json<T: Serialize + ?Sized>(document: &T, format: OutputFormat) {
    let serialized = match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(document),
        _ => serde_json::to_string(document),
    };
    match serialized {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
    }
}

/// Print one JSON object per row
pub fn print_json_lines<T: Serialize>(rows: &[T]) {
    for row in rows {
        print_json(row, OutputFormat::JsonLine);
    }
}

/// Print rows as a table, markdown or PSV
///
/// JSON formats fall back to a JSON array of the rows.
pub fn print_rows<R: Tabled + Serialize>(rows: &[R], format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::rounded())),
        OutputFormat::Markdown => println!("{}", Table::new(rows).with(Style::markdown())),
        OutputFormat::Psv => {
            for line in psv_lines(rows) {
                println!("{}", line);
            }
        }
        OutputFormat::JsonLine => print_json_lines(rows),
        OutputFormat::Json | OutputFormat::JsonPretty => print_json(rows, format),
    }
}

fn psv_lines<R: Tabled>(rows: &[R]) -> Vec<String> {
    let header = R::headers()
        .iter()
        .map(|h| h.to_lowercase().replace(['(', ')'], "").replace(' ', "_"))
        .collect::<Vec<_>>()
        .join("|");

    std::iter::once(header)
        .chain(rows.iter().map(|row| row.fields().join("|")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[derive(Serialize, Tabled)]
    struct Row {
        #[tabled(rename = "Scenario")]
        name: &'static str,
        #[tabled(rename = "Time (ms)")]
        time: String,
    }

    #[test]
    fn test_format_names_and_aliases() {
        assert_eq!(
            OutputFormat::from_str("json-pretty", true).unwrap(),
            OutputFormat::JsonPretty
        );
        assert_eq!(OutputFormat::from_str("MD", true).unwrap(), OutputFormat::Markdown);
        assert_eq!(
            OutputFormat::from_str("ndjson", true).unwrap(),
            OutputFormat::JsonLine
        );
        assert!(OutputFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn test_json_formats() {
        assert!(OutputFormat::JsonLine.is_json());
        assert!(!OutputFormat::Psv.is_json());
        assert!(!OutputFormat::default().is_json());
    }

    #[test]
    fn test_psv_uses_tabled_headers() {
        let rows = [
            Row {
                name: "test_like_query",
                time: "1.50".to_string(),
            },
            Row {
                name: "test_cascade_delete",
                time: "0.75".to_string(),
            },
        ];
        assert_eq!(
            psv_lines(&rows),
            vec![
                "scenario|time_ms",
                "test_like_query|1.50",
                "test_cascade_delete|0.75",
            ]
        );
    }
}
