//! Output formatting: JSON, YAML, table, plain.
//!
//! Structured formats serialize via serde. `table` and `plain` flatten
//! nested values into dotted paths (`iflist.Internet.rx`).

use std::io::{self, Write};

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use rtstat_core::Snapshot;

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one capture. JSON object keys come out sorted.
pub fn render_snapshot(format: OutputFormat, snapshot: &Snapshot) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(snapshot)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(snapshot)?),
        OutputFormat::Table => Ok(render_table(&snapshot_rows(snapshot))),
        OutputFormat::Plain => Ok(snapshot_rows(snapshot)
            .iter()
            .map(|row| format!("{}={}", row.path, row.value))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T>(
    format: OutputFormat,
    data: &[T],
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize + Tabled,
{
    match format {
        OutputFormat::Table => Ok(render_table(data)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Flattening ──────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Tabled)]
struct ValueRow {
    #[tabled(rename = "Metric")]
    path: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn snapshot_rows(snapshot: &Snapshot) -> Vec<ValueRow> {
    let mut rows = vec![
        ValueRow {
            path: "router".into(),
            value: snapshot.router.clone(),
        },
        ValueRow {
            path: "timestamp".into(),
            value: snapshot.timestamp.to_string(),
        },
    ];
    if let Some(captured) = captured_at(snapshot.timestamp) {
        rows.push(ValueRow {
            path: "captured".into(),
            value: captured,
        });
    }
    for (key, value) in &snapshot.data {
        flatten(key, value, &mut rows);
    }
    rows
}

/// RFC 3339 rendering of a fractional Unix timestamp.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn captured_at(timestamp: f64) -> Option<String> {
    let micros = (timestamp * 1_000_000.0).round() as i64;
    DateTime::from_timestamp_micros(micros).map(|t| t.to_rfc3339())
}

fn flatten(path: &str, value: &Value, rows: &mut Vec<ValueRow>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&format!("{path}.{key}"), child, rows);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&format!("{path}.{index}"), child, rows);
            }
        }
        Value::String(s) => rows.push(ValueRow {
            path: path.to_owned(),
            value: s.clone(),
        }),
        scalar => rows.push(ValueRow {
            path: path.to_owned(),
            value: scalar.to_string(),
        }),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}
