//! Output formatting: table, JSON, YAML, plain.
//!
//! Responses are schema-less JSON documents, so tables are built
//! dynamically: a list of objects becomes one row per item with the union
//! of their keys as columns, a single object becomes a key/value table.

use std::io::{self, Write};

use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Fields tried, in order, as an item's identifier for `plain` output.
const ID_FIELDS: &[&str] = &["uuid", "id", "name"];

// ── Render dispatcher ────────────────────────────────────────────────

/// Render a response document in the chosen format.
pub fn render_value(format: OutputFormat, data: &Value) -> String {
    match format {
        OutputFormat::Table => render_table(data),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => render_plain(data),
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

// ── Format-specific renderers ────────────────────────────────────────

fn render_table(data: &Value) -> String {
    match data {
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Array(items) if items.iter().all(Value::is_object) => list_table(items),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join("\n"),
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["FIELD", "VALUE"]);
            for (key, value) in map {
                builder.push_record([key.clone(), cell(value)]);
            }
            builder.build().with(Style::rounded()).to_string()
        }
        Value::Null => String::new(),
        other => cell(other),
    }
}

fn list_table(items: &[Value]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for item in items.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for item in items {
        builder.push_record(
            columns
                .iter()
                .map(|c| item.get(*c).map(cell).unwrap_or_default()),
        );
    }
    builder.build().with(Style::rounded()).to_string()
}

/// One table cell: strings bare, scalars as JSON, containers compact.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_plain(data: &Value) -> String {
    match data {
        Value::Array(items) => items.iter().map(identifier).collect::<Vec<_>>().join("\n"),
        other => identifier(other),
    }
}

fn identifier(value: &Value) -> String {
    match value {
        Value::Object(map) => ID_FIELDS
            .iter()
            .find_map(|f| map.get(*f))
            .map_or_else(|| value.to_string(), cell),
        other => cell(other),
    }
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_default()
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact(data: &Value) -> String {
    data.to_string()
}

/// YAML output.
pub(crate) fn render_yaml(data: &Value) -> String {
    serde_yaml::to_string(data).unwrap_or_default()
}
