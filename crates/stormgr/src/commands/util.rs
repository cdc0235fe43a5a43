//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};

use stormgr_api::{MonitorOptions, QueryValue, RawResult, StorageClient, TaskOutcome};

use crate::cli::{DataArgs, GlobalOpts, OutputFormat, PatchArgs};
use crate::error::CliError;
use crate::output;

// ── Confirmation ────────────────────────────────────────────────────

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

// ── Input parsing ───────────────────────────────────────────────────

/// The JSON document given with `--data` or `--from-file`, if any.
pub fn read_data(args: &DataArgs) -> Result<Option<Value>, CliError> {
    if let Some(ref inline) = args.data {
        return Ok(Some(serde_json::from_str(inline)?));
    }
    if let Some(ref path) = args.from_file {
        let contents = std::fs::read_to_string(path)?;
        return serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| CliError::Validation {
                field: "from-file".into(),
                reason: format!("invalid JSON in {}: {e}", path.display()),
            });
    }
    Ok(None)
}

/// Like [`read_data`], but a document is mandatory.
pub fn require_data(args: &DataArgs) -> Result<Value, CliError> {
    read_data(args)?.ok_or_else(|| CliError::Validation {
        field: "data".into(),
        reason: "a JSON document is required (--data or --from-file)".into(),
    })
}

fn split_pair<'a>(field: &str, raw: &'a str) -> Result<(&'a str, &'a str), CliError> {
    raw.split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim(), value))
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        })
}

/// `key=value` pairs to query parameters; a repeated key becomes one
/// multi-valued parameter at its first position.
pub fn parse_query(pairs: &[String]) -> Result<Vec<(String, QueryValue)>, CliError> {
    let mut params: Vec<(String, QueryValue)> = Vec::new();
    for raw in pairs {
        let (key, value) = split_pair("query", raw)?;
        match params.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => {
                let mut values = match std::mem::replace(existing, QueryValue::Many(Vec::new())) {
                    QueryValue::One(v) => vec![v],
                    QueryValue::Many(vs) => vs,
                };
                values.push(value.to_owned());
                *existing = QueryValue::Many(values);
            }
            None => params.push((key.to_owned(), QueryValue::One(value.to_owned()))),
        }
    }
    Ok(params)
}

/// Field changes from `--data`/`--from-file` (an object) plus `--set`
/// assignments, which win on conflict.
pub fn parse_patch(args: &PatchArgs) -> Result<Map<String, Value>, CliError> {
    let mut patch = match read_data(&args.data)? {
        None => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(CliError::Validation {
                field: "data".into(),
                reason: "an update document must be a JSON object".into(),
            });
        }
    };

    for raw in &args.set {
        let (key, value) = split_pair("set", raw)?;
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.into()));
        patch.insert(key.to_owned(), value);
    }

    if patch.is_empty() {
        return Err(CliError::Validation {
            field: "set".into(),
            reason: "nothing to change (use --set KEY=VALUE or --data)".into(),
        });
    }
    Ok(patch)
}

// ── Task progress ───────────────────────────────────────────────────

/// Attach a spinner that follows task progress, unless output is quiet
/// or stderr is not a terminal.
pub fn with_spinner(
    options: &MonitorOptions,
    global: &GlobalOpts,
) -> (MonitorOptions, Option<ProgressBar>) {
    if global.quiet || !std::io::stderr().is_terminal() {
        return (options.clone(), None);
    }

    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message("waiting for task");
    bar.enable_steady_tick(Duration::from_millis(120));

    let progress = bar.clone();
    let options = options.clone().on_progress(move |task| {
        let percent = task
            .percent()
            .map(|p| format!(" {p}%"))
            .unwrap_or_default();
        progress.set_message(format!("task {} {}{percent}", task.uuid, task.status));
    });
    (options, Some(bar))
}

/// A client clone whose monitored calls drive a spinner.
pub fn tracked(client: &StorageClient, global: &GlobalOpts) -> (StorageClient, Option<ProgressBar>) {
    let (options, spinner) = with_spinner(client.monitor_options(), global);
    (client.clone().with_monitor_options(options), spinner)
}

pub fn finish(spinner: Option<ProgressBar>) {
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
}

// ── Printing ────────────────────────────────────────────────────────

pub fn print_value(value: &Value, format: OutputFormat, global: &GlobalOpts) {
    let out = output::render_value(format, value);
    output::print_output(&out, global.quiet);
}

pub fn print_raw(result: RawResult, format: OutputFormat, global: &GlobalOpts) {
    print_value(&result.into_value(), format, global);
}

pub fn print_outcome(outcome: TaskOutcome, format: OutputFormat, global: &GlobalOpts) {
    if matches!(outcome, TaskOutcome::Deleted) && format == OutputFormat::Table {
        if !global.quiet {
            eprintln!("✓ Deleted");
        }
        return;
    }
    print_value(&outcome.into_value(), format, global);
}
