// Response formatter
//
// Post-processes GET results for presentation: drops internal-only
// attributes and turns epoch timestamps of ambiguous unit into local
// date-times. Unknown fields pass through untouched, and running the
// formatter twice yields the same document as running it once.

use chrono::{DateTime, Local, SecondsFormat};
use serde_json::Value;
use tracing::warn;

/// Attributes that never leave the core.
pub const SUPPRESSED_FIELDS: &[&str] = &[
    "certificate",
    "certificateChain",
    "privateKey",
    "internalId",
    "internalObjectId",
    "extendedInfo",
    "diagnostics",
    "resumeFrom",
    "resumeToken",
    "accessRestrictions",
    "restrictionInternals",
];

/// Attributes carrying epoch timestamps in seconds, milliseconds, or nanoseconds.
pub const TIMESTAMP_FIELDS: &[&str] = &[
    "creationTime",
    "createdAt",
    "modificationTime",
    "lastModified",
    "startTime",
    "endTime",
    "submissionTime",
    "completionTime",
    "expiryTime",
    "lastLoginTime",
];

const MILLIS_MIN_DIGITS: u32 = 12;
const NANOS_MIN_DIGITS: u32 = 15;

/// Format a single item or a sequence of items.
pub fn format(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(format_item).collect()),
        other => format_item(other),
    }
}

fn format_item(item: Value) -> Value {
    let Value::Object(mut map) = item else {
        return item;
    };

    for field in SUPPRESSED_FIELDS {
        map.shift_remove(*field);
    }

    for field in TIMESTAMP_FIELDS {
        if let Some(slot) = map.get_mut(*field) {
            *slot = normalize_timestamp(field, slot);
        }
    }

    Value::Object(map)
}

/// Replace one timestamp value; already-normalized values are kept.
fn normalize_timestamp(field: &str, value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) if DateTime::parse_from_rfc3339(s).is_ok() => value.clone(),
        Value::String(s) => match s.trim().parse::<i128>() {
            Ok(raw) => render_or_null(field, raw),
            Err(_) => {
                warn!(field, value = %s, "timestamp is not numeric; dropping value");
                Value::Null
            }
        },
        Value::Number(n) => match n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from)) {
            Some(raw) => render_or_null(field, raw),
            None => {
                warn!(field, value = %n, "timestamp is not an integer; dropping value");
                Value::Null
            }
        },
        other => {
            warn!(field, value = %other, "unexpected timestamp shape; dropping value");
            Value::Null
        }
    }
}

fn render_or_null(field: &str, raw: i128) -> Value {
    match to_local(raw) {
        Some(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, false)),
        None => {
            warn!(field, raw = %raw, "timestamp out of range; dropping value");
            Value::Null
        }
    }
}

/// Number of decimal digits in `value` (sign ignored, `0` has one digit).
pub fn digit_count(value: i128) -> u32 {
    value.unsigned_abs().checked_ilog10().map_or(1, |d| d + 1)
}

/// Whole seconds since the epoch for a value of ambiguous unit.
///
/// Up to 11 digits are seconds, 12–14 digits milliseconds, and anything
/// longer nanoseconds; sub-second remainders are truncated.
pub fn epoch_seconds(raw: i128) -> i128 {
    let digits = digit_count(raw);
    if digits >= NANOS_MIN_DIGITS {
        raw / 1_000_000_000
    } else if digits >= MILLIS_MIN_DIGITS {
        raw / 1_000
    } else {
        raw
    }
}

/// Decode an epoch value into the caller's local time zone.
pub fn to_local(raw: i128) -> Option<DateTime<Local>> {
    let secs = i64::try_from(epoch_seconds(raw)).ok()?;
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&Local))
}
