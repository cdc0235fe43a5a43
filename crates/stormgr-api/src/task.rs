// Task records
//
// Long-running operations are tracked server-side as tasks under
// `tasks/{uuid}`. A completed task's context mapping may name the entity
// it acted on as `Uoid [uuid=<uuid>, objectType=<TYPE>]`; that string
// format is not formally documented, so extraction is one narrowly
// scoped function whose failure is an expected outcome.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of a server-side task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(alias = "CANCELLED")]
    Canceled,
    /// Anything the server reports that we do not recognize; polled like RUNNING.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Canceled)
    }
}

/// A server-side task as returned by `GET tasks/{uuid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uuid: String,
    pub status: TaskStatus,
    #[serde(default, alias = "percentComplete")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    /// Every other field, kept so the record round-trips unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// The first entity reference found among the context values.
    pub fn entity_reference(&self) -> Result<EntityReference, ReferenceParseError> {
        let mut last_err = ReferenceParseError::NotFound;
        for value in self.context.values() {
            let Some(text) = value.as_str() else {
                continue;
            };
            match parse_entity_reference(text) {
                Ok(reference) => return Ok(reference),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    /// Integer percentage for display, clamped to 0–100.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions
    )]
    pub fn percent(&self) -> Option<u8> {
        self.progress
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0).round() as u8)
    }
}

/// The entity a task operated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub uuid: Uuid,
    pub object_type: String,
}

/// Why an entity reference could not be extracted. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceParseError {
    #[error("no entity reference in task context")]
    NotFound,
    #[error("entity reference carries an invalid uuid '{0}'")]
    InvalidUuid(String),
}

static ENTITY_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*uuid\s*=\s*([^,\]\s]+)\s*,\s*objectType\s*=\s*([^\]\s]+)\s*\]")
        .expect("entity reference pattern should compile")
});

/// Extract `[uuid=<uuid>, objectType=<TYPE>]` from free text such as
/// `Uoid [uuid=e6023882-c570-47d5-a712-56198a3b6c18, objectType=SHARE]`.
pub fn parse_entity_reference(text: &str) -> Result<EntityReference, ReferenceParseError> {
    let captures = ENTITY_REFERENCE
        .captures(text)
        .ok_or(ReferenceParseError::NotFound)?;

    let raw_uuid = captures.get(1).map_or("", |m| m.as_str());
    let object_type = captures.get(2).map_or("", |m| m.as_str());

    let uuid = Uuid::parse_str(raw_uuid)
        .map_err(|_| ReferenceParseError::InvalidUuid(raw_uuid.to_owned()))?;

    Ok(EntityReference {
        uuid,
        object_type: object_type.to_owned(),
    })
}
