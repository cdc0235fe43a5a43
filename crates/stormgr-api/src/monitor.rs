// Task monitor
//
// Issues a mutating call, then polls `tasks/{uuid}` until the task
// reaches a terminal state or the time budget runs out. A completed task
// resolves to the entity it acted on when its context names one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::request::{RawResult, Request};
use crate::session::Session;
use crate::task::{Task, TaskStatus};

/// Default pause between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default time budget for one monitored call.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// JSON pointer to the task id in a mutating call's response.
const TASK_UUID_POINTER: &str = "/objectIdentifier/uuid";

/// Callback invoked with every task status observed while polling.
pub type ProgressFn = Arc<dyn Fn(&Task) + Send + Sync>;

/// Polling cadence, budget, and entity resolution for [`Session::monitor`].
#[derive(Clone)]
pub struct MonitorOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Collection to fetch the resolved entity from. Defaults to the
    /// monitored resource path with any trailing UUID segment removed.
    pub entity_collection: Option<String>,
    progress: Option<ProgressFn>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TASK_TIMEOUT,
            entity_collection: None,
            progress: None,
        }
    }
}

impl fmt::Debug for MonitorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorOptions")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .field("entity_collection", &self.entity_collection)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl MonitorOptions {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
            ..Self::default()
        }
    }

    pub fn entity_collection(mut self, collection: impl Into<String>) -> Self {
        self.entity_collection = Some(collection.into());
        self
    }

    pub fn on_progress(mut self, progress: impl Fn(&Task) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    fn report(&self, task: &Task) {
        if let Some(progress) = &self.progress {
            progress(task);
        }
    }
}

/// How a monitored call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// DELETE answered 204: done, no task was created.
    Deleted,
    /// The response carried no task identifier; returned unchanged.
    Untracked(Value),
    /// The task completed and the entity it acted on was fetched.
    Resolved { task: Task, entity: Value },
    /// The task completed without a usable entity reference.
    Completed(Task),
}

impl TaskOutcome {
    /// The value a caller presents: the entity, the task record, the
    /// untracked response, or `true` for a short-circuited delete.
    pub fn into_value(self) -> Value {
        match self {
            Self::Deleted => Value::Bool(true),
            Self::Untracked(value) | Self::Resolved { entity: value, .. } => value,
            Self::Completed(task) => serde_json::to_value(task).unwrap_or(Value::Null),
        }
    }

    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::Resolved { task, .. } | Self::Completed(task) => Some(task),
            Self::Deleted | Self::Untracked(_) => None,
        }
    }
}

impl Session {
    /// Issue `call` and follow the task it starts to a terminal state.
    ///
    /// Transient status-fetch failures are logged and polling continues;
    /// the initiating call itself is never retried. No status fetch is
    /// started once `options.timeout` has elapsed, and one still in flight
    /// at that point is abandoned.
    pub async fn monitor(&self, call: Request, options: &MonitorOptions) -> Result<TaskOutcome, Error> {
        let method = call.method;
        let resource_path = call.path.clone();

        let initial = match self.invoke(call.raw()).await? {
            RawResult::Deleted => {
                debug!(%method, path = %resource_path, "delete completed without a task");
                return Ok(TaskOutcome::Deleted);
            }
            RawResult::Document(value) => value,
        };

        let Some(uuid) = task_uuid(&initial) else {
            warn!(%method, path = %resource_path, "response carries no task identifier; nothing to track");
            return Ok(TaskOutcome::Untracked(initial));
        };

        info!(task = %uuid, %method, path = %resource_path, "tracking task");

        let started = Instant::now();
        while started.elapsed() < options.timeout {
            let remaining = options.timeout.saturating_sub(started.elapsed());
            let Ok(fetched) = timeout(remaining, self.fetch_task(&uuid)).await else {
                warn!(task = %uuid, "task status fetch still pending when the time budget ran out");
                break;
            };

            match fetched {
                Ok(Some(task)) => {
                    options.report(&task);
                    debug!(task = %uuid, status = %task.status, progress = ?task.progress, "task status");

                    match task.status {
                        TaskStatus::Completed => {
                            info!(task = %uuid, elapsed = ?started.elapsed(), "task completed");
                            return Ok(self.resolve_completed(task, &resource_path, options).await);
                        }
                        TaskStatus::Failed | TaskStatus::Canceled => {
                            return Err(Error::TaskFailed {
                                uuid,
                                status: task.status,
                                message: task.status_message,
                            });
                        }
                        TaskStatus::Pending | TaskStatus::Running | TaskStatus::Unknown => {}
                    }
                }
                Ok(None) => warn!(task = %uuid, "task status fetch returned nothing; will retry"),
                Err(e) => warn!(
                    task = %uuid,
                    error = %e,
                    transient = e.is_transient(),
                    "task status fetch failed; will retry"
                ),
            }

            let elapsed = started.elapsed();
            if elapsed >= options.timeout {
                break;
            }
            sleep(options.poll_interval.min(options.timeout - elapsed)).await;
        }

        Err(Error::TaskTimeout {
            uuid,
            elapsed: started.elapsed(),
        })
    }

    /// `GET tasks/{uuid}`, unformatted. `None` when the server returns nothing.
    pub async fn fetch_task(&self, uuid: &str) -> Result<Option<Task>, Error> {
        let result = self.invoke(Request::get(format!("tasks/{uuid}")).raw()).await?;
        match result {
            RawResult::Document(Value::Null) | RawResult::Deleted => Ok(None),
            RawResult::Document(value) => {
                serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                    Error::Deserialization {
                        message: format!("task {uuid}: {e}"),
                        body: value.to_string(),
                    }
                })
            }
        }
    }

    async fn resolve_completed(
        &self,
        task: Task,
        resource_path: &str,
        options: &MonitorOptions,
    ) -> TaskOutcome {
        let reference = match task.entity_reference() {
            Ok(reference) => reference,
            Err(reason) => {
                debug!(task = %task.uuid, %reason, "returning task record");
                return TaskOutcome::Completed(task);
            }
        };

        let path = entity_path(
            resource_path,
            options.entity_collection.as_deref(),
            &reference.uuid,
        );
        match self.invoke(Request::get(path.clone())).await {
            Ok(RawResult::Document(entity)) if !entity.is_null() => {
                TaskOutcome::Resolved { task, entity }
            }
            Ok(_) => {
                warn!(task = %task.uuid, %path, "resolved entity is empty; returning task record");
                TaskOutcome::Completed(task)
            }
            Err(e) => {
                warn!(task = %task.uuid, %path, error = %e, "could not fetch resolved entity; returning task record");
                TaskOutcome::Completed(task)
            }
        }
    }
}

/// Task id from a mutating call's response, if it started a task.
pub fn task_uuid(response: &Value) -> Option<String> {
    response
        .pointer(TASK_UUID_POINTER)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

/// Where the entity a task produced can be fetched.
///
/// `POST shares` → `shares/{uuid}`; `PUT shares/{old}` → `shares/{uuid}`.
pub(crate) fn entity_path(resource_path: &str, collection: Option<&str>, uuid: &Uuid) -> String {
    let collection = match collection {
        Some(c) => c.trim_matches('/').to_owned(),
        None => {
            let path = resource_path
                .split(['?', '#'])
                .next()
                .unwrap_or(resource_path)
                .trim_end_matches('/');
            match path.rsplit_once('/') {
                Some((head, last)) if Uuid::parse_str(last).is_ok() => head.to_owned(),
                None if Uuid::parse_str(path).is_ok() => String::new(),
                _ => path.to_owned(),
            }
        }
    };

    if collection.is_empty() {
        uuid.to_string()
    } else {
        format!("{collection}/{uuid}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id() -> Uuid {
        Uuid::parse_str("e6023882-c570-47d5-a712-56198a3b6c18").unwrap()
    }

    #[test]
    fn entity_path_appends_to_collection() {
        assert_eq!(
            entity_path("shares", None, &id()),
            "shares/e6023882-c570-47d5-a712-56198a3b6c18"
        );
    }

    #[test]
    fn entity_path_replaces_trailing_uuid() {
        assert_eq!(
            entity_path("/shares/0c1d1a32-8a0e-4bd9-9c61-4b3c1c2f9a10?force=true", None, &id()),
            "/shares/e6023882-c570-47d5-a712-56198a3b6c18"
        );
    }

    #[test]
    fn entity_path_honours_override() {
        assert_eq!(
            entity_path("snapshots/actions/restore", Some("/volumes/"), &id()),
            "volumes/e6023882-c570-47d5-a712-56198a3b6c18"
        );
    }

    #[test]
    fn task_uuid_is_read_from_object_identifier() {
        let resp = json!({"objectIdentifier": {"uuid": "abc-123", "objectType": "TASK"}});
        assert_eq!(task_uuid(&resp).as_deref(), Some("abc-123"));
        assert_eq!(task_uuid(&json!({"uuid": "abc-123"})), None);
        assert_eq!(task_uuid(&json!({"objectIdentifier": {"uuid": ""}})), None);
    }

    #[test]
    fn outcome_values() {
        assert_eq!(TaskOutcome::Deleted.into_value(), json!(true));
        assert_eq!(
            TaskOutcome::Untracked(json!({"ok": 1})).into_value(),
            json!({"ok": 1})
        );
    }

    #[test]
    fn defaults_match_documented_cadence() {
        let opts = MonitorOptions::default();
        assert_eq!(opts.poll_interval, Duration::from_secs(5));
        assert_eq!(opts.timeout, Duration::from_secs(300));
    }
}
