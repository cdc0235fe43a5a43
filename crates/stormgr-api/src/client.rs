// Generic storage client
//
// One client type for every resource kind: a parameterized `call`
// primitive plus shortcuts for plain reads, monitored mutations, and safe
// updates. Resource wrappers (shares, users, ...) are inherent methods in
// `resources/` layered on top of these.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::monitor::{MonitorOptions, TaskOutcome};
use crate::request::{Method, QueryValue, RawResult, Request};
use crate::session::{Session, SessionConfig};
use crate::task::Task;

/// Client for one cluster, sharing a single [`Session`].
///
/// Cloning is cheap; clones share the session and its login state.
#[derive(Debug, Clone)]
pub struct StorageClient {
    session: Arc<Session>,
    monitor: MonitorOptions,
}

impl StorageClient {
    /// Initialize a session from `config` and wrap it.
    pub fn connect(config: SessionConfig) -> Result<Self, Error> {
        Ok(Self::new(Arc::new(Session::initialize(config)?)))
    }

    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            monitor: MonitorOptions::default(),
        }
    }

    /// Replace the polling cadence used by monitored calls.
    pub fn with_monitor_options(mut self, options: MonitorOptions) -> Self {
        self.monitor = options;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn monitor_options(&self) -> &MonitorOptions {
        &self.monitor
    }

    // ── Call primitive ───────────────────────────────────────────────

    /// One call with an explicit method, optional JSON body, and query.
    pub async fn call(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
        query: Vec<(String, QueryValue)>,
    ) -> Result<RawResult, Error> {
        self.session
            .invoke(Request::new(method, path).json_value(body).queries(query))
            .await
    }

    /// Like [`call`](Self::call), following any task the call starts.
    pub async fn call_monitored(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
        query: Vec<(String, QueryValue)>,
    ) -> Result<TaskOutcome, Error> {
        self.monitor_with(
            Request::new(method, path).json_value(body).queries(query),
            &self.monitor,
        )
        .await
    }

    pub async fn monitor_with(
        &self,
        request: Request,
        options: &MonitorOptions,
    ) -> Result<TaskOutcome, Error> {
        self.session.monitor(request, options).await
    }

    // ── Shortcuts ────────────────────────────────────────────────────

    /// Formatted GET.
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        self.session
            .invoke(Request::get(path))
            .await
            .map(RawResult::into_value)
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: Vec<(String, QueryValue)>,
    ) -> Result<Value, Error> {
        self.session
            .invoke(Request::get(path).queries(query))
            .await
            .map(RawResult::into_value)
    }

    /// POST and follow the resulting task.
    pub async fn create(&self, path: &str, body: Value) -> Result<TaskOutcome, Error> {
        self.monitor_with(Request::post(path).json_value(Some(body)), &self.monitor)
            .await
    }

    /// DELETE and follow the resulting task (or take the 204 short-circuit).
    pub async fn remove(&self, path: &str) -> Result<TaskOutcome, Error> {
        self.monitor_with(Request::delete(path), &self.monitor)
            .await
    }

    /// Safe update: read-modify-write `patch` into `path`.
    pub async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<RawResult, Error> {
        self.session.update(path, patch).await
    }

    /// Safe update whose PUT starts a task.
    pub async fn update_monitored(
        &self,
        path: &str,
        patch: Map<String, Value>,
    ) -> Result<TaskOutcome, Error> {
        self.session
            .update_monitored(path, patch, &self.monitor)
            .await
    }

    /// Current state of a task.
    pub async fn task(&self, uuid: &str) -> Result<Option<Task>, Error> {
        self.session.fetch_task(uuid).await
    }

    pub async fn logout(&self) -> Result<(), Error> {
        self.session.logout().await
    }
}
