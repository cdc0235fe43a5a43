// stormgr-api: async client core for storage-management REST services
//
// Session handling, the request gateway, response formatting, task
// monitoring, and read-modify-write updates, plus thin resource wrappers.

pub mod auth;
pub mod client;
pub mod error;
pub mod formatter;
pub mod gateway;
pub mod monitor;
pub mod request;
pub mod resources;
pub mod session;
pub mod task;
pub mod transport;
pub mod updater;

pub use auth::Credentials;
pub use client::StorageClient;
pub use error::Error;
pub use monitor::{DEFAULT_POLL_INTERVAL, DEFAULT_TASK_TIMEOUT, MonitorOptions, ProgressFn, TaskOutcome};
pub use request::{Body, Method, QueryValue, RawResult, Request};
pub use session::{DEFAULT_API_PREFIX, DEFAULT_PORT, Session, SessionConfig};
pub use task::{EntityReference, ReferenceParseError, Task, TaskStatus, parse_entity_reference};
pub use transport::{TlsMode, TransportConfig};
pub use updater::merge_patch;
