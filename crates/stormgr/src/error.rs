//! CLI error types with miette diagnostics.
//!
//! Maps `stormgr_api::Error` and `ConfigError` variants into user-facing
//! errors with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use stormgr_api::{Error as ApiError, TaskStatus};
use stormgr_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const TASK_FAILED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach {url}: {message}")]
    #[diagnostic(
        code(stormgr::connection_failed),
        help(
            "Check that the cluster is up and the address and port are right.\n\
             For a self-signed certificate use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, message: String },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(stormgr::tls_error),
        help("Check the ca_cert path in your profile, or use --insecure (-k).")
    )]
    Tls { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed for '{username}': {message}")]
    #[diagnostic(
        code(stormgr::auth_failed),
        help(
            "Verify the username and password.\n\
             Run: stormgr config set-password"
        )
    )]
    AuthFailed { username: String, message: String },

    #[error("No password configured for user '{username}' in profile '{profile}'")]
    #[diagnostic(
        code(stormgr::no_credentials),
        help(
            "Store one with: stormgr config set-password\n\
             Or set the STORMGR_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String, username: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Nothing found at '{path}'")]
    #[diagnostic(
        code(stormgr::not_found),
        help("Check the resource path or id; list the collection to see what exists.")
    )]
    NotFound { path: String },

    #[error("{method} {url} was rejected (HTTP {status}): {message}")]
    #[diagnostic(code(stormgr::api_error))]
    ApiError {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(stormgr::bad_response), help("Re-run with -vv to see the request."))]
    BadResponse { message: String },

    // ── Tasks ────────────────────────────────────────────────────────

    #[error("Task {uuid} ended {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    #[diagnostic(
        code(stormgr::task_failed),
        help("Inspect it with: stormgr task {uuid}")
    )]
    TaskFailed {
        uuid: String,
        status: TaskStatus,
        message: Option<String>,
    },

    #[error("Task {uuid} did not finish within {seconds}s")]
    #[diagnostic(
        code(stormgr::timeout),
        help(
            "The task may still be running. Check with: stormgr task {uuid}\n\
             Wait longer with --task-timeout."
        )
    )]
    TaskTimeout { uuid: String, seconds: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stormgr::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stormgr::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: stormgr config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No cluster configured")]
    #[diagnostic(
        code(stormgr::no_config),
        help(
            "Create a profile with: stormgr config init\n\
             Or pass --cluster. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(stormgr::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(stormgr::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(stormgr::json), help("Check the JSON document and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError { status: 403, .. } => exit_code::PERMISSION,
            Self::ApiError { status: 409, .. } => exit_code::CONFLICT,
            Self::TaskTimeout { .. } => exit_code::TIMEOUT,
            Self::TaskFailed { .. } => exit_code::TASK_FAILED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Authentication { username, message } => {
                CliError::AuthFailed { username, message }
            }

            ApiError::Transport {
                url,
                status: None,
                message,
                ..
            } => CliError::ConnectionFailed { url, message },

            ApiError::Transport {
                url,
                status: Some(404),
                ..
            } => CliError::NotFound { path: url },

            ApiError::Transport {
                method,
                url,
                status: Some(status),
                message,
            } => CliError::ApiError {
                method,
                url,
                status,
                message,
            },

            ApiError::Http(e) => CliError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                message: e.to_string(),
            },

            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "cluster".into(),
                reason: e.to_string(),
            },

            ApiError::UnsupportedMethod(method) => CliError::Validation {
                field: "method".into(),
                reason: format!("'{method}' is not one of GET, POST, PUT, DELETE, PATCH"),
            },

            ApiError::Tls(message) => CliError::Tls { message },

            ApiError::TaskFailed {
                uuid,
                status,
                message,
            } => CliError::TaskFailed {
                uuid,
                status,
                message,
            },

            ApiError::TaskTimeout { uuid, elapsed } => CliError::TaskTimeout {
                uuid,
                seconds: elapsed.as_secs(),
            },

            ApiError::UpdateTargetNotFound { path } => CliError::NotFound { path },

            ApiError::Deserialization { message, .. } => CliError::BadResponse { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile, username } => {
                CliError::NoCredentials { profile, username }
            }
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let cases = [
            (
                ApiError::Authentication {
                    username: "admin".into(),
                    message: "bad password".into(),
                },
                exit_code::AUTH,
            ),
            (
                ApiError::Transport {
                    method: "GET".into(),
                    url: "https://c/mgmt/rest/shares/x".into(),
                    status: Some(404),
                    message: "gone".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                ApiError::Transport {
                    method: "GET".into(),
                    url: "https://c/mgmt/rest/shares".into(),
                    status: None,
                    message: "connection refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                ApiError::TaskTimeout {
                    uuid: "t".into(),
                    elapsed: Duration::from_secs(3),
                },
                exit_code::TIMEOUT,
            ),
            (
                ApiError::TaskFailed {
                    uuid: "t".into(),
                    status: TaskStatus::Failed,
                    message: Some("disk full".into()),
                },
                exit_code::TASK_FAILED,
            ),
            (
                ApiError::UpdateTargetNotFound {
                    path: "snmp".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                ApiError::UnsupportedMethod("TRACE".into()),
                exit_code::USAGE,
            ),
        ];

        for (err, code) in cases {
            let label = err.to_string();
            assert_eq!(CliError::from(err).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn conflicts_and_permissions_have_their_own_codes() {
        let api = |status| CliError::ApiError {
            method: "POST".into(),
            url: "u".into(),
            status,
            message: String::new(),
        };
        assert_eq!(api(409).exit_code(), exit_code::CONFLICT);
        assert_eq!(api(403).exit_code(), exit_code::PERMISSION);
        assert_eq!(api(500).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn task_failure_message_is_kept() {
        let err = CliError::from(ApiError::TaskFailed {
            uuid: "t1".into(),
            status: TaskStatus::Failed,
            message: Some("disk full".into()),
        });
        assert!(err.to_string().contains("disk full"));
    }
}
