use std::time::Duration;

use thiserror::Error;

use crate::task::TaskStatus;

/// Top-level error type for the `stormgr-api` crate.
///
/// Covers every failure the core surfaces to its caller: authentication,
/// transport, task tracking, and safe updates. The CLI maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session lost its authentication and the
    /// single re-login attempt did not restore it.
    #[error("Authentication failed for user '{username}': {message}")]
    Authentication { username: String, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Network or HTTP failure for a specific call.
    #[error("{method} {url} failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        method: String,
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// HTTP client construction error.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP verb outside GET/POST/PUT/DELETE/PATCH.
    #[error("Unsupported HTTP method '{0}' (expected GET, POST, PUT, DELETE or PATCH)")]
    UnsupportedMethod(String),

    /// TLS setup error (unreadable or invalid CA certificate).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Tasks ───────────────────────────────────────────────────────
    /// The tracked task reached FAILED or CANCELED.
    #[error("Task {uuid} ended {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    TaskFailed {
        uuid: String,
        status: TaskStatus,
        message: Option<String>,
    },

    /// The tracked task did not reach a terminal state in time.
    #[error("Task {uuid} did not finish within {:.1}s", .elapsed.as_secs_f64())]
    TaskTimeout { uuid: String, elapsed: Duration },

    // ── Updates ─────────────────────────────────────────────────────
    /// The pre-update GET returned nothing to merge into.
    #[error("Nothing to update at '{path}'")]
    UpdateTargetNotFound { path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Transport { status: Some(401), .. }
        )
    }

    /// Returns `true` if the remote side reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                status: Some(404),
                ..
            } | Self::UpdateTargetNotFound { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying by the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(code), ..
            } => matches!(code, 502..=504),
            _ => false,
        }
    }

    /// HTTP status attached to a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(status: Option<u16>) -> Error {
        Error::Transport {
            method: "GET".into(),
            url: "https://nas01/mgmt/rest/tasks/t".into(),
            status,
            message: String::new(),
        }
    }

    #[test]
    fn unauthorized_reads_as_expired_session() {
        assert!(transport(Some(401)).is_auth_expired());
        assert!(!transport(Some(403)).is_auth_expired());
    }

    #[test]
    fn gateway_and_network_failures_are_transient() {
        assert!(transport(None).is_transient());
        assert!(transport(Some(503)).is_transient());
        assert!(!transport(Some(500)).is_transient());
        assert!(!transport(Some(404)).is_transient());
    }

    #[test]
    fn missing_targets_read_as_not_found() {
        assert!(transport(Some(404)).is_not_found());
        assert!(
            Error::UpdateTargetNotFound {
                path: "snmp".into()
            }
            .is_not_found()
        );
        assert_eq!(transport(Some(404)).status(), Some(404));
    }
}
