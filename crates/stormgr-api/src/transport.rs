// Shared transport configuration for building reqwest::Client instances.
//
// Every session owns one client built from this config. TLS mode, timeout,
// and the cookie jar that carries the login session all live here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed cluster certificates).
    DangerAcceptInvalid,
}

impl TlsMode {
    /// Map the conventional `verify_ssl` flag onto a TLS mode.
    pub fn from_verify_flag(verify_ssl: bool) -> Self {
        if verify_ssl {
            Self::System
        } else {
            Self::DangerAcceptInvalid
        }
    }

    pub fn verifies_certificates(&self) -> bool {
        !matches!(self, Self::DangerAcceptInvalid)
    }
}

/// Transport settings shared by every call made through one session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Arc<Jar>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            cookie_jar: Arc::new(Jar::default()),
        }
    }
}

impl TransportConfig {
    pub fn new(tls: TlsMode, timeout: Duration) -> Self {
        Self {
            tls,
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("stormgr/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(Arc::clone(&self.cookie_jar));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
