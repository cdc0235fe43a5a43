// Session management
//
// A `Session` is the connection and authentication context for one
// cluster: derived URLs, credentials, the HTTP client with its cookie
// jar, and the authenticated flag. It is created once by `initialize`
// and passed explicitly to every gateway, monitor, and updater call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use reqwest::cookie::Jar;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::request::Request;
use crate::transport::{TlsMode, TransportConfig};

static INSECURE_TLS_WARNING: Once = Once::new();

/// Default management path prefix in front of `/rest/` and `/login`.
pub const DEFAULT_API_PREFIX: &str = "mgmt";

/// Default HTTPS port of the management service.
pub const DEFAULT_PORT: u16 = 443;

/// Everything needed to initialize a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Host name or address. May carry an explicit `http://` or
    /// `https://` scheme and port, which then take precedence.
    pub cluster: String,
    pub port: u16,
    pub api_prefix: String,
    pub credentials: Option<Credentials>,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            port: DEFAULT_PORT,
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            credentials: None,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.tls = TlsMode::from_verify_flag(verify);
        self
    }

    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Connection and authentication state for one cluster.
pub struct Session {
    cluster: String,
    base_url: Url,
    login_url: Url,
    logout_url: Url,
    credentials: Option<Credentials>,
    tls: TlsMode,
    timeout: Duration,
    authenticated: AtomicBool,
    /// Serializes logins so concurrent first calls trigger a single one.
    login_gate: Mutex<()>,
    http: reqwest::Client,
    cookie_jar: Arc<Jar>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("cluster", &self.cluster)
            .field("base_url", &self.base_url.as_str())
            .field("login_url", &self.login_url.as_str())
            .field(
                "username",
                &self.credentials.as_ref().map(|c| c.username.as_str()),
            )
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build URLs and the transport; the session starts unauthenticated.
    ///
    /// With certificate verification disabled a warning is logged once per
    /// process and the transport skips validation for the session's lifetime.
    pub fn initialize(config: SessionConfig) -> Result<Self, Error> {
        let origin = cluster_origin(&config.cluster, config.port)?;
        let prefix = config.api_prefix.trim_matches('/');
        let root = if prefix.is_empty() {
            origin
        } else {
            format!("{origin}/{prefix}")
        };

        let base_url = Url::parse(&format!("{root}/rest/"))?;
        let login_url = Url::parse(&format!("{root}/login"))?;
        let logout_url = Url::parse(&format!("{root}/logout"))?;

        if !config.tls.verifies_certificates() {
            INSECURE_TLS_WARNING.call_once(|| {
                warn!(
                    cluster = %config.cluster,
                    "TLS certificate verification is disabled; connections are not authenticated"
                );
            });
        }

        let transport = TransportConfig::new(config.tls.clone(), config.timeout);
        let http = transport.build_client()?;

        debug!(base = %base_url, login = %login_url, "session initialized");

        Ok(Self {
            cluster: config.cluster,
            base_url,
            login_url,
            logout_url,
            credentials: config.credentials,
            tls: config.tls,
            timeout: config.timeout,
            authenticated: AtomicBool::new(false),
            login_gate: Mutex::new(()),
            http,
            cookie_jar: transport.cookie_jar,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// `scheme://host:port/<prefix>/rest/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `scheme://host:port/<prefix>/login`
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn verifies_certificates(&self) -> bool {
        self.tls.verifies_certificates()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The session cookie header for the REST base URL, if one was set.
    pub fn cookie_header(&self) -> Option<String> {
        use reqwest::cookie::CookieStore;

        let cookies = self.cookie_jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with the configured credentials.
    ///
    /// POSTs `username`/`password` form fields to the login URL. The
    /// session cookie lands in the jar; the authenticated flag follows
    /// the outcome.
    pub async fn login(&self) -> Result<(), Error> {
        let _gate = self.login_gate.lock().await;
        self.login_unguarded().await
    }

    async fn login_unguarded(&self) -> Result<(), Error> {
        let Some(credentials) = self.credentials.as_ref() else {
            return Err(Error::Authentication {
                username: String::new(),
                message: "no credentials configured for this session".into(),
            });
        };

        info!(user = %credentials.username, url = %self.login_url, "logging in");

        let request = Request::login(self.login_url.to_string(), credentials.form_fields());
        match self.execute(&request).await {
            Ok(_) => {
                self.authenticated.store(true, Ordering::SeqCst);
                debug!("login successful");
                Ok(())
            }
            Err(e) => {
                self.authenticated.store(false, Ordering::SeqCst);
                Err(Error::Authentication {
                    username: credentials.username.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Log in first if this request needs an authenticated session.
    ///
    /// No-op for sessions without credentials, for sessions already logged
    /// in, for the login request itself, and for the post-login retry.
    pub async fn ensure_authenticated(&self, request: &Request) -> Result<(), Error> {
        if self.credentials.is_none()
            || request.is_login()
            || request.is_retry_after_login()
            || self.is_authenticated()
        {
            return Ok(());
        }

        let _gate = self.login_gate.lock().await;
        // Another caller may have finished logging in while we waited.
        if self.is_authenticated() {
            return Ok(());
        }
        self.login_unguarded().await
    }

    /// Forget the current authentication; the next call logs in again.
    pub fn invalidate(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    /// End the session on the server. Best effort: the local flag is
    /// cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        if !self.is_authenticated() {
            return Ok(());
        }

        debug!(url = %self.logout_url, "logging out");
        let request = Request::post(self.logout_url.to_string());
        let result = self.execute(&request).await;
        self.invalidate();
        result.map(|_| ())
    }
}

/// `scheme://host:port` for a cluster given as a bare host or a URL.
fn cluster_origin(cluster: &str, port: u16) -> Result<String, Error> {
    let raw = cluster.trim().trim_end_matches('/');
    let mut url = if raw.contains("://") {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("https://{raw}"))?
    };

    if url.port().is_none() && port != DEFAULT_PORT {
        url.set_port(Some(port))
            .map_err(|()| Error::InvalidUrl(url::ParseError::InvalidPort))?;
    }

    let origin = url.origin().ascii_serialization();
    if origin == "null" {
        return Err(Error::InvalidUrl(url::ParseError::EmptyHost));
    }
    Ok(origin)
}
