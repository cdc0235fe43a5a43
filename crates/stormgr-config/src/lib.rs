//! Shared configuration for the stormgr CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `stormgr_api::SessionConfig` / `MonitorOptions`.
//! The CLI layers its flag overrides on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use stormgr_api::{Credentials, MonitorOptions, SessionConfig, TlsMode};

const KEYRING_SERVICE: &str = "stormgr";
const PASSWORD_ENV: &str = "STORMGR_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("no password configured for user '{username}' in profile '{profile}'")]
    NoCredentials { profile: String, username: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named cluster profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else `default_profile`,
    /// else `"default"`.
    pub fn profile_name<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

/// Settings shared by every profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between task status checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Seconds a monitored call may take before giving up.
    #[serde(default = "default_task_timeout")]
    pub task_timeout: u64,

    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            task_timeout: default_task_timeout(),
            verify_ssl: default_verify_ssl(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    stormgr_api::DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_task_timeout() -> u64 {
    stormgr_api::DEFAULT_TASK_TIMEOUT.as_secs()
}
fn default_verify_ssl() -> bool {
    true
}

/// A named cluster profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Cluster host name or address; may carry an explicit scheme.
    pub cluster: String,

    pub port: Option<u16>,

    /// Management path prefix (defaults to `mgmt`).
    pub api_prefix: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext, prefer the keyring or an env var).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override `defaults.verify_ssl`.
    pub verify_ssl: Option<bool>,

    /// Override `defaults.timeout`.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "stormgr", "stormgr").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stormgr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) layered under `STORMGR_` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STORMGR_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the password for a profile (no CLI flag step).
///
/// Order: the profile's `password_env`, `STORMGR_PASSWORD`, the system
/// keyring, then the plaintext `password` field.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's own env var
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Some(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

/// Credentials for a profile, or `None` when it has no username.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = profile.username.clone() else {
        return Ok(None);
    };

    let password =
        resolve_password(profile, profile_name).ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            username: username.clone(),
        })?;

    Ok(Some(Credentials::new(username, password)))
}

// ── Translation ─────────────────────────────────────────────────────

/// TLS mode for a profile: a custom CA wins, then the verify flag.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> TlsMode {
    let verify = profile.verify_ssl.unwrap_or(defaults.verify_ssl);
    match (&profile.ca_cert, verify) {
        (Some(ca), true) => TlsMode::CustomCa(ca.clone()),
        (_, verify) => TlsMode::from_verify_flag(verify),
    }
}

/// Build a `SessionConfig` from a profile. No CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    if profile.cluster.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "cluster".into(),
            reason: format!("profile '{profile_name}' has no cluster address"),
        });
    }

    let mut config = SessionConfig::new(profile.cluster.trim())
        .tls(tls_mode(profile, defaults))
        .timeout(Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)));

    if let Some(port) = profile.port {
        config = config.port(port);
    }
    if let Some(ref prefix) = profile.api_prefix {
        config = config.api_prefix(prefix.clone());
    }
    if let Some(credentials) = resolve_credentials(profile, profile_name)? {
        config = config.credentials(credentials);
    }

    Ok(config)
}

/// Task polling cadence from the shared defaults.
pub fn monitor_options(defaults: &Defaults) -> MonitorOptions {
    MonitorOptions::new(
        Duration::from_secs(defaults.poll_interval.max(1)),
        Duration::from_secs(defaults.task_timeout),
    )
}
