//! CLI configuration: thin wrapper around `stormgr_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--cluster, --username, --insecure, ...).

use std::time::Duration;

use clap::ValueEnum;
use stormgr_api::{Credentials, MonitorOptions, SessionConfig, TlsMode};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use stormgr_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref()).to_owned()
}

/// Output format: flag, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        <OutputFormat as ValueEnum>::from_str(&config.defaults.output, true)
            .unwrap_or(OutputFormat::Table)
    })
}

/// Build the session configuration for the active profile.
///
/// CLI flags override profile values. Without a profile, `--cluster`
/// alone is enough for an anonymous session.
pub fn resolve_session(global: &GlobalOpts, config: &Config) -> Result<SessionConfig, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.cluster.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let available: Vec<_> = config.profiles.keys().cloned().collect();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // 1. Flag overrides (flag > env > profile)
    if let Some(ref cluster) = global.cluster {
        profile.cluster.clone_from(cluster);
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    // 2. Everything else comes from the shared translation
    let mut session =
        stormgr_config::profile_to_session_config(&profile, &profile_name, &config.defaults)?;

    // 3. Username given on the command line
    if let Some(ref username) = global.username {
        let password = stormgr_config::resolve_password(&profile, &profile_name).ok_or_else(
            || CliError::NoCredentials {
                profile: profile_name.clone(),
                username: username.clone(),
            },
        )?;
        session = session.credentials(Credentials::new(username.clone(), password));
    }

    // 4. TLS: --insecure always wins
    if global.insecure {
        session = session.tls(TlsMode::DangerAcceptInvalid);
    }

    Ok(session)
}

/// Task polling cadence: flags over config defaults.
pub fn resolve_monitor_options(global: &GlobalOpts, config: &Config) -> MonitorOptions {
    let mut options = stormgr_config::monitor_options(&config.defaults);
    if let Some(secs) = global.poll_interval {
        options.poll_interval = Duration::from_secs(secs.max(1));
    }
    if let Some(secs) = global.task_timeout {
        options.timeout = Duration::from_secs(secs);
    }
    options
}
