//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    let path = config::save_config(cfg)?;
    tracing::debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_flag<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Store a password in the keyring, or hand it back for plaintext config.
fn prompt_password_storage(profile_name: &str, password: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, password)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("stormgr configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let cluster: String = Input::new()
                .with_prompt("Cluster address")
                .interact_text()
                .map_err(prompt_err)?;

            let port: u16 = Input::new()
                .with_prompt("Management port")
                .default(stormgr_api::DEFAULT_PORT)
                .interact_text()
                .map_err(prompt_err)?;

            let username: String = Input::new()
                .with_prompt("Username")
                .interact_text()
                .map_err(prompt_err)?;

            let password = Password::new()
                .with_prompt("Password")
                .interact()
                .map_err(prompt_err)?;

            if username.is_empty() || password.is_empty() {
                return Err(CliError::Validation {
                    field: "credentials".into(),
                    reason: "username and password cannot be empty".into(),
                });
            }
            let password = prompt_password_storage(&profile_name, &password)?;

            let verify_ssl = Confirm::new()
                .with_prompt("Verify the cluster's TLS certificate?")
                .default(true)
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                cluster,
                port: (port != stormgr_api::DEFAULT_PORT).then_some(port),
                username: Some(username),
                password,
                verify_ssl: (!verify_ssl).then_some(false),
                ..Profile::default()
            };

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: stormgr snmp show");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let format = global.output.unwrap_or(OutputFormat::Yaml);
            let out = match format {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(stormgr_config::ConfigError::from)?
                }
                other => output::render_value(other, &serde_json::to_value(&cfg)?),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "cluster" => profile.cluster = value,
                "port" => profile.port = Some(parse_flag("port", &value, "a port number")?),
                "api_prefix" | "api-prefix" => profile.api_prefix = Some(value),
                "username" => profile.username = Some(value),
                "password_env" | "password-env" => profile.password_env = Some(value),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "verify_ssl" | "verify-ssl" => {
                    profile.verify_ssl =
                        Some(parse_flag("verify_ssl", &value, "'true' or 'false'")?);
                }
                "timeout" => {
                    profile.timeout = Some(parse_flag("timeout", &value, "a number (seconds)")?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: cluster, port, \
                             api_prefix, username, password_env, ca_cert, verify_ssl, timeout"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: stormgr config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.cluster);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let password = Password::new()
                .with_prompt(format!("Password for profile '{profile_name}'"))
                .interact()
                .map_err(prompt_err)?;
            config::store_password(&profile_name, &password)?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_passwords() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                cluster: "array01".into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        let shown = redacted(&cfg);
        assert_eq!(shown.profiles["lab"].password.as_deref(), Some(REDACTED));
        assert_eq!(shown.profiles["lab"].cluster, "array01");
    }
}
