//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::prompt_err;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::{self, Output};

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "host = \"{}\"", cfg.host);
    let _ = writeln!(out, "port = {}", cfg.port);
    let _ = writeln!(out, "username = \"{}\"", cfg.username);
    if cfg.password.is_some() {
        let _ = writeln!(out, "password = \"****\"");
    }
    if let Some(ref env) = cfg.password_env {
        let _ = writeln!(out, "password_env = \"{env}\"");
    }
    if cfg.two_factor_token.is_some() {
        let _ = writeln!(out, "two_factor_token = \"****\"");
    }
    let _ = writeln!(out, "verify_tls = {}", cfg.verify_tls);
    let _ = writeln!(out, "site = \"{}\"", cfg.site);
    let _ = writeln!(out, "timeout_secs = {}", cfg.timeout_secs);
    let _ = writeln!(out, "liveness_interval_secs = {}", cfg.liveness_interval_secs);
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = write!(out, "color = \"{}\"", cfg.defaults.color);

    out
}

fn redacted(cfg: &Config) -> Config {
    Config {
        password: cfg.password.as_ref().map(|_| "****".into()),
        two_factor_token: cfg.two_factor_token.as_ref().map(|_| "****".into()),
        ..cfg.clone()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a config loaded from file.
fn set_value(cfg: &mut Config, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "host" => cfg.host = value,
        "port" => cfg.port = parse_value(key, &value, "a port number (1-65535)")?,
        "username" => cfg.username = value,
        "password_env" | "password-env" => cfg.password_env = Some(value),
        "two_factor_token" | "two-factor-token" => {
            if !value.chars().all(|c| c.is_ascii_digit()) {
                return Err(CliError::Validation {
                    field: key.into(),
                    reason: "must be numeric".into(),
                });
            }
            cfg.two_factor_token = Some(value).filter(|v| !v.is_empty());
        }
        "verify_tls" | "verify-tls" => {
            cfg.verify_tls = parse_value(key, &value, "'true' or 'false'")?;
        }
        "site" => cfg.site = value,
        "timeout_secs" | "timeout" => {
            cfg.timeout_secs = parse_value(key, &value, "a number of seconds")?;
        }
        "liveness_interval_secs" | "liveness-interval" => {
            cfg.liveness_interval_secs = parse_value(key, &value, "a number of seconds")?;
        }
        "defaults.output" => cfg.defaults.output = value,
        "defaults.color" => cfg.defaults.color = value,
        "password" => {
            return Err(CliError::Validation {
                field: key.into(),
                reason: "use `unideck config set-password` to store it in the keyring".into(),
            });
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: "unknown config key".into(),
            });
        }
    }
    Ok(())
}

fn prompt_password() -> Result<String, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(pass)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts, out: &Output) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            eprintln!("unideck -- configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let host: String = Input::new()
                .with_prompt("Controller host")
                .default("192.168.1.1".into())
                .interact_text()
                .map_err(prompt_err)?;
            let port: u16 = Input::new()
                .with_prompt("Port")
                .default(8443)
                .interact_text()
                .map_err(prompt_err)?;
            let username: String = Input::new()
                .with_prompt("Username")
                .interact_text()
                .map_err(prompt_err)?;
            let password = prompt_password()?;
            let site: String = Input::new()
                .with_prompt("Site name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;
            let verify_tls = Confirm::new()
                .with_prompt("Verify the controller's TLS certificate?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            let mut cfg = Config {
                host,
                port,
                username,
                site,
                verify_tls,
                ..Config::default()
            };

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
                unideck_config::store_password_in_keyring(&cfg, &password)?;
                eprintln!("   ✓ Password stored in system keyring");
            } else {
                cfg.password = Some(password);
            }

            config::save_config_to(&path, &cfg)?;
            out.done(&format!("Config written to {}", path.display()));
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let rendered = output::render_single(
                out.format,
                &redacted(&cfg),
                format_config_redacted,
                |c| c.host.clone(),
            );
            out.print(&rendered);
            Ok(())
        }

        ConfigCommand::Path => {
            out.print(&path.display().to_string());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::read_config_file(&path)?;
            set_value(&mut cfg, &key, value)?;
            config::save_config_to(&path, &cfg)?;
            out.done(&format!("Set {key} in {}", path.display()));
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let password = prompt_password()?;
            unideck_config::store_password_in_keyring(&cfg, &password)?;
            out.done(&format!(
                "Password stored in system keyring for '{}'",
                cfg.keyring_account()
            ));
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_value_parses_typed_keys() {
        let mut cfg = Config::default();
        set_value(&mut cfg, "port", "443".into()).unwrap();
        set_value(&mut cfg, "verify-tls", "true".into()).unwrap();
        set_value(&mut cfg, "defaults.output", "json".into()).unwrap();
        assert_eq!(cfg.port, 443);
        assert!(cfg.verify_tls);
        assert_eq!(cfg.defaults.output, "json");

        assert!(set_value(&mut cfg, "port", "https".into()).is_err());
        assert!(set_value(&mut cfg, "two_factor_token", "12ab".into()).is_err());
        assert!(set_value(&mut cfg, "password", "hunter22".into()).is_err());
        assert!(set_value(&mut cfg, "colour", "never".into()).is_err());
    }

    #[test]
    fn display_masks_secrets() {
        let cfg = Config {
            host: "192.168.1.1".into(),
            password: Some("hunter22".into()),
            two_factor_token: Some("123456".into()),
            ..Config::default()
        };
        let shown = format_config_redacted(&cfg);
        assert!(shown.contains("password = \"****\""));
        assert!(!shown.contains("hunter22"));
        assert!(!shown.contains("123456"));

        let json = serde_json::to_string(&redacted(&cfg)).unwrap();
        assert!(!json.contains("hunter22"));
    }
}
