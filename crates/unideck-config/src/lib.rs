//! Configuration for unideck.
//!
//! A flat TOML file describing one controller, overlaid with `UNIDECK_*`
//! environment variables, plus credential resolution (env, keyring,
//! plaintext) and translation to `unideck_core::ControllerConfig`.

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

use unideck_core::ControllerConfig;

/// Keyring service name under which passwords are stored.
pub const KEYRING_SERVICE: &str = "unideck";

/// Environment variable consulted for the password when no named one is set.
pub const PASSWORD_ENV: &str = "UNIDECK_PASSWORD";

const ENV_PREFIX: &str = "UNIDECK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for '{account}'")]
    NoCredentials { account: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Controller hostname, IP address or URL.
    pub host: String,

    pub port: u16,

    pub username: String,

    /// Password (plaintext -- prefer the keyring or an env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Numeric 2FA code for accounts that require one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_token: Option<String>,

    pub verify_tls: bool,

    pub site: String,

    pub timeout_secs: u64,

    pub liveness_interval_secs: u64,

    /// Output preferences for the CLI.
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8443,
            username: String::new(),
            password: None,
            password_env: None,
            two_factor_token: None,
            verify_tls: false,
            site: "default".into(),
            timeout_secs: 10,
            liveness_interval_secs: 15,
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Keyring account for this controller login.
    pub fn keyring_account(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unideck", "unideck").map_or_else(
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
    p.push("unideck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file yields the
/// defaults (still overlaid with the environment).
///
/// `UNIDECK_PASSWORD` is left to [`resolve_password`] so that a keyring
/// entry still outranks a plaintext password in the file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["password", "config", "log"])
                .split("__"),
        );

    Ok(figment.extract()?)
}

/// Read only the file at `path`, without the environment overlay. For
/// edit-and-save round trips that must not persist env values.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path));

    Ok(figment.extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password: named env var, then `UNIDECK_PASSWORD`, then the
/// system keyring, then plaintext in the config.
pub fn resolve_password(cfg: &Config) -> Result<SecretString, ConfigError> {
    resolve_password_with(cfg, |name| std::env::var(name).ok(), keyring_password)
}

fn resolve_password_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Config's password_env → env var lookup
    if let Some(pw) = cfg.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(pw));
    }

    // 2. Well-known env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    let account = cfg.keyring_account();
    if let Some(pw) = keyring(&account) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = cfg.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials { account })
}

fn keyring_password(account: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, account)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store a password in the system keyring under this config's account.
pub fn store_password_in_keyring(cfg: &Config, password: &str) -> Result<(), ConfigError> {
    if cfg.username.is_empty() || cfg.host.is_empty() {
        return Err(ConfigError::Validation {
            field: "username".into(),
            reason: "host and username must be set before storing a password".into(),
        });
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, &cfg.keyring_account())?;
    entry.set_password(password)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig`, resolving the password.
///
/// Only presence is checked here; value checks happen in
/// [`ControllerConfig::validate`].
pub fn to_controller_config(cfg: &Config) -> Result<ControllerConfig, ConfigError> {
    if cfg.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "not set (add `host` to the config file or set UNIDECK_HOST)".into(),
        });
    }
    if cfg.username.is_empty() {
        return Err(ConfigError::Validation {
            field: "username".into(),
            reason: "not set (add `username` to the config file or set UNIDECK_USERNAME)".into(),
        });
    }

    let password = resolve_password(cfg)?;

    Ok(ControllerConfig {
        host: cfg.host.clone(),
        port: cfg.port,
        username: cfg.username.clone(),
        password,
        two_factor_token: cfg.two_factor_token.clone().filter(|t| !t.is_empty()),
        verify_tls: cfg.verify_tls,
        site: cfg.site.clone(),
        timeout: Duration::from_secs(cfg.timeout_secs),
        liveness_interval: Duration::from_secs(cfg.liveness_interval_secs),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn configured() -> Config {
        Config {
            host: "192.168.1.1".into(),
            username: "admin".into(),
            ..Config::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            assert_eq!(cfg.site, "default");
            assert_eq!(cfg.port, 8443);
            Ok(())
        });
    }

    #[test]
    fn file_without_site_gets_default_site() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    host = "10.0.0.2"
                    username = "deck"
                    port = 443
                "#,
            )?;
            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.host, "10.0.0.2");
            assert_eq!(cfg.port, 443);
            assert_eq!(cfg.site, "default");
            assert_eq!(cfg.liveness_interval_secs, 15);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    host = "10.0.0.2"
                    username = "deck"
                    site = "default"

                    [defaults]
                    output = "table"
                "#,
            )?;
            jail.set_env("UNIDECK_SITE", "lab");
            jail.set_env("UNIDECK_VERIFY_TLS", "true");
            jail.set_env("UNIDECK_DEFAULTS__OUTPUT", "json");
            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.site, "lab");
            assert!(cfg.verify_tls);
            assert_eq!(cfg.defaults.output, "json");
            Ok(())
        });
    }

    #[test]
    fn password_env_var_is_not_merged_into_config() {
        Jail::expect_with(|jail| {
            jail.set_env("UNIDECK_PASSWORD", "from-env");
            let cfg = load_config_from(Path::new("absent.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.password, None);
            Ok(())
        });
    }

    #[test]
    fn reading_the_file_skips_the_environment() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "host = \"10.0.0.2\"\nsite = \"main\"\n")?;
            jail.set_env("UNIDECK_SITE", "lab");
            let cfg = read_config_file(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(cfg.site, "main");
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            password: Some("hunter22".into()),
            two_factor_token: Some("123456".into()),
            site: "branch".into(),
            ..configured()
        };

        save_config_to(&path, &cfg).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("host = \"192.168.1.1\""));
        assert!(!written.contains("password_env"));

        let loaded: Config = toml::from_str(&written).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn named_env_var_wins() {
        let cfg = Config {
            password_env: Some("DECK_PW".into()),
            password: Some("plain".into()),
            ..configured()
        };
        let pw = resolve_password_with(
            &cfg,
            |name| match name {
                "DECK_PW" => Some("named".into()),
                PASSWORD_ENV => Some("generic".into()),
                _ => None,
            },
            |_| Some("keyring".into()),
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "named");
    }

    #[test]
    fn unset_named_env_var_falls_through_to_generic() {
        let cfg = Config {
            password_env: Some("DECK_PW".into()),
            ..configured()
        };
        let pw = resolve_password_with(
            &cfg,
            |name| (name == PASSWORD_ENV).then(|| "generic".into()),
            |_| None,
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "generic");
    }

    #[test]
    fn keyring_beats_plaintext() {
        let cfg = Config {
            password: Some("plain".into()),
            ..configured()
        };
        let pw = resolve_password_with(
            &cfg,
            |_| None,
            |account| (account == "admin@192.168.1.1").then(|| "stored".into()),
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "stored");
    }

    #[test]
    fn plaintext_is_last_resort() {
        let cfg = Config {
            password: Some("plain".into()),
            ..configured()
        };
        let pw = resolve_password_with(&cfg, |_| None, |_| None).unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn no_password_anywhere() {
        let err = resolve_password_with(&configured(), |_| None, |_| None).unwrap_err();
        assert!(
            matches!(err, ConfigError::NoCredentials { ref account } if account == "admin@192.168.1.1")
        );
    }

    #[test]
    fn translation_requires_host() {
        let cfg = Config {
            username: "admin".into(),
            password: Some("x".into()),
            ..Config::default()
        };
        let err = to_controller_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }

    #[test]
    fn translation_carries_timing_and_site() {
        Jail::expect_with(|_jail| {
            let cfg = Config {
                password: Some("secret-pw".into()),
                two_factor_token: Some(String::new()),
                site: "lab".into(),
                timeout_secs: 5,
                liveness_interval_secs: 30,
                ..configured()
            };
            let cc = to_controller_config(&cfg).map_err(|e| e.to_string())?;
            assert_eq!(cc.host, "192.168.1.1");
            assert_eq!(cc.site, "lab");
            assert_eq!(cc.timeout, Duration::from_secs(5));
            assert_eq!(cc.liveness_interval, Duration::from_secs(30));
            assert_eq!(cc.two_factor_token, None);
            Ok(())
        });
    }
}
