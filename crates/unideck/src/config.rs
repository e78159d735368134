//! CLI configuration -- thin wrapper around `unideck_config`.
//!
//! Adds the `--config` path override and the global flag overrides
//! (`--host`, `--site`, ...) on top of file + environment values.

use std::path::PathBuf;

use unideck_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use unideck_config::{Config, read_config_file, save_config_to};

/// Config file in effect: `--config` / `UNIDECK_CONFIG`, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config_file
        .clone()
        .unwrap_or_else(unideck_config::config_path)
}

/// File + environment, then CLI flags on top.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = unideck_config::load_config_from(&config_path(global))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        cfg.host.clone_from(host);
    }
    if let Some(port) = global.port {
        cfg.port = port;
    }
    if let Some(ref username) = global.username {
        cfg.username.clone_from(username);
    }
    if let Some(ref site) = global.site {
        cfg.site.clone_from(site);
    }
    if global.verify_tls {
        cfg.verify_tls = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
}

/// Resolve credentials and build the core connection config.
pub fn controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load(global)?;
    Ok(unideck_config::to_controller_config(&cfg)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "unideck",
            "--host",
            "10.1.1.1",
            "--site",
            "lab",
            "--timeout",
            "3",
            "--verify-tls",
            "status",
        ])
        .unwrap();
        let mut cfg = Config {
            host: "192.168.1.1".into(),
            username: "admin".into(),
            ..Config::default()
        };

        apply_overrides(&mut cfg, &cli.global);

        assert_eq!(cfg.host, "10.1.1.1");
        assert_eq!(cfg.site, "lab");
        assert_eq!(cfg.timeout_secs, 3);
        assert!(cfg.verify_tls);
        assert_eq!(cfg.username, "admin");
        assert_eq!(cfg.port, 8443);
    }
}
