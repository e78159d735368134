// ── Runtime connection configuration ──
//
// These types describe *how* to reach a controller. They carry credential
// data and timing knobs, but never touch disk. The binary builds a
// `ControllerConfig` from its config file and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use unideck_api::transport::{TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Hostname or IP address of the controller.
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Numeric second-factor code, for accounts with 2FA enabled.
    pub two_factor_token: Option<String>,
    /// Verify the controller's TLS certificate. Off by default since most
    /// controllers serve a self-signed certificate.
    pub verify_tls: bool,
    /// Site to operate on (defaults to "default").
    pub site: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often the liveness monitor probes the session.
    /// Must be strictly longer than `timeout`.
    pub liveness_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8443,
            username: String::new(),
            password: SecretString::from(String::new()),
            two_factor_token: None,
            verify_tls: false,
            site: "default".into(),
            timeout: Duration::from_secs(10),
            liveness_interval: Duration::from_secs(15),
        }
    }
}

impl ControllerConfig {
    /// Check the configuration before any connection attempt.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(config_error("host must not be empty"));
        }
        if self.port == 0 {
            return Err(config_error("port must be between 1 and 65535"));
        }
        if self.username.is_empty() {
            return Err(config_error("username must not be empty"));
        }
        if self.password.expose_secret().is_empty() {
            return Err(config_error("password must not be empty"));
        }
        if self.site.trim().is_empty() {
            return Err(config_error("site must not be empty"));
        }
        if let Some(token) = &self.two_factor_token {
            if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
                return Err(config_error("two-factor token must be numeric"));
            }
        }
        if self.timeout.is_zero() {
            return Err(config_error("timeout must be greater than zero"));
        }
        if self.liveness_interval <= self.timeout {
            return Err(config_error(
                "liveness interval must be longer than the request timeout",
            ));
        }
        self.base_url().map(|_| ())
    }

    /// Controller root URL, e.g. `https://192.168.1.1:8443/`.
    ///
    /// A bare host gets `https://` and the configured port. A host given
    /// as a full URL keeps its scheme, and its own port when it has one.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let host = self.host.trim().trim_end_matches('/');
        let invalid = |e: &dyn std::fmt::Display| CoreError::Config {
            message: format!("invalid controller address {host:?}: {e}"),
        };

        if host.contains("://") {
            let mut url = Url::parse(host).map_err(|e| invalid(&e))?;
            // `Url::port` hides a port equal to the scheme default.
            if !has_explicit_port(host) {
                url.set_port(Some(self.port))
                    .map_err(|()| invalid(&"cannot carry a port"))?;
            }
            return Ok(url);
        }

        Url::parse(&format!("https://{host}:{}/", self.port)).map_err(|e| invalid(&e))
    }

    /// Build a [`TransportConfig`] from the connection settings.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from_verify(self.verify_tls),
            timeout: self.timeout,
            cookie_jar: None, // LegacyClient::new adds one automatically
        }
    }
}

/// Whether the authority of `raw` (a `scheme://...` address) names a port.
fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    host_port.rsplit_once(':').is_some_and(|(host, port)| {
        !port.is_empty()
            && port.chars().all(|c| c.is_ascii_digit())
            && (!host.starts_with('[') || host.ends_with(']'))
    })
}

fn config_error(message: &str) -> CoreError {
    CoreError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> ControllerConfig {
        ControllerConfig {
            host: "192.168.1.1".into(),
            username: "admin".into(),
            password: SecretString::from("hunter22".to_string()),
            ..ControllerConfig::default()
        }
    }

    #[test]
    fn default_site_and_port() {
        let cfg = ControllerConfig::default();
        assert_eq!(cfg.site, "default");
        assert_eq!(cfg.port, 8443);
        assert!(!cfg.verify_tls);
    }

    #[test]
    fn valid_config_passes() {
        valid().validate().unwrap();
    }

    #[test]
    fn base_url_keeps_explicit_scheme_and_port() {
        let cfg = ControllerConfig {
            host: "https://unifi.local/".into(),
            port: 443,
            ..valid()
        };
        // Default port for the scheme is elided by the url crate.
        assert_eq!(cfg.base_url().unwrap().as_str(), "https://unifi.local/");

        assert_eq!(
            valid().base_url().unwrap().as_str(),
            "https://192.168.1.1:8443/"
        );

        let cfg = ControllerConfig {
            host: "http://127.0.0.1:9000".into(),
            ..valid()
        };
        assert_eq!(cfg.base_url().unwrap().as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn base_url_keeps_explicit_default_port() {
        let cfg = ControllerConfig {
            host: "https://controller:443".into(),
            port: 8443,
            ..valid()
        };
        assert_eq!(cfg.base_url().unwrap().as_str(), "https://controller/");

        let cfg = ControllerConfig {
            host: "https://[fd00::1]".into(),
            port: 8443,
            ..valid()
        };
        assert_eq!(cfg.base_url().unwrap().as_str(), "https://[fd00::1]:8443/");

        assert!(has_explicit_port("http://user@[fd00::1]:80/path"));
        assert!(!has_explicit_port("https://controller/a:1"));
    }

    #[test]
    fn rejects_empty_password() {
        let cfg = ControllerConfig {
            password: SecretString::from(String::new()),
            ..valid()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn rejects_empty_host_and_port_zero() {
        let cfg = ControllerConfig {
            host: " ".into(),
            ..valid()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));

        let cfg = ControllerConfig { port: 0, ..valid() };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn rejects_non_numeric_token() {
        let cfg = ControllerConfig {
            two_factor_token: Some("12ab56".into()),
            ..valid()
        };
        assert!(cfg.validate().is_err());

        let cfg = ControllerConfig {
            two_factor_token: Some("123456".into()),
            ..valid()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn liveness_interval_must_exceed_timeout() {
        let cfg = ControllerConfig {
            timeout: Duration::from_secs(10),
            liveness_interval: Duration::from_secs(10),
            ..valid()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("liveness interval"));
    }

    #[test]
    fn transport_follows_verify_flag() {
        assert_eq!(valid().transport().tls, TlsMode::DangerAcceptInvalid);
        let cfg = ControllerConfig {
            verify_tls: true,
            ..valid()
        };
        assert_eq!(cfg.transport().tls, TlsMode::System);
    }
}
