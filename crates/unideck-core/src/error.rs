// ── Core error types ──
//
// Operator-facing errors from unideck-core. Consumers never see HTTP status
// codes or JSON parse failures directly: `From<unideck_api::Error>` folds
// transport-layer errors into the taxonomy below.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local preconditions ──────────────────────────────────────────
    #[error("Not initialised: no controller session has been configured")]
    NotInitialized,

    #[error("Not logged in")]
    NotAuthenticated,

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Device not found: {mac}")]
    DeviceNotFound { mac: String },

    #[error("Port profile not found: {name}")]
    ProfileNotFound { name: String },

    #[error("WiFi network not found: {name}")]
    NetworkNotFound { name: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Controller connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Operation rejected by controller: {message}")]
    Rejected {
        /// The controller's error code, e.g. `api.err.UnknownDevice`.
        code: Option<String>,
        message: String,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Invalid response from controller: {message}")]
    InvalidResponse { message: String },

    // ── Local plumbing ───────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Controller shut down before the command ran")]
    ControllerShutdown,
}

impl CoreError {
    /// The controller could not be reached (refused, unreachable, timed out).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }

    /// The controller no longer accepts the session cookie.
    pub fn is_session_rejected(&self) -> bool {
        match self {
            Self::AuthenticationFailed { .. } => true,
            Self::Rejected { code, .. } => code.as_deref() == Some("api.err.LoginRequired"),
            _ => false,
        }
    }

    /// The controller's `api.err.*` code, if there is one.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// One log line for an operator, phrased after the controller's error
    /// codes where one is known.
    pub fn operator_message(&self, ctx: &FailureContext<'_>) -> String {
        match self.api_code() {
            Some("api.err.Invalid") => return "username or password invalid".into(),
            Some("api.err.LoginRequired") => return "failed to login".into(),
            Some("api.err.NoSiteContext") => {
                return format!("site \"{}\" does not exist", ctx.site);
            }
            Some("api.err.UnknownDevice") => {
                return format!("device \"{}\" does not exist", ctx.mac.unwrap_or("?"));
            }
            Some("api.err.InvalidPayload" | "api.err.InvalidTargetPort") => {
                let port = ctx.port.map_or_else(|| "?".to_owned(), |p| p.to_string());
                return format!(
                    "port \"{port}\" does not exist or POE is not currently active on it"
                );
            }
            _ => {}
        }
        match self {
            Self::Timeout { .. } => "host timed out".into(),
            Self::ConnectionFailed { .. } => "host not found".into(),
            other => other.to_string(),
        }
    }
}

/// What an operation was aimed at, for [`CoreError::operator_message`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureContext<'a> {
    pub site: &'a str,
    pub mac: Option<&'a str>,
    pub port: Option<u32>,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unideck_api::Error> for CoreError {
    fn from(err: unideck_api::Error) -> Self {
        let code = err.api_error_code().map(str::to_owned);
        match err {
            unideck_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unideck_api::Error::TwoFactorRequired => CoreError::AuthenticationFailed {
                message: "Two-factor authentication token required".into(),
            },
            unideck_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            // The client reports timeouts as `Error::Timeout`, with the
            // configured limit.
            unideck_api::Error::Transport(e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            unideck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unideck_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            unideck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unideck_api::Error::LegacyApi { message } => CoreError::Rejected { code, message },
            unideck_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rejected(code: &str) -> CoreError {
        CoreError::from(unideck_api::Error::LegacyApi {
            message: code.into(),
        })
    }

    #[test]
    fn legacy_api_code_is_kept() {
        let err = rejected("api.err.UnknownDevice");
        assert_eq!(err.api_code(), Some("api.err.UnknownDevice"));

        let err = rejected("HTTP 500: boom");
        assert_eq!(err.api_code(), None);
    }

    #[test]
    fn session_rejection_classification() {
        assert!(rejected("api.err.LoginRequired").is_session_rejected());
        assert!(CoreError::from(unideck_api::Error::SessionExpired).is_session_rejected());
        assert!(!rejected("api.err.InvalidPayload").is_session_rejected());
        assert!(!CoreError::NotAuthenticated.is_session_rejected());
    }

    #[test]
    fn transport_classification() {
        assert!(CoreError::from(unideck_api::Error::Timeout { timeout_secs: 10 }).is_transport());
        assert!(!CoreError::ValidationFailed {
            message: "x".into()
        }
        .is_transport());
    }

    #[test]
    fn timeout_reports_configured_limit() {
        let err = CoreError::from(unideck_api::Error::Timeout { timeout_secs: 2 });
        assert_eq!(err.to_string(), "Controller connection timed out after 2s");
    }

    #[test]
    fn operator_messages_follow_error_codes() {
        let ctx = FailureContext {
            site: "branch",
            mac: Some("aa:bb:cc:dd:ee:ff"),
            port: Some(7),
        };
        assert_eq!(
            rejected("api.err.Invalid").operator_message(&ctx),
            "username or password invalid"
        );
        assert_eq!(
            rejected("api.err.LoginRequired").operator_message(&ctx),
            "failed to login"
        );
        assert_eq!(
            rejected("api.err.NoSiteContext").operator_message(&ctx),
            "site \"branch\" does not exist"
        );
        assert_eq!(
            rejected("api.err.UnknownDevice").operator_message(&ctx),
            "device \"aa:bb:cc:dd:ee:ff\" does not exist"
        );
        assert_eq!(
            rejected("api.err.InvalidTargetPort").operator_message(&ctx),
            "port \"7\" does not exist or POE is not currently active on it"
        );
        assert_eq!(
            CoreError::Timeout { timeout_secs: 10 }.operator_message(&ctx),
            "host timed out"
        );
    }

    #[test]
    fn unknown_errors_fall_back_to_display() {
        let err = CoreError::ProfileNotFound {
            name: "Security-Profile".into(),
        };
        assert_eq!(
            err.operator_message(&FailureContext::default()),
            "Port profile not found: Security-Profile"
        );
    }
}
