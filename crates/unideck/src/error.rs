//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use unideck_config::ConfigError;
use unideck_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}: {reason}")]
    #[diagnostic(
        code(unideck::connection_failed),
        help(
            "Check that the controller is running and reachable, and that the\n\
             host and port in your config are right.\n\
             Run: unideck config show"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(unideck::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unideck::auth_failed),
        help(
            "Verify the username and password, and the 2FA token if the account uses one.\n\
             Run: unideck config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for '{account}'")]
    #[diagnostic(
        code(unideck::no_credentials),
        help(
            "Store one with: unideck config set-password\n\
             Or set the UNIDECK_PASSWORD environment variable."
        )
    )]
    NoCredentials { account: String },

    #[error("Not logged in to the controller")]
    #[diagnostic(code(unideck::not_logged_in))]
    NotLoggedIn,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(unideck::not_found),
        help("Run: unideck options {list} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list: String,
    },

    // ── Controller ───────────────────────────────────────────────────
    #[error("Controller rejected the request: {message}")]
    #[diagnostic(code(unideck::rejected))]
    Rejected {
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected response from controller: {message}")]
    #[diagnostic(code(unideck::invalid_response))]
    InvalidResponse { message: String },

    #[error("The controller session ended before the command ran")]
    #[diagnostic(code(unideck::shutdown))]
    Shutdown,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unideck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(unideck::config),
        help("Check the config file. Run: unideck config path")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(unideck::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(unideck::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::NotLoggedIn => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } | Self::InvalidResponse { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::NotInitialized | CoreError::NotAuthenticated => CliError::NotLoggedIn,

            CoreError::DeviceNotFound { mac } => CliError::NotFound {
                resource_type: "switch".into(),
                identifier: mac,
                list: "switches".into(),
            },

            CoreError::ProfileNotFound { name } => CliError::NotFound {
                resource_type: "port profile".into(),
                identifier: name,
                list: "profiles".into(),
            },

            CoreError::NetworkNotFound { name } => CliError::NotFound {
                resource_type: "WiFi network".into(),
                identifier: name,
                list: "networks".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Rejected { code, message } => CliError::Rejected { code, message },

            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },

            CoreError::ControllerShutdown => CliError::Shutdown,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { account } => CliError::NoCredentials { account },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let not_found = CliError::from(CoreError::ProfileNotFound {
            name: "Security-Profile".into(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let transport = CliError::from(CoreError::Timeout { timeout_secs: 10 });
        assert_eq!(transport.exit_code(), exit_code::TIMEOUT);

        let rejected = CliError::from(CoreError::Rejected {
            code: Some("api.err.InvalidTargetPort".into()),
            message: "api.err.InvalidTargetPort".into(),
        });
        assert_eq!(rejected.exit_code(), exit_code::REJECTED);

        let invalid = CliError::from(CoreError::ValidationFailed {
            message: "passphrase must be at least 8 characters".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn missing_password_is_an_auth_error() {
        let err = CliError::from(ConfigError::NoCredentials {
            account: "admin@192.168.1.1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
