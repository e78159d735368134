use thiserror::Error;

/// Top-level error type for the `unideck-api` crate.
///
/// Covers every failure mode of the session API surface: authentication,
/// transport, envelope-level rejections and response parsing.
/// `unideck-core` maps these into its operator-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// 2FA token required but not provided.
    #[error("Two-factor authentication token required")]
    TwoFactorRequired,

    /// Session has expired (cookie expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.).
    /// Timeouts are reported as [`Error::Timeout`] instead.
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Legacy API ──────────────────────────────────────────────────
    /// Error from the session API (parsed from the `{meta: {rc, msg}}` envelope).
    ///
    /// `message` carries the controller's error code when it sent one,
    /// e.g. `api.err.UnknownDevice`.
    #[error("Legacy API error: {message}")]
    LegacyApi { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::SessionExpired => true,
            Self::LegacyApi { message } => message == "api.err.LoginRequired",
            _ => false,
        }
    }

    /// The controller's `api.err.*` code, if the envelope carried one.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::LegacyApi { message } if message.starts_with("api.err.") => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_required_counts_as_expired_session() {
        let err = Error::LegacyApi {
            message: "api.err.LoginRequired".into(),
        };
        assert!(err.is_auth_expired());
        assert_eq!(err.api_error_code(), Some("api.err.LoginRequired"));
    }

    #[test]
    fn free_form_messages_have_no_code() {
        let err = Error::LegacyApi {
            message: "HTTP 500 Internal Server Error: boom".into(),
        };
        assert!(!err.is_auth_expired());
        assert_eq!(err.api_error_code(), None);
    }
}
