// Session API authentication
//
// Cookie-based session login/logout, the "still logged in" probe, and
// controller platform detection. The login endpoint sets a session cookie
// in the client's jar; subsequent requests use that cookie automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::client::{LegacyClient, rejection_from_body};
use crate::transport::TransportConfig;

impl LegacyClient {
    /// Authenticate with the controller using username/password.
    ///
    /// On success the session cookie is stored in the client's cookie jar
    /// and used for all subsequent requests. The login endpoint differs
    /// by platform:
    /// - UniFi OS: `POST /api/auth/login`
    /// - Standalone: `POST /api/login`
    ///
    /// `token` is the second-factor code for accounts with 2FA enabled.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        token: Option<&str>,
    ) -> Result<(), Error> {
        let url = self.root_url(self.platform().login_path())?;

        debug!("logging in at {}", url);

        let mut body = json!({
            "username": username,
            "password": password.expose_secret(),
            "remember": true,
        });
        if let Some(token) = token {
            // UniFi OS and the standalone controller name the 2FA field differently.
            let field = match self.platform() {
                ControllerPlatform::UnifiOs => "token",
                ControllerPlatform::ClassicController => "ubic_2fa_token",
            };
            body[field] = json!(token);
        }

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if body.contains("Ubic2faTokenRequired") || body.contains("MFA_AUTH_REQUIRED") {
                return Err(Error::TwoFactorRequired);
            }
            let message = match rejection_from_body(status, &body) {
                Error::LegacyApi { message } => message,
                other => other.to_string(),
            };
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {message}"),
            });
        }

        // Capture CSRF token from login response; required for all
        // POST/PUT/DELETE requests through the UniFi OS proxy.
        if let Some(token) = resp
            .headers()
            .get("X-CSRF-Token")
            .or_else(|| resp.headers().get("x-csrf-token"))
            .and_then(|v| v.to_str().ok())
        {
            self.set_csrf_token(token.to_owned());
        }

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// Platform-specific logout endpoint:
    /// - UniFi OS: `POST /api/auth/logout`
    /// - Standalone: `POST /api/logout`
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.root_url(self.platform().logout_path())?;

        debug!("logging out at {}", url);

        let _resp = self
            .apply_csrf(self.http().post(url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.clear_csrf_token();
        debug!("logout complete");
        Ok(())
    }

    /// Check that the session cookie is still accepted.
    ///
    /// Issues the cheapest authenticated call the controller offers:
    /// - UniFi OS: `GET /api/users/self`
    /// - Standalone: `GET /api/self`
    pub async fn check_session(&self) -> Result<(), Error> {
        let url = self.root_url(self.platform().self_path())?;

        debug!("checking session at {}", url);

        let resp = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = rejection_from_body(status, &body);
            return Err(if err.is_auth_expired() {
                Error::SessionExpired
            } else {
                err
            });
        }
        Ok(())
    }

    /// Auto-detect the controller platform by probing login endpoints.
    ///
    /// Tries the UniFi OS endpoint first (`/api/auth/login`). If it
    /// responds with anything but 404, we're on UniFi OS. Otherwise falls
    /// back to standalone detection.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;

        // Probe UniFi OS endpoint
        let unifi_os_url = base_url
            .join(ControllerPlatform::UnifiOs.login_path())
            .map_err(Error::InvalidUrl)?;

        debug!("probing UniFi OS at {}", unifi_os_url);

        if let Ok(resp) = http.get(unifi_os_url).send().await {
            // UniFi OS returns a response (even 401/405) at this path.
            // Standalone controllers don't have this endpoint at all.
            if resp.status() != reqwest::StatusCode::NOT_FOUND {
                debug!("detected UniFi OS platform");
                return Ok(ControllerPlatform::UnifiOs);
            }
        }

        // Probe standalone endpoint
        let standalone_url = base_url
            .join(ControllerPlatform::ClassicController.login_path())
            .map_err(Error::InvalidUrl)?;

        debug!("probing standalone at {}", standalone_url);

        match http.get(standalone_url).send().await {
            Ok(_) => {
                debug!("detected standalone (classic) controller");
                Ok(ControllerPlatform::ClassicController)
            }
            Err(e) if e.is_timeout() => Err(Error::Timeout {
                timeout_secs: transport.timeout.as_secs(),
            }),
            Err(e) => Err(Error::Transport(e)),
        }
    }
}
