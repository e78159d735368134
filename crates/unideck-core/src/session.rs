// ── Session manager ──
//
// Owns the one authenticated connection to the controller. A `Session` is
// built per configuration; replacing the configuration replaces the whole
// session, so results from a login started under the old configuration land
// on a session nobody reads any more and are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use arc_swap::ArcSwapOption;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use unideck_api::LegacyClient;

use crate::config::ControllerConfig;
use crate::error::{CoreError, FailureContext};
use crate::model::ConnectionStatus;

/// Where a session stands in its login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    LoggingIn,
    Authenticated,
    Failed,
}

/// What a call to [`SessionManager::login`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    /// Another login for this session was already running.
    AlreadyInFlight,
    /// The configuration changed while the login ran; its result was dropped.
    Superseded,
}

/// One configured connection: settings, HTTP client, login state.
pub struct Session {
    config: ControllerConfig,
    generation: u64,
    client: ArcSwapOption<LegacyClient>,
    state: RwLock<SessionState>,
    login_gate: Mutex<()>,
}

impl Session {
    fn new(config: ControllerConfig, generation: u64) -> Self {
        Self {
            config,
            generation,
            client: ArcSwapOption::empty(),
            state: RwLock::new(SessionState::Idle),
            login_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn failure_context(&self) -> FailureContext<'_> {
        FailureContext {
            site: &self.config.site,
            ..FailureContext::default()
        }
    }

    /// Detect the platform, build a fresh client and log in with it.
    async fn establish(&self) -> Result<Arc<LegacyClient>, CoreError> {
        let base_url = self.config.base_url()?;
        let transport = self.config.transport();

        let platform = LegacyClient::detect_platform(&base_url, &transport).await?;
        debug!(?platform, "detected controller platform");

        let client = LegacyClient::new(base_url, self.config.site.clone(), platform, &transport)?;
        client
            .login(
                &self.config.username,
                &self.config.password,
                self.config.two_factor_token.as_deref(),
            )
            .await?;
        Ok(Arc::new(client))
    }

    /// Best-effort logout. Errors are logged and swallowed.
    async fn close(&self) {
        self.set_state(SessionState::Idle);
        if let Some(client) = self.client.swap(None) {
            if let Err(e) = client.logout().await {
                debug!(error = %e, "logout failed (non-fatal)");
            }
        }
    }
}

/// Owner of the current [`Session`] and the status the host observes.
pub struct SessionManager {
    current: ArcSwapOption<Session>,
    generation: AtomicU64,
    status: watch::Sender<ConnectionStatus>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            current: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
            status,
        }
    }

    /// Subscribe to connection status changes.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some_and(|s| s.is_authenticated())
    }

    fn is_current(&self, session: &Session) -> bool {
        self.current
            .load()
            .as_ref()
            .is_some_and(|s| s.generation == session.generation)
    }

    /// Publish a status, unless `session` has since been replaced.
    fn publish(&self, session: &Session, status: ConnectionStatus) {
        if self.is_current(session) {
            self.status.send_replace(status);
        }
    }

    /// Replace the current session with one built from `config`.
    ///
    /// The previous session, if any, is logged out first (best-effort).
    /// The new session starts unauthenticated; call [`login`](Self::login).
    pub async fn install(&self, config: ControllerConfig) -> Arc<Session> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Arc::new(Session::new(config, generation));

        if let Some(previous) = self.current.swap(Some(Arc::clone(&session))) {
            previous.close().await;
        }

        self.status.send_replace(ConnectionStatus::Connecting);
        debug!(generation, "session installed");
        session
    }

    /// Log in on the current session.
    ///
    /// Does nothing when a login for this session is already running. The
    /// error is returned only for a failed login on the still-current
    /// session; status and state are updated either way.
    pub async fn login(&self) -> Result<LoginOutcome, CoreError> {
        let session = self.current().ok_or(CoreError::NotInitialized)?;

        let Ok(_gate) = session.login_gate.try_lock() else {
            debug!("login already in flight");
            return Ok(LoginOutcome::AlreadyInFlight);
        };

        session.set_state(SessionState::LoggingIn);
        self.publish(&session, ConnectionStatus::Connecting);
        info!(host = %session.config.host, site = %session.config.site, "logging in");

        let result = session.establish().await;

        if !self.is_current(&session) {
            debug!(generation = session.generation, "discarding result of superseded login");
            if let Ok(client) = result {
                if let Err(e) = client.logout().await {
                    debug!(error = %e, "logout of superseded session failed (non-fatal)");
                }
            }
            return Ok(LoginOutcome::Superseded);
        }

        match result {
            Ok(client) => {
                session.client.store(Some(client));
                session.set_state(SessionState::Authenticated);
                self.publish(&session, ConnectionStatus::Ok);
                info!("logged in to controller");
                Ok(LoginOutcome::Authenticated)
            }
            Err(e) => {
                session.set_state(SessionState::Failed);
                self.publish(&session, ConnectionStatus::ConnectionFailure);
                error!(
                    error = %e,
                    "login failed: {}",
                    e.operator_message(&session.failure_context())
                );
                Err(e)
            }
        }
    }

    /// Cheap authenticated probe. On failure the session is demoted to
    /// unauthenticated and the status goes to `disconnected`. There is no
    /// automatic re-login.
    pub async fn check_liveness(&self) -> Result<(), CoreError> {
        let (session, client) = self.require_client()?;

        match client.check_session().await {
            Ok(()) => {
                debug!("session still valid");
                self.mark_ok(&session);
                Ok(())
            }
            Err(e) => {
                let e = CoreError::from(e);
                if self.is_current(&session) {
                    session.set_state(SessionState::Idle);
                    self.publish(&session, ConnectionStatus::Disconnected);
                    error!(error = %e, "status check failed");
                }
                Err(e)
            }
        }
    }

    /// The current session and its client, if logged in.
    pub fn require_client(&self) -> Result<(Arc<Session>, Arc<LegacyClient>), CoreError> {
        let session = self.current().ok_or(CoreError::NotInitialized)?;
        if !session.is_authenticated() {
            return Err(CoreError::NotAuthenticated);
        }
        let client = session.client.load_full().ok_or(CoreError::NotAuthenticated)?;
        Ok((session, client))
    }

    /// A call on `session` succeeded: the controller is reachable again.
    pub fn mark_ok(&self, session: &Session) {
        if session.is_authenticated() && self.is_current(session) {
            self.status.send_if_modified(|status| {
                let changed = *status != ConnectionStatus::Ok;
                *status = ConnectionStatus::Ok;
                changed
            });
        }
    }

    /// The controller refused the session cookie.
    pub fn mark_session_rejected(&self, session: &Session) {
        if self.is_current(session) {
            session.set_state(SessionState::Idle);
            self.publish(session, ConnectionStatus::Disconnected);
            warn!("controller rejected the session, marked as logged out");
        }
    }

    /// The controller could not be reached.
    pub fn mark_connection_failure(&self, session: &Session) {
        self.publish(session, ConnectionStatus::ConnectionFailure);
    }

    /// No usable configuration: nothing to log in with.
    pub fn mark_unconfigured(&self) {
        if self.current().is_none() {
            self.status.send_replace(ConnectionStatus::ConnectionFailure);
        }
    }

    /// Log out and release the current session.
    pub async fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.current.swap(None) {
            previous.close().await;
            debug!("session released");
        }
        self.status.send_replace(ConnectionStatus::Disconnected);
    }
}
