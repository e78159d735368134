// ── Controller abstraction ──
//
// Lifecycle owner for the adapter: session manager, command queue, option
// cache, published action definitions and background tasks. Every user
// action runs through the queue; failures are logged and reflected in the
// connection status, never raised to the host.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::actions::{self, Action, ActionDefinition};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::liveness::liveness_task;
use crate::model::{ConnectionStatus, OptionLists};
use crate::mutators;
use crate::options;
use crate::queue::{CommandQueue, CompletionHandle};
use crate::session::{LoginOutcome, Session, SessionManager, SessionState};

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for the host.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    sessions: Arc<SessionManager>,
    queue: CommandQueue,
    options: watch::Sender<Arc<OptionLists>>,
    definitions: watch::Sender<Arc<Vec<ActionDefinition>>>,
    cancel: CancellationToken,
    /// Child token for the current connection -- cancelled on reconnect
    /// and teardown, replaced on connect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Create an unconfigured controller and start its command queue.
    /// Call [`connect()`](Self::connect) to configure and log in.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let (queue, runner) = CommandQueue::spawn(cancel.clone());
        let empty = OptionLists::default();
        let (definitions, _) = watch::channel(Arc::new(actions::definitions(&empty)));
        let (options, _) = watch::channel(Arc::new(empty));

        Self {
            inner: Arc::new(ControllerInner {
                sessions: Arc::new(SessionManager::new()),
                queue,
                options,
                definitions,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(vec![runner]),
            }),
        }
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Apply a (new) configuration.
    ///
    /// Tears down any existing session, installs a fresh unauthenticated
    /// one, restarts the liveness monitor and starts a login in the
    /// background. Only an invalid configuration is reported as an error.
    pub async fn connect(&self, config: ControllerConfig) -> Result<(), CoreError> {
        self.install(config).await?;

        let ctrl = self.clone();
        tokio::spawn(async move {
            // Outcome is logged and published as status by the session manager.
            let _ = ctrl.login().await;
        });

        Ok(())
    }

    /// Like [`connect()`](Self::connect), but log in before returning and
    /// report the login error. Used by one-shot callers.
    pub async fn connect_and_login(
        &self,
        config: ControllerConfig,
    ) -> Result<LoginOutcome, CoreError> {
        self.install(config).await?;
        self.login().await
    }

    async fn install(&self, config: ControllerConfig) -> Result<(), CoreError> {
        if let Err(e) = config.validate() {
            error!(error = %e, "invalid configuration");
            self.inner.sessions.teardown().await;
            self.inner.sessions.mark_unconfigured();
            return Err(e);
        }

        // Fresh child token for this connection.
        let child = {
            let mut guard = self.inner.cancel_child.lock().await;
            guard.cancel();
            *guard = self.inner.cancel.child_token();
            guard.clone()
        };

        let period = config.liveness_interval;
        self.inner.sessions.install(config).await;

        let handle = tokio::spawn(liveness_task(
            Arc::clone(&self.inner.sessions),
            period,
            child,
        ));
        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        Ok(())
    }

    /// Log in on the current session, then refresh the option lists.
    ///
    /// Concurrent calls collapse into one network login.
    pub async fn login(&self) -> Result<LoginOutcome, CoreError> {
        let outcome = self.inner.sessions.login().await?;
        if outcome == LoginOutcome::Authenticated {
            if let Err(e) = self.refresh_options().await {
                warn!(error = %e, "option refresh after login failed");
            }
        }
        Ok(outcome)
    }

    /// Probe the session once, outside the liveness timer.
    pub async fn check_liveness(&self) -> Result<(), CoreError> {
        self.inner.sessions.check_liveness().await
    }

    /// Stop background tasks, log out and release the session.
    ///
    /// The command queue stops too: commands still waiting, and any
    /// enqueued afterwards, resolve to [`CoreError::ControllerShutdown`].
    pub async fn teardown(&self) {
        self.inner.cancel.cancel();

        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        self.inner.sessions.teardown().await;
        debug!("controller torn down");
    }

    // ── Actions ──────────────────────────────────────────────────

    /// Queue an action and wait for it to finish. Never fails: the outcome
    /// has already been logged and reflected in the status.
    pub async fn trigger(&self, action: Action) {
        let _ = self.enqueue(action).wait().await;
    }

    /// Queue an action and return its (already logged) outcome.
    pub async fn execute(&self, action: Action) -> Result<(), CoreError> {
        self.enqueue(action).wait().await
    }

    /// Queue an action without waiting.
    pub fn enqueue(&self, action: Action) -> CompletionHandle {
        let ctrl = self.clone();
        self.inner
            .queue
            .enqueue(async move { ctrl.run_action(&action).await })
    }

    async fn run_action(&self, action: &Action) -> Result<(), CoreError> {
        let (session, client) = match self.inner.sessions.require_client() {
            Ok(pair) => pair,
            Err(e) => {
                warn!(%action, error = %e, "cannot {action}: {e}");
                return Err(e);
            }
        };

        debug!(%action, "running action");
        let result = match action {
            Action::PowerCycle { mac, port } => {
                mutators::power_cycle_port(&client, mac, *port).await
            }
            Action::PoeMode { mac, port, mode } => {
                mutators::set_port_poe_mode(&client, mac, *port, *mode).await
            }
            Action::ProfilePoeMode { profile, mode } => {
                mutators::set_profile_poe_mode(&client, profile, *mode).await
            }
            Action::Wifi { network, update } => {
                mutators::update_wifi_network(&client, network, update).await
            }
        };

        match result {
            Ok(()) => {
                info!(%action, "action completed");
                self.inner.sessions.mark_ok(&session);
                if action.changes_options() {
                    if let Err(e) = self.refresh_options().await {
                        warn!(error = %e, "option refresh after {action} failed");
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.report_failure(&session, action, &e);
                Err(e)
            }
        }
    }

    /// Log a failed action and apply its effect on the connection status.
    fn report_failure(&self, session: &Session, action: &Action, err: &CoreError) {
        let message = err.operator_message(&action.failure_context(&session.config().site));
        if err.is_session_rejected() {
            error!(%action, error = %err, "ERROR for {action}: {message}");
            self.inner.sessions.mark_session_rejected(session);
        } else if err.is_transport() {
            error!(%action, error = %err, "ERROR for {action}: {message}");
            self.inner.sessions.mark_connection_failure(session);
        } else {
            warn!(%action, error = %err, "ERROR for {action}: {message}");
        }
    }

    // ── Option cache ─────────────────────────────────────────────

    /// Re-fetch switches, profiles and networks and republish the action
    /// definitions. Lists whose fetch fails keep their previous value.
    pub async fn refresh_options(&self) -> Result<(), CoreError> {
        let (_, client) = self.inner.sessions.require_client()?;

        let previous = self.inner.options.borrow().clone();
        let lists = options::refresh(&client, &previous).await;

        self.inner
            .definitions
            .send_replace(Arc::new(actions::definitions(&lists)));
        self.inner.options.send_replace(Arc::new(lists));
        Ok(())
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to the cached option lists.
    pub fn options(&self) -> watch::Receiver<Arc<OptionLists>> {
        self.inner.options.subscribe()
    }

    /// Subscribe to the action definitions.
    pub fn action_definitions(&self) -> watch::Receiver<Arc<Vec<ActionDefinition>>> {
        self.inner.definitions.subscribe()
    }

    /// Subscribe to connection status changes.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.sessions.status()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.sessions.is_authenticated()
    }

    /// Login state of the current session, if one is configured.
    pub fn session_state(&self) -> Option<SessionState> {
        self.inner.sessions.current().map(|s| s.state())
    }

    /// Site of the current session, if one is configured.
    pub fn site(&self) -> Option<String> {
        self.inner
            .sessions
            .current()
            .map(|s| s.config().site.clone())
    }
}
