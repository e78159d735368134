//! `serve`: long-running host mode.
//!
//! Reads one request per stdin line and writes one JSON event per stdout
//! line. A request is either an action invocation,
//! `{"action": "POEMode", "options": {"mac": "...", "port": 4, "mode": "off"}}`,
//! or a host command, given as `{"command": "reconnect"}` or the bare word.
//! Logs go to stderr.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info};

use unideck_core::{
    Action, ActionDefinition, ActionKind, ConnectionStatus, Controller, OptionLists,
};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    Action {
        action: String,
        #[serde(default)]
        options: Value,
    },
    Command {
        command: HostCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostCommand {
    /// Re-read the config and replace the session.
    Reconnect,
    Login,
    /// Re-fetch the option lists.
    Refresh,
    Status,
    Options,
    Actions,
    Quit,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum Event<'a> {
    Status {
        status: ConnectionStatus,
        at: DateTime<Utc>,
    },
    Actions {
        actions: &'a [ActionDefinition],
    },
    Options {
        options: &'a OptionLists,
    },
    Result {
        action: ActionKind,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

pub fn parse_request(line: &str) -> Result<Request, CliError> {
    let line = line.trim();
    if line.starts_with('{') {
        return Ok(serde_json::from_str(line)?);
    }
    let command = serde_json::from_value(Value::String(line.to_owned())).map_err(|_| {
        CliError::Validation {
            field: "request".into(),
            reason: format!("unknown command {line:?}"),
        }
    })?;
    Ok(Request::Command { command })
}

fn emit(event: &Event<'_>) {
    let Ok(line) = serde_json::to_string(event) else {
        return;
    };
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{line}");
    let _ = stdout.flush();
}

fn emit_error(err: &impl std::fmt::Display) {
    emit(&Event::Error {
        message: err.to_string(),
    });
}

// ── Pending results ──────────────────────────────────────────────────

/// Tasks waiting on queued actions to emit their `result` events.
/// Finished tasks are reaped while the loop runs.
#[derive(Default)]
struct PendingResults {
    tasks: JoinSet<()>,
}

impl PendingResults {
    fn track(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        self.tasks.spawn(task);
    }

    /// Wait for the next task to finish. Never resolves while none are pending.
    async fn reap_one(&mut self) {
        match self.tasks.join_next().await {
            Some(Err(e)) => debug!(error = %e, "result task failed"),
            Some(Ok(())) => {}
            None => std::future::pending().await,
        }
    }

    async fn drain(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }
}

// ── Loop ─────────────────────────────────────────────────────────────

pub async fn run(global: &GlobalOpts) -> Result<(), CliError> {
    let controller = Controller::new();
    let mut status = controller.status();
    let mut actions = controller.action_definitions();
    let mut results = PendingResults::default();

    emit(&Event::Actions {
        actions: &actions.borrow_and_update(),
    });
    reconnect(&controller, global).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_request(&line) {
                    Ok(Request::Action { action, options }) => {
                        invoke(&controller, &action, &options, &mut results);
                    }
                    Ok(Request::Command { command: HostCommand::Quit }) => break,
                    Ok(Request::Command { command }) => {
                        host_command(&controller, command, global).await;
                    }
                    Err(e) => emit_error(&e),
                }
            }
            Ok(()) = status.changed() => {
                let current = *status.borrow_and_update();
                emit(&Event::Status { status: current, at: Utc::now() });
            }
            Ok(()) = actions.changed() => {
                let defs = Arc::clone(&actions.borrow_and_update());
                emit(&Event::Actions { actions: &defs });
            }
            () = results.reap_one() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // Let queued actions finish before the session goes away.
    results.drain().await;
    controller.teardown().await;
    info!("serve stopped");
    Ok(())
}

fn invoke(controller: &Controller, id: &str, options: &Value, results: &mut PendingResults) {
    let action = match Action::from_invocation(id, options) {
        Ok(action) => action,
        Err(e) => {
            emit_error(&e);
            return;
        }
    };

    debug!(%action, pending = results.len(), "queueing action");
    let kind = action.kind();
    let handle = controller.enqueue(action);
    results.track(async move {
        let outcome = handle.wait().await;
        emit(&Event::Result {
            action: kind,
            ok: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
        });
    });
}

async fn host_command(controller: &Controller, command: HostCommand, global: &GlobalOpts) {
    match command {
        HostCommand::Reconnect => reconnect(controller, global).await,
        HostCommand::Login => {
            if let Err(e) = controller.login().await {
                emit_error(&e);
            }
        }
        HostCommand::Refresh => {
            if let Err(e) = controller.refresh_options().await {
                emit_error(&e);
            }
        }
        HostCommand::Status => emit(&Event::Status {
            status: *controller.status().borrow(),
            at: Utc::now(),
        }),
        HostCommand::Options => {
            let lists = controller.options().borrow().clone();
            emit(&Event::Options { options: &lists });
        }
        HostCommand::Actions => {
            let defs = controller.action_definitions().borrow().clone();
            emit(&Event::Actions { actions: &defs });
        }
        HostCommand::Quit => {}
    }
}

/// Re-read the config and log in with it. Failures are reported as events;
/// the loop keeps running so the host can fix the config and retry.
async fn reconnect(controller: &Controller, global: &GlobalOpts) {
    let cfg = match config::controller_config(global) {
        Ok(cfg) => cfg,
        Err(e) => {
            emit_error(&e);
            return;
        }
    };
    if let Err(e) = controller.connect_and_login(cfg).await {
        emit_error(&e);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[test]
    fn parses_action_invocation() {
        let req = parse_request(
            r#"{"action":"POEMode","options":{"mac":"aa:bb:cc:dd:ee:ff","port":4,"mode":"off"}}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::Action {
                action: "POEMode".into(),
                options: json!({ "mac": "aa:bb:cc:dd:ee:ff", "port": 4, "mode": "off" }),
            }
        );
    }

    #[test]
    fn parses_commands_in_both_spellings() {
        assert_eq!(
            parse_request("reconnect").unwrap(),
            Request::Command {
                command: HostCommand::Reconnect
            }
        );
        assert_eq!(
            parse_request(r#"{"command":"quit"}"#).unwrap(),
            Request::Command {
                command: HostCommand::Quit
            }
        );
    }

    #[test]
    fn rejects_unknown_words() {
        assert!(matches!(
            parse_request("explode"),
            Err(CliError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn finished_results_are_reaped() {
        let mut results = PendingResults::default();
        results.track(async {});
        results.track(async {});
        assert_eq!(results.len(), 2);

        for _ in 0..2 {
            tokio::time::timeout(Duration::from_secs(1), results.reap_one())
                .await
                .unwrap();
        }
        assert_eq!(results.len(), 0);

        // Nothing left: waiting must not complete.
        let idle = tokio::time::timeout(Duration::from_millis(50), results.reap_one()).await;
        assert!(idle.is_err());
    }

    #[test]
    fn result_event_shape() {
        let line = serde_json::to_value(Event::Result {
            action: ActionKind::WifiNetwork,
            ok: false,
            error: Some("WiFi network not found: Lab".into()),
        })
        .unwrap();
        assert_eq!(
            line,
            json!({
                "event": "result",
                "action": "WifiNetwork",
                "ok": false,
                "error": "WiFi network not found: Lab"
            })
        );
    }
}
