// ── Liveness monitor ──
//
// Fixed-interval probe of the current session. Runs only while the session
// is authenticated; a failed probe demotes it (see
// `SessionManager::check_liveness`). Recovery is left to the next
// configuration change or an explicit login.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::session::SessionManager;

pub(crate) async fn liveness_task(
    sessions: Arc<SessionManager>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if sessions.is_authenticated() {
                    // Failures are logged and reflected in status by the manager.
                    let _ = sessions.check_liveness().await;
                }
            }
        }
    }
    debug!("liveness monitor stopped");
}
