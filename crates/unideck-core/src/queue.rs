// ── Command queue ──
//
// Strictly ordered, concurrency-1 executor for mutating work. Each queued
// command runs to completion (success or failure) before the next one
// starts. Failed commands are not retried.

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;

type Outcome = Result<(), CoreError>;

struct QueuedCommand {
    job: BoxFuture<'static, Outcome>,
    done: oneshot::Sender<Outcome>,
}

/// Submission side of the queue. Cheap to clone.
#[derive(Clone)]
pub struct CommandQueue {
    tx: mpsc::UnboundedSender<QueuedCommand>,
}

/// Resolves once the queued command has run.
///
/// Dropping the handle does not cancel the command.
#[must_use = "the command runs either way; await the handle to observe its outcome"]
pub struct CompletionHandle {
    rx: oneshot::Receiver<Outcome>,
}

impl CompletionHandle {
    /// Wait for the command's outcome. Commands dropped by a shutdown
    /// resolve to [`CoreError::ControllerShutdown`].
    pub async fn wait(self) -> Outcome {
        self.rx.await.unwrap_or(Err(CoreError::ControllerShutdown))
    }
}

impl CommandQueue {
    /// Create the queue and spawn its runner. The runner stops when
    /// `cancel` fires; commands still waiting at that point are dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(cancel: CancellationToken) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(runner_task(rx, cancel));
        (Self { tx }, handle)
    }

    /// Append a command. It starts after every previously enqueued command
    /// has finished.
    pub fn enqueue<F>(&self, job: F) -> CompletionHandle
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let (done, rx) = oneshot::channel();
        let cmd = QueuedCommand {
            job: Box::pin(job),
            done,
        };
        // A closed channel drops `cmd` and with it `done`, so the handle
        // reports a shutdown.
        if self.tx.send(cmd).is_err() {
            debug!("command queue closed, dropping command");
        }
        CompletionHandle { rx }
    }
}

async fn runner_task(mut rx: mpsc::UnboundedReceiver<QueuedCommand>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                let outcome = cmd.job.await;
                let _ = cmd.done.send(outcome);
            }
        }
    }
    debug!("command queue stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn runs_in_submission_order_without_overlap() {
        let (queue, _runner) = CommandQueue::spawn(CancellationToken::new());
        let log: Arc<Mutex<Vec<(usize, Instant, Instant)>>> = Arc::default();

        // Earlier jobs sleep longer, so any concurrency would reorder them.
        let handles: Vec<_> = (0..5)
            .map(|i| {
                let log = Arc::clone(&log);
                queue.enqueue(async move {
                    let start = Instant::now();
                    tokio::time::sleep(Duration::from_millis(50 * (5 - i as u64))).await;
                    log.lock().unwrap().push((i, start, Instant::now()));
                    Ok(())
                })
            })
            .collect();

        for h in handles {
            h.wait().await.unwrap();
        }

        let log = log.lock().unwrap();
        let order: Vec<usize> = log.iter().map(|(i, _, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        for pair in log.windows(2) {
            assert!(pair[0].2 <= pair[1].1, "jobs overlapped: {pair:?}");
        }
    }

    #[tokio::test]
    async fn failure_does_not_block_next_command() {
        let (queue, _runner) = CommandQueue::spawn(CancellationToken::new());

        let first = queue.enqueue(async { Err(CoreError::NotAuthenticated) });
        let second = queue.enqueue(async { Ok(()) });

        assert!(matches!(first.wait().await, Err(CoreError::NotAuthenticated)));
        second.wait().await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_queue_reports_shutdown() {
        let cancel = CancellationToken::new();
        let (queue, runner) = CommandQueue::spawn(cancel.clone());
        cancel.cancel();
        runner.await.unwrap();

        let handle = queue.enqueue(async { Ok(()) });
        assert!(matches!(
            handle.wait().await,
            Err(CoreError::ControllerShutdown)
        ));
    }
}
