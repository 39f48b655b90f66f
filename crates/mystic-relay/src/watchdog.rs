use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

/// Default idle bound for the primary provider stream.
pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Default idle bound for a client waiting on the relay's own SSE output.
pub const DEFAULT_CLIENT_IDLE_TIMEOUT: Duration = Duration::from_millis(60_000);

enum WatchdogCmd {
    Reset,
    Cancel,
}

/// Liveness timer for one relay instance.
///
/// Armed once, reset on every decoded upstream event (including empty
/// tokens), and inert after it either fires or is cancelled: late `reset` and
/// `cancel` calls are no-ops, and expiry is observable exactly once.
pub struct IdleWatchdog {
    cmd_tx: mpsc::UnboundedSender<WatchdogCmd>,
    expired_rx: oneshot::Receiver<()>,
}

impl IdleWatchdog {
    /// Arms the watchdog with the given idle bound.
    pub fn arm(timeout: Duration) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (expired_tx, expired_rx) = oneshot::channel();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        let _ = expired_tx.send(());
                        return;
                    }
                    cmd = cmd_rx.recv() => match cmd {
                        Some(WatchdogCmd::Reset) => {}
                        Some(WatchdogCmd::Cancel) | None => return,
                    },
                }
            }
        });
        Self { cmd_tx, expired_rx }
    }

    /// Restarts the idle countdown. No-op once fired or cancelled.
    pub fn reset(&self) {
        let _ = self.cmd_tx.send(WatchdogCmd::Reset);
    }

    /// Disarms the watchdog. No-op once fired or already cancelled.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(WatchdogCmd::Cancel);
    }

    /// Resolves when the watchdog's fate is decided: `true` if it fired,
    /// `false` if it was cancelled.
    ///
    /// Must not be polled again after it resolves.
    pub async fn expired(&mut self) -> bool {
        (&mut self.expired_rx).await.is_ok()
    }
}
