//! Sequential polling driven by a cancellation token.
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Decides how long to wait between ticks.
pub trait PollCadence: Send + 'static {
    /// Delay before the next tick; `completed` counts the ticks run so far.
    fn next_delay(&mut self, completed: u32) -> Duration;
}

/// Same delay after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCadence {
    interval: Duration,
}

impl FixedCadence {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl PollCadence for FixedCadence {
    fn next_delay(&mut self, _completed: u32) -> Duration {
        self.interval
    }
}

/// Ownership token for a running poll loop.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the loop. Idempotent; a tick already running finishes, but no
    /// further tick starts.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

pub struct PollScheduler;

impl PollScheduler {
    /// Runs `tick` right away, then again after each cadence delay, until
    /// `token` is cancelled. Each tick is awaited before the next delay
    /// starts, so ticks of one handle never overlap.
    pub fn start<C, F, Fut>(cadence: C, token: CancellationToken, mut tick: F) -> PollHandle
    where
        C: PollCadence,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let loop_token = token.clone();
        let task = tokio::spawn(async move {
            let mut cadence = cadence;
            let mut completed: u32 = 0;
            loop {
                if loop_token.is_cancelled() {
                    break;
                }
                tick().await;
                completed = completed.saturating_add(1);
                let delay = cadence.next_delay(completed);
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        });
        PollHandle { token, task }
    }
}
