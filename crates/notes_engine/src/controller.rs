use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use notes_core::{
    update, CycleId, Effect, FinalResults, JobId, Msg, SubmissionPayload, TrackingSession,
};
use notes_logging::{notes_debug, notes_info, notes_warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::aggregate::aggregate;
use crate::scheduler::{FixedCadence, PollHandle, PollScheduler};
use crate::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    /// Give up after this many non-terminal status observations.
    pub max_poll_attempts: Option<u32>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: None,
        }
    }
}

/// Submits jobs and tracks the latest one until it settles.
///
/// State lives in a single [`TrackingSession`] that only this controller
/// mutates; callers observe it through [`ProgressController::subscribe`].
/// A new [`submit`](ProgressController::submit) supersedes the previous
/// cycle: its poller is cancelled and its late responses are discarded.
#[derive(Clone)]
pub struct ProgressController {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    settings: TrackerSettings,
    session: watch::Sender<TrackingSession>,
    active: Mutex<ActiveCycle>,
}

/// Cancellation state of the newest cycle.
struct ActiveCycle {
    cycle: CycleId,
    token: CancellationToken,
    poll: Option<PollHandle>,
}

impl ProgressController {
    pub fn new(transport: Arc<dyn Transport>, settings: TrackerSettings) -> Self {
        let (session, _) = watch::channel(TrackingSession::new());
        Self {
            inner: Arc::new(Inner {
                transport,
                settings,
                session,
                active: Mutex::new(ActiveCycle {
                    cycle: 0,
                    token: CancellationToken::new(),
                    poll: None,
                }),
            }),
        }
    }

    /// Starts a new tracking cycle and returns once the job is created and
    /// polling runs, or the cycle has already failed.
    pub async fn submit(&self, payload: SubmissionPayload) -> CycleId {
        let (cycle, effects) = self.inner.dispatch(Msg::Submit {
            payload,
            max_poll_attempts: self.inner.settings.max_poll_attempts,
        });
        self.inner.execute(effects).await;
        cycle
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackingSession> {
        self.inner.session.subscribe()
    }

    pub fn snapshot(&self) -> TrackingSession {
        self.inner.session.borrow().clone()
    }

    /// Waits until the current session succeeds or fails.
    pub async fn wait_settled(&self) -> TrackingSession {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(TrackingSession::is_settled).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }
}

impl Inner {
    /// The single point of mutation: runs `update` under the watch lock and
    /// notifies observers when something changed.
    fn dispatch(&self, msg: Msg) -> (CycleId, Vec<Effect>) {
        let mut cycle = 0;
        let mut effects = Vec::new();
        self.session.send_if_modified(|session| {
            let current = std::mem::take(session);
            let (mut next, produced) = update(current, msg);
            cycle = next.cycle();
            effects = produced;
            let changed = next.consume_dirty();
            *session = next;
            changed
        });
        (cycle, effects)
    }

    async fn execute(self: &Arc<Self>, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::CancelPrevious { cycle } => self.begin_cycle(cycle),
                Effect::CreateJob { cycle, payload } => {
                    let msg = match self.transport.create_job(&payload).await {
                        Ok(created) => Msg::JobCreated {
                            cycle,
                            job_id: created.job_id,
                            status: created.status,
                            submitted_at: Utc::now(),
                        },
                        Err(err) => Msg::SubmitFailed {
                            cycle,
                            http_status: err.http_status(),
                            message: err.message,
                            details: err.details,
                        },
                    };
                    let (_, next) = self.dispatch(msg);
                    queue.extend(next);
                }
                Effect::StartPolling { cycle, job_id } => self.start_polling(cycle, job_id),
                Effect::CancelPolling { cycle } => self.cancel_polling(cycle),
                Effect::FetchDependents {
                    cycle,
                    job_id,
                    final_results,
                } => self.resolve_dependents(cycle, job_id, final_results).await,
            }
        }
    }

    fn active(&self) -> MutexGuard<'_, ActiveCycle> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancels everything older than `cycle`. Out-of-order calls from an
    /// older submit are ignored.
    fn begin_cycle(&self, cycle: CycleId) {
        let mut active = self.active();
        if cycle <= active.cycle {
            return;
        }
        active.token.cancel();
        if let Some(poll) = active.poll.take() {
            poll.cancel();
        }
        *active = ActiveCycle {
            cycle,
            token: CancellationToken::new(),
            poll: None,
        };
    }

    fn start_polling(self: &Arc<Self>, cycle: CycleId, job_id: JobId) {
        let mut active = self.active();
        if active.cycle != cycle {
            notes_debug!("Not polling job {} of superseded cycle {}", job_id, cycle);
            return;
        }
        if let Some(previous) = active.poll.take() {
            previous.cancel();
        }
        notes_info!(
            "Polling job {} every {:?}",
            job_id,
            self.settings.poll_interval
        );
        // Weak so that dropping every controller handle ends the loop.
        let weak: Weak<Inner> = Arc::downgrade(self);
        let handle = PollScheduler::start(
            FixedCadence::new(self.settings.poll_interval),
            active.token.child_token(),
            move || {
                let weak = weak.clone();
                let job_id = job_id.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.poll_once(cycle, job_id).await;
                    }
                }
            },
        );
        active.poll = Some(handle);
    }

    fn cancel_polling(&self, cycle: CycleId) {
        let mut active = self.active();
        if active.cycle == cycle {
            if let Some(poll) = active.poll.take() {
                poll.cancel();
            }
        }
    }

    fn cycle_token(&self, cycle: CycleId) -> Option<CancellationToken> {
        let active = self.active();
        (active.cycle == cycle).then(|| active.token.clone())
    }

    async fn poll_once(&self, cycle: CycleId, job_id: JobId) {
        let msg = match self.transport.fetch_status(&job_id).await {
            Ok(report) => Msg::StatusReceived {
                cycle,
                job_id: job_id.clone(),
                status: report.status,
                final_results: report.final_results,
            },
            Err(err) => Msg::PollFailed {
                cycle,
                job_id: job_id.clone(),
                http_status: err.http_status(),
                message: err.to_string(),
            },
        };
        let (_, effects) = self.dispatch(msg);
        for effect in effects {
            match effect {
                Effect::CancelPolling { cycle } => self.cancel_polling(cycle),
                Effect::FetchDependents {
                    cycle,
                    job_id,
                    final_results,
                } => self.resolve_dependents(cycle, job_id, final_results).await,
                other => notes_warn!("Ignoring unexpected effect after poll: {:?}", other),
            }
        }
    }

    async fn resolve_dependents(&self, cycle: CycleId, job_id: JobId, final_results: FinalResults) {
        let Some(token) = self.cycle_token(cycle) else {
            return;
        };
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => {
                notes_debug!("Dropping result fetch for superseded job {}", job_id);
                return;
            }
            outcome = aggregate(self.transport.as_ref(), &job_id, &final_results) => outcome,
        };
        self.dispatch(Msg::DependentsResolved {
            cycle,
            job_id,
            outcome,
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        active.token.cancel();
    }
}
