use std::fmt;

use chrono::{DateTime, Utc};

use crate::taxonomy::{classify, StatusKind};
use crate::{Failure, ResultBundle};

/// Opaque job identifier assigned by the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NoteId(pub String);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Generation counter of tracking cycles; bumped on every submit.
pub type CycleId = u64;

/// One submitted pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub job_id: JobId,
    pub submitted_at: DateTime<Utc>,
}

/// A point-in-time status observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    code: String,
}

impl StageStatus {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Recomputed from the code on every call.
    pub fn kind(&self) -> StatusKind {
        classify(&self.code)
    }
}

/// Where the session is in its lifecycle. Outcomes live in the terminal
/// variants, so a result and a failure can never coexist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    FetchingDependents,
    Succeeded(ResultBundle),
    Failed(Failure),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded(_) | Phase::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Submitting => "submitting",
            Phase::Polling => "polling",
            Phase::FetchingDependents => "fetching_dependents",
            Phase::Succeeded(_) => "succeeded",
            Phase::Failed(_) => "failed",
        }
    }
}

/// Mutable state of the job currently being tracked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingSession {
    cycle: CycleId,
    job: Option<Job>,
    latest_status: Option<StageStatus>,
    phase: Phase,
    poll_attempts: u32,
    max_poll_attempts: Option<u32>,
    dirty: bool,
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn latest_status(&self) -> Option<&StageStatus> {
        self.latest_status.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    pub fn result(&self) -> Option<&ResultBundle> {
        match &self.phase {
            Phase::Succeeded(bundle) => Some(bundle),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.phase {
            Phase::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_active_job(&self, cycle: CycleId, job_id: &JobId) -> bool {
        self.cycle == cycle && self.job.as_ref().is_some_and(|job| &job.job_id == job_id)
    }

    /// Full reset for a new cycle. The cycle counter keeps counting.
    pub(crate) fn begin_cycle(&mut self, max_poll_attempts: Option<u32>) -> CycleId {
        let next = self.cycle + 1;
        *self = Self {
            cycle: next,
            max_poll_attempts,
            phase: Phase::Submitting,
            ..Self::default()
        };
        self.mark_dirty();
        next
    }

    pub(crate) fn set_job(&mut self, job: Job) {
        self.job = Some(job);
        self.mark_dirty();
    }

    pub(crate) fn set_latest_status(&mut self, status: StageStatus) {
        if self.latest_status.as_ref() != Some(&status) {
            self.latest_status = Some(status);
            self.mark_dirty();
        }
    }

    /// Counts one more non-terminal observation; true once the cap is hit.
    pub(crate) fn record_poll(&mut self) -> bool {
        self.poll_attempts = self.poll_attempts.saturating_add(1);
        self.max_poll_attempts
            .is_some_and(|max| self.poll_attempts >= max)
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, failure: Failure) {
        self.set_phase(Phase::Failed(failure));
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
