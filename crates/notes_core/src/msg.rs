use chrono::{DateTime, Utc};

use crate::{CycleId, Failure, FinalResults, JobId, ResultBundle, SubmissionPayload};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller submitted a new job; supersedes whatever is being tracked.
    Submit {
        payload: SubmissionPayload,
        max_poll_attempts: Option<u32>,
    },
    /// The remote side accepted the job.
    JobCreated {
        cycle: CycleId,
        job_id: JobId,
        status: String,
        submitted_at: DateTime<Utc>,
    },
    /// Job creation failed at the transport.
    SubmitFailed {
        cycle: CycleId,
        http_status: Option<u16>,
        message: String,
        details: Option<String>,
    },
    /// A status poll returned.
    StatusReceived {
        cycle: CycleId,
        job_id: JobId,
        status: String,
        final_results: Option<FinalResults>,
    },
    /// A status poll failed at the transport.
    PollFailed {
        cycle: CycleId,
        job_id: JobId,
        http_status: Option<u16>,
        message: String,
    },
    /// Dependent fetches finished.
    DependentsResolved {
        cycle: CycleId,
        job_id: JobId,
        outcome: Result<ResultBundle, Failure>,
    },
}

impl Msg {
    /// Cycle the message belongs to; `None` for messages that start one.
    pub fn cycle(&self) -> Option<CycleId> {
        match self {
            Msg::Submit { .. } => None,
            Msg::JobCreated { cycle, .. }
            | Msg::SubmitFailed { cycle, .. }
            | Msg::StatusReceived { cycle, .. }
            | Msg::PollFailed { cycle, .. }
            | Msg::DependentsResolved { cycle, .. } => Some(*cycle),
        }
    }
}
