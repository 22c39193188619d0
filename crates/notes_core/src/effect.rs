use crate::{CycleId, FinalResults, JobId, SubmissionPayload};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Stop the poll scheduler and fetches of every cycle before `cycle`.
    CancelPrevious { cycle: CycleId },
    CreateJob {
        cycle: CycleId,
        payload: SubmissionPayload,
    },
    StartPolling { cycle: CycleId, job_id: JobId },
    CancelPolling { cycle: CycleId },
    /// Fetch the note and cues missing from the terminal payload.
    FetchDependents {
        cycle: CycleId,
        job_id: JobId,
        final_results: FinalResults,
    },
}
