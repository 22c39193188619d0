use notes_logging::{notes_debug, notes_info, notes_warn};

use crate::taxonomy::StatusKind;
use crate::{
    Effect, Failure, FailureKind, Job, Msg, Phase, ResultBundle, StageStatus, TrackingSession,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages tagged with a cycle other than the current one come from a
/// superseded submission and are dropped without touching state.
pub fn update(mut state: TrackingSession, msg: Msg) -> (TrackingSession, Vec<Effect>) {
    if let Some(cycle) = msg.cycle() {
        if cycle != state.cycle() {
            notes_debug!(
                "Discarding message from superseded cycle {} (active {})",
                cycle,
                state.cycle()
            );
            return (state, Vec::new());
        }
    }

    let effects = match msg {
        Msg::Submit {
            payload,
            max_poll_attempts,
        } => {
            let cycle = state.begin_cycle(max_poll_attempts);
            match payload.validate() {
                Ok(()) => {
                    notes_info!("Cycle {} submitting", cycle);
                    vec![
                        Effect::CancelPrevious { cycle },
                        Effect::CreateJob { cycle, payload },
                    ]
                }
                Err(err) => {
                    notes_warn!("Cycle {} rejected locally: {}", cycle, err);
                    state.fail(Failure::new(FailureKind::Validation, err.to_string()));
                    vec![Effect::CancelPrevious { cycle }]
                }
            }
        }
        Msg::JobCreated {
            cycle,
            job_id,
            status,
            submitted_at,
        } => {
            if *state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            notes_info!("Cycle {} created job {} ({})", cycle, job_id, status);
            let status = StageStatus::new(status);
            let kind = status.kind();
            state.set_job(Job {
                job_id: job_id.clone(),
                submitted_at,
            });
            state.set_latest_status(status.clone());
            if kind == StatusKind::TerminalError {
                state.fail(Failure::pipeline(status.code()));
                Vec::new()
            } else {
                state.set_phase(Phase::Polling);
                vec![Effect::StartPolling { cycle, job_id }]
            }
        }
        Msg::SubmitFailed {
            cycle,
            http_status,
            message,
            details,
        } => {
            if *state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            notes_warn!("Cycle {} submission failed: {}", cycle, message);
            state.fail(
                Failure::new(FailureKind::Submission { http_status }, message)
                    .with_details(details),
            );
            Vec::new()
        }
        Msg::StatusReceived {
            cycle,
            job_id,
            status,
            final_results,
        } => {
            if !state.is_active_job(cycle, &job_id) || *state.phase() != Phase::Polling {
                return (state, Vec::new());
            }
            let status = StageStatus::new(status);
            let kind = status.kind();
            state.set_latest_status(status.clone());
            match kind {
                StatusKind::TerminalError => {
                    notes_warn!("Job {} failed remotely: {}", job_id, status.code());
                    state.fail(Failure::pipeline(status.code()));
                    vec![Effect::CancelPolling { cycle }]
                }
                StatusKind::TerminalSuccess => {
                    let embedded = final_results.as_ref().and_then(ResultBundle::from_embedded);
                    match embedded {
                        Some(bundle) => {
                            notes_info!("Job {} finished with embedded results", job_id);
                            state.set_phase(Phase::Succeeded(bundle));
                            vec![Effect::CancelPolling { cycle }]
                        }
                        None => {
                            notes_info!("Job {} finished; fetching results", job_id);
                            state.set_phase(Phase::FetchingDependents);
                            vec![
                                Effect::CancelPolling { cycle },
                                Effect::FetchDependents {
                                    cycle,
                                    job_id,
                                    final_results: final_results.unwrap_or_default(),
                                },
                            ]
                        }
                    }
                }
                StatusKind::Initiated
                | StatusKind::StageActive(_)
                | StatusKind::StageComplete(_)
                | StatusKind::Unknown => {
                    if state.record_poll() {
                        let attempts = state.poll_attempts();
                        notes_warn!("Job {} still running after {} polls", job_id, attempts);
                        state.fail(Failure::new(
                            FailureKind::PollLimitReached { attempts },
                            format!("gave up waiting after {attempts} status checks"),
                        ));
                        vec![Effect::CancelPolling { cycle }]
                    } else {
                        Vec::new()
                    }
                }
            }
        }
        Msg::PollFailed {
            cycle,
            job_id,
            http_status,
            message,
        } => {
            if !state.is_active_job(cycle, &job_id) || *state.phase() != Phase::Polling {
                return (state, Vec::new());
            }
            notes_warn!("Status check for job {} failed: {}", job_id, message);
            state.fail(Failure::new(
                FailureKind::PollingTransport { http_status },
                message,
            ));
            vec![Effect::CancelPolling { cycle }]
        }
        Msg::DependentsResolved {
            cycle,
            job_id,
            outcome,
        } => {
            if !state.is_active_job(cycle, &job_id)
                || *state.phase() != Phase::FetchingDependents
            {
                return (state, Vec::new());
            }
            match outcome {
                Ok(bundle) => state.set_phase(Phase::Succeeded(bundle)),
                Err(failure) => {
                    notes_warn!("Results for job {} unavailable: {}", job_id, failure);
                    state.fail(failure);
                }
            }
            Vec::new()
        }
    };

    (state, effects)
}
