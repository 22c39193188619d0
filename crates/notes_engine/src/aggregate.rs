use notes_core::{Failure, FailureKind, FinalResults, JobId, ResultBundle};
use notes_logging::notes_debug;

use crate::{Transport, TransportError};

const NO_NOTE_MESSAGE: &str = "processing completed but no note produced";

/// Turns a terminal payload into a complete [`ResultBundle`].
///
/// Embedded notes are used as is, with no fetch at all. Otherwise the notes
/// of the job are fetched, then the cues of the first note unless it already
/// carries them. Any missing piece fails the whole bundle.
pub async fn aggregate(
    transport: &dyn Transport,
    job_id: &JobId,
    results: &FinalResults,
) -> Result<ResultBundle, Failure> {
    if let Some(bundle) = ResultBundle::from_embedded(results) {
        return Ok(bundle);
    }

    notes_debug!("Fetching notes for job {}", job_id);
    let notes = transport
        .fetch_notes(job_id)
        .await
        .map_err(|err| fetch_failure("failed to fetch notes", err))?;
    let Some(first) = notes.into_iter().next() else {
        return Err(Failure::new(FailureKind::Aggregation, NO_NOTE_MESSAGE));
    };

    let cues = match first.cues {
        Some(cues) => cues,
        None => {
            notes_debug!("Fetching knowledge cues for note {}", first.note.note_id);
            transport
                .fetch_cues(&first.note.note_id)
                .await
                .map_err(|err| fetch_failure("failed to fetch knowledge cues", err))?
        }
    };

    Ok(ResultBundle::assemble(results, first.note, cues))
}

fn fetch_failure(context: &str, err: TransportError) -> Failure {
    Failure::new(FailureKind::Aggregation, format!("{context}: {err}")).with_details(err.details)
}
