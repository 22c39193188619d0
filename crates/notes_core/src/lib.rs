//! Tracker core: pure state machine, status taxonomy and result types.
pub mod display;
mod effect;
mod failure;
mod msg;
mod payload;
mod results;
mod state;
pub mod taxonomy;
mod update;

pub use effect::Effect;
pub use failure::{Failure, FailureKind};
pub use msg::Msg;
pub use payload::{Source, SubmissionPayload, TextFormat, ValidationError};
pub use results::{
    format_time, format_time_text, Difficulty, FinalResults, KnowledgeCue, Note, NoteWithCues,
    ResultBundle, Transcript, TranscriptSegment, TIME_PLACEHOLDER,
};
pub use state::{CycleId, Job, JobId, NoteId, Phase, StageStatus, TrackingSession};
pub use taxonomy::{classify, Stage, StatusKind};
pub use update::update;
