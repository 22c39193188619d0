//! Classification of the remote pipeline's status codes.
//!
//! The vocabulary is open: error codes are recognized by prefix so that new
//! failure codes stop polling without a client update, and anything not
//! recognized is treated as a harmless intermediate status.

/// The single code reported right after a job is accepted.
pub const INITIATED_CODE: &str = "processing_initiated";
/// The single code reported once every stage has finished.
pub const SUCCESS_CODE: &str = "all_processing_complete";
/// Every failure code starts with this prefix.
pub const ERROR_PREFIX: &str = "error_";

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    MediaDownload,
    AudioExtraction,
    SpeechRecognition,
    Preprocessing,
    KeyInfoExtraction,
    NoteGeneration,
    KnowledgeCues,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::MediaDownload,
        Stage::AudioExtraction,
        Stage::SpeechRecognition,
        Stage::Preprocessing,
        Stage::KeyInfoExtraction,
        Stage::NoteGeneration,
        Stage::KnowledgeCues,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Code reported while the stage is running.
    pub fn active_code(self) -> &'static str {
        match self {
            Stage::MediaDownload => "bili_download_active",
            Stage::AudioExtraction => "bili_audio_extraction_active",
            Stage::SpeechRecognition => "bili_asr_active",
            Stage::Preprocessing => "a1_preprocessing_active",
            Stage::KeyInfoExtraction => "a2_extraction_active",
            Stage::NoteGeneration => "note_generation_active",
            Stage::KnowledgeCues => "knowledge_cues_generation_active",
        }
    }

    /// Code reported once the stage has finished.
    pub fn complete_code(self) -> &'static str {
        match self {
            Stage::MediaDownload => "bili_download_success",
            Stage::AudioExtraction => "bili_audio_extraction_success",
            Stage::SpeechRecognition => "bili_asr_success",
            Stage::Preprocessing => "a1_preprocessing_complete",
            Stage::KeyInfoExtraction => "a2_extraction_complete",
            Stage::NoteGeneration => "note_generation_complete",
            Stage::KnowledgeCues => "knowledge_cues_generation_complete",
        }
    }

    /// Zero-based position in [`Stage::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

/// What a status code means to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Initiated,
    StageActive(Stage),
    StageComplete(Stage),
    TerminalSuccess,
    TerminalError,
    Unknown,
}

impl StatusKind {
    /// Terminal kinds stop polling for good.
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusKind::TerminalSuccess | StatusKind::TerminalError)
    }

    pub fn stage(self) -> Option<Stage> {
        match self {
            StatusKind::StageActive(stage) | StatusKind::StageComplete(stage) => Some(stage),
            _ => None,
        }
    }
}

/// Classifies a raw status code. Total: unrecognized codes yield `Unknown`.
pub fn classify(code: &str) -> StatusKind {
    if code == INITIATED_CODE {
        return StatusKind::Initiated;
    }
    if code == SUCCESS_CODE {
        return StatusKind::TerminalSuccess;
    }
    if code.starts_with(ERROR_PREFIX) {
        return StatusKind::TerminalError;
    }
    for stage in Stage::ALL {
        if code == stage.active_code() {
            return StatusKind::StageActive(stage);
        }
        if code == stage.complete_code() {
            return StatusKind::StageComplete(stage);
        }
    }
    StatusKind::Unknown
}

/// Fraction of the pipeline done, for progress bars.
///
/// An active stage counts as half done. `None` for kinds that carry no
/// position (unknown codes and errors).
pub fn progress_fraction(kind: StatusKind) -> Option<f32> {
    let total = Stage::COUNT as f32;
    match kind {
        StatusKind::Initiated => Some(0.0),
        StatusKind::StageActive(stage) => Some((stage.ordinal() as f32 + 0.5) / total),
        StatusKind::StageComplete(stage) => Some((stage.ordinal() as f32 + 1.0) / total),
        StatusKind::TerminalSuccess => Some(1.0),
        StatusKind::TerminalError | StatusKind::Unknown => None,
    }
}
