//! Result values produced by a finished pipeline run.
use chrono::{DateTime, Utc};

use crate::NoteId;

/// Shown in place of a clock string when the input is not a usable duration.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// A generated study note.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    pub note_id: NoteId,
    pub markdown_content: String,
    pub summary: Option<String>,
    pub key_concepts: Vec<String>,
    pub estimated_reading_time_seconds: Option<u32>,
    pub is_user_edited: bool,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

/// Difficulty tier of a knowledge cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl Difficulty {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Other(raw.trim().to_string()),
        }
    }
}

/// A question/answer pair generated for a note.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeCue {
    pub cue_id: String,
    pub note_id: NoteId,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub source_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Absent when the pipeline produced no usable timestamp.
    pub start_seconds: Option<f64>,
    pub text: String,
}

/// Transcript of the source content.
#[derive(Debug, Clone, PartialEq)]
pub enum Transcript {
    Segments(Vec<TranscriptSegment>),
    Plain(String),
}

impl Transcript {
    /// Renders segments as `[MM:SS] text` lines, or bare text for segments
    /// without a start time; plain text is returned as is.
    pub fn to_plain_text(&self) -> String {
        match self {
            Transcript::Plain(text) => text.clone(),
            Transcript::Segments(segments) => segments
                .iter()
                .map(TranscriptSegment::to_line)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl TranscriptSegment {
    fn to_line(&self) -> String {
        match self.start_seconds {
            Some(start) => format!("[{}] {}", format_time(start), self.text),
            None => self.text.clone(),
        }
    }
}

/// A note as delivered by the remote side, with cues when they were embedded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteWithCues {
    pub note: Note,
    pub cues: Option<Vec<KnowledgeCue>>,
}

/// Raw terminal payload attached to a successful status report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinalResults {
    pub title: Option<String>,
    pub notes: Vec<NoteWithCues>,
    pub transcript: Option<Transcript>,
}

/// Aggregated, immutable output of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBundle {
    pub title: Option<String>,
    pub note: Note,
    pub cues: Vec<KnowledgeCue>,
    pub transcript: Option<Transcript>,
}

impl ResultBundle {
    /// Builds the bundle straight from the terminal payload when it embeds
    /// at least one note. The first note wins; missing cues mean none.
    pub fn from_embedded(results: &FinalResults) -> Option<Self> {
        let first = results.notes.first()?;
        Some(Self {
            title: results.title.clone(),
            note: first.note.clone(),
            cues: first.cues.clone().unwrap_or_default(),
            transcript: results.transcript.clone(),
        })
    }

    /// Combines separately fetched parts with the rest of the terminal payload.
    pub fn assemble(results: &FinalResults, note: Note, cues: Vec<KnowledgeCue>) -> Self {
        Self {
            title: results.title.clone(),
            note,
            cues,
            transcript: results.transcript.clone(),
        }
    }
}

/// Formats a duration in seconds as `HH:MM:SS`, or `MM:SS` below one hour.
///
/// Negative, NaN and infinite inputs yield [`TIME_PLACEHOLDER`].
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return TIME_PLACEHOLDER.to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Like [`format_time`], for untyped input such as form fields.
pub fn format_time_text(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(seconds) => format_time(seconds),
        Err(_) => TIME_PLACEHOLDER.to_string(),
    }
}
