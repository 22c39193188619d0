//! JSON shapes of the learning-session HTTP API and their domain mapping.
use chrono::{DateTime, NaiveDateTime, Utc};
use notes_core::{
    Difficulty, FinalResults, KnowledgeCue, Note, NoteId, NoteWithCues, Source, SubmissionPayload,
    TextFormat, Transcript, TranscriptSegment,
};
use serde::{Deserialize, Serialize};

const SOURCE_DESCRIPTION: &str = "Submitted via study notes tracker";
pub(crate) const DEFAULT_CREATED_STATUS: &str = notes_core::taxonomy::INITIATED_CODE;

#[derive(Debug, Serialize)]
pub(crate) struct CreateJobRequest<'a> {
    source_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bilibili_video_url: Option<&'a str>,
    #[serde(rename = "rawTranscriptText", skip_serializing_if = "Option::is_none")]
    raw_transcript_text: Option<&'a str>,
    #[serde(rename = "initialVideoTitle")]
    initial_video_title: Option<&'a str>,
    #[serde(rename = "initialSourceDescription")]
    initial_source_description: &'static str,
    learning_objectives: Option<&'a str>,
}

impl<'a> CreateJobRequest<'a> {
    pub(crate) fn from_payload(payload: &'a SubmissionPayload) -> Self {
        let (source_type, url, text) = match &payload.source {
            Source::MediaUrl(url) => ("url", Some(url.trim()), None),
            Source::Text { text, format } => {
                let source_type = match format {
                    TextFormat::Timestamped => "timestamped_text",
                    TextFormat::Plain => "plain_text",
                };
                (source_type, None, Some(text.as_str()))
            }
        };
        Self {
            source_type,
            bilibili_video_url: url,
            raw_transcript_text: text,
            initial_video_title: non_blank(payload.title.as_deref()),
            initial_source_description: SOURCE_DESCRIPTION,
            learning_objectives: non_blank(payload.learning_objectives.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateJobResponse {
    #[serde(rename = "sessionId")]
    pub(crate) session_id: String,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) final_results: Option<FinalResultsWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinalResultsWire {
    #[serde(default)]
    notes: Vec<NoteWire>,
    #[serde(default)]
    plain_transcript_text: Option<String>,
    #[serde(default)]
    timestamped_transcript_segments: Option<Vec<SegmentWire>>,
    #[serde(default)]
    ai_generated_video_title: Option<String>,
}

impl From<FinalResultsWire> for FinalResults {
    fn from(wire: FinalResultsWire) -> Self {
        let transcript = match (wire.timestamped_transcript_segments, wire.plain_transcript_text) {
            (Some(segments), _) if !segments.is_empty() => Some(Transcript::Segments(
                segments
                    .into_iter()
                    .map(|segment| TranscriptSegment {
                        start_seconds: segment.start.as_ref().and_then(serde_json::Value::as_f64),
                        text: segment.text.unwrap_or_default(),
                    })
                    .collect(),
            )),
            (_, Some(text)) if !text.trim().is_empty() => Some(Transcript::Plain(text)),
            _ => None,
        };
        Self {
            title: wire.ai_generated_video_title,
            notes: wire.notes.into_iter().map(NoteWithCues::from).collect(),
            transcript,
        }
    }
}

/// Only a numeric start counts as a timestamp; anything else is dropped.
#[derive(Debug, Deserialize)]
struct SegmentWire {
    #[serde(default, rename = "startTimeSeconds", alias = "start_time_seconds")]
    start: Option<serde_json::Value>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteWire {
    note_id: String,
    #[serde(default)]
    markdown_content: String,
    #[serde(default)]
    summary_of_note: Option<String>,
    #[serde(default)]
    key_concepts_mentioned: Option<Vec<String>>,
    #[serde(default)]
    estimated_reading_time_seconds: Option<u32>,
    #[serde(default)]
    is_user_edited: bool,
    #[serde(default)]
    last_modified_at: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    knowledge_cues: Option<Vec<CueWire>>,
}

impl From<NoteWire> for NoteWithCues {
    fn from(wire: NoteWire) -> Self {
        let note = Note {
            note_id: NoteId(wire.note_id),
            markdown_content: wire.markdown_content,
            summary: wire.summary_of_note,
            key_concepts: wire.key_concepts_mentioned.unwrap_or_default(),
            estimated_reading_time_seconds: wire.estimated_reading_time_seconds,
            is_user_edited: wire.is_user_edited,
            last_modified_at: wire.last_modified_at.as_deref().and_then(parse_timestamp),
            version: wire.version,
        };
        Self {
            note,
            cues: wire
                .knowledge_cues
                .map(|cues| cues.into_iter().map(KnowledgeCue::from).collect()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CueWire {
    cue_id: String,
    #[serde(default)]
    note_id: String,
    #[serde(default)]
    question_text: String,
    #[serde(default)]
    answer_text: String,
    #[serde(default)]
    difficulty_level: String,
    #[serde(default)]
    source_reference_in_note: Option<String>,
}

impl From<CueWire> for KnowledgeCue {
    fn from(wire: CueWire) -> Self {
        Self {
            cue_id: wire.cue_id,
            note_id: NoteId(wire.note_id),
            question: wire.question_text,
            answer: wire.answer_text,
            difficulty: Difficulty::parse(&wire.difficulty_level),
            source_reference: wire.source_reference_in_note,
        }
    }
}

/// Accepts RFC 3339 and offset-less ISO timestamps (taken as UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Error body of a rejected request: `detail` is a string or a list of
/// validation errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts a readable message from an error response body.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(describe_validation_item).collect();
            Some(parts.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn describe_validation_item(item: &serde_json::Value) -> String {
    let msg = item.get("msg").and_then(serde_json::Value::as_str);
    let loc = item.get("loc").and_then(serde_json::Value::as_array).map(|parts| {
        parts
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    });
    match (loc, msg) {
        (Some(loc), Some(msg)) => format!("{loc} - {msg}"),
        (None, Some(msg)) => msg.to_string(),
        _ => item.to_string(),
    }
}
