//! Status code to label/tone lookup for progress displays.
use crate::taxonomy::{classify, Stage, StatusKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Active,
    Done,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: String,
    pub tone: Tone,
    /// One-based stage position, e.g. `(4, 7)`.
    pub stage_position: Option<(usize, usize)>,
}

impl StatusDisplay {
    /// Label with the stage position appended when known.
    pub fn text(&self) -> String {
        match self.stage_position {
            Some((n, total)) => format!("{} (stage {n}/{total})", self.label),
            None => self.label.clone(),
        }
    }
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::MediaDownload => "Downloading video",
        Stage::AudioExtraction => "Extracting audio",
        Stage::SpeechRecognition => "Transcribing speech",
        Stage::Preprocessing => "Preprocessing content",
        Stage::KeyInfoExtraction => "Extracting key information",
        Stage::NoteGeneration => "Generating study notes",
        Stage::KnowledgeCues => "Generating knowledge cues",
    }
}

fn error_label(code: &str) -> String {
    match code {
        "error_in_a1_llm" => "Preprocessing failed".to_string(),
        "error_in_a2_llm" => "Key information extraction failed".to_string(),
        "error_in_b_llm" => "Note generation failed".to_string(),
        "error_in_d_llm" => "Knowledge cue generation failed".to_string(),
        "error_asr_failed" | "error_asr_misconfigured" => "Speech recognition failed".to_string(),
        "error_audio_extraction" => "Audio extraction failed".to_string(),
        c if c.starts_with("error_bili_download") => "Video download failed".to_string(),
        other => format!("Processing failed ({other})"),
    }
}

/// Describes a raw status code for display. Total, like [`classify`].
pub fn describe(code: &str) -> StatusDisplay {
    let kind = classify(code);
    let stage_position = kind.stage().map(|stage| (stage.ordinal() + 1, Stage::COUNT));
    let (label, tone) = match kind {
        StatusKind::Initiated => ("Starting processing".to_string(), Tone::Info),
        StatusKind::StageActive(stage) => (format!("{}...", stage_name(stage)), Tone::Active),
        StatusKind::StageComplete(stage) => (format!("{}: done", stage_name(stage)), Tone::Done),
        StatusKind::TerminalSuccess => ("All processing complete".to_string(), Tone::Success),
        StatusKind::TerminalError => (error_label(code), Tone::Error),
        StatusKind::Unknown if code.is_empty() => {
            ("Current status: unknown".to_string(), Tone::Info)
        }
        StatusKind::Unknown => (format!("Current status: {code}"), Tone::Info),
    };
    StatusDisplay {
        label,
        tone,
        stage_position,
    }
}
