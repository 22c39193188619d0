//! Plain-text rendering of progress lines and final results.
use std::fmt::Write;
use std::time::Duration;

use notes_core::display::{describe, Tone};
use notes_core::{format_time, Difficulty, Failure, ResultBundle};

fn marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "..",
        Tone::Active => ">>",
        Tone::Done => "ok",
        Tone::Success => "**",
        Tone::Error => "!!",
    }
}

/// One progress line, e.g. `[00:42] >> Transcribing speech... (stage 3/7)`.
pub(crate) fn status_line(elapsed: Duration, code: &str) -> String {
    let display = describe(code);
    format!(
        "[{}] {} {}",
        format_time(elapsed.as_secs_f64()),
        marker(display.tone),
        display.text()
    )
}

fn difficulty_label(difficulty: &Difficulty) -> &str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
        Difficulty::Other(raw) if raw.is_empty() => "unrated",
        Difficulty::Other(raw) => raw.as_str(),
    }
}

/// Whole minutes, rounded up.
fn reading_minutes(seconds: u32) -> u32 {
    seconds.div_ceil(60)
}

pub(crate) fn result(bundle: &ResultBundle) -> String {
    let mut out = String::new();
    let note = &bundle.note;
    if let Some(title) = bundle.title.as_deref() {
        let _ = writeln!(out, "# {title}\n");
    }
    if let Some(summary) = note.summary.as_deref() {
        let _ = writeln!(out, "Summary: {summary}");
    }
    if !note.key_concepts.is_empty() {
        let _ = writeln!(out, "Key concepts: {}", note.key_concepts.join(", "));
    }
    if let Some(seconds) = note.estimated_reading_time_seconds {
        let _ = writeln!(out, "Reading time: {} min", reading_minutes(seconds));
    }
    let _ = writeln!(out, "\n{}\n", note.markdown_content.trim_end());

    if bundle.cues.is_empty() {
        let _ = writeln!(out, "No knowledge cues.");
    } else {
        let _ = writeln!(out, "Knowledge cues:");
        for (index, cue) in bundle.cues.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. [{}] {}\n   {}",
                index + 1,
                difficulty_label(&cue.difficulty),
                cue.question,
                cue.answer
            );
        }
    }

    if let Some(transcript) = &bundle.transcript {
        let _ = writeln!(out, "\nTranscript:\n{}", transcript.to_plain_text());
    }
    out
}

pub(crate) fn failure(failure: &Failure) -> String {
    let mut out = format!("Failed: {failure}");
    if let Some(details) = failure.details.as_deref() {
        let _ = write!(out, "\n{details}");
    }
    out
}
