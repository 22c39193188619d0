use notes_core::display::{describe, Tone};
use notes_core::taxonomy::{progress_fraction, ERROR_PREFIX};
use notes_core::{classify, Stage, StageStatus, StatusKind};

#[test]
fn known_codes_classify_to_their_kind() {
    assert_eq!(classify("processing_initiated"), StatusKind::Initiated);
    assert_eq!(
        classify("a1_preprocessing_active"),
        StatusKind::StageActive(Stage::Preprocessing)
    );
    assert_eq!(
        classify("a2_extraction_complete"),
        StatusKind::StageComplete(Stage::KeyInfoExtraction)
    );
    assert_eq!(
        classify("bili_download_success"),
        StatusKind::StageComplete(Stage::MediaDownload)
    );
    assert_eq!(classify("all_processing_complete"), StatusKind::TerminalSuccess);
    assert_eq!(classify("error_in_b_llm"), StatusKind::TerminalError);
}

#[test]
fn every_stage_code_round_trips_through_classify() {
    for stage in Stage::ALL {
        assert_eq!(classify(stage.active_code()), StatusKind::StageActive(stage));
        assert_eq!(
            classify(stage.complete_code()),
            StatusKind::StageComplete(stage)
        );
    }
}

#[test]
fn unseen_error_codes_are_still_terminal() {
    for code in ["error_quota_exhausted", "error_", "error_in_z_llm"] {
        assert!(code.starts_with(ERROR_PREFIX));
        let kind = classify(code);
        assert_eq!(kind, StatusKind::TerminalError);
        assert!(kind.is_terminal());
    }
}

#[test]
fn unrecognized_codes_never_stop_polling() {
    for code in [
        "",
        "bili_processing_started",
        "transcript_processing_started",
        "ERROR_IN_B_LLM",
        "warming_up",
        "ünïcödé",
    ] {
        let kind = classify(code);
        assert_eq!(kind, StatusKind::Unknown, "code {code:?}");
        assert!(!kind.is_terminal());
    }
}

#[test]
fn classify_is_deterministic() {
    let codes = ["processing_initiated", "note_generation_active", "error_x", "??"];
    for code in codes {
        assert_eq!(classify(code), classify(code));
        assert_eq!(StageStatus::new(code).kind(), classify(code));
    }
}

#[test]
fn progress_fraction_follows_stage_order() {
    let mut last = 0.0;
    for stage in Stage::ALL {
        let active = progress_fraction(StatusKind::StageActive(stage)).unwrap();
        let complete = progress_fraction(StatusKind::StageComplete(stage)).unwrap();
        assert!(active > last);
        assert!(complete > active);
        last = complete;
    }
    assert_eq!(progress_fraction(StatusKind::TerminalSuccess), Some(1.0));
    assert_eq!(progress_fraction(StatusKind::Unknown), None);
}

#[test]
fn describe_marks_errors_and_stage_positions() {
    let display = describe("note_generation_active");
    assert_eq!(display.tone, Tone::Active);
    assert_eq!(display.stage_position, Some((6, Stage::COUNT)));
    assert!(display.text().ends_with("(stage 6/7)"));

    let error = describe("error_in_b_llm");
    assert_eq!(error.tone, Tone::Error);
    assert_eq!(error.label, "Note generation failed");

    let novel = describe("error_brand_new");
    assert_eq!(novel.tone, Tone::Error);

    let unknown = describe("something_else");
    assert_eq!(unknown.tone, Tone::Info);
    assert_eq!(unknown.label, "Current status: something_else");
}
