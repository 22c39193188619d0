mod support;

use notes_core::{FailureKind, FinalResults, JobId, NoteId, NoteWithCues};
use notes_engine::aggregate;
use pretty_assertions::assert_eq;
use support::{cue, http_error, note, ScriptedTransport};

fn job() -> JobId {
    JobId::from("s1")
}

#[tokio::test]
async fn embedded_note_needs_no_fetch() {
    support::init_logging();
    let transport = ScriptedTransport::new();
    let results = FinalResults {
        title: Some("Embedded".to_string()),
        notes: vec![NoteWithCues {
            note: note("n1", "# Hi"),
            cues: Some(vec![cue("c1", "n1")]),
        }],
        transcript: None,
    };

    let bundle = aggregate(&transport, &job(), &results).await.expect("bundle");

    assert_eq!(bundle.note.note_id, NoteId::from("n1"));
    assert_eq!(bundle.cues.len(), 1);
    assert_eq!(bundle.title.as_deref(), Some("Embedded"));
    assert_eq!(transport.dependent_calls(), 0);
}

#[tokio::test]
async fn missing_note_is_fetched_then_its_cues() {
    support::init_logging();
    let transport = ScriptedTransport::new()
        .notes(Ok(vec![
            NoteWithCues {
                note: note("n1", "# First"),
                cues: None,
            },
            NoteWithCues {
                note: note("n2", "# Second"),
                cues: None,
            },
        ]))
        .cues(Ok(vec![cue("c1", "n1"), cue("c2", "n1")]));

    let bundle = aggregate(&transport, &job(), &FinalResults::default())
        .await
        .expect("bundle");

    assert_eq!(bundle.note.markdown_content, "# First");
    assert_eq!(bundle.cues.len(), 2);
    assert_eq!(bundle.title, None);
    assert_eq!(transport.dependent_calls(), 2);
}

#[tokio::test]
async fn fetched_note_with_cues_skips_cue_fetch() {
    support::init_logging();
    let transport = ScriptedTransport::new().notes(Ok(vec![NoteWithCues {
        note: note("n1", "# Hi"),
        cues: Some(Vec::new()),
    }]));

    let bundle = aggregate(&transport, &job(), &FinalResults::default())
        .await
        .expect("bundle");

    assert!(bundle.cues.is_empty());
    assert_eq!(transport.dependent_calls(), 1);
}

#[tokio::test]
async fn empty_cue_list_still_succeeds() {
    support::init_logging();
    let transport = ScriptedTransport::new()
        .notes(Ok(vec![NoteWithCues {
            note: note("n1", "# Hi"),
            cues: None,
        }]))
        .cues(Ok(Vec::new()));

    let bundle = aggregate(&transport, &job(), &FinalResults::default())
        .await
        .expect("bundle");

    assert!(bundle.cues.is_empty());
    assert_eq!(transport.dependent_calls(), 2);
}

#[tokio::test]
async fn no_notes_is_an_aggregation_failure() {
    support::init_logging();
    let transport = ScriptedTransport::new().notes(Ok(Vec::new()));

    let failure = aggregate(&transport, &job(), &FinalResults::default())
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Aggregation);
    assert_eq!(failure.message, "processing completed but no note produced");
}

#[tokio::test]
async fn cue_fetch_failure_fails_the_bundle() {
    support::init_logging();
    let mut err = http_error(500, "internal error");
    err.details = Some("{\"detail\":\"internal error\"}".to_string());
    let transport = ScriptedTransport::new()
        .notes(Ok(vec![NoteWithCues {
            note: note("n1", "# Hi"),
            cues: None,
        }]))
        .cues(Err(err));

    let failure = aggregate(&transport, &job(), &FinalResults::default())
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Aggregation);
    assert!(failure.message.starts_with("failed to fetch knowledge cues"));
    assert_eq!(
        failure.details.as_deref(),
        Some("{\"detail\":\"internal error\"}")
    );
}
