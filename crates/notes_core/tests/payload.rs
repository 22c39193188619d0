use notes_core::{Source, SubmissionPayload, TextFormat, ValidationError};

#[test]
fn url_payload_requires_a_web_url() {
    assert!(SubmissionPayload::media_url("https://www.bilibili.com/video/BV1xx")
        .validate()
        .is_ok());
    assert_eq!(
        SubmissionPayload::media_url("   ").validate(),
        Err(ValidationError::MissingUrl)
    );
    assert!(matches!(
        SubmissionPayload::media_url("not a url").validate(),
        Err(ValidationError::InvalidUrl(_))
    ));
    assert!(matches!(
        SubmissionPayload::media_url("ftp://example.com/a").validate(),
        Err(ValidationError::InvalidUrl(_))
    ));
}

#[test]
fn text_payload_requires_content() {
    assert!(SubmissionPayload::text("00:01 hello", TextFormat::Timestamped)
        .validate()
        .is_ok());
    assert_eq!(
        SubmissionPayload::text("\n\t ", TextFormat::Plain).validate(),
        Err(ValidationError::MissingText)
    );
}

#[test]
fn builders_fill_optional_fields() {
    let payload = SubmissionPayload::text("body", TextFormat::Plain)
        .with_title("Lecture 3")
        .with_learning_objectives("understand ownership");
    assert_eq!(payload.title.as_deref(), Some("Lecture 3"));
    assert_eq!(
        payload.learning_objectives.as_deref(),
        Some("understand ownership")
    );
    assert_eq!(
        payload.source,
        Source::Text {
            text: "body".to_string(),
            format: TextFormat::Plain
        }
    );
}
