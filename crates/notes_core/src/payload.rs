use thiserror::Error;

/// How a raw text submission is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Lines carry timestamps that the pipeline should keep.
    Timestamped,
    Plain,
}

/// The content to process. Exactly one source per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    MediaUrl(String),
    Text { text: String, format: TextFormat },
}

/// Everything needed to create a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub source: Source,
    pub learning_objectives: Option<String>,
    pub title: Option<String>,
}

impl SubmissionPayload {
    pub fn media_url(url: impl Into<String>) -> Self {
        Self {
            source: Source::MediaUrl(url.into()),
            learning_objectives: None,
            title: None,
        }
    }

    pub fn text(text: impl Into<String>, format: TextFormat) -> Self {
        Self {
            source: Source::Text {
                text: text.into(),
                format,
            },
            learning_objectives: None,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_learning_objectives(mut self, objectives: impl Into<String>) -> Self {
        self.learning_objectives = Some(objectives.into());
        self
    }

    /// Local checks run before anything is sent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.source {
            Source::MediaUrl(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::MissingUrl);
                }
                let parsed = url::Url::parse(trimmed)
                    .map_err(|err| ValidationError::InvalidUrl(err.to_string()))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ValidationError::InvalidUrl(format!(
                        "unsupported scheme {}",
                        parsed.scheme()
                    )));
                }
                Ok(())
            }
            Source::Text { text, .. } => {
                if text.trim().is_empty() {
                    Err(ValidationError::MissingText)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a video URL is required")]
    MissingUrl,
    #[error("invalid video URL: {0}")]
    InvalidUrl(String),
    #[error("text input is required")]
    MissingText,
}
