use std::fmt;

/// Where a tracking cycle went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Bad local input; nothing was sent.
    Validation,
    /// The remote side refused to create the job.
    Submission { http_status: Option<u16> },
    /// A status fetch failed at the network or HTTP layer.
    PollingTransport { http_status: Option<u16> },
    /// The pipeline itself reported an error code.
    Pipeline { code: String },
    /// Processing succeeded but the results could not be assembled.
    Aggregation,
    /// The configured poll attempt cap ran out before a terminal status.
    PollLimitReached { attempts: u32 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "invalid input"),
            FailureKind::Submission {
                http_status: Some(code),
            } => write!(f, "submission rejected (http {code})"),
            FailureKind::Submission { http_status: None } => write!(f, "submission failed"),
            FailureKind::PollingTransport {
                http_status: Some(code),
            } => write!(f, "status check failed (http {code})"),
            FailureKind::PollingTransport { http_status: None } => {
                write!(f, "status check failed")
            }
            FailureKind::Pipeline { code } => write!(f, "pipeline error {code}"),
            FailureKind::Aggregation => write!(f, "result assembly failed"),
            FailureKind::PollLimitReached { attempts } => {
                write!(f, "no terminal status after {attempts} polls")
            }
        }
    }
}

/// The single failure value surfaced on a tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub details: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub fn pipeline(code: &str) -> Self {
        Self::new(
            FailureKind::Pipeline {
                code: code.to_string(),
            },
            format!("processing failed with status {code}"),
        )
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
