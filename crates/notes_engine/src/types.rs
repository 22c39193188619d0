use std::fmt;

use notes_core::{FinalResults, JobId};
use thiserror::Error;

/// Response to a successful job creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCreated {
    pub job_id: JobId,
    pub status: String,
}

/// One status poll.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: String,
    pub final_results: Option<FinalResults>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// Raw response body, when the server sent one.
    pub details: Option<String>,
}

impl TransportError {
    pub(crate) fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub fn http_status(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::InvalidUrl => write!(f, "invalid url"),
            TransportErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Decode => write!(f, "undecodable response"),
            TransportErrorKind::Network => write!(f, "network error"),
        }
    }
}
