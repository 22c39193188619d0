#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use notes_core::{
    FinalResults, JobId, KnowledgeCue, Note, NoteId, NoteWithCues, SubmissionPayload,
};
use notes_engine::{JobCreated, StatusReport, Transport, TransportError, TransportErrorKind};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(notes_logging::initialize_for_tests);
}

pub fn note(id: &str, markdown: &str) -> Note {
    Note {
        note_id: NoteId::from(id),
        markdown_content: markdown.to_string(),
        ..Note::default()
    }
}

pub fn cue(id: &str, note_id: &str) -> KnowledgeCue {
    KnowledgeCue {
        cue_id: id.to_string(),
        note_id: NoteId::from(note_id),
        question: format!("question {id}"),
        answer: format!("answer {id}"),
        difficulty: notes_core::Difficulty::Medium,
        source_reference: None,
    }
}

pub fn status(code: &str) -> Result<StatusReport, TransportError> {
    Ok(StatusReport {
        status: code.to_string(),
        final_results: None,
    })
}

pub fn complete_with(notes: Vec<NoteWithCues>) -> Result<StatusReport, TransportError> {
    Ok(StatusReport {
        status: "all_processing_complete".to_string(),
        final_results: Some(FinalResults {
            title: Some("Generated title".to_string()),
            notes,
            transcript: None,
        }),
    })
}

pub fn http_error(code: u16, message: &str) -> TransportError {
    TransportError {
        kind: TransportErrorKind::HttpStatus(code),
        message: message.to_string(),
        details: None,
    }
}

/// In-memory transport answering from per-job scripts and counting calls.
#[derive(Default)]
pub struct ScriptedTransport {
    created: Mutex<VecDeque<Result<JobCreated, TransportError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<StatusReport, TransportError>>>>,
    status_delays: Mutex<HashMap<String, Duration>>,
    create_delays: Mutex<HashMap<String, Duration>>,
    notes_delay: Mutex<Option<Duration>>,
    notes: Mutex<Option<Result<Vec<NoteWithCues>, TransportError>>>,
    cues: Mutex<Option<Result<Vec<KnowledgeCue>, TransportError>>>,
    pub create_calls: AtomicUsize,
    pub notes_calls: AtomicUsize,
    pub cues_calls: AtomicUsize,
    status_calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(self, job_id: &str) -> Self {
        self.created.lock().unwrap().push_back(Ok(JobCreated {
            job_id: JobId::from(job_id),
            status: "processing_initiated".to_string(),
        }));
        self
    }

    pub fn create_fails(self, err: TransportError) -> Self {
        self.created.lock().unwrap().push_back(Err(err));
        self
    }

    /// Status replies for a job; the last one repeats forever.
    pub fn statuses(
        self,
        job_id: &str,
        replies: Vec<Result<StatusReport, TransportError>>,
    ) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(job_id.to_string(), replies.into());
        self
    }

    pub fn status_delay(self, job_id: &str, delay: Duration) -> Self {
        self.status_delays
            .lock()
            .unwrap()
            .insert(job_id.to_string(), delay);
        self
    }

    /// Holds back the creation reply for `job_id`.
    pub fn create_delay(self, job_id: &str, delay: Duration) -> Self {
        self.create_delays
            .lock()
            .unwrap()
            .insert(job_id.to_string(), delay);
        self
    }

    pub fn notes_delay(self, delay: Duration) -> Self {
        *self.notes_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn notes(self, notes: Result<Vec<NoteWithCues>, TransportError>) -> Self {
        *self.notes.lock().unwrap() = Some(notes);
        self
    }

    pub fn cues(self, cues: Result<Vec<KnowledgeCue>, TransportError>) -> Self {
        *self.cues.lock().unwrap() = Some(cues);
        self
    }

    pub fn status_calls(&self, job_id: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn dependent_calls(&self) -> usize {
        self.notes_calls.load(Ordering::SeqCst) + self.cues_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn create_job(&self, _payload: &SubmissionPayload) -> Result<JobCreated, TransportError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.created.lock().unwrap().pop_front();
        let delay = match &next {
            Some(Ok(created)) => self
                .create_delays
                .lock()
                .unwrap()
                .get(&created.job_id.0)
                .copied(),
            _ => None,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        next.unwrap_or_else(|| Err(http_error(500, "no scripted job")))
    }

    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusReport, TransportError> {
        *self
            .status_calls
            .lock()
            .unwrap()
            .entry(job_id.0.clone())
            .or_default() += 1;
        let delay = self.status_delays.lock().unwrap().get(&job_id.0).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut statuses = self.statuses.lock().unwrap();
        let Some(queue) = statuses.get_mut(&job_id.0) else {
            return Err(http_error(404, "unknown job"));
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(http_error(404, "no status")))
        }
    }

    async fn fetch_notes(&self, _job_id: &JobId) -> Result<Vec<NoteWithCues>, TransportError> {
        self.notes_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.notes_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.notes.lock().unwrap().clone().unwrap_or(Ok(Vec::new()))
    }

    async fn fetch_cues(&self, _note_id: &NoteId) -> Result<Vec<KnowledgeCue>, TransportError> {
        self.cues_calls.fetch_add(1, Ordering::SeqCst);
        self.cues.lock().unwrap().clone().unwrap_or(Ok(Vec::new()))
    }
}
