use std::time::Duration;

use notes_core::{JobId, KnowledgeCue, NoteId, NoteWithCues, SubmissionPayload};
use notes_logging::notes_debug;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::wire::{self, CreateJobRequest, CreateJobResponse, CueWire, NoteWire, StatusResponse};
use crate::{JobCreated, StatusReport, TransportError, TransportErrorKind};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub api_prefix: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_prefix: "/api/v1".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The remote calls the tracker relies on. Every call is idempotent from the
/// tracker's point of view.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn create_job(&self, payload: &SubmissionPayload) -> Result<JobCreated, TransportError>;

    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusReport, TransportError>;

    /// Notes produced for a job; possibly empty.
    async fn fetch_notes(&self, job_id: &JobId) -> Result<Vec<NoteWithCues>, TransportError>;

    /// Knowledge cues of a note; possibly empty.
    async fn fetch_cues(&self, note_id: &NoteId) -> Result<Vec<KnowledgeCue>, TransportError>;
}

/// [`Transport`] over the learning-session JSON API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    prefix: Vec<String>,
}

impl HttpTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base = Url::parse(settings.base_url.trim())
            .map_err(|err| TransportError::new(TransportErrorKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::new(
                TransportErrorKind::InvalidUrl,
                format!("{base} cannot be used as a base url"),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(TransportErrorKind::Network, err.to_string()))?;
        let prefix = settings
            .api_prefix
            .split('/')
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Ok(Self {
            client,
            base,
            prefix,
        })
    }

    /// `{base}/{prefix}/learning_sessions/{segments}`, each segment escaped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                TransportError::new(TransportErrorKind::InvalidUrl, "base url has no path")
            })?;
            path.pop_if_empty();
            path.extend(self.prefix.iter().map(String::as_str));
            path.push("learning_sessions");
            path.extend(segments.iter().copied());
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        notes_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn create_job(&self, payload: &SubmissionPayload) -> Result<JobCreated, TransportError> {
        // Trailing empty segment: the collection route ends with a slash.
        let url = self.endpoint(&[""])?;
        notes_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(&CreateJobRequest::from_payload(payload))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: CreateJobResponse = read_json(response).await?;
        Ok(JobCreated {
            job_id: JobId(body.session_id),
            status: body
                .status
                .unwrap_or_else(|| wire::DEFAULT_CREATED_STATUS.to_string()),
        })
    }

    async fn fetch_status(&self, job_id: &JobId) -> Result<StatusReport, TransportError> {
        let url = self.endpoint(&[&job_id.0, "status"])?;
        let body: StatusResponse = self.get_json(url).await?;
        Ok(StatusReport {
            status: body.status,
            final_results: body.final_results.map(Into::into),
        })
    }

    async fn fetch_notes(&self, job_id: &JobId) -> Result<Vec<NoteWithCues>, TransportError> {
        let url = self.endpoint(&[&job_id.0, "notes"])?;
        let notes: Vec<NoteWire> = self.get_json(url).await?;
        Ok(notes.into_iter().map(Into::into).collect())
    }

    async fn fetch_cues(&self, note_id: &NoteId) -> Result<Vec<KnowledgeCue>, TransportError> {
        let url = self.endpoint(&["notes", &note_id.0, "knowledge_cues"])?;
        let cues: Vec<CueWire> = self.get_json(url).await?;
        Ok(cues.into_iter().map(Into::into).collect())
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        let message = wire::error_detail(&body)
            .unwrap_or_else(|| format!("HTTP error! Status: {status}"));
        let details = (!body.trim().is_empty()).then_some(body);
        return Err(
            TransportError::new(TransportErrorKind::HttpStatus(status.as_u16()), message)
                .with_details(details),
        );
    }
    serde_json::from_str(&body)
        .map_err(|err| TransportError::new(TransportErrorKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportErrorKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return TransportError::new(TransportErrorKind::Decode, err.to_string());
    }
    TransportError::new(TransportErrorKind::Network, err.to_string())
}
