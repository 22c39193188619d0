mod config;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use notes_core::{Phase, SubmissionPayload, TextFormat, TrackingSession};
use notes_engine::{HttpTransport, ProgressController};
use notes_logging::notes_info;

use crate::config::{CliConfig, Overrides, DEFAULT_CONFIG_FILENAME};

#[derive(Parser, Debug)]
#[command(name = "notes_cli")]
#[command(about = "Submit a video or transcript and follow study-note generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Video URL to process
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    url: Option<String>,

    /// Transcript file to process instead of a video
    #[arg(long, value_name = "PATH")]
    text_file: Option<PathBuf>,

    /// Treat the transcript as plain text (default: timestamped)
    #[arg(long, requires = "text_file")]
    plain: bool,

    /// Title hint for the generated notes
    #[arg(long)]
    title: Option<String>,

    /// What you want to learn from the source
    #[arg(long)]
    objectives: Option<String>,

    /// RON config file (default: ./notes_cli.ron when present)
    #[arg(long, value_name = "RON")]
    config: Option<PathBuf>,

    /// Service base URL, e.g. http://127.0.0.1:8000
    #[arg(long)]
    base_url: Option<String>,

    /// Delay between status checks in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Give up after this many status checks without a result
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Write logs to this file instead of the terminal
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn payload(&self) -> Result<SubmissionPayload> {
        let mut payload = match (&self.url, &self.text_file) {
            (Some(url), _) => SubmissionPayload::media_url(url.as_str()),
            (None, Some(path)) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read transcript {path:?}"))?;
                let format = if self.plain {
                    TextFormat::Plain
                } else {
                    TextFormat::Timestamped
                };
                SubmissionPayload::text(text, format)
            }
            (None, None) => anyhow::bail!("either --url or --text-file is required"),
        };
        if let Some(title) = &self.title {
            payload = payload.with_title(title.as_str());
        }
        if let Some(objectives) = &self.objectives {
            payload = payload.with_learning_objectives(objectives.as_str());
        }
        Ok(payload)
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            poll_interval_ms: self.interval_ms,
            max_poll_attempts: self.max_attempts,
            log_file: self.log_file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let mut config = CliConfig::load(&config_path)?;
    config.apply(cli.overrides());

    let (destination, level) = config.log_target()?;
    notes_logging::initialize(destination, level);
    if config_path.exists() {
        notes_info!("Loaded config from {:?}", config_path);
    }

    let payload = cli.payload()?;
    let transport = HttpTransport::new(config.transport_settings())
        .with_context(|| format!("invalid service address {:?}", config.base_url))?;
    let controller = ProgressController::new(Arc::new(transport), config.tracker_settings());

    let session = follow(&controller, payload).await;
    Ok(report(&session))
}

/// Submits and prints a line for every status change until the session settles.
async fn follow(controller: &ProgressController, payload: SubmissionPayload) -> TrackingSession {
    let started = Instant::now();
    let mut rx = controller.subscribe();
    let cycle = controller.submit(payload).await;
    notes_info!("Tracking cycle {}", cycle);

    let mut last_code: Option<String> = None;
    let mut announced_job = false;
    loop {
        let session = rx.borrow_and_update().clone();
        if !announced_job {
            if let Some(job) = session.job() {
                println!("Job {} submitted", job.job_id);
                announced_job = true;
            }
        }
        if let Some(status) = session.latest_status() {
            if last_code.as_deref() != Some(status.code()) {
                println!("{}", render::status_line(started.elapsed(), status.code()));
                last_code = Some(status.code().to_string());
            }
        }
        if session.is_settled() {
            return session;
        }
        if rx.changed().await.is_err() {
            return controller.snapshot();
        }
    }
}

fn report(session: &TrackingSession) -> ExitCode {
    match session.phase() {
        Phase::Succeeded(bundle) => {
            println!("\n{}", render::result(bundle));
            ExitCode::SUCCESS
        }
        Phase::Failed(failure) => {
            eprintln!("{}", render::failure(failure));
            ExitCode::FAILURE
        }
        other => {
            eprintln!("Stopped while {}", other.name());
            ExitCode::FAILURE
        }
    }
}
