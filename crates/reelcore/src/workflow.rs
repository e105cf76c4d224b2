//! Re-upload workflow: source link → yt-dlp → Streamable → reply.
//!
//! Per detected link the job moves through
//! `Detected -> Fetching -> Uploading -> Polling -> {Notified | Failed}`.
//! Links of one message are processed one after another in message order, and
//! every link gets at most one reply. A failed job never stops the next one.

use crate::core::error::{AppError, AppResult};
use crate::download::{extract_source_links, DownloadError, MediaFetcher, SourceLink};
use crate::hosting::{PollConfig, ProcessingStatus, StreamableClient, UploadResult};
use crate::storage::SettingsStore;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

/// Transport-neutral view of a chat message.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub author_is_bot: bool,
    pub content: String,
}

/// Where job replies go; the Discord adapter replies to the original message.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply(&self, text: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Detected,
    Fetching,
    Uploading,
    Polling,
    Notified,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Detected => "detected",
            JobState::Fetching => "fetching",
            JobState::Uploading => "uploading",
            JobState::Polling => "polling",
            JobState::Notified => "notified",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Final state of one link's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub url: Url,
    /// `Notified` or `Failed`
    pub state: JobState,
    pub hosted_url: Option<String>,
    /// Reply text sent for a failed job
    pub error: Option<String>,
}

/// Why a job ended in `Failed`.
#[derive(Debug)]
enum JobFailure {
    Fetch(DownloadError),
    MissingCredentials,
    Settings(AppError),
    Upload(String),
    Processing(ProcessingStatus),
}

impl JobFailure {
    /// Short text for the chat; details stay in the log.
    fn user_message(&self) -> String {
        match self {
            JobFailure::Fetch(e) => format!("Failed to download video: {}.", e.user_summary()),
            JobFailure::MissingCredentials => {
                "Streamable credentials are not set. Ask the bot owner to run set_streamable_credentials.".to_string()
            }
            JobFailure::Settings(_) => "Could not read the uploader settings.".to_string(),
            JobFailure::Upload(_) => "Failed to upload video to Streamable.".to_string(),
            JobFailure::Processing(ProcessingStatus::TimedOut { attempts }) => format!(
                "Streamable did not finish processing the video after {} checks.",
                attempts
            ),
            JobFailure::Processing(ProcessingStatus::Cancelled) => {
                "Upload cancelled because the bot is shutting down.".to_string()
            }
            JobFailure::Processing(_) => "Failed to retrieve video information from Streamable.".to_string(),
        }
    }

    fn detail(&self) -> String {
        match self {
            JobFailure::Fetch(e) => format!("[{}] {}", e.subcategory(), e),
            JobFailure::MissingCredentials => "no hosting credentials stored".to_string(),
            JobFailure::Settings(e) => e.to_string(),
            JobFailure::Upload(reason) => reason.clone(),
            JobFailure::Processing(status) => format!("{:?}", status),
        }
    }
}

/// Orchestrates the re-upload of source links found in chat messages.
pub struct Reuploader {
    fetcher: Arc<dyn MediaFetcher>,
    host: StreamableClient,
    settings: Arc<dyn SettingsStore>,
    source_domain: String,
    poll: PollConfig,
    shutdown: CancellationToken,
}

impl Reuploader {
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        host: StreamableClient,
        settings: Arc<dyn SettingsStore>,
        source_domain: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            host,
            settings,
            source_domain: source_domain.into(),
            poll: PollConfig::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Token cancelled on shutdown; in-flight polls end as `Cancelled`.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn source_domain(&self) -> &str {
        &self.source_domain
    }

    /// Entry point for every chat message.
    ///
    /// Returns one outcome per processed link; empty when the message is ignored
    /// (bot author, direct message, no links, uploader disabled).
    pub async fn handle_message(&self, msg: &IncomingMessage, sink: &dyn ReplySink) -> Vec<JobOutcome> {
        if msg.author_is_bot {
            return Vec::new();
        }

        let links = extract_source_links(&msg.content, &self.source_domain);
        if links.is_empty() {
            return Vec::new();
        }

        let Some(guild_id) = msg.guild_id else {
            log::debug!("Ignoring {} source link(s) in a direct message", links.len());
            return Vec::new();
        };

        match self.settings.deployment(guild_id).await {
            Ok(config) if config.uploader_enabled => {}
            Ok(_) => return Vec::new(),
            Err(e) => {
                log::error!("Failed to read settings for guild {}: {}", guild_id, e);
                return Vec::new();
            }
        }

        let mut outcomes = Vec::with_capacity(links.len());
        for link in &links {
            outcomes.push(self.run_link(link, sink).await);
        }
        outcomes
    }

    /// Runs one job to completion and sends its single reply.
    pub async fn run_link(&self, link: &SourceLink, sink: &dyn ReplySink) -> JobOutcome {
        let job_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        log::info!("Job {} {}: {}", job_id, JobState::Detected, link.url);

        let (outcome, reply) = match self.process(&job_id, link).await {
            Ok(hosted_url) => {
                log::info!("Job {} {}: {}", job_id, JobState::Notified, hosted_url);
                let reply = format!("Video uploaded to Streamable: {}", hosted_url);
                let outcome = JobOutcome {
                    url: link.url.clone(),
                    state: JobState::Notified,
                    hosted_url: Some(hosted_url),
                    error: None,
                };
                (outcome, reply)
            }
            Err(failure) => {
                log::error!("Job {} {}: {} ({})", job_id, JobState::Failed, link.url, failure.detail());
                let reply = failure.user_message();
                let outcome = JobOutcome {
                    url: link.url.clone(),
                    state: JobState::Failed,
                    hosted_url: None,
                    error: Some(reply.clone()),
                };
                (outcome, reply)
            }
        };

        if let Err(e) = sink.reply(&reply).await {
            log::warn!("Job {}: failed to send reply: {}", job_id, e);
        }
        outcome
    }

    async fn process(&self, job_id: &str, link: &SourceLink) -> Result<String, JobFailure> {
        log::info!("Job {} {}", job_id, JobState::Fetching);
        let media = self.fetcher.fetch(&link.url).await.map_err(JobFailure::Fetch)?;

        log::info!("Job {} {}", job_id, JobState::Uploading);
        // Read fresh so a credentials change applies to the very next upload;
        // the early returns drop `media`, which deletes the file.
        let creds = match self.settings.hosting_credentials().await {
            Ok(Some(creds)) => creds,
            Ok(None) => return Err(JobFailure::MissingCredentials),
            Err(e) => return Err(JobFailure::Settings(e)),
        };

        let shortcode = match self.host.upload(media, &creds).await {
            UploadResult::Success { shortcode, .. } => shortcode,
            UploadResult::Failure { reason } => return Err(JobFailure::Upload(reason)),
        };

        log::info!("Job {} {}: {}", job_id, JobState::Polling, shortcode);
        match self.host.poll_until_ready(&shortcode, &self.poll, &self.shutdown).await {
            ProcessingStatus::Ready { .. } => Ok(self.host.hosted_url(&shortcode)),
            other => Err(JobFailure::Processing(other)),
        }
    }
}
