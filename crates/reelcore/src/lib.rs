//! reelcore - download, re-host and stream-resolve media for the reel Discord bot
//!
//! This library holds everything that does not need a Discord connection:
//! link detection, yt-dlp fetching, the Streamable upload/poll client, the
//! conversion API client, persisted settings and the re-upload workflow.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors and logging
//! - `download`: Link classification and yt-dlp fetching
//! - `conversion`: Stream URL resolution through the conversion API
//! - `hosting`: Streamable upload and processing poller
//! - `storage`: SQLite-backed per-guild settings and hosting credentials
//! - `workflow`: Fetch → upload → poll orchestration per detected link

pub mod conversion;
pub mod core;
pub mod download;
pub mod hosting;
pub mod storage;
pub mod workflow;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use download::{extract_source_links, is_source_url, MediaFetcher, MediaFile, SourceLink, YtDlpFetcher};
pub use hosting::{HostingCredentials, PollConfig, ProcessingStatus, StreamableClient, UploadResult};
pub use storage::{create_pool, DbPool, SettingsStore, SqliteSettings};
pub use workflow::{IncomingMessage, JobOutcome, JobState, ReplySink, Reuploader};
