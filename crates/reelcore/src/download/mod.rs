//! Link classification and media fetching
//!
//! - `link` — decides which URLs in a chat message belong to the source domain
//! - `ytdlp` — downloads a source URL into a transient `MediaFile` via yt-dlp

pub mod error;
pub mod link;
pub mod media;
pub mod ytdlp;

pub use error::DownloadError;
pub use link::{extract_source_links, is_source_url, SourceLink};
pub use media::MediaFile;
pub use ytdlp::{ytdlp_version, MediaFetcher, YtDlpFetcher};
