use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Reads an environment variable, treating unset and blank values the same.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Discord bot token
/// Read from DISCORD_TOKEN environment variable
pub static DISCORD_TOKEN: Lazy<String> = Lazy::new(|| non_empty_var("DISCORD_TOKEN").unwrap_or_default());

/// Prefix for text commands (`!yt`, `!toggle_video_uploader`, ...)
/// Read from COMMAND_PREFIX environment variable
/// Default: !
pub static COMMAND_PREFIX: Lazy<String> =
    Lazy::new(|| non_empty_var("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string()));

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| non_empty_var("YTDL_BIN").unwrap_or_else(|| "yt-dlp".to_string()));

/// Directory for transient downloads, removed after each upload attempt
/// Read from TEMP_FILES_DIR environment variable
/// Defaults to the system temp directory, supports tilde (~) expansion
pub static TEMP_FILES_DIR: Lazy<String> = Lazy::new(|| {
    non_empty_var("TEMP_FILES_DIR")
        .map(|raw| expand_path(&raw))
        .unwrap_or_else(|| env::temp_dir().to_string_lossy().into_owned())
});

/// Expands a leading `~` to the home directory.
pub fn expand_path(raw: &str) -> String {
    shellexpand::tilde(raw).into_owned()
}

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: reel.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| non_empty_var("DATABASE_PATH").unwrap_or_else(|| "reel.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: reel.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| non_empty_var("LOG_FILE_PATH").unwrap_or_else(|| "reel.log".to_string()));

/// Domain whose links get re-uploaded (subdomains included)
/// Read from SOURCE_DOMAIN environment variable
/// Default: tiktok.com
pub static SOURCE_DOMAIN: Lazy<String> =
    Lazy::new(|| non_empty_var("SOURCE_DOMAIN").unwrap_or_else(|| "tiktok.com".to_string()));

/// Command the external music bot listens to; resolved stream URLs are handed to it
/// Read from PLAY_COMMAND environment variable
/// Default: !play
pub static PLAY_COMMAND: Lazy<String> =
    Lazy::new(|| non_empty_var("PLAY_COMMAND").unwrap_or_else(|| "!play".to_string()));

/// Discord user ID of the music bot expected to act on `PLAY_COMMAND`
/// Read from MUSIC_BOT_ID environment variable, mentioned in the `yt` reply when set
pub static MUSIC_BOT_ID: Lazy<Option<u64>> =
    Lazy::new(|| non_empty_var("MUSIC_BOT_ID").and_then(|raw| raw.parse().ok()));

/// Owner configuration
pub mod owner {
    use once_cell::sync::Lazy;

    pub(crate) fn parse_owner_ids(raw: &str) -> Vec<u64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<u64>().ok())
            .collect()
    }

    /// Discord user IDs allowed to run owner-only commands (comma-separated)
    /// Read from OWNER_IDS environment variable, in addition to the application owner
    pub static OWNER_IDS: Lazy<Vec<u64>> = Lazy::new(|| {
        std::env::var("OWNER_IDS")
            .ok()
            .map(|raw| parse_owner_ids(&raw))
            .unwrap_or_default()
    });
}

/// Conversion API configuration
pub mod conversion {
    use super::{non_empty_var, Duration};
    use once_cell::sync::Lazy;

    /// Conversion endpoint
    /// Read from CONVERSION_API_URL environment variable
    pub static API_URL: Lazy<String> = Lazy::new(|| {
        non_empty_var("CONVERSION_API_URL").unwrap_or_else(|| "https://api.cobalt.tools/api/json".to_string())
    });

    /// Conversion API flavour: "cobalt" (POST JSON) or "needdl" (GET query)
    /// Read from CONVERSION_API_KIND environment variable
    pub static API_KIND: Lazy<String> =
        Lazy::new(|| non_empty_var("CONVERSION_API_KIND").unwrap_or_else(|| "cobalt".to_string()));

    /// Timeout for a single conversion request (in seconds)
    pub const TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}

/// Streamable hosting configuration
pub mod hosting {
    use super::non_empty_var;
    use once_cell::sync::Lazy;

    /// Base URL of the Streamable API (upload + status endpoints)
    /// Read from STREAMABLE_API_URL environment variable
    pub static API_URL: Lazy<String> =
        Lazy::new(|| non_empty_var("STREAMABLE_API_URL").unwrap_or_else(|| "https://api.streamable.com".to_string()));

    /// Base URL used to build public links from shortcodes
    /// Read from STREAMABLE_PUBLIC_URL environment variable
    pub static PUBLIC_URL: Lazy<String> =
        Lazy::new(|| non_empty_var("STREAMABLE_PUBLIC_URL").unwrap_or_else(|| "https://streamable.com".to_string()));
}

/// Processing poller configuration
pub mod poll {
    use super::Duration;

    /// Delay between status queries (in seconds)
    pub const INTERVAL_SECS: u64 = 5;

    /// Upper bound on total time spent waiting for processing (in seconds)
    pub const TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Upper bound on status queries per video
    pub const MAX_ATTEMPTS: u32 = 180;

    pub fn interval() -> Duration {
        Duration::from_secs(INTERVAL_SECS)
    }

    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for yt-dlp commands (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 240; // 4 minutes

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Large so that video uploads on slow links can finish
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
