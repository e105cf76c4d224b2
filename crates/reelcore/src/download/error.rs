use std::fmt;

/// Structured error type for fetch operations.
///
/// Categorized so the log line and the short user-facing summary can differ.
#[derive(Debug)]
pub enum DownloadError {
    /// yt-dlp specific failures (bad exit code, unsupported URL, extractor error)
    YtDlp(String),
    /// Expected file not found after yt-dlp reported success
    FileNotFound(String),
    /// Download timed out and the process was killed
    Timeout(String),
    /// Process execution failure (spawn error, binary missing)
    Process(String),
    /// Catch-all for uncategorized errors
    Other(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::YtDlp(_) => "ytdlp",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Process(_) => "process",
            DownloadError::Other(_) => "other",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::YtDlp(msg)
            | DownloadError::FileNotFound(msg)
            | DownloadError::Timeout(msg)
            | DownloadError::Process(msg)
            | DownloadError::Other(msg) => msg,
        }
    }

    /// Short text safe to show in chat; the full message goes to the log.
    pub fn user_summary(&self) -> &'static str {
        match self {
            DownloadError::YtDlp(_) => "the video could not be downloaded",
            DownloadError::FileNotFound(_) => "the downloaded video went missing",
            DownloadError::Timeout(_) => "the download took too long",
            DownloadError::Process(_) | DownloadError::Other(_) => "the downloader is unavailable",
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        DownloadError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        let err = DownloadError::YtDlp("yt-dlp failed".into());
        assert_eq!(err.to_string(), "yt-dlp failed");
    }

    #[test]
    fn test_download_error_subcategory() {
        assert_eq!(DownloadError::YtDlp("".into()).subcategory(), "ytdlp");
        assert_eq!(DownloadError::Timeout("".into()).subcategory(), "timeout");
        assert_eq!(DownloadError::Process("".into()).subcategory(), "process");
        assert_eq!(DownloadError::Other("".into()).subcategory(), "other");
    }

    #[test]
    fn test_user_summary_hides_details() {
        let err = DownloadError::YtDlp("ERROR: [TikTok] 7300: cookie /home/bot/.cache leaked".into());
        assert!(!err.user_summary().contains("/home"));
    }
}
