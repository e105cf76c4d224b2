//! Remote fetcher powered by yt-dlp.
//!
//! Each fetch gets its own UUID job id baked into the output template, so
//! concurrent jobs never write to the same file. yt-dlp runs as a tokio child
//! process whose stdout and stderr are drained while it runs; a child that
//! outlives the timeout is killed when its future is dropped.

use crate::core::config;
use crate::download::error::DownloadError;
use crate::download::media::MediaFile;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use url::Url;
use uuid::Uuid;

/// Anything that can turn a source URL into a local media file.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<MediaFile, DownloadError>;
}

/// Picks the most useful line of yt-dlp stderr for the log.
fn last_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| line.contains("ERROR"))
        .or_else(|| stderr.lines().rev().find(|line| !line.trim().is_empty()))
        .unwrap_or("no output")
        .trim()
        .to_string()
}

/// Lists files in `dir` whose name starts with `prefix`.
async fn job_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return found;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            found.push(entry.path());
        }
    }
    found
}

/// Removes every file belonging to a job, including `.part` leftovers.
async fn cleanup_job_files(dir: &Path, prefix: &str) {
    for path in job_files(dir, prefix).await {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::debug!("Removed partial download {}", path.display()),
            Err(e) => log::warn!("Failed to remove partial download {}: {}", path.display(), e),
        }
    }
}

/// Fetcher that shells out to the yt-dlp binary.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    bin: String,
    output_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpFetcher {
    pub fn new(bin: impl Into<String>, output_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            output_dir: output_dir.into(),
            timeout,
        }
    }

    /// Fetcher using `YTDL_BIN`, `TEMP_FILES_DIR` and the default yt-dlp timeout.
    pub fn from_config() -> Self {
        Self::new(
            config::YTDL_BIN.as_str(),
            config::TEMP_FILES_DIR.as_str(),
            config::download::ytdlp_timeout(),
        )
    }

    fn build_command(&self, url: &Url, template: &Path) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .args([
                "--no-playlist",
                "--no-progress",
                "--no-simulate",
                "--print",
                "after_move:filepath",
                "-o",
            ])
            .arg(template)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Resolves the downloaded file: the path yt-dlp printed, else a directory scan.
    async fn locate_output(&self, stdout: &str, prefix: &str) -> Option<PathBuf> {
        let printed = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|path| path.is_file());
        if printed.is_some() {
            return printed;
        }

        job_files(&self.output_dir, prefix)
            .await
            .into_iter()
            .find(|path| {
                let name = path.to_string_lossy();
                !name.ends_with(".part") && !name.ends_with(".ytdl")
            })
    }

    async fn run(&self, url: &Url, job_id: &str, prefix: &str) -> Result<MediaFile, DownloadError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let template = self.output_dir.join(format!("{}%(ext)s", prefix));
        let mut command = self.build_command(url, &template);

        log::info!("Downloading {} (job {})", url, job_id);
        let child = command
            .spawn()
            .map_err(|e| DownloadError::Process(format!("failed to start {}: {}", self.bin, e)))?;

        // drains stdout and stderr while waiting
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                log::error!("yt-dlp process timed out after {}s, killing", self.timeout.as_secs());
                return Err(DownloadError::Timeout(format!(
                    "yt-dlp process timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::debug!("yt-dlp stderr for job {}: {}", job_id, stderr);
            return Err(DownloadError::YtDlp(format!(
                "yt-dlp exited with {:?}: {}",
                output.status.code(),
                last_error_line(&stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = self.locate_output(&stdout, prefix).await.ok_or_else(|| {
            DownloadError::FileNotFound(format!("no output file for job {} in {}", job_id, self.output_dir.display()))
        })?;
        let size_bytes = tokio::fs::metadata(&path).await?.len();

        log::info!(
            "Video downloaded successfully: {} ({} bytes, job {})",
            path.display(),
            size_bytes,
            job_id
        );
        Ok(MediaFile::new(path, size_bytes))
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &Url) -> Result<MediaFile, DownloadError> {
        let job_id = Uuid::new_v4().simple().to_string();
        let prefix = format!("reel_{}.", job_id);

        let result = self.run(url, &job_id, &prefix).await;
        if let Err(e) = &result {
            log::error!("Error downloading video {} [{}]: {}", url, e.subcategory(), e);
            cleanup_job_files(&self.output_dir, &prefix).await;
        }
        result
    }
}

/// Returns the installed yt-dlp version string.
pub async fn ytdlp_version(bin: &str) -> Result<String, DownloadError> {
    let output = timeout(Duration::from_secs(10), Command::new(bin).arg("--version").output())
        .await
        .map_err(|_| DownloadError::Timeout(format!("{} --version timed out", bin)))?
        .map_err(|e| DownloadError::Process(format!("failed to run {}: {}", bin, e)))?;

    if !output.status.success() {
        return Err(DownloadError::YtDlp(format!(
            "{} --version exited with {:?}",
            bin,
            output.status.code()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
