use std::path::{Path, PathBuf};

/// A transient downloaded video on local disk.
///
/// Exactly one owner at a time: the fetcher creates it, the upload coordinator
/// consumes it and calls [`MediaFile::remove`]. If a job is abandoned while the
/// file is still owned (panic, shutdown), `Drop` deletes it.
#[derive(Debug)]
pub struct MediaFile {
    path: PathBuf,
    size_bytes: u64,
    removed: bool,
}

impl MediaFile {
    pub fn new(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            size_bytes,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File name used for the upload form, falls back to `video.mp4`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string())
    }

    /// Keeps the file on disk and hands its path to the caller.
    pub fn keep(mut self) -> PathBuf {
        self.removed = true;
        std::mem::take(&mut self.path)
    }

    /// Deletes the file from disk. Missing files are not an error.
    pub async fn remove(mut self) {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => log::info!("Temporary file deleted: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to delete temporary file {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for MediaFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if std::fs::remove_file(&self.path).is_ok() {
            log::info!("Abandoned temporary file deleted: {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reel_job.mp4");
        std::fs::write(&path, b"video").unwrap();

        let file = MediaFile::new(path.clone(), 5);
        assert_eq!(file.file_name(), "reel_job.mp4");
        file.remove().await;

        assert!(!path.exists());
    }

    #[test]
    fn test_keep_leaves_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reel_keep.mp4");
        std::fs::write(&path, b"video").unwrap();

        let kept = MediaFile::new(path.clone(), 5).keep();

        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn test_drop_deletes_abandoned_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reel_job.webm");
        std::fs::write(&path, b"video").unwrap();

        drop(MediaFile::new(path.clone(), 5));

        assert!(!path.exists());
    }
}
