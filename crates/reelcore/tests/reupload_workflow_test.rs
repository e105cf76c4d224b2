//! Integration tests for the re-upload workflow
//!
//! The fetcher is faked (no yt-dlp), Streamable is a wiremock server and the
//! settings live in a throwaway SQLite file.
//!
//! Run with: cargo test --test reupload_workflow_test

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reelcore::download::{DownloadError, MediaFetcher, MediaFile};
use reelcore::storage::{create_pool, SettingsStore, SqliteSettings};
use reelcore::workflow::{IncomingMessage, JobState, ReplySink, Reuploader};
use reelcore::{AppResult, PollConfig, StreamableClient};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GUILD: u64 = 1_000_000_001;

/// Writes a small file per fetch; URLs containing "broken" fail like yt-dlp would.
struct FakeFetcher {
    dir: PathBuf,
    calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    created: Mutex<Vec<PathBuf>>,
}

impl FakeFetcher {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            calls: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<MediaFile, DownloadError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_string());

        if url.as_str().contains("broken") {
            return Err(DownloadError::YtDlp("ERROR: [TikTok] broken: Unable to extract".to_string()));
        }

        let path = self.dir.join(format!("reel_{}.mp4", n));
        std::fs::write(&path, b"fake video").unwrap();
        self.created.lock().unwrap().push(path.clone());
        Ok(MediaFile::new(path, 10))
    }
}

#[derive(Default)]
struct RecordingSink {
    replies: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn reply(&self, text: &str) -> AppResult<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct Harness {
    server: MockServer,
    fetcher: Arc<FakeFetcher>,
    settings: Arc<SqliteSettings>,
    reuploader: Reuploader,
    _dir: tempfile::TempDir,
}

impl Harness {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;

        let pool = create_pool(dir.path().join("settings.sqlite").to_str().unwrap()).unwrap();
        let settings = Arc::new(SqliteSettings::new(pool));
        let fetcher = Arc::new(FakeFetcher::new(dir.path().to_path_buf()));
        let host = StreamableClient::with_client(reqwest::Client::new(), server.uri(), "https://streamable.com");

        let reuploader = Reuploader::new(fetcher.clone(), host, settings.clone(), "tiktok.com").with_poll_config(
            PollConfig {
                interval: Duration::from_millis(10),
                timeout: Duration::from_secs(5),
                max_attempts: 5,
            },
        );

        Self {
            server,
            fetcher,
            settings,
            reuploader,
            _dir: dir,
        }
    }

    async fn enable_with_credentials(&self) {
        assert!(self.settings.toggle_uploader(GUILD).await.unwrap());
        self.settings
            .set_hosting_credentials("bot@example.com", &SecretString::from("pw".to_string()))
            .await
            .unwrap();
    }

    async fn mock_upload_ok(&self, shortcode: &str, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "shortcode": shortcode })))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    async fn mock_ready(&self, shortcode: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/videos/{}", shortcode)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "thumbnail_url": "//cdn/t.jpg" })))
            .mount(&self.server)
            .await;
    }
}

fn guild_message(content: &str) -> IncomingMessage {
    IncomingMessage {
        guild_id: Some(GUILD),
        author_is_bot: false,
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_disabled_uploader_never_fetches() {
    let harness = Harness::new().await;
    harness.mock_upload_ok("never", 0).await;
    let sink = RecordingSink::default();

    let outcomes = harness
        .reuploader
        .handle_message(&guild_message("https://www.tiktok.com/@a/video/1"), &sink)
        .await;

    assert!(outcomes.is_empty());
    assert_eq!(harness.fetcher.calls(), 0);
    assert!(sink.replies().is_empty());
}

#[tokio::test]
async fn test_single_link_is_uploaded_and_announced() {
    let harness = Harness::new().await;
    harness.enable_with_credentials().await;
    harness.mock_upload_ok("abc123", 1).await;
    harness.mock_ready("abc123").await;
    let sink = RecordingSink::default();

    let outcomes = harness
        .reuploader
        .handle_message(&guild_message("lol https://vm.tiktok.com/ZM1/"), &sink)
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state, JobState::Notified);
    assert_eq!(outcomes[0].hosted_url.as_deref(), Some("https://streamable.com/abc123"));
    assert_eq!(sink.replies(), vec!["Video uploaded to Streamable: https://streamable.com/abc123"]);

    for path in harness.fetcher.created.lock().unwrap().iter() {
        assert!(!path.exists(), "temp file {} was not removed", path.display());
    }
}

#[tokio::test]
async fn test_links_run_in_order_and_failure_does_not_stop_the_next() {
    let harness = Harness::new().await;
    harness.enable_with_credentials().await;
    harness.mock_upload_ok("second", 1).await;
    harness.mock_ready("second").await;
    let sink = RecordingSink::default();

    let outcomes = harness
        .reuploader
        .handle_message(
            &guild_message("https://www.tiktok.com/@a/video/broken then https://www.tiktok.com/@b/video/2"),
            &sink,
        )
        .await;

    let states: Vec<JobState> = outcomes.iter().map(|o| o.state).collect();
    assert_eq!(states, vec![JobState::Failed, JobState::Notified]);
    assert_eq!(
        *harness.fetcher.fetched.lock().unwrap(),
        vec![
            "https://www.tiktok.com/@a/video/broken".to_string(),
            "https://www.tiktok.com/@b/video/2".to_string(),
        ]
    );

    let replies = sink.replies();
    assert_eq!(replies.len(), 2);
    assert!(replies[0].starts_with("Failed to download video"));
    assert_eq!(replies[1], "Video uploaded to Streamable: https://streamable.com/second");
}

#[tokio::test]
async fn test_missing_credentials_fails_without_upload() {
    let harness = Harness::new().await;
    assert!(harness.settings.toggle_uploader(GUILD).await.unwrap());
    harness.mock_upload_ok("never", 0).await;
    let sink = RecordingSink::default();

    let outcomes = harness
        .reuploader
        .handle_message(&guild_message("https://tiktok.com/@a/video/3"), &sink)
        .await;

    assert_eq!(outcomes[0].state, JobState::Failed);
    assert_eq!(harness.fetcher.calls(), 1);
    assert!(sink.replies()[0].contains("credentials are not set"));
    for path in harness.fetcher.created.lock().unwrap().iter() {
        assert!(!path.exists());
    }
}

#[tokio::test]
async fn test_upload_rejection_reports_once_and_cleans_up() {
    let harness = Harness::new().await;
    harness.enable_with_credentials().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&harness.server)
        .await;
    let sink = RecordingSink::default();

    let outcomes = harness
        .reuploader
        .handle_message(&guild_message("https://www.tiktok.com/@a/video/4"), &sink)
        .await;

    assert_eq!(outcomes[0].state, JobState::Failed);
    assert_eq!(sink.replies(), vec!["Failed to upload video to Streamable."]);
    for path in harness.fetcher.created.lock().unwrap().iter() {
        assert!(!path.exists());
    }
}

#[tokio::test]
async fn test_status_query_failure_is_reported() {
    let harness = Harness::new().await;
    harness.enable_with_credentials().await;
    harness.mock_upload_ok("gone", 1).await;
    Mock::given(method("GET"))
        .and(path("/videos/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&harness.server)
        .await;
    let sink = RecordingSink::default();

    let outcomes = harness
        .reuploader
        .handle_message(&guild_message("https://www.tiktok.com/@a/video/5"), &sink)
        .await;

    assert_eq!(outcomes[0].state, JobState::Failed);
    assert_eq!(sink.replies(), vec!["Failed to retrieve video information from Streamable."]);
}

#[tokio::test]
async fn test_bot_authors_and_direct_messages_are_ignored() {
    let harness = Harness::new().await;
    harness.enable_with_credentials().await;
    let sink = RecordingSink::default();

    let from_bot = IncomingMessage {
        author_is_bot: true,
        ..guild_message("https://www.tiktok.com/@a/video/6")
    };
    let direct = IncomingMessage {
        guild_id: None,
        ..guild_message("https://www.tiktok.com/@a/video/7")
    };

    assert!(harness.reuploader.handle_message(&from_bot, &sink).await.is_empty());
    assert!(harness.reuploader.handle_message(&direct, &sink).await.is_empty());
    assert_eq!(harness.fetcher.calls(), 0);
}
