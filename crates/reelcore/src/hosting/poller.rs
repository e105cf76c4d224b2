//! Waits for Streamable to finish processing an upload.
//!
//! Streamable answers `GET /videos/<shortcode>` with 200 while processing; the
//! video is ready once the body carries a `thumbnail_url`. The loop is bounded by
//! both a deadline and an attempt cap, and each wait is a cooperative tokio sleep.

use super::StreamableClient;
use crate::core::config;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Bounds for the status polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two status queries
    pub interval: Duration,
    /// Total time budget, measured from the first query
    pub timeout: Duration,
    /// Maximum number of status queries
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: config::poll::interval(),
            timeout: config::poll::timeout(),
            max_attempts: config::poll::MAX_ATTEMPTS,
        }
    }
}

/// Processing state of a hosted video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Ready { thumbnail_url: String },
    QueryFailed { reason: String },
    TimedOut { attempts: u32 },
    Cancelled,
}

impl ProcessingStatus {
    /// Everything except `Pending` ends the loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessingStatus::Pending)
    }
}

#[derive(Deserialize)]
struct VideoStatusResponse {
    thumbnail_url: Option<String>,
}

impl StreamableClient {
    /// Single status query.
    pub async fn query_status(&self, shortcode: &str) -> ProcessingStatus {
        let response = match self.http.get(self.status_endpoint(shortcode)).send().await {
            Ok(response) => response,
            Err(e) => {
                return ProcessingStatus::QueryFailed {
                    reason: format!("status request failed: {}", e),
                }
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Streamable status for {} returned {}: {}", shortcode, status, body);
            return ProcessingStatus::QueryFailed {
                reason: format!("status query returned HTTP {}", status),
            };
        }

        match response.json::<VideoStatusResponse>().await {
            Ok(VideoStatusResponse {
                thumbnail_url: Some(thumbnail_url),
            }) if !thumbnail_url.is_empty() => ProcessingStatus::Ready { thumbnail_url },
            Ok(_) => ProcessingStatus::Pending,
            Err(e) => ProcessingStatus::QueryFailed {
                reason: format!("unreadable status response: {}", e),
            },
        }
    }

    /// Polls until the video is ready, a query fails, the bounds run out or `cancel` fires.
    pub async fn poll_until_ready(
        &self,
        shortcode: &str,
        config: &PollConfig,
        cancel: &CancellationToken,
    ) -> ProcessingStatus {
        let deadline = Instant::now() + config.timeout;
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return ProcessingStatus::Cancelled;
            }

            attempts += 1;
            let status = self.query_status(shortcode).await;
            if status.is_terminal() {
                log::info!("Streamable video {} finished polling after {} queries: {:?}", shortcode, attempts, status);
                return status;
            }

            if attempts >= config.max_attempts || Instant::now() + config.interval > deadline {
                log::warn!("Gave up waiting for Streamable video {} after {} queries", shortcode, attempts);
                return ProcessingStatus::TimedOut { attempts };
            }

            log::debug!("Streamable video {} still processing, waiting {:?}", shortcode, config.interval);
            tokio::select! {
                _ = cancel.cancelled() => return ProcessingStatus::Cancelled,
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(20),
            timeout: Duration::from_secs(5),
            max_attempts,
        }
    }

    fn client(server: &MockServer) -> StreamableClient {
        StreamableClient::with_client(reqwest::Client::new(), server.uri(), "https://streamable.com")
    }

    #[tokio::test]
    async fn test_two_pending_then_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 1, "thumbnail_url": null})))
            .up_to_n_times(2)
            .with_priority(1)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos/abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 2, "thumbnail_url": "//cdn/abc123.jpg"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let status = client(&server)
            .poll_until_ready("abc123", &fast_config(10), &CancellationToken::new())
            .await;

        assert_eq!(
            status,
            ProcessingStatus::Ready {
                thumbnail_url: "//cdn/abc123.jpg".to_string()
            }
        );
        // three queries means exactly two sleeps in between
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_not_found_fails_without_waiting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let config = PollConfig {
            interval: Duration::from_secs(30),
            ..fast_config(10)
        };
        let started = std::time::Instant::now();
        let status = client(&server)
            .poll_until_ready("gone", &config, &CancellationToken::new())
            .await;

        assert!(matches!(status, ProcessingStatus::QueryFailed { .. }));
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_non_200_success_status_is_query_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/queued"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({"status": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let status = client(&server).query_status("queued").await;

        assert_eq!(
            status,
            ProcessingStatus::QueryFailed {
                reason: "status query returned HTTP 202 Accepted".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_attempt_cap_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 1})))
            .expect(3)
            .mount(&server)
            .await;

        let status = client(&server)
            .poll_until_ready("slow", &fast_config(3), &CancellationToken::new())
            .await;

        assert_eq!(status, ProcessingStatus::TimedOut { attempts: 3 });
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 1})))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let status = client(&server).poll_until_ready("abc", &fast_config(10), &cancel).await;

        assert_eq!(status, ProcessingStatus::Cancelled);
    }
}
