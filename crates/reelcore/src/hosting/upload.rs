use super::{HostingCredentials, StreamableClient};
use crate::download::MediaFile;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Outcome of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success { shortcode: String, hosted_url: String },
    Failure { reason: String },
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }
}

#[derive(Debug, Error)]
enum UploadError {
    /// Non-200 answer; the body is the failure reason
    #[error("{body}")]
    Rejected { status: StatusCode, body: String },

    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to read video file: {0}")]
    Io(#[from] std::io::Error),

    #[error("credentials cannot be sent as an HTTP header")]
    InvalidCredentials,
}

#[derive(Deserialize)]
struct UploadResponse {
    shortcode: String,
}

impl StreamableClient {
    /// Uploads `file` and removes it from disk afterwards, whatever the outcome.
    pub async fn upload(&self, file: MediaFile, creds: &HostingCredentials) -> UploadResult {
        let result = self.send_upload(&file, creds).await;
        file.remove().await;

        match result {
            Ok(shortcode) => {
                let hosted_url = self.hosted_url(&shortcode);
                log::info!("Video uploaded to Streamable successfully: {}", hosted_url);
                UploadResult::Success { shortcode, hosted_url }
            }
            Err(e) => {
                match &e {
                    UploadError::Rejected { status, body } => {
                        log::error!("Error uploading to Streamable ({}): {}", status, body)
                    }
                    other => log::error!("Error uploading to Streamable: {}", other),
                }
                UploadResult::Failure { reason: e.to_string() }
            }
        }
    }

    async fn send_upload(&self, file: &MediaFile, creds: &HostingCredentials) -> Result<String, UploadError> {
        let auth = creds.basic_auth_header().ok_or(UploadError::InvalidCredentials)?;
        let bytes = tokio::fs::read(file.path()).await?;
        log::info!(
            "Uploading {} ({} bytes) to Streamable as {}",
            file.file_name(),
            file.size_bytes(),
            creds.email
        );

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file.file_name()));
        let response = self
            .http
            .post(self.upload_endpoint())
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status, body });
        }

        let data: UploadResponse = response.json().await?;
        Ok(data.shortcode)
    }
}
