//! Conversion API client for resolving a direct audio stream URL.
//!
//! Two API flavours are supported:
//! - `Cobalt` — `POST` a JSON body, success is `{"status":"stream","url":...}`
//! - `NeedDl` — `GET ?url=..&type=video`, success is `{"download_url":...}`
//!
//! Errors are never retried; their `Display` text is shown to the user as-is.

use crate::core::config;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conversion failures, worded for the chat user.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("could not reach the conversion service: {0}")]
    Request(#[from] reqwest::Error),

    #[error("conversion service returned HTTP {status}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("conversion service refused the link ({status}): {detail}")]
    Rejected { status: String, detail: String },

    #[error("conversion service did not return a stream URL")]
    MissingUrl,

    #[error("conversion service sent an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Which request/response contract the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionApi {
    Cobalt,
    NeedDl,
}

impl ConversionApi {
    /// Parses `CONVERSION_API_KIND`; unknown values fall back to `Cobalt`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "needdl" | "need-dl" => ConversionApi::NeedDl,
            "cobalt" => ConversionApi::Cobalt,
            other => {
                log::warn!("Unknown conversion API kind '{}', using cobalt", other);
                ConversionApi::Cobalt
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CobaltRequest<'a> {
    url: &'a str,
    v_quality: &'a str,
    filename_pattern: &'a str,
    youtube_video_codec: &'a str,
    audio_bitrate: &'a str,
    is_audio_only: bool,
}

impl<'a> CobaltRequest<'a> {
    fn audio_only(url: &'a str) -> Self {
        Self {
            url,
            v_quality: "max",
            filename_pattern: "basic",
            youtube_video_codec: "h264",
            audio_bitrate: "320",
            is_audio_only: true,
        }
    }
}

#[derive(Deserialize)]
struct CobaltResponse {
    status: Option<String>,
    url: Option<String>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct NeedDlResponse {
    download_url: Option<String>,
}

/// Interprets a Cobalt JSON body.
fn parse_cobalt_body(body: &str) -> Result<String, ConversionError> {
    let data: CobaltResponse =
        serde_json::from_str(body).map_err(|e| ConversionError::InvalidResponse(e.to_string()))?;

    match data.status.as_deref() {
        Some("stream") => data.url.filter(|u| !u.is_empty()).ok_or(ConversionError::MissingUrl),
        other => Err(ConversionError::Rejected {
            status: other.unwrap_or("missing").to_string(),
            detail: data.text.unwrap_or_else(|| "no details".to_string()),
        }),
    }
}

/// Interprets a NeedDL JSON body.
fn parse_needdl_body(body: &str) -> Result<String, ConversionError> {
    let data: NeedDlResponse =
        serde_json::from_str(body).map_err(|e| ConversionError::InvalidResponse(e.to_string()))?;
    data.download_url
        .filter(|u| !u.is_empty())
        .ok_or(ConversionError::MissingUrl)
}

/// Client for the configured conversion endpoint.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    endpoint: String,
    api: ConversionApi,
}

impl ConversionClient {
    pub fn new(endpoint: impl Into<String>, api: ConversionApi) -> Result<Self, ConversionError> {
        let http = reqwest::Client::builder()
            .timeout(config::conversion::timeout())
            .build()?;
        Ok(Self::with_client(http, endpoint, api))
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>, api: ConversionApi) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api,
        }
    }

    /// Client for `CONVERSION_API_URL` / `CONVERSION_API_KIND`.
    pub fn from_config() -> Result<Self, ConversionError> {
        Self::new(
            config::conversion::API_URL.as_str(),
            ConversionApi::from_name(&config::conversion::API_KIND),
        )
    }

    /// Resolves `url` to a direct media URL. A single request, no retries.
    pub async fn request_conversion(&self, url: &str) -> Result<String, ConversionError> {
        let request = match self.api {
            ConversionApi::Cobalt => self
                .http
                .post(&self.endpoint)
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .json(&CobaltRequest::audio_only(url)),
            ConversionApi::NeedDl => self
                .http
                .get(&self.endpoint)
                .header(ACCEPT, "application/json")
                .header(USER_AGENT, "NeedDL/1.1.0")
                .query(&[("url", url), ("type", "video")]),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("Conversion API response ({}): {}", status, body);

        if !status.is_success() {
            log::error!("Conversion API returned {} for {}: {}", status, url, body);
            return Err(ConversionError::HttpStatus { status, body });
        }

        let result = match self.api {
            ConversionApi::Cobalt => parse_cobalt_body(&body),
            ConversionApi::NeedDl => parse_needdl_body(&body),
        };
        if let Err(e) = &result {
            log::warn!("Conversion of {} failed: {}", url, e);
        }
        result
    }
}
