use crate::core::config;

/// HTTP client for the Streamable API.
///
/// `api_base` serves `/upload` and `/videos/<shortcode>`; `public_base` is only
/// used to build the link posted back to chat.
#[derive(Debug, Clone)]
pub struct StreamableClient {
    pub(crate) http: reqwest::Client,
    pub(crate) api_base: String,
    pub(crate) public_base: String,
}

impl StreamableClient {
    pub fn new(api_base: impl Into<String>, public_base: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config::network::timeout())
            .build()?;
        Ok(Self::with_client(http, api_base, public_base))
    }

    pub fn with_client(http: reqwest::Client, api_base: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for `STREAMABLE_API_URL` / `STREAMABLE_PUBLIC_URL`.
    pub fn from_config() -> Result<Self, reqwest::Error> {
        Self::new(config::hosting::API_URL.as_str(), config::hosting::PUBLIC_URL.as_str())
    }

    /// Public URL for an uploaded video.
    pub fn hosted_url(&self, shortcode: &str) -> String {
        format!("{}/{}", self.public_base, shortcode)
    }

    pub(crate) fn upload_endpoint(&self) -> String {
        format!("{}/upload", self.api_base)
    }

    pub(crate) fn status_endpoint(&self, shortcode: &str) -> String {
        format!("{}/videos/{}", self.api_base, shortcode)
    }
}
