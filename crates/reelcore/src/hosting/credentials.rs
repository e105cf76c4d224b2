use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Streamable account used for uploads.
///
/// The password is wrapped in `SecretString`; `Debug` never prints it.
pub struct HostingCredentials {
    pub email: String,
    password: SecretString,
}

impl HostingCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// Builds the `Authorization: Basic ...` header value.
    ///
    /// Encoded on every call and marked sensitive so it is skipped by header logging.
    pub fn basic_auth_header(&self) -> Option<HeaderValue> {
        let raw = format!("{}:{}", self.email, self.password.expose_secret());
        let mut value = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(raw))).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

impl fmt::Debug for HostingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostingCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
