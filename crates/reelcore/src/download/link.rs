//! Source link detection for incoming chat messages.

use url::Url;

/// A chat message URL that belongs to the configured source domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    pub url: Url,
    /// Lowercased host, e.g. `vm.tiktok.com`
    pub source_host: String,
}

/// Returns the lowercased host if `url` is an absolute http(s) URL on `domain`
/// or one of its subdomains.
fn matching_host(url: &Url, domain: &str) -> Option<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    let host = url.host_str()?.trim_end_matches('.').to_lowercase();
    let domain = domain.trim_end_matches('.').to_lowercase();
    if domain.is_empty() {
        return None;
    }

    let is_match = host == domain || host.ends_with(&format!(".{}", domain));
    is_match.then_some(host)
}

/// Checks whether `url` points at `domain` (exact host or subdomain).
///
/// Malformed input is simply not a match; this never panics.
///
/// # Examples
/// ```
/// use reelcore::download::is_source_url;
///
/// assert!(is_source_url("https://www.tiktok.com/@user/video/1", "tiktok.com"));
/// assert!(is_source_url("https://vm.tiktok.com/ZMabc/", "tiktok.com"));
/// assert!(!is_source_url("https://eviltiktok.com/x", "tiktok.com"));
/// assert!(!is_source_url("tiktok.com/@user", "tiktok.com"));
/// assert!(!is_source_url("", "tiktok.com"));
/// ```
pub fn is_source_url(url: &str, domain: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| matching_host(&parsed, domain))
        .is_some()
}

/// Extracts source links from message text, preserving their order.
///
/// Tokens are split on whitespace; Discord's `<url>` embed suppression is unwrapped.
pub fn extract_source_links(text: &str, domain: &str) -> Vec<SourceLink> {
    text.split_whitespace()
        .map(|token| token.trim_start_matches('<').trim_end_matches('>'))
        .filter_map(|token| {
            let url = Url::parse(token).ok()?;
            let source_host = matching_host(&url, domain)?;
            Some(SourceLink { url, source_host })
        })
        .collect()
}
