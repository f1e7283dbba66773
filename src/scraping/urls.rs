//! URL normalization helpers for extracted links and images.

use url::Url;

/// Rewrite protocol-relative URLs (`//host/path`) to absolute https.
/// Anything else passes through unchanged.
pub fn ensure_https(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

/// Detail-page URL under a market's base, e.g. `https://www.amazon.com/dp/ASIN`.
pub fn join_path(base: &Url, path: &str) -> String {
    base.join(path)
        .map(Into::into)
        .unwrap_or_else(|_| format!("{}/{}", base.as_str().trim_end_matches('/'), path))
}
