// ABOUTME: Source fetching for the read path.
// ABOUTME: One blocking read of a URL or local file, bounded by a per-call timeout.

use std::fs;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::FeedError;

/// Per-call fetch configuration; connection resources are scoped to the
/// call, nothing is cached across fetches.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            timeout: Duration::from_secs(30),
            user_agent: format!("syndic-feed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Retrieves raw bytes from an http(s) URL or a local file path.
pub fn fetch_source(source: &str, opts: &FetchOptions) -> Result<Vec<u8>, FeedError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let parsed = Url::parse(source).map_err(FeedError::io)?;
        return fetch_url(&parsed, opts);
    }

    let path = Path::new(source);
    if !path.exists() {
        return Err(FeedError::FetchIo(format!("file not found: {source}")));
    }
    fs::read(path).map_err(FeedError::io)
}

fn fetch_url(url: &Url, opts: &FetchOptions) -> Result<Vec<u8>, FeedError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(opts.timeout)
        .user_agent(opts.user_agent.clone())
        .build()
        .map_err(FeedError::io)?;

    let response = client
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(classify)?;
    let bytes = response.bytes().map_err(classify)?;
    Ok(bytes.to_vec())
}

fn classify(err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::FetchTimeout(err.to_string())
    } else {
        FeedError::io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fetch_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<rss version=\"2.0\"/>").unwrap();
        let bytes = fetch_source(file.path().to_str().unwrap(), &FetchOptions::default()).unwrap();
        assert_eq!(bytes, b"<rss version=\"2.0\"/>");
    }

    #[test]
    fn test_fetch_missing_file() {
        let err = fetch_source("/no/such/feed.xml", &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, FeedError::FetchIo(_)));
    }

    #[test]
    fn test_fetch_invalid_url() {
        let err = fetch_source("https://exa mple.com/feed", &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, FeedError::FetchIo(_)));
    }
}
