//! Feed retrieval from URLs, files, and stdin.
//!
//! The [`Transport`] trait is the only place the pipeline touches the network.
//! [`HttpTransport`] is the reqwest-backed implementation; tests substitute
//! their own to script candidate failures.

use std::fs;
use std::future::Future;
use std::path::PathBuf;

use serde::Serialize;

use crate::{Result, VoiceprintError};

/// A fetched feed document and the location it came from.
///
/// Immutable once fetched; the parser borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedDocument {
    /// URL (or file path, or `-` for stdin) the body was read from.
    pub url: String,
    /// Raw feed markup.
    pub body: String,
}

impl FeedDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self { url: url.into(), body: body.into() }
    }
}

/// HTTP client configuration for fetching feeds.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in seconds. `None` keeps the transport default.
    pub timeout: Option<u64>,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: None, user_agent: "Mozilla/5.0 (compatible; Voiceprint/0.1)".to_string() }
    }
}

/// Retrieves the body behind a URL.
///
/// Any error counts as a failed candidate; the locator moves on to the next one.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// reqwest-backed [`Transport`].
///
/// Follows redirects, sends feed-friendly `Accept` headers, and treats any
/// non-2xx status as a failure.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: FetchConfig,
}

#[cfg(feature = "fetch")]
impl HttpTransport {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().map_err(VoiceprintError::HttpError)?;

        Ok(Self { client, config })
    }
}

#[cfg(feature = "fetch")]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let parsed_url = url::Url::parse(url).map_err(|e| VoiceprintError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .client
            .get(parsed_url)
            .header(
                "Accept",
                "application/rss+xml,application/atom+xml,application/xml;q=0.9,text/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| match self.config.timeout {
                Some(timeout) if e.is_timeout() => VoiceprintError::Timeout { timeout },
                _ => VoiceprintError::HttpError(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoiceprintError::HttpStatus { url: url.to_string(), status: status.as_u16() });
        }

        Ok(response.text().await?)
    }
}

/// Reads a previously downloaded feed from a local file.
pub fn fetch_file(path: &str) -> Result<FeedDocument> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(VoiceprintError::FileNotFound(path_buf))
    } else {
        let body = fs::read_to_string(&path_buf)?;
        Ok(FeedDocument::new(path, body))
    }
}

/// Reads a feed document from standard input until EOF.
pub fn fetch_stdin() -> Result<FeedDocument> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(FeedDocument::new("-", buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, None);
        assert!(config.user_agent.contains("Voiceprint"));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/feed.xml");
        assert!(matches!(result, Err(VoiceprintError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file_keeps_path_as_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<rss><channel></channel></rss>").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let doc = fetch_file(&path).unwrap();
        assert_eq!(doc.url, path);
        assert!(doc.body.starts_with("<rss>"));
    }

    #[cfg(feature = "fetch")]
    #[tokio::test]
    async fn test_http_transport_rejects_invalid_url() {
        let transport = HttpTransport::new(FetchConfig::default()).unwrap();
        let result = transport.get("example/feed").await;
        assert!(matches!(result, Err(VoiceprintError::InvalidUrl(_))));
    }
}
