//! Feed discovery for a publication identifier.
//!
//! An identifier is a publication URL (`https://example.substack.com`), a custom
//! domain (`newsletter.example.com`), or a bare publication name (`example`).
//! [`candidate_urls`] turns it into exactly three feed locations, and
//! [`locate_and_fetch`] tries them strictly in order, returning the first body
//! that comes back with a success status.
//!
//! # Example
//!
//! ```rust
//! use voiceprint_core::candidate_urls;
//!
//! let candidates = candidate_urls("https://example.substack.com/", "substack.com");
//! assert_eq!(
//!     candidates,
//!     vec![
//!         "https://example.substack.com/feed",
//!         "https://example.substack.com/rss",
//!         "https://example.substack.com/feed",
//!     ]
//! );
//! ```

use crate::fetch::{FeedDocument, Transport};
use crate::{Result, VoiceprintError};

/// Default hosting platform used to rebuild the canonical feed host.
pub const DEFAULT_PLATFORM_DOMAIN: &str = "substack.com";

/// Trims trailing path separators and supplies `https://` when no scheme is present.
///
/// Idempotent: normalizing an already normalized identifier is a no-op.
pub fn normalize_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim().trim_end_matches('/');

    if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{}", trimmed) }
}

/// Builds the three candidate feed URLs in priority order.
///
/// 1. `<identifier>/feed`
/// 2. `<identifier>/rss`
/// 3. `https://<last segment>.<platform_domain>/feed`
///
/// When the last segment already ends with the platform domain (compared without
/// regard to ASCII case) it is used as the host directly instead of appending
/// the domain a second time.
pub fn candidate_urls(identifier: &str, platform_domain: &str) -> Vec<String> {
    let base = normalize_identifier(identifier);
    let segment = base.rsplit('/').next().unwrap_or_default();

    let lowered = segment.to_ascii_lowercase();
    let domain = platform_domain.to_ascii_lowercase();
    let host = if lowered == domain || lowered.ends_with(&format!(".{}", domain)) {
        segment.to_string()
    } else {
        format!("{}.{}", segment, platform_domain)
    };

    vec![format!("{}/feed", base), format!("{}/rss", base), format!("https://{}/feed", host)]
}

/// Tries each candidate in order and returns the first document retrieved.
///
/// Candidates are attempted one at a time with no retries; a failure on one
/// moves on to the next. When all fail, the error from the last attempt is
/// reported inside [`VoiceprintError::FeedUnreachable`].
pub async fn locate_and_fetch<T: Transport>(
    transport: &T, identifier: &str, platform_domain: &str,
) -> Result<FeedDocument> {
    let mut last_error = None;

    for url in candidate_urls(identifier, platform_domain) {
        tracing::debug!(%url, "trying feed candidate");

        match transport.get(&url).await {
            Ok(body) => {
                tracing::info!(%url, bytes = body.len(), "feed located");
                return Ok(FeedDocument::new(url, body));
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "feed candidate failed");
                last_error = Some(e);
            }
        }
    }

    Err(VoiceprintError::FeedUnreachable {
        identifier: identifier.to_string(),
        last_error: last_error.map(|e| e.to_string()).unwrap_or_else(|| "no candidates".to_string()),
    })
}
