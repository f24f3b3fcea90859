//! Error types for Voiceprint operations.
//!
//! [`VoiceprintError`] covers every failure a pipeline invocation can surface.
//! Three variants form the public failure taxonomy and are what callers are
//! expected to present to users:
//!
//! - [`VoiceprintError::FeedUnreachable`]: no candidate URL produced a document
//! - [`VoiceprintError::FeedMalformed`]: a document arrived but is not a feed
//! - [`VoiceprintError::NoUsableContent`]: the feed parsed but held no usable prose
//!
//! The remaining variants come from the transport, file input, configuration,
//! and generation layers.
//!
//! # Example
//!
//! ```rust
//! use voiceprint_core::{VoiceprintError, aggregate};
//!
//! match aggregate(&[], None) {
//!     Err(VoiceprintError::NoUsableContent { .. }) => println!("empty publication"),
//!     Err(e) => println!("Error: {}", e),
//!     Ok(corpus) => println!("{} samples", corpus.sample_count()),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for feed discovery, normalization, and prompt assembly.
#[derive(Error, Debug)]
pub enum VoiceprintError {
    /// None of the candidate feed URLs returned a usable document.
    ///
    /// Carries the identifier the caller supplied and the error from the last
    /// candidate that was attempted.
    #[error("Could not fetch a feed for '{identifier}'. Check the publication URL. Last error: {last_error}")]
    FeedUnreachable { identifier: String, last_error: String },

    /// A document was fetched but is not well-formed feed markup.
    #[error("Feed at {url} is malformed: {reason}")]
    FeedMalformed { url: String, reason: String },

    /// The feed parsed, but no entry produced usable text after cleaning.
    #[error("No usable writing samples found{}", origin_suffix(.origin))]
    NoUsableContent { origin: Option<String> },

    /// The character budget cannot hold even the first sample.
    #[error("Character budget {budget} is too small for the first sample ({required} characters)")]
    SampleBudgetExceeded { budget: usize, required: usize },

    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Request or pipeline deadline elapsed.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading input or templates.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors, such as an unreadable instruction template.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The external generation capability failed.
    #[error("Stylesheet generation failed: {0}")]
    GenerationFailed(String),

    /// JSON report serialization failed.
    #[error("Failed to serialize output: {0}")]
    Serialization(String),
}

impl VoiceprintError {
    /// Attaches the feed location to a [`VoiceprintError::NoUsableContent`] raised
    /// by a stage that does not know where its input came from.
    pub(crate) fn with_origin(self, origin: &str) -> Self {
        match self {
            VoiceprintError::NoUsableContent { origin: None } => {
                VoiceprintError::NoUsableContent { origin: Some(origin.to_string()) }
            }
            other => other,
        }
    }
}

fn origin_suffix(origin: &Option<String>) -> String {
    origin.as_deref().map(|o| format!(" in {}", o)).unwrap_or_default()
}

/// Result type alias for VoiceprintError.
pub type Result<T> = std::result::Result<T, VoiceprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_message_names_identifier_and_cause() {
        let err = VoiceprintError::FeedUnreachable {
            identifier: "https://example.com".to_string(),
            last_error: "HTTP 404 from https://example.com/rss".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com"));
        assert!(msg.contains("HTTP 404"));
        assert!(msg.contains("Check the publication URL"));
    }

    #[test]
    fn test_no_usable_content_with_origin() {
        let err = VoiceprintError::NoUsableContent { origin: None }.with_origin("https://example.com/feed");
        assert_eq!(err.to_string(), "No usable writing samples found in https://example.com/feed");
    }

    #[test]
    fn test_no_usable_content_without_origin() {
        let err = VoiceprintError::NoUsableContent { origin: None };
        assert_eq!(err.to_string(), "No usable writing samples found");
    }

    #[test]
    fn test_with_origin_leaves_other_errors() {
        let err = VoiceprintError::Timeout { timeout: 30 }.with_origin("x");
        assert!(matches!(err, VoiceprintError::Timeout { timeout: 30 }));
    }

    #[test]
    fn test_budget_error() {
        let err = VoiceprintError::SampleBudgetExceeded { budget: 50, required: 120 };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("120"));
    }
}
