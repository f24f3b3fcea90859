//! Pipeline entry point.
//!
//! [`StyleExtractor`] runs the stages in order, each finishing before the next
//! starts: locate and fetch, parse, normalize, aggregate, build the prompt.
//! Everything an invocation needs is passed in explicitly; no state is shared
//! between invocations.
//!
//! # Example
//!
//! ```rust,no_run
//! use voiceprint_core::{DEFAULT_INSTRUCTION, StyleExtractor};
//!
//! # async fn example() -> voiceprint_core::Result<()> {
//! let extractor = StyleExtractor::new()?;
//! let prepared = extractor.prepare("https://example.substack.com", DEFAULT_INSTRUCTION).await?;
//! println!("{}", prepared.prompt);
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use crate::aggregate::{Corpus, aggregate};
use crate::config::StyleConfig;
use crate::feed::{FeedDialect, FeedParser};
use crate::fetch::{FeedDocument, Transport};
use crate::locate::locate_and_fetch;
use crate::normalize::{CleanEntry, normalize_entries};
use crate::prompt::{Prompt, build_prompt};
use crate::Result;

#[cfg(feature = "fetch")]
use crate::fetch::HttpTransport;

/// The external text-generation capability.
///
/// Receives the finished prompt and returns the stylesheet text, or fails.
/// The pipeline does not inspect the returned text.
pub trait Generator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Everything produced up to the prompt.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    /// URL (or file path) the feed document was read from.
    pub source_url: String,
    pub dialect: FeedDialect,
    /// Number of entries in the feed document.
    pub entries_found: usize,
    /// Entries dropped as too short after cleaning.
    pub entries_dropped: usize,
    /// Samples included in the corpus, in feed order.
    pub samples: Vec<CleanEntry>,
    pub corpus: Corpus,
    pub prompt: Prompt,
}

/// A generated stylesheet and the prompt it came from.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub prepared: PreparedPrompt,
    /// Generator output, unchanged.
    pub text: String,
}

/// Runs the feed-to-prompt pipeline over a [`Transport`].
pub struct StyleExtractor<T> {
    config: StyleConfig,
    transport: T,
}

#[cfg(feature = "fetch")]
impl StyleExtractor<HttpTransport> {
    /// Creates an extractor with default settings and an HTTP transport.
    pub fn new() -> Result<Self> {
        Self::with_config(StyleConfig::default())
    }

    /// Creates an extractor with an HTTP transport built from `config.fetch`.
    pub fn with_config(config: StyleConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.fetch.clone())?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> StyleExtractor<T> {
    pub fn with_transport(config: StyleConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// Locates and fetches the feed for a publication identifier.
    pub async fn fetch(&self, identifier: &str) -> Result<FeedDocument> {
        locate_and_fetch(&self.transport, identifier, &self.config.platform_domain).await
    }

    /// Fetches the feed for `identifier` and builds the prompt.
    pub async fn prepare(&self, identifier: &str, instruction: &str) -> Result<PreparedPrompt> {
        let document = self.fetch(identifier).await?;
        self.prepare_document(&document, instruction)
    }

    /// Builds the prompt from an already retrieved feed document.
    pub fn prepare_document(&self, document: &FeedDocument, instruction: &str) -> Result<PreparedPrompt> {
        prepare_document_with_config(document, instruction, &self.config)
    }

    /// Runs the whole pipeline and hands the prompt to `generator`.
    pub async fn generate<G: Generator>(
        &self, identifier: &str, instruction: &str, generator: &G,
    ) -> Result<Stylesheet> {
        let prepared = self.prepare(identifier, instruction).await?;
        generate_stylesheet(prepared, generator).await
    }
}

/// Builds the prompt from a feed document using `config`.
pub fn prepare_document_with_config(
    document: &FeedDocument, instruction: &str, config: &StyleConfig,
) -> Result<PreparedPrompt> {
    let (dialect, entries) = FeedParser::new().parse_with_dialect(document)?;
    let clean = normalize_entries(&entries, &config.normalize_config());
    let corpus = aggregate(&clean, config.char_budget).map_err(|e| e.with_origin(&document.url))?;
    let prompt = build_prompt(instruction, &corpus);

    let samples: Vec<CleanEntry> = clean.into_iter().take(corpus.sample_count()).collect();
    tracing::info!(
        url = %document.url,
        entries = entries.len(),
        samples = samples.len(),
        chars = corpus.char_count(),
        "prompt prepared"
    );

    Ok(PreparedPrompt {
        source_url: document.url.clone(),
        dialect,
        entries_found: entries.len(),
        entries_dropped: entries.len() - samples.len() - corpus.omitted(),
        samples,
        corpus,
        prompt,
    })
}

/// Hands a prepared prompt to `generator` and returns its output unchanged.
pub async fn generate_stylesheet<G: Generator>(prepared: PreparedPrompt, generator: &G) -> Result<Stylesheet> {
    let text = generator.generate(prepared.prompt.as_str()).await?;
    Ok(Stylesheet { prepared, text })
}

/// Fetches and prepares a prompt with default settings.
#[cfg(feature = "fetch")]
pub async fn prepare_prompt(identifier: &str, instruction: &str) -> Result<PreparedPrompt> {
    StyleExtractor::new()?.prepare(identifier, instruction).await
}

/// Prepares a prompt from raw feed markup with default settings.
pub fn prepare_prompt_from_str(feed: &str, instruction: &str) -> Result<PreparedPrompt> {
    prepare_document_with_config(&FeedDocument::new("-", feed), instruction, &StyleConfig::default())
}
