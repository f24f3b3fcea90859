pub mod aggregate;
pub mod config;
pub mod error;
pub mod extractor;
pub mod feed;
pub mod fetch;
pub mod formatters;
pub mod locate;
pub mod normalize;
pub mod prompt;

pub use aggregate::{Corpus, SAMPLE_SEPARATOR, aggregate};
pub use config::{InstructionSource, StyleConfig, StyleConfigBuilder, load_instruction, user_instruction_path};
pub use error::{Result, VoiceprintError};
#[cfg(feature = "fetch")]
pub use extractor::prepare_prompt;
pub use extractor::{
    Generator, PreparedPrompt, StyleExtractor, Stylesheet, generate_stylesheet, prepare_document_with_config,
    prepare_prompt_from_str,
};
pub use feed::{ContentKind, FeedDialect, FeedEntry, FeedParser, parse_feed};
#[cfg(feature = "fetch")]
pub use fetch::HttpTransport;
pub use fetch::{FeedDocument, FetchConfig, Transport, fetch_file, fetch_stdin};
pub use formatters::{JsonConfig, JsonReport, convert_to_json};
pub use locate::{DEFAULT_PLATFORM_DOMAIN, candidate_urls, locate_and_fetch, normalize_identifier};
pub use normalize::{
    CleanEntry, DEFAULT_MIN_SAMPLE_CHARS, NormalizeConfig, html_to_text, normalize, normalize_entries,
    normalize_with_config, plain_to_text,
};
pub use prompt::{DEFAULT_INSTRUCTION, Prompt, build_prompt};
