use crate::extractor::PreparedPrompt;
use crate::feed::FeedDialect;
use crate::{Result, VoiceprintError};
use serde::Serialize;

/// Complete JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Where the feed document was read from
    pub source_url: &'a str,
    /// Feed dialect the document was parsed as
    pub dialect: FeedDialect,
    /// Entry and corpus counts
    pub stats: JsonStats,
    /// Included samples, without their text
    pub samples: Vec<JsonSample<'a>>,
    /// Full prompt text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'a str>,
    /// Generator output, when a generator ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<&'a str>,
}

/// Entry and corpus counts
#[derive(Debug, Clone, Serialize)]
pub struct JsonStats {
    pub entries_found: usize,
    pub entries_dropped: usize,
    pub samples_included: usize,
    pub samples_omitted: usize,
    pub corpus_chars: usize,
}

/// A sample summary for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct JsonSample<'a> {
    pub position: usize,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<&'a str>,
    pub chars: usize,
}

/// Configuration for JSON output
#[derive(Debug, Clone)]
pub struct JsonConfig {
    /// Include the prompt text
    pub include_prompt: bool,
    /// Pretty print JSON output
    pub pretty: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self { include_prompt: true, pretty: true }
    }
}

impl<'a> JsonReport<'a> {
    pub fn new(prepared: &'a PreparedPrompt, stylesheet: Option<&'a str>, config: &JsonConfig) -> Self {
        let samples = prepared
            .samples
            .iter()
            .map(|s| JsonSample { position: s.position, title: &s.title, link: s.link.as_deref(), chars: s.char_count() })
            .collect();

        let stats = JsonStats {
            entries_found: prepared.entries_found,
            entries_dropped: prepared.entries_dropped,
            samples_included: prepared.corpus.sample_count(),
            samples_omitted: prepared.corpus.omitted(),
            corpus_chars: prepared.corpus.char_count(),
        };

        Self {
            source_url: &prepared.source_url,
            dialect: prepared.dialect,
            stats,
            samples,
            prompt: if config.include_prompt { Some(prepared.prompt.as_str()) } else { None },
            stylesheet,
        }
    }
}

/// Convert a prepared prompt (and optional stylesheet) to JSON
pub fn convert_to_json(prepared: &PreparedPrompt, stylesheet: Option<&str>, config: &JsonConfig) -> Result<String> {
    let report = JsonReport::new(prepared, stylesheet, config);

    if config.pretty {
        serde_json::to_string_pretty(&report).map_err(|e| VoiceprintError::Serialization(e.to_string()))
    } else {
        serde_json::to_string(&report).map_err(|e| VoiceprintError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::prepare_prompt_from_str;

    const FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>On drafts</title>
    <link href="https://example.com/drafts"/>
    <content type="html">&lt;p&gt;Every draft is a conversation with the reader you have not met yet.&lt;/p&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_report_fields() {
        let prepared = prepare_prompt_from_str(FEED, "Describe.").unwrap();
        let json = convert_to_json(&prepared, None, &JsonConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source_url"], "-");
        assert_eq!(value["dialect"], "atom");
        assert_eq!(value["stats"]["entries_found"], 1);
        assert_eq!(value["stats"]["samples_included"], 1);
        assert_eq!(value["samples"][0]["title"], "On drafts");
        assert_eq!(value["samples"][0]["link"], "https://example.com/drafts");
        assert!(value["prompt"].as_str().unwrap().starts_with("Describe.\n\nEvery draft"));
        assert!(value.get("stylesheet").is_none());
    }

    #[test]
    fn test_report_with_stylesheet_compact() {
        let prepared = prepare_prompt_from_str(FEED, "Describe.").unwrap();
        let config = JsonConfig { include_prompt: false, pretty: false };
        let json = convert_to_json(&prepared, Some("Voice: warm."), &config).unwrap();

        assert!(!json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stylesheet"], "Voice: warm.");
        assert!(value.get("prompt").is_none());
    }
}
