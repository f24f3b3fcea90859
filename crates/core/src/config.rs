//! Pipeline configuration and instruction template resolution.
//!
//! # Example
//!
//! ```rust
//! use voiceprint_core::StyleConfig;
//!
//! let config = StyleConfig::builder()
//!     .min_sample_chars(80)
//!     .char_budget(20_000)
//!     .platform_domain("substack.com")
//!     .build();
//! assert_eq!(config.char_budget, Some(20_000));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::fetch::FetchConfig;
use crate::locate::DEFAULT_PLATFORM_DOMAIN;
use crate::normalize::{DEFAULT_MIN_SAMPLE_CHARS, NormalizeConfig};
use crate::prompt::DEFAULT_INSTRUCTION;
use crate::{Result, VoiceprintError};

/// File name looked up in the user config directory for a custom instruction.
pub const INSTRUCTION_FILE_NAME: &str = "instruction.txt";

/// Configuration for a pipeline invocation.
#[derive(Debug, Clone)]
pub struct StyleConfig {
    /// Minimum cleaned length for an entry to be kept as a sample (default: 40).
    pub min_sample_chars: usize,

    /// Maximum corpus size in characters (default: unbounded).
    pub char_budget: Option<usize>,

    /// Platform domain for the reconstructed third feed candidate (default: substack.com).
    pub platform_domain: String,

    /// Whether to remove widgets and call-to-action lines (default: true).
    pub strip_boilerplate: bool,

    /// HTTP settings for feed retrieval.
    pub fetch: FetchConfig,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            min_sample_chars: DEFAULT_MIN_SAMPLE_CHARS,
            char_budget: None,
            platform_domain: DEFAULT_PLATFORM_DOMAIN.to_string(),
            strip_boilerplate: true,
            fetch: FetchConfig::default(),
        }
    }
}

impl StyleConfig {
    pub fn builder() -> StyleConfigBuilder {
        StyleConfigBuilder::new()
    }

    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig { min_chars: self.min_sample_chars, strip_boilerplate: self.strip_boilerplate }
    }
}

/// Fluent builder for [`StyleConfig`].
pub struct StyleConfigBuilder {
    config: StyleConfig,
}

impl StyleConfigBuilder {
    pub fn new() -> Self {
        Self { config: StyleConfig::default() }
    }

    pub fn min_sample_chars(mut self, value: usize) -> Self {
        self.config.min_sample_chars = value;
        self
    }

    pub fn char_budget(mut self, value: usize) -> Self {
        self.config.char_budget = Some(value);
        self
    }

    pub fn platform_domain(mut self, value: impl Into<String>) -> Self {
        self.config.platform_domain = value.into();
        self
    }

    pub fn strip_boilerplate(mut self, value: bool) -> Self {
        self.config.strip_boilerplate = value;
        self
    }

    /// Per-request timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.fetch.timeout = Some(secs);
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    pub fn build(self) -> StyleConfig {
        self.config
    }
}

impl Default for StyleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the instruction template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionSource {
    /// A file named explicitly by the caller.
    File(PathBuf),
    /// `~/.config/voiceprint/instruction.txt`.
    UserConfig(PathBuf),
    /// [`DEFAULT_INSTRUCTION`].
    BuiltIn,
}

/// Default user instruction path (`~/.config/voiceprint/instruction.txt`).
pub fn user_instruction_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("voiceprint").join(INSTRUCTION_FILE_NAME))
}

/// Resolves the instruction template.
///
/// An explicit path must exist and hold non-blank text. Otherwise the user
/// config file is used when present and non-blank, falling back to the
/// built-in instruction.
pub fn load_instruction(explicit: Option<&Path>) -> Result<(String, InstructionSource)> {
    load_instruction_from(explicit, user_instruction_path().as_deref())
}

fn load_instruction_from(explicit: Option<&Path>, user_path: Option<&Path>) -> Result<(String, InstructionSource)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(VoiceprintError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Err(VoiceprintError::ConfigError(format!(
                "Instruction template {} is empty",
                path.display()
            )));
        }
        return Ok((text, InstructionSource::File(path.to_path_buf())));
    }

    if let Some(path) = user_path
        && path.exists()
    {
        match fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(path = %path.display(), "using user instruction template");
                return Ok((text, InstructionSource::UserConfig(path.to_path_buf())));
            }
            Ok(_) => tracing::warn!(path = %path.display(), "user instruction template is empty, using built-in"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to read user instruction template"),
        }
    }

    Ok((DEFAULT_INSTRUCTION.to_string(), InstructionSource::BuiltIn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StyleConfig::default();
        assert_eq!(config.min_sample_chars, DEFAULT_MIN_SAMPLE_CHARS);
        assert_eq!(config.char_budget, None);
        assert_eq!(config.platform_domain, "substack.com");
        assert!(config.strip_boilerplate);
        assert_eq!(config.fetch.timeout, None);
    }

    #[test]
    fn test_builder() {
        let config = StyleConfig::builder()
            .min_sample_chars(10)
            .char_budget(500)
            .platform_domain("ghost.io")
            .strip_boilerplate(false)
            .timeout(5)
            .user_agent("test-agent")
            .build();

        assert_eq!(config.min_sample_chars, 10);
        assert_eq!(config.char_budget, Some(500));
        assert_eq!(config.platform_domain, "ghost.io");
        assert!(!config.strip_boilerplate);
        assert_eq!(config.fetch.timeout, Some(5));
        assert_eq!(config.fetch.user_agent, "test-agent");

        let normalize = config.normalize_config();
        assert_eq!(normalize.min_chars, 10);
        assert!(!normalize.strip_boilerplate);
    }

    #[test]
    fn test_builtin_instruction_without_files() {
        let (text, source) = load_instruction_from(None, None).unwrap();
        assert_eq!(text, DEFAULT_INSTRUCTION);
        assert_eq!(source, InstructionSource::BuiltIn);
    }

    #[test]
    fn test_explicit_instruction_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Summarize the voice.").unwrap();

        let (text, source) = load_instruction_from(Some(file.path()), None).unwrap();
        assert_eq!(text, "Summarize the voice.");
        assert_eq!(source, InstructionSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let result = load_instruction_from(Some(Path::new("/nonexistent/instruction.txt")), None);
        assert!(matches!(result, Err(VoiceprintError::FileNotFound(_))));
    }

    #[test]
    fn test_explicit_empty_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = load_instruction_from(Some(file.path()), None);
        assert!(matches!(result, Err(VoiceprintError::ConfigError(_))));
    }

    #[test]
    fn test_user_config_file_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INSTRUCTION_FILE_NAME);
        fs::write(&path, "House style instruction.").unwrap();

        let (text, source) = load_instruction_from(None, Some(&path)).unwrap();
        assert_eq!(text, "House style instruction.");
        assert_eq!(source, InstructionSource::UserConfig(path));
    }

    #[test]
    fn test_blank_user_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INSTRUCTION_FILE_NAME);
        fs::write(&path, "   \n").unwrap();

        let (_, source) = load_instruction_from(None, Some(&path)).unwrap();
        assert_eq!(source, InstructionSource::BuiltIn);
    }
}
