//! Sample aggregation into a single corpus.

use serde::Serialize;

use crate::normalize::CleanEntry;
use crate::{Result, VoiceprintError};

/// Separator placed between consecutive samples in a corpus.
pub const SAMPLE_SEPARATOR: &str = "\n\n";

/// Concatenated writing samples, in feed order.
///
/// Never empty: [`aggregate`] fails instead of producing an empty corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Corpus {
    text: String,
    sample_count: usize,
    /// Samples left out because the character budget was reached.
    omitted: usize,
}

impl Corpus {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// Length of the corpus in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Joins clean entries into a corpus separated by blank lines.
///
/// With a `budget` (in characters, separators included), entries are taken in
/// order until the next one would push the corpus past the budget; entries are
/// never cut mid-text. Fails with [`VoiceprintError::NoUsableContent`] when
/// no entry has any text, and with [`VoiceprintError::SampleBudgetExceeded`] when
/// the budget cannot hold the first entry.
pub fn aggregate(entries: &[CleanEntry], budget: Option<usize>) -> Result<Corpus> {
    let usable: Vec<&CleanEntry> = entries.iter().filter(|entry| !entry.text.trim().is_empty()).collect();

    let Some(first) = usable.first() else {
        return Err(VoiceprintError::NoUsableContent { origin: None });
    };

    let separator_len = SAMPLE_SEPARATOR.chars().count();
    let mut text = String::new();
    let mut used = 0;
    let mut sample_count = 0;

    for entry in &usable {
        let cost = if sample_count == 0 { entry.char_count() } else { separator_len + entry.char_count() };

        if let Some(limit) = budget
            && used + cost > limit
        {
            break;
        }

        if sample_count > 0 {
            text.push_str(SAMPLE_SEPARATOR);
        }
        text.push_str(&entry.text);
        used += cost;
        sample_count += 1;
    }

    if sample_count == 0 {
        return Err(VoiceprintError::SampleBudgetExceeded {
            budget: budget.unwrap_or_default(),
            required: first.char_count(),
        });
    }

    let omitted = usable.len() - sample_count;
    if omitted > 0 {
        tracing::debug!(included = sample_count, omitted, "character budget reached");
    }

    Ok(Corpus { text, sample_count, omitted })
}
