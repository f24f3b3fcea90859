use serde::Serialize;

use crate::aggregate::Corpus;

/// Built-in ghostwriting instruction used when the caller supplies none.
pub const DEFAULT_INSTRUCTION: &str = "You are an expert ghostwriter who manages a team of junior ghostwriters.
I am going to give you a bunch of sample content from a client you are working with,
and I want you to extract a stylesheet. It should be something you can give to your
junior ghostwriters so they can reliably produce content that sounds exactly like
the client's voice. Pay attention to tone, style, and sentence construction.
Avoid giving overly specific examples from one piece, as those might be over-applied.
Instead, provide multiple examples that highlight a clear style or tone.

Here is the sample content:";

/// The final text handed to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Instruction, one blank line, then the corpus verbatim.
///
/// Trailing whitespace on the instruction is dropped so the separator is
/// always exactly one blank line. The corpus is never escaped or truncated.
pub fn build_prompt(instruction: &str, corpus: &Corpus) -> Prompt {
    Prompt(format!("{}\n\n{}", instruction.trim_end(), corpus.text()))
}
