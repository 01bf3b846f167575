use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Transcript};

pub const TRANSCRIPT_MARKER: &str = "Transcript:";

pub const MIN_WORD_LIMIT: u32 = 100;
pub const MAX_WORD_LIMIT: u32 = 500;
pub const DEFAULT_WORD_LIMIT: u32 = 250;

/// How the summary should be written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryStyle {
    #[default]
    DetailedNotes,
    KeyPoints,
    Eli5,
}

impl SummaryStyle {
    /// Identifier embedded in the prompt
    pub fn name(&self) -> &'static str {
        match self {
            SummaryStyle::DetailedNotes => "DetailedNotes",
            SummaryStyle::KeyPoints => "KeyPoints",
            SummaryStyle::Eli5 => "ELI5",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SummaryStyle::DetailedNotes => "Detailed Notes",
            SummaryStyle::KeyPoints => "Key Points",
            SummaryStyle::Eli5 => "Explain Like I'm 5",
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Requested summary length in words, always within 100..=500
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLimit(u32);

impl WordLimit {
    pub fn new(words: u32) -> Result<Self> {
        if (MIN_WORD_LIMIT..=MAX_WORD_LIMIT).contains(&words) {
            Ok(Self(words))
        } else {
            Err(Error::InvalidWordLimit(words))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for WordLimit {
    fn default() -> Self {
        Self(DEFAULT_WORD_LIMIT)
    }
}

impl TryFrom<u32> for WordLimit {
    type Error = Error;

    fn try_from(words: u32) -> Result<Self> {
        Self::new(words)
    }
}

/// The two request shapes sent to the generative backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptMode {
    Summary { style: SummaryStyle, word_limit: WordLimit },
    Question { question: String },
}

impl PromptMode {
    /// Heading shown above the generated text
    pub fn heading(&self) -> &str {
        match self {
            PromptMode::Summary { style, .. } => style.description(),
            PromptMode::Question { .. } => "Answer",
        }
    }
}

/// Build the exact payload for the generative backend.
///
/// The transcript text is embedded verbatim; length limits are a request to the
/// model, never enforced by clipping here.
pub fn build_prompt(mode: &PromptMode, transcript: &Transcript) -> String {
    match mode {
        PromptMode::Summary { style, word_limit } => format!(
            "You are a YouTube video summarizer. Summarize the following transcript in the style of {name} ({description}).\n\
Keep the summary within {words} words. Focus on the main ideas and key takeaways.\n\
If it's a tutorial or educational content, include any important steps or concepts mentioned.\n\
\n\
{TRANSCRIPT_MARKER} {text}",
            name = style.name(),
            description = style.description(),
            words = word_limit.get(),
            text = transcript.text,
        ),
        PromptMode::Question { question } => format!(
            "Based on the following video transcript, please answer the question:\n\
Question: {question}\n\
\n\
{TRANSCRIPT_MARKER} {text}\n\
\n\
Please provide a concise and accurate answer based solely on the information in the transcript.",
            text = transcript.text,
        ),
    }
}
