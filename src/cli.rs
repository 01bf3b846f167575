use clap::Parser;
use std::path::PathBuf;

use ytsum::output::DEFAULT_EXPORT_FILE;
use ytsum::prompt::{MAX_WORD_LIMIT, MIN_WORD_LIMIT, SummaryStyle};

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize or ask questions about a YouTube video from its captions",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL (reads one URL per line from stdin if omitted)
    pub url: Option<String>,

    /// Summary style [default: detailed-notes, or default_style from config]
    #[arg(short, long, value_enum)]
    pub style: Option<SummaryStyle>,

    /// Word limit for the summary [default: 250, or default_word_limit from config]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(i64::from(MIN_WORD_LIMIT)..=i64::from(MAX_WORD_LIMIT)))]
    pub words: Option<u32>,

    /// Ask a question about the video instead of summarizing it
    #[arg(short, long, conflicts_with_all = ["style", "words"])]
    pub question: Option<String>,

    /// Target language for the transcript and summary [default: en]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Never translate the transcript
    #[arg(long)]
    pub no_translate: bool,

    /// Also write the result to a plain-text file
    #[arg(short, long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
    pub output: Option<PathBuf>,

    /// Gemini model used for generation
    #[arg(long)]
    pub model: Option<String>,

    /// Show video and transcript details
    #[arg(short, long)]
    pub verbose: bool,
}
