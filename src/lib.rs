pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod summarize;
pub mod transcript;
pub mod translate;
pub mod youtube;

pub use error::{Error, Result, Stage, UnavailableReason};

/// A single timed caption snippet
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl CaptionFragment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Caption track as returned by a transcript source, fragments in chronological order
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub fragments: Vec<CaptionFragment>,
}

/// Plain-text transcript for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub language: String,
}

/// A user-supplied link and the video ID found in it, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    raw_url: String,
    video_id: Option<String>,
}

impl VideoReference {
    pub fn parse(raw_url: &str) -> Self {
        Self {
            raw_url: raw_url.to_string(),
            video_id: extract_video_id(raw_url).ok(),
        }
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("http://img.youtube.com/vi/{video_id}/0.jpg")
}

const SHORT_LINK_MARKER: &str = "youtu.be";
const QUERY_MARKER: &str = "v=";
const EMBED_MARKER: &str = "/embed/";

/// Extract the video ID from a YouTube link.
///
/// Short links and embed links take the last path segment; watch links take the
/// value of `v=` up to the next `&`. Anything else is an `InvalidReference`.
pub fn extract_video_id(input: &str) -> Result<String> {
    let trimmed = input.trim();

    let candidate = if trimmed.contains(SHORT_LINK_MARKER) {
        last_segment(trimmed)
    } else if let Some((_, rest)) = trimmed.split_once(QUERY_MARKER) {
        rest.split('&').next()
    } else if trimmed.contains(EMBED_MARKER) {
        last_segment(trimmed)
    } else {
        None
    };

    // Drop any query or fragment left on short/embed links
    candidate
        .and_then(|id| id.split(['?', '#']).next())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidReference {
            input: input.to_string(),
        })
}

fn last_segment(s: &str) -> Option<&str> {
    s.rsplit('/').next()
}
