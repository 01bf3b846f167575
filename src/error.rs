use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Why a transcript could not be obtained for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The video exists but has no caption tracks
    NoCaptions,
    /// The player response carries no captions block at all
    CaptionsDisabled,
    /// The player reports the video does not exist
    VideoNotFound,
    /// The video exists but cannot be played (private, login required, ...)
    Unplayable(String),
    /// Network or parse failure while talking to the caption source
    Request(String),
}

impl UnavailableReason {
    /// Stable short name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            UnavailableReason::NoCaptions => "no_captions",
            UnavailableReason::CaptionsDisabled => "captions_disabled",
            UnavailableReason::VideoNotFound => "video_not_found",
            UnavailableReason::Unplayable(_) => "unplayable",
            UnavailableReason::Request(_) => "request",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NoCaptions => write!(f, "no captions available"),
            UnavailableReason::CaptionsDisabled => write!(f, "captions are disabled"),
            UnavailableReason::VideoNotFound => write!(f, "video not found"),
            UnavailableReason::Unplayable(why) => write!(f, "video unplayable: {why}"),
            UnavailableReason::Request(cause) => write!(f, "caption request failed: {cause}"),
        }
    }
}

/// Collaborator call that can time out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcript,
    Translation,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transcript => write!(f, "transcript fetch"),
            Stage::Translation => write!(f, "translation"),
            Stage::Generation => write!(f, "generation"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not extract a video ID from {input:?}")]
    InvalidReference { input: String },

    #[error("transcript unavailable for {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: UnavailableReason },

    #[error("translation to {target} failed: {cause}")]
    TranslationFailed { target: String, cause: String },

    #[error("generation failed: {cause}")]
    GenerationFailed { cause: String },

    #[error("{stage} timed out after {}s", .after.as_secs_f64())]
    Timeout { stage: Stage, after: Duration },

    #[error("word limit {0} is outside 100..=500")]
    InvalidWordLimit(u32),

    #[error("transcript has {chars} characters, over the configured limit of {limit}")]
    TranscriptTooLong { chars: usize, limit: usize },

    #[error("{name} environment variable not set")]
    ConfigurationMissing { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the user can fix this by re-triggering with different input.
    /// Only missing configuration is fatal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::ConfigurationMissing { .. })
    }

    /// Short guidance shown next to the error in the terminal
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidReference { .. } => "Invalid YouTube URL. Please check and try again.\n\n\
Supported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID"
                .to_string(),
            Error::TranscriptUnavailable { .. } => {
                "No transcript is available for this video. Try a different video.".to_string()
            }
            Error::TranslationFailed { .. } => {
                "The transcript could not be translated. Try again or pass --no-translate.".to_string()
            }
            Error::GenerationFailed { .. } => "The summary could not be generated. Try again.".to_string(),
            Error::Timeout { stage, .. } => format!("The {stage} took too long. Try again."),
            Error::InvalidWordLimit(_) => "Choose a word limit between 100 and 500.".to_string(),
            Error::TranscriptTooLong { .. } => {
                "The transcript is longer than max_transcript_chars allows. Raise the limit or pick a shorter video."
                    .to_string()
            }
            Error::ConfigurationMissing { name } => format!("Set {name} before running ytsum."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_missing_is_fatal() {
        let fatal = Error::ConfigurationMissing {
            name: "GOOGLE_API_KEY".to_string(),
        };
        assert!(!fatal.is_recoverable());

        let recoverable = [
            Error::InvalidReference { input: String::new() },
            Error::TranscriptUnavailable {
                video_id: "abc".to_string(),
                reason: UnavailableReason::NoCaptions,
            },
            Error::TranslationFailed {
                target: "es".to_string(),
                cause: "boom".to_string(),
            },
            Error::GenerationFailed {
                cause: "quota".to_string(),
            },
            Error::Timeout {
                stage: Stage::Generation,
                after: Duration::from_secs(5),
            },
        ];
        assert!(recoverable.iter().all(Error::is_recoverable));
    }

    #[test]
    fn test_unavailable_reasons_are_distinguishable() {
        let kinds = [
            UnavailableReason::NoCaptions.kind(),
            UnavailableReason::CaptionsDisabled.kind(),
            UnavailableReason::VideoNotFound.kind(),
        ];
        assert_ne!(kinds[0], kinds[1]);
        assert_ne!(kinds[1], kinds[2]);
        assert_ne!(kinds[0], kinds[2]);
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout {
            stage: Stage::Transcript,
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "transcript fetch timed out after 1.5s");
    }
}
