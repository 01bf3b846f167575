use std::future::Future;
use std::time::Duration;

use log::{error, info, warn};

use crate::config::Config;
use crate::prompt::{PromptMode, build_prompt};
use crate::summarize::TextGenerator;
use crate::transcript::{TranscriptFetcher, TranscriptNormalizer};
use crate::translate::Translator;
use crate::{Error, Result, Stage, Transcript, VideoReference};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Request-independent knobs for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Target language for the transcript, also the caption-track hint
    pub language: String,
    pub translation_fallback: bool,
    pub max_transcript_chars: Option<usize>,
    pub transcript_timeout: Duration,
    pub translation_timeout: Duration,
    pub generation_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, language: Option<&str>) -> Self {
        Self {
            language: language
                .or(config.default_lang.as_deref())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            translation_fallback: config.translation_fallback.unwrap_or(true),
            max_transcript_chars: config.max_transcript_chars,
            transcript_timeout: config.timeouts.transcript(),
            translation_timeout: config.timeouts.translation(),
            generation_timeout: config.timeouts.generation(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default(), None)
    }
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub video_id: String,
    pub heading: String,
    pub text: String,
    pub transcript_language: String,
    pub translated: bool,
}

/// URL in, generated text out. Holds only shared read-only collaborators; every
/// request builds its own data inside `run`.
pub struct Pipeline<'a> {
    fetcher: &'a dyn TranscriptFetcher,
    translator: Option<&'a dyn Translator>,
    generator: &'a dyn TextGenerator,
    settings: PipelineSettings,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        fetcher: &'a dyn TranscriptFetcher,
        translator: Option<&'a dyn Translator>,
        generator: &'a dyn TextGenerator,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher,
            translator,
            generator,
            settings,
        }
    }

    pub async fn run(&self, raw_url: &str, mode: &PromptMode) -> Result<SummaryResult> {
        let reference = VideoReference::parse(raw_url);
        let video_id = reference
            .video_id()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidReference {
                input: reference.raw_url().to_string(),
            })?;
        info!("Processing video {video_id}");

        let (transcript, translated) = self.transcript(&video_id).await?;

        if let Some(limit) = self.settings.max_transcript_chars {
            let chars = transcript.text.chars().count();
            if chars > limit {
                warn!("Transcript for {video_id} has {chars} chars, limit is {limit}");
                return Err(Error::TranscriptTooLong { chars, limit });
            }
        }

        let prompt = build_prompt(mode, &transcript);
        let text = with_timeout(
            Stage::Generation,
            self.settings.generation_timeout,
            self.generator.generate(&prompt),
        )
        .await?;

        if text.trim().is_empty() {
            error!("Generator returned empty text for {video_id}");
            return Err(Error::GenerationFailed {
                cause: "empty response".to_string(),
            });
        }

        Ok(SummaryResult {
            video_id,
            heading: mode.heading().to_string(),
            text,
            transcript_language: transcript.language,
            translated,
        })
    }

    /// Fetch and, when needed, translate the transcript. Translation failures fall
    /// back to the source-language transcript when configured. The flag reports
    /// whether the returned text was translated.
    async fn transcript(&self, video_id: &str) -> Result<(Transcript, bool)> {
        let target = self.settings.language.as_str();
        let normalizer = TranscriptNormalizer::new(self.fetcher, self.translator);

        let transcript = with_timeout(
            Stage::Transcript,
            self.settings.transcript_timeout,
            normalizer.fetch(video_id, target),
        )
        .await?;

        let source_language = transcript.language.clone();
        let fallback = (self.settings.translation_fallback && normalizer.needs_translation(&transcript, target))
            .then(|| transcript.clone());

        let translated = with_timeout(
            Stage::Translation,
            self.settings.translation_timeout,
            normalizer.translate(transcript, target),
        )
        .await;

        match (translated, fallback) {
            (Ok(t), _) => {
                let translated = t.language != source_language;
                Ok((t, translated))
            }
            (Err(e @ (Error::TranslationFailed { .. } | Error::Timeout { .. })), Some(original)) => {
                warn!("{e}; using untranslated {} transcript", original.language);
                Ok((original, false))
            }
            (Err(e), _) => Err(e),
        }
    }
}

async fn with_timeout<T>(stage: Stage, after: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(after, fut).await.map_err(|_| {
        error!("{stage} timed out after {after:?}");
        Error::Timeout { stage, after }
    })?
}
