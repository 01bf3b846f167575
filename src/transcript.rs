use async_trait::async_trait;
use log::{debug, error, info};

use crate::translate::Translator;
use crate::{CaptionFragment, CaptionTrack, Error, Result, Transcript};

/// Source of timed captions for a video
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the caption track closest to `language_hint`, fragments in source order.
    /// Failures are always `Error::TranscriptUnavailable`.
    async fn fetch(&self, video_id: &str, language_hint: &str) -> Result<CaptionTrack>;
}

/// Join fragment texts with single spaces, in the order given
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Compare language codes case-insensitively. A bare code matches any region of
/// the same language; two regioned codes must match exactly.
pub fn same_language(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    match (a.split_once(['-', '_']), b.split_once(['-', '_'])) {
        (Some(_), Some(_)) => false,
        (Some((primary, _)), None) => primary.eq_ignore_ascii_case(b),
        (None, Some((primary, _))) => primary.eq_ignore_ascii_case(a),
        (None, None) => false,
    }
}

/// Turns a video's caption track into a single plain-text transcript
pub struct TranscriptNormalizer<'a> {
    fetcher: &'a dyn TranscriptFetcher,
    translator: Option<&'a dyn Translator>,
}

impl<'a> TranscriptNormalizer<'a> {
    pub fn new(fetcher: &'a dyn TranscriptFetcher, translator: Option<&'a dyn Translator>) -> Self {
        Self { fetcher, translator }
    }

    /// Fetch the captions for `video_id` and join them.
    pub async fn fetch(&self, video_id: &str, language_hint: &str) -> Result<Transcript> {
        let track = self.fetcher.fetch(video_id, language_hint).await.inspect_err(|e| {
            if let Error::TranscriptUnavailable { reason, .. } = e {
                error!("Transcript unavailable for {video_id} [{}]: {reason}", reason.kind());
            }
        })?;

        debug!(
            "Fetched {} caption fragments for {video_id} (lang={})",
            track.fragments.len(),
            track.language
        );

        Ok(Transcript {
            text: join_fragments(&track.fragments),
            language: track.language,
        })
    }

    /// Whether `translate` would call the translator for this transcript
    pub fn needs_translation(&self, transcript: &Transcript, target: &str) -> bool {
        self.translator.is_some() && !same_language(&transcript.language, target)
    }

    /// Translate `transcript` into `target` when its language differs and a translator is set.
    /// Returns the transcript unchanged otherwise.
    pub async fn translate(&self, transcript: Transcript, target: &str) -> Result<Transcript> {
        let Some(translator) = self.translator.filter(|_| self.needs_translation(&transcript, target)) else {
            debug!("Keeping transcript in {}", transcript.language);
            return Ok(transcript);
        };

        info!("Translating transcript from {} to {target}", transcript.language);
        let text = translator.translate(&transcript.text, target).await.inspect_err(|e| {
            error!("Translation to {target} failed: {e}");
        })?;

        Ok(Transcript {
            text,
            language: target.to_string(),
        })
    }

    /// Fetch, join and, when needed, translate in one step
    pub async fn normalize(&self, video_id: &str, target_language: &str) -> Result<Transcript> {
        let transcript = self.fetch(video_id, target_language).await?;
        self.translate(transcript, target_language).await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::fakes::{FakeFetcher, FakeTranslator};
    use super::*;
    use crate::UnavailableReason;

    fn fragments(texts: &[&str]) -> Vec<CaptionFragment> {
        texts.iter().map(|t| CaptionFragment::new(*t, 0.0, 1.0)).collect()
    }

    #[test]
    fn test_join_fragments() {
        assert_eq!(join_fragments(&fragments(&["Hello", "world"])), "Hello world");
    }

    #[test]
    fn test_join_preserves_order() {
        let forward = fragments(&["one", "two", "three"]);
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(join_fragments(&forward), "one two three");
        assert_eq!(join_fragments(&reversed), "three two one");
    }

    #[test]
    fn test_join_does_not_trim_or_dedupe() {
        let joined = join_fragments(&fragments(&[" padded ", "again", "again", ""]));
        assert_eq!(joined, " padded  again again ");
    }

    #[test]
    fn test_join_empty() {
        assert_eq!(join_fragments(&[]), "");
    }

    #[test]
    fn test_same_language() {
        assert!(same_language("en", "en"));
        assert!(same_language("EN", "en"));
        assert!(same_language("en", "en-GB"));
        assert!(same_language("zh-cn", "zh-CN"));
        assert!(!same_language("zh-CN", "zh-TW"));
        assert!(!same_language("en", "es"));
    }

    #[tokio::test]
    async fn test_normalize_without_translation() {
        let fetcher = FakeFetcher::with_texts("en", &["Hello", "world"]);
        let translator = FakeTranslator::ok();
        let normalizer = TranscriptNormalizer::new(&fetcher, Some(&translator));

        let transcript = normalizer.normalize("abc123", "en").await.unwrap();
        assert_eq!(transcript.text, "Hello world");
        assert_eq!(transcript.language, "en");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_normalize_translates_other_language() {
        let fetcher = FakeFetcher::with_texts("en", &["Hello", "world"]);
        let translator = FakeTranslator::ok();
        let normalizer = TranscriptNormalizer::new(&fetcher, Some(&translator));

        let transcript = normalizer.normalize("abc123", "es").await.unwrap();
        assert_eq!(transcript.text, "[es] Hello world");
        assert_eq!(transcript.language, "es");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_normalize_without_translator_keeps_source_language() {
        let fetcher = FakeFetcher::with_texts("de", &["Hallo", "Welt"]);
        let normalizer = TranscriptNormalizer::new(&fetcher, None);

        let transcript = normalizer.normalize("abc123", "en").await.unwrap();
        assert_eq!(transcript.text, "Hallo Welt");
        assert_eq!(transcript.language, "de");
    }

    #[tokio::test]
    async fn test_translation_failure_is_distinct() {
        let fetcher = FakeFetcher::with_texts("en", &["Hello"]);
        let translator = FakeTranslator::failing();
        let normalizer = TranscriptNormalizer::new(&fetcher, Some(&translator));

        let err = normalizer.normalize("abc123", "fr").await.unwrap_err();
        assert!(matches!(err, Error::TranslationFailed { ref target, .. } if target == "fr"));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_translation() {
        let fetcher = FakeFetcher::failing(UnavailableReason::CaptionsDisabled);
        let translator = FakeTranslator::ok();
        let normalizer = TranscriptNormalizer::new(&fetcher, Some(&translator));

        let err = normalizer.normalize("abc123", "fr").await.unwrap_err();
        assert!(matches!(
            err,
            Error::TranscriptUnavailable {
                reason: UnavailableReason::CaptionsDisabled,
                ..
            }
        ));
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }
}
