use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use crate::{Error, Result};

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Upper bound on characters sent per translation request
pub const MAX_CHUNK_CHARS: usize = 4500;

/// Translates text into a target language
#[async_trait]
pub trait Translator: Send + Sync {
    /// Failures are always `Error::TranslationFailed`.
    async fn translate(&self, text: &str, target: &str) -> Result<String>;
}

/// Google Translate web endpoint
pub struct GoogleTranslate {
    http: reqwest::Client,
}

impl GoogleTranslate {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TranslationFailed {
                target: String::new(),
                cause: format!("could not build HTTP client: {e}"),
            })?;
        Ok(Self { http })
    }

    async fn translate_chunk(&self, chunk: &str, target: &str) -> std::result::Result<String, String> {
        let resp = self
            .http
            .post(TRANSLATE_URL)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target), ("dt", "t")])
            .form(&[("q", chunk)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("translate endpoint returned {status}: {body}"));
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
        extract_translation(&json)
    }
}

#[async_trait]
impl Translator for GoogleTranslate {
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        debug!("Translating {} chars to {target} in {} chunk(s)", text.len(), chunks.len());

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let part = self
                .translate_chunk(chunk, target)
                .await
                .map_err(|cause| Error::TranslationFailed {
                    target: target.to_string(),
                    cause,
                })?;
            translated.push(part);
        }
        Ok(translated.join(" "))
    }
}

/// Split `text` into consecutive pieces of at most `max_chars` characters,
/// preferring whitespace boundaries. Splitting whitespace is dropped; a word longer
/// than `max_chars` is cut mid-word.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            chunks.push(rest);
            break;
        }

        // Byte offset just past the first `max_chars` characters
        let limit = rest.char_indices().nth(max_chars).map_or(rest.len(), |(i, _)| i);
        let split = rest[..limit]
            .rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(limit);

        chunks.push(&rest[..split]);
        rest = rest[split..].trim_start();
    }

    chunks
}

/// Pull the translated text out of the endpoint's nested-array response:
/// `[[["translated", "original", ...], ...], ...]`
fn extract_translation(json: &serde_json::Value) -> std::result::Result<String, String> {
    let segments = json
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| "unexpected translate response format".to_string())?;

    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0)?.as_str())
        .collect();

    if text.is_empty() {
        return Err("translate response contained no text".to_string());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_short_text() {
        assert_eq!(chunk_text("hello world", 100), vec!["hello world"]);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("", 10).is_empty());
        assert!(chunk_text("   ", 10).is_empty());
    }

    #[test]
    fn test_chunk_splits_on_whitespace() {
        let chunks = chunk_text("aaa bbb ccc ddd", 8);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_chunk_respects_limit_and_order() {
        let text = (0..500).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = chunk_text(&text, 60);
        assert!(chunks.iter().all(|c| c.chars().count() <= 60));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_chunk_cuts_long_word() {
        let chunks = chunk_text("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunk_multibyte() {
        let chunks = chunk_text("ééé ééé", 4);
        assert_eq!(chunks, vec!["ééé", "ééé"]);
    }

    #[test]
    fn test_extract_translation() {
        let json = serde_json::json!([
            [
                ["Hola mundo. ", "Hello world. ", null, null, 10],
                ["Adiós.", "Goodbye.", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(extract_translation(&json).unwrap(), "Hola mundo. Adiós.");
    }

    #[test]
    fn test_extract_translation_malformed() {
        assert!(extract_translation(&serde_json::json!({"error": "nope"})).is_err());
        assert!(extract_translation(&serde_json::json!([[]])).is_err());
    }
}
