use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};

use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generative-text backend: prompt in, text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Failures are always `Error::GenerationFailed`; returned text is never empty.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str, endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::GenerationFailed {
                cause: format!("could not build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_key,
            model: model.trim().to_string(),
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
        })
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn call(&self, prompt: &str) -> std::result::Result<String, String> {
        let body = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        { "text": prompt }
                    ]
                }
            ]
        });

        let resp = self
            .http
            .post(self.request_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e.without_url()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Gemini API returned {status}: {body}"));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| format!("malformed response: {}", e.without_url()))?;
        extract_gemini_text(&json)
    }
}

/// Resolve the API key from the environment; absence is fatal at startup
pub fn api_key_from_env() -> Result<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::ConfigurationMissing {
            name: API_KEY_ENV.to_string(),
        })
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating via Gemini model {} ({} prompt chars)", self.model, prompt.len());

        self.call(prompt).await.map_err(|cause| {
            error!("Gemini generation failed: {cause}");
            Error::GenerationFailed { cause }
        })
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> std::result::Result<String, String> {
    if let Some(reason) = json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(format!("prompt blocked: {reason}"));
    }

    let text: String = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text")?.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err("unexpected Gemini API response format".to_string());
    }
    Ok(text)
}
