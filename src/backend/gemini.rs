//! Google Gemini backend implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, LanguageBackend};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    url: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: &str) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            url: format!("{}/{}:generateContent", API_BASE, model),
        })
    }
}

#[async_trait]
impl LanguageBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                BackendError::transport(format!("Failed to read response: {}", e.without_url()))
            })?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map(|resp| resp.error.message)
                .unwrap_or(body);
            return Err(classify_status(status.as_u16(), &message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::unknown(format!("Failed to parse response: {}", e)))?;

        let text = extract_text(gemini_response)?;
        debug!(chars = text.len(), "backend response received");
        Ok(text)
    }
}

/// Classify a failed send. The URL is stripped so messages stay speakable.
fn send_error(e: reqwest::Error) -> BackendError {
    let e = e.without_url();
    if e.is_timeout() {
        BackendError::transport(format!("Request timeout: {}", e))
    } else if e.is_connect() {
        BackendError::transport(format!("Connection failed: {}", e))
    } else {
        BackendError::unknown(format!("Request failed: {}", e))
    }
}

/// Map an HTTP error status onto a backend error kind
fn classify_status(status: u16, message: &str) -> BackendError {
    match status {
        400 | 401 | 403 | 404 => BackendError::invalid_request(format!("HTTP {}: {}", status, message)),
        429 => BackendError::quota(format!("Rate limit exceeded: {}", message)),
        500..=599 => BackendError::unavailable(format!("Server error: {}", message)),
        _ => BackendError::unknown(format!("HTTP {}: {}", status, message)),
    }
}

/// Pull the candidate text out of a successful response
fn extract_text(resp: GeminiResponse) -> Result<String, BackendError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(BackendError::policy_block(format!("Prompt blocked: {}", reason)));
    }

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::unknown("No candidates in response"))?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(BackendError::policy_block("Response blocked by safety filters"));
    }

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(BackendError::unknown("Empty response"));
    }
    Ok(text)
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
