//! Gemini Flash provider: single-shot `generateContent` via Google AI API.
//!
//! Key differences from Anthropic:
//! - API key in the `x-goog-api-key` header, never in the URL
//! - `responseMimeType: "application/json"` enforces valid JSON (no fence stripping needed)
//! - Image travels as an `inlineData` part next to the text part
//! - Token usage in `usageMetadata`

use super::response::{self, TokenUsage};
use super::{ModelRequest, SpeciesModel};
use crate::error::UpstreamError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini Flash pricing (as of Feb 2026):
/// Input:  $0.10 per 1M tokens (under 128k context)
/// Output: $0.40 per 1M tokens (under 128k context)
const INPUT_COST_PER_MILLION: f64 = 0.10;
const OUTPUT_COST_PER_MILLION: f64 = 0.40;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    fn request_body(request: &ModelRequest) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": request.user_message })];
        if let Some(image) = &request.image {
            parts.push(serde_json::json!({
                "inlineData": {
                    "mimeType": image.mime_type(),
                    "data": image.payload(),
                }
            }));
        }

        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": parts
                }
            ],
            "systemInstruction": {
                "parts": [
                    {
                        "text": request.system
                    }
                ]
            },
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
                "temperature": 0.2,
                "responseMimeType": "application/json"
            }
        })
    }
}

impl SpeciesModel for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, UpstreamError> {
        log::info!("[LLM] Provider: gemini");
        log::info!("[LLM] Model: {}", self.model);

        let url = self.endpoint();
        let start = std::time::Instant::now();

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| {
                let err = UpstreamError::from(e);
                log::error!("[LLM] {}", err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[LLM] Gemini API returned {}: {}", status, body);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());

        TokenUsage::from_gemini(&body).log(INPUT_COST_PER_MILLION, OUTPUT_COST_PER_MILLION);

        response::extract_gemini_text(&body).ok_or_else(|| {
            log::warn!("[LLM] Gemini reply had no text: {}", body);
            UpstreamError::EmptyResponse
        })
    }
}
