//! Anthropic Claude provider: single-shot Messages API call.
//!
//! The photo is sent as a base64 image block ahead of the text block.
//! Claude does not enforce JSON output, so replies may come fenced;
//! `response::strip_code_fences` handles that upstream.

use super::response::{self, TokenUsage};
use super::{ModelRequest, SpeciesModel};
use crate::error::UpstreamError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// Haiku pricing: $0.80/M input, $4/M output
const INPUT_COST_PER_MILLION: f64 = 0.80;
const OUTPUT_COST_PER_MILLION: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl AnthropicClient {
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

    fn request_body(&self, request: &ModelRequest) -> serde_json::Value {
        let mut content = Vec::new();
        if let Some(image) = &request.image {
            content.push(serde_json::json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.mime_type(),
                    "data": image.payload(),
                }
            }));
        }
        content.push(serde_json::json!({
            "type": "text",
            "text": request.user_message,
        }));

        serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": [
                {
                    "role": "user",
                    "content": content,
                }
            ]
        })
    }
}

impl SpeciesModel for AnthropicClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, UpstreamError> {
        log::info!("[LLM] Provider: anthropic");
        log::info!("[LLM] Model: {}", self.model);

        let start = std::time::Instant::now();

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(request))
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
            log::error!("[LLM] API returned {}: {}", status, body);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());

        TokenUsage::from_anthropic(&body).log(INPUT_COST_PER_MILLION, OUTPUT_COST_PER_MILLION);

        response::extract_anthropic_text(&body).ok_or(UpstreamError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::DataUri;

    #[test]
    fn image_block_precedes_text() {
        let client = AnthropicClient::new("k", "claude-test");
        let request = ModelRequest {
            system: "sys",
            user_message: "identify".into(),
            image: Some(DataUri::parse("data:image/png;base64,iVBO", "photoDataUri").unwrap()),
            max_tokens: 64,
        };
        let body = client.request_body(&request);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[1]["text"], "identify");
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 64);
    }
}
