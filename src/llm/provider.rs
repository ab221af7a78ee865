//! Provider metadata and dispatch.
//!
//! `ModelClient` is what the rest of the app holds: it picks the concrete
//! provider once, at construction, and forwards every request to it.

use super::{AnthropicClient, GeminiClient, ModelRequest, SpeciesModel};
use crate::error::UpstreamError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Gemini,
    Anthropic,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::Gemini, ProviderId::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "gemini",
            ProviderId::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "GEMINI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::Gemini => super::prompts::GEMINI_MODEL,
            ProviderId::Anthropic => super::prompts::ANTHROPIC_MODEL,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderId::Gemini),
            "anthropic" => Ok(ProviderId::Anthropic),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Provider metadata shown by `natureid providers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: String,
    pub env_key: String,
    pub cost_per_identification: String,
}

/// All known providers and their display info.
pub fn all_providers() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo {
            id: ProviderId::Gemini,
            name: "Gemini Flash, vision + enforced JSON".to_string(),
            env_key: ProviderId::Gemini.env_key().to_string(),
            cost_per_identification: "Free tier / ~$0.0005".to_string(),
        },
        ProviderInfo {
            id: ProviderId::Anthropic,
            name: "Claude Haiku, vision".to_string(),
            env_key: ProviderId::Anthropic.env_key().to_string(),
            cost_per_identification: "~$0.01".to_string(),
        },
    ]
}

/// The active model client.
#[derive(Debug, Clone)]
pub enum ModelClient {
    Gemini(GeminiClient),
    Anthropic(AnthropicClient),
}

impl ModelClient {
    pub fn new(provider: ProviderId, api_key: String, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        match provider {
            ProviderId::Gemini => ModelClient::Gemini(GeminiClient::new(api_key, model)),
            ProviderId::Anthropic => ModelClient::Anthropic(AnthropicClient::new(api_key, model)),
        }
    }

    pub fn provider(&self) -> ProviderId {
        match self {
            ModelClient::Gemini(_) => ProviderId::Gemini,
            ModelClient::Anthropic(_) => ProviderId::Anthropic,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ModelClient::Gemini(c) => c.model(),
            ModelClient::Anthropic(c) => c.model(),
        }
    }
}

impl SpeciesModel for ModelClient {
    async fn generate(&self, request: &ModelRequest) -> Result<String, UpstreamError> {
        match self {
            ModelClient::Gemini(c) => c.generate(request).await,
            ModelClient::Anthropic(c) => c.generate(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_ids_case_insensitively() {
        assert_eq!("Gemini".parse::<ProviderId>().unwrap(), ProviderId::Gemini);
        assert_eq!(
            "ANTHROPIC".parse::<ProviderId>().unwrap(),
            ProviderId::Anthropic
        );
        assert!("local".parse::<ProviderId>().is_err());
    }

    #[test]
    fn client_defaults_to_provider_model() {
        let client = ModelClient::new(ProviderId::Gemini, "key".into(), None);
        assert_eq!(client.model(), super::super::prompts::GEMINI_MODEL);
        assert_eq!(client.provider(), ProviderId::Gemini);

        let client = ModelClient::new(
            ProviderId::Anthropic,
            "key".into(),
            Some("claude-custom".into()),
        );
        assert_eq!(client.model(), "claude-custom");
    }

    #[test]
    fn every_provider_is_listed() {
        let ids: Vec<ProviderId> = all_providers().iter().map(|p| p.id).collect();
        assert_eq!(ids, ProviderId::ALL.to_vec());
    }
}
