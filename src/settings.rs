//! Settings and provider resolution.
//!
//! Handles:
//! - Loading `.env.local` / `.env`
//! - Provider selection (explicit override or first configured key)
//! - API key storage (OS keychain via keyring crate + env var)
//! - Provider connection testing
//! - Data directory and default location

use crate::error::UpstreamError;
use crate::favorites::FileBackend;
use crate::llm::{ModelClient, ProviderId};
use std::path::PathBuf;

const KEYRING_SERVICE: &str = "natureid";

/// Load `.env.local`, falling back to `.env`, from the working directory.
pub fn load_env_files() {
    'env_load: for env_file in [".env.local", ".env"] {
        let path = PathBuf::from(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => log::info!("[SETTINGS] Loaded {}", path.display()),
                Err(e) => log::warn!("[SETTINGS] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }
}

/// Runtime configuration, resolved from env vars. CLI flags override fields.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: ProviderId,
    /// Model id override (`NATUREID_MODEL`).
    pub model: Option<String>,
    /// Favorites directory (`NATUREID_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Fixed sighting location (`NATUREID_LOCATION`), `"lat,lon"`.
    pub location: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            provider: resolve_provider(),
            model: non_empty_env("NATUREID_MODEL"),
            data_dir: non_empty_env("NATUREID_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(FileBackend::default_dir),
            location: non_empty_env("NATUREID_LOCATION"),
        }
    }

    /// Build the client for the active provider. Fails without a key.
    pub fn model_client(&self) -> Result<ModelClient, UpstreamError> {
        let key = api_key(self.provider)
            .ok_or_else(|| UpstreamError::MissingApiKey(self.provider.to_string()))?;
        Ok(ModelClient::new(self.provider, key, self.model.clone()))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ── Provider resolution ──────────────────────────────────────────────

/// Determine which LLM provider to use.
///
/// Priority:
/// 1. LLM_PROVIDER env var (explicit override: "gemini" or "anthropic")
/// 2. First provider with an API key set (env var or keychain)
/// 3. "gemini" as final default
pub fn resolve_provider() -> ProviderId {
    if let Ok(p) = std::env::var("LLM_PROVIDER") {
        match p.parse::<ProviderId>() {
            Ok(provider) => {
                log::info!("[LLM] Provider override: {}", provider);
                return provider;
            }
            Err(e) => log::warn!("[LLM] Ignoring LLM_PROVIDER: {}", e),
        }
    }

    for provider in ProviderId::ALL {
        if api_key(provider).is_some() {
            return provider;
        }
    }

    // Default (identification will fail with MissingApiKey)
    ProviderId::Gemini
}

/// API key for a provider: env var first, then the OS keychain.
pub fn api_key(provider: ProviderId) -> Option<String> {
    if let Some(key) = non_empty_env(provider.env_key()) {
        return Some(key);
    }

    let entry = keyring::Entry::new(KEYRING_SERVICE, provider.as_str()).ok()?;
    match entry.get_password() {
        Ok(key) if !key.is_empty() => {
            log::info!("[SETTINGS] Loaded {} key from OS keychain", provider);
            Some(key)
        }
        _ => None,
    }
}

/// Save an API key to the OS keychain.
pub fn save_api_key(provider: ProviderId, api_key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, provider.as_str())
        .map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(api_key)
        .map_err(|e| format!("Failed to save key: {}", e))?;
    log::info!("[SETTINGS] API key saved for provider: {}", provider);
    Ok(())
}

/// Send a minimal request and check for a valid response.
pub async fn test_provider(provider: ProviderId) -> Result<bool, UpstreamError> {
    let key = api_key(provider).ok_or_else(|| UpstreamError::MissingApiKey(provider.to_string()))?;

    let client = reqwest::Client::new();
    let req = match provider {
        ProviderId::Anthropic => client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": provider.default_model(),
                "max_tokens": 50,
                "messages": [{"role": "user", "content": "Reply with just: ok"}]
            })),
        ProviderId::Gemini => client
            .post(format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                provider.default_model()
            ))
            .header("x-goog-api-key", key)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Reply with just: ok"}]}],
                "generationConfig": {"maxOutputTokens": 50}
            })),
    };

    let resp = req.send().await?;
    let ok = resp.status().is_success();
    log::info!("[SETTINGS] Test {} status: {}", provider, resp.status());
    Ok(ok)
}
