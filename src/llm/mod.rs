//! LLM domain: the prompt invocation wrapper.
//!
//! Public API for the model layer of NatureID.
//! External code should only use the functions exported here.
//!
//! Providers:
//!   - Google Gemini Flash (gemini.rs)
//!   - Anthropic Claude Haiku (anthropic.rs)
//!
//! Shared:
//!   - prompts.rs : system prompts + user message builders
//!   - schema.rs  : boundary validation of requests and responses
//!   - response.rs: text extraction, fence stripping, token usage
//!   - provider.rs: provider metadata + `ModelClient` dispatch

mod anthropic;
mod gemini;
pub mod prompts;
pub mod provider;
pub mod response;
pub mod schema;
pub mod types;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use provider::{ModelClient, ProviderId};
pub use types::{
    DescribeSpeciesInput, IdentificationInput, IdentificationResult, SpeciesDescription,
    SpeciesKind,
};

use crate::capture::DataUri;
use crate::error::{IdentifyError, UpstreamError};
use std::future::Future;

/// One single-shot request to a generative model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system: &'static str,
    pub user_message: String,
    pub image: Option<DataUri>,
    pub max_tokens: u32,
}

/// The narrow seam in front of the external model.
///
/// Implementations send the request once and return the raw text of the
/// reply. Parsing and validation happen in this module, not in providers.
pub trait SpeciesModel {
    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

/// Parse model text as JSON into `T`.
fn parse_reply<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, UpstreamError> {
    let json_str = response::strip_code_fences(raw);
    serde_json::from_str::<T>(&json_str).map_err(|e| {
        log::warn!(
            "[LLM] Failed to parse reply: {} (raw: {})",
            e,
            json_str.chars().take(200).collect::<String>()
        );
        UpstreamError::Malformed(e.to_string())
    })
}

/// Identify the species in a photo.
///
/// Input is validated before any network call. The model is called exactly
/// once; its reply must satisfy the output schema or the call fails with
/// `IdentifyError::Upstream`.
pub async fn identify_species<M: SpeciesModel>(
    model: &M,
    input: &IdentificationInput,
) -> Result<IdentificationResult, IdentifyError> {
    let image = schema::validate_input(input).map_err(IdentifyError::InvalidInput)?;
    let location = input
        .location
        .as_deref()
        .unwrap_or(prompts::UNKNOWN_LOCATION);

    let request = ModelRequest {
        system: prompts::IDENTIFY_SYSTEM_PROMPT,
        user_message: prompts::build_identify_message(location),
        image: Some(image),
        max_tokens: prompts::IDENTIFY_MAX_TOKENS,
    };

    let start = std::time::Instant::now();
    let raw = model.generate(&request).await?;
    log::info!("[LLM] Identify latency: {}ms", start.elapsed().as_millis());

    let result: IdentificationResult = parse_reply(&raw)?;
    schema::validate_result(&result).map_err(UpstreamError::Schema)?;

    log::info!(
        "[LLM] Identified {} ({}), confidence {:.2}",
        result.common_name,
        result.scientific_name,
        result.confidence
    );
    Ok(result)
}

/// Generate a short description of a named species.
pub async fn describe_species<M: SpeciesModel>(
    model: &M,
    input: &DescribeSpeciesInput,
) -> Result<SpeciesDescription, IdentifyError> {
    schema::validate_describe_input(input).map_err(IdentifyError::InvalidInput)?;

    let request = ModelRequest {
        system: prompts::DESCRIBE_SYSTEM_PROMPT,
        user_message: prompts::build_describe_message(&input.species_name, input.species_type),
        image: None,
        max_tokens: prompts::DESCRIBE_MAX_TOKENS,
    };

    let raw = model.generate(&request).await?;
    let output: SpeciesDescription = parse_reply(&raw)?;
    schema::validate_description(&output).map_err(UpstreamError::Schema)?;
    Ok(output)
}
