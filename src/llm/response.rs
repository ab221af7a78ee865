//! Provider response parsing: text extraction and JSON cleanup.

/// Strip a surrounding ```json ... ``` fence if the model added one.
///
/// Gemini with `responseMimeType` returns bare JSON; Claude sometimes
/// fences it anyway.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the info string ("json") up to the first newline. A one-line
    // fence has no newline, so only a leading "json" tag is dropped.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}

/// Concatenate the text parts of the first Gemini candidate.
///
/// Gemini format: candidates[0].content.parts[*].text
pub fn extract_gemini_text(body: &serde_json::Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Concatenate the text blocks of an Anthropic Messages response.
pub fn extract_anthropic_text(body: &serde_json::Value) -> Option<String> {
    let blocks = body.get("content")?.as_array()?;
    let text: String = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Token counts reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn from_gemini(body: &serde_json::Value) -> Self {
        let usage = &body["usageMetadata"];
        Self {
            input: usage["promptTokenCount"].as_u64().unwrap_or(0),
            output: usage["candidatesTokenCount"].as_u64().unwrap_or(0),
        }
    }

    pub fn from_anthropic(body: &serde_json::Value) -> Self {
        let usage = &body["usage"];
        Self {
            input: usage["input_tokens"].as_u64().unwrap_or(0),
            output: usage["output_tokens"].as_u64().unwrap_or(0),
        }
    }

    /// Estimated cost in USD given per-million-token prices.
    pub fn cost(&self, input_per_million: f64, output_per_million: f64) -> f64 {
        (self.input as f64 * input_per_million + self.output as f64 * output_per_million)
            / 1_000_000.0
    }

    pub fn log(&self, input_per_million: f64, output_per_million: f64) {
        if self.input == 0 && self.output == 0 {
            return;
        }
        log::info!("[LLM] Input tokens: {}", self.input);
        log::info!("[LLM] Output tokens: {}", self.output);
        log::info!(
            "[LLM] Estimated cost: ${:.6}",
            self.cost(input_per_million, output_per_million)
        );
    }
}
