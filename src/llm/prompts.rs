//! Prompt templates: the contract between NatureID and the model.
//!
//! The system prompts pin the JSON shape; `schema.rs` enforces it on the
//! way back. Change both together.

use super::types::SpeciesKind;

pub const GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const ANTHROPIC_MODEL: &str = "claude-haiku-4-5-20251001";

/// Identification reports are long: seven free-text sections plus care.
pub const IDENTIFY_MAX_TOKENS: u32 = 4096;
pub const DESCRIBE_MAX_TOKENS: u32 = 512;

/// Location marker sent when no position is available.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// IDENTIFY system prompt.
///
/// Instructs the model to identify the organism in the attached photo and
/// return a full species report as JSON.
pub const IDENTIFY_SYSTEM_PROMPT: &str = r#"You are an expert naturalist and science communicator. From a photo and an optional sighting location you identify the species shown (plant, animal or mushroom) and write a complete, well-structured report about it. The information must be rigorous, detailed and easy for a general audience to follow.

<rules>
1. ALWAYS respond with valid JSON matching the response format below. No prose, no markdown, no explanation.
2. Fill every field with as much relevant information as possible.
3. All confidence values are floats between 0.0 and 1.0.
4. taxonomyConfidence.species MUST equal the overall confidence.
5. interestingFacts contains between 3 and 5 entries.
6. Include plantCare ONLY when speciesType is "plant". Omit it otherwise.
7. plantCare.sunlight is an integer from 0 (deep shade) to 10 (full sun).
8. Use the sighting location, when known, to prefer species that occur there.
</rules>

<response_format>
{
  "commonName": "<common name>",
  "scientificName": "<Latin binomial>",
  "confidence": <float 0.0-1.0>,
  "speciesType": "<plant|animal|mushroom>",
  "taxonomy": {
    "kingdom": "", "phylum": "", "class": "", "order": "",
    "family": "", "genus": "", "species": ""
  },
  "taxonomyConfidence": {
    "kingdom": <float>, "phylum": <float>, "class": <float>, "order": <float>,
    "family": <float>, "genus": <float>, "species": <float>
  },
  "description": "<general overview>",
  "characteristics": { "habitat": "", "diet": "<animals only, else omit>", "size": "" },
  "physicalDescription": "",
  "behaviorAndEcology": "",
  "geographicDistribution": "<continents and countries>",
  "conservationStatus": "<IUCN or other authority status>",
  "threats": "",
  "humanUses": "",
  "similarSpecies": "",
  "interestingFacts": ["", "", ""],
  "plantCare": {
    "watering": "", "sunlight": <int 0-10>, "soil": "", "fertilizer": "",
    "pruning": "", "humidity": "", "flowering": "", "reproduction": ""
  }
}
</response_format>"#;

/// User turn for IDENTIFY. The photo travels as a separate image part.
pub fn build_identify_message(location: &str) -> String {
    format!(
        r#"<sighting>
  <location>{location}</location>
</sighting>

Identify the species in the attached image and produce the report in the specified JSON format."#
    )
}

/// DESCRIBE system prompt.
pub const DESCRIBE_SYSTEM_PROMPT: &str = r#"You are a knowledgeable naturalist. Generate a concise description of the given species, focusing on its key characteristics and interesting facts.

Respond with ONLY this JSON structure. No other text.
{
  "description": "<short, informative description>"
}"#;

pub fn build_describe_message(species_name: &str, kind: SpeciesKind) -> String {
    format!(
        "Species type: {}\nSpecies name: {}",
        kind.as_str(),
        species_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_message_carries_location() {
        let msg = build_identify_message("40.4, -3.7");
        assert!(msg.contains("<location>40.4, -3.7</location>"));
    }

    #[test]
    fn describe_message_names_kind_and_species() {
        let msg = build_describe_message("Amanita muscaria", SpeciesKind::Mushroom);
        assert!(msg.contains("mushroom"));
        assert!(msg.contains("Amanita muscaria"));
    }
}
