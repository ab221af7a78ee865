//! Boundary validation for model requests and responses.
//!
//! serde guarantees presence and types. These checks cover what the
//! declared shape says beyond that: well-formed data URIs, confidences in
//! [0, 1], 3-5 facts, a 0-10 sunlight scale, and plant care only on plants.

use super::types::{
    DescribeSpeciesInput, IdentificationInput, IdentificationResult, SpeciesDescription,
    SpeciesKind, TaxonomicRank,
};
use crate::capture::DataUri;
use crate::error::SchemaError;

pub const MIN_FACTS: usize = 3;
pub const MAX_FACTS: usize = 5;
pub const MAX_SUNLIGHT: u8 = 10;

/// Allowed gap between overall and species-rank confidence before it is logged.
const CONFIDENCE_DRIFT: f64 = 0.01;

pub fn validate_input(input: &IdentificationInput) -> Result<DataUri, SchemaError> {
    let uri = DataUri::parse(&input.photo_data_uri, "photoDataUri")?;
    if !uri.is_image() {
        return Err(SchemaError::new(
            "photoDataUri",
            format!("expected an image MIME type, got '{}'", uri.mime_type()),
        ));
    }
    if let Some(location) = &input.location {
        if location.trim().is_empty() {
            return Err(SchemaError::new("location", "is empty"));
        }
    }
    Ok(uri)
}

pub fn validate_describe_input(input: &DescribeSpeciesInput) -> Result<(), SchemaError> {
    if input.species_name.trim().is_empty() {
        return Err(SchemaError::new("speciesName", "is empty"));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::new(field, "is empty"));
    }
    Ok(())
}

fn require_unit(field: &str, value: f64) -> Result<(), SchemaError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SchemaError::new(
            field,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}

pub fn validate_result(result: &IdentificationResult) -> Result<(), SchemaError> {
    require_text("commonName", &result.common_name)?;
    require_text("scientificName", &result.scientific_name)?;
    require_unit("confidence", result.confidence)?;

    for rank in TaxonomicRank::ALL {
        require_text(
            &format!("taxonomy.{}", rank.key()),
            result.taxonomy.rank(rank),
        )?;
        require_unit(
            &format!("taxonomyConfidence.{}", rank.key()),
            result.taxonomy_confidence.rank(rank),
        )?;
    }

    let texts = [
        ("description", &result.description),
        ("physicalDescription", &result.physical_description),
        ("behaviorAndEcology", &result.behavior_and_ecology),
        ("geographicDistribution", &result.geographic_distribution),
        ("conservationStatus", &result.conservation_status),
        ("threats", &result.threats),
        ("humanUses", &result.human_uses),
        ("similarSpecies", &result.similar_species),
    ];
    for (field, value) in texts {
        require_text(field, value)?;
    }

    let facts = result.interesting_facts.len();
    if !(MIN_FACTS..=MAX_FACTS).contains(&facts) {
        return Err(SchemaError::new(
            "interestingFacts",
            format!("expected {}-{} entries, got {}", MIN_FACTS, MAX_FACTS, facts),
        ));
    }
    for (i, fact) in result.interesting_facts.iter().enumerate() {
        require_text(&format!("interestingFacts[{}]", i), fact)?;
    }

    if let Some(care) = &result.plant_care {
        if result.species_type != SpeciesKind::Plant {
            return Err(SchemaError::new(
                "plantCare",
                format!("only allowed for plants, subject is a {}", result.species_type.as_str()),
            ));
        }
        if care.sunlight > MAX_SUNLIGHT {
            return Err(SchemaError::new(
                "plantCare.sunlight",
                format!("must be within 0-{}, got {}", MAX_SUNLIGHT, care.sunlight),
            ));
        }
    }

    let drift = (result.confidence - result.taxonomy_confidence.species).abs();
    if drift > CONFIDENCE_DRIFT {
        log::warn!(
            "[LLM] Species-rank confidence {:.2} differs from overall {:.2}",
            result.taxonomy_confidence.species,
            result.confidence
        );
    }

    Ok(())
}

pub fn validate_description(output: &SpeciesDescription) -> Result<(), SchemaError> {
    require_text("description", &output.description)
}
