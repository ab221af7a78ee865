//! Request/response types for the two model operations.
//!
//! Field names match the JSON the model is instructed to produce, so a
//! response deserializes directly into `IdentificationResult`. Shape checks
//! that serde cannot express (ranges, list lengths) live in `schema.rs`.

use serde::{Deserialize, Serialize};

/// Input to the identify operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationInput {
    /// `data:<mimetype>;base64,<encoded_data>`
    pub photo_data_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Broad kind of organism. Plant care only applies to `Plant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesKind {
    Plant,
    Animal,
    Mushroom,
}

impl SpeciesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeciesKind::Plant => "plant",
            SpeciesKind::Animal => "animal",
            SpeciesKind::Mushroom => "mushroom",
        }
    }
}

impl std::str::FromStr for SpeciesKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plant" => Ok(SpeciesKind::Plant),
            "animal" => Ok(SpeciesKind::Animal),
            "mushroom" | "fungus" => Ok(SpeciesKind::Mushroom),
            other => Err(format!(
                "unknown species type '{}' (expected plant, animal or mushroom)",
                other
            )),
        }
    }
}

/// Ranks in containment order, kingdom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomicRank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl TaxonomicRank {
    pub const ALL: [TaxonomicRank; 7] = [
        TaxonomicRank::Kingdom,
        TaxonomicRank::Phylum,
        TaxonomicRank::Class,
        TaxonomicRank::Order,
        TaxonomicRank::Family,
        TaxonomicRank::Genus,
        TaxonomicRank::Species,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaxonomicRank::Kingdom => "Kingdom",
            TaxonomicRank::Phylum => "Phylum",
            TaxonomicRank::Class => "Class",
            TaxonomicRank::Order => "Order",
            TaxonomicRank::Family => "Family",
            TaxonomicRank::Genus => "Genus",
            TaxonomicRank::Species => "Species",
        }
    }

    /// JSON key used in `taxonomy` / `taxonomyConfidence`.
    pub fn key(&self) -> &'static str {
        match self {
            TaxonomicRank::Kingdom => "kingdom",
            TaxonomicRank::Phylum => "phylum",
            TaxonomicRank::Class => "class",
            TaxonomicRank::Order => "order",
            TaxonomicRank::Family => "family",
            TaxonomicRank::Genus => "genus",
            TaxonomicRank::Species => "species",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub kingdom: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
}

impl Taxonomy {
    pub fn rank(&self, rank: TaxonomicRank) -> &str {
        match rank {
            TaxonomicRank::Kingdom => &self.kingdom,
            TaxonomicRank::Phylum => &self.phylum,
            TaxonomicRank::Class => &self.class,
            TaxonomicRank::Order => &self.order,
            TaxonomicRank::Family => &self.family,
            TaxonomicRank::Genus => &self.genus,
            TaxonomicRank::Species => &self.species,
        }
    }
}

/// Per-rank model confidence, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfidence {
    pub kingdom: f64,
    pub phylum: f64,
    pub class: f64,
    pub order: f64,
    pub family: f64,
    pub genus: f64,
    pub species: f64,
}

impl TaxonomyConfidence {
    pub fn rank(&self, rank: TaxonomicRank) -> f64 {
        match rank {
            TaxonomicRank::Kingdom => self.kingdom,
            TaxonomicRank::Phylum => self.phylum,
            TaxonomicRank::Class => self.class,
            TaxonomicRank::Order => self.order,
            TaxonomicRank::Family => self.family,
            TaxonomicRank::Genus => self.genus,
            TaxonomicRank::Species => self.species,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub habitat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    pub size: String,
}

/// Care guide, only produced when the subject is a plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantCare {
    pub watering: String,
    /// Light requirement on a 0 (deep shade) to 10 (full sun) scale.
    pub sunlight: u8,
    pub soil: String,
    pub fertilizer: String,
    pub pruning: String,
    pub humidity: String,
    pub flowering: String,
    pub reproduction: String,
}

/// The structured report returned by the identify operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    pub common_name: String,
    pub scientific_name: String,
    pub confidence: f64,
    pub species_type: SpeciesKind,
    pub taxonomy: Taxonomy,
    pub taxonomy_confidence: TaxonomyConfidence,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<Characteristics>,
    pub physical_description: String,
    pub behavior_and_ecology: String,
    pub geographic_distribution: String,
    pub conservation_status: String,
    pub threats: String,
    pub human_uses: String,
    pub similar_species: String,
    pub interesting_facts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_care: Option<PlantCare>,
}

/// Input to the describe operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeSpeciesInput {
    pub species_name: String,
    pub species_type: SpeciesKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDescription {
    pub description: String,
}
