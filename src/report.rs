//! Plain-text rendering of species reports and the favorites list.
//!
//! The report is split into tabs. `Care` only exists for plants. Per-rank
//! confidence is drawn as one bar per taxonomic rank.

use crate::favorites::FavoriteEntry;
use crate::llm::types::{IdentificationResult, PlantCare, TaxonomicRank};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTab {
    General,
    Taxonomy,
    Ecology,
    Extras,
    Care,
}

impl ReportTab {
    pub fn title(&self) -> &'static str {
        match self {
            ReportTab::General => "General",
            ReportTab::Taxonomy => "Taxonomy",
            ReportTab::Ecology => "Ecology",
            ReportTab::Extras => "Extras",
            ReportTab::Care => "Care",
        }
    }

    /// Tabs that apply to `result`, in display order.
    pub fn for_result(result: &IdentificationResult) -> Vec<ReportTab> {
        let mut tabs = vec![
            ReportTab::General,
            ReportTab::Taxonomy,
            ReportTab::Ecology,
            ReportTab::Extras,
        ];
        if result.plant_care.is_some() {
            tabs.push(ReportTab::Care);
        }
        tabs
    }
}

/// Badge shown next to the overall confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBadge {
    High,
    Medium,
    Low,
}

impl ConfidenceBadge {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.85 {
            ConfidenceBadge::High
        } else if confidence > 0.6 {
            ConfidenceBadge::Medium
        } else {
            ConfidenceBadge::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBadge::High => "high",
            ConfidenceBadge::Medium => "medium",
            ConfidenceBadge::Low => "low",
        }
    }
}

fn percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "## {}", title);
    let _ = writeln!(out, "{}", body.trim());
    let _ = writeln!(out);
}

/// One bar per taxonomic rank, kingdom first.
pub fn confidence_chart(result: &IdentificationResult) -> String {
    let mut out = String::new();
    for rank in TaxonomicRank::ALL {
        let value = result.taxonomy_confidence.rank(rank).clamp(0.0, 1.0);
        let filled = (value * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<8} {}{} {:>4}",
            rank.label(),
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            percent(value)
        );
    }
    out
}

fn render_care(out: &mut String, care: &PlantCare) {
    section(out, "Watering", &care.watering);
    section(
        out,
        "Sunlight",
        &format!("{}/10", care.sunlight),
    );
    section(out, "Soil", &care.soil);
    section(out, "Fertilizer", &care.fertilizer);
    section(out, "Pruning", &care.pruning);
    section(out, "Humidity", &care.humidity);
    section(out, "Flowering", &care.flowering);
    section(out, "Reproduction", &care.reproduction);
}

pub fn render_tab(result: &IdentificationResult, tab: ReportTab) -> String {
    let mut out = String::new();
    match tab {
        ReportTab::General => {
            section(&mut out, "Overview", &result.description);
            section(&mut out, "Physical description", &result.physical_description);
            if let Some(ch) = &result.characteristics {
                section(&mut out, "Size", &ch.size);
            }
        }
        ReportTab::Taxonomy => {
            let mut ranks = String::new();
            for rank in TaxonomicRank::ALL {
                let _ = writeln!(ranks, "{:<8} {}", rank.label(), result.taxonomy.rank(rank));
            }
            section(&mut out, "Classification", &ranks);
            section(&mut out, "Confidence by rank", &confidence_chart(result));
        }
        ReportTab::Ecology => {
            if let Some(ch) = &result.characteristics {
                section(&mut out, "Habitat", &ch.habitat);
                if let Some(diet) = &ch.diet {
                    section(&mut out, "Diet", diet);
                }
            }
            section(&mut out, "Geographic distribution", &result.geographic_distribution);
            section(&mut out, "Behavior and ecology", &result.behavior_and_ecology);
        }
        ReportTab::Extras => {
            section(&mut out, "Conservation status", &result.conservation_status);
            section(&mut out, "Threats", &result.threats);
            section(&mut out, "Human uses", &result.human_uses);
            let facts: Vec<String> = result
                .interesting_facts
                .iter()
                .map(|f| format!("- {}", f))
                .collect();
            section(&mut out, "Interesting facts", &facts.join("\n"));
            section(&mut out, "Similar species", &result.similar_species);
            let badge = ConfidenceBadge::from_confidence(result.confidence);
            section(
                &mut out,
                "Overall confidence",
                &format!("{} ({})", percent(result.confidence), badge.label()),
            );
        }
        ReportTab::Care => {
            if let Some(care) = &result.plant_care {
                render_care(&mut out, care);
            }
        }
    }
    out
}

/// Full report: header followed by every applicable tab.
pub fn render_report(result: &IdentificationResult, favorite: bool) -> String {
    let mut out = String::new();
    let star = if favorite { " ★" } else { "" };
    let _ = writeln!(out, "{}{}", result.common_name, star);
    let _ = writeln!(
        out,
        "{} · {} · {}",
        result.scientific_name,
        result.species_type.as_str(),
        percent(result.confidence)
    );
    let _ = writeln!(out);
    for tab in ReportTab::for_result(result) {
        let _ = writeln!(out, "=== {} ===", tab.title());
        out.push_str(&render_tab(result, tab));
    }
    out
}

pub fn render_favorites(entries: &[FavoriteEntry]) -> String {
    if entries.is_empty() {
        return "No favorites yet. Identify a species and save it with --favorite.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Favorites ({})", entries.len());
    for entry in entries {
        let photo = if entry.image.is_some() { "photo" } else { "no photo" };
        let _ = writeln!(
            out,
            "  {} ({}) [{}]",
            entry.result.common_name, entry.result.scientific_name, photo
        );
    }
    out
}
