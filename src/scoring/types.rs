use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::PARSE_FAILURE_MESSAGE;

/// Scoring category. Serialized as its snake_case key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Alignment with latest conservation science (0-25).
    #[serde(rename = "conservation_science_alignment")]
    ConservationScience,
    /// Community impact (0-20).
    CommunityImpact,
    /// Biodiversity outcomes (0-30).
    BiodiversityOutcomes,
    /// Sustainability (0-15).
    Sustainability,
    /// Replicability (0-10).
    Replicability,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ConservationScience,
        Category::CommunityImpact,
        Category::BiodiversityOutcomes,
        Category::Sustainability,
        Category::Replicability,
    ];

    /// Maximum sub-score.
    pub const fn cap(self) -> u32 {
        match self {
            Category::ConservationScience => 25,
            Category::CommunityImpact => 20,
            Category::BiodiversityOutcomes => 30,
            Category::Sustainability => 15,
            Category::Replicability => 10,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Category::ConservationScience => "conservation_science_alignment",
            Category::CommunityImpact => "community_impact",
            Category::BiodiversityOutcomes => "biodiversity_outcomes",
            Category::Sustainability => "sustainability",
            Category::Replicability => "replicability",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Category::ConservationScience => "Alignment with latest conservation science",
            Category::CommunityImpact => "Community impact",
            Category::BiodiversityOutcomes => "Biodiversity outcomes",
            Category::Sustainability => "Sustainability",
            Category::Replicability => "Replicability",
        }
    }

    /// Maps a model-chosen breakdown key to a category.
    ///
    /// An exact snake_case key or display name wins. Otherwise the category whose
    /// distinctive stem appears earliest in the label is chosen, so
    /// "1. Community impact (0-20)" maps to community impact and
    /// "Sustainability of community programs" to sustainability.
    pub fn from_label(label: &str) -> Option<Category> {
        let normalized = normalize_label(label);

        if let Some(exact) = Self::ALL.iter().copied().find(|c| {
            normalized == normalize_label(c.key()) || normalized == normalize_label(c.display_name())
        }) {
            return Some(exact);
        }

        Self::ALL
            .iter()
            .flat_map(|c| c.stems().iter().map(move |stem| (*c, *stem)))
            .filter_map(|(c, stem)| normalized.find(stem).map(|pos| (pos, c)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, c)| c)
    }

    const fn stems(self) -> &'static [&'static str] {
        match self {
            Category::ConservationScience => &["science", "alignment"],
            Category::CommunityImpact => &["community"],
            Category::BiodiversityOutcomes => &["biodiversity"],
            Category::Sustainability => &["sustainab"],
            Category::Replicability => &["replica"],
        }
    }
}

/// Lowercase alphanumerics, every other run of characters collapsed to one space.
fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Sub-score per category. Empty only for the insufficient-input outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(BTreeMap<Category, u32>);

impl ScoreBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> Option<u32> {
        self.0.get(&category).copied()
    }

    pub fn insert(&mut self, category: Category, score: u32) -> Option<u32> {
        self.0.insert(category, score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.0.iter().map(|(c, s)| (*c, *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all sub-scores (not enforced against `final_score`).
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Every present sub-score is within its category cap.
    pub fn within_caps(&self) -> bool {
        self.0.iter().all(|(c, s)| *s <= c.cap())
    }
}

impl FromIterator<(Category, u32)> for ScoreBreakdown {
    fn from_iter<T: IntoIterator<Item = (Category, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub final_score: u32,
    pub score_breakdown: ScoreBreakdown,
}

/// The pipeline's externally visible output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreResult {
    Scored(ScoreCard),
    Failed { error: String },
}

impl ScoreResult {
    /// Score given to projects whose text is insufficient: zero, empty breakdown.
    pub fn zero() -> Self {
        ScoreResult::Scored(ScoreCard {
            final_score: 0,
            score_breakdown: ScoreBreakdown::new(),
        })
    }

    /// The scoring format-error envelope.
    pub fn parse_failure() -> Self {
        ScoreResult::Failed {
            error: PARSE_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScoreResult::Failed { .. })
    }

    pub fn final_score(&self) -> Option<u32> {
        match self {
            ScoreResult::Scored(card) => Some(card.final_score),
            ScoreResult::Failed { .. } => None,
        }
    }

    pub fn card(&self) -> Option<&ScoreCard> {
        match self {
            ScoreResult::Scored(card) => Some(card),
            ScoreResult::Failed { .. } => None,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "error": PARSE_FAILURE_MESSAGE })
        })
    }
}
