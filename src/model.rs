use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::scoring::QualityScorer;

/// A fully assembled recipe, built by [`RecipeDraft::finish`]. Fields are
/// read-only outside the crate so `quality_score` stays the scorer's verdict
/// over the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub(crate) title: String,
    pub(crate) book: String,
    #[serde(default)]
    pub(crate) author: Option<String>,
    /// Identifier of the chapter the recipe came from
    #[serde(default)]
    pub(crate) chapter: Option<String>,
    /// Ordinal of the source section within its chapter
    pub(crate) section_position: usize,
    #[serde(default)]
    pub(crate) ingredients: Option<String>,
    #[serde(default)]
    pub(crate) instructions: Option<String>,
    #[serde(default)]
    pub(crate) metadata: RecipeMetadata,
    pub(crate) quality_score: u8,
    #[serde(default)]
    pub(crate) tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) raw_content: Option<String>,
}

impl Recipe {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Identifier of the chapter the recipe came from
    pub fn chapter(&self) -> Option<&str> {
        self.chapter.as_deref()
    }

    pub fn section_position(&self) -> usize {
        self.section_position
    }

    /// Rendered ingredient groups, one "- " line per ingredient
    pub fn ingredients(&self) -> Option<&str> {
        self.ingredients.as_deref()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn metadata(&self) -> &RecipeMetadata {
        &self.metadata
    }

    pub fn quality_score(&self) -> u8 {
        self.quality_score
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn raw_content(&self) -> Option<&str> {
        self.raw_content.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    /// "N" or "N-M"
    pub serves: Option<String>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub cooking_method: Option<String>,
    pub protein_type: Option<String>,
}

impl RecipeMetadata {
    pub fn has_time(&self) -> bool {
        self.prep_time_minutes.is_some() || self.cook_time_minutes.is_some()
    }
}

/// One ingredient component, e.g. the lines under "For the Sauce".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngredientGroup {
    pub header: Option<String>,
    pub lines: Vec<String>,
}

/// Ordered ingredient components. Kept structured until the recipe is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngredientList {
    pub groups: Vec<IngredientGroup>,
}

impl IngredientList {
    pub fn unlabeled(lines: Vec<String>) -> Self {
        Self {
            groups: vec![IngredientGroup {
                header: None,
                lines,
            }],
        }
    }

    pub fn line_count(&self) -> usize {
        self.groups.iter().map(|g| g.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }

    /// Flattens the groups: headers on their own line, ingredients as bullets,
    /// a blank line between components.
    pub fn render(&self) -> String {
        self.groups
            .iter()
            .filter(|g| !g.lines.is_empty())
            .map(|group| {
                let mut out = String::new();
                if let Some(header) = &group.header {
                    out.push_str(header);
                    out.push('\n');
                }
                let bullets = group
                    .lines
                    .iter()
                    .map(|line| format!("- {line}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push_str(&bullets);
                out
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Everything the extractors found for one section, before scoring.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub title: String,
    pub book: String,
    pub author: Option<String>,
    pub chapter: Option<String>,
    pub section_position: usize,
    pub ingredients: Option<IngredientList>,
    pub instructions: Option<String>,
    pub metadata: RecipeMetadata,
    pub tags: BTreeSet<String>,
    pub raw_content: Option<String>,
}

impl RecipeDraft {
    /// Flattens structured fields and attaches the quality score.
    pub fn finish(self, scorer: &QualityScorer) -> Recipe {
        let ingredients = self
            .ingredients
            .filter(|list| !list.is_empty())
            .map(|list| list.render());
        let instructions = self.instructions.filter(|text| !text.trim().is_empty());
        let quality_score =
            scorer.score_fields(ingredients.as_deref(), instructions.as_deref(), &self.metadata);

        Recipe {
            title: self.title,
            book: self.book,
            author: self.author,
            chapter: self.chapter,
            section_position: self.section_position,
            ingredients,
            instructions,
            metadata: self.metadata,
            quality_score,
            tags: self.tags,
            raw_content: self.raw_content,
        }
    }
}
