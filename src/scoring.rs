//! Quality scoring.
//!
//! The score is a pure function of a recipe's ingredient text, instruction
//! text and metadata. Every weight lives in [`ScoringPolicy`] so the heuristic
//! can be re-tuned from configuration without touching extraction code.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{Recipe, RecipeMetadata};
use crate::patterns::{patterns, PatternLibrary};

/// Awards `points` when a measured value is at least `at_least`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub at_least: f64,
    pub points: i32,
}

const fn tier(at_least: f64, points: i32) -> Tier {
    Tier { at_least, points }
}

/// Points for the first tier the value reaches. Tables are ordered from the
/// highest threshold down; a zero value never scores.
fn tier_points(tiers: &[Tier], value: f64) -> i32 {
    if value <= 0.0 {
        return 0;
    }
    tiers
        .iter()
        .find(|t| value >= t.at_least)
        .map(|t| t.points)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Deducted once for absent ingredients and once for absent instructions
    pub missing_component_penalty: i32,
    /// Rendered ingredient length in characters
    pub ingredient_length: Vec<Tier>,
    /// Share of ingredient lines formatted as bullets
    pub ingredient_structure: Vec<Tier>,
    /// Ingredient lines carrying a measurement
    pub ingredient_count: Vec<Tier>,
    /// Distinct units, plus one when fractions or decimals appear
    pub ingredient_variety: Vec<Tier>,
    pub instruction_length: Vec<Tier>,
    /// Awarded for two or more numbered steps
    pub numbered_steps_bonus: i32,
    /// Awarded instead for two or more plain paragraphs
    pub paragraph_bonus: i32,
    /// Cooking verbs per 100 characters
    pub verb_density: Vec<Tier>,
    /// Steps or paragraphs, whichever is larger
    pub step_count: Vec<Tier>,
    pub serves_points: i32,
    pub time_points: i32,
    pub method_points: i32,
    pub protein_points: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            missing_component_penalty: 40,
            ingredient_length: vec![tier(200.0, 15), tier(100.0, 10), tier(50.0, 5), tier(0.0, 2)],
            ingredient_structure: vec![tier(0.5, 15), tier(0.0, 8)],
            ingredient_count: vec![tier(8.0, 10), tier(5.0, 7), tier(3.0, 5), tier(1.0, 2)],
            ingredient_variety: vec![tier(4.0, 5), tier(2.0, 3), tier(1.0, 1)],
            instruction_length: vec![
                tier(300.0, 15),
                tier(200.0, 10),
                tier(100.0, 6),
                tier(0.0, 3),
            ],
            numbered_steps_bonus: 15,
            paragraph_bonus: 8,
            verb_density: vec![tier(2.0, 10), tier(1.0, 7), tier(0.5, 4), tier(0.0, 2)],
            step_count: vec![tier(4.0, 5), tier(2.0, 3), tier(1.0, 1)],
            serves_points: 3,
            time_points: 3,
            method_points: 2,
            protein_points: 2,
        }
    }
}

/// Computes the 0..=100 quality score. Deterministic and side-effect free.
#[derive(Debug, Clone)]
pub struct QualityScorer {
    policy: ScoringPolicy,
    patterns: &'static PatternLibrary,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

impl QualityScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self::with_patterns(policy, patterns())
    }

    pub fn with_patterns(policy: ScoringPolicy, patterns: &'static PatternLibrary) -> Self {
        Self { policy, patterns }
    }

    /// Re-scores an assembled recipe. Always equals `recipe.quality_score()`
    /// for recipes built with the same policy.
    pub fn score(&self, recipe: &Recipe) -> u8 {
        self.score_fields(
            recipe.ingredients.as_deref(),
            recipe.instructions.as_deref(),
            &recipe.metadata,
        )
    }

    pub fn score_fields(
        &self,
        ingredients: Option<&str>,
        instructions: Option<&str>,
        metadata: &RecipeMetadata,
    ) -> u8 {
        let mut total = 0;

        match ingredients {
            Some(text) => total += self.ingredient_points(text),
            None => total -= self.policy.missing_component_penalty,
        }
        match instructions {
            Some(text) => total += self.instruction_points(text),
            None => total -= self.policy.missing_component_penalty,
        }
        total += self.metadata_points(metadata);

        total.clamp(0, 100) as u8
    }

    fn ingredient_points(&self, text: &str) -> i32 {
        let p = &self.policy;
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return 0;
        }

        let bullets = lines.iter().filter(|l| self.patterns.bullet.is_match(l)).count();
        let measured = lines
            .iter()
            .filter(|l| self.patterns.measurement.is_match(l))
            .count();

        let units: HashSet<String> = self
            .patterns
            .unit
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_lowercase()))
            .collect();
        let fractions = usize::from(self.patterns.fraction.is_match(text));
        let variety = units.len() + fractions;

        tier_points(&p.ingredient_length, text.chars().count() as f64)
            + tier_points(&p.ingredient_structure, bullets as f64 / lines.len() as f64)
            + tier_points(&p.ingredient_count, measured as f64)
            + tier_points(&p.ingredient_variety, variety as f64)
    }

    fn instruction_points(&self, text: &str) -> i32 {
        let p = &self.policy;
        let chars = text.chars().count();
        if chars == 0 {
            return 0;
        }

        let numbered = text
            .lines()
            .filter(|l| self.patterns.numbered_step.is_match(l))
            .count();
        let paragraphs = text
            .split("\n\n")
            .filter(|para| !para.trim().is_empty())
            .count();
        let structure = if numbered >= 2 {
            p.numbered_steps_bonus
        } else if paragraphs >= 2 {
            p.paragraph_bonus
        } else {
            0
        };
        let density = self.patterns.count_verbs(text) as f64 * 100.0 / chars as f64;

        tier_points(&p.instruction_length, chars as f64)
            + structure
            + tier_points(&p.verb_density, density)
            + tier_points(&p.step_count, numbered.max(paragraphs) as f64)
    }

    fn metadata_points(&self, metadata: &RecipeMetadata) -> i32 {
        let p = &self.policy;
        let mut points = 0;
        if metadata.serves.is_some() {
            points += p.serves_points;
        }
        if metadata.has_time() {
            points += p.time_points;
        }
        if metadata.cooking_method.is_some() {
            points += p.method_points;
        }
        if metadata.protein_type.is_some() {
            points += p.protein_points;
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steak_ingredients() -> String {
        [
            "2 ribeye steaks",
            "2 tbsp olive oil",
            "1 tsp sea salt",
            "1 tsp black pepper",
            "3 cloves garlic",
            "2 sprigs rosemary",
            "1/2 cup butter",
            "1 lemon",
            "1 tbsp thyme leaves",
            "2 tsp paprika",
            "1 cup beef stock",
            "½ tsp chili flakes",
        ]
        .iter()
        .map(|l| format!("- {l}"))
        .collect::<Vec<_>>()
        .join("\n")
    }

    fn steak_instructions() -> String {
        [
            "Preheat the grill to high heat for at least ten minutes before you start. Brush the grates well.",
            "Rub the steaks with oil and season them generously on both sides with the salt and the pepper.",
            "Grill the steaks for four minutes per side, then transfer them to a board and cover loosely.",
            "Melt the butter with garlic, stir in the thyme, and serve spooned over the sliced meat.",
        ]
        .join("\n\n")
    }

    #[test]
    fn test_tier_points_order_and_zero() {
        let tiers = vec![tier(10.0, 5), tier(0.0, 1)];
        assert_eq!(tier_points(&tiers, 12.0), 5);
        assert_eq!(tier_points(&tiers, 3.0), 1);
        assert_eq!(tier_points(&tiers, 0.0), 0);
    }

    #[test]
    fn test_both_components_missing_scores_zero() {
        let scorer = QualityScorer::default();
        let metadata = RecipeMetadata {
            serves: Some("4".to_string()),
            prep_time_minutes: Some(10),
            cook_time_minutes: Some(20),
            cooking_method: Some("grill".to_string()),
            protein_type: Some("beef".to_string()),
        };
        assert_eq!(scorer.score_fields(None, None, &metadata), 0);
    }

    #[test]
    fn test_complete_recipe_scores_high() {
        let scorer = QualityScorer::default();
        let metadata = RecipeMetadata {
            serves: Some("4".to_string()),
            cook_time_minutes: Some(15),
            ..Default::default()
        };
        let instructions = steak_instructions();
        assert!(instructions.len() >= 300);
        let score =
            scorer.score_fields(Some(&steak_ingredients()), Some(&instructions), &metadata);
        assert!(score >= 70, "score was {score}");
    }

    #[test]
    fn test_missing_ingredients_scores_low() {
        let scorer = QualityScorer::default();
        let instructions = "Heat the oil in a large pan. Add the onions and cook until soft, about ten minutes.\n\nStir in the spices and cook for one minute more. Pour in the stock, bring to a boil, then simmer gently until thick. Season and serve with rice and plenty of chopped fresh coriander on top.";
        let score = scorer.score_fields(None, Some(instructions), &RecipeMetadata::default());
        assert!(score < 40, "score was {score}");
    }

    #[test]
    fn test_numbered_steps_beat_paragraphs() {
        let scorer = QualityScorer::default();
        let numbered = "1. Heat the pan.\n2. Add the eggs.\n3. Stir gently.";
        let plain = "Heat the pan.\n\nAdd the eggs.\n\nStir gently.";
        let meta = RecipeMetadata::default();
        let ingredients = Some("- 2 eggs");
        assert!(
            scorer.score_fields(ingredients, Some(numbered), &meta)
                > scorer.score_fields(ingredients, Some(plain), &meta)
        );
    }

    #[test]
    fn test_policy_is_applied() {
        let policy = ScoringPolicy {
            missing_component_penalty: 0,
            serves_points: 50,
            ..Default::default()
        };
        let scorer = QualityScorer::new(policy);
        let meta = RecipeMetadata {
            serves: Some("2".to_string()),
            ..Default::default()
        };
        assert_eq!(scorer.score_fields(None, None, &meta), 50);
    }
}
