use log::debug;
use serde::Serialize;

use crate::markup::Section;
use crate::patterns::{patterns, PatternLibrary};

/// Points at which a section counts as a recipe.
pub const ACCEPT_SCORE: u8 = 5;

/// Accept/reject decision plus the diagnostic confidence estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub accepted: bool,
    pub score: u8,
    /// 0.0..=1.0, informational only
    pub confidence: f64,
    /// Why the section was rejected
    pub reason: Option<String>,
}

impl Verdict {
    fn rejected(reason: String) -> Self {
        Self {
            accepted: false,
            score: 0,
            confidence: 0.0,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionValidator {
    patterns: &'static PatternLibrary,
}

impl Default for SectionValidator {
    fn default() -> Self {
        Self::new(patterns())
    }
}

impl SectionValidator {
    pub fn new(patterns: &'static PatternLibrary) -> Self {
        Self { patterns }
    }

    pub fn validate(&self, section: &Section) -> Verdict {
        // Untitled sections are judged by their opening line
        let label = if section.is_untitled() {
            section.text.lines().next().unwrap_or_default()
        } else {
            section.title.as_str()
        };
        self.judge(label, &section.text)
    }

    /// Scores a title/text pair.
    pub fn judge(&self, title: &str, text: &str) -> Verdict {
        if let Some(reason) = self.hard_rejection(title) {
            debug!("Rejected {:?}: {}", title, reason);
            return Verdict::rejected(reason);
        }

        let p = self.patterns;
        let distinct_verbs = p.distinct_verbs(text);
        let measurements = p.count_measurements(text);
        let ingredient_marker = p.ingredient_phrase.is_match(text);
        let instruction_marker = p.instruction_phrase.is_match(text);
        let long_text = text.chars().count() > 200;

        let mut score = 0;
        if distinct_verbs >= 3 {
            score += 3;
        }
        if measurements >= 2 {
            score += 2;
        }
        if ingredient_marker {
            score += 2;
        }
        if instruction_marker {
            score += 2;
        }
        if long_text {
            score += 1;
        }

        let mut confidence = 0.0;
        confidence += (distinct_verbs as f64 / 6.0).min(1.0) * 0.3;
        confidence += (measurements as f64 / 5.0).min(1.0) * 0.3;
        if ingredient_marker {
            confidence += 0.15;
        }
        if instruction_marker {
            confidence += 0.15;
        }
        if long_text {
            confidence += 0.1;
        }

        let accepted = score >= ACCEPT_SCORE;
        if !accepted {
            debug!("Rejected {:?}: only {} points", title, score);
        }
        Verdict {
            accepted,
            score,
            confidence: f64::clamp(confidence, 0.0, 1.0),
            reason: (!accepted).then(|| format!("scored {score} of {ACCEPT_SCORE} points")),
        }
    }

    /// Titles that can never be recipes, whatever the content says.
    fn hard_rejection(&self, title: &str) -> Option<String> {
        let p = self.patterns;
        let title = title.trim();
        if let Some(found) = p.exclusion_keyword.find(title) {
            return Some(format!("excluded keyword {:?}", found.as_str()));
        }
        if p.exclusion_prefix.is_match(title) {
            return Some("excluded title prefix".to_string());
        }
        if p.sub_section.is_match(title) {
            return Some("component sub-section".to_string());
        }
        if p.is_ingredient_title(title) {
            return Some("ingredient-like title".to_string());
        }
        None
    }
}
