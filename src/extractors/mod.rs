use log::debug;
use serde::Serialize;

use crate::markup::Section;
use crate::model::IngredientList;
use crate::patterns::PatternLibrary;

pub mod ingredients;
pub mod instructions;
pub mod metadata;

pub use self::ingredients::IngredientExtractor;
pub use self::instructions::{InstructionExtractor, ScanState, VerbScan};
pub use self::metadata::{parse_servings, parse_time, MetadataExtractor};

/// Pulls one component out of an accepted section.
pub trait Extractor {
    type Output;

    fn name(&self) -> &'static str;

    /// Returns `None` when no strategy produced a usable result. Every
    /// attempt is appended to `trace`.
    fn extract(&self, section: &Section, trace: &mut ExtractionTrace) -> Option<Self::Output>;
}

/// Everything a strategy may look at.
pub struct StrategyContext<'s, 'a> {
    pub section: &'s Section<'a>,
    pub patterns: &'static PatternLibrary,
    /// Results must render longer than this to win
    pub min_chars: usize,
}

/// One self-contained heuristic, tried in a fixed order.
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&StrategyContext) -> Option<T>,
}

/// Values whose rendered text decides whether a strategy won.
pub trait Rendered {
    fn render(&self) -> String;
}

impl Rendered for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl Rendered for IngredientList {
    fn render(&self) -> String {
        IngredientList::render(self)
    }
}

/// The result of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub strategy: &'static str,
    /// Rendered candidate, when the strategy produced one
    pub matched: Option<String>,
    pub accepted: bool,
}

/// Ordered record of strategy attempts for one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionTrace {
    pub outcomes: Vec<ExtractionOutcome>,
}

impl ExtractionTrace {
    pub fn record(&mut self, strategy: &'static str, matched: Option<String>, accepted: bool) {
        self.outcomes.push(ExtractionOutcome {
            strategy,
            matched,
            accepted,
        });
    }

    /// Name of the strategy whose result was used.
    pub fn winner(&self) -> Option<&'static str> {
        self.outcomes
            .iter()
            .find(|o| o.accepted)
            .map(|o| o.strategy)
    }

    pub fn attempts(&self) -> usize {
        self.outcomes.len()
    }
}

/// Runs `strategies` in order and returns the first result that renders
/// longer than `context.min_chars`.
pub fn first_success<T: Rendered>(
    context: &StrategyContext,
    strategies: &[Strategy<T>],
    trace: &mut ExtractionTrace,
) -> Option<T> {
    for strategy in strategies {
        match (strategy.run)(context) {
            Some(candidate) => {
                let rendered = candidate.render();
                let length = rendered.chars().count();
                let accepted = length > context.min_chars;
                debug!(
                    "Strategy {} on {:?}: {} chars, {}",
                    strategy.name,
                    context.section.title,
                    length,
                    if accepted { "accepted" } else { "too short" }
                );
                trace.record(strategy.name, Some(rendered), accepted);
                if accepted {
                    return Some(candidate);
                }
            }
            None => {
                debug!(
                    "Strategy {} on {:?}: no match",
                    strategy.name, context.section.title
                );
                trace.record(strategy.name, None, false);
            }
        }
    }
    None
}

/// Numbers list items "1. ...", one per line.
pub(crate) fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A short line that reads like a label rather than a sentence.
pub(crate) fn is_header_like(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && !text.contains('\n')
        && text.chars().count() <= 40
        && !text.ends_with(['.', '!', '?'])
}
