//! Instruction extraction.
//!
//! Paragraph output is joined with blank lines in source order; list output
//! is numbered.

use std::ops::ControlFlow;

use crate::extractors::{
    first_success, is_header_like, numbered, ExtractionTrace, Extractor, Strategy,
    StrategyContext,
};
use crate::markup::{Block, MarkerRole, Section};
use crate::patterns::{patterns, PatternLibrary};

const STRATEGIES: &[Strategy<String>] = &[
    Strategy {
        name: "marker_class",
        run: marker_class,
    },
    Strategy {
        name: "header_search",
        run: header_search,
    },
    Strategy {
        name: "narrative_prefix",
        run: narrative_prefix,
    },
    Strategy {
        name: "post_ingredient",
        run: post_ingredient,
    },
    Strategy {
        name: "list_steps",
        run: list_steps,
    },
    Strategy {
        name: "verb_scan",
        run: verb_scan,
    },
    Strategy {
        name: "single_paragraph",
        run: single_paragraph,
    },
];

const MAX_MARKER_CHARS: usize = 60;

#[derive(Debug, Clone)]
pub struct InstructionExtractor {
    patterns: &'static PatternLibrary,
    min_chars: usize,
}

impl Default for InstructionExtractor {
    fn default() -> Self {
        Self::new(patterns(), 50)
    }
}

impl InstructionExtractor {
    pub fn new(patterns: &'static PatternLibrary, min_chars: usize) -> Self {
        Self {
            patterns,
            min_chars,
        }
    }
}

impl Extractor for InstructionExtractor {
    type Output = String;

    fn name(&self) -> &'static str {
        "instructions"
    }

    fn extract(&self, section: &Section, trace: &mut ExtractionTrace) -> Option<String> {
        let context = StrategyContext {
            section,
            patterns: self.patterns,
            min_chars: self.min_chars,
        };
        first_success(&context, STRATEGIES, trace)
    }
}

fn join_parts(parts: Vec<String>) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().filter(|p| !p.trim().is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

fn block_output(block: &Block) -> String {
    if block.is_list() {
        numbered(&block.items)
    } else {
        block.text.clone()
    }
}

fn is_metadata_like(p: &PatternLibrary, text: &str) -> bool {
    p.time_label.is_match(text) || (p.servings_label.is_match(text) && is_header_like(text))
}

/// Every line of the block is an ingredient line or component header.
fn is_ingredient_like(p: &PatternLibrary, block: &Block) -> bool {
    if block.role == Some(MarkerRole::Ingredient) {
        return true;
    }
    let lines: Vec<&str> = block.text.lines().collect();
    !lines.is_empty()
        && lines
            .iter()
            .all(|l| p.is_ingredient_line(l) || p.is_component_header(l))
}

fn marker_class(context: &StrategyContext) -> Option<String> {
    join_parts(
        context
            .section
            .blocks
            .iter()
            .filter(|b| b.role == Some(MarkerRole::Instruction) && !b.is_heading())
            .map(block_output)
            .collect(),
    )
}

fn header_search(context: &StrategyContext) -> Option<String> {
    let p = context.patterns;
    let blocks = &context.section.blocks;
    let start = blocks.iter().position(|b| {
        (b.is_heading() || (b.is_paragraph() && b.text.chars().count() <= MAX_MARKER_CHARS))
            && p.instruction_heading.is_match(&b.text)
            && !is_metadata_like(p, &b.text)
    })?;
    let base_level = blocks[start].heading_level().unwrap_or(7);

    let mut parts = Vec::new();
    for block in &blocks[start + 1..] {
        if let Some(level) = block.heading_level() {
            if level <= base_level {
                break;
            }
            continue;
        }
        if p.is_stop_line(&block.text) {
            break;
        }
        parts.push(block_output(block));
    }
    join_parts(parts)
}

fn narrative_prefix(context: &StrategyContext) -> Option<String> {
    let p = context.patterns;
    let blocks = &context.section.blocks;
    let start = blocks
        .iter()
        .position(|b| b.is_paragraph() && p.narrative_prefix.is_match(b.text.trim()))?;

    let mut parts = vec![blocks[start].text.clone()];
    for block in &blocks[start + 1..] {
        if !block.is_paragraph() || p.is_stop_line(&block.text) {
            break;
        }
        if p.count_verbs(&block.text) == 0 {
            break;
        }
        parts.push(block.text.clone());
    }
    join_parts(parts)
}

fn post_ingredient(context: &StrategyContext) -> Option<String> {
    let p = context.patterns;
    let blocks = &context.section.blocks;
    let start = blocks.iter().position(|b| {
        (b.is_heading() || (b.is_paragraph() && b.text.chars().count() <= MAX_MARKER_CHARS))
            && p.ingredient_heading.is_match(&b.text)
    })?;
    let base_level = blocks[start].heading_level().unwrap_or(7);

    let mut parts = Vec::new();
    let mut in_ingredients = true;
    for block in &blocks[start + 1..] {
        if let Some(level) = block.heading_level() {
            if level <= base_level {
                break;
            }
            continue;
        }
        if in_ingredients {
            if block.is_list() || is_ingredient_like(p, block) || is_header_like(&block.text) {
                continue;
            }
            in_ingredients = false;
        }
        if p.is_stop_line(&block.text) {
            break;
        }
        if is_header_like(&block.text) {
            continue;
        }
        parts.push(block_output(block));
    }
    join_parts(parts)
}

fn list_steps(context: &StrategyContext) -> Option<String> {
    let p = context.patterns;
    context
        .section
        .blocks
        .iter()
        .filter(|b| b.is_list() && b.items.len() >= 2)
        .find(|b| {
            let measured = b.items.iter().filter(|i| p.measurement.is_match(i)).count();
            p.count_verbs(&b.text) >= 3 && measured * 2 <= b.items.len()
        })
        .map(|b| numbered(&b.items))
}

fn verb_scan(context: &StrategyContext) -> Option<String> {
    let p = context.patterns;
    let mut scan = VerbScan::new(p);
    for block in &context.section.blocks {
        if !block.is_paragraph()
            || matches!(
                block.role,
                Some(MarkerRole::Ingredient) | Some(MarkerRole::Metadata)
            )
            || is_ingredient_like(p, block)
            || is_metadata_like(p, &block.text)
            || (is_header_like(&block.text) && p.count_verbs(&block.text) == 0)
        {
            continue;
        }
        if scan.feed(&block.text).is_break() {
            break;
        }
    }
    scan.finish()
}

fn single_paragraph(context: &StrategyContext) -> Option<String> {
    let p = context.patterns;
    context
        .section
        .blocks
        .iter()
        .filter(|b| b.is_paragraph())
        .find(|b| p.count_verbs(&b.text) >= 1 && b.text.chars().count() > context.min_chars)
        .map(|b| b.text.clone())
}

/// State of the sequential verb scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for a paragraph with at least two cooking verbs
    Scanning,
    /// Keeping paragraphs; `misses` counts consecutive verb-free ones
    Collecting { misses: u8 },
}

/// Accumulates instruction paragraphs by cooking-verb density.
///
/// The scan starts collecting at the first paragraph with two or more verbs.
/// While collecting, paragraphs with a verb are kept and reset the miss
/// counter; two consecutive verb-free paragraphs or a stop line ("Tip:",
/// "Note:", ...) end the scan.
#[derive(Debug)]
pub struct VerbScan<'p> {
    patterns: &'p PatternLibrary,
    state: ScanState,
    collected: Vec<String>,
}

impl<'p> VerbScan<'p> {
    pub const MAX_MISSES: u8 = 2;

    pub fn new(patterns: &'p PatternLibrary) -> Self {
        Self {
            patterns,
            state: ScanState::Scanning,
            collected: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn collected(&self) -> &[String] {
        &self.collected
    }

    /// Feeds the next paragraph. `Break` means the scan is over and further
    /// paragraphs must not be fed.
    pub fn feed(&mut self, paragraph: &str) -> ControlFlow<()> {
        let verbs = self.patterns.count_verbs(paragraph);
        match self.state {
            ScanState::Scanning => {
                if verbs >= 2 && !self.patterns.is_stop_line(paragraph) {
                    self.collected.push(paragraph.to_string());
                    self.state = ScanState::Collecting { misses: 0 };
                }
                ControlFlow::Continue(())
            }
            ScanState::Collecting { misses } => {
                if self.patterns.is_stop_line(paragraph) {
                    return ControlFlow::Break(());
                }
                if verbs >= 1 {
                    self.collected.push(paragraph.to_string());
                    self.state = ScanState::Collecting { misses: 0 };
                    return ControlFlow::Continue(());
                }
                let misses = misses + 1;
                self.state = ScanState::Collecting { misses };
                if misses >= Self::MAX_MISSES {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }

    pub fn finish(self) -> Option<String> {
        join_parts(self.collected)
    }
}
