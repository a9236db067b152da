//! Splits a parsed chapter into candidate recipe sections.
//!
//! The split level is the most frequent heading level in the chapter, ties
//! going to the shallowest. A section runs from its heading to the next
//! heading at the split level or shallower, following siblings and climbing
//! out of wrapper elements up to the body. Traversal is capped; a section that
//! hits the cap ends early and is flagged `truncated`.

use log::debug;
use scraper::ElementRef;
use std::collections::BTreeMap;

use crate::markup::{
    clean_title, flatten, heading_level, normalize_lines, Block, BlockBuilder, ParsedChapter,
    HEADINGS,
};
use crate::patterns::{patterns, PatternLibrary};

pub const UNTITLED: &str = "Untitled";

/// A contiguous chapter fragment that may hold one recipe.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub chapter_id: String,
    /// Ordinal within the chapter, starting at 0
    pub position: usize,
    /// Raw text of the heading that opened the section
    pub heading: Option<String>,
    /// Resolved title, `"Untitled"` when nothing usable was found
    pub title: String,
    /// Top-level elements collected for the section
    pub nodes: Vec<ElementRef<'a>>,
    pub blocks: Vec<Block>,
    pub text: String,
    /// Set when the traversal cap ended the section early
    pub truncated: bool,
}

impl Section<'_> {
    pub fn is_untitled(&self) -> bool {
        self.title == UNTITLED
    }
}

struct Collected<'a> {
    heading: Option<String>,
    nodes: Vec<ElementRef<'a>>,
    blocks: Vec<Block>,
    truncated: bool,
}

/// Inputs shared by the title strategies.
struct TitleContext<'c> {
    hint: Option<&'c str>,
    blocks: &'c [Block],
    text: &'c str,
}

type TitleStrategy = (&'static str, fn(&Segmenter, &TitleContext) -> Option<String>);

const TITLE_STRATEGIES: &[TitleStrategy] = &[
    ("title_hint", Segmenter::hint_title),
    ("leading_emphasis", Segmenter::emphasized_title),
    ("short_first_paragraph", Segmenter::first_paragraph_title),
    ("first_plain_line", Segmenter::first_line_title),
];

#[derive(Debug, Clone)]
pub struct Segmenter {
    max_traversal_steps: usize,
    patterns: &'static PatternLibrary,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Segmenter {
    pub fn new(max_traversal_steps: usize) -> Self {
        Self::with_patterns(max_traversal_steps, patterns())
    }

    pub fn with_patterns(max_traversal_steps: usize, patterns: &'static PatternLibrary) -> Self {
        Self {
            max_traversal_steps,
            patterns,
        }
    }

    /// Ordered sections of `chapter`. Content before the first split-level
    /// heading is dropped; a chapter without headings is one section.
    pub fn segment<'a>(&self, chapter: &'a ParsedChapter) -> Vec<Section<'a>> {
        let body = chapter.body();
        let headings: Vec<(ElementRef<'a>, u8)> = body
            .select(&HEADINGS)
            .filter_map(|h| heading_level(&h).map(|level| (h, level)))
            .collect();

        let collected: Vec<Collected<'a>> = match split_level(headings.iter().map(|(_, l)| *l)) {
            Some(split) => {
                debug!(
                    "Chapter {}: splitting {} headings at level h{}",
                    chapter.id(),
                    headings.len(),
                    split
                );
                headings
                    .iter()
                    .filter(|(_, level)| *level == split)
                    .map(|(heading, _)| self.collect_section(body, *heading, split))
                    .collect()
            }
            None => vec![Collected {
                heading: None,
                nodes: body.children().filter_map(ElementRef::wrap).collect(),
                blocks: flatten(body),
                truncated: false,
            }],
        };

        let hint = if collected.len() == 1 {
            chapter.title_hint()
        } else {
            None
        };

        collected
            .into_iter()
            .enumerate()
            .map(|(position, c)| {
                let text = section_text(&c.blocks);
                let title = self.resolve_title(c.heading.as_deref(), hint.as_deref(), &c.blocks, &text);
                Section {
                    chapter_id: chapter.id().to_string(),
                    position,
                    heading: c.heading,
                    title,
                    nodes: c.nodes,
                    blocks: c.blocks,
                    text,
                    truncated: c.truncated,
                }
            })
            .collect()
    }

    /// Gathers everything after `heading` up to the next boundary heading.
    fn collect_section<'a>(
        &self,
        body: ElementRef<'a>,
        heading: ElementRef<'a>,
        split: u8,
    ) -> Collected<'a> {
        let mut builder = BlockBuilder::new();
        let mut nodes = Vec::new();
        let mut steps = 0usize;
        let mut truncated = false;

        let mut last = *heading;
        let mut cursor = heading.next_sibling();

        loop {
            steps += 1;
            if steps > self.max_traversal_steps {
                debug!(
                    "Traversal cap of {} steps reached after heading {:?}",
                    self.max_traversal_steps,
                    normalize_lines(&heading.text().collect::<String>())
                );
                truncated = true;
                break;
            }

            let node = match cursor {
                Some(node) => node,
                // Out of siblings: climb out of the wrapper, never past the body
                None => match last.parent() {
                    Some(parent) if parent.id() != body.id() => {
                        last = parent;
                        cursor = parent.next_sibling();
                        continue;
                    }
                    _ => break,
                },
            };
            last = node;
            cursor = node.next_sibling();

            if let Some(element) = ElementRef::wrap(node) {
                if heading_level(&element).is_some_and(|level| level <= split) {
                    break;
                }
                if contains_boundary(&element, split) {
                    cursor = node.first_child();
                    continue;
                }
                nodes.push(element);
                builder.push_element(element, None);
            } else if let Some(text) = node.value().as_text() {
                builder.push_text(text, None);
            }
        }

        Collected {
            heading: Some(normalize_lines(&heading.text().collect::<String>())),
            nodes,
            blocks: builder.finish(),
            truncated,
        }
    }

    fn resolve_title(
        &self,
        heading: Option<&str>,
        hint: Option<&str>,
        blocks: &[Block],
        text: &str,
    ) -> String {
        if let Some(heading) = heading.map(clean_title).filter(|h| usable_heading(h)) {
            return heading;
        }

        let context = TitleContext { hint, blocks, text };
        for (name, strategy) in TITLE_STRATEGIES {
            if let Some(title) = strategy(self, &context) {
                debug!("Title inferred by {}: {}", name, title);
                return title;
            }
            debug!("Title strategy {} found nothing", name);
        }
        UNTITLED.to_string()
    }

    fn hint_title(&self, context: &TitleContext) -> Option<String> {
        context.hint.map(str::to_string)
    }

    fn emphasized_title(&self, context: &TitleContext) -> Option<String> {
        let candidate = context.blocks.first()?.emphasis.as_deref()?.trim();
        let length = candidate.chars().count();
        if !(10..=100).contains(&length) {
            return None;
        }
        if length > 20 && is_all_caps(candidate) {
            // shouted sub-header such as "FOR THE MARINADE AND GLAZE"
            return None;
        }
        if self.patterns.looks_like_ingredient_or_stop(candidate) {
            return None;
        }
        Some(clean_title(candidate))
    }

    fn first_paragraph_title(&self, context: &TitleContext) -> Option<String> {
        let mut paragraphs = context.blocks.iter().filter(|b| b.is_paragraph());
        let first = paragraphs.next()?;
        let next = paragraphs.next()?;
        let length = first.text.chars().count();
        if (10..=80).contains(&length) && length < next.text.chars().count() {
            Some(clean_title(&first.text))
        } else {
            None
        }
    }

    fn first_line_title(&self, context: &TitleContext) -> Option<String> {
        context
            .text
            .lines()
            .take(5)
            .map(str::trim)
            .find(|line| {
                !line.is_empty()
                    && !line.starts_with(|c: char| c.is_ascii_digit())
                    && !self.patterns.looks_like_ingredient_or_stop(line)
            })
            .map(clean_title)
    }
}

/// Most frequent level; ties go to the shallowest.
fn split_level(levels: impl Iterator<Item = u8>) -> Option<u8> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for level in levels {
        *counts.entry(level).or_default() += 1;
    }
    // BTreeMap iterates shallowest first; max_by_key keeps the last maximum
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(level, _)| level)
}

fn contains_boundary(element: &ElementRef, split: u8) -> bool {
    element
        .select(&HEADINGS)
        .any(|h| heading_level(&h).is_some_and(|level| level <= split))
}

fn usable_heading(text: &str) -> bool {
    text.chars().count() >= 3 && !text.chars().all(|c| c.is_ascii_digit())
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn section_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
