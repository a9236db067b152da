//! Ingredient extraction.
//!
//! Strategies, in order:
//! 1. `header_search`: an "Ingredients" heading or marker line and what follows it
//! 2. `list_scan`: a list whose items are mostly measurements
//! 3. `paragraph_scan`: a paragraph with at least two measurements
//! 4. `text_fallback`: line classification over the plain text, with
//!    "For the ..." component headers

use crate::extractors::{first_success, ExtractionTrace, Extractor, Strategy, StrategyContext};
use crate::markup::{MarkerRole, Section};
use crate::model::{IngredientGroup, IngredientList};
use crate::patterns::{patterns, PatternLibrary};

const STRATEGIES: &[Strategy<IngredientList>] = &[
    Strategy {
        name: "header_search",
        run: header_search,
    },
    Strategy {
        name: "list_scan",
        run: list_scan,
    },
    Strategy {
        name: "paragraph_scan",
        run: paragraph_scan,
    },
    Strategy {
        name: "text_fallback",
        run: text_fallback,
    },
];

/// Marker lines longer than this are content, not labels.
const MAX_MARKER_CHARS: usize = 60;

#[derive(Debug, Clone)]
pub struct IngredientExtractor {
    patterns: &'static PatternLibrary,
    min_chars: usize,
}

impl Default for IngredientExtractor {
    fn default() -> Self {
        Self::new(patterns(), 50)
    }
}

impl IngredientExtractor {
    pub fn new(patterns: &'static PatternLibrary, min_chars: usize) -> Self {
        Self {
            patterns,
            min_chars,
        }
    }
}

impl Extractor for IngredientExtractor {
    type Output = IngredientList;

    fn name(&self) -> &'static str {
        "ingredients"
    }

    fn extract(&self, section: &Section, trace: &mut ExtractionTrace) -> Option<IngredientList> {
        let context = StrategyContext {
            section,
            patterns: self.patterns,
            min_chars: self.min_chars,
        };
        first_success(&context, STRATEGIES, trace)
    }
}

/// Drops a leading bullet glyph so rendering does not double it.
fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(['-', '•', '*', '·', '●', '▪'])
        .trim()
        .to_string()
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(clean_line).filter(|l| !l.is_empty())
}

struct GroupCollector {
    groups: Vec<IngredientGroup>,
    current: IngredientGroup,
}

impl GroupCollector {
    fn new() -> Self {
        Self {
            groups: Vec::new(),
            current: IngredientGroup::default(),
        }
    }

    fn start_group(&mut self, header: &str) {
        self.close();
        self.current.header = Some(header.trim().trim_end_matches(':').trim().to_string());
    }

    fn push(&mut self, line: String) {
        self.current.lines.push(line);
    }

    fn close(&mut self) {
        let group = std::mem::take(&mut self.current);
        if !group.lines.is_empty() {
            self.groups.push(group);
        }
    }

    fn finish(mut self) -> Option<IngredientList> {
        self.close();
        (!self.groups.is_empty()).then_some(IngredientList {
            groups: self.groups,
        })
    }
}

fn header_search(context: &StrategyContext) -> Option<IngredientList> {
    let p = context.patterns;
    let blocks = &context.section.blocks;

    let start = blocks.iter().position(|b| {
        (b.is_heading() || (b.is_paragraph() && b.text.chars().count() <= MAX_MARKER_CHARS))
            && p.ingredient_heading.is_match(&b.text)
            && !p.measurement.is_match(&b.text)
    })?;
    // A marker paragraph ends at any heading
    let base_level = blocks[start].heading_level().unwrap_or(7);

    let mut collector = GroupCollector::new();
    for block in &blocks[start + 1..] {
        if let Some(level) = block.heading_level() {
            if level <= base_level || p.instruction_heading.is_match(&block.text) {
                break;
            }
            collector.start_group(&block.text);
            continue;
        }
        if block.is_list() {
            block.items.iter().for_each(|item| collector.push(clean_line(item)));
            continue;
        }

        let text = block.text.trim();
        if text.chars().count() <= MAX_MARKER_CHARS && p.instruction_heading.is_match(text) {
            break;
        }
        if p.is_stop_line(text) {
            break;
        }
        if p.is_component_header(text) {
            collector.start_group(text);
            continue;
        }
        // Method prose without its own heading
        if p.starts_with_verb(text) && block.role != Some(MarkerRole::Ingredient) {
            break;
        }
        non_empty_lines(text).for_each(|line| collector.push(line));
    }
    collector.finish()
}

fn list_scan(context: &StrategyContext) -> Option<IngredientList> {
    let p = context.patterns;
    context
        .section
        .blocks
        .iter()
        .filter(|b| b.is_list() && !b.items.is_empty())
        .find(|b| {
            let measured = b.items.iter().filter(|i| p.measurement.is_match(i)).count();
            measured * 2 > b.items.len()
        })
        .map(|b| IngredientList::unlabeled(b.items.iter().map(|i| clean_line(i)).collect()))
}

fn paragraph_scan(context: &StrategyContext) -> Option<IngredientList> {
    let p = context.patterns;
    context
        .section
        .blocks
        .iter()
        .filter(|b| b.is_paragraph())
        .find(|b| p.count_measurements(&b.text) >= 2)
        .map(|b| IngredientList::unlabeled(non_empty_lines(&b.text).collect()))
}

fn text_fallback(context: &StrategyContext) -> Option<IngredientList> {
    let lines: Vec<&str> = context.section.text.lines().collect();
    fallback_groups(&lines, context.patterns)
}

/// Line classification over plain text.
///
/// With "For the ..." headers present, each header opens a group that takes
/// the ingredient lines after it and closes at the first line starting with a
/// cooking verb. Without headers, the longest run of at least two consecutive
/// ingredient lines becomes one unlabeled group.
pub fn fallback_groups(lines: &[&str], patterns: &PatternLibrary) -> Option<IngredientList> {
    if lines.iter().any(|l| patterns.is_component_header(l)) {
        let mut collector = GroupCollector::new();
        let mut collecting = false;
        for line in lines {
            if patterns.is_component_header(line) {
                collector.start_group(line);
                collecting = true;
            } else if !collecting {
                continue;
            } else if patterns.is_ingredient_line(line) {
                collector.push(clean_line(line));
            } else if patterns.starts_with_verb(line) {
                collector.close();
                collecting = false;
            }
        }
        return collector.finish();
    }

    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for (i, line) in lines.iter().enumerate() {
        if patterns.is_ingredient_line(line) {
            let start = *run_start.get_or_insert(i);
            let len = i + 1 - start;
            if len >= 2 && best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((start, len));
            }
        } else {
            run_start = None;
        }
    }

    best.map(|(start, len)| {
        IngredientList::unlabeled(lines[start..start + len].iter().map(|l| clean_line(l)).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Chapter, ParsedChapter, Segmenter};

    fn extract(html: &str) -> (Option<IngredientList>, ExtractionTrace) {
        let chapter = ParsedChapter::parse(&Chapter::new("c", html)).unwrap();
        let sections = Segmenter::default().segment(&chapter);
        let mut trace = ExtractionTrace::default();
        let result = IngredientExtractor::default().extract(&sections[0], &mut trace);
        (result, trace)
    }

    #[test]
    fn test_header_search_with_component_markers() {
        let (result, trace) = extract(
            r#"<body><h2>Pizza</h2>
            <p>Ingredients</p>
            <p>For the Dough</p>
            <ul><li>500 g flour</li><li>7 g dried yeast</li><li>325 ml warm water</li></ul>
            <p>For the Sauce</p>
            <ul><li>1 can tomatoes</li><li>2 cloves garlic</li></ul>
            <p>Method</p>
            <p>Mix the flour and yeast.</p></body>"#,
        );
        let list = result.unwrap();
        assert_eq!(trace.winner(), Some("header_search"));
        assert_eq!(list.groups.len(), 2);
        assert_eq!(list.groups[0].header.as_deref(), Some("For the Dough"));
        assert_eq!(list.groups[1].lines, vec!["1 can tomatoes", "2 cloves garlic"]);
    }

    #[test]
    fn test_list_scan_needs_majority() {
        let (result, trace) = extract(
            r#"<body><h2>Salad</h2>
            <ul><li>Wash everything</li><li>Dry it</li><li>Serve</li></ul>
            <ul><li>2 heads lettuce</li><li>3 tbsp olive oil</li><li>1 tbsp vinegar</li><li>Salt</li></ul>
            </body>"#,
        );
        assert_eq!(trace.winner(), Some("list_scan"));
        assert_eq!(result.unwrap().line_count(), 4);
    }

    #[test]
    fn test_paragraph_scan() {
        let (result, trace) = extract(
            "<body><h2>Rub</h2><p>2 tbsp paprika<br/>1 tbsp brown sugar<br/>1 tsp cayenne pepper<br/>2 tsp garlic powder</p></body>",
        );
        assert_eq!(trace.winner(), Some("paragraph_scan"));
        assert_eq!(result.unwrap().groups[0].lines.len(), 4);
    }

    #[test]
    fn test_fallback_run_of_two() {
        let p = patterns();
        let lines = ["Intro text here", "2 eggs", "1 cup milk", "Whisk together."];
        let list = fallback_groups(&lines, p).unwrap();
        assert_eq!(list.groups[0].lines, vec!["2 eggs", "1 cup milk"]);

        let single = ["Intro text here", "2 eggs", "Whisk together."];
        assert_eq!(fallback_groups(&single, p), None);
    }

    #[test]
    fn test_fallback_longest_run_wins() {
        let lines = [
            "2 eggs",
            "1 cup milk",
            "Whisk together.",
            "3 cups flour",
            "2 tsp baking powder",
            "1 tsp salt",
        ];
        let list = fallback_groups(&lines, patterns()).unwrap();
        assert_eq!(list.groups[0].lines.len(), 3);
        assert_eq!(list.groups[0].lines[0], "3 cups flour");
    }

    #[test]
    fn test_fallback_component_headers() {
        let lines = [
            "Some story about the dish",
            "For the Sauce:",
            "2 tbsp butter",
            "1 cup cream",
            "Heat the butter until foaming.",
            "1 cup not collected",
            "For the Pasta",
            "400 g spaghetti",
            "½ tsp salt",
        ];
        let list = fallback_groups(&lines, patterns()).unwrap();
        assert_eq!(list.groups.len(), 2);
        assert_eq!(list.groups[0].header.as_deref(), Some("For the Sauce"));
        assert_eq!(list.groups[0].lines, vec!["2 tbsp butter", "1 cup cream"]);
        assert_eq!(list.groups[1].lines, vec!["400 g spaghetti", "½ tsp salt"]);
    }

    #[test]
    fn test_verb_lines_are_not_ingredients() {
        let lines = ["Add 2 cups stock", "Stir in 1 tbsp butter"];
        assert_eq!(fallback_groups(&lines, patterns()), None);
    }

    #[test]
    fn test_nothing_found() {
        let (result, trace) = extract("<body><h2>Story</h2><p>We went fishing at dawn.</p></body>");
        assert!(result.is_none());
        assert_eq!(trace.attempts(), 4);
    }
}
