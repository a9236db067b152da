use log::debug;
use std::collections::BTreeSet;

use crate::extractors::{ExtractionTrace, Extractor};
use crate::markup::Section;
use crate::model::RecipeMetadata;
use crate::patterns::{patterns, PatternLibrary};

/// Longest accepted duration, one day.
pub const MAX_TIME_MINUTES: u32 = 1440;

/// Normalizes a servings phrase to `"N"` or `"N-M"`.
///
/// ```
/// use epub_recipes::extractors::parse_servings;
///
/// assert_eq!(parse_servings("4 to 6").as_deref(), Some("4-6"));
/// assert_eq!(parse_servings("Serves 4 (as a main)").as_deref(), Some("4"));
/// assert_eq!(parse_servings("(pressure cooker):"), None);
/// ```
pub fn parse_servings(text: &str) -> Option<String> {
    servings_with(patterns(), text)
}

/// Parses a duration phrase into whole minutes within `1..=1440`.
///
/// Ranges use their first number. Negative values are rejected.
///
/// ```
/// use epub_recipes::extractors::parse_time;
///
/// assert_eq!(parse_time("1 hour 30 minutes"), Some(90));
/// assert_eq!(parse_time("30-45 minutes"), Some(30));
/// assert_eq!(parse_time("-5 minutes"), None);
/// ```
pub fn parse_time(text: &str) -> Option<u32> {
    time_with(patterns(), text)
}

fn servings_with(p: &PatternLibrary, text: &str) -> Option<String> {
    let without_notes = p.parenthetical.replace_all(text, " ");
    let mut value = without_notes.trim();
    if let Some(caps) = p.servings_label.captures(value) {
        if caps.get(0).is_some_and(|m| m.start() == 0) {
            value = caps.name("value").map_or("", |m| m.as_str());
        }
    }
    let value = value.trim_matches(|c: char| c == ':' || c.is_whitespace());

    let caps = p.servings_value.captures(value)?;
    let low: u32 = caps.name("low")?.as_str().parse().ok()?;
    if low == 0 {
        return None;
    }
    match caps.name("high").and_then(|m| m.as_str().parse::<u32>().ok()) {
        Some(high) if high > low => Some(format!("{low}-{high}")),
        _ => Some(low.to_string()),
    }
}

fn time_with(p: &PatternLibrary, text: &str) -> Option<u32> {
    let collapsed = p.time_range.replace_all(text.trim(), "$first");
    let text = collapsed.trim();
    if p.negative_time.is_match(text) {
        return None;
    }

    let mut minutes = 0.0;
    let mut found = false;
    for caps in p.hours.captures_iter(text) {
        if let Some(hours) = caps.name("n").and_then(|m| m.as_str().parse::<f64>().ok()) {
            minutes += hours * 60.0;
            found = true;
        }
    }
    for caps in p.minutes.captures_iter(text) {
        if let Some(mins) = caps.name("n").and_then(|m| m.as_str().parse::<f64>().ok()) {
            minutes += mins;
            found = true;
        }
    }
    if !found && p.bare_number.is_match(text) {
        minutes = text.parse::<f64>().ok()?;
        found = true;
    }
    if !found {
        return None;
    }

    let total = minutes.round();
    (1.0..=MAX_TIME_MINUTES as f64)
        .contains(&total)
        .then_some(total as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSlot {
    Prep,
    Cook,
    /// Stands in for prep only when no prep label is present.
    Total,
}

fn slot_for(label: &str) -> TimeSlot {
    match label.to_lowercase().as_str() {
        "cook" | "cooking" | "passive" | "baking" => TimeSlot::Cook,
        "total" => TimeSlot::Total,
        _ => TimeSlot::Prep,
    }
}

#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    patterns: &'static PatternLibrary,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(patterns())
    }
}

impl MetadataExtractor {
    pub fn new(patterns: &'static PatternLibrary) -> Self {
        Self { patterns }
    }

    /// Scalar fields from a title and plain text. Always returns a value;
    /// unparseable fields stay absent.
    pub fn extract_fields(&self, title: &str, text: &str) -> RecipeMetadata {
        let (prep_time_minutes, cook_time_minutes) = self.times(text);
        RecipeMetadata {
            serves: self.servings(text),
            prep_time_minutes,
            cook_time_minutes,
            cooking_method: self.lookup(&self.patterns.cooking_methods, title, text),
            protein_type: self.lookup(&self.patterns.protein_types, title, text),
        }
    }

    /// Tags for the recipe: cooking method, protein and difficulty level.
    pub fn tags(&self, title: &str, text: &str, metadata: &RecipeMetadata) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        tags.extend(metadata.cooking_method.clone());
        tags.extend(metadata.protein_type.clone());
        tags.extend(self.difficulty(title, text));
        tags
    }

    fn servings(&self, text: &str) -> Option<String> {
        text.lines().find_map(|line| {
            let caps = self.patterns.servings_label.captures(line)?;
            servings_with(self.patterns, caps.name("value")?.as_str())
        })
    }

    /// Label-keyed durations. A line may hold both labels
    /// ("Prep time: 10 minutes | Cook time: 1 hour").
    fn times(&self, text: &str) -> (Option<u32>, Option<u32>) {
        let p = self.patterns;
        let mut prep = None;
        let mut cook = None;
        let mut total = None;

        for line in text.lines() {
            let mut rest = line;
            while let Some(caps) = p.time_label.captures(rest) {
                let (Some(label), Some(value)) = (caps.name("label"), caps.name("value")) else {
                    break;
                };
                let tail = value.as_str();
                let next_label = p.time_label.find(tail).map_or(tail.len(), |m| m.start());
                let phrase = tail[..next_label]
                    .split([',', ';', '|'])
                    .next()
                    .unwrap_or_default();

                let slot = match slot_for(label.as_str()) {
                    TimeSlot::Prep => &mut prep,
                    TimeSlot::Cook => &mut cook,
                    TimeSlot::Total => &mut total,
                };
                if slot.is_none() {
                    *slot = time_with(p, phrase);
                }

                if next_label >= tail.len() {
                    break;
                }
                rest = &tail[next_label..];
            }
        }
        (prep.or(total), cook)
    }

    /// First vocabulary entry found in the title, else in the text.
    fn lookup(&self, vocabulary: &[(&'static str, regex::Regex)], title: &str, text: &str) -> Option<String> {
        [title, text].iter().find_map(|haystack| {
            vocabulary
                .iter()
                .find(|(_, re)| re.is_match(haystack))
                .map(|(label, _)| label.to_string())
        })
    }

    fn difficulty(&self, title: &str, text: &str) -> Option<String> {
        let p = self.patterns;
        let labelled = text
            .lines()
            .find_map(|line| p.difficulty_label.captures(line))
            .and_then(|caps| caps.name("value").map(|m| m.as_str().to_string()));
        let candidates = labelled.iter().map(String::as_str).chain([title]);
        for haystack in candidates {
            if let Some((level, _)) = p.difficulty_levels.iter().find(|(_, re)| re.is_match(haystack)) {
                return Some(level.to_string());
            }
        }
        None
    }
}

/// Second pass over extracted metadata: empty strings become absent and
/// serves/time values are parsed again.
pub fn validate_metadata(metadata: RecipeMetadata) -> RecipeMetadata {
    let non_empty = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let in_range = |value: Option<u32>| value.filter(|m| (1..=MAX_TIME_MINUTES).contains(m));

    RecipeMetadata {
        serves: non_empty(metadata.serves).and_then(|s| parse_servings(&s)),
        prep_time_minutes: in_range(metadata.prep_time_minutes),
        cook_time_minutes: in_range(metadata.cook_time_minutes),
        cooking_method: non_empty(metadata.cooking_method),
        protein_type: non_empty(metadata.protein_type),
    }
}

impl Extractor for MetadataExtractor {
    type Output = RecipeMetadata;

    fn name(&self) -> &'static str {
        "metadata"
    }

    fn extract(&self, section: &Section, trace: &mut ExtractionTrace) -> Option<RecipeMetadata> {
        let metadata = validate_metadata(self.extract_fields(&section.title, &section.text));

        let fields = [
            ("serves", metadata.serves.clone()),
            ("prep_time", metadata.prep_time_minutes.map(|m| m.to_string())),
            ("cook_time", metadata.cook_time_minutes.map(|m| m.to_string())),
            ("cooking_method", metadata.cooking_method.clone()),
            ("protein_type", metadata.protein_type.clone()),
        ];
        for (field, value) in fields {
            let found = value.is_some();
            trace.record(field, value, found);
        }
        debug!("Metadata for {:?}: {:?}", section.title, metadata);

        Some(metadata)
    }
}
