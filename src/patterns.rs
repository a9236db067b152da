//! Compiled text-matching rules shared by every extraction stage.
//!
//! The library is built once and never mutated, so a single instance can be
//! shared freely between chapter workers. Use [`patterns()`] for the process-wide
//! instance or [`PatternLibrary::new`] to inject a private one.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PATTERNS: Lazy<PatternLibrary> = Lazy::new(PatternLibrary::new);

/// Returns the process-wide pattern library, compiling it on first use.
pub fn patterns() -> &'static PatternLibrary {
    &PATTERNS
}

/// Verbs that open an instruction sentence. The same list drives the
/// verb-count regex and the first-word checks.
pub const COOKING_VERBS: &[&str] = &[
    "heat", "cook", "grill", "place", "add", "mix", "stir", "combine", "season", "serve",
    "roast", "smoke", "bake", "prepare", "chop", "slice", "transfer", "remove", "cover",
    "simmer", "melt", "boil", "whisk", "fold", "pour", "spread", "drain", "toss", "sauté",
    "saute", "fry", "bring", "preheat", "beat", "knead", "strain", "swirl", "continue",
    "sprinkle", "garnish", "arrange", "chill", "freeze", "refrigerate", "toast", "crush",
    "divide", "roll", "lay", "brush", "repeat", "spray", "drizzle", "let", "cool", "seal",
    "store", "dissolve", "steep", "adjust", "caramelize", "reduce", "blend", "puree",
    "marinate", "rinse", "peel", "dice", "mince", "grate", "cut", "trim", "turn", "flip",
    "set", "put", "wash", "pat", "rub", "braise", "poach", "steam", "taste",
];

const MEASUREMENT_UNITS: &str = "cup|tablespoon|teaspoon|pound|ounce|gram|kilogram|kg|lb|oz|tsp|tbsp|tbs|g|ml|\
     milliliter|millilitre|liter|litre|pint|quart|gallon|clove|slice|stick|head|bunch|sprig|stalk|\
     can|jar|package|box|bag|container|pinch|dash|piece|handful|inch";

const COUNTED_NOUNS: &str = "egg|garlic|onion|carrot|potato|tomato|pepper|clove|lemon|lime|orange|\
     basil|parsley|mint|leaf|leaves|zucchini|squash|chicken|apple|pear|banana|shallot|scallion|\
     avocado|chile|chili|steak|fillet|thigh|breast";

/// Generic ingredient nouns; a title consisting of exactly one is a
/// component, not a recipe.
pub const GENERIC_INGREDIENTS: &[&str] = &[
    "coarse salt", "sea salt", "kosher salt", "black pepper", "white pepper", "olive oil",
    "vegetable oil", "butter", "flour", "sugar", "water", "salt", "pepper", "oil",
];

/// Class-name fragments marking ingredient markup.
pub const INGREDIENT_CLASS_MARKERS: &[&str] = &[
    "ingredient", "ingred", "ingt", "ings", "ingd", "ing",
];

/// Class-name fragments marking instruction markup.
pub const INSTRUCTION_CLASS_MARKERS: &[&str] = &[
    "method", "step", "instruction", "direction", "preparation", "noindentt", "noindent",
    "procedure", "proc",
];

/// Class-name fragments marking metadata markup.
pub const METADATA_CLASS_MARKERS: &[&str] = &[
    "serves", "servings", "yield", "time", "meta", "recipe-info", "stats",
];

/// Read-only set of compiled matchers.
pub struct PatternLibrary {
    /// Quantity + unit, unicode fraction + unit, or a counted noun ("2 eggs").
    pub measurement: Regex,
    /// Unit words only, used to judge unit variety.
    pub unit: Regex,
    /// Fraction glyphs, slash fractions and decimals.
    pub fraction: Regex,
    pub cooking_verbs: Regex,
    verb_set: HashSet<&'static str>,
    /// Headings that open an ingredient list.
    pub ingredient_heading: Regex,
    /// Headings that open a method, including the extended keyword list.
    pub instruction_heading: Regex,
    /// Marker phrases scored by the validator.
    pub ingredient_phrase: Regex,
    pub instruction_phrase: Regex,
    /// "For the sauce" style component headers.
    pub component_header: Regex,
    /// "To make:" style narrative lead-ins.
    pub narrative_prefix: Regex,
    /// Lines that end an instruction run ("Tip:", "Note:", ...).
    pub stop_phrase: Regex,
    pub exclusion_keyword: Regex,
    pub exclusion_prefix: Regex,
    pub sub_section: Regex,
    /// Serving-size and section words that disqualify a title candidate.
    pub title_stop: Regex,
    pub numbered_step: Regex,
    pub bullet: Regex,
    pub servings_label: Regex,
    pub servings_value: Regex,
    pub time_label: Regex,
    /// "Difficulty: easy" style lines
    pub difficulty_label: Regex,
    pub time_range: Regex,
    pub hours: Regex,
    pub minutes: Regex,
    pub negative_time: Regex,
    pub bare_number: Regex,
    pub parenthetical: Regex,
    pub markup_residue: Regex,
    pub cooking_methods: Vec<(&'static str, Regex)>,
    pub protein_types: Vec<(&'static str, Regex)>,
    pub difficulty_levels: Vec<(&'static str, Regex)>,
}

impl std::fmt::Debug for PatternLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternLibrary").finish_non_exhaustive()
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

fn keyword_alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

fn vocabulary(entries: &[(&'static str, &[&str])]) -> Vec<(&'static str, Regex)> {
    entries
        .iter()
        .map(|(label, words)| {
            (
                *label,
                compile(&format!(r"(?i)\b(?:{})\b", keyword_alternation(words))),
            )
        })
        .collect()
}

impl PatternLibrary {
    pub fn new() -> Self {
        let units = MEASUREMENT_UNITS.replace(char::is_whitespace, "");
        let nouns = COUNTED_NOUNS.replace(char::is_whitespace, "");

        let measurement = compile(&format!(
            r"(?i)(?:\b\d+(?:[.,]\d+)?|[¼½¾⅓⅔⅕⅖⅗⅘⅙⅚⅐⅛⅜⅝⅞])[\s/-]?(?:{units})(?:e?s)?\b|\b\d+(?:\s*-\s*\d+)?\s+(?:(?:large|medium|small|whole|fresh|dried|frozen|good-sized)\s+)?(?:{nouns})(?:e?s)?\b"
        ));

        Self {
            measurement,
            unit: compile(&format!(r"(?i)\b({units})(?:e?s)?\b")),
            fraction: compile(r"[¼½¾⅓⅔⅕⅖⅗⅘⅙⅚⅐⅛⅜⅝⅞]|\b\d+/\d+\b|\b\d+\.\d+\b"),
            cooking_verbs: compile(&format!(
                r"(?i)\b(?:{})\b",
                keyword_alternation(COOKING_VERBS)
            )),
            verb_set: COOKING_VERBS.iter().copied().collect(),
            ingredient_heading: compile(
                r"(?i)\b(?:ingredients?|what you(?:'ll| will)? need|you(?:'ll| will) need|shopping list)\b",
            ),
            instruction_heading: compile(
                r"(?i)\b(?:instructions?|directions?|method|preparation|how to prepare|how to make|steps|to make|to prepare|to cook|let's cook|cooking instructions|recipe method|the method)\b",
            ),
            ingredient_phrase: compile(r"(?i)\b(?:ingredients?|what you need|you'll need)\b"),
            instruction_phrase: compile(r"(?i)\b(?:instructions?|directions?|method|steps?)\b"),
            component_header: compile(r"(?i)^for\s+(?:the|a|an)\s+[\w' -]{1,40}?:?$"),
            narrative_prefix: compile(
                r"(?i)^(?:to make|to prepare|to cook|to assemble|to finish|to serve)\b(?:\s+the)?[\w\s]{0,30}:",
            ),
            stop_phrase: compile(
                r"(?i)^(?:tips?|notes?|serving suggestions?|variations?|chef'?s notes?|storage|make ahead)\s*:",
            ),
            exclusion_keyword: compile(
                r"(?i)\b(?:index|contents|table of contents|about the author|acknowledge?ments?|introduction|foreword|preface|copyright|dedication|glossary|conversion charts?)\b",
            ),
            exclusion_prefix: compile(r"(?i)^(?:how to\b|tips (?:for|on)\b|guide to\b|about\b)"),
            sub_section: compile(
                r"(?ix)^(?:
                    (?:special\s+)?equipment(?:\s+needed)?:?
                  | (?:gear|tools?)(?:\s+needed)?:?
                  | what\s+you(?:'ll)?\s+need:?
                  | (?:prep|cook|active|passive|total)\s+time\b.*
                  | (?:serves?|servings?|yields?|makes?):?\s*\d*
                  | to\s+serve:?
                  | for\s+serving:?
                  | garnish:?
                  | presentation:?
                  | FOR\s+THE\s+.*
                  | (?:coarse|sea|kosher)\s+salt
                  | (?:black|white)\s+pepper
                  | (?:olive|vegetable|canola)\s+oil
                  | ingredients? | method | directions? | instructions?
                  | dressing | sauce | marinade | glaze | rub | brine
                  | (?:the\s+)?(?:filling|topping|coating|crust)
                  | (?:notes?|tips?|variations?):?
                  | (?:indoor|outdoor)\s+alternative:?
                  | (?:chef(?:'s)?|cook(?:'s)?)\s+(?:notes?|tips?):?
                )$",
            ),
            title_stop: compile(
                r"(?i)\b(?:serves?|servings?|makes|yields?|portions?|ingredients?|for the|you'll need|what you need)\b",
            ),
            numbered_step: compile(r"^\s*\d+[.)]\s+\S"),
            bullet: compile(r"^\s*[-•*·●▪]\s+\S"),
            servings_label: compile(
                r"(?i)\b(?:serves?|servings?|yields?|makes?)\b\s*:?\s*(?P<value>[^\n]*)",
            ),
            servings_value: compile(
                r"(?i)^(?:about\s+|approximately\s+)?(?P<low>\d+)(?:\s*(?:-|–|to)\s*(?P<high>\d+))?",
            ),
            time_label: compile(
                r"(?i)\b(?P<label>prep(?:aration)?|active|total|cook(?:ing)?|passive|baking)(?:\s*time\s*:?|\s*:)\s*(?P<value>[^\n]*)",
            ),
            difficulty_label: compile(
                r"(?i)\b(?:difficulty|skill level|level)\s*:\s*(?P<value>[^\n]+)",
            ),
            time_range: compile(r"(?P<first>\d+(?:\.\d+)?)\s*(?:-|–|to)\s*\d+(?:\.\d+)?"),
            hours: compile(r"(?i)(?P<n>\d+(?:\.\d+)?)\s*(?:hours?|hrs?)\b"),
            minutes: compile(r"(?i)(?P<n>\d+)\s*(?:minutes?|mins?)\b"),
            negative_time: compile(r"(?:^|\s)-\s*\d"),
            bare_number: compile(r"^\d+$"),
            parenthetical: compile(r"\([^)]*\)"),
            markup_residue: compile(r"\{[^}]+\}|\[[^\]]*\]\([^)]*\)"),
            cooking_methods: vocabulary(&[
                ("smoke", &["smoke", "smoked", "smoking"]),
                ("grill", &["grill", "grilled", "grilling", "barbecue", "barbecued"]),
                ("roast", &["roast", "roasted", "roasting"]),
                ("bake", &["bake", "baked", "baking"]),
                ("fry", &["fry", "fried", "frying", "pan-fried", "deep-fried"]),
                ("braise", &["braise", "braised", "braising"]),
                ("steam", &["steam", "steamed", "steaming"]),
            ]),
            protein_types: vocabulary(&[
                ("beef", &["beef", "steak", "steaks", "brisket", "ribeye", "sirloin"]),
                ("pork", &["pork", "bacon", "ham", "pancetta", "chorizo"]),
                ("chicken", &["chicken"]),
                ("lamb", &["lamb"]),
                ("fish", &["fish", "salmon", "tuna", "cod", "halibut", "trout"]),
                ("seafood", &["seafood", "shrimp", "prawns", "scallops", "mussels", "crab"]),
                ("turkey", &["turkey"]),
                ("duck", &["duck"]),
            ]),
            difficulty_levels: vocabulary(&[
                ("easy", &["easy", "simple", "beginner", "quick"]),
                ("intermediate", &["intermediate", "moderate"]),
                ("advanced", &["advanced", "difficult", "expert", "challenging"]),
            ]),
        }
    }

    /// Number of cooking-verb occurrences in `text`.
    pub fn count_verbs(&self, text: &str) -> usize {
        self.cooking_verbs.find_iter(text).count()
    }

    /// Number of distinct cooking verbs in `text`.
    pub fn distinct_verbs(&self, text: &str) -> usize {
        self.cooking_verbs
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn count_measurements(&self, text: &str) -> usize {
        self.measurement.find_iter(text).count()
    }

    /// True when the first word of `line` is a cooking verb.
    pub fn starts_with_verb(&self, line: &str) -> bool {
        line.split_whitespace()
            .next()
            .map(|word| {
                let word = word
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase();
                self.verb_set.contains(word.as_str())
            })
            .unwrap_or(false)
    }

    /// A plain-text line that reads as one ingredient: it carries a quantity,
    /// does not open with a verb and is not paragraph-length.
    pub fn is_ingredient_line(&self, line: &str) -> bool {
        let line = line.trim();
        !line.is_empty()
            && line.chars().count() <= 150
            && self.measurement.is_match(line)
            && !self.starts_with_verb(line)
    }

    /// True for a "For the dough" style component header line.
    pub fn is_component_header(&self, line: &str) -> bool {
        let line = line.trim();
        line.chars().count() <= 60
            && self.component_header.is_match(line)
            && !self.measurement.is_match(line)
    }

    /// Serving words, section markers, generic ingredients or measurements.
    pub fn looks_like_ingredient_or_stop(&self, text: &str) -> bool {
        let lower = text.trim().to_lowercase();
        self.title_stop.is_match(&lower)
            || self.measurement.is_match(&lower)
            || is_generic_ingredient(&lower)
    }

    /// A title that names a single ingredient line rather than a dish:
    /// short with a quantity, exactly a generic ingredient, or a short
    /// measured line.
    pub fn is_ingredient_title(&self, title: &str) -> bool {
        let title = title.trim();
        let length = title.chars().count();
        if length > 30 {
            return false;
        }
        if length < 20
            && (title.chars().any(|c| c.is_ascii_digit())
                || is_generic_ingredient(&title.to_lowercase()))
        {
            return true;
        }
        length < 25 && self.measurement.is_match(title)
    }

    pub fn is_stop_line(&self, line: &str) -> bool {
        self.stop_phrase.is_match(line.trim())
    }
}

fn is_generic_ingredient(lower: &str) -> bool {
    GENERIC_INGREDIENTS.contains(&lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_forms() {
        let p = patterns();
        assert!(p.measurement.is_match("2 cups flour"));
        assert!(p.measurement.is_match("½ tsp salt"));
        assert!(p.measurement.is_match("1.5 lb chuck"));
        assert!(p.measurement.is_match("2 eggs"));
        assert!(p.measurement.is_match("3 large tomatoes"));
        assert!(p.measurement.is_match("1/2 cup milk"));
        assert!(!p.measurement.is_match("Serve warm with bread"));
    }

    #[test]
    fn test_verbs_are_word_bounded() {
        let p = patterns();
        assert_eq!(p.count_verbs("Preheat the oven, then cook and stir."), 3);
        assert_eq!(p.count_verbs("cooking is fun"), 0);
        assert_eq!(p.distinct_verbs("stir, stir, stir and add"), 2);
    }

    #[test]
    fn test_first_word_verb() {
        let p = patterns();
        assert!(p.starts_with_verb("Heat the oil in a pan"));
        assert!(p.starts_with_verb("  Add 2 cups stock"));
        assert!(!p.starts_with_verb("2 cups stock"));
        assert!(!p.is_ingredient_line("Add 2 cups stock"));
        assert!(p.is_ingredient_line("2 cups chicken stock"));
    }

    #[test]
    fn test_ingredient_titles() {
        let p = patterns();
        assert!(p.is_ingredient_title("Sea Salt"));
        assert!(p.is_ingredient_title("2 cups flour"));
        assert!(p.is_ingredient_title("Butter"));
        assert!(!p.is_ingredient_title("Butter Chicken"));
        assert!(!p.is_ingredient_title("Onion Soup"));
        assert!(!p.is_ingredient_title("Cream Cheese Frosting"));
        assert!(!p.is_ingredient_title("Slow-Roasted Lamb with 40 Cloves of Garlic"));
    }

    #[test]
    fn test_component_header() {
        let p = patterns();
        assert!(p.is_component_header("For the Sauce"));
        assert!(p.is_component_header("FOR THE DOUGH:"));
        assert!(!p.is_component_header("For the sauce, whisk 2 cups cream"));
    }

    #[test]
    fn test_stop_lines() {
        let p = patterns();
        assert!(p.is_stop_line("Tip: use a cast iron pan"));
        assert!(p.is_stop_line("Chef's note: rest the meat"));
        assert!(p.is_stop_line("Make ahead: keeps 3 days"));
        assert!(!p.is_stop_line("Stir in the note of lemon"));
    }
}
