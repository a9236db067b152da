//! Chapter and book orchestration.
//!
//! Each chapter runs Segment → Validate → Extract → Score → Assemble. Sections
//! are independent of each other, and chapter faults stay inside the chapter.

use log::{debug, info, warn};
use serde::Serialize;

use crate::builder::RecipeExtractorBuilder;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::extractors::{
    ExtractionTrace, Extractor, IngredientExtractor, InstructionExtractor, MetadataExtractor,
};
use crate::markup::{Chapter, ParsedChapter, Section, Segmenter};
use crate::model::{Recipe, RecipeDraft};
use crate::patterns::{patterns, PatternLibrary};
use crate::scoring::QualityScorer;
use crate::validator::{SectionValidator, Verdict};

pub mod batch;
pub mod source;

pub use self::source::{BookSource, ChapterDirectory};

/// A book as handed over by the container reader.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub title: String,
    pub author: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }
}

/// What happened to one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionOutcome {
    /// Plain text shorter than `min_section_chars`
    TooShort,
    Rejected,
    BelowThreshold { score: u8 },
    Extracted { score: u8 },
}

/// Diagnostics for one section: validator verdict and strategy traces.
#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub chapter_id: String,
    pub position: usize,
    pub title: String,
    pub verdict: Option<Verdict>,
    pub ingredient_trace: ExtractionTrace,
    pub instruction_trace: ExtractionTrace,
    pub metadata_trace: ExtractionTrace,
    pub outcome: SectionOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterReport {
    pub chapter_id: String,
    pub recipes: Vec<Recipe>,
    pub sections: Vec<SectionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterFailure {
    pub chapter_id: String,
    pub reason: String,
}

/// Recipes of one book, in chapter then section order, plus diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct BookOutcome {
    pub book: String,
    pub recipes: Vec<Recipe>,
    pub sections: Vec<SectionReport>,
    pub failed_chapters: Vec<ChapterFailure>,
}

impl BookOutcome {
    /// Per-section confidence and strategy traces as JSON.
    pub fn diagnostics_json(&self) -> Result<String, ExtractError> {
        #[derive(Serialize)]
        struct Diagnostics<'a> {
            book: &'a str,
            sections: &'a [SectionReport],
            failed_chapters: &'a [ChapterFailure],
        }

        Ok(serde_json::to_string_pretty(&Diagnostics {
            book: &self.book,
            sections: &self.sections,
            failed_chapters: &self.failed_chapters,
        })?)
    }
}

/// Runs the whole extraction pipeline. Holds no mutable state, so one
/// instance can be shared across workers.
#[derive(Debug, Clone)]
pub struct RecipeExtractor {
    config: ExtractorConfig,
    segmenter: Segmenter,
    validator: SectionValidator,
    ingredients: IngredientExtractor,
    instructions: InstructionExtractor,
    metadata: MetadataExtractor,
    scorer: QualityScorer,
}

impl Default for RecipeExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl RecipeExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_patterns(config, patterns())
    }

    pub fn with_patterns(config: ExtractorConfig, patterns: &'static PatternLibrary) -> Self {
        Self {
            segmenter: Segmenter::with_patterns(config.max_traversal_steps, patterns),
            validator: SectionValidator::new(patterns),
            ingredients: IngredientExtractor::new(patterns, config.min_ingredient_chars),
            instructions: InstructionExtractor::new(patterns, config.min_instruction_chars),
            metadata: MetadataExtractor::new(patterns),
            scorer: QualityScorer::with_patterns(config.scoring.clone(), patterns),
            config,
        }
    }

    pub fn builder() -> RecipeExtractorBuilder {
        RecipeExtractorBuilder::default()
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn scorer(&self) -> &QualityScorer {
        &self.scorer
    }

    /// Extracts every book chapter. A chapter that fails to parse is logged,
    /// recorded in `failed_chapters` and skipped.
    pub fn extract_book(&self, book: &Book) -> BookOutcome {
        let mut outcome = BookOutcome {
            book: book.title.clone(),
            recipes: Vec::new(),
            sections: Vec::new(),
            failed_chapters: Vec::new(),
        };

        for chapter in &book.chapters {
            match self.extract_chapter(book, chapter) {
                Ok(report) => {
                    outcome.recipes.extend(report.recipes);
                    outcome.sections.extend(report.sections);
                }
                Err(e) => {
                    warn!("Skipping chapter {} of {}: {}", chapter.id, book.title, e);
                    outcome.failed_chapters.push(ChapterFailure {
                        chapter_id: chapter.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Extracted {} recipes from {} ({} sections, {} failed chapters)",
            outcome.recipes.len(),
            book.title,
            outcome.sections.len(),
            outcome.failed_chapters.len()
        );
        outcome
    }

    pub fn extract_chapter(
        &self,
        book: &Book,
        chapter: &Chapter,
    ) -> Result<ChapterReport, ExtractError> {
        let parsed = ParsedChapter::parse(chapter)?;
        let sections = self.segmenter.segment(&parsed);
        debug!("Chapter {}: {} sections", chapter.id, sections.len());

        let mut report = ChapterReport {
            chapter_id: chapter.id.clone(),
            recipes: Vec::new(),
            sections: Vec::with_capacity(sections.len()),
        };
        for section in &sections {
            let (recipe, section_report) = self.process_section(book, section);
            report.recipes.extend(recipe);
            report.sections.push(section_report);
        }
        Ok(report)
    }

    fn process_section(&self, book: &Book, section: &Section) -> (Option<Recipe>, SectionReport) {
        let mut report = SectionReport {
            chapter_id: section.chapter_id.clone(),
            position: section.position,
            title: section.title.clone(),
            verdict: None,
            ingredient_trace: ExtractionTrace::default(),
            instruction_trace: ExtractionTrace::default(),
            metadata_trace: ExtractionTrace::default(),
            outcome: SectionOutcome::TooShort,
        };

        if section.text.chars().count() < self.config.min_section_chars {
            debug!("Section {:?} too short, skipped", section.title);
            return (None, report);
        }

        let verdict = self.validator.validate(section);
        let accepted = verdict.accepted;
        report.verdict = Some(verdict);
        if !accepted {
            report.outcome = SectionOutcome::Rejected;
            return (None, report);
        }

        let ingredients = self.ingredients.extract(section, &mut report.ingredient_trace);
        let instructions = self.instructions.extract(section, &mut report.instruction_trace);
        let metadata = self
            .metadata
            .extract(section, &mut report.metadata_trace)
            .unwrap_or_default();
        let tags = self.metadata.tags(&section.title, &section.text, &metadata);

        let recipe = RecipeDraft {
            title: section.title.clone(),
            book: book.title.clone(),
            author: book.author.clone(),
            chapter: Some(section.chapter_id.clone()),
            section_position: section.position,
            ingredients,
            instructions,
            metadata,
            tags,
            raw_content: self
                .config
                .include_raw_content
                .then(|| section.text.clone()),
        }
        .finish(&self.scorer);

        let score = recipe.quality_score;
        if score < self.config.min_quality_score {
            debug!(
                "Recipe {:?} scored {} below threshold {}",
                recipe.title, score, self.config.min_quality_score
            );
            report.outcome = SectionOutcome::BelowThreshold { score };
            return (None, report);
        }

        info!("Extracted recipe {:?} (score {})", recipe.title, score);
        report.outcome = SectionOutcome::Extracted { score };
        (Some(recipe), report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEW: &str = r#"<html><body>
        <h2>Beef Stew</h2>
        <p>Serves 6</p>
        <p>Ingredients</p>
        <ul>
            <li>2 lb beef chuck, cubed</li>
            <li>3 tbsp flour</li>
            <li>2 cups beef stock</li>
            <li>4 carrots, sliced</li>
            <li>1 onion, diced</li>
        </ul>
        <p>Method</p>
        <p>Brown the beef in batches in a hot pan, then remove and set aside.</p>
        <p>Add the onion and carrots and cook until soft. Stir in the flour.</p>
        <p>Pour in the stock, return the beef and simmer for 2 hours.</p>
        </body></html>"#;

    fn book(chapters: Vec<Chapter>) -> Book {
        Book {
            title: "Slow Food".to_string(),
            author: Some("Sam".to_string()),
            chapters,
        }
    }

    #[test]
    fn test_extract_chapter_assembles_recipe() {
        let extractor = RecipeExtractor::default();
        let book = book(vec![Chapter::new("ch1", STEW)]);
        let report = extractor.extract_chapter(&book, &book.chapters[0]).unwrap();

        assert_eq!(report.recipes.len(), 1);
        let recipe = &report.recipes[0];
        assert_eq!(recipe.title, "Beef Stew");
        assert_eq!(recipe.book, "Slow Food");
        assert_eq!(recipe.chapter.as_deref(), Some("ch1"));
        assert!(recipe.ingredients.as_deref().unwrap().contains("2 lb beef chuck"));
        assert!(recipe.instructions.as_deref().unwrap().contains("simmer"));
        assert_eq!(recipe.metadata.serves.as_deref(), Some("6"));
        assert_eq!(recipe.raw_content, None);
        assert_eq!(extractor.scorer().score(recipe), recipe.quality_score);
    }

    #[test]
    fn test_bad_chapter_does_not_stop_book() {
        let extractor = RecipeExtractor::default();
        let book = book(vec![
            Chapter::new("broken", vec![0xff, 0xfe, 0x00]),
            Chapter::new("ch2", STEW),
        ]);
        let outcome = extractor.extract_book(&book);

        assert_eq!(outcome.recipes.len(), 1);
        assert_eq!(outcome.failed_chapters.len(), 1);
        assert_eq!(outcome.failed_chapters[0].chapter_id, "broken");
    }

    #[test]
    fn test_threshold_drops_recipe() {
        let config = ExtractorConfig {
            min_quality_score: 100,
            ..Default::default()
        };
        let extractor = RecipeExtractor::new(config);
        let book = book(vec![Chapter::new("ch1", STEW)]);
        let outcome = extractor.extract_book(&book);

        assert!(outcome.recipes.is_empty());
        assert!(matches!(
            outcome.sections[0].outcome,
            SectionOutcome::BelowThreshold { .. }
        ));
    }

    #[test]
    fn test_raw_content_kept_when_configured() {
        let config = ExtractorConfig {
            include_raw_content: true,
            ..Default::default()
        };
        let extractor = RecipeExtractor::new(config);
        let book = book(vec![Chapter::new("ch1", STEW)]);
        let outcome = extractor.extract_book(&book);
        let raw = outcome.recipes[0].raw_content.as_deref().unwrap();
        assert!(raw.contains("Brown the beef"));
    }

    #[test]
    fn test_diagnostics_json() {
        let extractor = RecipeExtractor::default();
        let book = book(vec![Chapter::new("ch1", STEW)]);
        let json = extractor.extract_book(&book).diagnostics_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["book"], "Slow Food");
        let section = &value["sections"][0];
        assert_eq!(section["outcome"]["kind"], "extracted");
        assert!(section["verdict"]["confidence"].as_f64().unwrap() > 0.0);
        assert!(section["ingredient_trace"]["outcomes"].is_array());
    }
}
