//! Heuristic recipe extraction from e-book chapters.
//!
//! Chapters are split into sections, each section is judged for
//! recipe-likeness, and accepted sections go through independent ingredient,
//! instruction and metadata extractors before being scored 0..=100.
//!
//! ```
//! use epub_recipes::{Book, Chapter, RecipeExtractor};
//!
//! let html = r#"<body><h2>Pan Sauce</h2>
//!     <p>Ingredients</p>
//!     <ul><li>2 tbsp unsalted butter</li><li>1 cup chicken stock</li>
//!     <li>1 tsp fresh thyme leaves</li><li>1 small shallot, minced</li></ul>
//!     <p>Method</p>
//!     <p>Melt the butter in the pan, add the stock and simmer until reduced by half.</p>
//!     <p>Stir in the thyme, season and serve.</p></body>"#;
//! let book = Book::new("Weeknights").with_chapter(Chapter::new("ch1", html));
//!
//! let outcome = RecipeExtractor::default().extract_book(&book);
//! assert_eq!(outcome.recipes[0].title(), "Pan Sauce");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod extractors;
pub mod markup;
pub mod model;
pub mod patterns;
pub mod pipelines;
pub mod scoring;
pub mod storage;
pub mod validator;

pub use builder::RecipeExtractorBuilder;
pub use config::{load_config, ExtractorConfig};
pub use error::ExtractError;
pub use extractors::{parse_servings, parse_time, ExtractionOutcome, ExtractionTrace};
pub use markup::{Chapter, Section, Segmenter};
pub use model::{IngredientGroup, IngredientList, Recipe, RecipeMetadata};
pub use patterns::{patterns, PatternLibrary};
pub use pipelines::batch::{extract_books, BookReport};
pub use pipelines::{
    Book, BookOutcome, BookSource, ChapterDirectory, ChapterReport, RecipeExtractor,
    SectionOutcome, SectionReport,
};
pub use scoring::{QualityScorer, ScoringPolicy};
pub use storage::{MemoryStore, RecipeFilter, RecipeStore};
pub use validator::{SectionValidator, Verdict};
