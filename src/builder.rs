use crate::config::{load_config, ExtractorConfig};
use crate::patterns::PatternLibrary;
use crate::pipelines::RecipeExtractor;
use crate::scoring::ScoringPolicy;
use crate::ExtractError;

/// Builder for configuring a [`RecipeExtractor`]
///
/// Starts from a whole [`ExtractorConfig`] (defaults unless one is given) and
/// applies individual overrides on top.
#[derive(Debug, Default)]
pub struct RecipeExtractorBuilder {
    config: Option<ExtractorConfig>,
    min_quality_score: Option<u8>,
    min_section_chars: Option<usize>,
    max_traversal_steps: Option<usize>,
    min_ingredient_chars: Option<usize>,
    min_instruction_chars: Option<usize>,
    include_raw_content: Option<bool>,
    scoring: Option<ScoringPolicy>,
    patterns: Option<&'static PatternLibrary>,
}

impl RecipeExtractorBuilder {
    /// Use a complete configuration as the base
    ///
    /// # Example
    /// ```
    /// use epub_recipes::{ExtractorConfig, RecipeExtractor};
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .config(ExtractorConfig::default());
    /// ```
    pub fn config(mut self, config: ExtractorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `recipe_extractor.toml` and `RECIPE_EXTRACTOR__*` environment
    /// variables as the base
    ///
    /// # Errors
    /// Returns `ExtractError::Config` if a source exists but cannot be parsed.
    pub fn load_config(self) -> Result<Self, ExtractError> {
        Ok(self.config(load_config()?))
    }

    /// Drop recipes scoring below this
    ///
    /// # Example
    /// ```
    /// use epub_recipes::RecipeExtractor;
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .min_quality_score(40);
    /// ```
    pub fn min_quality_score(mut self, score: u8) -> Self {
        self.min_quality_score = Some(score);
        self
    }

    /// Skip sections with less plain text than this
    pub fn min_section_chars(mut self, chars: usize) -> Self {
        self.min_section_chars = Some(chars);
        self
    }

    /// Cap the sibling/ancestor steps taken while collecting one section
    ///
    /// # Example
    /// ```
    /// use epub_recipes::RecipeExtractor;
    ///
    /// let builder = RecipeExtractor::builder()
    ///     .max_traversal_steps(200);
    /// ```
    pub fn max_traversal_steps(mut self, steps: usize) -> Self {
        self.max_traversal_steps = Some(steps);
        self
    }

    pub fn min_ingredient_chars(mut self, chars: usize) -> Self {
        self.min_ingredient_chars = Some(chars);
        self
    }

    pub fn min_instruction_chars(mut self, chars: usize) -> Self {
        self.min_instruction_chars = Some(chars);
        self
    }

    /// Keep each section's plain text on its recipe
    pub fn include_raw_content(mut self, include: bool) -> Self {
        self.include_raw_content = Some(include);
        self
    }

    /// Replace the quality score weights
    ///
    /// # Example
    /// ```
    /// use epub_recipes::{RecipeExtractor, ScoringPolicy};
    ///
    /// let policy = ScoringPolicy {
    ///     missing_component_penalty: 50,
    ///     ..ScoringPolicy::default()
    /// };
    /// let builder = RecipeExtractor::builder().scoring(policy);
    /// ```
    pub fn scoring(mut self, policy: ScoringPolicy) -> Self {
        self.scoring = Some(policy);
        self
    }

    /// Use a pattern library other than the process-wide one
    pub fn patterns(mut self, patterns: &'static PatternLibrary) -> Self {
        self.patterns = Some(patterns);
        self
    }

    /// Validate the settings and build the extractor
    ///
    /// # Errors
    /// Returns `ExtractError::Builder` if:
    /// - `min_quality_score` is above 100
    /// - `max_traversal_steps` is 0
    ///
    /// # Example
    /// ```
    /// # use epub_recipes::RecipeExtractor;
    /// # fn main() -> Result<(), epub_recipes::ExtractError> {
    /// let extractor = RecipeExtractor::builder()
    ///     .min_quality_score(30)
    ///     .include_raw_content(true)
    ///     .build()?;
    /// assert_eq!(extractor.config().min_quality_score, 30);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<RecipeExtractor, ExtractError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(score) = self.min_quality_score {
            config.min_quality_score = score;
        }
        if let Some(chars) = self.min_section_chars {
            config.min_section_chars = chars;
        }
        if let Some(steps) = self.max_traversal_steps {
            config.max_traversal_steps = steps;
        }
        if let Some(chars) = self.min_ingredient_chars {
            config.min_ingredient_chars = chars;
        }
        if let Some(chars) = self.min_instruction_chars {
            config.min_instruction_chars = chars;
        }
        if let Some(include) = self.include_raw_content {
            config.include_raw_content = include;
        }
        if let Some(policy) = self.scoring {
            config.scoring = policy;
        }

        if config.min_quality_score > 100 {
            return Err(ExtractError::Builder(format!(
                "min_quality_score must be 0..=100, got {}",
                config.min_quality_score
            )));
        }
        if config.max_traversal_steps == 0 {
            return Err(ExtractError::Builder(
                "max_traversal_steps must be at least 1".to_string(),
            ));
        }

        Ok(match self.patterns {
            Some(patterns) => RecipeExtractor::with_patterns(config, patterns),
            None => RecipeExtractor::new(config),
        })
    }
}
