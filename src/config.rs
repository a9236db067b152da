use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringPolicy;

/// Extraction settings shared by every stage of the pipeline
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Recipes scoring below this are dropped after assembly
    #[serde(default = "default_min_quality_score")]
    pub min_quality_score: u8,
    /// Sections with less plain text are skipped before validation
    #[serde(default = "default_min_section_chars")]
    pub min_section_chars: usize,
    /// Hard cap on sibling/ancestor steps while collecting one section
    #[serde(default = "default_max_traversal_steps")]
    pub max_traversal_steps: usize,
    /// A winning ingredient strategy must render more characters than this
    #[serde(default = "default_min_component_chars")]
    pub min_ingredient_chars: usize,
    /// A winning instruction strategy must render more characters than this
    #[serde(default = "default_min_component_chars")]
    pub min_instruction_chars: usize,
    /// Keep the section plain text on each Recipe
    #[serde(default)]
    pub include_raw_content: bool,
    /// Quality score weights and tiers
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_quality_score: default_min_quality_score(),
            min_section_chars: default_min_section_chars(),
            max_traversal_steps: default_max_traversal_steps(),
            min_ingredient_chars: default_min_component_chars(),
            min_instruction_chars: default_min_component_chars(),
            include_raw_content: false,
            scoring: ScoringPolicy::default(),
        }
    }
}

// Default value functions
fn default_min_quality_score() -> u8 {
    20
}

fn default_min_section_chars() -> usize {
    100
}

fn default_max_traversal_steps() -> usize {
    1000
}

fn default_min_component_chars() -> usize {
    50
}

impl ExtractorConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_EXTRACTOR prefix
    /// 2. recipe_extractor.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_EXTRACTOR__SCORING__MISSING_COMPONENT_PENALTY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`ExtractorConfig::load`] for the source priority.
pub fn load_config() -> Result<ExtractorConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe_extractor").required(false))
        // Use double underscore for nested: RECIPE_EXTRACTOR__SCORING__SERVES_POINTS
        .add_source(
            Environment::with_prefix("RECIPE_EXTRACTOR")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
