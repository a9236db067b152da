//! Boundary to the recipe store.
//!
//! The pipeline only needs atomic batch persistence, filtered queries and a
//! text search. [`MemoryStore`] serializes writers behind a mutex, so several
//! book workers may persist concurrently.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::error::ExtractError;
use crate::model::Recipe;

pub trait RecipeStore: Send + Sync {
    /// Persists every recipe or none of them. Returns the number stored.
    fn persist_batch(&self, recipes: &[Recipe]) -> Result<usize, ExtractError>;

    fn query(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, ExtractError>;

    /// Case-insensitive match over title, ingredients and instructions.
    fn search(&self, text: &str) -> Result<Vec<Recipe>, ExtractError>;
}

/// Minimum score plus exact-match scalar fields. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFilter {
    pub min_quality: Option<u8>,
    pub book: Option<String>,
    pub author: Option<String>,
    pub cooking_method: Option<String>,
    pub protein_type: Option<String>,
    pub serves: Option<String>,
}

impl RecipeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_quality(mut self, score: u8) -> Self {
        self.min_quality = Some(score);
        self
    }

    pub fn book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn cooking_method(mut self, method: impl Into<String>) -> Self {
        self.cooking_method = Some(method.into());
        self
    }

    pub fn protein_type(mut self, protein: impl Into<String>) -> Self {
        self.protein_type = Some(protein.into());
        self
    }

    pub fn serves(mut self, serves: impl Into<String>) -> Self {
        self.serves = Some(serves.into());
        self
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        fn exact(wanted: &Option<String>, actual: Option<&str>) -> bool {
            wanted.as_deref().map_or(true, |w| actual == Some(w))
        }

        self.min_quality.map_or(true, |min| recipe.quality_score >= min)
            && exact(&self.book, Some(recipe.book.as_str()))
            && exact(&self.author, recipe.author.as_deref())
            && exact(&self.cooking_method, recipe.metadata.cooking_method.as_deref())
            && exact(&self.protein_type, recipe.metadata.protein_type.as_deref())
            && exact(&self.serves, recipe.metadata.serves.as_deref())
    }
}

fn check_storable(recipe: &Recipe) -> Result<(), ExtractError> {
    if recipe.title.trim().is_empty() {
        return Err(ExtractError::Storage(format!(
            "recipe from {} has an empty title",
            recipe.book
        )));
    }
    if recipe.quality_score > 100 {
        return Err(ExtractError::Storage(format!(
            "recipe {:?} has out-of-range score {}",
            recipe.title, recipe.quality_score
        )));
    }
    Ok(())
}

/// In-process store with single-writer discipline.
#[derive(Debug, Default)]
pub struct MemoryStore {
    recipes: Mutex<Vec<Recipe>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Recipe>>, ExtractError> {
        self.recipes
            .lock()
            .map_err(|_| ExtractError::Storage("recipe store lock poisoned".to_string()))
    }

    pub fn len(&self) -> Result<usize, ExtractError> {
        Ok(self.lock()?.len())
    }
}

impl RecipeStore for MemoryStore {
    fn persist_batch(&self, recipes: &[Recipe]) -> Result<usize, ExtractError> {
        recipes.iter().try_for_each(check_storable)?;
        let mut stored = self.lock()?;
        stored.extend_from_slice(recipes);
        Ok(recipes.len())
    }

    fn query(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, ExtractError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn search(&self, text: &str) -> Result<Vec<Recipe>, ExtractError> {
        let needle = text.to_lowercase();
        let contains = |field: Option<&str>| {
            field.is_some_and(|value| value.to_lowercase().contains(&needle))
        };
        Ok(self
            .lock()?
            .iter()
            .filter(|r| {
                contains(Some(&r.title))
                    || contains(r.ingredients.as_deref())
                    || contains(r.instructions.as_deref())
            })
            .cloned()
            .collect())
    }
}
