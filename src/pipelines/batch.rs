//! Parallel extraction over many books.
//!
//! Each book gets its own blocking worker. The extractor and pattern library
//! are shared read-only; only the store sees concurrent writers.

use std::sync::Arc;

use log::{info, warn};
use tokio::task;

use crate::error::ExtractError;
use crate::storage::RecipeStore;

use super::{BookOutcome, BookSource, RecipeExtractor};

/// Result for one source, reported in input order.
#[derive(Debug)]
pub struct BookReport {
    pub name: String,
    pub result: Result<BookOutcome, ExtractError>,
    /// Recipes written to the store, 0 without one
    pub persisted: usize,
}

impl BookReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn recipe_count(&self) -> usize {
        self.result.as_ref().map_or(0, |outcome| outcome.recipes.len())
    }
}

fn run_book(
    extractor: &RecipeExtractor,
    source: &dyn BookSource,
    store: Option<&dyn RecipeStore>,
) -> (Result<BookOutcome, ExtractError>, usize) {
    let book = match source.open() {
        Ok(book) => book,
        Err(e) => return (Err(e), 0),
    };
    let outcome = extractor.extract_book(&book);

    let Some(store) = store else {
        return (Ok(outcome), 0);
    };
    match store.persist_batch(&outcome.recipes) {
        Ok(persisted) => (Ok(outcome), persisted),
        Err(e) => (Err(e), 0),
    }
}

/// Extracts every source on its own blocking worker and, with a store,
/// persists each book's recipes as one batch.
///
/// A book that cannot be opened, or whose batch the store rejects, fails
/// alone. The others still complete.
pub async fn extract_books(
    extractor: Arc<RecipeExtractor>,
    sources: Vec<Box<dyn BookSource>>,
    store: Option<Arc<dyn RecipeStore>>,
) -> Vec<BookReport> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let name = source.name();
            let extractor = Arc::clone(&extractor);
            let store = store.clone();
            let handle = task::spawn_blocking(move || {
                run_book(&extractor, source.as_ref(), store.as_deref())
            });
            (name, handle)
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let (result, persisted) = handle
            .await
            .unwrap_or_else(|e| (Err(ExtractError::Worker(e.to_string())), 0));

        match &result {
            Ok(outcome) => info!(
                "Book {}: {} recipes, {} persisted",
                name,
                outcome.recipes.len(),
                persisted
            ),
            Err(e) => warn!("Book {} failed: {}", name, e),
        }
        reports.push(BookReport {
            name,
            result,
            persisted,
        });
    }
    reports
}
