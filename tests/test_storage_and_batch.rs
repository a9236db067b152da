#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use epub_recipes::{
        extract_books, Book, BookSource, Chapter, ExtractError, MemoryStore, Recipe,
        RecipeExtractor, RecipeFilter, RecipeStore,
    };

    const CHILI: &str = r#"<body><h2>Pork Green Chili</h2>
        <p>Serves 6</p>
        <p>Ingredients</p>
        <ul>
            <li>2 lb pork shoulder, cubed</li>
            <li>4 cups chicken stock</li>
            <li>2 cups roasted green chiles</li>
            <li>1 onion, diced</li>
        </ul>
        <p>Method</p>
        <p>Brown the pork in batches, then remove it and soften the onion in the fat.</p>
        <p>Return the pork, add the chiles and stock and simmer until the meat is tender.</p>
        </body>"#;

    const SOUP: &str = r#"<body><h2>Roasted Tomato Soup</h2>
        <p>Ingredients</p>
        <ul>
            <li>2 lb ripe tomatoes, halved</li>
            <li>3 tbsp olive oil</li>
            <li>1 head garlic</li>
            <li>2 cups vegetable stock</li>
        </ul>
        <p>Method</p>
        <p>Roast the tomatoes and garlic with the oil until collapsed and charred at the edges.</p>
        <p>Blend with the stock, season and serve hot.</p>
        </body>"#;

    struct UnreadableBook;

    impl BookSource for UnreadableBook {
        fn name(&self) -> String {
            "Damaged Book".to_string()
        }

        fn open(&self) -> Result<Book, ExtractError> {
            Err(ExtractError::BookUnavailable {
                book: self.name(),
                reason: "bad zip header".to_string(),
            })
        }
    }

    /// Rejects every batch.
    struct ReadOnlyStore;

    impl RecipeStore for ReadOnlyStore {
        fn persist_batch(&self, _recipes: &[Recipe]) -> Result<usize, ExtractError> {
            Err(ExtractError::Storage("store is read-only".to_string()))
        }

        fn query(&self, _filter: &RecipeFilter) -> Result<Vec<Recipe>, ExtractError> {
            Ok(Vec::new())
        }

        fn search(&self, _text: &str) -> Result<Vec<Recipe>, ExtractError> {
            Ok(Vec::new())
        }
    }

    fn books() -> Vec<Box<dyn BookSource>> {
        vec![
            Box::new(
                Book::new("Stews")
                    .with_author("Rosa")
                    .with_chapter(Chapter::new("ch1", CHILI)),
            ),
            Box::new(UnreadableBook),
            Box::new(Book::new("Soups").with_chapter(Chapter::new("ch1", SOUP))),
        ]
    }

    #[tokio::test]
    async fn test_failed_book_does_not_block_others() {
        let _ = env_logger::try_init();
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn RecipeStore> = store.clone();

        let reports = extract_books(Arc::new(RecipeExtractor::default()), books(), Some(shared)).await;

        let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Stews", "Damaged Book", "Soups"]);

        assert!(reports[0].is_ok());
        assert_eq!(reports[0].persisted, 1);
        assert!(matches!(
            reports[1].result,
            Err(ExtractError::BookUnavailable { .. })
        ));
        assert_eq!(reports[1].recipe_count(), 0);
        assert_eq!(reports[2].persisted, 1);

        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_store_queries_after_batch() {
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn RecipeStore> = store.clone();
        extract_books(Arc::new(RecipeExtractor::default()), books(), Some(shared)).await;

        let pork = store
            .query(&RecipeFilter::new().protein_type("pork"))
            .unwrap();
        assert_eq!(pork.len(), 1);
        assert_eq!(pork[0].title(), "Pork Green Chili");
        assert_eq!(pork[0].author(), Some("Rosa"));
        assert_eq!(pork[0].metadata().serves.as_deref(), Some("6"));

        let stews = store.query(&RecipeFilter::new().book("Stews").serves("6")).unwrap();
        assert_eq!(stews.len(), 1);

        let hits = store.search("TOMATOES").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book(), "Soups");

        let strict = store.query(&RecipeFilter::new().min_quality(100)).unwrap();
        assert!(strict.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_batch_fails_book() {
        let store: Arc<dyn RecipeStore> = Arc::new(ReadOnlyStore);
        let sources: Vec<Box<dyn BookSource>> =
            vec![Box::new(Book::new("Soups").with_chapter(Chapter::new("ch1", SOUP)))];
        let reports = extract_books(Arc::new(RecipeExtractor::default()), sources, Some(store)).await;

        assert!(matches!(reports[0].result, Err(ExtractError::Storage(_))));
        assert_eq!(reports[0].persisted, 0);
    }

    #[tokio::test]
    async fn test_without_store_nothing_is_persisted() {
        let reports = extract_books(Arc::new(RecipeExtractor::default()), books(), None).await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].recipe_count(), 1);
        assert!(reports.iter().all(|r| r.persisted == 0));
    }

    #[test]
    fn test_memory_store_is_shared_across_threads() {
        let store = Arc::new(MemoryStore::new());
        let extractor = RecipeExtractor::default();
        let outcome = extractor.extract_book(&Book::new("Soups").with_chapter(Chapter::new("ch1", SOUP)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let recipes = outcome.recipes.clone();
                std::thread::spawn(move || store.persist_batch(&recipes).unwrap())
            })
            .collect();
        let written: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(written, 4);
        assert_eq!(store.len().unwrap(), 4);
    }
}
