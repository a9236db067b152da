//! Batch extraction over unpacked books
//!
//! Usage: `cargo run --example extract_chapters -- <book-dir>...`
//!
//! Each directory holds one `.xhtml` file per chapter. Without arguments a
//! small built-in book is used. Set `RUST_LOG=debug` to see every strategy
//! attempt.

use std::sync::Arc;

use epub_recipes::{
    extract_books, Book, BookSource, Chapter, ChapterDirectory, MemoryStore, RecipeExtractor,
    RecipeFilter, RecipeStore,
};

const SAMPLE: &str = r#"<html><body>
<h2>Grilled Flank Steak</h2>
<p>Serves 4</p>
<p>Cook time: 15 minutes</p>
<p>Ingredients</p>
<ul>
  <li>2 lb flank steak</li>
  <li>3 tbsp olive oil</li>
  <li>2 cloves garlic, minced</li>
  <li>1 tsp smoked paprika</li>
  <li>1 tsp kosher salt</li>
</ul>
<p>Method</p>
<p>Whisk the oil, garlic and paprika, then rub it over the steak and let it sit for 20 minutes.</p>
<p>Heat the grill to high. Season the steak with salt and grill for 5 minutes per side.</p>
<p>Transfer to a board, cover loosely and rest before you slice it across the grain.</p>
</body></html>"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::try_init();

    let extractor = Arc::new(RecipeExtractor::builder().load_config()?.build()?);

    let dirs: Vec<String> = std::env::args().skip(1).collect();
    let sources: Vec<Box<dyn BookSource>> = if dirs.is_empty() {
        vec![Box::new(
            Book::new("Sample Grill Book").with_chapter(Chapter::new("grill", SAMPLE)),
        )]
    } else {
        dirs.into_iter()
            .map(|dir| Box::new(ChapterDirectory::new(dir)) as Box<dyn BookSource>)
            .collect()
    };

    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn RecipeStore> = store.clone();
    let reports = extract_books(extractor, sources, Some(shared)).await;

    for report in &reports {
        match &report.result {
            Ok(outcome) => {
                println!("=== {} ===", report.name);
                for recipe in &outcome.recipes {
                    println!("{:>3}  {}", recipe.quality_score(), recipe.title());
                }
                for failure in &outcome.failed_chapters {
                    println!("  skipped chapter {}: {}", failure.chapter_id, failure.reason);
                }
            }
            Err(e) => println!("=== {} === failed: {}", report.name, e),
        }
    }

    let good = store.query(&RecipeFilter::new().min_quality(60))?;
    println!("\n{} recipes scored 60 or more", good.len());
    Ok(())
}
