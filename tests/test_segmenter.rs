#[cfg(test)]
mod tests {
    use epub_recipes::markup::{Chapter, ParsedChapter, Segmenter};

    fn parse(chapter: Chapter) -> ParsedChapter {
        ParsedChapter::parse(&chapter).unwrap()
    }

    #[test]
    fn test_wrapped_recipes_split_at_their_headings() {
        let chapter = parse(Chapter::new(
            "ch3",
            r#"<html><body>
            <p>Chapter introduction that comes before any recipe.</p>
            <div class="recipe">
                <h2>Cornbread</h2>
                <p>Bake in a hot skillet.</p>
            </div>
            <div class="recipe">
                <h2>Hoppin' John</h2>
                <p>Simmer the peas with the ham hock.</p>
            </div>
            </body></html>"#,
        ));
        let sections = Segmenter::default().segment(&chapter);

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Cornbread", "Hoppin' John"]);
        assert_eq!(sections[0].text.trim(), "Bake in a hot skillet.");
        assert_eq!(sections[1].position, 1);
        assert!(sections.iter().all(|s| s.chapter_id == "ch3"));
    }

    #[test]
    fn test_subheadings_stay_inside_section() {
        let chapter = parse(Chapter::new(
            "ch1",
            r#"<body>
            <h2>Focaccia</h2><h4>Dough</h4><p>Mix the flour and water.</p>
            <h2>Grissini</h2><h4>Shaping</h4><p>Roll thin ropes.</p>
            <h2>Panzanella</h2><p>Toss the bread with tomatoes.</p>
            </body>"#,
        ));
        let sections = Segmenter::default().segment(&chapter);

        assert_eq!(sections.len(), 3);
        assert!(sections[0].text.contains("Dough"));
        assert!(sections[0].text.contains("Mix the flour"));
        assert!(!sections[0].text.contains("Roll thin ropes"));
    }

    #[test]
    fn test_traversal_cap_truncates_section() {
        let paragraphs: String = (0..50).map(|i| format!("<p>Line {i}</p>")).collect();
        let chapter = parse(Chapter::new(
            "long",
            format!("<body><h2>Endless</h2>{paragraphs}<h2>Next</h2><p>x</p></body>"),
        ));
        let sections = Segmenter::new(5).segment(&chapter);

        assert!(sections[0].truncated);
        assert!(sections[0].nodes.len() <= 5);
        assert!(!sections[1].truncated);
    }

    #[test]
    fn test_caller_hint_names_headingless_chapter() {
        let chapter = parse(
            Chapter::new(
                "ch7",
                "<body><p>2 cups flour</p><p>Mix well and bake for an hour.</p></body>",
            )
            .with_title_hint("Mom's Quick Bread"),
        );
        let sections = Segmenter::default().segment(&chapter);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Mom's Quick Bread");
    }

    #[test]
    fn test_section_title_attribute_is_the_hint() {
        let chapter = parse(Chapter::new(
            "ch8",
            r#"<body><section title="Mac &amp; Cheese {#mac}"><p>1 lb macaroni</p></section></body>"#,
        ));
        let sections = Segmenter::default().segment(&chapter);
        assert_eq!(sections[0].title, "Mac & Cheese");
    }

    #[test]
    fn test_page_number_heading_falls_back_to_emphasis() {
        let chapter = parse(Chapter::new(
            "ch9",
            "<body><h2>12</h2><p><em>Charred Corn Salad</em> with lime and chile.</p></body>",
        ));
        let sections = Segmenter::default().segment(&chapter);
        assert_eq!(sections[0].title, "Charred Corn Salad");
    }

    #[test]
    fn test_untitled_when_nothing_qualifies() {
        let chapter = parse(Chapter::new(
            "ch10",
            "<body><p>2 cups flour<br/>1 tsp salt</p></body>",
        ));
        let sections = Segmenter::default().segment(&chapter);

        assert!(sections[0].is_untitled());
        assert_eq!(sections[0].title, "Untitled");
    }

    #[test]
    fn test_non_utf8_chapter_is_malformed() {
        let result = ParsedChapter::parse(&Chapter::new("bad", vec![0xc3, 0x28]));
        assert!(matches!(
            result,
            Err(epub_recipes::ExtractError::MalformedMarkup { ref chapter, .. }) if chapter == "bad"
        ));
    }
}
