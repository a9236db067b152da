#[cfg(test)]
mod tests {
    use epub_recipes::extractors::{Extractor, IngredientExtractor, InstructionExtractor};
    use epub_recipes::markup::{Chapter, ParsedChapter, Segmenter};
    use epub_recipes::{ExtractionTrace, IngredientList, SectionValidator};

    fn run(html: &str) -> (Option<IngredientList>, ExtractionTrace, Option<String>, ExtractionTrace) {
        let chapter = ParsedChapter::parse(&Chapter::new("test", html)).unwrap();
        let sections = Segmenter::default().segment(&chapter);
        let section = &sections[0];

        let mut ingredient_trace = ExtractionTrace::default();
        let mut instruction_trace = ExtractionTrace::default();
        let ingredients = IngredientExtractor::default().extract(section, &mut ingredient_trace);
        let instructions = InstructionExtractor::default().extract(section, &mut instruction_trace);
        (ingredients, ingredient_trace, instructions, instruction_trace)
    }

    #[test]
    fn test_class_marked_publisher_markup() {
        let (ingredients, _, instructions, instruction_trace) = run(
            r#"<body><h2>Shortbread</h2>
            <div class="recipe-ingredients">
                <p>2 cups plain flour</p>
                <p>1 cup salted butter, softened</p>
                <p>½ cup caster sugar</p>
                <p>1 tsp vanilla extract</p>
            </div>
            <div class="cooking-method">
                <p>Cream the butter and sugar, then mix in the flour to a soft dough.</p>
                <p>Press into a tin, prick all over and bake until pale gold.</p>
            </div>
            </body>"#,
        );

        let ingredients = ingredients.unwrap();
        assert_eq!(ingredients.line_count(), 4);
        assert_eq!(ingredients.groups[0].lines[2], "½ cup caster sugar");

        assert_eq!(instruction_trace.winner(), Some("marker_class"));
        let instructions = instructions.unwrap();
        assert!(instructions.starts_with("Cream the butter"));
        assert!(instructions.ends_with("bake until pale gold."));
        assert!(!instructions.contains("vanilla"));
    }

    #[test]
    fn test_component_groups_from_loose_paragraphs() {
        let (ingredients, trace, _, _) = run(
            r#"<body><h2>Chicken Parmesan</h2>
            <p>For the Sauce:</p>
            <p>1 can crushed tomatoes</p>
            <p>2 cloves garlic, sliced</p>
            <p>Simmer the sauce gently while you get on with the chicken.</p>
            <p>For the Chicken</p>
            <p>2 chicken breasts, pounded thin</p>
            <p>1 cup panko breadcrumbs</p>
            <p>Fry the chicken until golden, then spoon over the sauce.</p>
            </body>"#,
        );

        assert_eq!(trace.winner(), Some("text_fallback"));
        let ingredients = ingredients.unwrap();
        assert_eq!(ingredients.groups.len(), 2);
        assert_eq!(ingredients.groups[1].header.as_deref(), Some("For the Chicken"));
        assert_eq!(
            ingredients.render(),
            "For the Sauce\n- 1 can crushed tomatoes\n- 2 cloves garlic, sliced\n\n\
             For the Chicken\n- 2 chicken breasts, pounded thin\n- 1 cup panko breadcrumbs"
        );
    }

    #[test]
    fn test_ordered_method_list_is_numbered() {
        let (_, _, instructions, trace) = run(
            r#"<body><h2>Hummus</h2>
            <ul><li>1 can chickpeas, drained</li><li>3 tbsp tahini</li><li>1 lemon, juiced</li></ul>
            <ol>
                <li>Drain the chickpeas and keep a little of the liquid.</li>
                <li>Blend everything with the tahini until smooth.</li>
                <li>Season, drizzle with oil and serve.</li>
            </ol>
            </body>"#,
        );

        assert_eq!(trace.winner(), Some("list_steps"));
        let instructions = instructions.unwrap();
        assert!(instructions.starts_with("1. Drain the chickpeas"));
        assert!(instructions.contains("\n3. Season, drizzle"));
    }

    #[test]
    fn test_validator_rejects_component_titles() {
        let validator = SectionValidator::default();
        let recipe_text = "Whisk the oil and vinegar, season and pour over the leaves. \
                           Toss well and serve with 2 tbsp toasted seeds and 1 cup croutons.";

        for title in [
            "Marinade",
            "FOR THE GLAZE",
            "Sea Salt",
            "2 cups flour",
            "Equipment needed:",
            "Serves 4",
            "Table of Contents",
            "About the Author",
        ] {
            let verdict = validator.judge(title, recipe_text);
            assert!(!verdict.accepted, "{title} should be rejected");
            assert!(verdict.reason.is_some());
        }
    }

    #[test]
    fn test_validator_confidence_is_bounded() {
        let validator = SectionValidator::default();
        let text = "Ingredients\n2 cups flour\n1 tsp salt\n3 eggs\n1 cup milk\n\
                    Method\nWhisk the eggs and milk, stir in the flour and salt, then \
                    heat a pan, pour in a ladle of batter, cook until set, flip and serve \
                    straight away with lemon and sugar. Repeat with the rest of the batter.";
        let verdict = validator.judge("Pancakes", text);

        assert!(verdict.accepted);
        assert_eq!(verdict.score, 10);
        assert!(verdict.confidence > 0.9 && verdict.confidence <= 1.0);

        let story = validator.judge("A Summer in Provence", "We ate well every day.");
        assert!(!story.accepted);
        assert!(story.confidence < 0.2);
    }
}
