//! Thin wrapper over `scraper` that turns chapter markup into flat blocks
//! and plain text for the extraction stages.

pub mod segmenter;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::patterns::{
    patterns, INGREDIENT_CLASS_MARKERS, INSTRUCTION_CLASS_MARKERS, METADATA_CLASS_MARKERS,
};

pub use self::segmenter::{Section, Segmenter};

static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));
static TITLED_SECTION: Lazy<Selector> = Lazy::new(|| selector("section[title]"));
static EMPHASIS: Lazy<Selector> = Lazy::new(|| selector("b, strong, em, i"));
pub(crate) static HEADINGS: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// One chapter of a book as handed over by the container reader.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: String,
    pub content: Vec<u8>,
    pub title_hint: Option<String>,
}

impl Chapter {
    pub fn new(id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            title_hint: None,
        }
    }

    /// Title to fall back on when the chapter holds a single untitled section,
    /// typically the table-of-contents label.
    pub fn with_title_hint(mut self, hint: impl Into<String>) -> Self {
        self.title_hint = Some(hint.into());
        self
    }
}

/// A chapter parsed into a DOM.
pub struct ParsedChapter {
    id: String,
    document: Html,
    title_hint: Option<String>,
}

impl ParsedChapter {
    /// Parses chapter markup. Fails on non-UTF-8 bytes and on documents
    /// without any element or text content.
    pub fn parse(chapter: &Chapter) -> Result<Self, ExtractError> {
        let source =
            std::str::from_utf8(&chapter.content).map_err(|e| ExtractError::MalformedMarkup {
                chapter: chapter.id.clone(),
                reason: format!("content is not valid UTF-8: {e}"),
            })?;

        let document = Html::parse_document(source);
        let parsed = Self {
            id: chapter.id.clone(),
            document,
            title_hint: chapter.title_hint.clone(),
        };

        let body = parsed.body();
        let has_elements = body.children().any(|c| c.value().is_element());
        if !has_elements && render_text(&body).is_empty() {
            return Err(ExtractError::MalformedMarkup {
                chapter: chapter.id.clone(),
                reason: "document has no element content".to_string(),
            });
        }

        Ok(parsed)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `<body>` element, or the document root when there is none.
    pub fn body(&self) -> ElementRef<'_> {
        self.document
            .select(&BODY)
            .next()
            .unwrap_or_else(|| self.document.root_element())
    }

    /// Caller-supplied hint, else the `title` attribute of a `<section>`.
    /// Entities are decoded and formatting residue removed.
    pub fn title_hint(&self) -> Option<String> {
        let raw = self.title_hint.clone().or_else(|| {
            self.document
                .select(&TITLED_SECTION)
                .next()
                .and_then(|s| s.value().attr("title"))
                .map(str::to_string)
        })?;
        let cleaned = clean_title(&raw);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

/// Decodes entities, drops `{...}` markers and markdown links, collapses whitespace.
pub fn clean_title(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = patterns().markup_residue.replace_all(&decoded, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Which kind of recipe content a class attribute announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Ingredient,
    Instruction,
    Metadata,
}

fn class_matches(class: &str, marker: &str) -> bool {
    class == marker
        || class.split(['-', '_']).any(|token| token == marker)
        || (marker.len() >= 6 && class.contains(marker))
}

/// Role announced by the element's own class list, if any.
pub fn marker_role(element: &ElementRef) -> Option<MarkerRole> {
    let classes: Vec<String> = element
        .value()
        .classes()
        .map(|c| c.to_lowercase())
        .collect();
    if classes.is_empty() {
        return None;
    }
    let announces = |markers: &[&str]| {
        classes
            .iter()
            .any(|class| markers.iter().any(|m| class_matches(class, m)))
    };
    if announces(INGREDIENT_CLASS_MARKERS) {
        Some(MarkerRole::Ingredient)
    } else if announces(INSTRUCTION_CLASS_MARKERS) {
        Some(MarkerRole::Instruction)
    } else if announces(METADATA_CLASS_MARKERS) {
        Some(MarkerRole::Metadata)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    List { ordered: bool },
}

/// A flattened unit of section content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Plain text; list items are joined by newlines
    pub text: String,
    /// List items, empty for other kinds
    pub items: Vec<String>,
    pub role: Option<MarkerRole>,
    /// Emphasized text the block opens with
    pub emphasis: Option<String>,
}

impl Block {
    #[cfg(test)]
    pub(crate) fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
            items: Vec::new(),
            role: None,
            emphasis: None,
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            BlockKind::Heading(level) => Some(level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    pub fn is_paragraph(&self) -> bool {
        self.kind == BlockKind::Paragraph
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, BlockKind::List { .. })
    }
}

pub(crate) fn heading_level(element: &ElementRef) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn should_skip_element(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "script" | "style" | "head" | "noscript" | "template"
    ) || is_hidden(element)
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element
            .value()
            .attr("style")
            .map(|s| s.contains("display: none") || s.contains("display:none"))
            .unwrap_or(false)
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "caption"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figcaption"
            | "figure"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tbody"
            | "td"
            | "th"
            | "thead"
            | "tr"
            | "ul"
    )
}

fn has_block_child(element: &ElementRef) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| is_block_element(child.value().name()) || has_block_child(&child))
}

/// Renders an element as plain text: one line per block element or `<br>`,
/// whitespace collapsed, blank lines dropped.
pub fn render_text(element: &ElementRef) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    normalize_lines(&raw)
}

fn push_text(element: &ElementRef, out: &mut String) {
    if should_skip_element(element) {
        return;
    }
    let tag = element.value().name();
    if tag == "br" {
        out.push('\n');
        return;
    }
    let block = is_block_element(tag);
    if block {
        out.push('\n');
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_source_text(out, text);
        } else if let Some(child) = ElementRef::wrap(child) {
            push_text(&child, out);
        }
    }
    if block {
        out.push('\n');
    }
}

/// Source line breaks are plain whitespace; only block structure makes lines.
fn push_source_text(out: &mut String, text: &str) {
    out.extend(text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
}

pub(crate) fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn leading_emphasis(element: &ElementRef, text: &str) -> Option<String> {
    let emphasized = element.select(&EMPHASIS).next().map(|e| render_text(&e))?;
    (!emphasized.is_empty() && text.starts_with(&emphasized)).then_some(emphasized)
}

/// Accumulates flat blocks from a run of sibling nodes. Text and inline
/// elements between block elements are merged into one paragraph.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    blocks: Vec<Block>,
    inline: String,
    inline_role: Option<MarkerRole>,
    inline_emphasis: Option<String>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, text: &str, role: Option<MarkerRole>) {
        push_source_text(&mut self.inline, text);
        if !text.trim().is_empty() {
            self.inline_role = self.inline_role.or(role);
        }
    }

    pub fn push_element(&mut self, element: ElementRef, inherited: Option<MarkerRole>) {
        if should_skip_element(&element) {
            return;
        }
        let tag = element.value().name();
        let role = marker_role(&element).or(inherited);

        if tag == "br" {
            self.inline.push('\n');
            return;
        }

        if let Some(level) = heading_level(&element) {
            self.flush();
            let text = render_text(&element);
            if !text.is_empty() {
                self.blocks.push(Block {
                    kind: BlockKind::Heading(level),
                    emphasis: None,
                    items: Vec::new(),
                    role,
                    text,
                });
            }
            return;
        }

        if tag == "ul" || tag == "ol" {
            self.flush();
            let items: Vec<String> = element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li")
                .map(|li| render_text(&li).replace('\n', " "))
                .filter(|item| !item.is_empty())
                .collect();
            if !items.is_empty() {
                self.blocks.push(Block {
                    kind: BlockKind::List {
                        ordered: tag == "ol",
                    },
                    text: items.join("\n"),
                    emphasis: None,
                    items,
                    role,
                });
            }
            return;
        }

        if has_block_child(&element) {
            self.flush();
            self.push_children(element, role);
            self.flush();
            return;
        }

        if is_block_element(tag) {
            self.flush();
            let text = render_text(&element);
            if !text.is_empty() {
                self.blocks.push(Block {
                    kind: BlockKind::Paragraph,
                    emphasis: leading_emphasis(&element, &text),
                    items: Vec::new(),
                    role,
                    text,
                });
            }
            return;
        }

        // inline element
        let text = element.text().collect::<String>();
        if text.trim().is_empty() {
            return;
        }
        if self.inline.trim().is_empty() && self.inline_emphasis.is_none() {
            let emphasized = if matches!(tag, "b" | "strong" | "em" | "i") {
                Some(normalize_lines(&text))
            } else {
                leading_emphasis(&element, &normalize_lines(&text))
            };
            self.inline_emphasis = emphasized.filter(|e| !e.is_empty());
        }
        self.push_text(&text, role);
    }

    /// Pushes every child of `element`.
    pub fn push_children(&mut self, element: ElementRef, role: Option<MarkerRole>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.push_text(text, role);
            } else if let Some(child) = ElementRef::wrap(child) {
                self.push_element(child, role);
            }
        }
    }

    fn flush(&mut self) {
        let text = normalize_lines(&self.inline);
        let role = self.inline_role.take();
        let emphasis = self.inline_emphasis.take();
        self.inline.clear();
        if text.is_empty() {
            return;
        }
        self.blocks.push(Block {
            kind: BlockKind::Paragraph,
            emphasis: emphasis.filter(|e| text.starts_with(e.as_str())),
            items: Vec::new(),
            role,
            text,
        });
    }

    pub fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Flattens the children of `element` into blocks.
pub fn flatten(element: ElementRef) -> Vec<Block> {
    let mut builder = BlockBuilder::new();
    builder.push_children(element, marker_role(&element));
    builder.finish()
}
