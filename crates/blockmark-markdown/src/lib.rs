//! Markdown front end for `blockmark-renderer`.
//!
//! Parses markdown with pulldown-cmark and folds the event stream into the
//! [`Block`] tree the renderer consumes.
//!
//! - Heading attributes (`# Title {#id .class}`) and fenced code info strings
//!   (`` ```rust {.numbered} ``) become block attribute annotations.
//! - Thematic breaks keep their marker character (`-`, `_`, `*`).
//! - Tight list items hold a single unspaced paragraph.
//! - Reference links stay unresolved ([`Inline::Reference`]); the document's
//!   link reference definitions are appended as [`Block::IdDefinition`]s.
//!
//! # Example
//!
//! ```
//! use blockmark_markdown::{ParseOptions, markdown_to_html};
//! use blockmark_renderer::RenderOptions;
//!
//! let html = markdown_to_html("# Hi {.title}\n\n***", &ParseOptions::default(), RenderOptions::default())
//!     .unwrap();
//! assert_eq!(html, "<h1 class=\"title\">Hi</h1>\n<hr class=\"thick\" />\n");
//! ```
//!
//! [`Inline::Reference`]: blockmark_renderer::Inline::Reference

mod builder;
mod util;

use blockmark_renderer::{Block, RenderContext, RenderError, RenderOptions, Renderer};
use pulldown_cmark::{Options, Parser};

use crate::builder::Builder;

/// Markdown parser options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable tables, strikethrough and task lists.
    pub gfm: bool,
    /// Parse `{#id .class}` attribute blocks after headings.
    pub heading_attributes: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            heading_attributes: true,
        }
    }
}

impl ParseOptions {
    /// pulldown-cmark options for this configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS;
        }
        if self.heading_attributes {
            options |= Options::ENABLE_HEADING_ATTRIBUTES;
        }
        options
    }
}

/// Parse markdown into a block tree.
#[must_use]
pub fn parse(markdown: &str, options: &ParseOptions) -> Vec<Block> {
    let parser = Parser::new_ext(markdown, options.parser_options());

    let mut definitions: Vec<(String, String, Option<String>)> = parser
        .reference_definitions()
        .iter()
        .map(|(id, def)| {
            (
                id.to_owned(),
                def.dest.to_string(),
                def.title.as_ref().map(ToString::to_string),
            )
        })
        .collect();
    definitions.sort_by(|a, b| a.0.cmp(&b.0));

    let mut builder = Builder::new(markdown);
    for (event, range) in parser.into_offset_iter() {
        builder.process_event(event, range);
    }
    let mut blocks = builder.finish();

    blocks.extend(
        definitions
            .into_iter()
            .map(|(id, url, title)| Block::IdDefinition { id, url, title }),
    );
    tracing::debug!(blocks = blocks.len(), "Parsed markdown");
    blocks
}

/// Parse and render markdown in one step.
///
/// # Errors
///
/// Returns [`RenderError`] when a block carries a malformed attribute annotation.
pub fn markdown_to_html(
    markdown: &str,
    options: &ParseOptions,
    render_options: RenderOptions,
) -> Result<String, RenderError> {
    let blocks = parse(markdown, options);
    let ctx = RenderContext::from_blocks(&blocks);
    Renderer::new()
        .with_options(render_options)
        .render(&blocks, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmark_renderer::{Alignment, Inline, ListKind, RulerKind};
    use pretty_assertions::assert_eq;

    fn parse_default(markdown: &str) -> Vec<Block> {
        parse(markdown, &ParseOptions::default())
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(
            parse_default("Hello, world!"),
            vec![Block::paragraph(vec![Inline::text("Hello, world!")])]
        );
    }

    #[test]
    fn test_heading_with_attributes() {
        assert_eq!(
            parse_default("## Setup {#setup .step}"),
            vec![Block::Heading {
                level: 2,
                content: vec![Inline::text("Setup")],
                attrs: Some("#setup .step".to_owned()),
            }]
        );
    }

    #[test]
    fn test_heading_attributes_disabled() {
        let options = ParseOptions {
            heading_attributes: false,
            ..ParseOptions::default()
        };
        let blocks = parse("# Title {.x}", &options);
        assert!(matches!(
            &blocks[..],
            [Block::Heading { attrs: None, .. }]
        ));
    }

    #[test]
    fn test_ruler_kinds() {
        let blocks = parse_default("***\n\n___\n\n- - -\n");
        let kinds: Vec<_> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Ruler { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![RulerKind::Asterisk, RulerKind::Underscore, RulerKind::Dash]
        );
    }

    #[test]
    fn test_fenced_code_block() {
        assert_eq!(
            parse_default("```rust {.numbered}\nfn main() {}\n\nlet x = 1;\n```"),
            vec![Block::CodeBlock {
                language: Some("rust".to_owned()),
                lines: vec![
                    "fn main() {}".to_owned(),
                    String::new(),
                    "let x = 1;".to_owned()
                ],
                attrs: Some(".numbered".to_owned()),
            }]
        );
    }

    #[test]
    fn test_tight_list() {
        let blocks = parse_default("- a\n- b\n");
        let [Block::List { kind, items, .. }] = &blocks[..] else {
            panic!("expected a single list, got {blocks:?}");
        };
        assert_eq!(*kind, ListKind::Unordered);
        assert_eq!(items.len(), 2);
        assert!(matches!(
            &items[0],
            Block::ListItem { children, spaced: false, .. } if children.len() == 1
        ));
    }

    #[test]
    fn test_loose_list() {
        let blocks = parse_default("1. a\n\n2. b\n");
        let [Block::List { kind, items, .. }] = &blocks[..] else {
            panic!("expected a single list, got {blocks:?}");
        };
        assert_eq!(*kind, ListKind::Ordered { start: 1 });
        assert!(
            items
                .iter()
                .all(|item| matches!(item, Block::ListItem { spaced: true, .. }))
        );
    }

    #[test]
    fn test_table() {
        let blocks = parse_default("| A | B |\n|:--|:-:|\n| 1 | 2 |\n");
        assert_eq!(
            blocks,
            vec![Block::Table {
                alignments: vec![Alignment::Left, Alignment::Center],
                header: Some(vec![vec![Inline::text("A")], vec![Inline::text("B")]]),
                rows: vec![vec![vec![Inline::text("1")], vec![Inline::text("2")]]],
                attrs: None,
            }]
        );
    }

    #[test]
    fn test_reference_definitions_appended() {
        let blocks = parse_default("[docs][d]\n\n[d]: /docs \"Docs\"\n");
        assert_eq!(blocks.len(), 2);
        assert!(matches!(
            &blocks[0],
            Block::Paragraph { content, .. }
                if matches!(&content[..], [Inline::Reference { id, .. }] if id == "d")
        ));
        assert!(matches!(
            &blocks[1],
            Block::IdDefinition { url, title: Some(title), .. } if url == "/docs" && title == "Docs"
        ));
    }

    #[test]
    fn test_inline_link_is_resolved() {
        let blocks = parse_default("[x](/x)");
        assert_eq!(
            blocks,
            vec![Block::paragraph(vec![Inline::Link {
                dest: "/x".to_owned(),
                title: None,
                content: vec![Inline::text("x")],
            }])]
        );
    }

    #[test]
    fn test_parser_options() {
        let options = ParseOptions::default().parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_HEADING_ATTRIBUTES));

        let options = ParseOptions {
            gfm: false,
            heading_attributes: false,
        }
        .parser_options();
        assert!(options.is_empty());
    }
}
