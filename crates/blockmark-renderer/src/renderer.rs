//! Block tree to HTML renderer.

use crate::ast::{Block, Inline, ListKind};
use crate::attrs::{self, AttributeError, AttributeMap};
use crate::context::RenderContext;
use crate::escape::push_escaped;
use crate::inline::{HtmlInlines, InlineConverter};
use crate::options::RenderOptions;
use crate::table::{CellTag, render_rows};

/// Error returned when a block cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The block's attribute annotation could not be parsed.
    #[error("Invalid attributes on {block}: {source}")]
    Attributes {
        /// Kind of block that failed (e.g. "heading").
        block: &'static str,
        #[source]
        source: AttributeError,
    },
}

/// Renders a block tree into HTML.
///
/// Leaf text content is handed to the [`InlineConverter`]; everything
/// structural is produced here. Each block's output ends with a newline and
/// blocks are concatenated in input order.
///
/// # Example
///
/// ```
/// use blockmark_renderer::{Block, Inline, RenderContext, Renderer};
///
/// let blocks = vec![Block::Heading {
///     level: 1,
///     content: vec![Inline::text("Hello")],
///     attrs: Some("#top".to_owned()),
/// }];
/// let html = Renderer::new().render(&blocks, &RenderContext::new()).unwrap();
/// assert_eq!(html, "<h1 id=\"top\">Hello</h1>\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Renderer<C = HtmlInlines> {
    converter: C,
    options: RenderOptions,
}

impl Renderer {
    /// Create a renderer with the default [`HtmlInlines`] converter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: InlineConverter> Renderer<C> {
    /// Create a renderer with a custom inline converter.
    #[must_use]
    pub fn with_converter(converter: C) -> Self {
        Self {
            converter,
            options: RenderOptions::default(),
        }
    }

    /// Set rendering options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `blocks` into a new string.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Attributes`] for the first block whose attribute
    /// annotation is malformed (unless malformed attributes are skipped).
    pub fn render(&self, blocks: &[Block], ctx: &RenderContext) -> Result<String, RenderError> {
        let mut out = String::with_capacity(4096);
        self.render_into(blocks, ctx, &mut out)?;
        tracing::debug!(blocks = blocks.len(), bytes = out.len(), "Rendered document");
        Ok(out)
    }

    /// Render `blocks` and append the HTML to `out`.
    ///
    /// On error `out` is left as it was before the call.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn render_into(
        &self,
        blocks: &[Block],
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let start = out.len();
        for block in blocks {
            if let Err(err) = self.render_block(block, ctx, out) {
                out.truncate(start);
                return Err(err);
            }
        }
        Ok(())
    }

    fn render_block(
        &self,
        block: &Block,
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<(), RenderError> {
        tracing::trace!(kind = block.kind_name(), "Rendering block");
        match block {
            Block::Paragraph { content, attrs } => {
                self.leaf(block, "p", attrs.as_deref(), content, ctx, out)?;
            }
            Block::RawHtml { lines } | Block::ForeignHtml { lines } => {
                out.push_str(&lines.join("\n"));
                out.push('\n');
            }
            Block::Ruler { kind, attrs } => {
                let defaults = AttributeMap::single("class", kind.css_class());
                out.push_str(&self.void_tag(block, "hr", attrs.as_deref(), defaults)?);
                out.push('\n');
            }
            Block::Heading {
                level,
                content,
                attrs,
            } => {
                self.leaf(block, &format!("h{level}"), attrs.as_deref(), content, ctx, out)?;
            }
            Block::BlockQuote { children, attrs } => {
                out.push_str(&self.open_tag(block, "blockquote", attrs.as_deref(), AttributeMap::new())?);
                out.push('\n');
                self.render_children(children, ctx, out)?;
                out.push_str("</blockquote>\n");
            }
            Block::Table {
                alignments,
                header,
                rows,
                attrs,
            } => {
                out.push_str(&self.open_tag(block, "table", attrs.as_deref(), AttributeMap::new())?);
                out.push_str("\n<colgroup>\n");
                for alignment in alignments {
                    let defaults = alignment
                        .as_attr()
                        .map_or_else(AttributeMap::new, |align| AttributeMap::single("align", align));
                    out.push_str(&self.void_tag(block, "col", None, defaults)?);
                    out.push('\n');
                }
                out.push_str("</colgroup>\n");
                if let Some(header) = header {
                    out.push_str("<thead>\n");
                    render_rows(
                        &self.converter,
                        ctx,
                        std::slice::from_ref(header),
                        CellTag::Header,
                        out,
                    );
                    out.push_str("</thead>\n");
                }
                render_rows(&self.converter, ctx, rows, CellTag::Data, out);
                out.push_str("</table>\n");
            }
            Block::CodeBlock {
                language,
                lines,
                attrs,
            } => {
                out.push_str(&self.open_tag(block, "pre", attrs.as_deref(), AttributeMap::new())?);
                match language {
                    Some(language) => {
                        out.push_str("<code class=\"");
                        push_escaped(out, language);
                        out.push_str("\">");
                    }
                    None => out.push_str("<code>"),
                }
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    push_escaped(out, line);
                }
                out.push_str("</code></pre>\n");
            }
            Block::List { kind, items, attrs } => {
                let defaults = match kind {
                    ListKind::Ordered { start } if *start != 1 => {
                        AttributeMap::single("start", start.to_string())
                    }
                    _ => AttributeMap::new(),
                };
                let tag = kind.tag();
                out.push_str(&self.open_tag(block, tag, attrs.as_deref(), defaults)?);
                out.push('\n');
                self.render_children(items, ctx, out)?;
                out.push_str("</");
                out.push_str(tag);
                out.push_str(">\n");
            }
            Block::ListItem {
                children,
                spaced,
                attrs,
            } => match tight_paragraph(children, *spaced) {
                Some((content, paragraph_attrs)) => {
                    let defaults = match paragraph_attrs {
                        Some(raw) => attrs::expand(AttributeMap::new(), raw, &self.options)
                            .map_err(|source| attribute_error(&children[0], source))?,
                        None => AttributeMap::new(),
                    };
                    out.push_str(&self.open_tag(block, "li", attrs.as_deref(), defaults)?);
                    self.converter.convert(content, ctx, out);
                    out.push_str("</li>\n");
                }
                None => {
                    out.push_str(&self.open_tag(block, "li", attrs.as_deref(), AttributeMap::new())?);
                    self.render_children(children, ctx, out)?;
                    out.push_str("</li>\n");
                }
            },
            Block::IdDefinition { .. } => {}
        }
        Ok(())
    }

    fn render_children(
        &self,
        children: &[Block],
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<(), RenderError> {
        for child in children {
            self.render_block(child, ctx, out)?;
        }
        Ok(())
    }

    /// `<tag ATTRS>inline</tag>\n`
    fn leaf(
        &self,
        block: &Block,
        tag: &str,
        raw_attrs: Option<&str>,
        content: &[Inline],
        ctx: &RenderContext,
        out: &mut String,
    ) -> Result<(), RenderError> {
        out.push_str(&self.open_tag(block, tag, raw_attrs, AttributeMap::new())?);
        self.converter.convert(content, ctx, out);
        out.push_str("</");
        out.push_str(tag);
        out.push_str(">\n");
        Ok(())
    }

    fn open_tag(
        &self,
        block: &Block,
        tag: &str,
        raw_attrs: Option<&str>,
        defaults: AttributeMap,
    ) -> Result<String, RenderError> {
        attrs::open_tag(tag, raw_attrs, defaults, &self.options)
            .map_err(|source| attribute_error(block, source))
    }

    fn void_tag(
        &self,
        block: &Block,
        tag: &str,
        raw_attrs: Option<&str>,
        defaults: AttributeMap,
    ) -> Result<String, RenderError> {
        attrs::void_tag(tag, raw_attrs, defaults, &self.options)
            .map_err(|source| attribute_error(block, source))
    }
}

fn attribute_error(block: &Block, source: AttributeError) -> RenderError {
    RenderError::Attributes {
        block: block.kind_name(),
        source,
    }
}

/// Content and attributes of the single paragraph of a tight list item.
fn tight_paragraph(children: &[Block], spaced: bool) -> Option<(&[Inline], Option<&str>)> {
    if spaced {
        return None;
    }
    match children {
        [Block::Paragraph { content, attrs }] => Some((content, attrs.as_deref())),
        _ => None,
    }
}

/// Render `blocks` with the default renderer.
///
/// # Errors
///
/// See [`Renderer::render`].
pub fn render(blocks: &[Block], ctx: &RenderContext) -> Result<String, RenderError> {
    Renderer::new().render(blocks, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Alignment, Cell, RulerKind};
    use crate::options::{MalformedPolicy, ValueOrder};
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::text(s)]
    }

    fn html(blocks: &[Block]) -> String {
        render(blocks, &RenderContext::new()).unwrap()
    }

    fn paragraph(s: &str) -> Block {
        Block::paragraph(text(s))
    }

    fn item(children: Vec<Block>, spaced: bool) -> Block {
        Block::ListItem {
            children,
            spaced,
            attrs: None,
        }
    }

    fn ruler(kind: RulerKind, attrs: Option<&str>) -> Block {
        Block::Ruler {
            kind,
            attrs: attrs.map(str::to_owned),
        }
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(html(&[]), "");
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(html(&[paragraph("Hello, world!")]), "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_paragraph_with_attributes() {
        let block = Block::Paragraph {
            content: text("a > b"),
            attrs: Some(".note #first".to_owned()),
        };
        assert_eq!(
            html(&[block]),
            "<p class=\"note\" id=\"first\">a &gt; b</p>\n"
        );
    }

    #[test]
    fn test_blocks_concatenate_in_order() {
        let blocks = vec![paragraph("one"), paragraph("two"), paragraph("three")];
        assert_eq!(html(&blocks), "<p>one</p>\n<p>two</p>\n<p>three</p>\n");
    }

    #[test]
    fn test_raw_and_foreign_html_verbatim() {
        let blocks = vec![
            Block::RawHtml {
                lines: vec!["<div>".to_owned(), "<b>raw & bold</b>".to_owned(), "</div>".to_owned()],
            },
            Block::ForeignHtml {
                lines: vec!["<custom-el x=\"1\"></custom-el>".to_owned()],
            },
        ];
        assert_eq!(
            html(&blocks),
            "<div>\n<b>raw & bold</b>\n</div>\n<custom-el x=\"1\"></custom-el>\n"
        );
    }

    #[test]
    fn test_ruler_default_classes() {
        assert_eq!(html(&[ruler(RulerKind::Dash, None)]), "<hr class=\"thin\" />\n");
        assert_eq!(html(&[ruler(RulerKind::Underscore, None)]), "<hr class=\"medium\" />\n");
        assert_eq!(html(&[ruler(RulerKind::Asterisk, None)]), "<hr class=\"thick\" />\n");
    }

    #[test]
    fn test_ruler_custom_class_keeps_default() {
        let out = html(&[ruler(RulerKind::Asterisk, Some(".custom"))]);
        assert_eq!(out, "<hr class=\"custom thick\" />\n");
    }

    #[test]
    fn test_ruler_custom_class_append_order() {
        let renderer =
            Renderer::new().with_options(RenderOptions::default().with_value_order(ValueOrder::Append));
        let out = renderer
            .render(&[ruler(RulerKind::Dash, Some(".thick"))], &RenderContext::new())
            .unwrap();
        assert_eq!(out, "<hr class=\"thin thick\" />\n");
    }

    #[test]
    fn test_heading_levels() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                content: text("Title"),
                attrs: None,
            },
            Block::Heading {
                level: 3,
                content: vec![Inline::text("Install "), Inline::Code("npm".to_owned())],
                attrs: Some("#install".to_owned()),
            },
        ];
        assert_eq!(
            html(&blocks),
            "<h1>Title</h1>\n<h3 id=\"install\">Install <code>npm</code></h3>\n"
        );
    }

    #[test]
    fn test_blockquote_recurses() {
        let block = Block::BlockQuote {
            children: vec![
                paragraph("quoted"),
                Block::BlockQuote {
                    children: vec![paragraph("deeper")],
                    attrs: None,
                },
            ],
            attrs: Some(".aside".to_owned()),
        };
        assert_eq!(
            html(&[block]),
            "<blockquote class=\"aside\">\n<p>quoted</p>\n<blockquote>\n<p>deeper</p>\n</blockquote>\n</blockquote>\n"
        );
    }

    fn cells(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| text(v)).collect()
    }

    #[test]
    fn test_table_with_header() {
        let block = Block::Table {
            alignments: vec![Alignment::Left, Alignment::Center],
            header: Some(cells(&["Name", "Age"])),
            rows: vec![cells(&["Ann", "42"])],
            attrs: None,
        };
        assert_eq!(
            html(&[block]),
            "<table>\n\
             <colgroup>\n\
             <col align=\"left\" />\n\
             <col align=\"center\" />\n\
             </colgroup>\n\
             <thead>\n\
             <tr><th>Name</th><th>Age</th></tr>\n\
             </thead>\n\
             <tr><td>Ann</td><td>42</td></tr>\n\
             </table>\n"
        );
    }

    #[test]
    fn test_table_without_header() {
        let block = Block::Table {
            alignments: vec![Alignment::None, Alignment::Right],
            header: None,
            rows: vec![cells(&["a", "b"]), cells(&["c", "d"])],
            attrs: Some(".data".to_owned()),
        };
        let out = html(&[block]);
        assert!(!out.contains("<thead>"));
        assert!(!out.contains("<th>"));
        assert!(out.starts_with("<table class=\"data\">\n<colgroup>\n<col />\n<col align=\"right\" />\n"));
        assert!(out.ends_with("<tr><td>a</td><td>b</td></tr>\n<tr><td>c</td><td>d</td></tr>\n</table>\n"));
    }

    #[test]
    fn test_code_block_escapes_lines() {
        let block = Block::CodeBlock {
            language: None,
            lines: vec!["<script>alert(\"x\")</script>".to_owned(), "a && b".to_owned()],
            attrs: None,
        };
        assert_eq!(
            html(&[block]),
            "<pre><code>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;\na &amp;&amp; b</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_language_and_attributes() {
        let block = Block::CodeBlock {
            language: Some("rust".to_owned()),
            lines: vec!["fn main() {}".to_owned()],
            attrs: Some(".numbered".to_owned()),
        };
        assert_eq!(
            html(&[block]),
            "<pre class=\"numbered\"><code class=\"rust\">fn main() {}</code></pre>\n"
        );
    }

    #[test]
    fn test_tight_list_item_strips_paragraph() {
        let block = item(vec![paragraph("Hello")], false);
        assert_eq!(html(&[block]), "<li>Hello</li>\n");
    }

    #[test]
    fn test_spaced_list_item_keeps_paragraph() {
        let block = item(vec![paragraph("Hello")], true);
        assert_eq!(html(&[block]), "<li><p>Hello</p>\n</li>\n");
    }

    #[test]
    fn test_multi_block_list_item_keeps_paragraphs() {
        let block = item(vec![paragraph("one"), paragraph("two")], false);
        assert_eq!(html(&[block]), "<li><p>one</p>\n<p>two</p>\n</li>\n");
    }

    #[test]
    fn test_tight_item_moves_paragraph_attributes_to_li() {
        let block = Block::ListItem {
            children: vec![Block::Paragraph {
                content: text("Hello"),
                attrs: Some(".para".to_owned()),
            }],
            spaced: false,
            attrs: Some("#item".to_owned()),
        };
        assert_eq!(html(&[block]), "<li class=\"para\" id=\"item\">Hello</li>\n");
    }

    #[test]
    fn test_unordered_list() {
        let block = Block::List {
            kind: ListKind::Unordered,
            items: vec![item(vec![paragraph("a")], false), item(vec![paragraph("b")], false)],
            attrs: None,
        };
        assert_eq!(html(&[block]), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_ordered_list_start() {
        let block = Block::List {
            kind: ListKind::Ordered { start: 3 },
            items: vec![item(vec![paragraph("c")], false)],
            attrs: None,
        };
        assert_eq!(html(&[block]), "<ol start=\"3\">\n<li>c</li>\n</ol>\n");

        let block = Block::List {
            kind: ListKind::Ordered { start: 1 },
            items: vec![item(vec![paragraph("a")], false)],
            attrs: Some(".steps".to_owned()),
        };
        assert_eq!(html(&[block]), "<ol class=\"steps\">\n<li>a</li>\n</ol>\n");
    }

    #[test]
    fn test_nested_list() {
        let inner = Block::List {
            kind: ListKind::Unordered,
            items: vec![item(vec![paragraph("inner")], false)],
            attrs: None,
        };
        let block = Block::List {
            kind: ListKind::Unordered,
            items: vec![item(vec![paragraph("outer"), inner], false)],
            attrs: None,
        };
        assert_eq!(
            html(&[block]),
            "<ul>\n<li><p>outer</p>\n<ul>\n<li>inner</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_id_definition_emits_nothing() {
        let blocks = vec![
            paragraph("before"),
            Block::IdDefinition {
                id: "x".to_owned(),
                url: "/x".to_owned(),
                title: None,
            },
            paragraph("after"),
        ];
        assert_eq!(html(&blocks), "<p>before</p>\n<p>after</p>\n");
    }

    #[test]
    fn test_reference_resolved_from_definitions() {
        let blocks = vec![
            Block::paragraph(vec![Inline::Reference {
                id: "home".to_owned(),
                content: text("home"),
            }]),
            Block::IdDefinition {
                id: "home".to_owned(),
                url: "/".to_owned(),
                title: Some("Home".to_owned()),
            },
        ];
        let ctx = RenderContext::from_blocks(&blocks);
        let out = render(&blocks, &ctx).unwrap();
        assert_eq!(out, "<p><a href=\"/\" title=\"Home\">home</a></p>\n");
    }

    #[test]
    fn test_malformed_attributes_fail_render() {
        let block = Block::Heading {
            level: 2,
            content: text("x"),
            attrs: Some("=oops".to_owned()),
        };
        let err = render(&[block], &RenderContext::new()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Attributes {
                block: "heading",
                ..
            }
        ));
        assert!(err.to_string().contains("heading"));
    }

    #[test]
    fn test_malformed_attributes_in_nested_block_fail_outer_render() {
        let block = Block::BlockQuote {
            children: vec![Block::Paragraph {
                content: text("x"),
                attrs: Some("'bad".to_owned()),
            }],
            attrs: None,
        };
        let err = render(&[block], &RenderContext::new()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Attributes {
                block: "paragraph",
                ..
            }
        ));
    }

    #[test]
    fn test_render_into_error_leaves_buffer_unchanged() {
        let blocks = vec![
            paragraph("ok"),
            Block::BlockQuote {
                children: vec![Block::Paragraph {
                    content: text("bad"),
                    attrs: Some("=bad".to_owned()),
                }],
                attrs: None,
            },
        ];
        let mut out = String::from("<!-- head -->\n");

        let err = Renderer::new()
            .render_into(&blocks, &RenderContext::new(), &mut out)
            .unwrap_err();

        assert!(matches!(err, RenderError::Attributes { block: "paragraph", .. }));
        assert_eq!(out, "<!-- head -->\n");
    }

    #[test]
    fn test_malformed_attributes_skipped() {
        let renderer = Renderer::new()
            .with_options(RenderOptions::default().with_malformed_policy(MalformedPolicy::Skip));
        let block = Block::Paragraph {
            content: text("x"),
            attrs: Some("=oops .kept".to_owned()),
        };
        let out = renderer.render(&[block], &RenderContext::new()).unwrap();
        assert_eq!(out, "<p class=\"kept\">x</p>\n");
    }

    struct UpperCase;

    impl InlineConverter for UpperCase {
        fn convert(&self, content: &[Inline], _ctx: &RenderContext, out: &mut String) {
            for inline in content {
                if let Inline::Text(s) = inline {
                    out.push_str(&s.to_uppercase());
                }
            }
        }
    }

    #[test]
    fn test_custom_converter() {
        let renderer = Renderer::with_converter(UpperCase);
        let out = renderer
            .render(&[paragraph("shout")], &RenderContext::new())
            .unwrap();
        assert_eq!(out, "<p>SHOUT</p>\n");
    }

    #[test]
    fn test_render_into_appends() {
        let mut out = String::from("<!-- head -->\n");
        Renderer::new()
            .render_into(&[paragraph("x")], &RenderContext::new(), &mut out)
            .unwrap();
        assert_eq!(out, "<!-- head -->\n<p>x</p>\n");
    }
}
