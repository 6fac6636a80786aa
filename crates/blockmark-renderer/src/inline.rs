//! Inline content conversion.

use crate::ast::Inline;
use crate::context::RenderContext;
use crate::escape::push_escaped;

/// Converts inline spans to HTML.
///
/// The block renderer calls this for every piece of leaf text content
/// (paragraphs, headings, table cells). Implementations must return
/// HTML-safe markup.
pub trait InlineConverter {
    /// Append the HTML for `content` to `out`.
    fn convert(&self, content: &[Inline], ctx: &RenderContext, out: &mut String);

    /// Convert `content` into a new string.
    fn convert_to_string(&self, content: &[Inline], ctx: &RenderContext) -> String {
        let mut out = String::new();
        self.convert(content, ctx, &mut out);
        out
    }
}

/// Default converter producing HTML5 inline markup.
///
/// - `<em>`, `<strong>`, `<s>` for emphasis, strong and strikethrough
/// - `<code>` for code spans
/// - `<a>` for links; unresolved references render as `[text]`
/// - `<img>` with a plain-text `alt`
/// - `<br />` for hard breaks
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlInlines;

impl InlineConverter for HtmlInlines {
    fn convert(&self, content: &[Inline], ctx: &RenderContext, out: &mut String) {
        for inline in content {
            convert_one(inline, ctx, out);
        }
    }
}

fn convert_one(inline: &Inline, ctx: &RenderContext, out: &mut String) {
    match inline {
        Inline::Text(text) => push_escaped(out, text),
        Inline::Code(code) => {
            out.push_str("<code>");
            push_escaped(out, code);
            out.push_str("</code>");
        }
        Inline::Emphasis(children) => wrap("em", children, ctx, out),
        Inline::Strong(children) => wrap("strong", children, ctx, out),
        Inline::Strikethrough(children) => wrap("s", children, ctx, out),
        Inline::Link {
            dest,
            title,
            content,
        } => link(dest, title.as_deref(), content, ctx, out),
        Inline::Reference { id, content } => match ctx.reference(id) {
            Some(target) => link(&target.url, target.title.as_deref(), content, ctx, out),
            None => {
                tracing::debug!(id, "Unresolved link reference");
                out.push('[');
                HtmlInlines.convert(content, ctx, out);
                out.push(']');
            }
        },
        Inline::Image { src, title, alt } => {
            out.push_str("<img src=\"");
            push_escaped(out, src);
            out.push_str("\" alt=\"");
            push_escaped(out, &plain_text(alt));
            out.push('"');
            if let Some(title) = title {
                out.push_str(" title=\"");
                push_escaped(out, title);
                out.push('"');
            }
            out.push_str(" />");
        }
        Inline::Html(html) => out.push_str(html),
        Inline::SoftBreak => out.push('\n'),
        Inline::LineBreak => out.push_str("<br />\n"),
    }
}

fn wrap(tag: &str, children: &[Inline], ctx: &RenderContext, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    HtmlInlines.convert(children, ctx, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn link(dest: &str, title: Option<&str>, content: &[Inline], ctx: &RenderContext, out: &mut String) {
    out.push_str("<a href=\"");
    push_escaped(out, dest);
    out.push('"');
    if let Some(title) = title {
        out.push_str(" title=\"");
        push_escaped(out, title);
        out.push('"');
    }
    out.push('>');
    HtmlInlines.convert(content, ctx, out);
    out.push_str("</a>");
}

/// Flatten inline content to its text, as used for image `alt` attributes.
#[must_use]
pub fn plain_text(content: &[Inline]) -> String {
    let mut text = String::new();
    push_plain_text(content, &mut text);
    text
}

fn push_plain_text(content: &[Inline], text: &mut String) {
    for inline in content {
        match inline {
            Inline::Text(s) | Inline::Code(s) => text.push_str(s),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Link {
                content: children, ..
            }
            | Inline::Reference {
                content: children, ..
            }
            | Inline::Image { alt: children, .. } => push_plain_text(children, text),
            Inline::SoftBreak | Inline::LineBreak => text.push(' '),
            Inline::Html(_) => {}
        }
    }
}
