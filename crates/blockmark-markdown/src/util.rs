//! Helpers for translating pulldown-cmark data into block tree values.

use blockmark_renderer::Alignment;
use pulldown_cmark::HeadingLevel;

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

pub(crate) fn convert_alignment(alignment: pulldown_cmark::Alignment) -> Alignment {
    match alignment {
        pulldown_cmark::Alignment::None => Alignment::None,
        pulldown_cmark::Alignment::Left => Alignment::Left,
        pulldown_cmark::Alignment::Center => Alignment::Center,
        pulldown_cmark::Alignment::Right => Alignment::Right,
    }
}

/// Split a fence info string into language and attribute annotation.
///
/// `rust {.numbered #main}` gives `(Some("rust"), Some(".numbered #main"))`.
pub(crate) fn parse_fence_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    let (head, attrs) = match info.find('{') {
        Some(open) => {
            let inner = info[open + 1..].trim_end();
            let inner = inner.strip_suffix('}').unwrap_or(inner).trim();
            let attrs = (!inner.is_empty()).then(|| inner.to_owned());
            (&info[..open], attrs)
        }
        None => (info, None),
    };
    let language = head.split_whitespace().next().map(str::to_owned);
    (language, attrs)
}

/// Raw attribute annotation at the end of a heading's source text.
///
/// `## Setup {#setup title="Getting started"}` gives
/// `#setup title="Getting started"`. Setext underlines and an ATX closing
/// sequence are skipped.
pub(crate) fn heading_attrs_source(source: &str) -> Option<String> {
    let line = source
        .lines()
        .map(str::trim_end)
        .rev()
        .find(|line| !is_setext_underline(line))?;
    let line = strip_closing_sequence(line);
    let inner = line.strip_suffix('}')?;
    let open = inner.rfind('{')?;
    let inner = inner[open + 1..].trim();
    (!inner.is_empty()).then(|| inner.to_owned())
}

fn is_setext_underline(line: &str) -> bool {
    line.trim_start_matches(['>', ' ', '\t'])
        .chars()
        .all(|c| c == '=' || c == '-')
}

fn strip_closing_sequence(line: &str) -> &str {
    let trimmed = line.trim_end_matches('#');
    if trimmed.len() < line.len() && trimmed.ends_with([' ', '\t']) {
        trimmed.trim_end()
    } else {
        line
    }
}

/// Block-level tags from the CommonMark HTML block rules.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "pre", "script",
    "search", "section", "style", "summary", "table", "tbody", "td", "textarea", "tfoot", "th",
    "thead", "title", "tr", "track", "ul",
];

/// Whether an HTML block starts with a comment, declaration or known block tag.
pub(crate) fn is_known_html(html: &str) -> bool {
    let Some(rest) = html.trim_start().strip_prefix('<') else {
        return false;
    };
    if rest.starts_with(['!', '?']) {
        return true;
    }
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let name: String = rest
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    BLOCK_TAGS.contains(&name.as_str())
}
