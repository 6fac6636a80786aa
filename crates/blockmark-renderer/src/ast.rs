//! Document tree consumed by the renderer.
//!
//! The tree is produced by an upstream parser (see `blockmark-markdown`) and
//! only ever borrowed by [`Renderer`](crate::Renderer).

/// Inline content of a single table cell.
pub type Cell = Vec<Inline>;

/// A block-level node.
///
/// Every variant except [`Block::RawHtml`], [`Block::ForeignHtml`] and
/// [`Block::IdDefinition`] carries an optional raw attribute annotation: the
/// inner text of a `{...}` suffix such as `.note #intro lang=en`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Paragraph of inline content.
    Paragraph {
        content: Vec<Inline>,
        attrs: Option<String>,
    },
    /// HTML block passed through verbatim.
    RawHtml { lines: Vec<String> },
    /// HTML block with a tag the upstream parser does not know, passed through verbatim.
    ForeignHtml { lines: Vec<String> },
    /// Horizontal rule.
    Ruler {
        kind: RulerKind,
        attrs: Option<String>,
    },
    /// Heading, level 1-6.
    Heading {
        level: u8,
        content: Vec<Inline>,
        attrs: Option<String>,
    },
    /// Block quote containing nested blocks.
    BlockQuote {
        children: Vec<Block>,
        attrs: Option<String>,
    },
    /// Table with column alignments, an optional header row and body rows.
    Table {
        alignments: Vec<Alignment>,
        header: Option<Vec<Cell>>,
        rows: Vec<Vec<Cell>>,
        attrs: Option<String>,
    },
    /// Literal code, one entry per source line.
    CodeBlock {
        language: Option<String>,
        lines: Vec<String>,
        attrs: Option<String>,
    },
    /// Ordered or unordered list. Items are [`Block::ListItem`]s.
    List {
        kind: ListKind,
        items: Vec<Block>,
        attrs: Option<String>,
    },
    /// List item. `spaced` is set for items of loose lists.
    ///
    /// An unspaced item whose only child is a paragraph renders tight: the
    /// paragraph's inline content goes straight into `<li>`, and the
    /// paragraph's attributes land on `<li>` beneath the item's own.
    ListItem {
        children: Vec<Block>,
        spaced: bool,
        attrs: Option<String>,
    },
    /// Link reference definition (`[id]: url "title"`).
    IdDefinition {
        id: String,
        url: String,
        title: Option<String>,
    },
}

impl Block {
    /// Short lowercase name of the variant, used in errors and logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::RawHtml { .. } => "raw html",
            Self::ForeignHtml { .. } => "foreign html",
            Self::Ruler { .. } => "ruler",
            Self::Heading { .. } => "heading",
            Self::BlockQuote { .. } => "blockquote",
            Self::Table { .. } => "table",
            Self::CodeBlock { .. } => "code block",
            Self::List { .. } => "list",
            Self::ListItem { .. } => "list item",
            Self::IdDefinition { .. } => "id definition",
        }
    }

    /// Paragraph without attributes.
    #[must_use]
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Self::Paragraph {
            content,
            attrs: None,
        }
    }
}

/// Marker character a horizontal rule was written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RulerKind {
    /// `---`
    Dash,
    /// `___`
    Underscore,
    /// `***`
    Asterisk,
}

impl RulerKind {
    /// Map a marker character to its kind.
    #[must_use]
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '-' => Some(Self::Dash),
            '_' => Some(Self::Underscore),
            '*' => Some(Self::Asterisk),
            _ => None,
        }
    }

    /// Default CSS class for the rule.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Dash => "thin",
            Self::Underscore => "medium",
            Self::Asterisk => "thick",
        }
    }
}

/// Table column alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Value of the `align` attribute, if any.
    #[must_use]
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

/// List flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Unordered,
    Ordered { start: u64 },
}

impl ListKind {
    /// HTML element name for the list.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered { .. } => "ol",
        }
    }
}

/// Text-level content, resolved by an [`InlineConverter`](crate::InlineConverter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// Plain text, escaped on output.
    Text(String),
    /// Code span.
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    /// Inline link with a resolved destination.
    Link {
        dest: String,
        title: Option<String>,
        content: Vec<Inline>,
    },
    /// Reference-style link, resolved against the [`RenderContext`](crate::RenderContext).
    Reference { id: String, content: Vec<Inline> },
    /// Image. `alt` is flattened to plain text on output.
    Image {
        src: String,
        title: Option<String>,
        alt: Vec<Inline>,
    },
    /// Inline HTML passed through verbatim.
    Html(String),
    /// Line ending inside a paragraph.
    SoftBreak,
    /// Hard line break.
    LineBreak,
}

impl Inline {
    /// Plain text inline.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}
