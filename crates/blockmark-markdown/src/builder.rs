//! Folds pulldown-cmark events into a block tree.

use std::ops::Range;

use blockmark_renderer::{Alignment, Block, Cell, Inline, ListKind, RulerKind};
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Tag, TagEnd};

use crate::util::{
    convert_alignment, heading_attrs_source, heading_level_to_num, is_known_html, parse_fence_info,
};

/// Open element while walking the event stream.
enum Frame {
    Root(Vec<Block>),
    BlockQuote(Vec<Block>),
    List {
        kind: ListKind,
        items: Vec<Block>,
    },
    Item {
        children: Vec<Block>,
        /// Inline content outside an explicit paragraph (tight lists).
        pending: Vec<Inline>,
        spaced: bool,
    },
    Leaf {
        kind: LeafKind,
        content: Vec<Inline>,
    },
    Span {
        kind: SpanKind,
        content: Vec<Inline>,
    },
    Code {
        language: Option<String>,
        attrs: Option<String>,
        text: String,
    },
    Html(String),
    Table {
        alignments: Vec<Alignment>,
        header: Option<Vec<Cell>>,
        rows: Vec<Vec<Cell>>,
        row: Vec<Cell>,
    },
}

enum LeafKind {
    Paragraph,
    Heading { level: u8, attrs: Option<String> },
    Cell,
}

enum SpanKind {
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        dest: String,
        title: Option<String>,
        reference: Option<String>,
    },
    Image {
        src: String,
        title: Option<String>,
    },
    /// Passed through as a pair of inline HTML tags.
    Tag(&'static str),
}

pub(crate) struct Builder<'a> {
    source: &'a str,
    stack: Vec<Frame>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            stack: vec![Frame::Root(Vec::new())],
        }
    }

    /// Close any frames left open and return the top-level blocks.
    pub(crate) fn finish(mut self) -> Vec<Block> {
        while self.stack.len() > 1 {
            tracing::debug!("Closing unterminated element");
            self.close_top();
        }
        match self.stack.pop() {
            Some(Frame::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }

    pub(crate) fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start_tag(tag, range),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) => {
                if let Some(Frame::Html(buffer)) = self.stack.last_mut() {
                    buffer.push_str(&html);
                } else {
                    self.push_inline(Inline::Html(html.into_string()));
                }
            }
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.into_string())),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::LineBreak),
            Event::Rule => {
                let kind = self.source[range]
                    .chars()
                    .find_map(RulerKind::from_marker)
                    .unwrap_or(RulerKind::Dash);
                self.push_block(Block::Ruler { kind, attrs: None });
            }
            Event::TaskListMarker(checked) => {
                let html = if checked {
                    r#"<input type="checkbox" checked disabled /> "#
                } else {
                    r#"<input type="checkbox" disabled /> "#
                };
                self.push_inline(Inline::Html(html.to_owned()));
            }
            Event::FootnoteReference(label) => {
                self.push_inline(Inline::Text(format!("[^{label}]")));
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push_inline(Inline::Code(math.into_string()));
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) {
        match tag {
            Tag::Paragraph => {
                self.flush_pending();
                if let Some(Frame::Item { spaced, .. }) = self.stack.last_mut() {
                    *spaced = true;
                }
                self.push_leaf(LeafKind::Paragraph);
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                self.flush_pending();
                // pulldown-cmark splits attributes on whitespace, so read them from the source.
                let has_attrs = id.is_some() || !classes.is_empty() || !attrs.is_empty();
                let attrs = if has_attrs {
                    heading_attrs_source(&self.source[range])
                } else {
                    None
                };
                self.push_leaf(LeafKind::Heading {
                    level: heading_level_to_num(level),
                    attrs,
                });
            }
            Tag::BlockQuote(_) => {
                self.flush_pending();
                self.stack.push(Frame::BlockQuote(Vec::new()));
            }
            Tag::CodeBlock(kind) => {
                self.flush_pending();
                let (language, attrs) = match kind {
                    CodeBlockKind::Fenced(info) => parse_fence_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                self.stack.push(Frame::Code {
                    language,
                    attrs,
                    text: String::new(),
                });
            }
            Tag::HtmlBlock => {
                self.flush_pending();
                self.stack.push(Frame::Html(String::new()));
            }
            Tag::List(start) => {
                self.flush_pending();
                let kind = match start {
                    Some(start) => ListKind::Ordered { start },
                    None => ListKind::Unordered,
                };
                self.stack.push(Frame::List {
                    kind,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.stack.push(Frame::Item {
                children: Vec::new(),
                pending: Vec::new(),
                spaced: false,
            }),
            Tag::Table(alignments) => {
                self.flush_pending();
                self.stack.push(Frame::Table {
                    alignments: alignments.into_iter().map(convert_alignment).collect(),
                    header: None,
                    rows: Vec::new(),
                    row: Vec::new(),
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(Frame::Table { row, .. }) = self.stack.last_mut() {
                    row.clear();
                }
            }
            Tag::TableCell => self.push_leaf(LeafKind::Cell),
            Tag::Emphasis => self.push_span(SpanKind::Emphasis),
            Tag::Strong => self.push_span(SpanKind::Strong),
            Tag::Strikethrough => self.push_span(SpanKind::Strikethrough),
            Tag::Superscript => self.push_span(SpanKind::Tag("sup")),
            Tag::Subscript => self.push_span(SpanKind::Tag("sub")),
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => {
                let by_reference = matches!(
                    link_type,
                    LinkType::Reference | LinkType::Collapsed | LinkType::Shortcut
                ) && !id.is_empty();
                self.push_span(SpanKind::Link {
                    dest: dest_url.into_string(),
                    title: non_empty(&title),
                    reference: by_reference.then(|| id.into_string()),
                });
            }
            Tag::Image {
                dest_url, title, ..
            } => self.push_span(SpanKind::Image {
                src: dest_url.into_string(),
                title: non_empty(&title),
            }),
            Tag::FootnoteDefinition(_)
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {
                tracing::debug!(?tag, "Unsupported markdown element");
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::Table
            | TagEnd::TableCell
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link
            | TagEnd::Image => self.close_top(),
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(Frame::Table { header, rows, row, .. }) = self.stack.last_mut() {
                    let cells = std::mem::take(row);
                    if matches!(tag, TagEnd::TableHead) {
                        *header = Some(cells);
                    } else {
                        rows.push(cells);
                    }
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    /// Pop the innermost frame and attach its result to the parent.
    fn close_top(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Root(_) => {}
            Frame::BlockQuote(children) => self.push_block(Block::BlockQuote {
                children,
                attrs: None,
            }),
            Frame::List { kind, items } => self.push_block(Block::List {
                kind,
                items,
                attrs: None,
            }),
            Frame::Item {
                mut children,
                pending,
                spaced,
            } => {
                if !pending.is_empty() {
                    children.push(Block::paragraph(pending));
                }
                self.push_block(Block::ListItem {
                    children,
                    spaced,
                    attrs: None,
                });
            }
            Frame::Leaf { kind, mut content } => match kind {
                LeafKind::Paragraph => self.push_block(Block::paragraph(content)),
                LeafKind::Heading { level, attrs } => {
                    trim_trailing_space(&mut content);
                    self.push_block(Block::Heading {
                        level,
                        content,
                        attrs,
                    });
                }
                LeafKind::Cell => {
                    if let Some(Frame::Table { row, .. }) = self.stack.last_mut() {
                        row.push(content);
                    }
                }
            },
            Frame::Span { kind, content } => {
                let inline = match kind {
                    SpanKind::Emphasis => Inline::Emphasis(content),
                    SpanKind::Strong => Inline::Strong(content),
                    SpanKind::Strikethrough => Inline::Strikethrough(content),
                    SpanKind::Link {
                        dest,
                        title,
                        reference,
                    } => match reference {
                        Some(id) => Inline::Reference { id, content },
                        None => Inline::Link {
                            dest,
                            title,
                            content,
                        },
                    },
                    SpanKind::Image { src, title } => Inline::Image {
                        src,
                        title,
                        alt: content,
                    },
                    SpanKind::Tag(tag) => {
                        self.push_inline(Inline::Html(format!("<{tag}>")));
                        for inline in content {
                            self.push_inline(inline);
                        }
                        Inline::Html(format!("</{tag}>"))
                    }
                };
                self.push_inline(inline);
            }
            Frame::Code {
                language,
                attrs,
                text,
            } => self.push_block(Block::CodeBlock {
                language,
                lines: text.lines().map(str::to_owned).collect(),
                attrs,
            }),
            Frame::Html(text) => {
                let lines = text.lines().map(str::to_owned).collect();
                let block = if is_known_html(&text) {
                    Block::RawHtml { lines }
                } else {
                    Block::ForeignHtml { lines }
                };
                self.push_block(block);
            }
            Frame::Table {
                alignments,
                header,
                rows,
                ..
            } => self.push_block(Block::Table {
                alignments,
                header,
                rows,
                attrs: None,
            }),
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Code { text: buffer, .. } | Frame::Html(buffer)) => buffer.push_str(text),
            _ => self.push_inline(Inline::text(text)),
        }
    }

    fn push_leaf(&mut self, kind: LeafKind) {
        self.stack.push(Frame::Leaf {
            kind,
            content: Vec::new(),
        });
    }

    fn push_span(&mut self, kind: SpanKind) {
        self.stack.push(Frame::Span {
            kind,
            content: Vec::new(),
        });
    }

    /// Append inline content to the innermost inline container.
    fn push_inline(&mut self, inline: Inline) {
        let content = match self.stack.last_mut() {
            Some(Frame::Leaf { content, .. } | Frame::Span { content, .. }) => content,
            Some(Frame::Item { pending, .. }) => pending,
            _ => {
                self.push_block(Block::paragraph(vec![inline]));
                return;
            }
        };
        match (content.last_mut(), inline) {
            (Some(Inline::Text(last)), Inline::Text(next)) => last.push_str(&next),
            (_, inline) => content.push(inline),
        }
    }

    /// Attach a finished block to the innermost block container.
    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Root(children) | Frame::BlockQuote(children)) => children.push(block),
            Some(Frame::Item {
                children, pending, ..
            }) => {
                if !pending.is_empty() {
                    children.push(Block::paragraph(std::mem::take(pending)));
                }
                children.push(block);
            }
            Some(Frame::List { items, .. }) => items.push(block),
            _ => tracing::debug!(kind = block.kind_name(), "Dropping block outside a container"),
        }
    }

    /// Turn inline content collected directly in a list item into a paragraph.
    fn flush_pending(&mut self) {
        if let Some(Frame::Item {
            children, pending, ..
        }) = self.stack.last_mut()
            && !pending.is_empty()
        {
            children.push(Block::paragraph(std::mem::take(pending)));
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

fn trim_trailing_space(content: &mut Vec<Inline>) {
    if let Some(Inline::Text(last)) = content.last_mut() {
        let trimmed = last.trim_end().len();
        last.truncate(trimmed);
        if last.is_empty() {
            content.pop();
        }
    }
}
