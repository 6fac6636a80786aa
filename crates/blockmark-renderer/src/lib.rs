//! Block tree to HTML renderer.
//!
//! This crate renders a parsed document tree (a sequence of [`Block`]s) into
//! an HTML string. Blocks may carry Pandoc-style attribute annotations
//! (`.class`, `#id`, `key=value`, `key='value'`, `key="value"`) that end up on
//! the block's outer tag.
//!
//! # Architecture
//!
//! - [`Renderer`]: recursive dispatcher mapping each block variant to HTML
//! - [`attrs`]: attribute annotation parser, serializer and injector
//! - [`InlineConverter`]: pluggable conversion of inline spans; [`HtmlInlines`]
//!   is the default
//! - [`RenderContext`]: read-only state (link references) shared by a render pass
//!
//! Producing the tree is up to the caller; `blockmark-markdown` builds one from
//! markdown source.
//!
//! # Example
//!
//! ```
//! use blockmark_renderer::{Block, Inline, RenderContext, RulerKind, render};
//!
//! let blocks = vec![
//!     Block::paragraph(vec![Inline::text("Hello")]),
//!     Block::Ruler { kind: RulerKind::Asterisk, attrs: None },
//! ];
//! let html = render(&blocks, &RenderContext::from_blocks(&blocks)).unwrap();
//! assert_eq!(html, "<p>Hello</p>\n<hr class=\"thick\" />\n");
//! ```

mod ast;
pub mod attrs;
mod context;
mod escape;
mod inline;
mod options;
mod renderer;
mod table;

pub use ast::{Alignment, Block, Cell, Inline, ListKind, RulerKind};
pub use attrs::{AttributeError, AttributeMap};
pub use context::{LinkReference, RenderContext};
pub use escape::escape_html;
pub use inline::{HtmlInlines, InlineConverter, plain_text};
pub use options::{MalformedPolicy, RenderOptions, ValueOrder};
pub use renderer::{RenderError, Renderer, render};
pub use table::{CellTag, render_rows};
