//! Read-only state shared by every render call of one document.

use std::collections::HashMap;

use crate::ast::Block;

/// Target of a link reference definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkReference {
    pub url: String,
    pub title: Option<String>,
}

/// Context threaded through rendering and handed to the inline converter.
///
/// Holds the link reference table used to resolve
/// [`Inline::Reference`](crate::Inline::Reference) spans. Reference ids are
/// matched case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    references: HashMap<String, LinkReference>,
}

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from all [`Block::IdDefinition`]s in the tree, nested ones included.
    ///
    /// When an id is defined twice the first definition wins.
    #[must_use]
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let mut ctx = Self::new();
        ctx.collect(blocks);
        ctx
    }

    /// Add a reference definition, keeping any earlier one with the same id.
    #[must_use]
    pub fn with_reference(
        mut self,
        id: &str,
        url: impl Into<String>,
        title: Option<String>,
    ) -> Self {
        self.define(id, url.into(), title);
        self
    }

    /// Look up a reference by id.
    #[must_use]
    pub fn reference(&self, id: &str) -> Option<&LinkReference> {
        self.references.get(&normalize_id(id))
    }

    /// Number of known references.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    fn collect(&mut self, blocks: &[Block]) {
        for block in blocks {
            match block {
                Block::IdDefinition { id, url, title } => {
                    self.define(id, url.clone(), title.clone());
                }
                Block::BlockQuote { children, .. } | Block::ListItem { children, .. } => {
                    self.collect(children);
                }
                Block::List { items, .. } => self.collect(items),
                _ => {}
            }
        }
    }

    fn define(&mut self, id: &str, url: String, title: Option<String>) {
        self.references
            .entry(normalize_id(id))
            .or_insert(LinkReference { url, title });
    }
}

/// Case-fold and collapse internal whitespace.
fn normalize_id(id: &str) -> String {
    id.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: &str, url: &str) -> Block {
        Block::IdDefinition {
            id: id.to_owned(),
            url: url.to_owned(),
            title: None,
        }
    }

    #[test]
    fn test_empty_context() {
        let ctx = RenderContext::new();
        assert_eq!(ctx.reference_count(), 0);
        assert!(ctx.reference("x").is_none());
    }

    #[test]
    fn test_from_blocks_collects_nested_definitions() {
        let blocks = vec![
            definition("top", "/top"),
            Block::BlockQuote {
                children: vec![definition("quoted", "/quoted")],
                attrs: None,
            },
            Block::List {
                kind: crate::ListKind::Unordered,
                items: vec![Block::ListItem {
                    children: vec![definition("item", "/item")],
                    spaced: false,
                    attrs: None,
                }],
                attrs: None,
            },
        ];
        let ctx = RenderContext::from_blocks(&blocks);
        assert_eq!(ctx.reference_count(), 3);
        assert_eq!(ctx.reference("quoted").unwrap().url, "/quoted");
        assert_eq!(ctx.reference("item").unwrap().url, "/item");
    }

    #[test]
    fn test_first_definition_wins() {
        let ctx = RenderContext::from_blocks(&[definition("a", "/first"), definition("A", "/second")]);
        assert_eq!(ctx.reference("a").unwrap().url, "/first");
    }

    #[test]
    fn test_lookup_is_case_and_space_insensitive() {
        let ctx = RenderContext::new().with_reference("Rust  Book", "https://doc.rust-lang.org/book/", None);
        assert!(ctx.reference("rust book").is_some());
        assert!(ctx.reference("RUST BOOK").is_some());
    }
}
