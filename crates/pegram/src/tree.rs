//! # Parse-Tree Model
//!
//! A successful match produces a tree of [`ParseTree`] nodes. Every node
//! records the byte span it matched (`from`, `len`) and an optional opaque
//! tag copied from the grammar node that produced it. Nodes own their
//! children; dropping the root releases the whole tree.
//!
//! Spans nest: each child starts at or after its parent's `from` and
//! children appear in non-decreasing `from` order. The single exception is
//! a positive-lookahead node, which has `len == 0` but keeps the full
//! child match for inspection.
//!
//! Trees are immutable after construction. The rewrite pass in
//! [`filter`](ParseTree::filter) / [`purge`](ParseTree::purge) always
//! produces an independent copy.

mod filter;

pub use filter::FilterAction;

use std::fmt;
use std::fmt::Write as _;

/// One node of a parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree<T> {
    tag: Option<T>,
    from: usize,
    len: usize,
    children: Box<[ParseTree<T>]>,
}

impl<T> ParseTree<T> {
    /// Create a node with the given children.
    #[must_use]
    pub fn new(
        tag: Option<T>,
        from: usize,
        len: usize,
        children: impl Into<Box<[ParseTree<T>]>>,
    ) -> Self {
        Self {
            tag,
            from,
            len,
            children: children.into(),
        }
    }

    /// Create a childless node.
    #[must_use]
    pub fn leaf(tag: Option<T>, from: usize, len: usize) -> Self {
        Self::new(tag, from, len, Vec::new())
    }

    /// The tag of the grammar node that produced this match, if it had one.
    #[must_use]
    pub const fn tag(&self) -> Option<&T> {
        self.tag.as_ref()
    }

    /// Byte offset where the match starts.
    #[must_use]
    pub const fn from(&self) -> usize {
        self.from
    }

    /// Number of bytes matched.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the match consumed no input.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset one past the end of the match.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.from + self.len
    }

    /// The sub-matches, in input order.
    #[must_use]
    pub fn children(&self) -> &[ParseTree<T>] {
        &self.children
    }

    /// Whether this node has no sub-matches.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The slice of `text` this node matched.
    ///
    /// `text` must be the string the tree was parsed from; offsets are
    /// byte offsets into it.
    #[must_use]
    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        &text[self.from..self.end()]
    }

    /// Depth-first indented dump, two spaces per level, tags via `Debug`.
    #[must_use]
    pub fn dump(&self) -> String
    where
        T: fmt::Debug,
    {
        self.dump_with(|tag| format!("{tag:?}"))
    }

    /// Depth-first indented dump with a caller-supplied tag formatter.
    ///
    /// Untagged nodes print `-` in the tag column.
    #[must_use]
    pub fn dump_with<F>(&self, mut fmt_tag: F) -> String
    where
        F: FnMut(&T) -> String,
    {
        let mut out = String::new();
        self.dump_into(&mut out, 0, &mut fmt_tag);
        out
    }

    fn dump_into(&self, out: &mut String, indent: usize, fmt_tag: &mut dyn FnMut(&T) -> String) {
        let tag = self
            .tag
            .as_ref()
            .map_or_else(|| "-".to_string(), |tag| fmt_tag(tag));
        let _ = writeln!(
            out,
            "{:indent$}from={}, len={}, tag={}",
            "",
            self.from,
            self.len,
            tag,
        );
        for child in &*self.children {
            child.dump_into(out, indent + 2, fmt_tag);
        }
    }
}
