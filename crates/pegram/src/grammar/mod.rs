//! # Grammar Graphs
//!
//! A [`Grammar`] is an arena of grammar nodes addressed by [`NodeId`].
//! Nodes form a graph, not a tree: the same node may be referenced from
//! several parents, and child slots may point back at an ancestor (or at
//! the node itself) to express recursive rules. The arena is the single
//! ownership point; dropping the `Grammar` releases every node at once,
//! which is the only teardown that works for cyclic graphs.
//!
//! Recursive rules are built in two steps: construct the parent with
//! [`NodeId::PLACEHOLDER`] in the not-yet-known child slot, then patch the
//! slot with [`Grammar::set_child`] once the target exists.
//!
//! Every node carries an opaque tag. Matching copies the tag onto the
//! produced parse-tree node, and [`ParseTree::purge`](crate::ParseTree::purge)
//! later uses the absence of a tag to recognize anonymous scaffolding.
//!
//! Matching itself lives in [`Grammar::parse`]; see the module-level
//! notes there on byte-oriented cursors and the recursion ceiling.

mod matcher;

pub use matcher::{MatchState, Parse, MAX_DEPTH};

use std::fmt;
use std::fmt::Write as _;

use compact_str::CompactString;

/// Index of a grammar node inside its owning [`Grammar`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for a child slot that will be patched later with
    /// [`Grammar::set_child`]. Matching through an unpatched placeholder
    /// is a usage error and panics.
    pub const PLACEHOLDER: NodeId = NodeId(u32::MAX);

    /// Whether this id is the patch-me-later sentinel.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 == u32::MAX
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Matcher signature for [`Grammar::custom`] nodes.
///
/// Receives the input, the cursor, and the match state; returns the
/// number of bytes consumed or `None` for no match. Implementations that
/// consume input should call [`MatchState::update_last`] with the
/// furthest offset they looked at, so syntax-error reporting stays
/// accurate. Private data is whatever the closure captures.
pub type CustomFn = dyn Fn(&str, usize, &mut MatchState) -> Option<usize> + Send + Sync;

pub(crate) enum Expr {
    Dot,
    Literal(CompactString),
    Range { lo: u8, hi: u8 },
    Integer,
    Opt(NodeId),
    OneOrMore(NodeId),
    ZeroOrMore(NodeId),
    Choice(Box<[NodeId]>),
    Seq(Box<[NodeId]>),
    PosLookahead(NodeId),
    NegLookahead(NodeId),
    Custom(Box<CustomFn>),
}

pub(crate) struct Node<T> {
    pub(crate) tag: Option<T>,
    pub(crate) expr: Expr,
}

/// An arena of grammar nodes; see the [module docs](self).
pub struct Grammar<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Grammar<T> {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert(&mut self, tag: Option<T>, expr: Expr) -> NodeId {
        let id = u32::try_from(self.nodes.len()).expect("grammar arena exceeds u32::MAX nodes");
        assert!(
            id != u32::MAX,
            "grammar arena exceeds the maximum node count"
        );
        self.nodes.push(Node { tag, expr });
        NodeId(id)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        assert!(
            !id.is_placeholder(),
            "reached an unpatched placeholder child; patch it with set_child \
             (or finish defining the referenced rules) first"
        );
        &self.nodes[id.index()]
    }

    /// Match any single byte.
    pub fn dot(&mut self, tag: Option<T>) -> NodeId {
        self.insert(tag, Expr::Dot)
    }

    /// Match `text` exactly. The empty literal matches everywhere,
    /// consuming nothing.
    pub fn literal(&mut self, tag: Option<T>, text: &str) -> NodeId {
        self.insert(tag, Expr::Literal(CompactString::from(text)))
    }

    /// Match one byte in the inclusive range `lo..=hi`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`.
    pub fn range(&mut self, tag: Option<T>, lo: u8, hi: u8) -> NodeId {
        assert!(lo <= hi, "range: lo (0x{lo:02x}) must be <= hi (0x{hi:02x})");
        self.insert(tag, Expr::Range { lo, hi })
    }

    /// Match a signed integer literal, base auto-detected from its prefix
    /// the way `strtol` with base 0 does (`0x`/`0X` hexadecimal, leading
    /// `0` octal, decimal otherwise; leading whitespace and sign
    /// included). Overflow is a match failure.
    pub fn integer(&mut self, tag: Option<T>) -> NodeId {
        self.insert(tag, Expr::Integer)
    }

    /// Match `child` if possible; always succeeds.
    pub fn opt(&mut self, tag: Option<T>, child: NodeId) -> NodeId {
        self.insert(tag, Expr::Opt(child))
    }

    /// Match `child` one or more times.
    pub fn one_or_more(&mut self, tag: Option<T>, child: NodeId) -> NodeId {
        self.insert(tag, Expr::OneOrMore(child))
    }

    /// Match `child` zero or more times; always succeeds.
    pub fn zero_or_more(&mut self, tag: Option<T>, child: NodeId) -> NodeId {
        self.insert(tag, Expr::ZeroOrMore(child))
    }

    /// Ordered choice: try `children` left to right, first success wins.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn choice(&mut self, tag: Option<T>, children: &[NodeId]) -> NodeId {
        assert!(!children.is_empty(), "choice: at least one child required");
        self.insert(tag, Expr::Choice(children.into()))
    }

    /// Match `children` left to right at an advancing cursor; fails as a
    /// whole if any child fails.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty.
    pub fn seq(&mut self, tag: Option<T>, children: &[NodeId]) -> NodeId {
        assert!(!children.is_empty(), "seq: at least one child required");
        self.insert(tag, Expr::Seq(children.into()))
    }

    /// Succeed without consuming input iff `child` matches here.
    pub fn pos_lookahead(&mut self, tag: Option<T>, child: NodeId) -> NodeId {
        self.insert(tag, Expr::PosLookahead(child))
    }

    /// Succeed without consuming input iff `child` does not match here.
    pub fn neg_lookahead(&mut self, tag: Option<T>, child: NodeId) -> NodeId {
        self.insert(tag, Expr::NegLookahead(child))
    }

    /// Match with a caller-supplied predicate; see [`CustomFn`].
    pub fn custom<F>(&mut self, tag: Option<T>, matcher: F) -> NodeId
    where
        F: Fn(&str, usize, &mut MatchState) -> Option<usize> + Send + Sync + 'static,
    {
        self.insert(tag, Expr::Custom(Box::new(matcher)))
    }

    /// Overwrite a child slot, typically to close a recursive cycle that
    /// was built with [`NodeId::PLACEHOLDER`].
    ///
    /// Single-child nodes (`opt`, `one_or_more`, `zero_or_more`, both
    /// lookaheads) accept only position 0; `choice` and `seq` accept
    /// `0 <= pos < children`; leaf nodes have no child slots.
    ///
    /// # Panics
    ///
    /// Panics if `parent` has no child slot at `pos`, or is a leaf node.
    pub fn set_child(&mut self, parent: NodeId, child: NodeId, pos: usize) {
        let node = self
            .nodes
            .get_mut(parent.index())
            .expect("set_child: unknown parent node");
        match &mut node.expr {
            Expr::Opt(slot)
            | Expr::OneOrMore(slot)
            | Expr::ZeroOrMore(slot)
            | Expr::PosLookahead(slot)
            | Expr::NegLookahead(slot) => {
                assert!(
                    pos == 0,
                    "set_child: single-child node accepts only position 0, got {pos}"
                );
                *slot = child;
            }
            Expr::Choice(slots) | Expr::Seq(slots) => {
                assert!(
                    pos < slots.len(),
                    "set_child: position {pos} out of range [0..{})",
                    slots.len()
                );
                slots[pos] = child;
            }
            Expr::Dot | Expr::Literal(_) | Expr::Range { .. } | Expr::Integer | Expr::Custom(_) => {
                panic!("set_child: node has no child slots")
            }
        }
    }

    /// The tag of a node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&T> {
        self.node(id).tag.as_ref()
    }

    /// Replace the tag of a node.
    pub fn set_tag(&mut self, id: NodeId, tag: Option<T>) {
        assert!(
            !id.is_placeholder(),
            "set_tag: cannot tag the placeholder sentinel"
        );
        self.nodes[id.index()].tag = tag;
    }

    /// Bounded-depth pretty print of the graph reachable from `root`,
    /// tags via `Debug`. Cyclic references are cut off with `...` once
    /// `max_depth` is exhausted.
    #[must_use]
    pub fn dump(&self, root: NodeId, max_depth: usize) -> String
    where
        T: fmt::Debug,
    {
        self.dump_with(root, max_depth, |tag| format!("{tag:?}"))
    }

    /// [`dump`](Grammar::dump) with a caller-supplied tag formatter.
    #[must_use]
    pub fn dump_with<F>(&self, root: NodeId, max_depth: usize, mut fmt_tag: F) -> String
    where
        F: FnMut(&T) -> String,
    {
        let mut out = String::new();
        self.dump_node(&mut out, root, 0, max_depth, &mut fmt_tag);
        out
    }

    fn dump_node(
        &self,
        out: &mut String,
        id: NodeId,
        indent: usize,
        depth_left: usize,
        fmt_tag: &mut dyn FnMut(&T) -> String,
    ) {
        if id.is_placeholder() {
            let _ = writeln!(out, "{:indent$}(unpatched)", "");
            return;
        }
        if depth_left == 0 {
            let _ = writeln!(out, "{:indent$}...", "");
            return;
        }
        let node = &self.nodes[id.index()];
        let tag = node
            .tag
            .as_ref()
            .map_or_else(|| "-".to_string(), |tag| fmt_tag(tag));
        let (label, children): (String, &[NodeId]) = match &node.expr {
            Expr::Dot => (".".to_string(), &[]),
            Expr::Literal(text) => (format!("literal {:?}", text.as_str()), &[]),
            Expr::Range { lo, hi } => (
                format!("range {:?}..{:?}", char::from(*lo), char::from(*hi)),
                &[],
            ),
            Expr::Integer => ("integer".to_string(), &[]),
            Expr::Custom(_) => ("custom".to_string(), &[]),
            Expr::Opt(child) => ("opt".to_string(), std::slice::from_ref(child)),
            Expr::OneOrMore(child) => ("one-or-more".to_string(), std::slice::from_ref(child)),
            Expr::ZeroOrMore(child) => ("zero-or-more".to_string(), std::slice::from_ref(child)),
            Expr::PosLookahead(child) => ("ahead".to_string(), std::slice::from_ref(child)),
            Expr::NegLookahead(child) => ("not-ahead".to_string(), std::slice::from_ref(child)),
            Expr::Choice(slots) => ("choice".to_string(), slots),
            Expr::Seq(slots) => ("seq".to_string(), slots),
        };
        let _ = writeln!(out, "{:indent$}{label}, tag={tag}", "");
        for &child in children {
            self.dump_node(out, child, indent + 2, depth_left - 1, fmt_tag);
        }
    }
}

impl<T> Default for Grammar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Grammar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
