//! # Textual Grammar Compiler
//!
//! A [`RuleSet`] turns PEG-syntax definition strings into grammar graphs.
//! Each definition is parsed with the shared [bootstrap
//! grammar](bootstrap), the parse tree is purged down to its semantic
//! nodes, and the purged tree is interpreted into arena nodes owned by
//! the session.
//!
//! Rules may reference each other in any order: an identifier that names
//! a not-yet-defined rule compiles to a placeholder child slot, and the
//! slot is patched in place the moment the rule is registered. Forward
//! references, mutual recursion, and self recursion across `add` calls
//! all resolve automatically once every referenced name exists; query
//! [`RuleSet::is_complete`] before matching.
//!
//! All nodes built by a session live in its arena and are released
//! together when the session is dropped.

mod bootstrap;

use compact_str::CompactString;
use hashbrown::HashMap;

use crate::error::CompileError;
use crate::grammar::{Grammar, NodeId, Parse};
use crate::tree::ParseTree;

use bootstrap::{PegTag, BOOTSTRAP};

type Map<K, V> = HashMap<K, V, ahash::RandomState>;

/// A child slot waiting for a rule to be defined.
struct PatchSite {
    parent: NodeId,
    slot: usize,
}

/// Result of interpreting one purged parse-tree node.
enum Compiled {
    /// An arena node, ready to be referenced.
    Node(NodeId),
    /// A reference to a rule that is not defined yet; the caller records
    /// the slot it ends up in.
    Deferred(CompactString),
    /// No semantic content (only possible for untagged wrapper nodes).
    Empty,
}

/// A grammar-compiler session: named rules, their shared arena, and the
/// references still waiting for a definition.
pub struct RuleSet {
    grammar: Grammar<CompactString>,
    defs: Map<CompactString, NodeId>,
    pending: Map<CompactString, Vec<PatchSite>>,
}

impl RuleSet {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grammar: Grammar::new(),
            defs: Map::default(),
            pending: Map::default(),
        }
    }

    /// Compile `definition` and register it under `name`.
    ///
    /// On a syntax error the session is unmodified and the error carries
    /// the furthest offset the bootstrap grammar reached. On success the
    /// produced graph's root is tagged with `name`, and every reference
    /// to `name` recorded by earlier definitions is patched in place.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already defined.
    pub fn add(&mut self, name: &str, definition: &str) -> Result<(), CompileError> {
        let boot = &*BOOTSTRAP;
        let parsed = boot.grammar.parse(boot.root, definition);
        let Some(tree) = parsed.tree else {
            return Err(CompileError::Syntax {
                offset: parsed.last,
            });
        };
        let purged = tree.purge();
        let root = match self.compile_node(definition, &purged) {
            Compiled::Deferred(target) => {
                let id = self
                    .grammar
                    .seq(Some(CompactString::from(name)), &[NodeId::PLACEHOLDER]);
                self.record_pending(target, id, 0);
                id
            }
            Compiled::Node(id) => {
                if self.grammar.tag(id).is_some() {
                    // the definition is a bare reference to an existing
                    // named rule; wrap it instead of renaming it
                    self.grammar.seq(Some(CompactString::from(name)), &[id])
                } else {
                    self.grammar.set_tag(id, Some(CompactString::from(name)));
                    id
                }
            }
            Compiled::Empty => {
                panic!("internal error: purged grammar definition produced no semantic node")
            }
        };
        self.register_node(name, root);
        Ok(())
    }

    /// Register a hand-built node (see [`grammar_mut`](RuleSet::grammar_mut))
    /// under `name`, patching every pending reference to it.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already defined.
    pub fn register(&mut self, name: &str, node: NodeId) {
        self.register_node(name, node);
    }

    /// The node for a defined rule.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.defs.get(name).copied()
    }

    /// Whether every referenced rule has been defined. Matching a graph
    /// with unresolved references panics if a placeholder is reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Names that have been referenced but not defined yet.
    pub fn pending_names(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(CompactString::as_str)
    }

    /// The arena holding every node this session built.
    #[must_use]
    pub fn grammar(&self) -> &Grammar<CompactString> {
        &self.grammar
    }

    /// Mutable access to the session arena, for hand-building nodes the
    /// textual syntax cannot express (integer matchers, custom
    /// predicates) before [`register`](RuleSet::register)ing them.
    pub fn grammar_mut(&mut self) -> &mut Grammar<CompactString> {
        &mut self.grammar
    }

    /// Match `text` against the rule `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not defined, or if matching reaches a
    /// reference to a rule that is still undefined.
    #[must_use]
    pub fn parse(&self, name: &str, text: &str) -> Parse<CompactString> {
        let root = self
            .get(name)
            .unwrap_or_else(|| panic!("rule {name:?} is not defined"));
        self.grammar.parse(root, text)
    }

    fn register_node(&mut self, name: &str, node: NodeId) {
        assert!(
            !self.defs.contains_key(name),
            "rule {name:?} is already defined"
        );
        if let Some(sites) = self.pending.remove(name) {
            for site in sites {
                self.grammar.set_child(site.parent, node, site.slot);
            }
        }
        self.defs.insert(CompactString::from(name), node);
    }

    fn record_pending(&mut self, name: CompactString, parent: NodeId, slot: usize) {
        self.pending
            .entry(name)
            .or_default()
            .push(PatchSite { parent, slot });
    }

    /// Turn `compiled` into a child id, recording a patch site under
    /// `parent`/`slot` when the reference is deferred.
    fn child_slot(&mut self, compiled: Compiled, parent: NodeId, slot: usize) -> NodeId {
        match compiled {
            Compiled::Node(id) => {
                self.grammar.set_child(parent, id, slot);
                id
            }
            Compiled::Deferred(name) => {
                self.record_pending(name, parent, slot);
                NodeId::PLACEHOLDER
            }
            Compiled::Empty => {
                panic!("internal error: semantic child expected in purged grammar definition")
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn compile_node(&mut self, definition: &str, node: &ParseTree<PegTag>) -> Compiled {
        // a choice, concatenation, or quantifier wrapper with a single
        // child adds nothing; compile the child directly
        if node.children().len() == 1
            && matches!(
                node.tag(),
                Some(PegTag::Alt | PegTag::Cat | PegTag::Quant)
            )
        {
            return self.compile_node(definition, &node.children()[0]);
        }
        match node.tag() {
            None => {
                // the purged root: exactly one semantic descendant
                let mut result = Compiled::Empty;
                for child in node.children() {
                    let compiled = self.compile_node(definition, child);
                    if matches!(compiled, Compiled::Empty) {
                        continue;
                    }
                    assert!(
                        matches!(result, Compiled::Empty),
                        "internal error: untagged node with more than one semantic child \
                         in a purged grammar definition"
                    );
                    result = compiled;
                }
                result
            }

            Some(PegTag::Alt | PegTag::Cat) => {
                let is_choice = node.tag() == Some(&PegTag::Alt);
                let compiled: Vec<Compiled> = node
                    .children()
                    .iter()
                    .map(|child| self.compile_node(definition, child))
                    .collect();
                let slots = vec![NodeId::PLACEHOLDER; compiled.len()];
                let id = if is_choice {
                    self.grammar.choice(None, &slots)
                } else {
                    self.grammar.seq(None, &slots)
                };
                for (slot, child) in compiled.into_iter().enumerate() {
                    self.child_slot(child, id, slot);
                }
                Compiled::Node(id)
            }

            Some(PegTag::NegLa | PegTag::PosLa) => {
                let is_negative = node.tag() == Some(&PegTag::NegLa);
                let sub = self.compile_node(definition, &node.children()[0]);
                let id = if is_negative {
                    self.grammar.neg_lookahead(None, NodeId::PLACEHOLDER)
                } else {
                    self.grammar.pos_lookahead(None, NodeId::PLACEHOLDER)
                };
                self.child_slot(sub, id, 0);
                Compiled::Node(id)
            }

            Some(PegTag::Quant) => {
                // two children survive the purge: the quantified
                // sub-expression and the mark
                let sub = self.compile_node(definition, &node.children()[0]);
                let id = match node.children()[1].tag() {
                    Some(PegTag::OptMark) => self.grammar.opt(None, NodeId::PLACEHOLDER),
                    Some(PegTag::StarMark) => self.grammar.zero_or_more(None, NodeId::PLACEHOLDER),
                    Some(PegTag::PlusMark) => self.grammar.one_or_more(None, NodeId::PLACEHOLDER),
                    other => panic!("internal error: quantifier mark expected, found {other:?}"),
                };
                self.child_slot(sub, id, 0);
                Compiled::Node(id)
            }

            Some(PegTag::OptMark | PegTag::StarMark | PegTag::PlusMark) => {
                panic!("internal error: quantifier mark outside a quantifier node")
            }

            Some(PegTag::Range) => {
                assert!(
                    node.children().len() == 2,
                    "internal error: range node must have two character children"
                );
                let lo = decode_char(definition, &node.children()[0]);
                let hi = decode_char(definition, &node.children()[1]);
                Compiled::Node(self.grammar.range(None, lo, hi))
            }

            Some(PegTag::NonTerminal) => {
                let name = node.text(definition);
                match self.defs.get(name) {
                    Some(&id) => Compiled::Node(id),
                    None => Compiled::Deferred(CompactString::from(name)),
                }
            }

            Some(PegTag::Str) => {
                let text = decode_string(definition, node);
                Compiled::Node(self.grammar.literal(None, &text))
            }

            Some(PegTag::Char) => {
                let byte = decode_char(definition, node);
                let text = std::str::from_utf8(std::slice::from_ref(&byte))
                    .expect("decoded character literal is not valid UTF-8")
                    .to_owned();
                Compiled::Node(self.grammar.literal(None, &text))
            }

            Some(PegTag::Dot) => Compiled::Node(self.grammar.dot(None)),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape codes recognized inside character and string literals; any
/// other escaped byte stands for itself.
fn decode_escape(byte: u8) -> u8 {
    match byte {
        b'a' => 0x07,
        b'b' => 0x08,
        b't' => b'\t',
        b'n' => b'\n',
        b'v' => 0x0b,
        b'f' => 0x0c,
        b'r' => b'\r',
        other => other,
    }
}

/// Decode a character literal node: `'x'` spans three bytes, `'\x'`
/// four.
fn decode_char(definition: &str, node: &ParseTree<PegTag>) -> u8 {
    let bytes = definition.as_bytes();
    debug_assert!(matches!(node.tag(), Some(PegTag::Char)));
    if node.len() == 3 {
        bytes[node.from() + 1]
    } else {
        debug_assert!(node.len() == 4 && bytes[node.from() + 1] == b'\\');
        decode_escape(bytes[node.from() + 2])
    }
}

/// Decode a string literal node, stripping the quotes and resolving
/// backslash escapes.
fn decode_string(definition: &str, node: &ParseTree<PegTag>) -> CompactString {
    let bytes = &definition.as_bytes()[node.from() + 1..node.end() - 1];
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let mut byte = bytes[i];
        if byte == b'\\' {
            i += 1;
            byte = decode_escape(bytes[i]);
        }
        out.push(byte);
        i += 1;
    }
    CompactString::from(String::from_utf8_lossy(&out).as_ref())
}
