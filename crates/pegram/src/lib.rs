//! # pegram
//!
//! A backtracking Parsing Expression Grammar (PEG) engine.
//!
//! ## Overview
//!
//! Pegram provides three layers, each usable on its own:
//!
//! - **Combinators**: build a [`Grammar`] arena of matcher nodes
//!   (literals, byte ranges, integers, quantifiers, ordered choice,
//!   sequencing, lookaheads, custom predicates) and close recursive
//!   cycles by patching child slots.
//! - **Matching**: [`Grammar::parse`] runs plain recursive backtracking
//!   over the graph and produces a [`ParseTree`] of tagged spans, plus
//!   the furthest offset reached for syntax-error reporting.
//! - **Textual grammars**: a [`RuleSet`] compiles PEG-syntax definition
//!   strings into the same graphs, using a bootstrap grammar that is
//!   itself built from the combinators. Rules may reference each other
//!   in any order; references are patched as definitions arrive.
//!
//! Parse trees can be [`purge`](ParseTree::purge)d to strip anonymous
//! grouping nodes, or rewritten with a custom [`filter`](ParseTree::filter).
//!
//! ## Quick start
//!
//! ```rust
//! use pegram::RuleSet;
//!
//! let mut rules = RuleSet::new();
//! rules.add("doc", "list !.").unwrap();
//! rules.add("list", "('[' list ']')*").unwrap();
//! assert!(rules.is_complete());
//!
//! let result = rules.parse("doc", "[[][]]");
//! let tree = result.tree.expect("balanced brackets match");
//! assert_eq!(tree.len(), 6);
//!
//! // a failed match reports how far it got
//! let failed = rules.parse("doc", "[[]");
//! assert!(failed.tree.is_none());
//! assert_eq!(failed.last, 3);
//! ```
//!
//! ## Deliberate limits
//!
//! Matching is exponential in pathological grammars (no packrat
//! memoization), ordered choice resolves all ambiguity (first success
//! wins), and the whole input is matched in memory by byte offset (no
//! streaming). Left recursion is unsupported and trapped by a recursion
//! ceiling.

pub mod buffer;
pub mod compile;
pub mod error;
pub mod grammar;
pub mod tree;

pub use buffer::NodeBuffer;
pub use compile::RuleSet;
pub use error::{CompileError, MatchWarning};
pub use grammar::{Grammar, MatchState, NodeId, Parse};
pub use tree::{FilterAction, ParseTree};
