//! Developer utilities for pegram grammars.
//!
//! The `peggrep` binary matches lines of text against a PEG grammar and
//! prints (optionally colorized) matches, or dumps parse trees as
//! indented text or JSON. The helpers live here so they are testable.

pub mod cli;
pub mod color;
pub mod dump;

pub use color::colorize;
pub use dump::tree_to_json;
