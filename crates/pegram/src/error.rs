//! # Error and Warning Types
//!
//! Match *failure* is not an error: it travels through the whole matcher
//! call tree as an ordinary absent result. The types here cover the two
//! recoverable conditions that remain:
//!
//! - [`CompileError`]: a textual grammar definition was rejected by the
//!   grammar compiler.
//! - [`MatchWarning`]: a grammar defect the matcher recovered from locally
//!   (reported on [`Parse::warnings`](crate::Parse)).
//!
//! Programming defects (patching the wrong child slot, zero-child
//! sequences, matching through an unpatched placeholder, left recursion)
//! are panics, documented on the functions that raise them.
//!
//! When the `diagnostics` feature is enabled, [`CompileError`] also derives
//! [`miette::Diagnostic`] for rich reporting.

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors produced while compiling a textual grammar definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum CompileError {
    /// The definition is not valid PEG syntax.
    ///
    /// `offset` is the furthest byte offset any branch of the bootstrap
    /// grammar consumed to, the best estimate of the syntax-error column.
    /// The session is left unmodified; the rule stays undefined.
    #[error("syntax error in grammar definition at byte {offset}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegram::compile::syntax)))]
    Syntax { offset: usize },
}

impl CompileError {
    /// Byte offset of the rejected definition text.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Syntax { offset } => *offset,
        }
    }
}

/// Recoverable grammar defects reported by the matcher.
///
/// Warnings accumulate on [`Parse::warnings`](crate::Parse); the match
/// itself continues (or fails locally) as documented per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchWarning {
    /// A repetition's child matched the empty string, so the repetition
    /// could never terminate. The whole repetition is failed instead,
    /// discarding iterations already matched. Fix the grammar; `('a'?)+`
    /// is the canonical offender.
    #[error("repetition child matched the empty string at byte {offset}; failing the repetition")]
    EmptyRepetition { offset: usize },
}

impl MatchWarning {
    /// Byte offset where the defect was detected.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::EmptyRepetition { offset } => *offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::Syntax { offset: 7 };
        assert_eq!(err.offset(), 7);
        assert!(format!("{err}").contains("byte 7"));
    }

    #[test]
    fn test_match_warning_display() {
        let warning = MatchWarning::EmptyRepetition { offset: 3 };
        assert_eq!(warning.offset(), 3);
        assert!(format!("{warning}").contains("empty string"));
    }
}
