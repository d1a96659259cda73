//! # The Backtracking Matcher
//!
//! Matching is plain recursive descent over the grammar graph: every
//! node variant implements one operation, "match at this cursor", which
//! either returns a parse-tree node spanning `cursor..` or fails with no
//! partial result. Failure is total backtrack; ordered choice and
//! sequence evaluate strictly left to right, so matching is
//! deterministic. There is no memoization, so pathological grammars
//! take exponential time.
//!
//! Cursors are byte offsets. `dot` and `range` consume exactly one byte;
//! multi-byte UTF-8 text flows through `literal` untouched.
//!
//! Recursion depth is capped at [`MAX_DEPTH`]: a grammar that recurses
//! that deep without consuming input has left recursion or an unbounded
//! epsilon loop, and the matcher panics with a diagnostic rather than
//! exhausting the call stack. A repetition whose child matches the empty
//! string is reported as a [`MatchWarning`] and failed locally.

use crate::buffer::NodeBuffer;
use crate::error::MatchWarning;
use crate::tree::ParseTree;

use super::{Expr, Grammar, Node, NodeId};

/// Recursion ceiling for a single `parse` call.
pub const MAX_DEPTH: usize = 4096;

/// Mutable context threaded through one [`Grammar::parse`] call.
///
/// Tracks the furthest input offset any matcher attempted to consume
/// (`last`, used only for error-position reporting), the recursion
/// depth, and the warnings accumulated so far. Custom matchers receive
/// it to participate in error reporting.
pub struct MatchState {
    last: usize,
    depth: usize,
    warnings: Vec<MatchWarning>,
}

impl MatchState {
    fn new(initial_last: usize) -> Self {
        Self {
            last: initial_last,
            depth: 0,
            warnings: Vec::new(),
        }
    }

    /// The furthest offset any matcher has attempted to consume.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.last
    }

    /// Raise `last` to `offset` if it is further.
    pub fn update_last(&mut self, offset: usize) {
        if offset > self.last {
            self.last = offset;
        }
    }

    /// Record a recoverable grammar defect.
    pub fn warn(&mut self, warning: MatchWarning) {
        self.warnings.push(warning);
    }

    /// Restore `last` unconditionally; lookahead attempts must not leak
    /// into the reported furthest position.
    fn restore_last(&mut self, last: usize) {
        self.last = last;
    }

    fn enter(&mut self) {
        self.depth += 1;
        assert!(
            self.depth <= MAX_DEPTH,
            "grammar recursion exceeded {MAX_DEPTH} levels without consuming input; \
             left recursion and unbounded epsilon loops are not supported"
        );
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

/// The outcome of one [`Grammar::parse`] call.
#[derive(Debug)]
pub struct Parse<T> {
    /// The parse tree, absent when the root matcher failed.
    pub tree: Option<ParseTree<T>>,
    /// Furthest offset any branch consumed to, even along failed
    /// branches; on failure, the best estimate of the syntax-error
    /// column.
    pub last: usize,
    /// Grammar defects detected while matching.
    pub warnings: Vec<MatchWarning>,
}

impl<T> Parse<T> {
    /// Whether the root matcher succeeded.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.tree.is_some()
    }
}

impl<T: Clone> Grammar<T> {
    /// Match `text` against the node `root`, starting at offset 0.
    ///
    /// On success the returned tree's `from` is 0 and its `len` is the
    /// number of bytes consumed (a prefix match; anchor with a negative
    /// lookahead over `dot` to require full consumption).
    ///
    /// # Panics
    ///
    /// Panics on grammar usage errors: matching through an unpatched
    /// [`NodeId::PLACEHOLDER`], or recursing [`MAX_DEPTH`] levels without
    /// consuming input (left recursion).
    #[must_use]
    pub fn parse(&self, root: NodeId, text: &str) -> Parse<T> {
        self.parse_with_last(root, text, 0)
    }

    /// [`parse`](Grammar::parse) with a seeded furthest-offset value,
    /// for callers merging error positions across several attempts.
    #[must_use]
    pub fn parse_with_last(&self, root: NodeId, text: &str, initial_last: usize) -> Parse<T> {
        let mut state = MatchState::new(initial_last);
        let tree = self.match_at(root, text, 0, &mut state);
        Parse {
            tree,
            last: state.last,
            warnings: state.warnings,
        }
    }

    pub(crate) fn match_at(
        &self,
        id: NodeId,
        text: &str,
        cursor: usize,
        state: &mut MatchState,
    ) -> Option<ParseTree<T>> {
        let node = self.node(id);
        match &node.expr {
            Expr::Dot => {
                if cursor < text.len() {
                    state.update_last(cursor + 1);
                    Some(ParseTree::leaf(node.tag.clone(), cursor, 1))
                } else {
                    None
                }
            }

            Expr::Literal(lit) => {
                if text.as_bytes()[cursor..].starts_with(lit.as_bytes()) {
                    state.update_last(cursor + lit.len());
                    Some(ParseTree::leaf(node.tag.clone(), cursor, lit.len()))
                } else {
                    None
                }
            }

            Expr::Range { lo, hi } => match text.as_bytes().get(cursor) {
                Some(&b) if *lo <= b && b <= *hi => {
                    state.update_last(cursor + 1);
                    Some(ParseTree::leaf(node.tag.clone(), cursor, 1))
                }
                _ => None,
            },

            Expr::Integer => {
                state.update_last(cursor);
                if cursor >= text.len() {
                    return None;
                }
                let scan = scan_integer(text.as_bytes(), cursor);
                if scan.end == cursor {
                    return None;
                }
                state.update_last(scan.end);
                if scan.overflow {
                    None
                } else {
                    Some(ParseTree::leaf(node.tag.clone(), cursor, scan.end - cursor))
                }
            }

            Expr::Opt(child) => {
                let child = *child;
                state.enter();
                let sub = self.match_at(child, text, cursor, state);
                state.leave();
                let tree = match sub {
                    Some(sub) => ParseTree::new(node.tag.clone(), cursor, sub.len(), vec![sub]),
                    None => ParseTree::leaf(node.tag.clone(), cursor, 0),
                };
                Some(tree)
            }

            Expr::OneOrMore(child) => {
                let child = *child;
                state.enter();
                let result = match self.match_at(child, text, cursor, state) {
                    None => None,
                    Some(first) => {
                        let pos = cursor + first.len();
                        let mut collected = NodeBuffer::new();
                        collected.push(first);
                        self.match_repetition(node, child, text, cursor, pos, collected, state)
                    }
                };
                state.leave();
                result
            }

            Expr::ZeroOrMore(child) => {
                let child = *child;
                state.enter();
                let result = self.match_repetition(
                    node,
                    child,
                    text,
                    cursor,
                    cursor,
                    NodeBuffer::new(),
                    state,
                );
                state.leave();
                result
            }

            Expr::Choice(children) => {
                state.enter();
                let mut result = None;
                for &child in children.iter() {
                    if let Some(sub) = self.match_at(child, text, cursor, state) {
                        result = Some(ParseTree::new(
                            node.tag.clone(),
                            cursor,
                            sub.len(),
                            vec![sub],
                        ));
                        break;
                    }
                }
                state.leave();
                result
            }

            Expr::Seq(children) => {
                state.enter();
                let mut pos = cursor;
                let mut collected = NodeBuffer::new();
                let mut failed = false;
                for &child in children.iter() {
                    match self.match_at(child, text, pos, state) {
                        Some(sub) => {
                            pos += sub.len();
                            collected.push(sub);
                        }
                        None => {
                            collected.clear();
                            failed = true;
                            break;
                        }
                    }
                }
                state.leave();
                if failed {
                    None
                } else {
                    Some(ParseTree::new(
                        node.tag.clone(),
                        cursor,
                        pos - cursor,
                        collected.finalize(),
                    ))
                }
            }

            Expr::PosLookahead(child) => {
                let child = *child;
                let remembered = state.last();
                state.enter();
                let sub = self.match_at(child, text, cursor, state);
                state.leave();
                state.restore_last(remembered);
                sub.map(|sub| ParseTree::new(node.tag.clone(), cursor, 0, vec![sub]))
            }

            Expr::NegLookahead(child) => {
                let child = *child;
                let remembered = state.last();
                state.enter();
                let sub = self.match_at(child, text, cursor, state);
                state.leave();
                state.restore_last(remembered);
                match sub {
                    None => Some(ParseTree::leaf(node.tag.clone(), cursor, 0)),
                    Some(_) => None,
                }
            }

            Expr::Custom(matcher) => {
                state.enter();
                let matched = matcher(text, cursor, state);
                state.leave();
                matched.map(|len| ParseTree::leaf(node.tag.clone(), cursor, len))
            }
        }
    }

    /// Shared repetition loop; `collected` may already hold a mandatory
    /// first iteration.
    #[allow(clippy::too_many_arguments)]
    fn match_repetition(
        &self,
        node: &Node<T>,
        child: NodeId,
        text: &str,
        start: usize,
        mut pos: usize,
        mut collected: NodeBuffer<T>,
        state: &mut MatchState,
    ) -> Option<ParseTree<T>> {
        loop {
            match self.match_at(child, text, pos, state) {
                Some(sub) if sub.is_empty() => {
                    // The repetition would never terminate; failing it
                    // keeps accepted languages identical across grammars
                    // that rely on this policy.
                    state.warn(MatchWarning::EmptyRepetition { offset: pos });
                    collected.clear();
                    return None;
                }
                Some(sub) => {
                    pos += sub.len();
                    collected.push(sub);
                }
                None => {
                    return Some(ParseTree::new(
                        node.tag.clone(),
                        start,
                        pos - start,
                        collected.finalize(),
                    ));
                }
            }
        }
    }
}

struct IntScan {
    /// One past the last byte the conversion consumed; equals the scan
    /// start when no digits were found.
    end: usize,
    overflow: bool,
}

/// Scan a signed integer the way `strtol(text, &end, 0)` does: skip
/// leading whitespace, accept an optional sign, auto-detect the base
/// (`0x`/`0X` hexadecimal, leading `0` octal, decimal otherwise), then
/// consume digits, accumulating into an `i64` and flagging overflow
/// without stopping the scan.
fn scan_integer(bytes: &[u8], start: usize) -> IntScan {
    let mut i = start;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r') {
        i += 1;
    }
    let mut negative = false;
    if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
        negative = bytes[i] == b'-';
        i += 1;
    }
    let mut base: i64 = 10;
    if i < bytes.len() && bytes[i] == b'0' {
        if i + 2 < bytes.len()
            && matches!(bytes[i + 1], b'x' | b'X')
            && digit_value(bytes[i + 2], 16).is_some()
        {
            base = 16;
            i += 2;
        } else {
            base = 8;
        }
    }
    let digits_start = i;
    let mut value: i64 = 0;
    let mut overflow = false;
    while i < bytes.len() {
        let Some(digit) = digit_value(bytes[i], base) else {
            break;
        };
        // accumulate negatively so i64::MIN is representable
        value = match value.checked_mul(base).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        }) {
            Some(v) => v,
            None => {
                overflow = true;
                value
            }
        };
        i += 1;
    }
    if i == digits_start {
        // no digits: the conversion consumed nothing, not even the sign
        return IntScan {
            end: start,
            overflow: false,
        };
    }
    IntScan { end: i, overflow }
}

fn digit_value(byte: u8, base: i64) -> Option<i64> {
    let value = match byte {
        b'0'..=b'9' => i64::from(byte - b'0'),
        b'a'..=b'z' => i64::from(byte - b'a') + 10,
        b'A'..=b'Z' => i64::from(byte - b'A') + 10,
        _ => return None,
    };
    (value < base).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str, start: usize) -> (usize, bool) {
        let scan = scan_integer(text.as_bytes(), start);
        (scan.end, scan.overflow)
    }

    #[test]
    fn test_scan_decimal() {
        assert_eq!(scan("42", 0), (2, false));
        assert_eq!(scan("42x", 0), (2, false));
        assert_eq!(scan("-7", 0), (2, false));
        assert_eq!(scan("+7", 0), (2, false));
    }

    #[test]
    fn test_scan_skips_leading_whitespace() {
        assert_eq!(scan("  42", 0), (4, false));
        assert_eq!(scan("\t-1", 0), (3, false));
    }

    #[test]
    fn test_scan_hex_prefix() {
        assert_eq!(scan("0x10", 0), (4, false));
        assert_eq!(scan(" 0xfoo", 0), (4, false));
        // "0x" with no hex digit after it parses as the octal "0"
        assert_eq!(scan("0xzz", 0), (1, false));
    }

    #[test]
    fn test_scan_octal_prefix() {
        assert_eq!(scan("0755", 0), (4, false));
        // octal scan stops at the first non-octal digit
        assert_eq!(scan("0758", 0), (3, false));
    }

    #[test]
    fn test_scan_no_digits() {
        assert_eq!(scan("abc", 0), (0, false));
        assert_eq!(scan("  +x", 0), (0, false));
        assert_eq!(scan("", 0), (0, false));
    }

    #[test]
    fn test_scan_overflow_consumes_all_digits() {
        let text = "99999999999999999999999";
        let (end, overflow) = scan(text, 0);
        assert_eq!(end, text.len());
        assert!(overflow);
    }

    #[test]
    fn test_scan_extremes_fit() {
        assert_eq!(scan("9223372036854775807", 0), (19, false));
        assert_eq!(scan("-9223372036854775808", 0), (20, false));
        assert_eq!(scan("9223372036854775808", 0), (19, true));
    }

    #[test]
    fn test_scan_from_offset() {
        assert_eq!(scan("ab12", 2), (4, false));
    }
}
