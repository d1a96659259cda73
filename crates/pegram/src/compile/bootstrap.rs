//! The self-hosting bootstrap grammar.
//!
//! PEG definition syntax is itself parsed with the engine: this module
//! hand-assembles, once per process, the grammar graph that recognizes
//! definition texts. Every session shares the same immutable instance;
//! it is built on first use and never reconstructed.
//!
//! The recognized syntax:
//!
//! ```text
//! grammar   := alt !.
//! alt       := cat ('/' cat)*
//! cat       := (lookahead)+
//! lookahead := ('!'|'&')? quant
//! quant     := atom ('?'|'*'|'+')?
//! atom      := range | char | string | identifier | '(' alt ')' | '.'
//! range     := char '..' char
//! ```
//!
//! with `#`-to-end-of-line comments and whitespace insignificant between
//! tokens.

use std::sync::LazyLock;

use crate::grammar::{Grammar, NodeId};

/// Tags labelling the semantic nodes of the bootstrap grammar. The
/// compiler walks a purged parse tree and dispatches on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PegTag {
    /// Ordered choice: `cat ('/' cat)*`.
    Alt,
    /// Concatenation: one or more lookahead terms.
    Cat,
    /// `!`-prefixed term.
    NegLa,
    /// `&`-prefixed term.
    PosLa,
    /// Atom plus optional quantifier mark.
    Quant,
    /// The `?` mark itself.
    OptMark,
    /// The `*` mark itself.
    StarMark,
    /// The `+` mark itself.
    PlusMark,
    /// `char '..' char`.
    Range,
    /// A rule identifier.
    NonTerminal,
    /// A double-quoted string literal.
    Str,
    /// A single-quoted character literal.
    Char,
    /// The `.` token.
    Dot,
}

pub(crate) struct Bootstrap {
    pub(crate) grammar: Grammar<PegTag>,
    pub(crate) root: NodeId,
}

pub(crate) static BOOTSTRAP: LazyLock<Bootstrap> = LazyLock::new(build);

#[allow(clippy::too_many_lines)]
fn build() -> Bootstrap {
    let mut g = Grammar::new();

    let anychar = g.dot(None);
    let backslash = g.literal(None, "\\");

    // blanks = (' ' / '\t'..'\r' / '#' (!'\n' .)*)*
    let blanks = {
        let space = g.literal(None, " ");
        let ctl = g.range(None, b'\t', b'\r');
        let hash = g.literal(None, "#");
        let newline = g.literal(None, "\n");
        let not_newline = g.neg_lookahead(None, newline);
        let comment_byte = g.seq(None, &[not_newline, anychar]);
        let comment_body = g.zero_or_more(None, comment_byte);
        let comment = g.seq(None, &[hash, comment_body]);
        let blank = g.choice(None, &[space, ctl, comment]);
        g.zero_or_more(None, blank)
    };

    // dot = '.'
    let dot = g.literal(Some(PegTag::Dot), ".");

    // char = '\'' ('\\' . / .) '\''
    let char_lit = {
        let quote = g.literal(None, "'");
        let escaped = g.seq(None, &[backslash, anychar]);
        let body = g.choice(None, &[escaped, anychar]);
        g.seq(Some(PegTag::Char), &[quote, body, quote])
    };

    // str = '"' ('\\' . / !'"' .)* '"'
    let str_lit = {
        let quote = g.literal(None, "\"");
        let escaped = g.seq(None, &[backslash, anychar]);
        let not_quote = g.neg_lookahead(None, quote);
        let plain = g.seq(None, &[not_quote, anychar]);
        let piece = g.choice(None, &[escaped, plain]);
        let body = g.zero_or_more(None, piece);
        g.seq(Some(PegTag::Str), &[quote, body, quote])
    };

    // identifier = ('A'..'Z' / 'a'..'z' / '_') (head / '0'..'9')*
    let identifier = {
        let upper = g.range(None, b'A', b'Z');
        let lower = g.range(None, b'a', b'z');
        let underscore = g.literal(None, "_");
        let head = g.choice(None, &[upper, lower, underscore]);
        let digit = g.range(None, b'0', b'9');
        let tail_byte = g.choice(None, &[head, digit]);
        let tail = g.zero_or_more(None, tail_byte);
        g.seq(Some(PegTag::NonTerminal), &[head, tail])
    };

    // range = char blanks '..' char
    let range = {
        let dots = g.literal(None, "..");
        g.seq(Some(PegTag::Range), &[char_lit, blanks, dots, char_lit])
    };

    // atom = range / char / str / identifier / '(' alt ')' / dot
    // the parenthesized alternative recurses into alt, patched below
    let lparen = g.literal(None, "(");
    let rparen = g.literal(None, ")");
    let paren = g.seq(None, &[lparen, NodeId::PLACEHOLDER, rparen]);
    let atom = g.choice(None, &[range, char_lit, str_lit, identifier, paren, dot]);

    // quant = atom blanks ('?' / '*' / '+')?
    let quant = {
        let opt_mark = g.literal(Some(PegTag::OptMark), "?");
        let star_mark = g.literal(Some(PegTag::StarMark), "*");
        let plus_mark = g.literal(Some(PegTag::PlusMark), "+");
        let mark = g.choice(None, &[opt_mark, star_mark, plus_mark]);
        let maybe_mark = g.opt(None, mark);
        g.seq(Some(PegTag::Quant), &[atom, blanks, maybe_mark])
    };

    // negla = '!' blanks quant ; posla = '&' blanks quant
    let negla = {
        let bang = g.literal(None, "!");
        g.seq(Some(PegTag::NegLa), &[bang, blanks, quant])
    };
    let posla = {
        let amp = g.literal(None, "&");
        g.seq(Some(PegTag::PosLa), &[amp, blanks, quant])
    };

    // lookahead = negla / posla / quant
    let lookahead = g.choice(None, &[negla, posla, quant]);

    // cat = (lookahead blanks)+   ("" expresses epsilon productions)
    let cat = {
        let term = g.seq(None, &[lookahead, blanks]);
        g.one_or_more(Some(PegTag::Cat), term)
    };

    // alt = blanks cat blanks ('/' blanks cat blanks)*
    let alt = {
        let slash = g.literal(None, "/");
        let more = g.seq(None, &[slash, blanks, cat, blanks]);
        let more_star = g.zero_or_more(None, more);
        g.seq(Some(PegTag::Alt), &[blanks, cat, blanks, more_star])
    };

    // close the cycle: '(' alt ')'
    g.set_child(paren, alt, 1);

    // the root requires the whole input to be consumed
    let root = {
        let end = g.neg_lookahead(None, anychar);
        g.seq(None, &[alt, end])
    };

    Bootstrap { grammar: g, root }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(definition: &str) -> bool {
        let boot = &*BOOTSTRAP;
        boot.grammar.parse(boot.root, definition).is_match()
    }

    #[test]
    fn test_accepts_core_syntax() {
        assert!(accepts("'a'"));
        assert!(accepts("\"hello\""));
        assert!(accepts("'a'..'z'"));
        assert!(accepts("."));
        assert!(accepts("name_1"));
        assert!(accepts("'a' 'b' / 'c'?"));
        assert!(accepts("!'x' ."));
        assert!(accepts("&'x' ."));
        assert!(accepts("( 'a' / 'b' )* !."));
        assert!(accepts("'a' # trailing comment"));
        assert!(accepts("  # leading comment\n 'a'"));
        assert!(accepts("'\\n' / '\\\\'"));
    }

    #[test]
    fn test_rejects_malformed_syntax() {
        assert!(!accepts(""));
        assert!(!accepts("'a"));
        assert!(!accepts("( 'a'"));
        assert!(!accepts("/ 'a'"));
        assert!(!accepts("'a' )"));
        assert!(!accepts("123"));
    }

    #[test]
    fn test_shared_instance() {
        let first: *const Bootstrap = &*BOOTSTRAP;
        let second: *const Bootstrap = &*BOOTSTRAP;
        assert_eq!(first, second);
    }
}
