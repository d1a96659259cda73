//! Property-based tests for the matcher and the rewrite pass.
//!
//! These use proptest to generate random inputs and verify the engine's
//! structural guarantees.

use proptest::prelude::*;

use pegram::{Grammar, ParseTree, RuleSet};

/// Check the span discipline: every child inside its parent, children in
/// order and non-overlapping. Valid for grammars without positive
/// lookahead (whose kept child intentionally outspans the zero-length
/// parent).
fn assert_span_invariants<T>(node: &ParseTree<T>) {
    let mut cursor = node.from();
    for child in node.children() {
        assert!(child.from() >= node.from());
        assert!(child.end() <= node.end());
        assert!(child.from() >= cursor, "children overlap or run backwards");
        cursor = child.from() + child.len();
        assert_span_invariants(child);
    }
}

proptest! {
    #[test]
    fn prop_bracket_spans_nest(input in "[\\[\\]]{0,12}") {
        let mut rules = RuleSet::new();
        rules.add("doc", "list !.").unwrap();
        rules.add("list", "('[' list ']')*").unwrap();

        let parsed = rules.parse("doc", &input);
        if let Some(tree) = parsed.tree {
            prop_assert_eq!(tree.from(), 0);
            prop_assert!(tree.end() <= input.len());
            assert_span_invariants(&tree);
        }
        prop_assert!(parsed.last <= input.len());
    }

    #[test]
    fn prop_purge_is_idempotent(input in "[\\[\\]]{0,12}") {
        let mut rules = RuleSet::new();
        rules.add("doc", "list !.").unwrap();
        rules.add("list", "('[' list ']')*").unwrap();

        if let Some(tree) = rules.parse("doc", &input).tree {
            let once = tree.purge();
            let twice = once.purge();
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn prop_seq_regrouping_is_equivalent(input in "[abcx]{0,8}") {
        let mut flat_g: Grammar<u32> = Grammar::new();
        let (a, b, c) = (
            flat_g.literal(None, "a"),
            flat_g.literal(None, "b"),
            flat_g.literal(None, "c"),
        );
        let flat = flat_g.seq(None, &[a, b, c]);

        let mut nested_g: Grammar<u32> = Grammar::new();
        let (a, b, c) = (
            nested_g.literal(None, "a"),
            nested_g.literal(None, "b"),
            nested_g.literal(None, "c"),
        );
        let tail = nested_g.seq(None, &[b, c]);
        let nested = nested_g.seq(None, &[a, tail]);

        let flat_parse = flat_g.parse(flat, &input);
        let nested_parse = nested_g.parse(nested, &input);
        prop_assert_eq!(flat_parse.is_match(), nested_parse.is_match());
        if let (Some(f), Some(n)) = (flat_parse.tree, nested_parse.tree) {
            prop_assert_eq!(f.len(), n.len());
        }
        prop_assert_eq!(flat_parse.last, nested_parse.last);
    }

    #[test]
    fn prop_zero_or_more_always_succeeds(input in "[ab]{0,10}") {
        let mut g: Grammar<u32> = Grammar::new();
        let a = g.literal(None, "a");
        let star = g.zero_or_more(None, a);

        let parsed = g.parse(star, &input);
        let tree = parsed.tree.expect("zero-or-more cannot fail");
        let leading = input.bytes().take_while(|&b| b == b'a').count();
        prop_assert_eq!(tree.len(), leading);
    }

    #[test]
    fn prop_one_or_more_succeeds_iff_child_does(input in "[ab]{0,10}") {
        let mut g: Grammar<u32> = Grammar::new();
        let a = g.literal(None, "a");
        let plus = g.one_or_more(None, a);

        let parsed = g.parse(plus, &input);
        prop_assert_eq!(parsed.is_match(), input.starts_with('a'));
    }

    #[test]
    fn prop_match_length_bounded_by_input(input in ".{0,16}") {
        let mut g: Grammar<u32> = Grammar::new();
        let any = g.dot(None);
        let star = g.zero_or_more(None, any);

        let parsed = g.parse(star, &input);
        let tree = parsed.tree.expect("dot-star cannot fail");
        prop_assert_eq!(tree.len(), input.len());
        prop_assert!(parsed.last <= input.len());
    }
}
