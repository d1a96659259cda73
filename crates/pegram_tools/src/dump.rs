//! Tree dumps in text and JSON form.

use std::fmt::Display;

use pegram::ParseTree;
use serde_json::{json, Value};

/// Build a JSON value mirroring the tree: tag (or null), span, matched
/// text, children.
pub fn tree_to_json<T: Display>(text: &str, tree: &ParseTree<T>) -> Value {
    json!({
        "tag": tree.tag().map(ToString::to_string),
        "from": tree.from(),
        "len": tree.len(),
        "text": text.get(tree.from()..tree.end()),
        "children": tree
            .children()
            .iter()
            .map(|child| tree_to_json(text, child))
            .collect::<Vec<Value>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_to_json_shape() {
        let tree: ParseTree<&str> = ParseTree::new(
            Some("root"),
            0,
            2,
            vec![ParseTree::leaf(None, 0, 1), ParseTree::leaf(Some("x"), 1, 1)],
        );
        let value = tree_to_json("ab", &tree);
        assert_eq!(value["tag"], "root");
        assert_eq!(value["from"], 0);
        assert_eq!(value["len"], 2);
        assert_eq!(value["text"], "ab");
        assert_eq!(value["children"].as_array().unwrap().len(), 2);
        assert_eq!(value["children"][0]["tag"], Value::Null);
        assert_eq!(value["children"][1]["text"], "b");
    }
}
