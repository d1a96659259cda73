//! ANSI colorizing of matched input by parse-tree depth.

use pegram::ParseTree;

const RESET: &[u8] = b"\x1b[0m";

fn color_code(depth: usize) -> Vec<u8> {
    format!("\x1b[3{}m", depth % 6 + 1).into_bytes()
}

/// Render the region of `text` a tree matched, wrapping each node's
/// bytes in a color derived from its depth. Returns raw bytes because
/// node boundaries are byte offsets and may fall inside multi-byte
/// sequences; write them to the output stream as-is.
///
/// The caller is responsible for the input bytes after
/// [`tree.end()`](ParseTree::end).
#[must_use]
pub fn colorize<T>(text: &str, tree: &ParseTree<T>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    let mut cursor = tree.from();
    colorize_node(text.as_bytes(), tree, 0, &mut cursor, &mut out);
    out.extend_from_slice(RESET);
    out
}

fn colorize_node<T>(
    text: &[u8],
    node: &ParseTree<T>,
    depth: usize,
    cursor: &mut usize,
    out: &mut Vec<u8>,
) {
    out.extend_from_slice(&color_code(depth));
    let mut children = node.children().iter();
    let mut next_child = children.next();
    while *cursor < node.end() {
        if let Some(child) = next_child {
            if *cursor >= child.from() {
                colorize_node(text, child, depth + 1, cursor, out);
                out.extend_from_slice(&color_code(depth));
                next_child = children.next();
                continue;
            }
        }
        out.push(text[*cursor]);
        *cursor += 1;
    }
}
