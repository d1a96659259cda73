//! Tree rewriting: filtering and purging scaffolding nodes.

use super::ParseTree;
use crate::buffer::NodeBuffer;

/// Decision returned by a [`ParseTree::filter`] callback for each
/// non-root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Copy this node and recurse into its children.
    Keep,
    /// Drop this node but recurse into its children, splicing their kept
    /// results into the parent's child list at this node's former
    /// position. Any number of grandchildren (including zero) may stand
    /// in for the one removed child; sibling order is preserved.
    KeepChildrenOnly,
    /// Copy this node but discard all of its children.
    Leaf,
    /// Drop this node and its whole subtree.
    Discard,
}

impl<T: Clone> ParseTree<T> {
    /// Produce a rewritten copy of this tree.
    ///
    /// Pre-order traversal; `decide` is called for every node except the
    /// root, which is always kept. The original tree is untouched.
    ///
    /// With `KeepChildrenOnly` on node `c` below, `c` disappears and its
    /// kept descendants take its place among its siblings:
    ///
    /// ```text
    /// a              a
    /// ├ b            ├ b
    /// ├ c (drop)     ├ e
    /// │ ├ e    ==>   │ └ f
    /// │ │ └ f        ├ g
    /// │ └ g          └ h
    /// └ h
    /// ```
    pub fn filter<F>(&self, mut decide: F) -> ParseTree<T>
    where
        F: FnMut(&ParseTree<T>) -> FilterAction,
    {
        self.filter_node(&mut decide)
    }

    /// Drop every untagged node, splicing its children into its parent.
    ///
    /// This collapses the anonymous grouping nodes the matcher emits for
    /// untagged grammar nodes while preserving all tagged structure. The
    /// root survives even when untagged.
    #[must_use]
    pub fn purge(&self) -> ParseTree<T> {
        self.filter(|node| {
            if node.tag().is_some() {
                FilterAction::Keep
            } else {
                FilterAction::KeepChildrenOnly
            }
        })
    }

    fn filter_node(&self, decide: &mut dyn FnMut(&ParseTree<T>) -> FilterAction) -> ParseTree<T> {
        let mut kept = NodeBuffer::new();
        for child in self.children() {
            child.flatten_into(&mut kept, decide);
        }
        ParseTree::new(self.tag.clone(), self.from, self.len, kept.finalize())
    }

    fn flatten_into(
        &self,
        kept: &mut NodeBuffer<T>,
        decide: &mut dyn FnMut(&ParseTree<T>) -> FilterAction,
    ) {
        match decide(self) {
            FilterAction::Keep => kept.push(self.filter_node(decide)),
            FilterAction::KeepChildrenOnly => {
                for child in self.children() {
                    child.flatten_into(kept, decide);
                }
            }
            FilterAction::Leaf => kept.push(ParseTree::leaf(self.tag.clone(), self.from, self.len)),
            FilterAction::Discard => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_splices_untagged_children() {
        let tree: ParseTree<u32> = ParseTree::new(
            None,
            0,
            2,
            vec![ParseTree::new(
                None,
                0,
                2,
                vec![
                    ParseTree::leaf(Some(1), 0, 1),
                    ParseTree::leaf(Some(2), 1, 1),
                ],
            )],
        );
        let purged = tree.purge();
        assert_eq!(purged.children().len(), 2);
        assert_eq!(purged.children()[0].tag(), Some(&1));
        assert_eq!(purged.children()[1].tag(), Some(&2));
    }

    #[test]
    fn test_filter_never_visits_root() {
        let tree: ParseTree<u32> =
            ParseTree::new(Some(1), 0, 1, vec![ParseTree::leaf(Some(2), 0, 1)]);
        let mut visited = 0;
        let copy = tree.filter(|_| {
            visited += 1;
            FilterAction::Discard
        });
        assert_eq!(visited, 1);
        assert_eq!(copy.tag(), Some(&1));
        assert!(copy.is_leaf());
    }

    #[test]
    fn test_filter_leaf_drops_children_only() {
        let tree: ParseTree<u32> = ParseTree::new(
            Some(1),
            0,
            2,
            vec![ParseTree::new(
                Some(2),
                0,
                2,
                vec![ParseTree::leaf(Some(3), 0, 1)],
            )],
        );
        let copy = tree.filter(|_| FilterAction::Leaf);
        assert_eq!(copy.children().len(), 1);
        assert_eq!(copy.children()[0].tag(), Some(&2));
        assert!(copy.children()[0].is_leaf());
    }
}
