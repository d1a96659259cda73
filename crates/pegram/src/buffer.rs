//! # Node Collector
//!
//! Repetition and sequence matchers don't know how many children they
//! will produce until the child matcher finally fails, so sub-matches
//! accumulate in a [`NodeBuffer`] and are turned into the node's
//! fixed-size child array once the count is known.
//!
//! The buffer keeps a small inline capacity and spills to the heap, an
//! allocator detail with no observable contract: only push order and the
//! finalize/discard interface matter.

use smallvec::SmallVec;

use crate::tree::ParseTree;

/// Sub-matches held inline before spilling to the heap.
const INLINE_NODES: usize = 4;

/// An append-only collector of parse-tree nodes.
#[derive(Debug)]
pub struct NodeBuffer<T> {
    items: SmallVec<[ParseTree<T>; INLINE_NODES]>,
}

impl<T> NodeBuffer<T> {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Append one node; amortized O(1).
    pub fn push(&mut self, node: ParseTree<T>) {
        self.items.push(node);
    }

    /// Number of nodes collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move every collected node, in push order, into an owned child
    /// array, leaving the buffer empty and reusable.
    #[must_use]
    pub fn finalize(&mut self) -> Box<[ParseTree<T>]> {
        self.items.drain(..).collect()
    }

    /// Release every collected node, handing each to `cleanup`.
    ///
    /// Used when a matcher backtracks after partial success and a caller
    /// wants to observe the discarded sub-matches; plain [`clear`]
    /// (or dropping the buffer) releases them silently.
    ///
    /// [`clear`]: NodeBuffer::clear
    pub fn discard_with<F>(&mut self, mut cleanup: F)
    where
        F: FnMut(ParseTree<T>),
    {
        for node in self.items.drain(..) {
            cleanup(node);
        }
    }

    /// Release every collected node.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for NodeBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(count: usize) -> Vec<ParseTree<u32>> {
        (0..count)
            .map(|i| ParseTree::leaf(Some(u32::try_from(i).unwrap()), i, 1))
            .collect()
    }

    #[test]
    fn test_finalize_preserves_push_order() {
        let mut buffer = NodeBuffer::new();
        for leaf in leaves(3) {
            buffer.push(leaf);
        }
        let children = buffer.finalize();
        assert!(buffer.is_empty());
        let tags: Vec<u32> = children.iter().map(|c| *c.tag().unwrap()).collect();
        assert_eq!(tags, vec![0, 1, 2]);
    }

    #[test]
    fn test_spill_past_inline_capacity() {
        let mut buffer = NodeBuffer::new();
        for leaf in leaves(100) {
            buffer.push(leaf);
        }
        assert_eq!(buffer.len(), 100);
        let children = buffer.finalize();
        assert_eq!(children.len(), 100);
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.from(), i);
        }
    }

    #[test]
    fn test_buffer_reusable_after_finalize() {
        let mut buffer = NodeBuffer::new();
        buffer.push(ParseTree::<u32>::leaf(None, 0, 1));
        let first = buffer.finalize();
        assert_eq!(first.len(), 1);
        buffer.push(ParseTree::leaf(None, 5, 2));
        let second = buffer.finalize();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].from(), 5);
    }

    #[test]
    fn test_discard_with_observes_every_node() {
        let mut buffer = NodeBuffer::new();
        for leaf in leaves(6) {
            buffer.push(leaf);
        }
        let mut seen = Vec::new();
        buffer.discard_with(|node| seen.push(node.from()));
        assert!(buffer.is_empty());
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }
}
