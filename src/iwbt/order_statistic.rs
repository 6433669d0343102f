use core::cmp::Ordering;

use tracing::trace;

use super::Iwbt;
use crate::raw::{Arena, Handle};
use crate::Adapter;

impl<A: Adapter> Iwbt<A> {
    /// Returns the value at position `rank`, or `None` if `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_rank(&self, arena: &Arena<A::Value>, rank: usize) -> Option<Handle> {
        if rank >= self.len(arena) {
            return None;
        }

        let mut current = self.root;
        let mut remaining = rank;
        while let Some(node) = current {
            let link = Self::link(arena, node);
            let first_len = Self::weight_of(arena, link.first_child()).count();
            match remaining.cmp(&first_len) {
                Ordering::Equal => return Some(node),
                Ordering::Less => current = link.first_child(),
                Ordering::Greater => {
                    remaining -= first_len + 1;
                    current = link.last_child();
                }
            }
        }

        // Unreachable while the weights are consistent.
        None
    }

    /// Returns the value at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len(arena)`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn at(&self, arena: &Arena<A::Value>, index: usize) -> Handle {
        match self.get_by_rank(arena, index) {
            Some(node) => node,
            None => panic!("`Iwbt::at()` - index {index} out of bounds"),
        }
    }

    /// Returns the position of `node` in the tree.
    ///
    /// `node` must be linked into this tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn rank_of(&self, arena: &Arena<A::Value>, mut node: Handle) -> usize {
        debug_assert!(Self::link(arena, node).is_linked(), "`Iwbt::rank_of()` - node {node:?} is not linked!");
        let mut rank = Self::weight_of(arena, Self::link(arena, node).first_child()).count();

        // Every ancestor we reach from its last side precedes us, along with its first subtree.
        while let Some(parent) = Self::link(arena, node).parent() {
            let parent_link = Self::link(arena, parent);
            if parent_link.last_child() == Some(node) {
                rank += 1 + Self::weight_of(arena, parent_link.first_child()).count();
            }
            node = parent;
        }

        debug_assert_eq!(Some(node), self.root, "`Iwbt::rank_of()` - node belongs to another tree!");
        rank
    }

    /// Inserts `node` so that it ends up at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len(arena)`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_at(&mut self, arena: &mut Arena<A::Value>, index: usize, node: Handle) {
        trace!(?node, index, "inserting at index");
        let len = self.len(arena);
        assert!(index <= len, "`Iwbt::insert_at()` - index {index} out of bounds (len {len})");
        if index == len {
            self.insert_last(arena, node);
        } else {
            let reference = self.at(arena, index);
            self.insert_before(arena, Some(reference), node);
        }
    }

    /// Removes and returns the value at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len(arena)`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_at(&mut self, arena: &mut Arena<A::Value>, index: usize) -> Handle {
        trace!(index, "removing at index");
        let node = self.at(arena, index);
        self.remove(arena, node);
        node
    }

    /// Puts `new` at position `index` in place of the value there, which is
    /// unlinked and returned.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len(arena)`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn replace_at(&mut self, arena: &mut Arena<A::Value>, index: usize, new: Handle) -> Handle {
        let old = self.at(arena, index);
        self.replace(arena, old, new);
        old
    }
}
