use tracing::trace;

use super::Iwbt;
use crate::raw::{Arena, Handle};
use crate::Adapter;

impl<A: Adapter> Iwbt<A> {
    /// Performs a left rotation on `x`.
    ///
    /// ```text
    ///       |                 |
    ///       x                 y
    ///      / \               / \
    ///     1   y    ---->    x   3
    ///        / \           / \
    ///       2   3         1   2
    /// ```
    pub(super) fn rotate_left(&mut self, arena: &mut Arena<A::Value>, x: Handle) {
        trace!(node = ?x, "rotating left");
        let Some(y) = Self::link(arena, x).last_child() else {
            panic!("`Iwbt::rotate_left()` - node has no last child!");
        };

        let inner = Self::link(arena, y).first_child();
        Self::link_mut(arena, x).set_last_child(inner);
        Self::link_mut(arena, y).set_first_child(Some(x));
        if let Some(inner) = inner {
            Self::link_mut(arena, inner).set_parent(Some(x));
        }

        let parent = Self::link(arena, x).parent();
        self.replace_child(arena, parent, x, Some(y));
        Self::link_mut(arena, y).set_parent(parent);
        Self::link_mut(arena, x).set_parent(Some(y));

        // x is now below y, so it goes first.
        Self::recalculate_weight(arena, x);
        Self::recalculate_weight(arena, y);
    }

    /// Performs a right rotation on `x`.
    ///
    /// ```text
    ///         |             |
    ///         x             y
    ///        / \           / \
    ///       y   3  ---->  1   x
    ///      / \               / \
    ///     1   2             2   3
    /// ```
    pub(super) fn rotate_right(&mut self, arena: &mut Arena<A::Value>, x: Handle) {
        trace!(node = ?x, "rotating right");
        let Some(y) = Self::link(arena, x).first_child() else {
            panic!("`Iwbt::rotate_right()` - node has no first child!");
        };

        let inner = Self::link(arena, y).last_child();
        Self::link_mut(arena, x).set_first_child(inner);
        Self::link_mut(arena, y).set_last_child(Some(x));
        if let Some(inner) = inner {
            Self::link_mut(arena, inner).set_parent(Some(x));
        }

        let parent = Self::link(arena, x).parent();
        self.replace_child(arena, parent, x, Some(y));
        Self::link_mut(arena, y).set_parent(parent);
        Self::link_mut(arena, x).set_parent(Some(y));

        Self::recalculate_weight(arena, x);
        Self::recalculate_weight(arena, y);
    }

    /// Restores balance on the path from `start` up to the root.
    ///
    /// Weights on that path must already be correct. After a rotation at a
    /// node, the subtree root that replaced it is balanced by construction, so
    /// the walk resumes at that subtree's parent.
    pub(super) fn rebalance(&mut self, arena: &mut Arena<A::Value>, start: Option<Handle>) {
        trace!(?start, "rebalancing");
        let mut current = start;

        while let Some(node) = current {
            let link = Self::link(arena, node);
            let (first, last) = (link.first_child(), link.last_child());
            let first_weight = Self::weight_of(arena, first);
            let last_weight = Self::weight_of(arena, last);
            debug_assert_eq!(link.weight(), first_weight.join(last_weight), "`Iwbt::rebalance()` - stale weight at {node:?}");

            if !first_weight.supports(last_weight) {
                // The last side outweighs an empty first side by at least 3, so it exists.
                if let Some(last) = last {
                    let outer = Self::weight_of(arena, Self::link(arena, last).last_child());
                    let inner = Self::weight_of(arena, Self::link(arena, last).first_child());
                    if inner.needs_double_rotation(outer) {
                        trace!(?node, "double rotation, right then left");
                        self.rotate_right(arena, last);
                    }
                    self.rotate_left(arena, node);
                }
                current = Self::grandparent(arena, node);
            } else if !last_weight.supports(first_weight) {
                if let Some(first) = first {
                    let outer = Self::weight_of(arena, Self::link(arena, first).first_child());
                    let inner = Self::weight_of(arena, Self::link(arena, first).last_child());
                    if inner.needs_double_rotation(outer) {
                        trace!(?node, "double rotation, left then right");
                        self.rotate_left(arena, first);
                    }
                    self.rotate_right(arena, node);
                }
                current = Self::grandparent(arena, node);
            } else {
                current = link.parent();
            }
        }
    }

    fn grandparent(arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        Self::link(arena, node).parent().and_then(|parent| Self::link(arena, parent).parent())
    }
}
