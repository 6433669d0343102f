use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use smallvec::SmallVec;
use tracing::trace;

use crate::raw::{Arena, Handle, Link, Weight};
use crate::Adapter;

mod order_statistic;
mod rebalance;
mod sanity;

pub use sanity::Dump;

/// An intrusive weight-balanced order-statistic tree.
///
/// The tree keeps values in a sequence chosen entirely by the caller: values
/// go in at either end, next to another value, or at a position, and the tree
/// never looks at what the values contain. Every structural change is followed
/// by rebalancing, so position lookups, rank queries, insertion and removal are
/// all O(log n).
///
/// The tree stores nothing but the handle of its root. Values live in a
/// caller-owned [`Arena`], and each value carries the [`Link`] selected by the
/// adapter `A`. Every operation therefore borrows the arena. Linking a value
/// claims its link; removing it hands the link back unlinked. The tree never
/// allocates, frees or moves values.
///
/// # Balance
///
/// The implementation follows "Balancing weight-balanced trees" (Hirai and
/// Yamamoto, 2011) using the original balance method, where the weight of a
/// subtree is its size plus one, with parameters (3, 2). Those are the only
/// integer parameters that preserve balance under that method.
///
/// For every node with children of weight `l` and `r`, `l * 3 >= r` and
/// `r * 3 >= l`.
///
/// # Examples
///
/// ```
/// use wabi_mmap::{Adapter, Arena, Iwbt, Link};
///
/// struct Item {
///     link: Link,
///     name: &'static str,
/// }
///
/// struct Items;
///
/// impl Adapter for Items {
///     type Value = Item;
///     fn link(value: &Item) -> &Link { &value.link }
///     fn link_mut(value: &mut Item) -> &mut Link { &mut value.link }
/// }
///
/// let mut arena = Arena::new();
/// let mut tree = Iwbt::<Items>::new();
///
/// let b = arena.alloc(Item { link: Link::new(), name: "b" });
/// let a = arena.alloc(Item { link: Link::new(), name: "a" });
/// let c = arena.alloc(Item { link: Link::new(), name: "c" });
///
/// tree.insert_last(&mut arena, b);
/// tree.insert_first(&mut arena, a);
/// tree.insert_after(&mut arena, Some(b), c);
///
/// let names: Vec<_> = tree.iter(&arena).map(|(_, item)| item.name).collect();
/// assert_eq!(names, ["a", "b", "c"]);
/// assert_eq!(tree.rank_of(&arena, c), 2);
/// assert_eq!(tree.at(&arena, 1), b);
/// ```
pub struct Iwbt<A: Adapter> {
    root: Option<Handle>,
    _marker: PhantomData<fn() -> A>,
}

impl<A: Adapter> Iwbt<A> {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn link(arena: &Arena<A::Value>, handle: Handle) -> &Link {
        A::link(arena.get(handle))
    }

    #[inline]
    pub(crate) fn link_mut(arena: &mut Arena<A::Value>, handle: Handle) -> &mut Link {
        A::link_mut(arena.get_mut(handle))
    }

    /// Returns the weight of a subtree, 1 if absent.
    #[inline]
    fn weight_of(arena: &Arena<A::Value>, node: Option<Handle>) -> Weight {
        node.map_or(Weight::EMPTY, |node| Self::link(arena, node).weight())
    }

    /// Returns `true` if the tree holds no values.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the handle at the root of the tree, if any.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns the number of values in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self, arena: &Arena<A::Value>) -> usize {
        self.sanity_check(arena);
        self.root.map_or(0, |root| {
            let weight = Self::link(arena, root).weight();
            debug_assert!(weight > Weight::EMPTY, "`Iwbt::len()` - root weight is {weight:?}");
            weight.count()
        })
    }

    /// Returns the first value of the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self, arena: &Arena<A::Value>) -> Option<Handle> {
        self.sanity_check(arena);
        self.root.map(|root| Self::first_in_subtree(arena, root))
    }

    /// Returns the last value of the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self, arena: &Arena<A::Value>) -> Option<Handle> {
        self.sanity_check(arena);
        self.root.map(|root| Self::last_in_subtree(arena, root))
    }

    /// Returns the value following `node`, or `None` if `node` is last.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn next(&self, arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        Self::successor(arena, node)
    }

    /// Returns the value preceding `node`, or `None` if `node` is first.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn previous(&self, arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        Self::predecessor(arena, node)
    }

    /// Follows first children from `node` down to the first value of its subtree.
    pub(crate) fn first_in_subtree(arena: &Arena<A::Value>, mut node: Handle) -> Handle {
        while let Some(child) = Self::link(arena, node).first_child() {
            node = child;
        }
        node
    }

    /// Follows last children from `node` down to the last value of its subtree.
    pub(crate) fn last_in_subtree(arena: &Arena<A::Value>, mut node: Handle) -> Handle {
        while let Some(child) = Self::link(arena, node).last_child() {
            node = child;
        }
        node
    }

    pub(crate) fn successor(arena: &Arena<A::Value>, mut node: Handle) -> Option<Handle> {
        if let Some(last) = Self::link(arena, node).last_child() {
            return Some(Self::first_in_subtree(arena, last));
        }

        // Walk up until we arrive from a first child.
        while let Some(parent) = Self::link(arena, node).parent() {
            if Self::link(arena, parent).first_child() == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }

    pub(crate) fn predecessor(arena: &Arena<A::Value>, mut node: Handle) -> Option<Handle> {
        if let Some(first) = Self::link(arena, node).first_child() {
            return Some(Self::last_in_subtree(arena, first));
        }

        // Walk up until we arrive from a last child.
        while let Some(parent) = Self::link(arena, node).parent() {
            if Self::link(arena, parent).last_child() == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }

    /// Points whichever slot held `old` (a child of `parent`, or the root) at `new`.
    fn replace_child(&mut self, arena: &mut Arena<A::Value>, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => {
                debug_assert_eq!(self.root, Some(old), "`Iwbt::replace_child()` - parentless node is not the root!");
                self.root = new;
            }
            Some(parent) => {
                let link = Self::link_mut(arena, parent);
                if link.first_child() == Some(old) {
                    link.set_first_child(new);
                } else {
                    debug_assert_eq!(link.last_child(), Some(old), "`Iwbt::replace_child()` - node is not a child of its parent!");
                    link.set_last_child(new);
                }
            }
        }
    }

    fn increment_to_root(arena: &mut Arena<A::Value>, mut node: Option<Handle>) {
        while let Some(current) = node {
            let link = Self::link_mut(arena, current);
            link.weight_mut().increment();
            node = link.parent();
        }
    }

    fn decrement_to_root(arena: &mut Arena<A::Value>, mut node: Option<Handle>) {
        while let Some(current) = node {
            let link = Self::link_mut(arena, current);
            link.weight_mut().decrement();
            node = link.parent();
        }
    }

    /// Recomputes the weight of `node` from its children.
    fn recalculate_weight(arena: &mut Arena<A::Value>, node: Handle) {
        let link = Self::link(arena, node);
        let weight = Self::weight_of(arena, link.first_child()).join(Self::weight_of(arena, link.last_child()));
        Self::link_mut(arena, node).set_weight(weight);
    }

    fn assert_unlinked(arena: &Arena<A::Value>, node: Handle) {
        debug_assert!(!Self::link(arena, node).is_linked(), "`Iwbt::insert()` - node {node:?} is already linked!");
    }

    fn insert_into_empty_tree(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        trace!(?node, "inserting into empty tree");
        debug_assert!(self.root.is_none(), "`Iwbt::insert_into_empty_tree()` - tree is not empty!");
        Self::link_mut(arena, node).reset_as_leaf(None);
        self.root = Some(node);
    }

    /// Links `node` as the first child of `parent`, which must not have one.
    fn insert_as_first_child(&mut self, arena: &mut Arena<A::Value>, parent: Handle, node: Handle) {
        trace!(?node, ?parent, "inserting as first child");
        let parent_link = Self::link_mut(arena, parent);
        debug_assert!(parent_link.first_child().is_none(), "`Iwbt::insert_as_first_child()` - slot is taken!");
        parent_link.set_first_child(Some(node));
        Self::link_mut(arena, node).reset_as_leaf(Some(parent));
        Self::increment_to_root(arena, Some(parent));
        self.rebalance(arena, Some(parent));
    }

    /// Links `node` as the last child of `parent`, which must not have one.
    fn insert_as_last_child(&mut self, arena: &mut Arena<A::Value>, parent: Handle, node: Handle) {
        trace!(?node, ?parent, "inserting as last child");
        let parent_link = Self::link_mut(arena, parent);
        debug_assert!(parent_link.last_child().is_none(), "`Iwbt::insert_as_last_child()` - slot is taken!");
        parent_link.set_last_child(Some(node));
        Self::link_mut(arena, node).reset_as_leaf(Some(parent));
        Self::increment_to_root(arena, Some(parent));
        self.rebalance(arena, Some(parent));
    }

    /// Inserts `node` at the start of the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_first(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        Self::assert_unlinked(arena, node);
        match self.root {
            None => self.insert_into_empty_tree(arena, node),
            Some(root) => {
                let reference = Self::first_in_subtree(arena, root);
                self.insert_as_first_child(arena, reference, node);
            }
        }
        self.sanity_check(arena);
    }

    /// Inserts `node` at the end of the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_last(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        Self::assert_unlinked(arena, node);
        match self.root {
            None => self.insert_into_empty_tree(arena, node),
            Some(root) => {
                let reference = Self::last_in_subtree(arena, root);
                self.insert_as_last_child(arena, reference, node);
            }
        }
        self.sanity_check(arena);
    }

    /// Inserts `node` immediately before `reference`, or at the end of the tree
    /// if `reference` is `None`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_before(&mut self, arena: &mut Arena<A::Value>, reference: Option<Handle>, node: Handle) {
        let Some(reference) = reference else {
            self.insert_last(arena, node);
            return;
        };

        Self::assert_unlinked(arena, node);
        match Self::link(arena, reference).first_child() {
            None => self.insert_as_first_child(arena, reference, node),
            Some(first) => {
                let predecessor = Self::last_in_subtree(arena, first);
                self.insert_as_last_child(arena, predecessor, node);
            }
        }
        self.sanity_check(arena);
    }

    /// Inserts `node` immediately after `reference`, or at the start of the tree
    /// if `reference` is `None`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_after(&mut self, arena: &mut Arena<A::Value>, reference: Option<Handle>, node: Handle) {
        let Some(reference) = reference else {
            self.insert_first(arena, node);
            return;
        };

        Self::assert_unlinked(arena, node);
        match Self::link(arena, reference).last_child() {
            None => self.insert_as_last_child(arena, reference, node),
            Some(last) => {
                let successor = Self::first_in_subtree(arena, last);
                self.insert_as_first_child(arena, successor, node);
            }
        }
        self.sanity_check(arena);
    }

    /// Removes `node` from the tree, keeping the order of the remaining values.
    ///
    /// The link of `node` is reset so the value can be inserted again.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        trace!(?node, "removing");
        self.sanity_check(arena);

        let link = Self::link(arena, node);
        debug_assert!(link.is_linked(), "`Iwbt::remove()` - node {node:?} is not linked!");
        let parent = link.parent();

        match (link.first_child(), link.last_child()) {
            // A leaf is simply detached.
            (None, None) => {
                self.replace_child(arena, parent, node, None);
                Self::decrement_to_root(arena, parent);
                self.rebalance(arena, parent);
            }
            // A single child takes our place.
            (Some(child), None) | (None, Some(child)) => {
                debug_assert_eq!(Self::link(arena, child).parent(), Some(node));
                self.replace_child(arena, parent, node, Some(child));
                Self::link_mut(arena, child).set_parent(parent);
                Self::decrement_to_root(arena, parent);
                self.rebalance(arena, parent);
            }
            (Some(first), Some(last)) => self.remove_with_two_children(arena, node, first, last),
        }

        Self::link_mut(arena, node).unlink();
        self.sanity_check(arena);
    }

    /// Replaces `node` with its neighbour from the heavier side.
    ///
    /// The neighbour is adjacent and below `node`, so it has at most one child
    /// and that child points away from `node`.
    fn remove_with_two_children(&mut self, arena: &mut Arena<A::Value>, node: Handle, first: Handle, last: Handle) {
        let (replacement, replacement_child) =
            if Self::link(arena, first).weight() > Self::link(arena, last).weight() {
                let replacement = Self::last_in_subtree(arena, first);
                (replacement, Self::link(arena, replacement).first_child())
            } else {
                let replacement = Self::first_in_subtree(arena, last);
                (replacement, Self::link(arena, replacement).last_child())
            };
        let replacement_parent = Self::link(arena, replacement).parent();
        trace!(?node, ?replacement, "replacing removed node with neighbour");

        // Splice the replacement out of its current slot.
        self.replace_child(arena, replacement_parent, replacement, replacement_child);
        if let Some(child) = replacement_child {
            Self::link_mut(arena, child).set_parent(replacement_parent);
        }

        // Re-read our links: the splice may have changed one of our children.
        let link = Self::link(arena, node);
        let (parent, first, last) = (link.parent(), link.first_child(), link.last_child());

        let replacement_link = Self::link_mut(arena, replacement);
        replacement_link.set_first_child(first);
        replacement_link.set_last_child(last);
        replacement_link.set_parent(parent);
        for child in [first, last].into_iter().flatten() {
            Self::link_mut(arena, child).set_parent(Some(replacement));
        }
        self.replace_child(arena, parent, node, Some(replacement));

        // Weights are stale from the replacement's old parent upwards. If that
        // parent was the removed node, the replacement now stands in for it.
        let fix = match replacement_parent {
            Some(replacement_parent) if replacement_parent != node => replacement_parent,
            _ => replacement,
        };
        let mut recalculate = Some(fix);
        while let Some(current) = recalculate {
            Self::recalculate_weight(arena, current);
            recalculate = Self::link(arena, current).parent();
        }
        self.rebalance(arena, Some(fix));
    }

    /// Removes `node` and returns the value that followed it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_and_next(&mut self, arena: &mut Arena<A::Value>, node: Handle) -> Option<Handle> {
        let next = Self::successor(arena, node);
        self.remove(arena, node);
        next
    }

    /// Removes `node` and returns the value that preceded it.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_and_previous(&mut self, arena: &mut Arena<A::Value>, node: Handle) -> Option<Handle> {
        let previous = Self::predecessor(arena, node);
        self.remove(arena, node);
        previous
    }

    /// Removes and returns an arbitrary value (the root), or `None` if the tree is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_any(&mut self, arena: &mut Arena<A::Value>) -> Option<Handle> {
        let root = self.root?;
        self.remove(arena, root);
        Some(root)
    }

    /// Removes and returns the first value.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self, arena: &mut Arena<A::Value>) -> Option<Handle> {
        let first = self.first(arena)?;
        self.remove(arena, first);
        Some(first)
    }

    /// Removes and returns the last value.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self, arena: &mut Arena<A::Value>) -> Option<Handle> {
        let last = self.last(arena)?;
        self.remove(arena, last);
        Some(last)
    }

    /// Puts `new` in the exact position of `old`, which is unlinked.
    ///
    /// The shape of the tree does not change so no rebalancing happens.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn replace(&mut self, arena: &mut Arena<A::Value>, old: Handle, new: Handle) {
        trace!(?old, ?new, "replacing");
        Self::assert_unlinked(arena, new);

        let link = Self::link(arena, old).clone();
        let (parent, first, last) = (link.parent(), link.first_child(), link.last_child());
        *Self::link_mut(arena, new) = link;

        self.replace_child(arena, parent, old, Some(new));
        for child in [first, last].into_iter().flatten() {
            Self::link_mut(arena, child).set_parent(Some(new));
        }
        Self::link_mut(arena, old).unlink();
        self.sanity_check(arena);
    }

    /// Exchanges the contents of two trees.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.root, &mut other.root);
    }

    /// Removes every value, resetting each link so the values can be linked again.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self, arena: &mut Arena<A::Value>) {
        let mut stack: SmallVec<[Handle; 64]> = self.root.take().into_iter().collect();
        while let Some(node) = stack.pop() {
            let link = Self::link_mut(arena, node);
            stack.extend([link.first_child(), link.last_child()].into_iter().flatten());
            link.unlink();
        }
    }

    /// Returns an iterator over the handles and values of the tree, in order.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; each step is O(1) amortized.
    #[must_use]
    pub fn iter<'a>(&self, arena: &'a Arena<A::Value>) -> Iter<'a, A> {
        Iter::range(arena, self.first(arena), self.last(arena), self.len(arena))
    }
}

impl<A: Adapter> Default for Iwbt<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Adapter> fmt::Debug for Iwbt<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iwbt").field("root", &self.root).finish()
    }
}

/// An iterator over the values of an [`Iwbt`] or [`Multimap`](crate::Multimap).
///
/// This `struct` is created by [`Iwbt::iter`] and [`Multimap::iter`](crate::Multimap::iter).
pub struct Iter<'a, A: Adapter> {
    arena: &'a Arena<A::Value>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, A: Adapter> Iter<'a, A> {
    /// Iterates the `len` consecutive values from `front` through `back`.
    pub(crate) const fn range(arena: &'a Arena<A::Value>, front: Option<Handle>, back: Option<Handle>, len: usize) -> Self {
        Self {
            arena,
            front,
            back,
            remaining: len,
        }
    }
}

impl<'a, A: Adapter> Iterator for Iter<'a, A> {
    type Item = (Handle, &'a A::Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.remaining -= 1;
        self.front = Iwbt::<A>::successor(self.arena, node);
        Some((node, self.arena.get(node)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<A: Adapter> DoubleEndedIterator for Iter<'_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.remaining -= 1;
        self.back = Iwbt::<A>::predecessor(self.arena, node);
        Some((node, self.arena.get(node)))
    }
}

impl<A: Adapter> ExactSizeIterator for Iter<'_, A> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<A: Adapter> FusedIterator for Iter<'_, A> {}

impl<A: Adapter> Clone for Iter<'_, A> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<A: Adapter> fmt::Debug for Iter<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use alloc::vec::Vec;

    use super::*;

    pub(crate) struct Item {
        pub(crate) link: Link,
        pub(crate) id: u32,
    }

    pub(crate) struct Items;

    impl Adapter for Items {
        type Value = Item;

        fn link(value: &Item) -> &Link {
            &value.link
        }

        fn link_mut(value: &mut Item) -> &mut Link {
            &mut value.link
        }
    }

    pub(crate) fn alloc(arena: &mut Arena<Item>, id: u32) -> Handle {
        arena.alloc(Item { link: Link::new(), id })
    }

    pub(crate) fn ids(tree: &Iwbt<Items>, arena: &Arena<Item>) -> Vec<u32> {
        tree.iter(arena).map(|(_, item)| item.id).collect()
    }

    fn children(arena: &Arena<Item>, node: Handle) -> (Option<Handle>, Option<Handle>) {
        let link = Iwbt::<Items>::link(arena, node);
        (link.first_child(), link.last_child())
    }

    #[test]
    fn empty_tree() {
        let arena: Arena<Item> = Arena::new();
        let tree = Iwbt::<Items>::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(&arena), 0);
        assert_eq!(tree.first(&arena), None);
        assert_eq!(tree.last(&arena), None);
        assert!(tree.iter(&arena).next().is_none());
        assert_eq!(tree.verify(&arena), Ok(()));
    }

    #[test]
    fn three_ascending_inserts_rotate_left() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let a = alloc(&mut arena, 1);
        let b = alloc(&mut arena, 2);
        let c = alloc(&mut arena, 3);
        tree.insert_last(&mut arena, a);
        tree.insert_last(&mut arena, b);
        assert_eq!(tree.root(), Some(a));

        // a has weight 1 on the left and 3 on the right after c, 1 * 3 >= 3
        // keeps it balanced. A fourth value tips it over.
        tree.insert_last(&mut arena, c);
        assert_eq!(tree.root(), Some(a));
        let d = alloc(&mut arena, 4);
        tree.insert_last(&mut arena, d);
        assert_eq!(tree.root(), Some(b));
        assert_eq!(children(&arena, b), (Some(a), Some(c)));
        assert_eq!(children(&arena, c), (None, Some(d)));
        assert_eq!(ids(&tree, &arena), [1, 2, 3, 4]);
        assert_eq!(tree.verify(&arena), Ok(()));
    }

    #[test]
    fn zig_zag_inserts_rotate_twice() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let a = alloc(&mut arena, 1);
        let d = alloc(&mut arena, 4);
        let b = alloc(&mut arena, 2);
        let c = alloc(&mut arena, 3);
        tree.insert_last(&mut arena, a);
        tree.insert_last(&mut arena, d);
        tree.insert_before(&mut arena, Some(d), b);
        assert_eq!(tree.root(), Some(a));

        // d's first child b outweighs its empty last side: rotate d right,
        // then a left, leaving b on top.
        tree.insert_after(&mut arena, Some(b), c);
        assert_eq!(tree.root(), Some(b));
        assert_eq!(children(&arena, b), (Some(a), Some(d)));
        assert_eq!(children(&arena, d), (Some(c), None));
        assert_eq!(ids(&tree, &arena), [1, 2, 3, 4]);
        assert_eq!(tree.verify(&arena), Ok(()));
    }

    #[test]
    fn remove_root_of_three() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let a = alloc(&mut arena, 1);
        let b = alloc(&mut arena, 2);
        let c = alloc(&mut arena, 3);
        tree.insert_last(&mut arena, b);
        tree.insert_first(&mut arena, a);
        tree.insert_last(&mut arena, c);
        assert_eq!(tree.root(), Some(b));

        tree.remove(&mut arena, b);
        assert!(!arena[b].link.is_linked());
        assert_eq!(tree.len(&arena), 2);
        assert_eq!(tree.first(&arena), Some(a));
        assert_eq!(tree.next(&arena, a), Some(c));
        // Equal weights pull the replacement from the last side.
        assert_eq!(tree.root(), Some(c));
        assert_eq!(tree.verify(&arena), Ok(()));
    }

    #[test]
    fn remove_prefers_heavier_first_side() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let handles: Vec<_> = (0..4).map(|id| alloc(&mut arena, id)).collect();

        // Shape: 2 at the root, [0, 1] on the first side, 3 on the last side.
        tree.insert_last(&mut arena, handles[2]);
        tree.insert_first(&mut arena, handles[1]);
        tree.insert_last(&mut arena, handles[3]);
        tree.insert_first(&mut arena, handles[0]);
        assert_eq!(tree.root(), Some(handles[2]));

        tree.remove(&mut arena, handles[2]);
        assert_eq!(tree.root(), Some(handles[1]));
        assert_eq!(ids(&tree, &arena), [0, 1, 3]);
        assert_eq!(tree.verify(&arena), Ok(()));
    }

    #[test]
    fn replace_keeps_shape() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let handles: Vec<_> = (0..7).map(|id| alloc(&mut arena, id)).collect();
        for &handle in &handles {
            tree.insert_last(&mut arena, handle);
        }
        let root = tree.root().unwrap();
        let stand_in = alloc(&mut arena, 100);
        tree.replace(&mut arena, root, stand_in);

        assert_eq!(tree.root(), Some(stand_in));
        assert!(!arena[root].link.is_linked());
        assert_eq!(tree.len(&arena), 7);
        assert_eq!(tree.verify(&arena), Ok(()));
        assert!(ids(&tree, &arena).contains(&100));
    }

    #[test]
    fn clear_unlinks_everything() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let handles: Vec<_> = (0..50).map(|id| alloc(&mut arena, id)).collect();
        for &handle in &handles {
            tree.insert_first(&mut arena, handle);
        }
        tree.clear(&mut arena);
        assert!(tree.is_empty());
        assert!(handles.iter().all(|&handle| !arena[handle].link.is_linked()));

        // Everything can be linked again.
        for &handle in &handles {
            tree.insert_last(&mut arena, handle);
        }
        assert_eq!(ids(&tree, &arena), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut arena = Arena::new();
        let mut left = Iwbt::<Items>::new();
        let mut right = Iwbt::<Items>::new();
        let a = alloc(&mut arena, 1);
        let b = alloc(&mut arena, 2);
        let c = alloc(&mut arena, 3);
        left.insert_last(&mut arena, a);
        right.insert_last(&mut arena, b);
        right.insert_last(&mut arena, c);

        left.swap(&mut right);
        assert_eq!(ids(&left, &arena), [2, 3]);
        assert_eq!(ids(&right, &arena), [1]);
    }

    #[test]
    fn iter_from_both_ends() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        for id in 0..10 {
            let handle = alloc(&mut arena, id);
            tree.insert_last(&mut arena, handle);
        }
        let mut iter = tree.iter(&arena);
        assert_eq!(iter.len(), 10);
        assert_eq!(iter.next().map(|(_, item)| item.id), Some(0));
        assert_eq!(iter.next_back().map(|(_, item)| item.id), Some(9));
        let middle: Vec<_> = iter.map(|(_, item)| item.id).collect();
        assert_eq!(middle, [1, 2, 3, 4, 5, 6, 7, 8]);
        let reversed: Vec<_> = tree.iter(&arena).rev().map(|(_, item)| item.id).collect();
        assert_eq!(reversed, [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is already linked")]
    fn double_insert_is_caught() {
        let mut arena = Arena::new();
        let mut tree = Iwbt::<Items>::new();
        let a = alloc(&mut arena, 1);
        tree.insert_last(&mut arena, a);
        tree.insert_last(&mut arena, a);
    }
}
