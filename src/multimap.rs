use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use tracing::trace;

use crate::error::InvariantViolation;
use crate::iwbt::{Iter, Iwbt};
use crate::raw::{Arena, Handle};
use crate::KeyAdapter;

mod find;

/// The outcome of [`Multimap::find_before`] and [`Multimap::find_after`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Search {
    /// A value with an equal key: the first of its run for `find_before`, the
    /// last for `find_after`.
    Match(Handle),
    /// No key is equal. Holds the closest value on the searched side, or
    /// `None` if no value lies on that side.
    Nearest(Option<Handle>),
}

impl Search {
    /// Returns the handle found, matching or not.
    #[must_use]
    pub const fn handle(self) -> Option<Handle> {
        match self {
            Self::Match(handle) => Some(handle),
            Self::Nearest(handle) => handle,
        }
    }

    /// Returns `true` if an equal key was found.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// An intrusive multimap ordered by key, with duplicate keys.
///
/// `Multimap` layers key order over an [`Iwbt`]: the adapter `A` says where a
/// value's key lives and how keys compare, and every insertion walks the tree
/// to the matching position. Values with equal keys form a contiguous run
/// whose order is decided by the caller, so a run inserted with
/// [`insert_last`](Multimap::insert_last) iterates in insertion order.
///
/// As with [`Iwbt`], values live in a caller-owned [`Arena`] that every call
/// borrows, and keys are never copied.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use wabi_mmap::{Adapter, Arena, KeyAdapter, Link, Multimap};
///
/// struct Test {
///     by_name: Link,
///     name: &'static str,
///     line: u32,
/// }
///
/// struct ByName;
///
/// impl Adapter for ByName {
///     type Value = Test;
///     fn link(value: &Test) -> &Link { &value.by_name }
///     fn link_mut(value: &mut Test) -> &mut Link { &mut value.by_name }
/// }
///
/// impl KeyAdapter for ByName {
///     type Key = str;
///     fn key(value: &Test) -> &str { value.name }
///     fn compare(a: &str, b: &str) -> Ordering { a.cmp(b) }
/// }
///
/// let mut arena = Arena::new();
/// let mut tests = Multimap::<ByName>::new();
/// for (name, line) in [("parse", 10), ("alloc", 20), ("parse", 30)] {
///     let test = arena.alloc(Test { by_name: Link::new(), name, line });
///     tests.insert_last(&mut arena, test);
/// }
///
/// let lines: Vec<_> = tests.matches(&arena, "parse").map(|(_, test)| test.line).collect();
/// assert_eq!(lines, [10, 30]);
/// assert_eq!(tests.find_first(&arena, "alloc").map(|test| arena[test].line), Some(20));
/// assert!(tests.find_first(&arena, "free").is_none());
/// ```
pub struct Multimap<A: KeyAdapter> {
    tree: Iwbt<A>,
}

impl<A: KeyAdapter> Multimap<A> {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self { tree: Iwbt::new() }
    }

    /// Returns the underlying tree, whose order is the key order of the map.
    #[must_use]
    pub const fn tree(&self) -> &Iwbt<A> {
        &self.tree
    }

    #[inline]
    fn key_of(arena: &Arena<A::Value>, node: Handle) -> &A::Key {
        A::key(arena.get(node))
    }

    #[inline]
    fn same_key(arena: &Arena<A::Value>, a: Handle, b: Handle) -> bool {
        A::compare(Self::key_of(arena, a), Self::key_of(arena, b)) == Ordering::Equal
    }

    /// Returns `true` if the map holds no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of values in the map.
    #[must_use]
    pub fn len(&self, arena: &Arena<A::Value>) -> usize {
        self.tree.len(arena)
    }

    /// Returns an arbitrary value, or `None` if the map is empty.
    #[must_use]
    pub const fn any(&self) -> Option<Handle> {
        self.tree.root()
    }

    /// Returns the value with the smallest key, the first of its run.
    #[must_use]
    pub fn first(&self, arena: &Arena<A::Value>) -> Option<Handle> {
        self.tree.first(arena)
    }

    /// Returns the value with the largest key, the last of its run.
    #[must_use]
    pub fn last(&self, arena: &Arena<A::Value>) -> Option<Handle> {
        self.tree.last(arena)
    }

    /// Returns the value following `node`, whatever its key.
    #[must_use]
    pub fn next(&self, arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        self.tree.next(arena, node)
    }

    /// Returns the value preceding `node`, whatever its key.
    #[must_use]
    pub fn previous(&self, arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        self.tree.previous(arena, node)
    }

    /// Returns the value following `node` if it has the same key.
    #[must_use]
    pub fn next_match(&self, arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        self.tree.next(arena, node).filter(|&next| Self::same_key(arena, node, next))
    }

    /// Returns the value preceding `node` if it has the same key.
    #[must_use]
    pub fn previous_match(&self, arena: &Arena<A::Value>, node: Handle) -> Option<Handle> {
        self.tree.previous(arena, node).filter(|&previous| Self::same_key(arena, node, previous))
    }

    /// Returns the value at position `rank` in key order.
    #[must_use]
    pub fn get_by_rank(&self, arena: &Arena<A::Value>, rank: usize) -> Option<Handle> {
        self.tree.get_by_rank(arena, rank)
    }

    /// Returns the position of `node` in key order.
    #[must_use]
    pub fn rank_of(&self, arena: &Arena<A::Value>, node: Handle) -> usize {
        self.tree.rank_of(arena, node)
    }

    /// Returns the number of values whose key equals `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn count_matches(&self, arena: &Arena<A::Value>, key: &A::Key) -> usize {
        match (self.find_first(arena, key), self.find_last(arena, key)) {
            (Some(first), Some(last)) => self.rank_of(arena, last) - self.rank_of(arena, first) + 1,
            _ => 0,
        }
    }

    /// Inserts `node` before every value with an equal key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_first(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        let after = match self.find_before(arena, Self::key_of(arena, node)) {
            Search::Match(first) => self.tree.previous(arena, first),
            Search::Nearest(before) => before,
        };
        trace!(?node, ?after, "inserting first of key");
        self.tree.insert_after(arena, after, node);
    }

    /// Inserts `node` after every value with an equal key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_last(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        let before = match self.find_after(arena, Self::key_of(arena, node)) {
            Search::Match(last) => self.tree.next(arena, last),
            Search::Nearest(after) => after,
        };
        trace!(?node, ?before, "inserting last of key");
        self.tree.insert_before(arena, before, node);
    }

    /// Inserts `node` immediately before `reference`, which must have an equal key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_before(&mut self, arena: &mut Arena<A::Value>, reference: Handle, node: Handle) {
        debug_assert!(
            Self::same_key(arena, reference, node),
            "`Multimap::insert_before()` - keys of {reference:?} and {node:?} differ!"
        );
        self.tree.insert_before(arena, Some(reference), node);
    }

    /// Inserts `node` immediately after `reference`, which must have an equal key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_after(&mut self, arena: &mut Arena<A::Value>, reference: Handle, node: Handle) {
        debug_assert!(
            Self::same_key(arena, reference, node),
            "`Multimap::insert_after()` - keys of {reference:?} and {node:?} differ!"
        );
        self.tree.insert_after(arena, Some(reference), node);
    }

    /// Removes `node` from the map and resets its link.
    pub fn remove(&mut self, arena: &mut Arena<A::Value>, node: Handle) {
        self.tree.remove(arena, node);
    }

    /// Removes and returns the first value with key `key`.
    pub fn remove_first(&mut self, arena: &mut Arena<A::Value>, key: &A::Key) -> Option<Handle> {
        let node = self.find_first(arena, key)?;
        self.tree.remove(arena, node);
        Some(node)
    }

    /// Removes and returns the last value with key `key`.
    pub fn remove_last(&mut self, arena: &mut Arena<A::Value>, key: &A::Key) -> Option<Handle> {
        let node = self.find_last(arena, key)?;
        self.tree.remove(arena, node);
        Some(node)
    }

    /// Removes and returns an arbitrary value, or `None` if the map is empty.
    pub fn remove_any(&mut self, arena: &mut Arena<A::Value>) -> Option<Handle> {
        self.tree.remove_any(arena)
    }

    /// Removes every value with key `key` and returns how many there were.
    ///
    /// `key` must not borrow from `arena`; copy it out first if it lives in a
    /// linked value.
    ///
    /// # Complexity
    ///
    /// O(log n + m) for m removed values
    pub fn remove_all_with_key(&mut self, arena: &mut Arena<A::Value>, key: &A::Key) -> usize {
        trace!("removing all values of a key");
        let mut removed = 0;
        let mut current = self.find_first(arena, key);
        while let Some(node) = current {
            current = self.next_match(arena, node);
            self.tree.remove(arena, node);
            removed += 1;
        }
        removed
    }

    /// Removes every value, resetting each link.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self, arena: &mut Arena<A::Value>) {
        self.tree.clear(arena);
    }

    /// Exchanges the contents of two maps.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns an iterator over the values in key order.
    #[must_use]
    pub fn iter<'a>(&self, arena: &'a Arena<A::Value>) -> Iter<'a, A> {
        self.tree.iter(arena)
    }

    /// Returns an iterator over the run of values with key `key`, in run order.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator.
    #[must_use]
    pub fn matches<'a>(&self, arena: &'a Arena<A::Value>, key: &A::Key) -> Matches<'a, A> {
        let front = self.find_first(arena, key);
        let back = self.find_last(arena, key);
        let len = self.count_matches(arena, key);
        Matches {
            inner: Iter::range(arena, front, back, len),
        }
    }

    /// Checks the tree invariants and that keys never decrease along the map.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn verify(&self, arena: &Arena<A::Value>) -> Result<(), InvariantViolation> {
        self.tree.verify(arena)?;
        let mut previous: Option<Handle> = None;
        for (next, value) in self.tree.iter(arena) {
            if let Some(previous) = previous {
                if A::compare(Self::key_of(arena, previous), A::key(value)) == Ordering::Greater {
                    return Err(InvariantViolation::KeysOutOfOrder { previous, next });
                }
            }
            previous = Some(next);
        }
        Ok(())
    }
}

impl<A: KeyAdapter> Default for Multimap<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: KeyAdapter> fmt::Debug for Multimap<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multimap").field("tree", &self.tree).finish()
    }
}

/// An iterator over one duplicate run of a [`Multimap`].
///
/// This `struct` is created by [`Multimap::matches`].
pub struct Matches<'a, A: KeyAdapter> {
    inner: Iter<'a, A>,
}

impl<'a, A: KeyAdapter> Iterator for Matches<'a, A> {
    type Item = (Handle, &'a A::Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A: KeyAdapter> DoubleEndedIterator for Matches<'_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<A: KeyAdapter> ExactSizeIterator for Matches<'_, A> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<A: KeyAdapter> FusedIterator for Matches<'_, A> {}

impl<A: KeyAdapter> Clone for Matches<'_, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: KeyAdapter> fmt::Debug for Matches<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matches").field("remaining", &self.inner.len()).finish()
    }
}
