use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use super::handle::Handle;

/// Caller-owned storage for the values linked into trees and multimaps.
///
/// The collections in this crate are intrusive: they never allocate or free
/// values. Values are allocated here, linked into an [`Iwbt`](crate::Iwbt) or
/// [`Multimap`](crate::Multimap) by [`Handle`], and unlinked again before they
/// are taken back out. Taking a value that is still linked leaves the tree
/// holding a dead handle, and the next operation that reaches it panics.
///
/// # Examples
///
/// ```
/// use wabi_mmap::Arena;
///
/// let mut arena = Arena::new();
/// let a = arena.alloc("a");
/// let b = arena.alloc("b");
/// assert_eq!(arena[a], "a");
/// assert_eq!(arena.take(b), "b");
/// assert_eq!(arena.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Creates an empty arena with room for at least `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Returns the number of values the arena can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Returns the number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    /// Returns `true` if the arena holds no live values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `element` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds [`Handle::MAX`] values.
    pub fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            // slots.len() < Handle::MAX before push keeps every handle addressable.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    /// Returns `true` if `handle` refers to a live value.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.slots.get(handle.to_index()).is_some_and(Option::is_some)
    }

    /// Returns a reference to the value behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to a live value.
    #[must_use]
    #[inline]
    pub fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    /// Returns a mutable reference to the value behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to a live value.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Removes the value behind `handle` and returns it. The handle may be reused.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to a live value.
    pub fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    /// Drops the value behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to a live value.
    pub fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    /// Drops every value. All outstanding handles become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &T {
        self.get(handle)
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        self.get_mut(handle)
    }
}
