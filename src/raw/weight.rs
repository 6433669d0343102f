use super::handle::{Handle, RawHandle};

/// Siblings `a` and `b` are balanced while `a * DELTA >= b`.
pub(crate) const DELTA: u64 = 3;

/// An overweight child `c` of an unbalanced node is rotated twice if its inner
/// child outweighs its outer child by `inner >= outer * GAMMA`.
pub(crate) const GAMMA: u64 = 2;

/// The weight of a subtree: its element count plus one.
///
/// An absent subtree has weight 1 and a single node has weight 2. Weight 0 is
/// reserved for links that are not part of any tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub(crate) struct Weight(RawHandle);

impl Weight {
    pub(crate) const UNLINKED: Self = Self(0);
    pub(crate) const EMPTY: Self = Self(1);
    pub(crate) const LEAF: Self = Self(2);

    /// Returns the weight of a subtree holding `count` elements.
    #[cfg(test)]
    #[inline]
    pub(crate) const fn from_count(count: usize) -> Self {
        assert!(count <= Handle::MAX, "`Weight::from_count()` - `count` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self((count + 1) as RawHandle)
    }

    /// Returns the number of elements in the subtree.
    #[inline]
    pub(crate) const fn count(self) -> usize {
        debug_assert!(self.0 >= 1, "`Weight::count()` - link is not in a tree!");
        (self.0 as usize).saturating_sub(1)
    }

    #[inline]
    pub(crate) const fn get(self) -> u64 {
        self.0 as u64
    }

    /// Returns `self + other` for two sibling subtrees, i.e. the weight of their parent.
    #[inline]
    pub(crate) fn join(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    #[inline]
    pub(crate) fn increment(&mut self) {
        self.0 += 1;
    }

    #[inline]
    pub(crate) fn decrement(&mut self) {
        self.0 -= 1;
        debug_assert!(self.0 > 1, "`Weight::decrement()` - node weight fell to {}", self.0);
    }

    /// Returns `true` if a subtree of this weight may sit beside a sibling of weight `other`.
    #[inline]
    pub(crate) const fn supports(self, other: Self) -> bool {
        self.get() * DELTA >= other.get()
    }

    /// Returns `true` if the inner grandchild `self` calls for a double rotation against `outer`.
    #[inline]
    pub(crate) const fn needs_double_rotation(self, outer: Self) -> bool {
        self.get() >= GAMMA * outer.get()
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::UNLINKED
    }
}
