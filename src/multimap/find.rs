use core::cmp::Ordering;

use super::{Multimap, Search};
use crate::iwbt::Iwbt;
use crate::raw::{Arena, Handle};
use crate::KeyAdapter;

impl<A: KeyAdapter> Multimap<A> {
    /// Searches for the first value with key `key`.
    ///
    /// Without an equal key, returns the last value whose key is smaller, or
    /// `Nearest(None)` if every key is larger.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_before(&self, arena: &Arena<A::Value>, key: &A::Key) -> Search {
        let mut matched = None;
        let mut current = self.tree.root();

        while let Some(node) = current {
            let link = Iwbt::<A>::link(arena, node);
            match A::compare(key, Self::key_of(arena, node)) {
                // Keep descending first-wards: an earlier duplicate may sit below.
                Ordering::Equal => {
                    matched = Some(node);
                    current = link.first_child();
                }
                Ordering::Greater => match link.last_child() {
                    Some(last) => current = Some(last),
                    None => return Self::settle(matched, Some(node)),
                },
                Ordering::Less => match link.first_child() {
                    Some(first) => current = Some(first),
                    None => return Self::settle(matched, self.tree.previous(arena, node)),
                },
            }
        }

        Self::settle(matched, None)
    }

    /// Searches for the last value with key `key`.
    ///
    /// Without an equal key, returns the first value whose key is larger, or
    /// `Nearest(None)` if every key is smaller.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_after(&self, arena: &Arena<A::Value>, key: &A::Key) -> Search {
        let mut matched = None;
        let mut current = self.tree.root();

        while let Some(node) = current {
            let link = Iwbt::<A>::link(arena, node);
            match A::compare(key, Self::key_of(arena, node)) {
                Ordering::Equal => {
                    matched = Some(node);
                    current = link.last_child();
                }
                Ordering::Less => match link.first_child() {
                    Some(first) => current = Some(first),
                    None => return Self::settle(matched, Some(node)),
                },
                Ordering::Greater => match link.last_child() {
                    Some(last) => current = Some(last),
                    None => return Self::settle(matched, self.tree.next(arena, node)),
                },
            }
        }

        Self::settle(matched, None)
    }

    /// A match found on the way down wins over the nearest neighbour.
    fn settle(matched: Option<Handle>, nearest: Option<Handle>) -> Search {
        matched.map_or(Search::Nearest(nearest), Search::Match)
    }

    /// Returns the first value with key `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_first(&self, arena: &Arena<A::Value>, key: &A::Key) -> Option<Handle> {
        match self.find_before(arena, key) {
            Search::Match(node) => Some(node),
            Search::Nearest(_) => None,
        }
    }

    /// Returns the last value with key `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn find_last(&self, arena: &Arena<A::Value>, key: &A::Key) -> Option<Handle> {
        match self.find_after(arena, key) {
            Search::Match(node) => Some(node),
            Search::Nearest(_) => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use proptest::prelude::*;

    use super::super::tests::build;
    use super::*;

    #[test]
    fn empty_map_finds_nothing() {
        let (arena, map, _) = build(&[]);
        assert_eq!(map.find_before(&arena, &1), Search::Nearest(None));
        assert_eq!(map.find_after(&arena, &1), Search::Nearest(None));
        assert_eq!(map.find_first(&arena, &1), None);
    }

    #[test]
    fn nearest_neighbours() {
        let (arena, map, h) = build(&[1, 3, 5, 7]);
        assert_eq!(map.find_before(&arena, &4), Search::Nearest(Some(h[1])));
        assert_eq!(map.find_before(&arena, &5), Search::Match(h[2]));
        assert_eq!(map.find_before(&arena, &0), Search::Nearest(None));
        assert_eq!(map.find_before(&arena, &8), Search::Nearest(Some(h[3])));

        assert_eq!(map.find_after(&arena, &4), Search::Nearest(Some(h[2])));
        assert_eq!(map.find_after(&arena, &0), Search::Nearest(Some(h[0])));
        assert_eq!(map.find_after(&arena, &8), Search::Nearest(None));
        assert!(!map.find_after(&arena, &6).is_match());
        assert_eq!(map.find_after(&arena, &6).handle(), Some(h[3]));
    }

    #[test]
    fn runs_are_found_at_both_ends() {
        let (arena, map, h) = build(&[2, 4, 4, 4, 4, 4, 6]);
        assert_eq!(map.find_first(&arena, &4), Some(h[1]));
        assert_eq!(map.find_last(&arena, &4), Some(h[5]));
        assert_eq!(map.find_first(&arena, &5), None);
    }

    proptest! {
        #[test]
        fn finds_agree_with_a_scan(keys in prop::collection::vec(0..20u32, 0..64), key in 0..20u32) {
            let (arena, map, _) = build(&keys);
            let sorted: alloc::vec::Vec<_> = map.iter(&arena).map(|(handle, item)| (handle, item.id)).collect();

            let first = sorted.iter().find(|(_, id)| *id == key).map(|&(handle, _)| handle);
            let last = sorted.iter().rev().find(|(_, id)| *id == key).map(|&(handle, _)| handle);
            let below = sorted.iter().rev().find(|(_, id)| *id < key).map(|&(handle, _)| handle);
            let above = sorted.iter().find(|(_, id)| *id > key).map(|&(handle, _)| handle);

            let before = first.map_or(Search::Nearest(below), Search::Match);
            let after = last.map_or(Search::Nearest(above), Search::Match);
            prop_assert_eq!(map.find_before(&arena, &key), before);
            prop_assert_eq!(map.find_after(&arena, &key), after);
        }
    }
}
