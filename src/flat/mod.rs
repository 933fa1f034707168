//! Sorted associative containers backed by a single contiguous `Vec`.
//!
//! Items are kept in strictly ascending order under a comparator, so
//! lookups use binary search and insertion shifts the following items.
//! Any storage configuration accepted by [`Vec`](crate::Vec) may be used.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Bound, Range, RangeBounds};

use const_default::ConstDefault;

use crate::capacity::Index;
use crate::vec::index_panic;

mod map;
mod set;

pub use self::map::{
    FixedMap, FlatMap, Iter as MapIter, IterMut as MapIterMut, Keys, MapView, SboMap, SharedMap,
    Values, ValuesMut,
};
pub use self::set::{FixedSet, FlatSet, SboSet, SetView, SharedSet};

/// A total order used to arrange and look up items.
///
/// `L` is the stored key type and `R` the type of the key being compared
/// against it, which may differ to support heterogeneous lookup.
pub trait Compare<L: ?Sized, R: ?Sized = L> {
    /// Compare a stored key against another key.
    fn compare(&self, left: &L, right: &R) -> Ordering;
}

/// Ascending order according to `Ord`. Stored keys may be compared
/// against any type they borrow as, such as `str` for `String` keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl ConstDefault for Natural {
    const DEFAULT: Self = Natural;
}

impl<L, R> Compare<L, R> for Natural
where
    L: Borrow<R> + ?Sized,
    R: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, left: &L, right: &R) -> Ordering {
        left.borrow().cmp(right)
    }
}

/// Descending order according to `Ord`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Descending;

impl ConstDefault for Descending {
    const DEFAULT: Self = Descending;
}

impl<L, R> Compare<L, R> for Descending
where
    L: Borrow<R> + ?Sized,
    R: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, left: &L, right: &R) -> Ordering {
        right.cmp(left.borrow())
    }
}

/// Order keys with a comparison function.
#[derive(Clone, Copy)]
pub struct ByFn<F>(pub F);

impl<F> fmt::Debug for ByFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByFn")
    }
}

impl<T, F> Compare<T> for ByFn<F>
where
    T: ?Sized,
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        (self.0)(left, right)
    }
}

/// The first position whose key is not less than `key`.
#[inline]
pub(crate) fn lower_bound<T, K, Q, Cmp>(items: &[T], key: &Q, cmp: &Cmp, get: impl Fn(&T) -> &K) -> usize
where
    K: ?Sized,
    Q: ?Sized,
    Cmp: Compare<K, Q>,
{
    items.partition_point(|item| cmp.compare(get(item), key) == Ordering::Less)
}

/// The first position whose key is greater than `key`.
#[inline]
pub(crate) fn upper_bound<T, K, Q, Cmp>(items: &[T], key: &Q, cmp: &Cmp, get: impl Fn(&T) -> &K) -> usize
where
    K: ?Sized,
    Q: ?Sized,
    Cmp: Compare<K, Q>,
{
    items.partition_point(|item| cmp.compare(get(item), key) != Ordering::Greater)
}

/// Convert a position below `len` to the index type of the backing vector.
#[inline]
pub(crate) fn position<I: Index>(index: usize, len: usize) -> I {
    if index >= len {
        index_panic();
    }
    I::from_usize(index)
}

/// Convert a range of positions within `len` items to the index type of
/// the backing vector.
pub(crate) fn position_range<I: Index>(range: impl RangeBounds<usize>, len: usize) -> Range<I> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    if start > end || end > len {
        index_panic();
    }
    I::from_usize(start)..I::from_usize(end)
}

/// Sort the items and remove all but the first of each run of equivalent
/// keys, preserving the original relative order of the survivors.
pub(crate) fn sort_unique<T, K, Cmp>(items: &mut [T], cmp: &Cmp, get: impl Fn(&T) -> &K) -> usize
where
    K: ?Sized,
    Cmp: Compare<K>,
{
    // Insertion into the sorted prefix keeps the first of equivalent keys;
    // duplicates collect between the prefix and the read position.
    let mut sorted = 0;
    for read in 0..items.len() {
        let pos = lower_bound(&items[..sorted], get(&items[read]), cmp, &get);
        if pos < sorted && cmp.compare(get(&items[pos]), get(&items[read])) == Ordering::Equal {
            continue;
        }
        items.swap(sorted, read);
        items[pos..=sorted].rotate_right(1);
        sorted += 1;
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_heterogeneous() {
        let key = std::string::String::from("b");
        assert_eq!(Natural.compare(&key, "a"), Ordering::Greater);
        assert_eq!(Natural.compare(&key, "b"), Ordering::Equal);
        assert_eq!(Descending.compare(&1, &2), Ordering::Greater);
    }

    #[test]
    fn by_fn_order() {
        let cmp = ByFn(|a: &i32, b: &i32| a.abs().cmp(&b.abs()));
        assert_eq!(cmp.compare(&-3, &2), Ordering::Greater);
        assert_eq!(cmp.compare(&-2, &2), Ordering::Equal);
    }

    #[test]
    fn bounds() {
        let items = [1, 3, 3, 5];
        assert_eq!(lower_bound(&items, &3, &Natural, |i| i), 1);
        assert_eq!(upper_bound(&items, &3, &Natural, |i| i), 3);
        assert_eq!(lower_bound(&items, &6, &Natural, |i| i), 4);
        assert_eq!(upper_bound(&items, &0, &Natural, |i| i), 0);
    }

    #[test]
    fn positions_convert() {
        assert_eq!(position::<u8>(3, 4), 3u8);
        assert_eq!(position_range::<u8>(1.., 4), 1u8..4);
        assert_eq!(position_range::<u8>(..=2, 4), 0u8..3);
    }

    #[test]
    #[should_panic(expected = "Invalid element index")]
    fn position_range_past_end() {
        position_range::<u8>(2..300, 4);
    }

    #[test]
    fn sort_unique_keeps_first() {
        let mut items = [(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd'), (1, 'e')];
        let len = sort_unique(&mut items, &Natural, |i| &i.0);
        assert_eq!(len, 3);
        assert_eq!(items[..len], [(1, 'b'), (2, 'd'), (3, 'a')]);
    }
}
