use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem;
use core::ops::{Range, RangeBounds};
use core::slice;

use const_default::ConstDefault;

use super::{lower_bound, position, position_range, sort_unique, upper_bound, Compare, Natural};
use crate::alloc::Global;
use crate::capacity::Index;
use crate::error::{OrPanic, StorageError, UpdateError};
use crate::storage::{Fixed, Remote, Sbo, Shared};
use crate::vec::config::{VecConfig, VecConfigNew, VecConfigSpawn, VecNewIn};
use crate::vec::{IntoIter, Vec};

/// A sorted set stored inline with a fixed capacity.
pub type FixedSet<T, const N: usize, Cmp = Natural> = FlatSet<T, Fixed<N>, Cmp>;

/// A sorted set over caller-owned memory.
pub type SetView<'a, T, Cmp = Natural> = FlatSet<T, Remote<'a>, Cmp>;

/// A sorted set stored inline until it exceeds `N` items.
pub type SboSet<T, const N: usize, Cmp = Natural> = FlatSet<T, Sbo<N>, Cmp>;

/// A sorted set whose clones share storage until modified.
pub type SharedSet<T, Cmp = Natural> = FlatSet<T, Shared, Cmp>;

/// A set of unique items kept in ascending order within a `Vec`.
///
/// ```
/// use flex_flat::FlatSet;
///
/// let mut set = FlatSet::<u32>::new();
/// assert_eq!(set.insert(5), (0, true));
/// assert_eq!(set.insert(2), (0, true));
/// assert_eq!(set.insert(5), (1, false));
/// assert_eq!(set.as_slice(), &[2, 5]);
/// ```
pub struct FlatSet<T, C: VecConfig = Global, Cmp = Natural> {
    vec: Vec<T, C>,
    cmp: Cmp,
}

impl<T, C: VecConfigNew<T>, Cmp: ConstDefault> FlatSet<T, C, Cmp> {
    /// Construct a new, empty set.
    pub const fn new() -> Self {
        Self {
            vec: Vec::new(),
            cmp: Cmp::DEFAULT,
        }
    }
}

impl<T, C: VecConfigNew<T>, Cmp> FlatSet<T, C, Cmp> {
    /// Construct a new, empty set ordered by `cmp`.
    pub fn with_compare(cmp: Cmp) -> Self {
        Self {
            vec: Vec::new(),
            cmp,
        }
    }

    /// Construct a new, empty set with at least the specified capacity.
    pub fn with_capacity(capacity: C::Index) -> Self
    where
        Cmp: Default,
    {
        Self {
            vec: Vec::with_capacity(capacity),
            cmp: Cmp::default(),
        }
    }
}

impl<T, C: VecConfig, Cmp> FlatSet<T, C, Cmp> {
    /// Construct a new, empty set in an allocation target.
    pub fn new_in<A>(alloc_in: A) -> Self
    where
        A: VecNewIn<T, Config = C>,
        Cmp: Default,
    {
        Self {
            vec: Vec::new_in(alloc_in),
            cmp: Cmp::default(),
        }
    }

    /// Construct a new, empty set in an allocation target, ordered by `cmp`.
    pub fn with_compare_in<A>(cmp: Cmp, alloc_in: A) -> Self
    where
        A: VecNewIn<T, Config = C>,
    {
        Self {
            vec: Vec::new_in(alloc_in),
            cmp,
        }
    }

    /// Build a set from the items of a vector. The items are sorted, and
    /// only the first of any equivalent items is kept.
    pub fn from_vec(vec: Vec<T, C>) -> Self
    where
        Cmp: Compare<T> + Default,
    {
        Self::from_vec_with(vec, Cmp::default())
    }

    /// Build a set from the items of a vector, ordered by `cmp`.
    pub fn from_vec_with(mut vec: Vec<T, C>, cmp: Cmp) -> Self
    where
        Cmp: Compare<T>,
    {
        let len = sort_unique(vec.as_mut_slice(), &cmp, |item| item);
        vec.truncate(C::Index::from_usize(len));
        Self { vec, cmp }
    }

    /// Access the underlying vector.
    #[inline]
    pub fn as_vec(&self) -> &Vec<T, C> {
        &self.vec
    }

    /// Unwrap the underlying vector.
    #[inline]
    pub fn into_vec(self) -> Vec<T, C> {
        self.vec
    }

    /// Access the items as a slice in ascending order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.vec.as_slice()
    }

    /// Access the comparator.
    #[inline]
    pub fn comparator(&self) -> &Cmp {
        &self.cmp
    }

    /// Iterate the items in ascending order. Use `.rev()` for descending order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.vec.iter()
    }

    /// The number of items in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len().to_usize()
    }

    /// Determine whether the set holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// The number of items the set can hold without growing its storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.vec.capacity().to_usize()
    }

    /// Reserve storage for at least `additional` more items.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.vec.reserve(additional)
    }

    /// Try to reserve storage for at least `additional` more items.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), StorageError> {
        self.vec.try_reserve(additional)
    }

    /// Reduce the capacity of the set to its length.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.vec.shrink_to_fit()
    }

    /// Remove all items.
    #[inline]
    pub fn clear(&mut self) {
        self.vec.clear()
    }

    /// The smallest item.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.vec.first()
    }

    /// The largest item.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.vec.last()
    }

    /// The position of the first item not less than `key`.
    #[inline]
    pub fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        lower_bound(self.vec.as_slice(), key, &self.cmp, |item| item)
    }

    /// The position of the first item greater than `key`.
    #[inline]
    pub fn upper_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        upper_bound(self.vec.as_slice(), key, &self.cmp, |item| item)
    }

    /// The range of positions holding items equivalent to `key`.
    #[inline]
    pub fn equal_range<Q>(&self, key: &Q) -> Range<usize>
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        self.lower_bound(key)..self.upper_bound(key)
    }

    #[inline]
    fn holds_at<Q>(&self, index: usize, key: &Q) -> bool
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        match self.vec.get(index) {
            Some(item) => self.cmp.compare(item, key) == Ordering::Equal,
            None => false,
        }
    }

    /// The position of the item equivalent to `key`, if any.
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        let index = self.lower_bound(key);
        self.holds_at(index, key).then_some(index)
    }

    /// Get a reference to the item equivalent to `key`, if any.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        self.find(key).map(|index| &self.vec[index])
    }

    /// Determine whether an item equivalent to `key` is present.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        self.find(key).is_some()
    }

    /// The number of items equivalent to `key`, either zero or one.
    #[inline]
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        usize::from(self.contains(key))
    }

    /// Insert an item, returning its position and whether it was added.
    /// If an equivalent item is present the set is unchanged and `value`
    /// is dropped.
    ///
    /// # Panics
    /// Panics if the storage cannot hold the new item.
    pub fn insert(&mut self, value: T) -> (usize, bool)
    where
        Cmp: Compare<T>,
    {
        self.try_insert(value).or_panic()
    }

    /// Try to insert an item. If the storage cannot hold it, the set is
    /// unchanged and the item is returned in the error.
    pub fn try_insert(&mut self, value: T) -> Result<(usize, bool), UpdateError<T>>
    where
        Cmp: Compare<T>,
    {
        let index = self.lower_bound(&value);
        self.insert_at(index, value)
    }

    fn insert_at(&mut self, index: usize, value: T) -> Result<(usize, bool), UpdateError<T>>
    where
        Cmp: Compare<T>,
    {
        if self.holds_at(index, &value) {
            return Ok((index, false));
        }
        self.vec.try_insert(C::Index::from_usize(index), value)?;
        Ok((index, true))
    }

    /// Insert an item, using `hint` as the expected position. A correct
    /// hint avoids the binary search.
    pub fn emplace_hint(&mut self, hint: usize, value: T) -> (usize, bool)
    where
        Cmp: Compare<T>,
    {
        let len = self.len();
        if hint <= len {
            let after_prev = hint == 0 || {
                let prev = &self.vec[hint - 1];
                match self.cmp.compare(prev, &value) {
                    Ordering::Less => true,
                    Ordering::Equal => return (hint - 1, false),
                    Ordering::Greater => false,
                }
            };
            if after_prev && (hint == len || self.cmp.compare(&self.vec[hint], &value).is_ge()) {
                return self.insert_at(hint, value).or_panic();
            }
        }
        self.insert(value)
    }

    /// Remove and return the item equivalent to `key`, if any.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        let index = self.find(key)?;
        Some(self.vec.remove(C::Index::from_usize(index)))
    }

    /// Remove the item equivalent to `key`, returning whether it was present.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: ?Sized,
        Cmp: Compare<T, Q>,
    {
        self.take(key).is_some()
    }

    /// Remove and return the item at position `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn erase_at(&mut self, index: usize) -> T {
        self.vec.remove(position(index, self.len()))
    }

    /// Remove the items in a range of positions.
    #[inline]
    ///
    /// # Panics
    /// Panics if the range is out of bounds.
    pub fn erase_range<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
    {
        let range: Range<C::Index> = position_range(range, self.len());
        self.vec.erase(range)
    }

    /// Remove and return the smallest item.
    #[inline]
    pub fn pop_first(&mut self) -> Option<T> {
        if self.vec.is_empty() {
            None
        } else {
            Some(self.vec.remove(C::Index::ZERO))
        }
    }

    /// Remove and return the largest item.
    #[inline]
    pub fn pop_last(&mut self) -> Option<T> {
        self.vec.pop()
    }

    /// Retain only the items for which `f` returns `true`.
    #[inline]
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.vec.retain(f)
    }

    /// Exchange the contents of two sets.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        self.vec.swap_with(&mut other.vec);
        mem::swap(&mut self.cmp, &mut other.cmp);
    }
}

impl<T: Clone, C: VecConfigSpawn<T>, Cmp: Clone> Clone for FlatSet<T, C, Cmp> {
    fn clone(&self) -> Self {
        Self {
            vec: self.vec.clone(),
            cmp: self.cmp.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.vec.clone_from(&source.vec);
        self.cmp.clone_from(&source.cmp);
    }
}

impl<T: fmt::Debug, C: VecConfig, Cmp> fmt::Debug for FlatSet<T, C, Cmp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.vec.iter()).finish()
    }
}

impl<T, C: VecConfigNew<T>, Cmp: ConstDefault> Default for FlatSet<T, C, Cmp> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: VecConfig, Cmp: Compare<T>> Extend<T> for FlatSet<T, C, Cmp> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T, C: VecConfigNew<T>, Cmp: Compare<T> + Default> FromIterator<T> for FlatSet<T, C, Cmp> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(Vec::from_iter(iter))
    }
}

impl<T, C: VecConfig, Cmp: Compare<T> + Default> From<Vec<T, C>> for FlatSet<T, C, Cmp> {
    #[inline]
    fn from(vec: Vec<T, C>) -> Self {
        Self::from_vec(vec)
    }
}

impl<T: Hash, C: VecConfig, Cmp> Hash for FlatSet<T, C, Cmp> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vec.hash(state)
    }
}

impl<T, C: VecConfig, Cmp> IntoIterator for FlatSet<T, C, Cmp> {
    type Item = T;
    type IntoIter = IntoIter<C::Buffer<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.vec.into_iter()
    }
}

impl<'a, T, C: VecConfig, Cmp> IntoIterator for &'a FlatSet<T, C, Cmp> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.vec.iter()
    }
}

impl<T, C1, C2, Cmp1, Cmp2> PartialEq<FlatSet<T, C2, Cmp2>> for FlatSet<T, C1, Cmp1>
where
    T: PartialEq,
    C1: VecConfig,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &FlatSet<T, C2, Cmp2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, C: VecConfig, Cmp> Eq for FlatSet<T, C, Cmp> {}
