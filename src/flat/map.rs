use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter;
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
use crate::vec::{index_panic, IntoIter, Vec};

/// A sorted map stored inline with a fixed capacity.
pub type FixedMap<K, V, const N: usize, Cmp = Natural> = FlatMap<K, V, Fixed<N>, Cmp>;

/// A sorted map over caller-owned memory.
pub type MapView<'a, K, V, Cmp = Natural> = FlatMap<K, V, Remote<'a>, Cmp>;

/// A sorted map stored inline until it exceeds `N` entries.
pub type SboMap<K, V, const N: usize, Cmp = Natural> = FlatMap<K, V, Sbo<N>, Cmp>;

/// A sorted map whose clones share storage until modified.
pub type SharedMap<K, V, Cmp = Natural> = FlatMap<K, V, Shared, Cmp>;

/// An iterator over the entries of a `FlatMap` in key order.
pub type Iter<'a, K, V> = iter::Map<slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> (&'a K, &'a V)>;

/// An iterator over the entries of a `FlatMap` with mutable values.
pub type IterMut<'a, K, V> =
    iter::Map<slice::IterMut<'a, (K, V)>, fn(&'a mut (K, V)) -> (&'a K, &'a mut V)>;

/// An iterator over the keys of a `FlatMap`.
pub type Keys<'a, K, V> = iter::Map<slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> &'a K>;

/// An iterator over the values of a `FlatMap`.
pub type Values<'a, K, V> = iter::Map<slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> &'a V>;

/// An iterator over mutable references to the values of a `FlatMap`.
pub type ValuesMut<'a, K, V> =
    iter::Map<slice::IterMut<'a, (K, V)>, fn(&'a mut (K, V)) -> &'a mut V>;

/// A map with unique keys, storing its entries in key order within a `Vec`.
///
/// Inserting a key which is already present leaves the map unchanged:
///
/// ```
/// use flex_flat::FlatMap;
///
/// let mut map = FlatMap::<&str, u32>::new();
/// map.insert("a", 10);
/// map.insert("b", 20);
/// assert_eq!(map.insert("a", 1), (0, false));
/// assert_eq!(map.as_slice(), &[("a", 10), ("b", 20)]);
/// ```
pub struct FlatMap<K, V, C: VecConfig = Global, Cmp = Natural> {
    vec: Vec<(K, V), C>,
    cmp: Cmp,
}

impl<K, V, C: VecConfigNew<(K, V)>, Cmp: ConstDefault> FlatMap<K, V, C, Cmp> {
    /// Construct a new, empty map.
    pub const fn new() -> Self {
        Self {
            vec: Vec::new(),
            cmp: Cmp::DEFAULT,
        }
    }
}

impl<K, V, C: VecConfigNew<(K, V)>, Cmp> FlatMap<K, V, C, Cmp> {
    /// Construct a new, empty map ordered by `cmp`.
    pub fn with_compare(cmp: Cmp) -> Self {
        Self {
            vec: Vec::new(),
            cmp,
        }
    }

    /// Construct a new, empty map with at least the specified capacity.
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

impl<K, V, C: VecConfig, Cmp> FlatMap<K, V, C, Cmp> {
    /// Construct a new, empty map in an allocation target.
    pub fn new_in<A>(alloc_in: A) -> Self
    where
        A: VecNewIn<(K, V), Config = C>,
        Cmp: Default,
    {
        Self {
            vec: Vec::new_in(alloc_in),
            cmp: Cmp::default(),
        }
    }

    /// Construct a new, empty map in an allocation target, ordered by `cmp`.
    pub fn with_compare_in<A>(cmp: Cmp, alloc_in: A) -> Self
    where
        A: VecNewIn<(K, V), Config = C>,
    {
        Self {
            vec: Vec::new_in(alloc_in),
            cmp,
        }
    }

    /// Build a map from a vector of entries. The entries are sorted by key,
    /// and only the first entry for any key is kept.
    pub fn from_vec(vec: Vec<(K, V), C>) -> Self
    where
        Cmp: Compare<K> + Default,
    {
        Self::from_vec_with(vec, Cmp::default())
    }

    /// Build a map from a vector of entries, ordered by `cmp`.
    pub fn from_vec_with(mut vec: Vec<(K, V), C>, cmp: Cmp) -> Self
    where
        Cmp: Compare<K>,
    {
        let len = sort_unique(vec.as_mut_slice(), &cmp, |entry| &entry.0);
        vec.truncate(C::Index::from_usize(len));
        Self { vec, cmp }
    }

    /// Access the underlying vector of entries.
    #[inline]
    pub fn as_vec(&self) -> &Vec<(K, V), C> {
        &self.vec
    }

    /// Unwrap the underlying vector of entries.
    #[inline]
    pub fn into_vec(self) -> Vec<(K, V), C> {
        self.vec
    }

    /// Access the entries as a slice in key order.
    #[inline]
    pub fn as_slice(&self) -> &[(K, V)] {
        self.vec.as_slice()
    }

    /// Access the comparator.
    #[inline]
    pub fn comparator(&self) -> &Cmp {
        &self.cmp
    }

    /// Iterate the entries in key order.
    pub fn iter<'a>(&'a self) -> Iter<'a, K, V> {
        let f: fn(&'a (K, V)) -> (&'a K, &'a V) = |(k, v)| (k, v);
        self.vec.iter().map(f)
    }

    /// Iterate the entries in key order, with mutable access to the values.
    pub fn iter_mut<'a>(&'a mut self) -> IterMut<'a, K, V> {
        let f: fn(&'a mut (K, V)) -> (&'a K, &'a mut V) = |(k, v)| (&*k, v);
        self.vec.iter_mut().map(f)
    }

    /// Iterate the keys in order.
    pub fn keys<'a>(&'a self) -> Keys<'a, K, V> {
        let f: fn(&'a (K, V)) -> &'a K = |(k, _)| k;
        self.vec.iter().map(f)
    }

    /// Iterate the values in key order.
    pub fn values<'a>(&'a self) -> Values<'a, K, V> {
        let f: fn(&'a (K, V)) -> &'a V = |(_, v)| v;
        self.vec.iter().map(f)
    }

    /// Iterate mutable references to the values in key order.
    pub fn values_mut<'a>(&'a mut self) -> ValuesMut<'a, K, V> {
        let f: fn(&'a mut (K, V)) -> &'a mut V = |(_, v)| v;
        self.vec.iter_mut().map(f)
    }

    /// The number of entries in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len().to_usize()
    }

    /// Determine whether the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// The number of entries the map can hold without growing its storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.vec.capacity().to_usize()
    }

    /// Reserve storage for at least `additional` more entries.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.vec.reserve(additional)
    }

    /// Try to reserve storage for at least `additional` more entries.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), StorageError> {
        self.vec.try_reserve(additional)
    }

    /// Reduce the capacity of the map to its length.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.vec.shrink_to_fit()
    }

    /// Remove all entries.
    #[inline]
    pub fn clear(&mut self) {
        self.vec.clear()
    }

    /// The entry with the smallest key.
    #[inline]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.vec.first().map(|(k, v)| (k, v))
    }

    /// The entry with the largest key.
    #[inline]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.vec.last().map(|(k, v)| (k, v))
    }

    /// The position of the first entry whose key is not less than `key`.
    #[inline]
    pub fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        lower_bound(self.vec.as_slice(), key, &self.cmp, |entry| &entry.0)
    }

    /// The position of the first entry whose key is greater than `key`.
    #[inline]
    pub fn upper_bound<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        upper_bound(self.vec.as_slice(), key, &self.cmp, |entry| &entry.0)
    }

    /// The range of positions holding entries with keys equivalent to `key`.
    #[inline]
    pub fn equal_range<Q>(&self, key: &Q) -> Range<usize>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        self.lower_bound(key)..self.upper_bound(key)
    }

    #[inline]
    fn holds_at<Q>(&self, index: usize, key: &Q) -> bool
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        match self.vec.get(index) {
            Some((k, _)) => self.cmp.compare(k, key) == Ordering::Equal,
            None => false,
        }
    }

    /// The position of the entry whose key is equivalent to `key`, if any.
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        let index = self.lower_bound(key);
        self.holds_at(index, key).then_some(index)
    }

    /// Get a reference to the value for `key`, if present.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        self.find(key).map(|index| &self.vec[index].1)
    }

    /// Get a mutable reference to the value for `key`, if present.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        let index = self.find(key)?;
        Some(&mut self.vec[index].1)
    }

    /// Get the stored key and the value for `key`, if present.
    #[inline]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        self.find(key).map(|index| {
            let (k, v) = &self.vec[index];
            (k, v)
        })
    }

    /// Determine whether an entry for `key` is present.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        self.find(key).is_some()
    }

    /// The number of entries for `key`, either zero or one.
    #[inline]
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        usize::from(self.contains_key(key))
    }

    /// Insert an entry, returning its position and whether it was added.
    /// If the key is already present, the map is unchanged and the new
    /// entry is dropped.
    ///
    /// # Panics
    /// Panics if the storage cannot hold the new entry.
    pub fn insert(&mut self, key: K, value: V) -> (usize, bool)
    where
        Cmp: Compare<K>,
    {
        self.try_insert(key, value).or_panic()
    }

    /// Try to insert an entry. If the storage cannot hold it, the map is
    /// unchanged and the entry is returned in the error.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(usize, bool), UpdateError<(K, V)>>
    where
        Cmp: Compare<K>,
    {
        let index = self.lower_bound(&key);
        if self.holds_at(index, &key) {
            return Ok((index, false));
        }
        self.vec.try_insert(C::Index::from_usize(index), (key, value))?;
        Ok((index, true))
    }

    /// Insert an entry, replacing the value if the key is already present.
    /// Returns the position of the entry and whether it was added.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (usize, bool)
    where
        Cmp: Compare<K>,
    {
        let index = self.lower_bound(&key);
        if self.holds_at(index, &key) {
            self.vec[index].1 = value;
            (index, false)
        } else {
            self.vec.insert(C::Index::from_usize(index), (key, value));
            (index, true)
        }
    }

    /// Insert an entry for `key` with a value produced by `f`, unless the
    /// key is already present. The value is only constructed when inserted.
    pub fn try_emplace<F>(&mut self, key: K, f: F) -> (usize, bool)
    where
        Cmp: Compare<K>,
        F: FnOnce() -> V,
    {
        let index = self.lower_bound(&key);
        if self.holds_at(index, &key) {
            (index, false)
        } else {
            self.vec.insert(C::Index::from_usize(index), (key, f()));
            (index, true)
        }
    }

    /// Insert an entry, using `hint` as the expected position. A correct
    /// hint avoids the binary search.
    pub fn emplace_hint(&mut self, hint: usize, key: K, value: V) -> (usize, bool)
    where
        Cmp: Compare<K>,
    {
        let len = self.len();
        if hint <= len {
            let after_prev = hint == 0 || {
                let prev = &self.vec[hint - 1].0;
                match self.cmp.compare(prev, &key) {
                    Ordering::Less => true,
                    Ordering::Equal => return (hint - 1, false),
                    Ordering::Greater => false,
                }
            };
            if after_prev && (hint == len || self.cmp.compare(&self.vec[hint].0, &key).is_ge()) {
                if self.holds_at(hint, &key) {
                    return (hint, false);
                }
                self.vec.insert(C::Index::from_usize(hint), (key, value));
                return (hint, true);
            }
        }
        self.insert(key, value)
    }

    /// Get a mutable reference to the value for `key`, inserting the
    /// value produced by `f` if the key is not present.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        Cmp: Compare<K>,
        F: FnOnce() -> V,
    {
        let (index, _) = self.try_emplace(key, f);
        &mut self.vec[index].1
    }

    /// Get a mutable reference to the value for `key`, inserting a default
    /// value if the key is not present.
    #[inline]
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        Cmp: Compare<K>,
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Remove the entry for `key`, returning the value if it was present.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove and return the entry for `key`, if present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        Cmp: Compare<K, Q>,
    {
        let index = self.find(key)?;
        Some(self.vec.remove(C::Index::from_usize(index)))
    }

    /// Remove and return the entry at position `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn erase_at(&mut self, index: usize) -> (K, V) {
        self.vec.remove(position(index, self.len()))
    }

    /// Remove the entries in a range of positions.
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

    /// Retain only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.vec.retain_mut(|(k, v)| f(k, v))
    }

    /// Exchange the contents of two maps.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        self.vec.swap_with(&mut other.vec);
        mem::swap(&mut self.cmp, &mut other.cmp);
    }
}

impl<K, V, C, Cmp> Clone for FlatMap<K, V, C, Cmp>
where
    K: Clone,
    V: Clone,
    C: VecConfigSpawn<(K, V)>,
    Cmp: Clone,
{
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

impl<K: fmt::Debug, V: fmt::Debug, C: VecConfig, Cmp> fmt::Debug for FlatMap<K, V, C, Cmp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: VecConfigNew<(K, V)>, Cmp: ConstDefault> Default for FlatMap<K, V, C, Cmp> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: VecConfig, Cmp: Compare<K>> Extend<(K, V)> for FlatMap<K, V, C, Cmp> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C, Cmp> FromIterator<(K, V)> for FlatMap<K, V, C, Cmp>
where
    C: VecConfigNew<(K, V)>,
    Cmp: Compare<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_vec(Vec::from_iter(iter))
    }
}

impl<K, V, C: VecConfig, Cmp: Compare<K> + Default> From<Vec<(K, V), C>>
    for FlatMap<K, V, C, Cmp>
{
    #[inline]
    fn from(vec: Vec<(K, V), C>) -> Self {
        Self::from_vec(vec)
    }
}

impl<K: Hash, V: Hash, C: VecConfig, Cmp> Hash for FlatMap<K, V, C, Cmp> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vec.hash(state)
    }
}

impl<K, V, Q, C, Cmp> core::ops::Index<&Q> for FlatMap<K, V, C, Cmp>
where
    Q: ?Sized,
    C: VecConfig,
    Cmp: Compare<K, Q>,
{
    type Output = V;

    /// Access the value for `key`.
    ///
    /// # Panics
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => index_panic(),
        }
    }
}

impl<K, V, C: VecConfig, Cmp> IntoIterator for FlatMap<K, V, C, Cmp> {
    type Item = (K, V);
    type IntoIter = IntoIter<C::Buffer<(K, V)>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.vec.into_iter()
    }
}

impl<'a, K, V, C: VecConfig, Cmp> IntoIterator for &'a FlatMap<K, V, C, Cmp> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C: VecConfig, Cmp> IntoIterator for &'a mut FlatMap<K, V, C, Cmp> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C1, C2, Cmp1, Cmp2> PartialEq<FlatMap<K, V, C2, Cmp2>> for FlatMap<K, V, C1, Cmp1>
where
    K: PartialEq,
    V: PartialEq,
    C1: VecConfig,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &FlatMap<K, V, C2, Cmp2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<K: Eq, V: Eq, C: VecConfig, Cmp> Eq for FlatMap<K, V, C, Cmp> {}
