//! Support for contiguous growable arrays over pluggable storage.

use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::repeat;
use core::mem::{self, ManuallyDrop, MaybeUninit};
use core::ops::{Bound, Deref, DerefMut, Range, RangeBounds};
use core::ptr::{self, NonNull};
use core::slice;

use crate::alloc::{Allocator, AllocatorDefault, Global};
use crate::capacity::{Grow, Index};
use crate::error::{OrPanic, StorageError, UpdateError};
use crate::storage::insert::Inserter;
use crate::storage::slots;
use crate::storage::{Fixed, RawBuffer, ReleaseFn, Remote, RemoteBuffer, Sbo, Shared, SharedBuffer};

use self::buffer::VecBuffer;
use self::config::{VecConfig, VecConfigAlloc, VecConfigNew, VecConfigSpawn, VecNewIn};

pub use self::{drain::Drain, into_iter::IntoIter};

#[macro_use]
mod macros;

pub mod buffer;
pub mod config;

mod drain;
mod into_iter;

/// A `Vec` which stores its contained data inline, using no external allocation.
pub type FixedVec<T, const N: usize> = Vec<T, Fixed<N>>;

/// A `Vec` which stores up to `N` items inline before moving to the heap.
pub type SboVec<T, const N: usize> = Vec<T, Sbo<N>>;

/// A `Vec` which manages items in caller-owned memory.
pub type RemoteVec<'a, T> = Vec<T, Remote<'a>>;

/// A `Vec` whose clones share one buffer until modified.
pub type SharedVec<T> = Vec<T, Shared>;

#[cfg(feature = "zeroize")]
/// A `Vec` which automatically zeroizes its buffer when dropped.
pub type ZeroizingVec<T> = Vec<T, crate::alloc::ZeroizingAlloc<Global>>;

#[cold]
#[inline(never)]
pub(crate) fn index_panic() -> ! {
    panic!("Invalid element index");
}

/// Resolve a range of positions against the current length. The result is
/// not checked against the length.
#[inline]
fn resolve_range<I: Index>(range: impl RangeBounds<I>, length: I) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(first) => first.to_usize(),
        Bound::Excluded(before) => before.to_usize().saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(last) => last.to_usize().saturating_add(1),
        Bound::Excluded(past) => past.to_usize(),
        Bound::Unbounded => length.to_usize(),
    };
    start..end
}

/// The capacity needed for `count` items, if the index type can hold it.
#[inline]
fn capacity_for<I: Index>(count: usize) -> Result<I, StorageError> {
    I::try_from_usize(count).ok_or(StorageError::CapacityLimit)
}

/// Collect the items of an array into a heap vector.
#[cfg(feature = "alloc")]
#[inline]
pub fn from_array<T, const N: usize>(data: [T; N]) -> Vec<T> {
    from_array_in(data, Global)
}

/// Collect the items of an array into a vector created by `alloc_in`.
#[inline]
pub fn from_array_in<T, C, const N: usize>(data: [T; N], alloc_in: C) -> Vec<T, C::Config>
where
    C: VecNewIn<T>,
{
    Vec::from_iter_in(data, alloc_in)
}

/// Fill a heap vector with `count` clones of `elem`.
#[cfg(feature = "alloc")]
#[inline]
pub fn from_elem<T: Clone>(elem: T, count: usize) -> Vec<T> {
    from_elem_in(elem, count, Global)
}

/// Fill a vector created by `alloc_in` with `count` clones of `elem`.
#[inline]
pub fn from_elem_in<T, C>(elem: T, count: usize, alloc_in: C) -> Vec<T, C::Config>
where
    T: Clone,
    C: VecNewIn<T>,
{
    Vec::from_iter_in(repeat(elem).take(count), alloc_in)
}

/// A growable run of items, kept contiguous in the storage selected by `C`.
///
/// `C` is either an allocator such as [`Global`], for plain heap storage,
/// or one of the policies [`Fixed`], [`Sbo`], [`Remote`] and [`Shared`].
/// The index type of the configuration bounds the length and capacity.
#[repr(transparent)]
pub struct Vec<T, C: VecConfig = Global> {
    buffer: C::Buffer<T>,
}

impl<T, C: VecConfigNew<T>> Vec<T, C> {
    /// An empty vector. Nothing is allocated until the first item arrives.
    ///
    /// ```
    /// # #![allow(unused_mut)]
    /// use flex_flat::{Fixed, Vec};
    /// let mut vec: Vec<i32, Fixed<4>> = Vec::new();
    /// assert_eq!(vec.capacity(), 4);
    /// ```
    pub const fn new() -> Self {
        Self {
            buffer: C::EMPTY_BUFFER,
        }
    }

    /// An empty vector with room for at least `capacity` items.
    ///
    /// # Panics
    /// Panics if the storage cannot provide the capacity.
    pub fn with_capacity(capacity: C::Index) -> Self {
        Self::try_with_capacity(capacity).or_panic()
    }

    /// Fallible form of [`Vec::with_capacity`].
    pub fn try_with_capacity(capacity: C::Index) -> Result<Self, StorageError> {
        C::buffer_try_new(capacity, false).map(|buffer| Self { buffer })
    }

    /// A vector holding clones of `data`.
    pub fn from_slice(data: &[T]) -> Self
    where
        T: Clone,
    {
        Self::try_from_slice(data).or_panic()
    }

    /// Fallible form of [`Vec::from_slice`].
    pub fn try_from_slice(data: &[T]) -> Result<Self, StorageError>
    where
        T: Clone,
    {
        let mut vec = Self::try_with_capacity(capacity_for(data.len())?)?;
        unsafe { vec.extend_unchecked(data) };
        Ok(vec)
    }
}

impl<T, C: VecConfig> Vec<T, C> {
    /// An empty vector whose storage comes from `alloc_in`: an allocator,
    /// or a mutable reference to caller-owned slots.
    pub fn new_in<A>(alloc_in: A) -> Self
    where
        A: VecNewIn<T, Config = C>,
    {
        Self::try_new_in(alloc_in).or_panic()
    }

    /// Fallible form of [`Vec::new_in`].
    pub fn try_new_in<A>(alloc_in: A) -> Result<Self, StorageError>
    where
        A: VecNewIn<T, Config = C>,
    {
        Self::try_with_capacity_in(C::Index::ZERO, alloc_in)
    }

    /// Like [`Vec::new_in`], reserving room for at least `capacity` items.
    pub fn with_capacity_in<A>(capacity: C::Index, alloc_in: A) -> Self
    where
        A: VecNewIn<T, Config = C>,
    {
        Self::try_with_capacity_in(capacity, alloc_in).or_panic()
    }

    /// Fallible form of [`Vec::with_capacity_in`].
    pub fn try_with_capacity_in<A>(capacity: C::Index, alloc_in: A) -> Result<Self, StorageError>
    where
        A: VecNewIn<T, Config = C>,
    {
        A::buffer_try_new_in(alloc_in, capacity, false).map(|buffer| Self { buffer })
    }

    /// Like [`Vec::new_in`], holding clones of `data`.
    pub fn from_slice_in<A>(data: &[T], alloc_in: A) -> Self
    where
        T: Clone,
        A: VecNewIn<T, Config = C>,
    {
        Self::try_from_slice_in(data, alloc_in).or_panic()
    }

    /// Fallible form of [`Vec::from_slice_in`].
    pub fn try_from_slice_in<A>(data: &[T], alloc_in: A) -> Result<Self, StorageError>
    where
        T: Clone,
        A: VecNewIn<T, Config = C>,
    {
        let mut vec = Self::try_with_capacity_in(capacity_for(data.len())?, alloc_in)?;
        unsafe { vec.extend_unchecked(data) };
        Ok(vec)
    }

    /// Like [`Vec::new_in`], collecting the items of `iter`.
    ///
    /// # Panics
    /// Panics if the storage cannot hold every item.
    pub fn from_iter_in<I, A>(iter: I, alloc_in: A) -> Self
    where
        I: IntoIterator<Item = T>,
        A: VecNewIn<T, Config = C>,
    {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0.min(C::Index::MAX_USIZE);
        let mut vec = Self::with_capacity_in(C::Index::from_usize(hint), alloc_in);
        vec.extend(iter);
        vec
    }
}

impl<T, C: VecConfig> Vec<T, C> {
    #[inline]
    fn into_inner(self) -> C::Buffer<T> {
        let me = ManuallyDrop::new(self);
        unsafe { ptr::read(&me.buffer) }
    }
}

impl<T, C: VecConfigAlloc<T>> Vec<T, C> {
    #[inline]
    pub(crate) fn into_parts(self) -> (NonNull<T>, C::Index, C::Index, C::Alloc) {
        C::buffer_into_parts(self.into_inner())
    }

    /// # Safety
    /// `data` must be a block from `alloc` with room for `capacity` items,
    /// and the first `length` items must be initialized.
    #[inline]
    pub(crate) unsafe fn from_parts(
        data: NonNull<T>,
        length: C::Index,
        capacity: C::Index,
        alloc: C::Alloc,
    ) -> Self {
        Self {
            buffer: C::buffer_from_parts(data, length, capacity, alloc),
        }
    }
}

#[cfg(feature = "alloc")]
impl<T, C> Vec<T, C>
where
    C: VecConfigAlloc<T, Alloc = Global, Index = usize>,
{
    /// Convert into a boxed slice, releasing any excess capacity.
    pub fn into_boxed_slice(mut self) -> alloc_crate::boxed::Box<[T]> {
        self.shrink_to_fit();
        let (data, length, _capacity, _alloc) = self.into_parts();
        let data = ptr::slice_from_raw_parts_mut(data.as_ptr(), length);
        unsafe { alloc_crate::boxed::Box::from_raw(data) }
    }
}

impl<T, const N: usize, A: Allocator> Vec<T, Sbo<N, A>> {
    /// Determine whether the items have been moved from the inline buffer
    /// to the heap.
    #[inline]
    pub fn is_spilled(&self) -> bool {
        self.buffer.is_spilled()
    }
}

impl<'a, T> Vec<T, Remote<'a>> {
    /// Manage items within a caller-supplied buffer of uninitialized slots.
    /// The capacity of the vector is the length of `buf`.
    #[inline]
    pub fn from_uninit(buf: &'a mut [MaybeUninit<T>]) -> Self {
        Self {
            buffer: RemoteBuffer::from_uninit(buf),
        }
    }

    /// Manage items within caller-supplied memory with room for `capacity`
    /// items, of which the first `length` are initialized. When the vector
    /// is dropped, the items are dropped and then `release` is invoked with
    /// the data pointer and capacity.
    ///
    /// # Safety
    /// `data` must be valid for reads and writes of `capacity` items for the
    /// lifetime `'a`, and the first `length` items must be initialized.
    #[inline]
    pub unsafe fn from_raw_parts(
        data: NonNull<T>,
        capacity: usize,
        length: usize,
        release: Option<ReleaseFn<T>>,
    ) -> Self {
        assert!(length <= capacity, "Initial length exceeds capacity");
        Self {
            buffer: RemoteBuffer::from_raw_parts(data, capacity, length, release),
        }
    }

    /// Give up management of the caller-supplied memory, returning it along
    /// with the number of initialized items at its start. No items are
    /// dropped and the release callback is not invoked.
    #[inline]
    pub fn detach(self) -> (&'a mut [MaybeUninit<T>], usize) {
        self.into_inner().detach()
    }
}

impl<T: Clone, A: AllocatorDefault> Vec<T, Shared<A>> {
    /// Construct a new shared vector with the specified capacity, invoking
    /// `release` with the data pointer and capacity when the last handle
    /// to the buffer is dropped.
    pub fn with_release(capacity: usize, release: ReleaseFn<T>) -> Self {
        Self::try_with_release(capacity, release).or_panic()
    }

    /// Try to construct a new shared vector with a release callback.
    pub fn try_with_release(capacity: usize, release: ReleaseFn<T>) -> Result<Self, StorageError> {
        Ok(Self {
            buffer: SharedBuffer::allocate_in(
                capacity,
                Some(release),
                A::DEFAULT,
                slots::clone_slots::<T>,
            )?,
        })
    }
}

impl<T, A: Allocator + Clone> Vec<T, Shared<A>> {
    /// The number of vectors sharing this buffer.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.buffer.ref_count()
    }

    /// Determine whether this vector is the only owner of its buffer.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.buffer.is_unique()
    }

    /// Copy the items into a private buffer if the current one is shared.
    pub fn make_unique(&mut self) {
        self.buffer.make_unique().or_panic();
    }
}

impl<T, C: VecConfig> Vec<T, C> {
    /// Get a pointer to the first item. Shared buffers are not copied.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.data_ptr()
    }

    /// Get a mutable pointer to the first item.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.data_ptr_mut()
    }

    /// Access the items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buffer.as_slice()
    }

    /// Access the items as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buffer.as_mut_slice()
    }

    /// The number of items the vector can hold without growing its storage.
    #[inline]
    pub fn capacity(&self) -> C::Index {
        self.buffer.capacity()
    }

    /// Remove and drop all items, retaining the storage.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(C::Index::ZERO);
    }

    /// Determine whether the vector holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == C::Index::ZERO
    }

    /// The number of items in the vector.
    #[inline]
    pub fn len(&self) -> C::Index {
        self.buffer.length()
    }

    /// Force the length of the vector.
    ///
    /// # Safety
    /// `length` must not exceed the capacity, and the items in `[0, length)`
    /// must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, length: C::Index) {
        debug_assert!(length <= self.buffer.capacity(), "length exceeds capacity");
        self.buffer.set_length(length)
    }

    /// Reserve storage for at least `additional` more items. Growable
    /// storage at least doubles its capacity.
    ///
    /// # Panics
    /// Panics if the storage cannot provide the requested capacity.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.try_reserve(additional).or_panic();
    }

    /// Try to reserve storage for at least `additional` more items.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), StorageError> {
        self._try_reserve(additional, false)
    }

    /// Reserve storage for exactly `additional` more items.
    #[inline]
    pub fn reserve_exact(&mut self, additional: usize) {
        self.try_reserve_exact(additional).or_panic();
    }

    /// Try to reserve storage for exactly `additional` more items.
    #[inline]
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), StorageError> {
        self._try_reserve(additional, true)
    }

    fn _try_reserve(&mut self, additional: usize, exact: bool) -> Result<(), StorageError> {
        let needed = self
            .buffer
            .length()
            .to_usize()
            .checked_add(additional)
            .ok_or(StorageError::CapacityLimit)?;
        let current = self.buffer.capacity();
        if needed <= current.to_usize() {
            return Ok(());
        }
        let needed = capacity_for::<C::Index>(needed)?;
        let target = if exact {
            needed
        } else {
            C::Grow::next_capacity::<T, _>(current, needed)
        };
        self.buffer.grow_buffer(target, exact)
    }

    /// Move every item of `other` onto the end of this vector. `other` is
    /// left empty but keeps its storage.
    pub fn append(&mut self, other: &mut Self) {
        let moved = other.buffer.length().to_usize();
        if moved == 0 {
            return;
        }
        self.reserve(moved);
        let start = self.buffer.length().to_usize();
        unsafe {
            let src = other.buffer.data_ptr_mut();
            ptr::copy_nonoverlapping(src, self.buffer.data_ptr_mut().add(start), moved);
            other.buffer.set_length(C::Index::ZERO);
            self.buffer.set_length(C::Index::from_usize(start + moved));
        }
    }

    /// Remove consecutive equal items.
    #[inline]
    pub fn dedup(&mut self)
    where
        T: PartialEq,
    {
        self.dedup_by(|a, b| a == b)
    }

    /// Remove consecutive items for which `same_bucket` returns `true`. The
    /// first argument is the candidate for removal and the second is the
    /// preceding retained item.
    pub fn dedup_by<F>(&mut self, mut same_bucket: F)
    where
        F: FnMut(&mut T, &mut T) -> bool,
    {
        let orig_len = self.buffer.length().to_usize();
        if orig_len < 2 {
            return;
        }
        let mut gap = GapGuard::new(&mut self.buffer, 1, orig_len);
        let base = gap.buf.data_ptr_mut();
        while gap.read < orig_len {
            unsafe {
                let cur = base.add(gap.read);
                let prev = base.add(gap.read - gap.removed - 1);
                if same_bucket(&mut *cur, &mut *prev) {
                    gap.read += 1;
                    gap.removed += 1;
                    ptr::drop_in_place(cur);
                } else {
                    if gap.removed > 0 {
                        ptr::copy_nonoverlapping(cur, base.add(gap.read - gap.removed), 1);
                    }
                    gap.read += 1;
                }
            }
        }
    }

    /// Remove consecutive items which map to the same key.
    #[inline]
    pub fn dedup_by_key<F, K>(&mut self, mut key_f: F)
    where
        F: FnMut(&mut T) -> K,
        K: PartialEq,
    {
        self.dedup_by(|a, b| key_f(a) == key_f(b))
    }

    /// Remove a range of items, returning them as an iterator. Any items
    /// not consumed by the iterator are dropped with it.
    #[inline]
    pub fn drain<R>(&mut self, range: R) -> Drain<'_, C::Buffer<T>>
    where
        R: RangeBounds<C::Index>,
    {
        let range = resolve_range(range, self.buffer.length());
        Drain::new(&mut self.buffer, range)
    }

    /// Remove and drop a range of items, moving the following items down.
    #[inline]
    pub fn erase<R>(&mut self, range: R)
    where
        R: RangeBounds<C::Index>,
    {
        drop(self.drain(range));
    }

    /// Append clones of all items in a slice.
    ///
    /// # Panics
    /// Panics if the storage cannot hold the additional items.
    pub fn extend_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.try_extend_from_slice(items).or_panic();
    }

    /// Try to append clones of all items in a slice. No items are added
    /// unless the storage can hold all of them.
    pub fn try_extend_from_slice(&mut self, items: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self._try_reserve(items.len(), false)?;
        unsafe {
            self.extend_unchecked(items);
        }
        Ok(())
    }

    unsafe fn extend_unchecked(&mut self, items: &[T])
    where
        T: Clone,
    {
        if items.is_empty() {
            return;
        }
        let len = self.buffer.length().to_usize();
        let spare = &mut self.buffer.as_uninit_slice()[len..len + items.len()];
        let mut insert = Inserter::new(spare);
        insert.push_slice(items);
        let added = insert.complete();
        self.buffer.set_length(C::Index::from_usize(len + added));
    }

    fn try_extend(&mut self, iter: &mut impl Iterator<Item = T>) -> Result<(), UpdateError<T>> {
        loop {
            let len = self.buffer.length().to_usize();
            let spare = &mut self.buffer.as_uninit_slice()[len..];
            let spare_len = spare.len();
            if spare_len > 0 {
                let mut insert = Inserter::new(spare);
                insert.push_iter(iter);
                let added = insert.complete();
                if added > 0 {
                    unsafe { self.buffer.set_length(C::Index::from_usize(len + added)) };
                }
                if added < spare_len {
                    // ran out of items to insert
                    return Ok(());
                }
            }
            let Some(item) = iter.next() else {
                return Ok(());
            };
            let min_reserve = iter.size_hint().0.saturating_add(1);
            if let Err(err) = self._try_reserve(min_reserve, false) {
                return Err(UpdateError::new(err, item));
            }
            unsafe { self.push_unchecked(item) };
        }
    }

    /// Try to append the items of an iterator. On failure, the items already
    /// appended remain in place and the item which could not be stored is
    /// returned in the error.
    #[inline]
    pub fn try_extend_iter<I>(&mut self, iter: I) -> Result<(), UpdateError<T>>
    where
        I: IntoIterator<Item = T>,
    {
        self.try_extend(&mut iter.into_iter())
    }

    /// Insert an item at position `index`, moving the following items up.
    ///
    /// # Panics
    /// Panics if `index > len`, or if the storage cannot hold the item.
    pub fn insert(&mut self, index: C::Index, value: T) {
        self.try_insert(index, value).or_panic();
    }

    /// Try to insert an item at position `index`. If the storage cannot hold
    /// the item, the vector is unchanged and the item is returned in the error.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: C::Index, value: T) -> Result<(), UpdateError<T>> {
        let len = self.buffer.length().to_usize();
        let at = index.to_usize();
        if at > len {
            index_panic();
        }
        match self._try_reserve(1, false) {
            Ok(()) => unsafe {
                let slot = self.buffer.data_ptr_mut().add(at);
                slots::relocate(slot, slot.add(1), len - at);
                slot.write(value);
                self.buffer.set_length(C::Index::from_usize(len + 1));
                Ok(())
            },
            Err(err) => Err(UpdateError::new(err, value)),
        }
    }

    /// Insert clones of the items in `values` at position `index`.
    ///
    /// # Panics
    /// Panics if `index > len`, or if the storage cannot hold the items.
    pub fn insert_slice(&mut self, index: C::Index, values: &[T])
    where
        T: Clone,
    {
        self.try_insert_slice(index, values).or_panic();
    }

    /// Try to insert clones of the items in `values` at position `index`.
    /// The vector is unchanged if the storage cannot hold all of them.
    pub fn try_insert_slice(&mut self, index: C::Index, values: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let len = self.buffer.length().to_usize();
        let index = index.to_usize();
        if index > len {
            index_panic();
        }
        let count = values.len();
        if count == 0 {
            return Ok(());
        }
        self._try_reserve(count, false)?;
        let tail = len - index;
        unsafe {
            let head = self.buffer.data_ptr_mut().add(index);
            slots::relocate(head, head.add(count), tail);
            // The tail is owned by the inserter until it completes.
            self.buffer.set_length(C::Index::from_usize(index));
        }
        let slots = &mut self.buffer.as_uninit_slice()[index..len + count];
        let mut insert = Inserter::new_with_tail(slots, tail);
        insert.push_slice(values);
        let added = insert.complete();
        unsafe { self.buffer.set_length(C::Index::from_usize(index + added)) };
        Ok(())
    }

    /// Insert the items of an iterator at position `index`, returning the
    /// number of items inserted.
    ///
    /// # Panics
    /// Panics if `index > len`, or if the storage cannot hold the items.
    pub fn insert_iter<I>(&mut self, index: C::Index, iter: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.try_insert_iter(index, iter).or_panic()
    }

    /// Try to insert the items of an iterator at position `index`. On
    /// failure, the items inserted so far remain in place at `index`.
    pub fn try_insert_iter<I>(&mut self, index: C::Index, iter: I) -> Result<usize, UpdateError<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.buffer.length().to_usize();
        let index = index.to_usize();
        if index > len {
            index_panic();
        }
        let res = self.try_extend(&mut iter.into_iter());
        let added = self.buffer.length().to_usize() - len;
        if added > 0 && index < len {
            self.as_mut_slice()[index..].rotate_left(len - index);
        }
        res.map(|_| added)
    }

    /// Take the last item off the vector.
    pub fn pop(&mut self) -> Option<T> {
        let last = self.buffer.length().to_usize().checked_sub(1)?;
        unsafe {
            self.buffer.set_length(C::Index::from_usize(last));
            Some(self.buffer.uninit_index(last).assume_init_read())
        }
    }

    /// Append an item.
    ///
    /// # Panics
    /// Panics if the storage cannot hold the item.
    pub fn push(&mut self, item: T) {
        self.try_push(item).or_panic();
    }

    /// Append an item, handing it back in the error if the storage cannot
    /// hold it.
    pub fn try_push(&mut self, item: T) -> Result<(), UpdateError<T>> {
        match self._try_reserve(1, false) {
            Ok(()) => {
                unsafe { self.push_unchecked(item) };
                Ok(())
            }
            Err(err) => Err(UpdateError::new(err, item)),
        }
    }

    /// Append an item without checking the capacity.
    ///
    /// # Safety
    /// The vector must have a spare slot.
    #[inline]
    pub unsafe fn push_unchecked(&mut self, item: T) {
        let len = self.buffer.length().to_usize();
        debug_assert!(len < self.buffer.capacity().to_usize(), "no spare capacity");
        self.buffer.uninit_index(len).write(item);
        self.buffer.set_length(C::Index::from_usize(len + 1));
    }

    /// Take out the item at `index`, shifting the items after it down by one.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: C::Index) -> T {
        let len = self.buffer.length().to_usize();
        let at = index.to_usize();
        if at >= len {
            index_panic();
        }
        unsafe {
            let slot = self.buffer.data_ptr_mut().add(at);
            let item = slot.read();
            slots::relocate(slot.add(1), slot, len - at - 1);
            self.buffer.set_length(C::Index::from_usize(len - 1));
            item
        }
    }

    /// Take out the item at `index`, filling the hole with the last item.
    /// Order is not preserved.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn swap_remove(&mut self, index: C::Index) -> T {
        let len = self.buffer.length().to_usize();
        let at = index.to_usize();
        if at >= len {
            index_panic();
        }
        let last = len - 1;
        unsafe {
            let base = self.buffer.data_ptr_mut();
            let item = base.add(at).read();
            if at != last {
                ptr::copy_nonoverlapping(base.add(last), base.add(at), 1);
            }
            self.buffer.set_length(C::Index::from_usize(last));
            item
        }
    }

    /// Resize the vector to `new_len`, appending clones of `value` or
    /// dropping excess items.
    #[inline]
    pub fn resize(&mut self, new_len: C::Index, value: T)
    where
        T: Clone,
    {
        self.try_resize(new_len, value).or_panic();
    }

    /// Fallible form of [`Vec::resize`].
    pub fn try_resize(&mut self, new_len: C::Index, value: T) -> Result<(), StorageError>
    where
        T: Clone,
    {
        self.resize_by(new_len, |insert, count| insert.push_repeat(&value, count))
    }

    /// Truncate to `new_len`, or grow to it with the items written by `fill`.
    fn resize_by<F>(&mut self, new_len: C::Index, fill: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Inserter<'_, T>, usize),
    {
        let len = self.buffer.length().to_usize();
        let Some(count) = new_len.to_usize().checked_sub(len) else {
            self.truncate(new_len);
            return Ok(());
        };
        if count > 0 {
            self._try_reserve(count, false)?;
            let mut insert = Inserter::new(&mut self.buffer.as_uninit_slice()[len..len + count]);
            fill(&mut insert, count);
            insert.complete();
            unsafe { self.buffer.set_length(new_len) }
        }
        Ok(())
    }

    /// Resize the vector to `new_len`, appending default values or
    /// dropping excess items.
    #[inline]
    pub fn resize_default(&mut self, new_len: C::Index)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Resize the vector to `new_len`, appending values produced by `f` or
    /// dropping excess items.
    #[inline]
    pub fn resize_with<F>(&mut self, new_len: C::Index, f: F)
    where
        F: FnMut() -> T,
    {
        self.try_resize_with(new_len, f).or_panic();
    }

    /// Fallible form of [`Vec::resize_with`].
    pub fn try_resize_with<F>(&mut self, new_len: C::Index, mut f: F) -> Result<(), StorageError>
    where
        F: FnMut() -> T,
    {
        self.resize_by(new_len, |insert, count| {
            for _ in 0..count {
                insert.push_with(&mut f);
            }
        })
    }

    /// Replace the contents of the vector with the items of an iterator.
    /// Existing items are assigned over before new items are appended.
    pub fn assign<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.try_assign(iter).or_panic();
    }

    /// Try to replace the contents of the vector with the items of an iterator.
    pub fn try_assign<I>(&mut self, iter: I) -> Result<(), UpdateError<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut iter = iter.into_iter();
        let len = self.buffer.length().to_usize();
        let mut assigned = 0;
        for slot in self.as_mut_slice() {
            let Some(item) = iter.next() else {
                break;
            };
            *slot = item;
            assigned += 1;
        }
        if assigned < len {
            self.truncate(C::Index::from_usize(assigned));
            Ok(())
        } else {
            self.try_extend(&mut iter)
        }
    }

    /// Replace the contents of the vector with clones of the items in `items`.
    pub fn assign_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.try_assign_slice(items).or_panic();
    }

    /// Try to replace the contents of the vector with clones of the items in
    /// `items`. The vector is unchanged if the storage cannot hold them.
    pub fn try_assign_slice(&mut self, items: &[T]) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let len = self.buffer.length().to_usize();
        if items.len() > len {
            self._try_reserve(items.len() - len, false)?;
            self.as_mut_slice().clone_from_slice(&items[..len]);
            unsafe { self.extend_unchecked(&items[len..]) };
        } else {
            self.truncate(C::Index::from_usize(items.len()));
            self.as_mut_slice().clone_from_slice(items);
        }
        Ok(())
    }

    /// Replace the contents of the vector with `count` clones of `value`.
    pub fn assign_repeat(&mut self, count: C::Index, value: &T)
    where
        T: Clone,
    {
        self.try_assign_repeat(count, value).or_panic();
    }

    /// Try to replace the contents of the vector with `count` clones of `value`.
    pub fn try_assign_repeat(&mut self, count: C::Index, value: &T) -> Result<(), StorageError>
    where
        T: Clone,
    {
        let len = self.buffer.length().to_usize();
        let count_usize = count.to_usize();
        if count_usize > len {
            self._try_reserve(count_usize - len, false)?;
        } else {
            self.truncate(count);
        }
        for slot in self.as_mut_slice() {
            slot.clone_from(value);
        }
        let len = self.buffer.length().to_usize();
        if count_usize > len {
            let mut insert =
                Inserter::new(&mut self.buffer.as_uninit_slice()[len..count_usize]);
            insert.push_repeat(value, count_usize - len);
            insert.complete();
            unsafe { self.buffer.set_length(count) };
        }
        Ok(())
    }

    /// Retain only the items for which `f` returns `true`.
    #[inline]
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.retain_mut(|r| f(r))
    }

    /// Retain only the items for which `f` returns `true`, passing a
    /// mutable reference to each item.
    pub fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        let orig_len = self.buffer.length().to_usize();
        if orig_len == 0 {
            return;
        }
        let mut gap = GapGuard::new(&mut self.buffer, 0, orig_len);
        let base = gap.buf.data_ptr_mut();
        while gap.read < orig_len {
            unsafe {
                let cur = base.add(gap.read);
                if f(&mut *cur) {
                    if gap.removed > 0 {
                        ptr::copy_nonoverlapping(cur, base.add(gap.read - gap.removed), 1);
                    }
                    gap.read += 1;
                } else {
                    gap.read += 1;
                    gap.removed += 1;
                    ptr::drop_in_place(cur);
                }
            }
        }
    }

    /// Reduce the capacity of the vector to at least `min_capacity` and no
    /// less than its length. Storage without a variable capacity is unchanged.
    #[inline]
    pub fn shrink_to(&mut self, min_capacity: C::Index) {
        self.try_shrink_to(min_capacity).or_panic();
    }

    /// Try to reduce the capacity of the vector.
    pub fn try_shrink_to(&mut self, min_capacity: C::Index) -> Result<(), StorageError> {
        let capacity = self.buffer.length().max(min_capacity);
        if self.buffer.capacity() > capacity {
            self.buffer.shrink_buffer(capacity)?;
        }
        Ok(())
    }

    /// Reduce the capacity of the vector to its length.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.try_shrink_to_fit().or_panic();
    }

    /// Try to reduce the capacity of the vector to its length.
    #[inline]
    pub fn try_shrink_to_fit(&mut self) -> Result<(), StorageError> {
        self.try_shrink_to(self.buffer.length())
    }

    /// Access the unused capacity of the vector as uninitialized slots.
    #[inline]
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        let length = self.len().to_usize();
        &mut self.buffer.as_uninit_slice()[length..]
    }

    /// Access the items and the unused capacity of the vector at once.
    pub fn split_at_spare_mut(&mut self) -> (&mut [T], &mut [MaybeUninit<T>]) {
        let length = self.len().to_usize();
        let (data, spare) = self.buffer.as_uninit_slice().split_at_mut(length);
        (
            unsafe { slice::from_raw_parts_mut(data.as_mut_ptr().cast(), length) },
            spare,
        )
    }

    /// Split the vector at `index`, returning the items `[index, len)` in a
    /// new vector created in the same storage configuration.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn split_off(&mut self, index: C::Index) -> Self
    where
        C: VecConfigSpawn<T>,
    {
        let len = self.buffer.length().to_usize();
        let at = index.to_usize();
        if at > len {
            index_panic();
        }
        let move_len = len - at;
        let mut buffer =
            C::buffer_try_spawn(&self.buffer, C::Index::from_usize(move_len), false).or_panic();
        if move_len > 0 {
            unsafe {
                ptr::copy_nonoverlapping(
                    self.buffer.data_ptr_mut().add(at),
                    buffer.data_ptr_mut(),
                    move_len,
                );
                self.buffer.set_length(index);
                buffer.set_length(C::Index::from_usize(move_len));
            }
        }
        Self { buffer }
    }

    /// Exchange the contents of two vectors.
    ///
    /// When neither vector holds its items inline, the buffers themselves
    /// are exchanged. Otherwise the items are exchanged, growing the shorter
    /// vector's storage first when necessary.
    ///
    /// # Panics
    /// Panics if either storage cannot hold the other vector's items.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.try_swap_with(other).or_panic();
    }

    /// Try to exchange the contents of two vectors. Both are unchanged if
    /// either storage cannot hold the other vector's items.
    pub fn try_swap_with(&mut self, other: &mut Self) -> Result<(), StorageError> {
        if !self.buffer.is_inline() && !other.buffer.is_inline() {
            mem::swap(&mut self.buffer, &mut other.buffer);
            return Ok(());
        }
        if self.buffer.length() >= other.buffer.length() {
            Self::swap_items(self, other)
        } else {
            Self::swap_items(other, self)
        }
    }

    fn swap_items(long: &mut Self, short: &mut Self) -> Result<(), StorageError> {
        let long_len = long.buffer.length().to_usize();
        let short_len = short.buffer.length().to_usize();
        let extra = long_len - short_len;
        short._try_reserve(extra, false)?;
        long.as_mut_slice()[..short_len].swap_with_slice(short.as_mut_slice());
        if extra > 0 {
            unsafe {
                ptr::copy_nonoverlapping(
                    long.buffer.data_ptr_mut().add(short_len),
                    short.buffer.data_ptr_mut().add(short_len),
                    extra,
                );
                long.buffer.set_length(C::Index::from_usize(short_len));
                short.buffer.set_length(C::Index::from_usize(long_len));
            }
        }
        Ok(())
    }

    /// Shorten the vector to `length` items, dropping the rest.
    pub fn truncate(&mut self, length: C::Index) {
        let old_len: usize = self.len().to_usize();
        let new_len = length.to_usize().min(old_len);
        let remove = old_len - new_len;
        if remove > 0 {
            unsafe {
                self.buffer.set_length(C::Index::from_usize(new_len));
                slots::drop_slots(self.buffer.data_ptr_mut().add(new_len), remove);
            }
        }
    }
}

/// Closes the gap left by removed items when a filtering pass ends,
/// including when the filter panics.
struct GapGuard<'g, B: VecBuffer> {
    buf: &'g mut B,
    read: usize,
    removed: usize,
    orig_len: usize,
}

impl<'g, B: VecBuffer> GapGuard<'g, B> {
    #[inline]
    fn new(buf: &'g mut B, read: usize, orig_len: usize) -> Self {
        Self {
            buf,
            read,
            removed: 0,
            orig_len,
        }
    }
}

impl<B: VecBuffer> Drop for GapGuard<'_, B> {
    fn drop(&mut self) {
        if self.removed > 0 {
            unsafe {
                let base = self.buf.data_ptr_mut();
                slots::relocate(
                    base.add(self.read),
                    base.add(self.read - self.removed),
                    self.orig_len - self.read,
                );
                self.buf
                    .set_length(B::Index::from_usize(self.orig_len - self.removed));
            }
        }
    }
}

impl<T, C: VecConfig> AsRef<[T]> for Vec<T, C> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, C: VecConfig> AsMut<[T]> for Vec<T, C> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, C: VecConfig> Borrow<[T]> for Vec<T, C> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, C: VecConfig> BorrowMut<[T]> for Vec<T, C> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone, C: VecConfigSpawn<T>> Clone for Vec<T, C> {
    fn clone(&self) -> Self {
        if let Some(buffer) = self.buffer.try_share() {
            return Self { buffer };
        }
        let mut inst = Self {
            buffer: C::buffer_try_spawn(&self.buffer, self.buffer.length(), false).or_panic(),
        };
        unsafe { inst.extend_unchecked(self) };
        inst
    }

    fn clone_from(&mut self, source: &Self) {
        if let Some(buffer) = source.buffer.try_share() {
            *self = Self { buffer };
        } else {
            self.assign_slice(source);
        }
    }
}

impl<T: fmt::Debug, C: VecConfig> fmt::Debug for Vec<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<T, C: VecConfigNew<T>> Default for Vec<T, C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: VecConfig> Deref for Vec<T, C> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.buffer.as_slice()
    }
}

impl<T, C: VecConfig> DerefMut for Vec<T, C> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffer.as_mut_slice()
    }
}

impl<T, C: VecConfig> Drop for Vec<T, C> {
    fn drop(&mut self) {
        // A shared buffer drops its items along with the last reference.
        if self.buffer.is_unique() {
            self.truncate(C::Index::ZERO);
        }
    }
}

impl<T, C: VecConfig> Extend<T> for Vec<T, C> {
    #[inline]
    fn extend<A: IntoIterator<Item = T>>(&mut self, iter: A) {
        self.try_extend(&mut iter.into_iter()).or_panic();
    }
}

impl<'a, T: Clone + 'a, C: VecConfig> Extend<&'a T> for Vec<T, C> {
    #[inline]
    fn extend<A: IntoIterator<Item = &'a T>>(&mut self, iter: A) {
        self.try_extend(&mut iter.into_iter().cloned()).or_panic();
    }
}

impl<T, C: VecConfigNew<T>> FromIterator<T> for Vec<T, C> {
    #[inline]
    fn from_iter<A: IntoIterator<Item = T>>(iter: A) -> Self {
        let iter = iter.into_iter();
        // an oversized hint is left for `extend` to report
        let mut vec = capacity_for(iter.size_hint().0)
            .and_then(Self::try_with_capacity)
            .unwrap_or_else(|_| Self::new());
        vec.extend(iter);
        vec
    }
}

impl<T: Hash, C: VecConfig> Hash for Vec<T, C> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T: PartialOrd, C: VecConfig> PartialOrd for Vec<T, C> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, C: VecConfig> Ord for Vec<T, C> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

#[cfg(feature = "alloc")]
impl<T, C> From<alloc_crate::boxed::Box<[T]>> for Vec<T, C>
where
    C: VecConfigAlloc<T, Alloc = Global, Index = usize>,
{
    #[inline]
    fn from(data: alloc_crate::boxed::Box<[T]>) -> Self {
        alloc_crate::vec::Vec::<T>::from(data).into()
    }
}

#[cfg(feature = "alloc")]
impl<T, C> From<alloc_crate::vec::Vec<T>> for Vec<T, C>
where
    C: VecConfigAlloc<T, Alloc = Global, Index = usize>,
{
    fn from(vec: alloc_crate::vec::Vec<T>) -> Self {
        let mut vec = ManuallyDrop::new(vec);
        let capacity = vec.capacity();
        let length = vec.len();
        let data = unsafe { NonNull::new_unchecked(vec.as_mut_ptr()) };
        unsafe { Self::from_parts(data, length, capacity, Global) }
    }
}

#[cfg(feature = "allocator-api2")]
impl<T, C, A> From<allocator_api2::vec::Vec<T, A>> for Vec<T, C>
where
    A: allocator_api2::alloc::Allocator,
    C: VecConfigAlloc<T, Alloc = A, Index = usize>,
{
    #[inline]
    fn from(vec: allocator_api2::vec::Vec<T, A>) -> Self {
        let (data, length, capacity, alloc) = vec.into_raw_parts_with_alloc();
        unsafe { Self::from_parts(NonNull::new_unchecked(data), length, capacity, alloc) }
    }
}

#[cfg(feature = "alloc")]
impl<T, C> From<Vec<T, C>> for alloc_crate::vec::Vec<T>
where
    C: VecConfigAlloc<T, Alloc = Global, Index = usize>,
{
    fn from(vec: Vec<T, C>) -> Self {
        let (data, length, capacity, _alloc) = vec.into_parts();
        if capacity == 0 {
            return alloc_crate::vec::Vec::new();
        }
        unsafe { alloc_crate::vec::Vec::from_raw_parts(data.as_ptr(), length, capacity) }
    }
}

#[cfg(feature = "allocator-api2")]
impl<T, C, A> From<Vec<T, C>> for allocator_api2::vec::Vec<T, A>
where
    A: allocator_api2::alloc::Allocator,
    C: VecConfigAlloc<T, Alloc = A, Index = usize>,
{
    fn from(vec: Vec<T, C>) -> Self {
        let (data, length, capacity, alloc) = vec.into_parts();
        unsafe {
            allocator_api2::vec::Vec::from_raw_parts_in(data.as_ptr(), length, capacity, alloc)
        }
    }
}

impl<T: Clone, C: VecConfigNew<T>> From<&[T]> for Vec<T, C> {
    #[inline]
    fn from(data: &[T]) -> Self {
        Self::from_slice(data)
    }
}

impl<T: Clone, C: VecConfigNew<T>> From<&mut [T]> for Vec<T, C> {
    #[inline]
    fn from(data: &mut [T]) -> Self {
        Self::from_slice(data)
    }
}

impl<T: Clone, C: VecConfigNew<T>, const N: usize> From<&[T; N]> for Vec<T, C> {
    #[inline]
    fn from(data: &[T; N]) -> Self {
        Self::from_slice(data)
    }
}

impl<T, C: VecConfigNew<T>, const N: usize> From<[T; N]> for Vec<T, C> {
    #[inline]
    fn from(data: [T; N]) -> Self {
        Self::from_iter(data)
    }
}

impl<C: VecConfigNew<u8>> From<&str> for Vec<u8, C> {
    #[inline]
    fn from(data: &str) -> Self {
        Self::from_slice(data.as_bytes())
    }
}

#[cfg(feature = "alloc")]
impl<C> From<alloc_crate::string::String> for Vec<u8, C>
where
    C: VecConfigAlloc<u8, Alloc = Global, Index = usize>,
{
    #[inline]
    fn from(string: alloc_crate::string::String) -> Self {
        string.into_bytes().into()
    }
}

impl<T, C: VecConfig> IntoIterator for Vec<T, C> {
    type Item = T;
    type IntoIter = IntoIter<C::Buffer<T>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.into_inner())
    }
}

impl<'a, T, C: VecConfig> IntoIterator for &'a Vec<T, C> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, C: VecConfig> IntoIterator for &'a mut Vec<T, C> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T1, C1, T2, C2> PartialEq<Vec<T2, C2>> for Vec<T1, C1>
where
    C1: VecConfig,
    C2: VecConfig,
    T1: PartialEq<T2>,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl<T: Eq, C: VecConfig> Eq for Vec<T, C> {}

impl<T1, C1, T2> PartialEq<&[T2]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &&[T2]) -> bool {
        self.as_slice().eq(*other)
    }
}

impl<T1, C1, T2> PartialEq<[T2]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &[T2]) -> bool {
        self.as_slice().eq(other)
    }
}

impl<T1, C1, T2, const N: usize> PartialEq<&[T2; N]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &&[T2; N]) -> bool {
        self.as_slice().eq(&other[..])
    }
}

impl<T1, C1, T2, const N: usize> PartialEq<[T2; N]> for Vec<T1, C1>
where
    T1: PartialEq<T2>,
    C1: VecConfig,
{
    #[inline]
    fn eq(&self, other: &[T2; N]) -> bool {
        self.as_slice().eq(&other[..])
    }
}

impl<T1, T2, C2> PartialEq<Vec<T2, C2>> for &[T1]
where
    T2: PartialEq<T1>,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        other.eq(self)
    }
}

impl<T1, T2, C2, const N: usize> PartialEq<Vec<T2, C2>> for [T1; N]
where
    T2: PartialEq<T1>,
    C2: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<T2, C2>) -> bool {
        other.eq(self)
    }
}

#[cfg(feature = "alloc")]
impl<A, B, C> PartialEq<alloc_crate::vec::Vec<A>> for Vec<B, C>
where
    B: PartialEq<A>,
    C: VecConfig,
{
    #[inline]
    fn eq(&self, other: &alloc_crate::vec::Vec<A>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

#[cfg(feature = "alloc")]
impl<A, B, C> PartialEq<Vec<B, C>> for alloc_crate::vec::Vec<A>
where
    A: PartialEq<B>,
    C: VecConfig,
{
    #[inline]
    fn eq(&self, other: &Vec<B, C>) -> bool {
        self.as_slice().eq(other.as_slice())
    }
}

impl<T, C: VecConfig, const N: usize> TryFrom<Vec<T, C>> for [T; N] {
    type Error = Vec<T, C>;

    #[inline]
    fn try_from(mut vec: Vec<T, C>) -> Result<Self, Self::Error> {
        if vec.len().to_usize() != N {
            return Err(vec);
        }
        unsafe { vec.set_len(C::Index::ZERO) };
        let data = vec.as_ptr() as *const [T; N];
        Ok(unsafe { data.read() })
    }
}

#[cfg(feature = "std")]
impl<C: VecConfig> std::io::Write for Vec<u8, C> {
    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self._try_reserve(buf.len(), false) {
            Ok(_) => {
                unsafe { self.extend_unchecked(buf) };
                Ok(buf.len())
            }
            Err(StorageError::CapacityLimit) => {
                // Accept as much as the fixed storage allows.
                let spare = self.capacity().to_usize() - self.len().to_usize();
                unsafe { self.extend_unchecked(&buf[..spare.min(buf.len())]) };
                Ok(spare.min(buf.len()))
            }
            Err(err) => Err(std::io::Error::new(std::io::ErrorKind::Other, err)),
        }
    }
}

#[cfg(feature = "zeroize")]
impl<T, A: Allocator> zeroize::Zeroize for Vec<T, crate::alloc::ZeroizingAlloc<A>> {
    #[inline]
    fn zeroize(&mut self) {
        self.clear();
        self.shrink_to_fit();
    }
}

#[cfg(feature = "zeroize")]
impl<T, C: VecConfig> zeroize::ZeroizeOnDrop for Vec<T, C> where C::Buffer<T>: zeroize::ZeroizeOnDrop
{}

/// ```compile_fail,E0597
/// use flex_flat::{array_storage, Vec};
///
/// fn run<F: FnOnce() -> () + 'static>(f: F) { f() }
///
/// let mut buf = array_storage::<usize, 10>();
/// let mut v = Vec::new_in(&mut buf);
/// v.push(1usize);
/// run(move || v.clear());
/// ```
#[cfg(doctest)]
fn _lifetime_check() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::array_storage;
    use core::cell::Cell;

    struct Tracked<'c> {
        value: u32,
        drops: &'c Cell<usize>,
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn insert_slice_middle() {
        let mut v = FixedVec::<u32, 8>::from_slice(&[1, 2, 5]);
        v.insert_slice(2, &[3, 4]);
        assert_eq!(v, [1, 2, 3, 4, 5]);
        v.insert_slice(5, &[6]);
        v.insert_slice(0, &[0]);
        assert_eq!(v, [0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn insert_iter_rotates() {
        let mut v = FixedVec::<u32, 8>::from_slice(&[1, 5]);
        assert_eq!(v.insert_iter(1, [2, 3, 4]), 3);
        assert_eq!(v, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn fixed_capacity_exceeded() {
        let mut v = FixedVec::<u32, 2>::new();
        v.push(1);
        v.push(2);
        let err = v.try_push(3).unwrap_err();
        assert_eq!(err.error(), &StorageError::CapacityLimit);
        assert_eq!(err.into_value(), 3);
        assert_eq!(
            v.try_insert_slice(0, &[7, 8]),
            Err(StorageError::CapacityLimit)
        );
        assert_eq!(v, [1, 2]);
    }

    #[test]
    fn retain_drops_removed() {
        let drops = Cell::new(0);
        let mut v = FixedVec::<Tracked<'_>, 6>::new();
        for value in 0..6 {
            v.push(Tracked {
                value,
                drops: &drops,
            });
        }
        v.retain(|t| t.value % 3 != 0);
        assert_eq!(drops.get(), 2);
        assert_eq!(
            v.iter().map(|t| t.value).collect::<std::vec::Vec<_>>(),
            [1, 2, 4, 5]
        );
        drop(v);
        assert_eq!(drops.get(), 6);
    }

    #[test]
    fn retain_panic_keeps_rest() {
        let drops = Cell::new(0);
        let mut v = FixedVec::<Tracked<'_>, 4>::new();
        for value in 0..4 {
            v.push(Tracked {
                value,
                drops: &drops,
            });
        }
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            v.retain(|t| {
                if t.value == 2 {
                    panic!("filter failed");
                }
                t.value != 0
            })
        }));
        assert!(res.is_err());
        assert_eq!(drops.get(), 1);
        assert_eq!(
            v.iter().map(|t| t.value).collect::<std::vec::Vec<_>>(),
            [1, 2, 3]
        );
    }

    #[test]
    fn dedup_consecutive() {
        let mut v = FixedVec::<u32, 8>::from_slice(&[1, 1, 2, 3, 3, 3, 1]);
        v.dedup();
        assert_eq!(v, [1, 2, 3, 1]);
    }

    #[test]
    fn assign_variants() {
        let mut v = FixedVec::<u32, 6>::from_slice(&[9, 9, 9]);
        v.assign([1, 2]);
        assert_eq!(v, [1, 2]);
        v.assign_slice(&[4, 5, 6, 7]);
        assert_eq!(v, [4, 5, 6, 7]);
        v.assign_repeat(5, &3);
        assert_eq!(v, [3, 3, 3, 3, 3]);
        v.assign_repeat(1, &8);
        assert_eq!(v, [8]);
        assert_eq!(
            v.try_assign_slice(&[0; 7]),
            Err(StorageError::CapacityLimit)
        );
        assert_eq!(v, [8]);
    }

    #[test]
    fn swap_inline_and_remote() {
        // both buffers must outlive either vector
        let mut slots = [MaybeUninit::<u32>::uninit(); 4];
        let mut storage = array_storage::<u32, 4>();
        let mut remote = Vec::new_in(&mut storage);
        remote.extend([7, 8]);
        let mut other = Vec::from_uninit(&mut slots[..]);
        other.push(1);
        remote.swap_with(&mut other);
        assert_eq!(remote, [1]);
        assert_eq!(other, [7, 8]);

        let mut a = FixedVec::<u32, 4>::from_slice(&[1, 2, 3]);
        let mut b = FixedVec::<u32, 4>::from_slice(&[4]);
        a.swap_with(&mut b);
        assert_eq!(a, [4]);
        assert_eq!(b, [1, 2, 3]);
    }

    #[test]
    fn split_off_end() {
        let mut v = FixedVec::<u32, 4>::from_slice(&[1, 2, 3]);
        let tail = v.split_off(3);
        assert!(tail.is_empty());
        let tail = v.split_off(1);
        assert_eq!(v, [1]);
        assert_eq!(tail, [2, 3]);
    }

    #[test]
    #[should_panic(expected = "Invalid element index")]
    fn remove_out_of_range() {
        let mut v = FixedVec::<u32, 4>::from_slice(&[1]);
        v.remove(1);
    }

    #[test]
    fn array_conversion() {
        let v = FixedVec::<u32, 4>::from([1, 2, 3]);
        let arr: [u32; 3] = v.try_into().unwrap();
        assert_eq!(arr, [1, 2, 3]);
        let v = FixedVec::<u32, 4>::from([1, 2]);
        let back: Result<[u32; 3], _> = v.try_into();
        assert_eq!(back.unwrap_err(), [1, 2]);
    }
}
