//! Storage configurations accepted by `Vec`.
//!
//! Any [`Allocator`] is a configuration for heap storage. The marker types
//! [`Fixed`], [`Sbo`], [`Remote`] and [`Shared`] select the other storage
//! policies, and [`Custom`] changes the index type or growth strategy of
//! heap storage.

use core::marker::PhantomData;
use core::ptr::NonNull;

use const_default::ConstDefault;

use crate::alloc::{Allocator, AllocatorDefault};
use crate::capacity::{Grow, GrowDoubling, GrowExact, Index};
use crate::error::StorageError;
use crate::storage::shared::ForkFn;
use crate::storage::slots::clone_slots;
use crate::storage::{
    ArrayStorage, Fixed, HeapBuffer, InlineBuffer, Remote, RemoteBuffer, Sbo, SboBuffer, Shared,
    SharedBuffer,
};

use super::buffer::VecBuffer;

/// Selects the buffer, growth strategy and index type of a `Vec`.
pub trait VecConfig {
    /// The buffer holding the items.
    type Buffer<T>: VecBuffer<Item = T, Index = Self::Index>;

    /// How the capacity increases when the buffer is full.
    type Grow: Grow;

    /// The type of the length and capacity.
    type Index: Index;
}

/// Heap configurations, whose buffers can be taken apart into a raw block
/// and the allocator owning it.
pub trait VecConfigAlloc<T>: VecConfig {
    /// The allocator owning the block.
    type Alloc: Allocator;

    /// Reassemble a buffer from its parts.
    ///
    /// # Safety
    /// `data` must be a block from `alloc` with room for `capacity` items,
    /// or dangling when the capacity is zero. The first `length` items must
    /// be initialized.
    unsafe fn buffer_from_parts(
        data: NonNull<T>,
        length: Self::Index,
        capacity: Self::Index,
        alloc: Self::Alloc,
    ) -> Self::Buffer<T>;

    /// Take a buffer apart without releasing its block.
    fn buffer_into_parts(
        buffer: Self::Buffer<T>,
    ) -> (NonNull<T>, Self::Index, Self::Index, Self::Alloc);
}

/// Configurations which can produce a buffer on their own, enabling
/// `Vec::new` and `Vec::with_capacity`.
pub trait VecConfigNew<T>: VecConfigSpawn<T> {
    /// An empty buffer, usable in constant expressions.
    const EMPTY_BUFFER: Self::Buffer<T>;

    /// Create a buffer with room for `capacity` items.
    fn buffer_try_new(capacity: Self::Index, exact: bool) -> Result<Self::Buffer<T>, StorageError>;
}

/// Configurations which can produce a buffer like an existing one, as
/// needed by `clone` and `split_off`.
pub trait VecConfigSpawn<T>: VecConfig {
    /// Create a buffer with room for `capacity` items, sourced the same way
    /// as `buf`.
    fn buffer_try_spawn(
        buf: &Self::Buffer<T>,
        capacity: Self::Index,
        exact: bool,
    ) -> Result<Self::Buffer<T>, StorageError>;
}

/// Values which a `Vec` can be created in: allocators, storage policy
/// markers and array storage for remote vectors.
pub trait VecNewIn<T> {
    /// The configuration of the resulting `Vec`.
    type Config: VecConfig;

    /// Create a buffer with room for `capacity` items.
    fn buffer_try_new_in(
        self,
        capacity: <Self::Config as VecConfig>::Index,
        exact: bool,
    ) -> Result<<Self::Config as VecConfig>::Buffer<T>, StorageError>;
}

impl<A: Allocator> VecConfig for A {
    type Buffer<T> = HeapBuffer<T, usize, A>;
    type Grow = GrowDoubling;
    type Index = usize;
}

impl<T, A: Allocator> VecConfigAlloc<T> for A {
    type Alloc = A;

    #[inline]
    unsafe fn buffer_from_parts(
        data: NonNull<T>,
        length: usize,
        capacity: usize,
        alloc: A,
    ) -> Self::Buffer<T> {
        HeapBuffer::from_parts(data, length, capacity, alloc)
    }

    #[inline]
    fn buffer_into_parts(buffer: Self::Buffer<T>) -> (NonNull<T>, usize, usize, A) {
        buffer.into_parts()
    }
}

impl<T, A: AllocatorDefault> VecConfigNew<T> for A {
    const EMPTY_BUFFER: Self::Buffer<T> = HeapBuffer::DEFAULT;

    #[inline]
    fn buffer_try_new(capacity: usize, exact: bool) -> Result<Self::Buffer<T>, StorageError> {
        HeapBuffer::try_with_capacity_in(capacity, A::DEFAULT, exact)
    }
}

impl<T, A: Allocator + Clone> VecConfigSpawn<T> for A {
    #[inline]
    fn buffer_try_spawn(
        buf: &Self::Buffer<T>,
        capacity: usize,
        exact: bool,
    ) -> Result<Self::Buffer<T>, StorageError> {
        HeapBuffer::try_with_capacity_in(capacity, buf.alloc.clone(), exact)
    }
}

impl<T, A: Allocator> VecNewIn<T> for A {
    type Config = A;

    #[inline]
    fn buffer_try_new_in(
        self,
        capacity: usize,
        exact: bool,
    ) -> Result<HeapBuffer<T, usize, A>, StorageError> {
        HeapBuffer::try_with_capacity_in(capacity, self, exact)
    }
}

/// Heap storage with a custom index type `I` and growth strategy `G`.
///
/// A narrow index type limits the capacity of the vector, and shrinks its
/// handle, to the range of `I`.
#[derive(Debug, Default)]
pub struct Custom<A: Allocator, I: Index = usize, G: Grow = GrowExact> {
    alloc: A,
    _pd: PhantomData<(I, G)>,
}

impl<A: Allocator, I: Index, G: Grow> Custom<A, I, G> {
    /// Allocate from the allocator instance `alloc`.
    pub const fn with_alloc(alloc: A) -> Self {
        Self {
            alloc,
            _pd: PhantomData,
        }
    }
}

impl<A: AllocatorDefault, I: Index, G: Grow> ConstDefault for Custom<A, I, G> {
    const DEFAULT: Self = Self::with_alloc(A::DEFAULT);
}

impl<A: Allocator, I: Index, G: Grow> VecConfig for Custom<A, I, G> {
    type Buffer<T> = HeapBuffer<T, I, A>;
    type Grow = G;
    type Index = I;
}

impl<T, A: Allocator, I: Index, G: Grow> VecConfigAlloc<T> for Custom<A, I, G> {
    type Alloc = A;

    #[inline]
    unsafe fn buffer_from_parts(data: NonNull<T>, length: I, capacity: I, alloc: A) -> Self::Buffer<T> {
        HeapBuffer::from_parts(data, length, capacity, alloc)
    }

    #[inline]
    fn buffer_into_parts(buffer: Self::Buffer<T>) -> (NonNull<T>, I, I, A) {
        buffer.into_parts()
    }
}

impl<T, A: AllocatorDefault, I: Index, G: Grow> VecConfigNew<T> for Custom<A, I, G> {
    const EMPTY_BUFFER: Self::Buffer<T> = HeapBuffer::DEFAULT;

    #[inline]
    fn buffer_try_new(capacity: I, exact: bool) -> Result<Self::Buffer<T>, StorageError> {
        HeapBuffer::try_with_capacity_in(capacity, A::DEFAULT, exact)
    }
}

impl<T, A: Allocator + Clone, I: Index, G: Grow> VecConfigSpawn<T> for Custom<A, I, G> {
    #[inline]
    fn buffer_try_spawn(
        buf: &Self::Buffer<T>,
        capacity: I,
        exact: bool,
    ) -> Result<Self::Buffer<T>, StorageError> {
        HeapBuffer::try_with_capacity_in(capacity, buf.alloc.clone(), exact)
    }
}

impl<T, A: Allocator, I: Index, G: Grow> VecNewIn<T> for Custom<A, I, G> {
    type Config = Self;

    #[inline]
    fn buffer_try_new_in(self, capacity: I, exact: bool) -> Result<HeapBuffer<T, I, A>, StorageError> {
        HeapBuffer::try_with_capacity_in(capacity, self.alloc, exact)
    }
}

impl<const N: usize> VecConfig for Fixed<N> {
    type Buffer<T> = InlineBuffer<T, N>;
    type Grow = GrowExact;
    type Index = usize;
}

impl<T, const N: usize> VecConfigNew<T> for Fixed<N> {
    const EMPTY_BUFFER: InlineBuffer<T, N> = InlineBuffer::DEFAULT;

    #[inline]
    fn buffer_try_new(capacity: usize, _exact: bool) -> Result<InlineBuffer<T, N>, StorageError> {
        InlineBuffer::try_for_capacity(capacity)
    }
}

impl<T, const N: usize> VecConfigSpawn<T> for Fixed<N> {
    #[inline]
    fn buffer_try_spawn(
        _buf: &InlineBuffer<T, N>,
        capacity: usize,
        _exact: bool,
    ) -> Result<InlineBuffer<T, N>, StorageError> {
        InlineBuffer::try_for_capacity(capacity)
    }
}

impl<T, const N: usize> VecNewIn<T> for Fixed<N> {
    type Config = Self;

    #[inline]
    fn buffer_try_new_in(
        self,
        capacity: usize,
        _exact: bool,
    ) -> Result<InlineBuffer<T, N>, StorageError> {
        InlineBuffer::try_for_capacity(capacity)
    }
}

impl<const N: usize, A: Allocator> VecConfig for Sbo<N, A> {
    type Buffer<T> = SboBuffer<T, N, A>;
    type Grow = GrowDoubling;
    type Index = usize;
}

impl<T, const N: usize, A: AllocatorDefault> VecConfigNew<T> for Sbo<N, A> {
    const EMPTY_BUFFER: SboBuffer<T, N, A> = SboBuffer::DEFAULT;

    #[inline]
    fn buffer_try_new(capacity: usize, _exact: bool) -> Result<SboBuffer<T, N, A>, StorageError> {
        SboBuffer::try_for_capacity_in(capacity, A::DEFAULT)
    }
}

impl<T, const N: usize, A: Allocator + Clone> VecConfigSpawn<T> for Sbo<N, A> {
    #[inline]
    fn buffer_try_spawn(
        buf: &SboBuffer<T, N, A>,
        capacity: usize,
        _exact: bool,
    ) -> Result<SboBuffer<T, N, A>, StorageError> {
        SboBuffer::try_for_capacity_in(capacity, buf.alloc.clone())
    }
}

impl<T, const N: usize, A: Allocator> VecNewIn<T> for Sbo<N, A> {
    type Config = Self;

    #[inline]
    fn buffer_try_new_in(
        self,
        capacity: usize,
        _exact: bool,
    ) -> Result<SboBuffer<T, N, A>, StorageError> {
        SboBuffer::try_for_capacity_in(capacity, self.alloc)
    }
}

impl<'a> VecConfig for Remote<'a> {
    type Buffer<T> = RemoteBuffer<'a, T>;
    type Grow = GrowExact;
    type Index = usize;
}

impl<'a, T, const N: usize> VecNewIn<T> for &'a mut ArrayStorage<T, N> {
    type Config = Remote<'a>;

    #[inline]
    fn buffer_try_new_in(
        self,
        capacity: usize,
        _exact: bool,
    ) -> Result<RemoteBuffer<'a, T>, StorageError> {
        if capacity > N {
            return Err(StorageError::CapacityLimit);
        }
        Ok(RemoteBuffer::from_uninit(self.as_uninit_slice()))
    }
}

impl<A: Allocator + Clone> VecConfig for Shared<A> {
    type Buffer<T> = SharedBuffer<T, A>;
    type Grow = GrowDoubling;
    type Index = usize;
}

/// An empty shared buffer holds no block until its first growth.
#[inline]
fn shared_for_capacity<T, A: Allocator>(
    capacity: usize,
    alloc: A,
    fork: ForkFn<T>,
) -> Result<SharedBuffer<T, A>, StorageError> {
    if capacity == 0 {
        Ok(SharedBuffer::dangling(alloc, fork))
    } else {
        SharedBuffer::allocate_in(capacity, None, alloc, fork)
    }
}

impl<T: Clone, A: AllocatorDefault> VecConfigNew<T> for Shared<A> {
    const EMPTY_BUFFER: SharedBuffer<T, A> = SharedBuffer::DEFAULT;

    #[inline]
    fn buffer_try_new(capacity: usize, _exact: bool) -> Result<SharedBuffer<T, A>, StorageError> {
        shared_for_capacity(capacity, A::DEFAULT, clone_slots::<T>)
    }
}

impl<T: Clone, A: Allocator + Clone> VecConfigSpawn<T> for Shared<A> {
    #[inline]
    fn buffer_try_spawn(
        buf: &SharedBuffer<T, A>,
        capacity: usize,
        _exact: bool,
    ) -> Result<SharedBuffer<T, A>, StorageError> {
        shared_for_capacity(capacity, buf.alloc.clone(), clone_slots::<T>)
    }
}

impl<T: Clone, A: Allocator + Clone> VecNewIn<T> for Shared<A> {
    type Config = Self;

    #[inline]
    fn buffer_try_new_in(
        self,
        capacity: usize,
        _exact: bool,
    ) -> Result<SharedBuffer<T, A>, StorageError> {
        shared_for_capacity(capacity, self.alloc, clone_slots::<T>)
    }
}
