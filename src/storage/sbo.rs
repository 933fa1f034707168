use core::alloc::Layout;
use core::fmt;
use core::ptr::{self, NonNull};

use const_default::ConstDefault;

use super::{array::ArrayStorage, RawBuffer};
use crate::alloc::{Allocator, AllocatorDefault, Global};
use crate::error::StorageError;

/// A marker type used to indicate the small-buffer strategy. Up to `N`
/// items are stored within the collection handle, and larger buffers are
/// requested from the allocator `A`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Sbo<const N: usize, A: Allocator = Global> {
    pub(crate) alloc: A,
}

impl<const N: usize, A: Allocator> Sbo<N, A> {
    /// Spill into the allocator instance `alloc` once the inline buffer is
    /// exhausted.
    pub const fn with_alloc(alloc: A) -> Self {
        Self { alloc }
    }
}

impl<const N: usize, A: AllocatorDefault> ConstDefault for Sbo<N, A> {
    const DEFAULT: Self = Self { alloc: A::DEFAULT };
}

/// An inline storage buffer which moves its contents to the heap when
/// its capacity is exceeded.
///
/// Once spilled, the buffer behaves like a heap buffer. It only returns
/// to the inline storage when explicitly shrunk to a capacity of `N` or
/// less.
pub struct SboBuffer<T, const N: usize, A: Allocator = Global> {
    pub(crate) heap: NonNull<T>,
    pub(crate) capacity: usize,
    pub(crate) length: usize,
    pub(crate) alloc: A,
    pub(crate) storage: ArrayStorage<T, N>,
}

impl<T, const N: usize, A: Allocator> SboBuffer<T, N, A> {
    #[inline]
    pub(crate) const fn new_in(alloc: A) -> Self {
        Self {
            heap: NonNull::dangling(),
            capacity: N,
            length: 0,
            alloc,
            storage: ArrayStorage::DEFAULT,
        }
    }

    pub(crate) fn try_for_capacity_in(capacity: usize, alloc: A) -> Result<Self, StorageError> {
        let mut buf = Self::new_in(alloc);
        buf.grow(capacity)?;
        Ok(buf)
    }

    /// Determine whether the contents have been moved to the heap.
    #[inline]
    pub fn is_spilled(&self) -> bool {
        self.capacity > N
    }

    pub(crate) fn grow(&mut self, capacity: usize) -> Result<(), StorageError> {
        if capacity <= self.capacity {
            return Ok(());
        }
        let new_layout = Layout::array::<T>(capacity)?;
        if self.is_spilled() {
            let old_layout = Layout::array::<T>(self.capacity)?;
            let ptr = unsafe { self.alloc.grow(self.heap.cast(), old_layout, new_layout) }
                .map_err(|_| StorageError::AllocError(new_layout))?;
            self.heap = ptr.cast();
        } else {
            let heap: NonNull<T> = self
                .alloc
                .allocate(new_layout)
                .map_err(|_| StorageError::AllocError(new_layout))?
                .cast();
            unsafe { ptr::copy_nonoverlapping(self.storage.as_ptr(), heap.as_ptr(), self.length) };
            self.heap = heap;
            log::trace!(
                "spilled {} items from inline storage ({}) to heap capacity {}",
                self.length,
                N,
                capacity
            );
        }
        self.capacity = capacity;
        Ok(())
    }

    pub(crate) fn shrink(&mut self, capacity: usize) -> Result<(), StorageError> {
        if !self.is_spilled() {
            return Ok(());
        }
        let capacity = capacity.max(self.length);
        let old_layout = Layout::array::<T>(self.capacity)?;
        if capacity <= N {
            unsafe {
                ptr::copy_nonoverlapping(self.heap.as_ptr(), self.storage.as_mut_ptr(), self.length);
                self.alloc.deallocate(self.heap.cast(), old_layout);
            }
            self.heap = NonNull::dangling();
            self.capacity = N;
            log::trace!("returned {} items to inline storage", self.length);
        } else if capacity < self.capacity {
            let new_layout = Layout::array::<T>(capacity)?;
            let ptr = unsafe { self.alloc.shrink(self.heap.cast(), old_layout, new_layout) }
                .map_err(|_| StorageError::AllocError(new_layout))?;
            self.heap = ptr.cast();
            self.capacity = capacity;
        }
        Ok(())
    }
}

impl<T, const N: usize, A: AllocatorDefault> ConstDefault for SboBuffer<T, N, A> {
    const DEFAULT: Self = Self::new_in(A::DEFAULT);
}

impl<T, const N: usize, A: Allocator> RawBuffer for SboBuffer<T, N, A> {
    type RawData = T;

    #[inline]
    fn data_ptr(&self) -> *const T {
        if self.is_spilled() {
            self.heap.as_ptr()
        } else {
            self.storage.as_ptr()
        }
    }

    #[inline]
    fn data_ptr_mut(&mut self) -> *mut T {
        if self.is_spilled() {
            self.heap.as_ptr()
        } else {
            self.storage.as_mut_ptr()
        }
    }
}

impl<T, const N: usize, A: Allocator> fmt::Debug for SboBuffer<T, N, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SboBuffer")
            .field("capacity", &self.capacity)
            .field("length", &self.length)
            .field("spilled", &self.is_spilled())
            .finish_non_exhaustive()
    }
}

impl<T, const N: usize, A: Allocator> Drop for SboBuffer<T, N, A> {
    fn drop(&mut self) {
        if self.is_spilled() {
            if let Ok(layout) = Layout::array::<T>(self.capacity) {
                unsafe { self.alloc.deallocate(self.heap.cast(), layout) };
            }
        }
    }
}

unsafe impl<T: Send, const N: usize, A: Allocator + Send> Send for SboBuffer<T, N, A> {}

unsafe impl<T: Sync, const N: usize, A: Allocator + Sync> Sync for SboBuffer<T, N, A> {}
