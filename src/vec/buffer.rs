//! The buffer interface shared by every `Vec` storage policy.

use core::mem::MaybeUninit;
use core::slice;

use crate::alloc::Allocator;
use crate::capacity::Index;
use crate::error::StorageError;
use crate::storage::{HeapBuffer, InlineBuffer, RawBuffer, RemoteBuffer, SboBuffer, SharedBuffer};

/// Storage for the items of a `Vec`: a run of `capacity` slots of which the
/// first `length` are initialized.
pub trait VecBuffer: RawBuffer<RawData = Self::Item> {
    /// The item type.
    type Item;

    /// The type holding the capacity and length.
    type Index: Index;

    /// The number of slots.
    fn capacity(&self) -> Self::Index;

    /// The number of initialized slots at the start of the buffer.
    fn length(&self) -> Self::Index;

    /// Record a new number of initialized slots.
    ///
    /// # Safety
    /// `len` may not exceed the capacity, and the slots in `[0, len)` must
    /// be initialized.
    unsafe fn set_length(&mut self, len: Self::Index);

    /// All slots, initialized or not.
    #[inline]
    fn as_uninit_slice(&mut self) -> &mut [MaybeUninit<Self::Item>] {
        let capacity = self.capacity().to_usize();
        unsafe { slice::from_raw_parts_mut(self.data_ptr_mut().cast(), capacity) }
    }

    /// The initialized items.
    #[inline]
    fn as_slice(&self) -> &[Self::Item] {
        unsafe { slice::from_raw_parts(self.data_ptr(), self.length().to_usize()) }
    }

    /// The initialized items, writable.
    #[inline]
    fn as_mut_slice(&mut self) -> &mut [Self::Item] {
        let data = self.data_ptr_mut();
        unsafe { slice::from_raw_parts_mut(data, self.length().to_usize()) }
    }

    /// A single slot.
    ///
    /// # Safety
    /// `index` must be less than the capacity.
    #[inline]
    unsafe fn uninit_index(&mut self, index: usize) -> &mut MaybeUninit<Self::Item> {
        &mut *self.data_ptr_mut().add(index).cast()
    }

    /// Make room for at least `capacity` items. Unless `exact` is set, the
    /// buffer may end up larger.
    fn grow_buffer(&mut self, capacity: Self::Index, exact: bool) -> Result<(), StorageError>;

    /// Release room beyond `capacity` items, keeping every initialized item.
    fn shrink_buffer(&mut self, capacity: Self::Index) -> Result<(), StorageError>;

    /// Whether the slots live inside the buffer value, so that moving the
    /// buffer moves the items.
    #[inline]
    fn is_inline(&self) -> bool {
        false
    }

    /// Whether no other handle refers to the same items.
    #[inline]
    fn is_unique(&self) -> bool {
        true
    }

    /// A second handle to the same items, for buffers which can be shared.
    #[inline]
    fn try_share(&self) -> Option<Self> {
        None
    }
}

/// Length bookkeeping for the buffers which keep a plain `length: usize`.
macro_rules! usize_length {
    () => {
        type Item = T;
        type Index = usize;

        #[inline]
        fn length(&self) -> usize {
            self.length
        }

        #[inline]
        unsafe fn set_length(&mut self, len: usize) {
            self.length = len;
        }
    };
}

impl<T, I: Index, A: Allocator> VecBuffer for HeapBuffer<T, I, A> {
    type Item = T;
    type Index = I;

    #[inline]
    fn capacity(&self) -> I {
        self.capacity
    }

    #[inline]
    fn length(&self) -> I {
        self.length
    }

    #[inline]
    unsafe fn set_length(&mut self, len: I) {
        self.length = len;
    }

    #[inline]
    fn grow_buffer(&mut self, capacity: I, exact: bool) -> Result<(), StorageError> {
        if capacity > self.capacity {
            self.resize(capacity, exact)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn shrink_buffer(&mut self, capacity: I) -> Result<(), StorageError> {
        let capacity = capacity.max(self.length);
        if capacity < self.capacity {
            self.resize(capacity, true)
        } else {
            Ok(())
        }
    }
}

impl<T, const N: usize> VecBuffer for InlineBuffer<T, N> {
    usize_length!();

    #[inline]
    fn capacity(&self) -> usize {
        N
    }

    #[inline]
    fn grow_buffer(&mut self, capacity: usize, _exact: bool) -> Result<(), StorageError> {
        if capacity > N {
            Err(StorageError::CapacityLimit)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn shrink_buffer(&mut self, _capacity: usize) -> Result<(), StorageError> {
        Ok(())
    }

    #[inline]
    fn is_inline(&self) -> bool {
        true
    }
}

impl<T, const N: usize, A: Allocator> VecBuffer for SboBuffer<T, N, A> {
    usize_length!();

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn grow_buffer(&mut self, capacity: usize, _exact: bool) -> Result<(), StorageError> {
        self.grow(capacity)
    }

    #[inline]
    fn shrink_buffer(&mut self, capacity: usize) -> Result<(), StorageError> {
        self.shrink(capacity)
    }

    #[inline]
    fn is_inline(&self) -> bool {
        !self.is_spilled()
    }
}

impl<T> VecBuffer for RemoteBuffer<'_, T> {
    usize_length!();

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn grow_buffer(&mut self, capacity: usize, _exact: bool) -> Result<(), StorageError> {
        self.check_capacity(capacity)
    }

    #[inline]
    fn shrink_buffer(&mut self, _capacity: usize) -> Result<(), StorageError> {
        // caller-owned memory is never resized
        Ok(())
    }
}

impl<T, A: Allocator + Clone> VecBuffer for SharedBuffer<T, A> {
    type Item = T;
    type Index = usize;

    #[inline]
    fn capacity(&self) -> usize {
        SharedBuffer::capacity(self)
    }

    #[inline]
    fn length(&self) -> usize {
        SharedBuffer::length(self)
    }

    #[inline]
    unsafe fn set_length(&mut self, len: usize) {
        SharedBuffer::set_length(self, len)
    }

    #[inline]
    fn grow_buffer(&mut self, capacity: usize, _exact: bool) -> Result<(), StorageError> {
        self.grow(capacity)
    }

    #[inline]
    fn shrink_buffer(&mut self, capacity: usize) -> Result<(), StorageError> {
        self.shrink(capacity)
    }

    #[inline]
    fn is_unique(&self) -> bool {
        SharedBuffer::is_unique(self)
    }

    #[inline]
    fn try_share(&self) -> Option<Self> {
        Some(self.share())
    }
}
