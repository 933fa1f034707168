use core::fmt;
use core::marker::PhantomData;
use core::mem::{ManuallyDrop, MaybeUninit};
use core::ptr::NonNull;
use core::slice;

use super::{RawBuffer, ReleaseFn};
use crate::error::StorageError;

/// A marker type used to indicate the remote strategy. Items are stored in
/// caller-owned memory borrowed for the lifetime `'a`, which the collection
/// never allocates, resizes or frees.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Remote<'a>(PhantomData<&'a mut ()>);

/// A storage buffer over caller-owned memory.
///
/// The collection manages the lifetime of the items within the buffer. When
/// it is dropped, the remaining items are dropped and the optional release
/// callback is invoked. Detaching the buffer skips both.
pub struct RemoteBuffer<'a, T> {
    pub(crate) data: NonNull<T>,
    pub(crate) capacity: usize,
    pub(crate) length: usize,
    pub(crate) release: Option<ReleaseFn<T>>,
    _pd: PhantomData<(T, &'a mut ())>,
}

impl<'a, T> RemoteBuffer<'a, T> {
    #[inline]
    pub(crate) fn from_uninit(buf: &'a mut [MaybeUninit<T>]) -> Self {
        Self {
            // SAFETY: slice pointers are never null.
            data: unsafe { NonNull::new_unchecked(buf.as_mut_ptr().cast()) },
            capacity: buf.len(),
            length: 0,
            release: None,
            _pd: PhantomData,
        }
    }

    /// # Safety
    /// `data` must be valid for reads and writes of `capacity` items for the
    /// lifetime `'a`, and the first `length` items must be initialized.
    #[inline]
    pub(crate) unsafe fn from_raw_parts(
        data: NonNull<T>,
        capacity: usize,
        length: usize,
        release: Option<ReleaseFn<T>>,
    ) -> Self {
        debug_assert!(length <= capacity);
        Self {
            data,
            capacity,
            length,
            release,
            _pd: PhantomData,
        }
    }

    pub(crate) fn detach(self) -> (&'a mut [MaybeUninit<T>], usize) {
        let slf = ManuallyDrop::new(self);
        log::debug!(
            "detached remote buffer with {} of {} items",
            slf.length,
            slf.capacity
        );
        let buf = unsafe { slice::from_raw_parts_mut(slf.data.as_ptr().cast(), slf.capacity) };
        (buf, slf.length)
    }

    #[inline]
    pub(crate) fn check_capacity(&self, capacity: usize) -> Result<(), StorageError> {
        if capacity > self.capacity {
            log::debug!(
                "remote buffer cannot grow from {} to {}",
                self.capacity,
                capacity
            );
            Err(StorageError::CapacityLimit)
        } else {
            Ok(())
        }
    }
}

impl<T> RawBuffer for RemoteBuffer<'_, T> {
    type RawData = T;

    #[inline]
    fn data_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline]
    fn data_ptr_mut(&mut self) -> *mut T {
        self.data.as_ptr()
    }
}

impl<T> fmt::Debug for RemoteBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBuffer")
            .field("data", &self.data)
            .field("capacity", &self.capacity)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl<T> Drop for RemoteBuffer<'_, T> {
    fn drop(&mut self) {
        if let Some(release) = self.release {
            release(self.data, self.capacity);
        }
    }
}

unsafe impl<T: Send> Send for RemoteBuffer<'_, T> {}

unsafe impl<T: Sync> Sync for RemoteBuffer<'_, T> {}
