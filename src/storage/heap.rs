use core::alloc::Layout;
use core::fmt;
use core::mem::{size_of, ManuallyDrop};
use core::ptr::{self, NonNull};

use const_default::ConstDefault;

use super::RawBuffer;
use crate::alloc::{Allocator, AllocatorDefault};
use crate::capacity::Index;
use crate::error::StorageError;

/// The buffer behind heap-allocated vectors, owned by a single collection.
///
/// The capacity and length are kept in the handle. No block is held while
/// the capacity is zero or the items are zero-sized.
pub struct HeapBuffer<T, I: Index, A: Allocator> {
    pub(crate) data: NonNull<T>,
    pub(crate) capacity: I,
    pub(crate) length: I,
    pub(crate) alloc: A,
}

impl<T, I: Index, A: Allocator> HeapBuffer<T, I, A> {
    #[inline]
    pub(crate) const fn empty_in(alloc: A) -> Self {
        Self {
            data: NonNull::dangling(),
            capacity: I::ZERO,
            length: I::ZERO,
            alloc,
        }
    }

    pub(crate) fn try_with_capacity_in(
        capacity: I,
        alloc: A,
        exact: bool,
    ) -> Result<Self, StorageError> {
        let mut buf = Self::empty_in(alloc);
        buf.resize(capacity, exact)?;
        Ok(buf)
    }

    /// # Safety
    /// `data` must be a block from `alloc` sized for `capacity` items, or
    /// dangling when no block is held, and the first `length` items must be
    /// initialized.
    #[inline]
    pub(crate) unsafe fn from_parts(data: NonNull<T>, length: I, capacity: I, alloc: A) -> Self {
        Self {
            data,
            capacity,
            length,
            alloc,
        }
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (NonNull<T>, I, I, A) {
        let buf = ManuallyDrop::new(self);
        // the allocator is moved out exactly once and the handle is never dropped
        let alloc = unsafe { ptr::read(&buf.alloc) };
        (buf.data, buf.length, buf.capacity, alloc)
    }

    /// The layout of the block currently held, if any.
    #[inline]
    fn block_layout(&self) -> Option<Layout> {
        if self.capacity == I::ZERO || size_of::<T>() == 0 {
            None
        } else {
            Layout::array::<T>(self.capacity.to_usize()).ok()
        }
    }

    /// Move the items to a block for `capacity` items. When `exact` is not
    /// set, any extra room the allocator hands out becomes usable capacity.
    pub(crate) fn resize(&mut self, capacity: I, exact: bool) -> Result<(), StorageError> {
        debug_assert!(capacity >= self.length);
        if size_of::<T>() == 0 {
            self.capacity = if exact {
                capacity
            } else {
                I::from_usize(I::MAX_USIZE)
            };
            return Ok(());
        }
        if capacity == I::ZERO {
            self.release();
            return Ok(());
        }
        let layout = Layout::array::<T>(capacity.to_usize())?;
        let block = match self.block_layout() {
            None => self.alloc.allocate(layout),
            Some(current) if current.size() <= layout.size() => unsafe {
                self.alloc.grow(self.data.cast(), current, layout)
            },
            Some(current) => unsafe { self.alloc.shrink(self.data.cast(), current, layout) },
        }
        .map_err(|_| StorageError::AllocError(layout))?;
        self.data = block.cast();
        self.capacity = if exact {
            capacity
        } else {
            I::from_usize((block.len() / size_of::<T>()).min(I::MAX_USIZE))
        };
        Ok(())
    }

    /// Hand the block back to the allocator. The items must already have
    /// been dropped or moved out.
    fn release(&mut self) {
        if let Some(layout) = self.block_layout() {
            unsafe { self.alloc.deallocate(self.data.cast(), layout) };
        }
        self.data = NonNull::dangling();
        self.capacity = I::ZERO;
    }
}

impl<T, I: Index, A: AllocatorDefault> ConstDefault for HeapBuffer<T, I, A> {
    const DEFAULT: Self = Self::empty_in(A::DEFAULT);
}

impl<T, I: Index, A: Allocator> RawBuffer for HeapBuffer<T, I, A> {
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

impl<T, I: Index, A: Allocator> fmt::Debug for HeapBuffer<T, I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBuffer")
            .field("data", &self.data)
            .field("capacity", &self.capacity)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl<T, I: Index, A: Allocator> Drop for HeapBuffer<T, I, A> {
    fn drop(&mut self) {
        self.release();
    }
}

unsafe impl<T: Send, I: Index, A: Allocator + Send> Send for HeapBuffer<T, I, A> {}

unsafe impl<T: Sync, I: Index, A: Allocator + Sync> Sync for HeapBuffer<T, I, A> {}

#[cfg(feature = "zeroize")]
impl<T, I: Index, A: crate::alloc::AllocatorZeroizes> zeroize::ZeroizeOnDrop
    for HeapBuffer<T, I, A>
{
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::HeapBuffer;
    use crate::alloc::Global;

    #[test]
    fn heap_resize_keeps_items() {
        let mut buf = HeapBuffer::<u32, usize, Global>::try_with_capacity_in(2, Global, true)
            .unwrap();
        assert_eq!(buf.capacity, 2);
        unsafe {
            buf.data.as_ptr().write(5);
            buf.data.as_ptr().add(1).write(6);
        }
        buf.length = 2;
        buf.resize(9, true).unwrap();
        assert_eq!(buf.capacity, 9);
        buf.resize(2, true).unwrap();
        assert_eq!(buf.capacity, 2);
        assert_eq!(unsafe { buf.data.as_ptr().add(1).read() }, 6);
        buf.length = 0;
        buf.resize(0, true).unwrap();
        assert_eq!(buf.capacity, 0);
    }

    #[test]
    fn heap_zero_sized_items() {
        let buf = HeapBuffer::<(), u8, Global>::try_with_capacity_in(3, Global, false).unwrap();
        assert_eq!(buf.capacity, u8::MAX);
        let (_, length, capacity, _) = buf.into_parts();
        assert_eq!((length, capacity), (0, u8::MAX));
    }
}
