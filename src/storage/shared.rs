use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::sync::atomic::{fence, AtomicUsize, Ordering};

use const_default::ConstDefault;

use super::utils::data_offset;
use super::{slots, RawBuffer, ReleaseFn};
use crate::alloc::{Allocator, AllocatorDefault, Global};
use crate::error::{OrPanic, StorageError};

/// A marker type used to indicate the shared strategy. Clones of the
/// collection share one reference-counted buffer allocated from `A`, and
/// the buffer is copied when a shared instance is modified.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Shared<A: Allocator = Global> {
    pub(crate) alloc: A,
}

impl<A: Allocator> Shared<A> {
    /// Allocate shared buffers from the allocator instance `alloc`.
    pub const fn with_alloc(alloc: A) -> Self {
        Self { alloc }
    }
}

impl<A: AllocatorDefault> ConstDefault for Shared<A> {
    const DEFAULT: Self = Self { alloc: A::DEFAULT };
}

/// Copy `len` items from the first pointer into the uninitialized
/// slots at the second pointer.
pub(crate) type ForkFn<T> = unsafe fn(*const T, *mut T, usize);

/// The control block stored in front of the items of a shared buffer.
struct SharedHeader<T> {
    refs: AtomicUsize,
    capacity: usize,
    length: usize,
    release: Option<ReleaseFn<T>>,
}

/// A reference-counted storage buffer supporting copy-on-write.
///
/// Read access never copies. Any mutable access to a buffer with more than
/// one reference first moves this handle to a private copy of the items.
pub struct SharedBuffer<T, A: Allocator = Global> {
    header: NonNull<SharedHeader<T>>,
    pub(crate) alloc: A,
    fork: ForkFn<T>,
    _pd: PhantomData<T>,
}

impl<T, A: Allocator> SharedBuffer<T, A> {
    const DATA_OFFSET: usize = data_offset::<SharedHeader<T>, T>();

    #[inline]
    pub(crate) const fn dangling(alloc: A, fork: ForkFn<T>) -> Self {
        Self {
            header: NonNull::dangling(),
            alloc,
            fork,
            _pd: PhantomData,
        }
    }

    pub(crate) fn allocate_in(
        capacity: usize,
        release: Option<ReleaseFn<T>>,
        alloc: A,
        fork: ForkFn<T>,
    ) -> Result<Self, StorageError> {
        let layout = Self::layout(capacity)?;
        let header: NonNull<SharedHeader<T>> = alloc
            .allocate(layout)
            .map_err(|_| StorageError::AllocError(layout))?
            .cast();
        unsafe {
            header.as_ptr().write(SharedHeader {
                refs: AtomicUsize::new(1),
                capacity,
                length: 0,
                release,
            })
        };
        Ok(Self {
            header,
            alloc,
            fork,
            _pd: PhantomData,
        })
    }

    #[inline]
    fn layout(capacity: usize) -> Result<Layout, StorageError> {
        let (layout, _) = Layout::new::<SharedHeader<T>>().extend(Layout::array::<T>(capacity)?)?;
        Ok(layout)
    }

    #[inline]
    pub(crate) fn is_dangling(&self) -> bool {
        self.header == NonNull::dangling()
    }

    #[inline]
    fn header(&self) -> Option<&SharedHeader<T>> {
        if self.is_dangling() {
            None
        } else {
            Some(unsafe { self.header.as_ref() })
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.header().map_or(0, |h| h.capacity)
    }

    #[inline]
    pub(crate) fn length(&self) -> usize {
        self.header().map_or(0, |h| h.length)
    }

    /// The number of handles sharing this buffer.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.header().map_or(1, |h| h.refs.load(Ordering::Acquire))
    }

    /// Determine whether this handle is the only reference to the buffer.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }

    #[inline]
    fn data(&self) -> NonNull<T> {
        if self.is_dangling() {
            NonNull::dangling()
        } else {
            unsafe {
                NonNull::new_unchecked(
                    (self.header.as_ptr() as *mut u8)
                        .add(Self::DATA_OFFSET)
                        .cast(),
                )
            }
        }
    }
}

impl<T, A: Allocator + Clone> SharedBuffer<T, A> {
    /// Create a new handle to the same buffer.
    pub(crate) fn share(&self) -> Self {
        if let Some(header) = self.header() {
            header.refs.fetch_add(1, Ordering::Relaxed);
        }
        Self {
            header: self.header,
            alloc: self.alloc.clone(),
            fork: self.fork,
            _pd: PhantomData,
        }
    }

    /// Ensure that this handle is the only reference to its buffer,
    /// copying the items when necessary.
    pub(crate) fn make_unique(&mut self) -> Result<(), StorageError> {
        if self.is_unique() {
            Ok(())
        } else {
            self.fork_to(self.capacity())
        }
    }

    fn fork_to(&mut self, capacity: usize) -> Result<(), StorageError> {
        let length = self.length();
        let release = self.header().and_then(|h| h.release);
        let mut fresh = Self::allocate_in(
            capacity.max(length),
            release,
            self.alloc.clone(),
            self.fork,
        )?;
        unsafe {
            (self.fork)(self.data().as_ptr(), fresh.data().as_ptr(), length);
            fresh.header.as_mut().length = length;
        }
        log::trace!(
            "forked shared buffer with {} items ({} references)",
            length,
            self.ref_count()
        );
        // Releases this handle's reference to the previous buffer.
        *self = fresh;
        Ok(())
    }

    pub(crate) fn grow(&mut self, capacity: usize) -> Result<(), StorageError> {
        if capacity <= self.capacity() {
            return self.make_unique();
        }
        if self.is_dangling() {
            *self = Self::allocate_in(capacity, None, self.alloc.clone(), self.fork)?;
        } else if !self.is_unique() {
            self.fork_to(capacity)?;
        } else {
            let old_layout = Self::layout(self.capacity())?;
            let new_layout = Self::layout(capacity)?;
            let ptr = unsafe { self.alloc.grow(self.header.cast(), old_layout, new_layout) }
                .map_err(|_| StorageError::AllocError(new_layout))?;
            self.header = ptr.cast();
            unsafe { self.header.as_mut().capacity = capacity };
        }
        Ok(())
    }

    pub(crate) fn shrink(&mut self, capacity: usize) -> Result<(), StorageError> {
        let capacity = capacity.max(self.length());
        if self.is_dangling() || capacity >= self.capacity() {
            return Ok(());
        }
        if !self.is_unique() {
            return self.fork_to(capacity);
        }
        let old_layout = Self::layout(self.capacity())?;
        let new_layout = Self::layout(capacity)?;
        let ptr = unsafe { self.alloc.shrink(self.header.cast(), old_layout, new_layout) }
            .map_err(|_| StorageError::AllocError(new_layout))?;
        self.header = ptr.cast();
        unsafe { self.header.as_mut().capacity = capacity };
        Ok(())
    }

    /// # Safety
    /// The items in `[0, length)` must be initialized.
    #[inline]
    pub(crate) unsafe fn set_length(&mut self, length: usize) {
        if self.is_dangling() {
            debug_assert_eq!(length, 0);
            return;
        }
        self.make_unique().or_panic();
        self.header.as_mut().length = length;
    }
}

impl<T: Clone, A: AllocatorDefault> ConstDefault for SharedBuffer<T, A> {
    const DEFAULT: Self = Self::dangling(A::DEFAULT, slots::clone_slots::<T>);
}

impl<T, A: Allocator + Clone> RawBuffer for SharedBuffer<T, A> {
    type RawData = T;

    #[inline]
    fn data_ptr(&self) -> *const T {
        self.data().as_ptr()
    }

    #[inline]
    fn data_ptr_mut(&mut self) -> *mut T {
        self.make_unique().or_panic();
        self.data().as_ptr()
    }
}

impl<T, A: Allocator> fmt::Debug for SharedBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("capacity", &self.capacity())
            .field("length", &self.length())
            .field("refs", &self.ref_count())
            .finish_non_exhaustive()
    }
}

impl<T, A: Allocator> Drop for SharedBuffer<T, A> {
    fn drop(&mut self) {
        let Some(header) = self.header() else {
            return;
        };
        if header.refs.fetch_sub(1, Ordering::Release) != 1 {
            return;
        }
        fence(Ordering::Acquire);
        let (capacity, length, release) = (header.capacity, header.length, header.release);
        let data = self.data();
        unsafe { slots::drop_slots(data.as_ptr(), length) };
        if let Some(release) = release {
            release(data, capacity);
        }
        if let Ok(layout) = Self::layout(capacity) {
            unsafe { self.alloc.deallocate(self.header.cast(), layout) };
        }
    }
}

// Handles may be sent to other threads while the buffer remains shared,
// so both bounds require `T: Send + Sync`.
unsafe impl<T: Send + Sync, A: Allocator + Send + Sync> Send for SharedBuffer<T, A> {}

unsafe impl<T: Send + Sync, A: Allocator + Send + Sync> Sync for SharedBuffer<T, A> {}
