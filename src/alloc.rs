//! Memory allocation interfaces.
//!
//! Collections request memory through the [`Allocator`] trait. With the
//! `allocator-api2` feature the trait and [`Global`] of that crate are used
//! instead, so its allocators can back these collections directly.

#[cfg(any(
    test,
    not(feature = "alloc"),
    not(feature = "allocator-api2"),
    feature = "zeroize"
))]
use core::alloc::Layout;
#[cfg(any(
    not(feature = "allocator-api2"),
    not(feature = "alloc"),
    feature = "zeroize"
))]
use core::ptr::NonNull;
#[cfg(not(feature = "allocator-api2"))]
use core::{fmt, ptr};

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
use alloc_crate::alloc::{alloc as raw_alloc, dealloc as raw_dealloc};

#[cfg(all(feature = "alloc", feature = "allocator-api2"))]
pub use allocator_api2::alloc::Global;
#[cfg(feature = "allocator-api2")]
pub use allocator_api2::alloc::{AllocError, Allocator};

#[cfg(all(not(test), feature = "alloc"))]
pub use alloc_crate::alloc::handle_alloc_error;

/// Abort handler for a failed allocation. Unit tests and `no_std` builds
/// without `alloc` panic instead.
#[cfg(any(test, not(feature = "alloc")))]
pub fn handle_alloc_error(layout: Layout) -> ! {
    panic!("memory allocation of {} bytes failed", layout.size());
}

/// Returned by an [`Allocator`] which could not provide the requested block.
#[cfg(not(feature = "allocator-api2"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocError;

#[cfg(not(feature = "allocator-api2"))]
impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

#[cfg(all(feature = "std", not(feature = "allocator-api2")))]
impl std::error::Error for AllocError {}

/// A source of memory blocks described by a [`Layout`].
///
/// # Safety
/// A block handed out by `allocate` stays valid until it is passed back to
/// `deallocate`, even when the allocator value is moved or cloned. Clones
/// must accept blocks produced by one another.
#[cfg(not(feature = "allocator-api2"))]
pub unsafe trait Allocator {
    /// Request a block for `layout`. The block may be larger than requested.
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError>;

    /// Hand a block back to the allocator.
    ///
    /// # Safety
    /// `ptr` must be a live block from this allocator, obtained for `layout`.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Move the contents of a block into a larger one.
    ///
    /// # Safety
    /// `ptr` must be a live block from this allocator, obtained for
    /// `old_layout`, and `new_layout` must not be smaller.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new_layout.size() >= old_layout.size());
        move_block(self, ptr, old_layout, new_layout)
    }

    /// Move the leading contents of a block into a smaller one.
    ///
    /// # Safety
    /// `ptr` must be a live block from this allocator, obtained for
    /// `old_layout`, and `new_layout` must not be larger.
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new_layout.size() <= old_layout.size());
        move_block(self, ptr, old_layout, new_layout)
    }
}

/// Allocate a block for `new_layout`, copy over the bytes both layouts have
/// in common and release the old block.
#[cfg(not(feature = "allocator-api2"))]
unsafe fn move_block<A: Allocator + ?Sized>(
    alloc: &A,
    ptr: NonNull<u8>,
    old_layout: Layout,
    new_layout: Layout,
) -> Result<NonNull<[u8]>, AllocError> {
    let block = alloc.allocate(new_layout)?;
    let count = old_layout.size().min(new_layout.size());
    ptr::copy_nonoverlapping(ptr.as_ptr(), block.cast::<u8>().as_ptr(), count);
    alloc.deallocate(ptr, old_layout);
    Ok(block)
}

/// Allocators with a constant instance, used by `const fn new()`.
///
/// `ConstDefault` cannot be implemented for the `Global` allocator of
/// `allocator-api2`, hence the separate trait.
pub trait AllocatorDefault: Allocator + Clone + Default {
    /// The constant instance.
    const DEFAULT: Self;
}

/// Marks allocators which wipe every block they release.
pub trait AllocatorZeroizes: Allocator {}

/// The global memory allocator.
///
/// With the `alloc` feature this forwards to the `#[global_allocator]`.
/// Without it, every request is refused, which leaves only the inline and
/// caller-owned storage usable.
#[cfg(any(not(feature = "alloc"), not(feature = "allocator-api2")))]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "alloc", derive(Default, Copy))]
pub struct Global;

#[cfg(all(feature = "alloc", not(feature = "allocator-api2")))]
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            // an empty block only needs to be aligned
            let dangling = unsafe { NonNull::new_unchecked(layout.align() as *mut u8) };
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        let block = NonNull::new(unsafe { raw_alloc(layout) }).ok_or(AllocError)?;
        Ok(NonNull::slice_from_raw_parts(block, layout.size()))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            raw_dealloc(ptr.as_ptr(), layout);
        }
    }
}

#[cfg(not(feature = "alloc"))]
unsafe impl Allocator for Global {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        Err(AllocError)
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}

#[cfg(feature = "alloc")]
impl AllocatorDefault for Global {
    const DEFAULT: Self = Global;
}

/// Wraps an allocator `A` so that each block is zeroed before it is
/// handed back.
///
/// Growing or shrinking always moves to a new block, so the old one passes
/// through `deallocate` and is wiped as well.
#[cfg(feature = "zeroize")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroizingAlloc<A>(pub A);

#[cfg(feature = "zeroize")]
unsafe impl<A: Allocator> Allocator for ZeroizingAlloc<A> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.0.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            zeroize::Zeroize::zeroize(core::slice::from_raw_parts_mut(
                ptr.as_ptr(),
                layout.size(),
            ));
        }
        self.0.deallocate(ptr, layout)
    }
}

#[cfg(feature = "zeroize")]
impl<A: AllocatorDefault> AllocatorDefault for ZeroizingAlloc<A> {
    const DEFAULT: Self = ZeroizingAlloc(A::DEFAULT);
}

#[cfg(feature = "zeroize")]
impl<A: Allocator> AllocatorZeroizes for ZeroizingAlloc<A> {}
