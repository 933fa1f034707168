use core::alloc::Layout;
use core::mem::align_of;

/// The smallest non-zero capacity requested when a buffer first grows.
pub const fn min_non_zero_cap<T>() -> usize {
    if core::mem::size_of::<T>() == 1 {
        8
    } else if core::mem::size_of::<T>() <= 1024 {
        4
    } else {
        1
    }
}

/// Calculate the byte offset of `Data` when following `Header` in one
/// allocation. This matches the offset produced by `Layout::extend`.
pub const fn data_offset<Header, Data>() -> usize {
    let header = Layout::new::<Header>();
    let data_align = align_of::<Data>();
    header.size().wrapping_add(data_align).wrapping_sub(1) & !data_align.wrapping_sub(1)
}
