//! Backing storage types for collections.

use core::ptr::NonNull;

use const_default::ConstDefault;

mod array;
mod heap;
mod inline;
pub(crate) mod insert;
mod remote;
mod sbo;
pub(crate) mod shared;
pub(crate) mod slots;
pub(crate) mod utils;

pub use self::{
    array::ArrayStorage,
    heap::HeapBuffer,
    inline::{Fixed, InlineBuffer},
    remote::{Remote, RemoteBuffer},
    sbo::{Sbo, SboBuffer},
    shared::{Shared, SharedBuffer},
};

/// A callback invoked when a caller-supplied or shared buffer is released.
/// It receives the address of the buffer and its capacity, after all
/// contained items have been dropped.
pub type ReleaseFn<T> = fn(NonNull<T>, usize);

/// Create a new array storage buffer for type `T` and maximum capacity `N`.
pub const fn array_storage<T, const N: usize>() -> ArrayStorage<T, N> {
    ArrayStorage::DEFAULT
}

/// Provide access to the associated data for abstract buffer types.
pub trait RawBuffer: Sized {
    /// The concrete data type.
    type RawData: ?Sized;

    /// Access the data as a readonly pointer.
    fn data_ptr(&self) -> *const Self::RawData;

    /// Access the data as a mutable pointer. Shared buffers are made
    /// unique before the pointer is returned.
    fn data_ptr_mut(&mut self) -> *mut Self::RawData;
}
