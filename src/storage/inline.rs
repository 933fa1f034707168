use const_default::ConstDefault;

use super::{array::ArrayStorage, RawBuffer};
use crate::error::StorageError;

/// A marker type used to indicate the fixed allocation strategy, which
/// stores up to `N` items within the collection handle and never
/// reallocates.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Fixed<const N: usize>;

/// An inline storage buffer with a fixed capacity.
#[derive(Debug)]
pub struct InlineBuffer<T, const N: usize> {
    pub(crate) storage: ArrayStorage<T, N>,
    pub(crate) length: usize,
}

impl<T, const N: usize> InlineBuffer<T, N> {
    pub(crate) fn try_for_capacity(capacity: usize) -> Result<Self, StorageError> {
        if capacity <= N {
            Ok(Self::DEFAULT)
        } else {
            Err(StorageError::CapacityLimit)
        }
    }
}

impl<T, const N: usize> ConstDefault for InlineBuffer<T, N> {
    const DEFAULT: Self = Self {
        storage: ArrayStorage::DEFAULT,
        length: 0,
    };
}

impl<T, const N: usize> Default for InlineBuffer<T, N> {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<T, const N: usize> RawBuffer for InlineBuffer<T, N> {
    type RawData = T;

    #[inline]
    fn data_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    #[inline]
    fn data_ptr_mut(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }
}
