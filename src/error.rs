//! Error types reported by storage and collection updates.

use core::alloc::{Layout, LayoutError};
use core::fmt;

/// The reason a storage buffer could not provide the requested capacity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The allocator refused a block of the given layout.
    AllocError(Layout),
    /// A fixed or caller-owned buffer is full, or the index type cannot
    /// represent the capacity.
    CapacityLimit,
    /// The capacity does not fit in a memory layout.
    LayoutError(LayoutError),
    /// The storage cannot perform the requested operation.
    Unsupported,
}

impl StorageError {
    /// Panic with this error. Allocation failures are passed to the
    /// allocation error handler instead.
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        match self {
            Self::AllocError(layout) => crate::alloc::handle_alloc_error(layout),
            other => panic!("{}", other),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocError(layout) => write!(f, "Allocation of {} bytes failed", layout.size()),
            Self::CapacityLimit => f.write_str("Exceeded storage capacity limit"),
            Self::LayoutError(_) => f.write_str("Capacity exceeds the maximum layout size"),
            Self::Unsupported => f.write_str("Unsupported storage operation"),
        }
    }
}

impl From<LayoutError> for StorageError {
    #[inline]
    fn from(err: LayoutError) -> Self {
        Self::LayoutError(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LayoutError(err) => Some(err),
            _ => None,
        }
    }
}

/// A failed insertion. The value which could not be stored is handed back
/// to the caller along with the cause.
#[derive(Clone)]
pub struct UpdateError<T> {
    error: StorageError,
    value: T,
}

impl<T> UpdateError<T> {
    #[inline]
    pub(crate) fn new(error: StorageError, value: T) -> Self {
        Self { error, value }
    }

    /// The storage failure behind this error.
    pub fn error(&self) -> &StorageError {
        &self.error
    }

    /// Recover the value which was not inserted.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Panic with this error, dropping the value.
    #[cold]
    #[inline(never)]
    pub fn panic(self) -> ! {
        panic!("{}", self)
    }
}

impl<T> fmt::Debug for UpdateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for UpdateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Update error: {}", self.error)
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for UpdateError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Unwraps the result of a fallible update, panicking with its error.
pub(crate) trait OrPanic<T> {
    fn or_panic(self) -> T;
}

impl<T> OrPanic<T> for Result<T, StorageError> {
    #[inline]
    fn or_panic(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => err.panic(),
        }
    }
}

impl<T, V> OrPanic<T> for Result<T, UpdateError<V>> {
    #[inline]
    fn or_panic(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => err.panic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OrPanic, StorageError, UpdateError};
    use core::alloc::Layout;

    #[test]
    #[should_panic(expected = "memory allocation of 8 bytes failed")]
    fn alloc_error_panic() {
        // the test build swaps the aborting handler for a panic
        StorageError::AllocError(Layout::new::<u64>()).panic();
    }

    #[test]
    #[should_panic(expected = "Exceeded storage capacity limit")]
    fn capacity_error_panic() {
        StorageError::CapacityLimit.panic();
    }

    #[test]
    #[should_panic(expected = "Update error: Exceeded storage capacity limit")]
    fn update_error_panic() {
        UpdateError::new(StorageError::CapacityLimit, 5u32).panic();
    }

    #[test]
    fn or_panic_passes_values() {
        assert_eq!(Ok::<_, StorageError>(3u8).or_panic(), 3);
        assert_eq!(Ok::<_, UpdateError<&str>>("kept").or_panic(), "kept");
    }

    #[test]
    #[should_panic(expected = "Unsupported storage operation")]
    fn or_panic_raises_error() {
        Err::<(), _>(StorageError::Unsupported).or_panic();
    }

    #[test]
    fn update_error_value() {
        let err = UpdateError::new(StorageError::CapacityLimit, "item");
        assert_eq!(err.error(), &StorageError::CapacityLimit);
        assert_eq!(
            format!("{}", err),
            "Update error: Exceeded storage capacity limit"
        );
        assert_eq!(format!("{:?}", err), "UpdateError { error: CapacityLimit, .. }");
        assert_eq!(err.into_value(), "item");
    }

    #[test]
    fn layout_error_display() {
        let err: StorageError = Layout::array::<u64>(usize::MAX).unwrap_err().into();
        assert_eq!(
            format!("{}", err),
            "Capacity exceeds the maximum layout size"
        );
    }
}
