//! Index types for lengths and capacities, and the policies deciding how
//! far storage grows once it is full.

use core::fmt::{Debug, Display};

use crate::storage::utils::min_non_zero_cap;

/// An unsigned integer type holding the length and capacity of a collection.
///
/// A narrower type shrinks the collection header and caps the number of
/// items it may hold.
pub trait Index:
    Copy
    + Clone
    + Debug
    + Display
    + Into<usize>
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Send
    + Sync
    + Sized
    + 'static
{
    /// Zero, the length of an empty collection.
    const ZERO: Self;
    /// The largest value, widened to `usize`.
    const MAX_USIZE: usize;

    /// Narrow a `usize`. Values out of range are truncated.
    fn from_usize(val: usize) -> Self;

    /// Narrow a `usize`, or `None` if it is out of range.
    fn try_from_usize(val: usize) -> Option<Self>;

    /// Widen to `usize`.
    #[inline]
    fn to_usize(self) -> usize {
        self.into()
    }

    /// Addition clamped to the range of the type.
    fn saturating_add(self, val: usize) -> Self;

    /// Subtraction clamped at zero.
    fn saturating_sub(self, val: usize) -> Self;

    /// Multiplication clamped to the range of the type.
    fn saturating_mul(self, val: usize) -> Self;
}

macro_rules! impl_small_index {
    ($($ty:ty),+) => {
        $(
            impl Index for $ty {
                const ZERO: Self = 0;
                const MAX_USIZE: usize = <$ty>::MAX as usize;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as Self
                }

                #[inline]
                fn try_from_usize(val: usize) -> Option<Self> {
                    val.try_into().ok()
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn saturating_add(self, val: usize) -> Self {
                    self.to_usize().saturating_add(val).min(Self::MAX_USIZE) as Self
                }

                #[inline]
                fn saturating_sub(self, val: usize) -> Self {
                    self.to_usize().saturating_sub(val) as Self
                }

                #[inline]
                fn saturating_mul(self, val: usize) -> Self {
                    self.to_usize().saturating_mul(val).min(Self::MAX_USIZE) as Self
                }
            }
        )+
    };
}

impl_small_index!(u8, u16);

impl Index for usize {
    const ZERO: Self = 0;
    const MAX_USIZE: usize = usize::MAX;

    #[inline]
    fn from_usize(val: usize) -> Self {
        val
    }

    #[inline]
    fn try_from_usize(val: usize) -> Option<Self> {
        Some(val)
    }

    #[inline]
    fn saturating_add(self, val: usize) -> Self {
        usize::saturating_add(self, val)
    }

    #[inline]
    fn saturating_sub(self, val: usize) -> Self {
        usize::saturating_sub(self, val)
    }

    #[inline]
    fn saturating_mul(self, val: usize) -> Self {
        usize::saturating_mul(self, val)
    }
}

/// Picks the capacity to request when a collection runs out of room.
pub trait Grow: Debug {
    /// The capacity to request when `prev` slots are not enough and at
    /// least `minimum` are needed.
    fn next_capacity<T, I: Index>(prev: I, minimum: I) -> I;
}

/// Requests exactly the capacity needed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowExact;

impl Grow for GrowExact {
    #[inline]
    fn next_capacity<T, I: Index>(_prev: I, minimum: I) -> I {
        minimum
    }
}

/// Doubles the capacity, or jumps straight to the needed capacity when
/// that is larger. An empty buffer starts at a small minimum sized to the
/// item type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowDoubling;

impl Grow for GrowDoubling {
    #[inline]
    fn next_capacity<T, I: Index>(prev: I, minimum: I) -> I {
        let doubled = match prev.to_usize() {
            0 => I::from_usize(min_non_zero_cap::<T>().min(I::MAX_USIZE)),
            _ => prev.saturating_mul(2),
        };
        doubled.max(minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_growth() {
        assert_eq!(GrowDoubling::next_capacity::<u32, usize>(0, 1), 4);
        assert_eq!(GrowDoubling::next_capacity::<u8, usize>(0, 1), 8);
        assert_eq!(GrowDoubling::next_capacity::<u32, usize>(4, 5), 8);
        assert_eq!(GrowDoubling::next_capacity::<u32, usize>(4, 20), 20);
        assert_eq!(GrowDoubling::next_capacity::<u32, u8>(200, 201), 255);
    }

    #[test]
    fn exact_growth() {
        assert_eq!(GrowExact::next_capacity::<u32, usize>(4, 5), 5);
    }

    #[test]
    fn small_index_bounds() {
        assert_eq!(u8::try_from_usize(256), None);
        assert_eq!(250u8.saturating_add(10), 255);
        assert_eq!(3u16.saturating_sub(5), 0);
    }
}
