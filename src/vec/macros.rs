/// Create a [`Vec`](crate::vec::Vec) containing the arguments.
///
/// The `in` form constructs the vector within an allocation target such as
/// [`Fixed`](crate::Fixed), [`Sbo`](crate::Sbo) or a borrowed
/// [`array_storage`](crate::array_storage) buffer.
///
/// ```
/// use flex_flat::{vec, Fixed};
///
/// let v = vec![in Fixed::<4>; 1, 2, 3];
/// assert_eq!(v, [1, 2, 3]);
/// let w = vec![in Fixed::<4>; 0u8; 2];
/// assert_eq!(w, [0, 0]);
/// ```
#[macro_export]
macro_rules! vec {
    (in $alloc:expr $(;)?) => (
        $crate::vec::Vec::new_in($alloc)
    );
    (in $alloc:expr; $elem:expr; $n:expr) => (
        $crate::vec::from_elem_in($elem, $n, $alloc)
    );
    (in $alloc:expr; $($x:expr),+ $(,)?) => (
        $crate::vec::from_array_in([$($x),+], $alloc)
    );
    () => (
        $crate::vec::Vec::new()
    );
    ($elem:expr; $n:expr) => (
        $crate::vec::from_elem($elem, $n)
    );
    ($($x:expr),+ $(,)?) => (
        $crate::vec::from_array([$($x),+])
    );
}
