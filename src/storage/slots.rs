//! Construction primitives over raw slot ranges.
//!
//! Moving a Rust value is always a bitwise copy, so relocation is a single
//! `ptr::copy` regardless of the item type.

use core::mem::{needs_drop, MaybeUninit};
use core::ptr;
use core::slice;

use super::insert::Inserter;

/// Drop `len` initialized items starting at `data`.
///
/// # Safety
/// The slots must be initialized and not used again without being rewritten.
#[inline]
pub(crate) unsafe fn drop_slots<T>(data: *mut T, len: usize) {
    if needs_drop::<T>() && len > 0 {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(data, len));
    }
}

/// Move `len` items from `src` to `dst`. The ranges may overlap. The source
/// slots are left logically uninitialized.
///
/// # Safety
/// Both ranges must be valid for `len` items.
#[inline]
pub(crate) unsafe fn relocate<T>(src: *const T, dst: *mut T, len: usize) {
    if len > 0 && src != dst as *const T {
        ptr::copy(src, dst, len);
    }
}

/// Clone `len` items from `src` into the uninitialized slots at `dst`.
/// If a clone panics, the items already written are dropped.
///
/// # Safety
/// `src` must hold `len` initialized items, and `dst` must be valid for
/// writes of `len` items without overlapping `src`.
pub(crate) unsafe fn clone_slots<T: Clone>(src: *const T, dst: *mut T, len: usize) {
    if len == 0 {
        return;
    }
    let src = slice::from_raw_parts(src, len);
    let dst = slice::from_raw_parts_mut(dst.cast::<MaybeUninit<T>>(), len);
    let mut ins = Inserter::new(dst);
    ins.push_slice(src);
    ins.complete();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::string::{String, ToString};

    #[test]
    fn clone_and_drop() {
        let src = [Rc::new(1), Rc::new(2)];
        let mut dst = [MaybeUninit::<Rc<i32>>::uninit(), MaybeUninit::uninit()];
        unsafe { clone_slots(src.as_ptr(), dst.as_mut_ptr().cast(), 2) };
        assert_eq!(Rc::strong_count(&src[0]), 2);
        unsafe { drop_slots(dst.as_mut_ptr().cast::<Rc<i32>>(), 2) };
        assert_eq!(Rc::strong_count(&src[0]), 1);
        assert_eq!(Rc::strong_count(&src[1]), 1);
    }

    #[test]
    fn relocate_overlapping() {
        let mut buf: [MaybeUninit<String>; 4] = [
            MaybeUninit::new("a".to_string()),
            MaybeUninit::new("b".to_string()),
            MaybeUninit::new("c".to_string()),
            MaybeUninit::uninit(),
        ];
        let base = buf.as_mut_ptr().cast::<String>();
        unsafe {
            relocate(base, base.add(1), 3);
            base.write("z".to_string());
            let items = slice::from_raw_parts(base, 4);
            assert_eq!(items, &["z", "a", "b", "c"]);
            drop_slots(base, 4);
        }
    }
}
