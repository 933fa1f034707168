#![cfg(all(feature = "alloc", feature = "zeroize"))]

use core::alloc::Layout;
use core::cell::RefCell;
use core::ptr::NonNull;
use core::slice;
use std::rc::Rc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use flex_flat::{
    alloc::{AllocError, Allocator, ZeroizingAlloc},
    vec::ZeroizingVec,
    Global, Vec as FlexVec,
};

type ReleaseLog = Rc<RefCell<std::vec::Vec<std::vec::Vec<u8>>>>;

/// Records the contents of each buffer as it is released.
#[derive(Debug, Clone, Default)]
struct TestAlloc {
    released: ReleaseLog,
}

unsafe impl Allocator for TestAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        Global.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let cp = std::vec::Vec::from(unsafe { slice::from_raw_parts(ptr.as_ptr(), layout.size()) });
        self.released.borrow_mut().push(cp);
        Global.deallocate(ptr, layout)
    }
}

fn assert_zeroize_on_drop<T: ZeroizeOnDrop>(_: &T) {}

#[test]
fn test_alloc_log() {
    let alloc = TestAlloc::default();
    let mut v = FlexVec::<u32, _>::with_capacity_in(1, alloc.clone());
    v.push(99);
    drop(v);
    let log = alloc.released.borrow().clone();
    assert_eq!(log, &[99u32.to_ne_bytes()]);
}

#[test]
fn vec_zeroize_on_release() {
    let alloc = TestAlloc::default();
    let mut v = FlexVec::<u32, _>::with_capacity_in(1, ZeroizingAlloc(alloc.clone()));
    v.push(99);
    assert_zeroize_on_drop(&v);
    drop(v);
    let log = alloc.released.borrow().clone();
    assert_eq!(log, &[&[0, 0, 0, 0]]);
}

#[test]
fn vec_zeroize_on_grow() {
    let alloc = TestAlloc::default();
    let mut v = FlexVec::<u32, _>::with_capacity_in(2, ZeroizingAlloc(alloc.clone()));
    v.extend([u32::MAX; 2]);
    v.push(u32::MAX);
    assert_eq!(alloc.released.borrow().len(), 1);
    v.zeroize();
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 0);
    let log = alloc.released.borrow().clone();
    assert_eq!(log.len(), 2);
    assert!(log.iter().flatten().all(|b| *b == 0));
}

#[test]
fn vec_zeroizing_alias() {
    let mut v = ZeroizingVec::new();
    v.extend([1u64, 2, 3]);
    assert_zeroize_on_drop(&v);
    v.zeroize();
    assert!(v.is_empty());
}
