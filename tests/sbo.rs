#![cfg(feature = "alloc")]

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;
use std::rc::Rc;
use std::string::String;

use flex_flat::{
    alloc::{AllocError, Allocator},
    flat::SboMap,
    vec::SboVec,
    Global, Sbo, Vec as FlexVec,
};

#[derive(Debug, Clone, Default)]
struct CountingAlloc {
    allocs: Rc<Cell<usize>>,
    live: Rc<Cell<usize>>,
}

unsafe impl Allocator for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        self.allocs.set(self.allocs.get() + 1);
        self.live.set(self.live.get() + 1);
        Global.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        Global.deallocate(ptr, layout)
    }
}

#[test]
fn sbo_no_alloc_until_spilled() {
    let alloc = CountingAlloc::default();
    let mut v = FlexVec::<i32, Sbo<4, CountingAlloc>>::new_in(Sbo::with_alloc(alloc.clone()));
    for i in 1..=4 {
        v.push(i);
    }
    assert_eq!(alloc.allocs.get(), 0);
    assert_eq!(v.capacity(), 4);
    assert!(!v.is_spilled());

    v.push(5);
    assert_eq!(alloc.allocs.get(), 1);
    assert!(v.is_spilled());
    assert_eq!(v.capacity(), 8);

    v.remove(1);
    assert_eq!(v, [1, 3, 4, 5]);

    v.shrink_to_fit();
    assert!(!v.is_spilled());
    assert_eq!(alloc.live.get(), 0);
    assert_eq!(v, [1, 3, 4, 5]);

    v.extend([6, 7]);
    assert_eq!(alloc.live.get(), 1);
    drop(v);
    assert_eq!(alloc.live.get(), 0);
}

#[test]
fn sbo_growth_after_spill() {
    let alloc = CountingAlloc::default();
    let mut v = FlexVec::<u64, Sbo<4, CountingAlloc>>::new_in(Sbo::with_alloc(alloc.clone()));
    v.extend(0..5);
    assert_eq!((v.capacity(), alloc.allocs.get()), (8, 1));
    v.extend(5..9);
    assert_eq!((v.capacity(), alloc.allocs.get()), (16, 2));
    v.extend(9..17);
    assert_eq!((v.capacity(), alloc.allocs.get()), (32, 3));
    assert_eq!(alloc.live.get(), 1);
    assert!(v.iter().copied().eq(0..17));
    drop(v);
    assert_eq!(alloc.live.get(), 0);
}

#[test]
fn sbo_with_capacity_inline() {
    let v = SboVec::<u64, 8>::with_capacity(8);
    assert!(!v.is_spilled());
    let v = SboVec::<u64, 8>::with_capacity(9);
    assert!(v.is_spilled());
    assert_eq!(v.capacity(), 9);
}

#[test]
fn sbo_clone_stays_inline() {
    let mut v = SboVec::<String, 2>::new();
    v.push(String::from("one"));
    let c = v.clone();
    assert!(!c.is_spilled());
    assert_eq!(c, ["one"]);
    v.push(String::from("two"));
    v.push(String::from("three"));
    let c = v.clone();
    assert_eq!(c, v);
}

#[test]
fn sbo_moved_handle() {
    // the inline buffer moves with the handle
    let mut v = SboVec::<u32, 4>::new();
    v.extend([1, 2, 3]);
    let boxed = Box::new(v);
    let mut v = *boxed;
    v.push(4);
    assert_eq!(v, [1, 2, 3, 4]);
}

#[test]
fn sbo_map_inline() {
    let mut map = SboMap::<u32, &str, 2>::new();
    map.insert(2, "b");
    map.insert(1, "a");
    assert!(!map.as_vec().is_spilled());
    map.insert(3, "c");
    assert!(map.as_vec().is_spilled());
    assert_eq!(map.keys().copied().collect::<std::vec::Vec<_>>(), [1, 2, 3]);
}
