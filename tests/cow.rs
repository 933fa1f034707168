#![cfg(feature = "alloc")]

use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::rc::Rc;
use std::string::String;
use std::thread;

use flex_flat::{
    flat::{SharedMap, SharedSet},
    vec::SharedVec,
    Vec as FlexVec,
};

#[test]
fn cow_clone_shares_buffer() {
    let a = SharedVec::<u32>::from_slice(&[1, 2, 3]);
    let b = a.clone();
    assert_eq!(a.ref_count(), 2);
    assert!(!b.is_unique());
    assert_eq!(a.as_ptr(), b.as_ptr());
    assert_eq!(a, b);
}

#[test]
fn cow_mutation_isolated() {
    let a = SharedVec::<u32>::from_slice(&[1, 2, 3]);
    let mut b = a.clone();
    b.push(4);
    assert_eq!(a, [1, 2, 3]);
    assert_eq!(b, [1, 2, 3, 4]);
    assert_ne!(a.as_ptr(), b.as_ptr());
    assert!(a.is_unique());
    assert!(b.is_unique());

    let mut c = a.clone();
    c[0] = 10;
    assert_eq!(a, [1, 2, 3]);
    assert_eq!(c, [10, 2, 3]);

    let mut d = a.clone();
    d.make_unique();
    assert_ne!(a.as_ptr(), d.as_ptr());
    assert_eq!(a, d);
}

#[test]
fn cow_removal_forks() {
    let a = SharedVec::<String>::from_iter(["a", "b", "c"].map(String::from));
    let mut b = a.clone();
    assert_eq!(b.pop().as_deref(), Some("c"));
    b.retain(|s| s != "a");
    assert_eq!(a, ["a", "b", "c"]);
    assert_eq!(b, ["b"]);
    let mut c = a.clone();
    c.clear();
    assert_eq!(a.len(), 3);
    assert!(c.is_empty());
}

#[test]
fn cow_items_dropped_once() {
    let item = Rc::new(());
    let a = SharedVec::<Rc<()>>::from_iter([item.clone(), item.clone()]);
    let b = a.clone();
    let c = b.clone();
    assert_eq!(Rc::strong_count(&item), 3);
    drop(a);
    drop(c);
    assert_eq!(Rc::strong_count(&item), 3);
    let mut b2 = b.clone();
    b2.truncate(1);
    // the fork cloned the retained item
    assert_eq!(Rc::strong_count(&item), 4);
    drop(b);
    assert_eq!(Rc::strong_count(&item), 2);
    drop(b2);
    assert_eq!(Rc::strong_count(&item), 1);
}

static RELEASE_CALLS: AtomicUsize = AtomicUsize::new(0);
static RELEASE_CAPACITY: AtomicUsize = AtomicUsize::new(0);

fn record_release(_data: NonNull<u32>, capacity: usize) {
    RELEASE_CALLS.fetch_add(1, Ordering::SeqCst);
    RELEASE_CAPACITY.store(capacity, Ordering::SeqCst);
}

static FORK_RELEASE_CALLS: AtomicUsize = AtomicUsize::new(0);

fn record_fork_release(_data: NonNull<u32>, _capacity: usize) {
    FORK_RELEASE_CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn cow_release_on_last_drop() {
    let mut a = SharedVec::<u32>::with_release(4, record_release);
    a.extend([1, 2, 3]);
    let b = a.clone();
    drop(a);
    assert_eq!(RELEASE_CALLS.load(Ordering::SeqCst), 0);
    drop(b);
    assert_eq!(RELEASE_CALLS.load(Ordering::SeqCst), 1);
    assert_eq!(RELEASE_CAPACITY.load(Ordering::SeqCst), 4);
}

#[test]
fn cow_fork_keeps_release() {
    let mut a = SharedVec::<u32>::with_release(4, record_fork_release);
    a.extend([1, 2, 3]);
    let mut b = a.clone();
    b.push(4);
    drop(a);
    assert_eq!(FORK_RELEASE_CALLS.load(Ordering::SeqCst), 1);
    drop(b);
    assert_eq!(FORK_RELEASE_CALLS.load(Ordering::SeqCst), 2);
}

#[test]
fn cow_across_threads() {
    let base = SharedVec::<u64>::from_iter(0..100);
    let handles: std::vec::Vec<_> = (0..4u64)
        .map(|i| {
            let mut local = base.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    local.push(i);
                }
                local.iter().sum::<u64>()
            })
        })
        .collect();
    let sums: std::vec::Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(sums, [4950, 4950, 4952, 4950]);
    assert_eq!(base.len(), 100);
    assert!(base.is_unique());
}

#[test]
fn cow_swap_exchanges_handles() {
    let mut a = SharedVec::<u8>::from_slice(b"abc");
    let mut b = FlexVec::from_slice(b"xy");
    let (pa, pb) = (a.as_ptr(), b.as_ptr());
    a.swap_with(&mut b);
    assert_eq!(a.as_ptr(), pb);
    assert_eq!(b.as_ptr(), pa);
    assert_eq!(a, *b"xy");
}

#[test]
fn cow_flat_containers() {
    let mut set = SharedSet::<u32>::new();
    set.extend([3, 1, 2]);
    let copy = set.clone();
    assert_eq!(copy.as_vec().ref_count(), 2);
    set.insert(0);
    assert_eq!(copy.as_slice(), [1, 2, 3]);
    assert_eq!(set.as_slice(), [0, 1, 2, 3]);

    let mut map = SharedMap::<u32, &str>::new();
    map.insert(1, "a");
    let view = map.clone();
    map.insert_or_assign(1, "b");
    assert_eq!(view.get(&1), Some(&"a"));
    assert_eq!(map.get(&1), Some(&"b"));
}
