use core::mem::MaybeUninit;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::rc::Rc;
use std::string::{String, ToString};

use flex_flat::{
    array_storage,
    flat::{MapView, SetView},
    storage::ArrayStorage,
    vec::RemoteVec,
    StorageError, Vec as FlexVec,
};

#[test]
fn remote_array_storage() {
    let mut buf = array_storage::<u32, 4>();
    let mut v = FlexVec::new_in(&mut buf);
    v.extend([1, 2, 3]);
    v.insert(0, 0);
    assert_eq!(v, [0, 1, 2, 3]);
    assert_eq!(v.capacity(), 4);
    assert_eq!(v.try_push(4).unwrap_err().error(), &StorageError::CapacityLimit);
    v.remove(1);
    v.push(9);
    assert_eq!(v, [0, 2, 3, 9]);
}

#[test]
fn remote_from_uninit() {
    let mut storage = ArrayStorage::<String, 3>::default();
    let mut v = RemoteVec::from_uninit(&mut storage.as_uninit_slice()[..2]);
    v.push("a".to_string());
    v.push("b".to_string());
    assert!(v.try_reserve(1).is_err());
    v.reserve(0);
    assert_eq!(v, ["a", "b"]);
    let (slots, len) = v.detach();
    assert_eq!(len, 2);
    assert_eq!(slots.len(), 2);
    // detaching leaves the items in place for the caller
    let items: std::vec::Vec<String> =
        slots[..len].iter().map(|s| unsafe { s.assume_init_read() }).collect();
    assert_eq!(items, ["a", "b"]);
}

#[test]
fn remote_drops_items() {
    let item = Rc::new(());
    let mut buf = ArrayStorage::<Rc<()>, 4>::default();
    let mut v = FlexVec::new_in(&mut buf);
    v.resize(4, item.clone());
    assert_eq!(Rc::strong_count(&item), 5);
    drop(v);
    assert_eq!(Rc::strong_count(&item), 1);
}

static RELEASED: AtomicUsize = AtomicUsize::new(0);

fn release_slots(_data: NonNull<u64>, capacity: usize) {
    RELEASED.fetch_add(capacity, Ordering::SeqCst);
}

#[test]
fn remote_raw_parts_release() {
    let mut slots = [MaybeUninit::<u64>::uninit(); 8];
    slots[0].write(5);
    slots[1].write(6);
    let data = NonNull::new(slots.as_mut_ptr().cast::<u64>()).unwrap();
    let mut v = unsafe { RemoteVec::from_raw_parts(data, 8, 2, Some(release_slots)) };
    assert_eq!(v, [5, 6]);
    v.extend(7..10);
    assert_eq!(v.len(), 5);
    assert_eq!(RELEASED.load(Ordering::SeqCst), 0);
    drop(v);
    assert_eq!(RELEASED.load(Ordering::SeqCst), 8);
}

#[test]
#[should_panic(expected = "Initial length exceeds capacity")]
fn remote_raw_parts_length_checked() {
    let mut slots = [MaybeUninit::<u64>::uninit(); 2];
    let data = NonNull::new(slots.as_mut_ptr().cast::<u64>()).unwrap();
    let _v = unsafe { RemoteVec::from_raw_parts(data, 2, 3, None) };
}

#[test]
fn remote_swap_exchanges_memory() {
    let mut first = array_storage::<u8, 4>();
    let mut second = array_storage::<u8, 2>();
    let mut a = FlexVec::new_in(&mut first);
    let mut b = FlexVec::new_in(&mut second);
    a.extend_from_slice(b"abcd");
    b.push(b'z');
    a.swap_with(&mut b);
    assert_eq!(a, *b"z");
    assert_eq!(a.capacity(), 2);
    assert_eq!(b, *b"abcd");
}

#[test]
fn remote_flat_views() {
    let mut buf = array_storage::<(u32, &str), 3>();
    let mut map: MapView<'_, u32, &str> = MapView::new_in(&mut buf);
    map.insert(3, "c");
    map.insert(1, "a");
    map.insert(2, "b");
    assert_eq!(map.try_insert(0, "z").unwrap_err().into_value(), (0, "z"));
    assert_eq!(map.keys().copied().collect::<std::vec::Vec<_>>(), [1, 2, 3]);
    assert_eq!(map.len(), 3);

    let mut buf = array_storage::<i32, 4>();
    let mut set: SetView<'_, i32> = SetView::new_in(&mut buf);
    set.extend([4, -1, 4, 2]);
    assert_eq!(set.as_slice(), [-1, 2, 4]);
}
