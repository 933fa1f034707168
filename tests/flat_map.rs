use core::marker::PhantomData as Cfg;
use std::collections::BTreeMap;
use std::string::{String, ToString};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rstest::rstest;

#[cfg(feature = "alloc")]
use flex_flat::{vec::config::Custom, Global, Sbo, Shared};
use flex_flat::{
    flat::{FixedMap, FlatMap},
    vec::config::{VecConfig, VecConfigNew},
    Fixed, StorageError, Vec as FlexVec,
};

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Cfg::<Global>))]
#[cfg_attr(feature = "alloc", case::sbo(Cfg::<Sbo<2>>))]
#[cfg_attr(feature = "alloc", case::shared(Cfg::<Shared>))]
#[case::fixed(Cfg::<Fixed<16>>)]
fn map_keeps_first_value<C>(#[case] _config: Cfg<C>)
where
    C: VecConfigNew<(String, i32)> + VecConfig<Index = usize>,
{
    let mut map = FlatMap::<String, i32, C>::new();
    assert_eq!(map.insert("a".to_string(), 10), (0, true));
    assert_eq!(map.insert("b".to_string(), 20), (1, true));
    assert_eq!(map.insert("a".to_string(), 1), (0, false));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a"), Some(&10));
    assert_eq!(map["b"], 20);
    assert_eq!(map.find("c"), None);
    assert_eq!(map.first_key_value(), Some((&"a".to_string(), &10)));

    assert_eq!(map.insert_or_assign("a".to_string(), 1), (0, false));
    assert_eq!(map["a"], 1);
    *map.get_mut("b").unwrap() += 1;
    assert_eq!(map.values().copied().collect::<std::vec::Vec<_>>(), [1, 21]);
    assert_eq!(map.remove("a"), Some(1));
    assert_eq!(map.remove("a"), None);
    assert_eq!(map.keys().collect::<std::vec::Vec<_>>(), ["b"]);
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Cfg::<Global>))]
#[cfg_attr(feature = "alloc", case::sbo(Cfg::<Sbo<2>>))]
#[cfg_attr(feature = "alloc", case::shared(Cfg::<Shared>))]
#[case::fixed(Cfg::<Fixed<16>>)]
fn map_entry_helpers<C>(#[case] _config: Cfg<C>)
where
    C: VecConfigNew<(u32, std::vec::Vec<u32>)> + VecConfig<Index = usize>,
{
    let mut map = FlatMap::<u32, std::vec::Vec<u32>, C>::new();
    for (key, value) in [(2, 20), (1, 10), (2, 21), (3, 30)] {
        map.get_or_insert_default(key).push(value);
    }
    assert_eq!(map.get(&2), Some(&std::vec![20, 21]));
    let mut built = 0;
    map.try_emplace(1, || {
        built += 1;
        std::vec::Vec::new()
    });
    assert_eq!(built, 0);
    map.get_or_insert_with(4, || std::vec![40]).push(41);
    assert_eq!(map[&4], [40, 41]);
    for value in map.values_mut() {
        value.clear();
    }
    map.retain(|key, value| {
        value.push(*key);
        key % 2 == 0
    });
    assert_eq!(map.len(), 2);
    assert_eq!(
        map.iter().collect::<std::vec::Vec<_>>(),
        [(&2, &std::vec![2]), (&4, &std::vec![4])]
    );
    assert_eq!(map.remove_entry(&2), Some((2, std::vec![2])));
}

#[test]
fn map_bounds_and_ranges() {
    let mut map = FixedMap::<i32, char, 8>::new();
    map.extend([(5, 'e'), (1, 'a'), (3, 'c')]);
    assert_eq!(map.lower_bound(&2), 1);
    assert_eq!(map.upper_bound(&3), 2);
    assert_eq!(map.equal_range(&3), 1..2);
    assert_eq!(map.count(&3), 1);
    assert!(!map.contains_key(&4));
    assert_eq!(map.get_key_value(&5), Some((&5, &'e')));
    assert_eq!(map.last_key_value(), Some((&5, &'e')));
    map.erase_range(..1);
    assert_eq!(map.erase_at(0), (3, 'c'));
    assert_eq!(map.as_slice(), [(5, 'e')]);
}

#[cfg(feature = "alloc")]
#[test]
fn map_narrow_index_positions() {
    let mut map = FlatMap::<u16, u16, Custom<Global, u8>>::new();
    map.extend((0..10).map(|k| (k, k * 2)));
    map.erase_range(2..5);
    assert_eq!(map.erase_at(0), (0, 0));
    assert_eq!(
        map.keys().copied().collect::<std::vec::Vec<_>>(),
        [1, 5, 6, 7, 8, 9]
    );
    assert_eq!(map.find(&6), Some(2));
    map.erase_range(..);
    assert!(map.is_empty());
}

#[cfg(feature = "alloc")]
#[test]
#[should_panic(expected = "Invalid element index")]
fn map_narrow_index_range_checked() {
    let mut map = FlatMap::<u16, u16, Custom<Global, u8>>::new();
    map.insert(1, 1);
    // 300 would wrap around in the narrow index type
    map.erase_range(0..300);
}

#[test]
fn map_emplace_hint() {
    let mut map = FixedMap::<u32, &str, 8>::new();
    assert_eq!(map.emplace_hint(0, 10, "x"), (0, true));
    assert_eq!(map.emplace_hint(1, 20, "y"), (1, true));
    assert_eq!(map.emplace_hint(1, 20, "z"), (1, false));
    assert_eq!(map.emplace_hint(0, 15, "w"), (1, true));
    assert_eq!(map.values().copied().collect::<std::vec::Vec<_>>(), ["x", "w", "y"]);
}

#[test]
fn map_fixed_exhausted() {
    let mut map = FixedMap::<u8, u8, 2>::new();
    map.insert(1, 1);
    map.insert(2, 2);
    assert_eq!(map.try_insert(2, 9).unwrap(), (1, false));
    let err = map.try_insert(0, 0).unwrap_err();
    assert_eq!(err.error(), &StorageError::CapacityLimit);
    assert_eq!(err.into_value(), (0, 0));
    assert_eq!(map.as_slice(), [(1, 1), (2, 2)]);
}

#[test]
#[should_panic(expected = "Invalid element index")]
fn map_index_missing() {
    let map = FixedMap::<u8, u8, 2>::new();
    let _value: u8 = map[&1];
}

#[test]
fn map_from_vec() {
    let vec = FlexVec::<(u8, &str), Fixed<8>>::from([(3, "c"), (1, "a"), (3, "x"), (2, "b")]);
    let map: FlatMap<u8, &str, Fixed<8>> = FlatMap::from_vec(vec);
    assert_eq!(map.as_slice(), [(1, "a"), (2, "b"), (3, "c")]);
    let vec = map.into_vec();
    assert_eq!(vec.len(), 3);
}

#[test]
fn map_equality_and_debug() {
    let mut a = FixedMap::<u8, &str, 4>::new();
    a.insert(2, "b");
    a.insert(1, "a");
    let b = FixedMap::<u8, &str, 4>::from_iter([(1, "a"), (2, "b")]);
    assert_eq!(a, b);
    assert_eq!(format!("{:?}", a), r#"{1: "a", 2: "b"}"#);
    let mut c = FixedMap::<u8, &str, 4>::new();
    c.swap_with(&mut a);
    assert!(a.is_empty());
    assert_eq!(c, b);
    let owned: std::vec::Vec<(u8, &str)> = c.into_iter().collect();
    assert_eq!(owned, [(1, "a"), (2, "b")]);
}

#[test]
fn map_matches_btree() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut map = FixedMap::<u16, u32, 128>::new();
    let mut model = BTreeMap::new();
    for step in 0..3000u32 {
        let key = rng.gen_range(0..100u16);
        match rng.gen_range(0..4) {
            0 => {
                let (_, added) = map.insert(key, step);
                if added {
                    assert!(model.insert(key, step).is_none());
                } else {
                    assert!(model.contains_key(&key));
                }
            }
            1 => {
                map.insert_or_assign(key, step);
                model.insert(key, step);
            }
            2 => {
                assert_eq!(map.remove(&key), model.remove(&key));
            }
            _ => {
                assert_eq!(map.get(&key), model.get(&key));
            }
        }
    }
    assert!(map.iter().eq(model.iter()));
}
