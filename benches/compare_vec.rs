#[macro_use]
extern crate criterion;

use std::collections::BTreeMap;

use criterion::{black_box, Criterion};

use flex_flat::{array_storage, FlatMap, Fixed, Sbo, Shared, Vec as FlexVec};

const SMALL_COUNT: usize = 100;
const LARGE_COUNT: usize = 1000;

fn push_compare(c: &mut Criterion) {
    for count in [SMALL_COUNT, LARGE_COUNT] {
        c.bench_function(&format!("flexvec push {} values", count), |b| {
            b.iter(|| {
                let mut buf = FlexVec::<usize>::new();
                for value in 0..count {
                    buf.push(black_box(value));
                }
            });
        });

        c.bench_function(
            &format!("flexvec with_capacity({0}) push {0} values", count),
            |b| {
                b.iter(|| {
                    let mut buf = FlexVec::<usize>::with_capacity(count);
                    for value in 0..count {
                        buf.push(black_box(value));
                    }
                });
            },
        );

        c.bench_function(&format!("flexvec sbo(16) push {} values", count), |b| {
            b.iter(|| {
                let mut buf = FlexVec::<usize, Sbo<16>>::new();
                for value in 0..count {
                    buf.push(black_box(value));
                }
            });
        });

        c.bench_function(&format!("flexvec shared push {} values", count), |b| {
            b.iter(|| {
                let mut buf = FlexVec::<usize, Shared>::new();
                for value in 0..count {
                    buf.push(black_box(value));
                }
            });
        });

        if count == SMALL_COUNT {
            c.bench_function(
                &format!("flexvec fixed({}) push {} values", SMALL_COUNT, count),
                |b| {
                    b.iter(|| {
                        let mut buf = FlexVec::<usize, Fixed<SMALL_COUNT>>::new();
                        for value in 0..count {
                            buf.push(black_box(value));
                        }
                    });
                },
            );

            c.bench_function(
                &format!("flexvec remote({}) push {} values", SMALL_COUNT, count),
                |b| {
                    b.iter(|| {
                        let mut buf = array_storage::<usize, SMALL_COUNT>();
                        let mut buf = FlexVec::new_in(&mut buf);
                        for value in 0..count {
                            buf.push(black_box(value));
                        }
                    });
                },
            );
        }

        c.bench_function(&format!("stdvec push {} values", count), |b| {
            b.iter(|| {
                let mut buf = Vec::<usize>::new();
                for value in 0..count {
                    buf.push(black_box(value));
                }
            });
        });

        c.bench_function(
            &format!("stdvec with_capacity({0}) push {0} values", count),
            |b| {
                b.iter(|| {
                    let mut buf = Vec::<usize>::with_capacity(count);
                    for value in 0..count {
                        buf.push(black_box(value));
                    }
                });
            },
        );

        c.bench_function(&format!("flexvec extend {} values", count), |b| {
            b.iter(|| {
                let mut buf = FlexVec::<usize>::new();
                buf.extend(black_box(0..count));
            });
        });

        c.bench_function(&format!("stdvec extend {} values", count), |b| {
            b.iter(|| {
                let mut buf = Vec::<usize>::new();
                buf.extend(black_box(0..count));
            });
        });
    }
}

fn shared_compare(c: &mut Criterion) {
    let base = FlexVec::<usize, Shared>::from_iter(0..LARGE_COUNT);
    c.bench_function(&format!("flexvec shared clone {} values", LARGE_COUNT), |b| {
        b.iter(|| black_box(base.clone()));
    });

    c.bench_function(
        &format!("flexvec shared clone and fork {} values", LARGE_COUNT),
        |b| {
            b.iter(|| {
                let mut copy = base.clone();
                copy.push(black_box(0));
                copy
            });
        },
    );

    let base = Vec::<usize>::from_iter(0..LARGE_COUNT);
    c.bench_function(&format!("stdvec clone {} values", LARGE_COUNT), |b| {
        b.iter(|| black_box(base.clone()));
    });
}

fn map_compare(c: &mut Criterion) {
    for count in [SMALL_COUNT, LARGE_COUNT] {
        // a fixed multiplicative step visits the keys out of order
        let keys: Vec<usize> = (0..count).map(|i| (i * 7919) % count).collect();

        c.bench_function(&format!("flatmap insert {} keys", count), |b| {
            b.iter(|| {
                let mut map = FlatMap::<usize, usize>::new();
                for &key in &keys {
                    map.insert(black_box(key), key);
                }
                map
            });
        });

        c.bench_function(&format!("btreemap insert {} keys", count), |b| {
            b.iter(|| {
                let mut map = BTreeMap::<usize, usize>::new();
                for &key in &keys {
                    map.insert(black_box(key), key);
                }
                map
            });
        });

        let map = FlatMap::<usize, usize>::from_iter(keys.iter().map(|k| (*k, *k)));
        c.bench_function(&format!("flatmap lookup {} keys", count), |b| {
            b.iter(|| {
                let mut found = 0;
                for key in &keys {
                    found += usize::from(map.contains_key(black_box(key)));
                }
                found
            });
        });

        let map = BTreeMap::<usize, usize>::from_iter(keys.iter().map(|k| (*k, *k)));
        c.bench_function(&format!("btreemap lookup {} keys", count), |b| {
            b.iter(|| {
                let mut found = 0;
                for key in &keys {
                    found += usize::from(map.contains_key(black_box(key)));
                }
                found
            });
        });
    }
}

criterion_group!(benches, push_compare, shared_compare, map_compare);
criterion_main!(benches);
