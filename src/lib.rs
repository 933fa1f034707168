//! Contiguous vectors and sorted flat containers with pluggable storage.
//!
//! A [`Vec`] is parameterized by a storage configuration which decides how
//! its buffer is obtained, grown and released:
//!
//! - any [`Allocator`](alloc::Allocator), such as [`Global`]: heap storage
//!   with geometric growth,
//! - [`Fixed<N>`]: inline storage with a fixed capacity,
//! - [`Sbo<N>`]: inline storage which spills to the heap when exhausted,
//! - [`Remote<'a>`]: caller-owned memory which is never allocated or freed,
//! - [`Shared`]: a reference-counted buffer which is copied on write.
//!
//! [`FlatSet`] and [`FlatMap`] keep their items sorted in any of these
//! vectors and use binary search for lookup.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
struct _ReadmeDoctests;

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc as alloc_crate;

pub mod alloc;

pub mod capacity;

pub(crate) mod error;

pub mod flat;

pub mod storage;

pub mod vec;

pub use self::alloc::Global;
pub use self::error::{StorageError, UpdateError};
pub use self::flat::{FlatMap, FlatSet};
pub use self::storage::{array_storage, Fixed, Remote, Sbo, Shared};
pub use self::vec::Vec;
