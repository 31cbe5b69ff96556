//! # Hybrid Vec
//!
//! A vector that keeps its first `N` elements inside the struct itself and automatically
//! spills to the heap when it grows larger, plus two building blocks on top of it.
//!
//! This crate provides `HybridVec`, `SortedVec`, and the `a_star` path search. `HybridVec`
//! is a drop-in replacement for `Vec` optimized for cases where vectors often remain small.
//!
//! ## Key Features
//!
//! * **Inline Storage:** Up to `N` items live in the struct, with no heap allocation.
//! * **Bitwise Relocation:** Spilling to the heap, growing, and moving back inline with
//!   `shrink_to_fit` relocate elements by copying bytes; nothing is cloned or dropped.
//! * **Fallible Growth:** Every growing operation has a `try_*` twin returning [`AllocError`].
//! * **Compile-Time Safety:** Enforces strict size limits (max 16KB) during the build process to prevent accidental stack overflows.
//! * **Dead-Memory Checks:** The `poison` feature fills unused slots with `0xAD` and
//!   verifies them on every write into raw storage.
//!
//! ## Capacity Constraints (`N`)
//!
//! * `N` can be any size, including `0` (always heap-backed once non-empty).
//! * `size_of::<HybridVec<T, N>>()` must stay within 16KB.
//!
//! ## Examples
//!
//! ### HybridVec
//!
//! ```rust
//! use hybrid_vec::{HybridVec, StorageMode};
//!
//! // Capacity 4. Lives inline.
//! let mut v: HybridVec<i32, 4> = HybridVec::new();
//! v.extend([1, 2, 3, 4]);
//! assert_eq!(v.storage_mode(), StorageMode::Inline);
//!
//! // 5th item -> spills to the heap
//! v.push(5);
//! assert_eq!(v.storage_mode(), StorageMode::Heap);
//!
//! // Back inline once it fits again
//! v.truncate(2);
//! v.shrink_to_fit();
//! assert!(v.is_on_stack());
//! assert_eq!(v, [1, 2]);
//! ```
//!
//! ### SortedVec
//!
//! ```rust
//! use hybrid_vec::SortedVec;
//!
//! let mut set: SortedVec<u32, 8> = SortedVec::new();
//! for x in [5, 3, 9, 3] {
//!     set.insert(x);
//! }
//! assert_eq!(set.as_slice(), &[3, 3, 5, 9]);
//! assert_eq!(set.equal_range(&3), 0..2);
//! ```

// --- Module Declarations ---

pub mod error;
pub mod search;
pub mod sets;
pub mod vecs;

mod utils;

// --- Re-exports ---

pub use error::AllocError;
pub use search::{Path, a_star, a_star_with_capacity};
pub use sets::SortedVec;
pub use vecs::{Drain, HybridVec, IntoIter, StorageMode};
