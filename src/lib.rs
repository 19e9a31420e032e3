//! # multikey
//!
//! An ordered map that tolerates duplicate keys.
//!
//! ## Overview
//!
//! [`MultiMap`] keeps `(key, value)` entries sorted by a comparator and lets
//! any number of entries share a key. Entries with equivalent keys stay in
//! insertion order. It is built from three layers:
//!
//! - **Comparators** ([`compare`]): strict weak orderings over keys
//! - **Stores** ([`store`]): ordered storage engines addressed by stable
//!   [`Handle`](store::Handle)s
//! - **Multi-key semantics** ([`MultiMap`]): bulk erase by key, duplicate
//!   counting, merge by transfer, checked lookup, structural equality
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`MultiMap`] as a sequence of
//!   `[key, value]` pairs
//!
//! ## Example
//!
//! ```rust
//! use multikey::MultiMap;
//!
//! let mut fruits: MultiMap<i32, String> = MultiMap::new();
//! fruits.emplace(1, "apple");
//! fruits.emplace(1, "avocado");
//! fruits.emplace(2, "banana");
//! fruits.emplace(3, "cherry");
//! fruits.emplace(2, "blueberry");
//!
//! assert_eq!(fruits.len(), 5);
//! assert_eq!(fruits.count(&2), 2);
//!
//! let keys: Vec<i32> = fruits.keys().copied().collect();
//! assert_eq!(keys, vec![1, 1, 2, 2, 3]);
//!
//! let last_first: Vec<&str> = fruits.values().rev().map(String::as_str).collect();
//! assert_eq!(last_first, vec!["cherry", "blueberry", "banana", "avocado", "apple"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use multikey::prelude::*;
///
/// let map: MultiMap<i32, i32> = MultiMap::new();
/// assert!(map.is_empty());
/// ```
pub mod prelude {
    pub use crate::compare::{Comparator, NaturalOrder, ReverseOrder};
    pub use crate::error::MultiMapError;
    pub use crate::multimap::MultiMap;
    pub use crate::store::{Handle, OrderedStore, RedBlackStore, SortedVecStore};
}

pub mod compare;
mod error;
pub mod multimap;
pub mod store;

pub use error::MultiMapError;
pub use multimap::MultiMap;
