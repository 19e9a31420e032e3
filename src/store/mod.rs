//! Ordered key-value stores that accept duplicate keys.
//!
//! [`OrderedStore`] is the storage-engine interface the multi-key layer is
//! written against. It describes a sorted collection of `(K, V)` entries,
//! addressed by stable [`Handle`]s, where any number of entries may carry
//! equivalent keys.
//!
//! Two engines are provided:
//!
//! - [`RedBlackStore`]: arena-backed red-black tree, O(log N) everywhere
//! - [`SortedVecStore`]: sorted vector of handles, O(N) insert/remove,
//!   O(log N) bounds
//!
//! # Duplicate Keys
//!
//! A new entry is always placed *after* every existing entry with an
//! equivalent key, so entries sharing a key keep their insertion order.
//!
//! # Handles
//!
//! A [`Handle`] names one entry for as long as that entry lives. Inserting or
//! removing other entries never invalidates it. Once its entry is removed (or
//! the store is cleared) the handle is stale: lookups through it return
//! `None`, even if the underlying slot is later reused.
//!
//! # Examples
//!
//! ```rust
//! use multikey::store::{OrderedStore, RedBlackStore};
//!
//! let mut store: RedBlackStore<i32, &str> = RedBlackStore::default();
//! let banana = store.insert(2, "banana");
//! store.insert(1, "apple");
//! let blueberry = store.insert(2, "blueberry");
//!
//! assert_eq!(store.len(), 3);
//! assert_eq!(store.find(&2), Some(banana));
//! assert_eq!(store.next(banana), Some(blueberry));
//!
//! store.remove(banana);
//! assert_eq!(store.get(banana), None);
//! assert_eq!(store.get(blueberry), Some((&2, &"blueberry")));
//! ```

mod arena;
mod red_black;
mod sorted_vec;

use static_assertions::assert_impl_all;

use crate::compare::Comparator;

pub use red_black::RedBlackStore;
pub use sorted_vec::SortedVecStore;

// =============================================================================
// Handle
// =============================================================================

/// A stable, generation-checked reference to one entry of a store.
///
/// Handles are plain values: they do not borrow the store, and they carry no
/// store identity. A handle obtained from one store is only meaningful for
/// that store (or for the container it was swapped into).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Handle {
    index: usize,
    generation: u64,
}

assert_impl_all!(Handle: Copy, Send, Sync, std::hash::Hash, std::fmt::Debug);

impl Handle {
    pub(crate) const fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.index
    }

    #[inline]
    pub(crate) const fn generation(self) -> u64 {
        self.generation
    }
}

// =============================================================================
// OrderedStore
// =============================================================================

/// A sorted, duplicate-tolerant key-value store addressed by [`Handle`]s.
///
/// `None` plays the role of the end marker wherever a position is returned.
pub trait OrderedStore<K, V> {
    /// The comparator that orders keys.
    type Compare: Comparator<K>;

    /// Creates an empty store ordered by `comparator`.
    fn with_comparator(comparator: Self::Compare) -> Self;

    /// Returns the comparator the store was created with.
    fn comparator(&self) -> &Self::Compare;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no entries.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry. All handles become stale.
    fn clear(&mut self);

    /// Inserts an entry after all entries with an equivalent key.
    ///
    /// Always succeeds; returns the handle of the new entry.
    fn insert(&mut self, key: K, value: V) -> Handle;

    /// Removes the entry named by `handle`, returning it.
    ///
    /// Returns `None` for a stale handle. No other handle is invalidated.
    fn remove(&mut self, handle: Handle) -> Option<(K, V)>;

    /// Returns the entry named by `handle`.
    fn get(&self, handle: Handle) -> Option<(&K, &V)>;

    /// Returns the entry named by `handle` with a mutable value.
    fn get_mut(&mut self, handle: Handle) -> Option<(&K, &mut V)>;

    /// Returns `true` if `handle` names a live entry.
    #[inline]
    fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// The first entry in key order.
    fn first(&self) -> Option<Handle>;

    /// The last entry in key order.
    fn last(&self) -> Option<Handle>;

    /// The entry following `handle`, or `None` at the end (or for a stale handle).
    fn next(&self, handle: Handle) -> Option<Handle>;

    /// The entry preceding `handle`, or `None` at the start (or for a stale handle).
    fn prev(&self, handle: Handle) -> Option<Handle>;

    /// The first entry whose key is not less than `key`.
    fn lower_bound(&self, key: &K) -> Option<Handle>;

    /// The first entry whose key is greater than `key`.
    fn upper_bound(&self, key: &K) -> Option<Handle>;

    /// The half-open range of entries whose key is equivalent to `key`.
    #[inline]
    fn equal_range(&self, key: &K) -> (Option<Handle>, Option<Handle>) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Some entry with a key equivalent to `key`: the first of its equal range.
    fn find(&self, key: &K) -> Option<Handle> {
        let candidate = self.lower_bound(key)?;
        let (found, _) = self.get(candidate)?;
        self.comparator()
            .equivalent(found, key)
            .then_some(candidate)
    }

    /// Mutable access to every entry in `[start, end)`, in key order.
    ///
    /// `start == None` yields nothing; `end == None` runs to the last entry.
    fn entries_mut(&mut self, start: Option<Handle>, end: Option<Handle>) -> Vec<(&K, &mut V)>;

    /// Removes and returns the first entry.
    fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.first()?;
        self.remove(handle)
    }

    /// Removes and returns the last entry.
    fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.last()?;
        self.remove(handle)
    }
}

/// Collects the handles of `[start, end)` by stepping forward.
pub(crate) fn collect_handles<K, V, S>(
    store: &S,
    start: Option<Handle>,
    end: Option<Handle>,
) -> Vec<Handle>
where
    S: OrderedStore<K, V> + ?Sized,
{
    let mut handles = Vec::new();
    let mut cursor = start;
    while let Some(handle) = cursor {
        if Some(handle) == end {
            break;
        }
        handles.push(handle);
        cursor = store.next(handle);
    }
    handles
}
