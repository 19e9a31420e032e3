//! Sorted-vector store.
//!
//! [`SortedVecStore`] keeps its entries in a generational arena and a `Vec` of
//! handles sorted by key. Every entry records its index in that vector.
//!
//! - O(log N) `lower_bound` / `upper_bound` / `find` (binary search)
//! - O(1) `next` / `prev`, so walking k duplicates is O(k)
//! - O(N) insert and remove: the handle vector shifts and the shifted entries
//!   are renumbered
//!
//! It suits small collections and serves as an independent reference engine
//! for [`RedBlackStore`].
//!
//! [`RedBlackStore`]: super::RedBlackStore

use std::fmt;

use super::arena::Arena;
use super::{Handle, OrderedStore};
use crate::compare::{Comparator, NaturalOrder};

/// An ordered store backed by a sorted vector of handles.
///
/// # Examples
///
/// ```rust
/// use multikey::store::{OrderedStore, SortedVecStore};
///
/// let mut store: SortedVecStore<&str, u32> = SortedVecStore::default();
/// store.insert("b", 2);
/// store.insert("a", 1);
/// store.insert("b", 3);
///
/// let first = store.first().unwrap();
/// assert_eq!(store.get(first), Some((&"a", &1)));
/// assert_eq!(store.upper_bound(&"a"), store.find(&"b"));
/// ```
#[derive(Clone)]
pub struct SortedVecStore<K, V, C = NaturalOrder> {
    entries: Arena<Entry<K, V>>,
    order: Vec<Handle>,
    comparator: C,
}

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    /// Index of this entry's handle in `order`.
    position: usize,
}

impl<K, V, C> SortedVecStore<K, V, C> {
    fn key_of(&self, handle: Handle) -> &K {
        &self.entries[handle.index()].key
    }

    fn position(&self, handle: Handle) -> Option<usize> {
        self.entries.get(handle).map(|entry| entry.position)
    }

    /// Rewrites the recorded position of every handle from `from` onwards.
    fn renumber(&mut self, from: usize) {
        for (position, handle) in self.order.iter().enumerate().skip(from) {
            self.entries[handle.index()].position = position;
        }
    }

    fn handle_at(&self, position: usize) -> Option<Handle> {
        self.order.get(position).copied()
    }
}

impl<K, V, C: Comparator<K>> SortedVecStore<K, V, C> {
    fn lower_position(&self, key: &K) -> usize {
        self.order
            .partition_point(|handle| self.comparator.less(self.key_of(*handle), key))
    }

    fn upper_position(&self, key: &K) -> usize {
        self.order
            .partition_point(|handle| !self.comparator.less(key, self.key_of(*handle)))
    }
}

impl<K, V, C: Default> SortedVecStore<K, V, C> {
    /// Creates an empty store with the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arena::new(),
            order: Vec::new(),
            comparator: C::default(),
        }
    }
}

impl<K, V, C: Default> Default for SortedVecStore<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> OrderedStore<K, V> for SortedVecStore<K, V, C> {
    type Compare = C;

    fn with_comparator(comparator: C) -> Self {
        Self {
            entries: Arena::new(),
            order: Vec::new(),
            comparator,
        }
    }

    #[inline]
    fn comparator(&self) -> &C {
        &self.comparator
    }

    #[inline]
    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn insert(&mut self, key: K, value: V) -> Handle {
        let position = self.upper_position(&key);
        let handle = self.entries.insert(Entry {
            key,
            value,
            position,
        });
        self.order.insert(position, handle);
        self.renumber(position + 1);
        handle
    }

    fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let position = self.position(handle)?;
        self.order.remove(position);
        self.renumber(position);
        self.entries
            .remove(handle)
            .map(|entry| (entry.key, entry.value))
    }

    fn get(&self, handle: Handle) -> Option<(&K, &V)> {
        self.entries
            .get(handle)
            .map(|entry| (&entry.key, &entry.value))
    }

    fn get_mut(&mut self, handle: Handle) -> Option<(&K, &mut V)> {
        self.entries
            .get_mut(handle)
            .map(|entry| (&entry.key, &mut entry.value))
    }

    fn first(&self) -> Option<Handle> {
        self.order.first().copied()
    }

    fn last(&self) -> Option<Handle> {
        self.order.last().copied()
    }

    fn next(&self, handle: Handle) -> Option<Handle> {
        let position = self.position(handle)?;
        self.handle_at(position + 1)
    }

    fn prev(&self, handle: Handle) -> Option<Handle> {
        let position = self.position(handle)?;
        position.checked_sub(1).and_then(|previous| self.handle_at(previous))
    }

    fn lower_bound(&self, key: &K) -> Option<Handle> {
        self.handle_at(self.lower_position(key))
    }

    fn upper_bound(&self, key: &K) -> Option<Handle> {
        self.handle_at(self.upper_position(key))
    }

    fn entries_mut(&mut self, start: Option<Handle>, end: Option<Handle>) -> Vec<(&K, &mut V)> {
        let Some(from) = start.and_then(|handle| self.position(handle)) else {
            return Vec::new();
        };
        let to = end
            .and_then(|handle| self.position(handle))
            .unwrap_or(self.order.len())
            .max(from);
        let handles = self.order[from..to].to_vec();
        self.entries
            .many_mut(&handles)
            .into_iter()
            .map(|entry| (&entry.key, &mut entry.value))
            .collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for SortedVecStore<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_map()
            .entries(self.order.iter().map(|handle| {
                let entry = &self.entries[handle.index()];
                (&entry.key, &entry.value)
            }))
            .finish()
    }
}
