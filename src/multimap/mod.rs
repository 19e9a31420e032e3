//! Ordered map that allows several entries to share a key.
//!
//! This module provides [`MultiMap`], the multi-key semantics layer on top of
//! an [`OrderedStore`].
//!
//! # Overview
//!
//! `MultiMap` keeps `(key, value)` entries sorted by key. Any number of entries
//! may carry equivalent keys; they are kept in insertion order. On top of the
//! store's primitives it adds:
//!
//! - bulk erase by key ([`MultiMap::erase`])
//! - duplicate counting over the equal range ([`MultiMap::count`])
//! - merge by transfer ([`MultiMap::merge`])
//! - checked lookup ([`MultiMap::at`])
//! - order-sensitive structural equality
//!
//! Positions are [`Handle`]s; `None` stands for the end marker.
//!
//! # Time Complexity (with the default [`RedBlackStore`])
//!
//! | Operation                      | Complexity   |
//! |--------------------------------|--------------|
//! | `insert` / `emplace`           | O(log N)     |
//! | `find` / `at` / bounds         | O(log N)     |
//! | `count`                        | O(log N + k) |
//! | `get_all`                      | O(log N + k) |
//! | `get_all_mut`                  | O(log N + k log k) |
//! | `erase` (by key)               | O(k log N)   |
//! | `erase_at`                     | O(log N)     |
//! | `merge`                        | O(M log N)   |
//! | `swap`                         | O(1)         |
//! | `len` / `is_empty`             | O(1)         |
//!
//! where k is the number of entries sharing the key and M the size of the
//! merged map.
//!
//! # Examples
//!
//! ```rust
//! use multikey::MultiMap;
//!
//! let mut fruits: MultiMap<i32, String> = MultiMap::new();
//! fruits.emplace(1, "apple");
//! fruits.emplace(1, "avocado");
//! fruits.emplace(2, "banana");
//!
//! assert_eq!(fruits.count(&1), 2);
//! let ones: Vec<&str> = fruits.get_all(&1).map(|(_, v)| v.as_str()).collect();
//! assert_eq!(ones, vec!["apple", "avocado"]);
//!
//! assert_eq!(fruits.erase(&1), 2);
//! assert_eq!(fruits.len(), 1);
//! ```

mod iter;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::error::MultiMapError;
use crate::store::{Handle, OrderedStore, RedBlackStore};

pub use iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};

// =============================================================================
// MultiMap Definition
// =============================================================================

/// A sorted map whose keys may repeat.
///
/// `S` is the storage engine; it defaults to [`RedBlackStore`] ordered by
/// [`NaturalOrder`](crate::compare::NaturalOrder). A custom ordering is
/// supplied through the store's comparator type:
///
/// ```rust
/// use multikey::MultiMap;
/// use multikey::compare::ReverseOrder;
/// use multikey::store::RedBlackStore;
///
/// let mut descending: MultiMap<i32, &str, RedBlackStore<i32, &str, ReverseOrder>> =
///     MultiMap::new();
/// descending.insert(1, "one");
/// descending.insert(3, "three");
/// descending.insert(2, "two");
///
/// let keys: Vec<i32> = descending.keys().copied().collect();
/// assert_eq!(keys, vec![3, 2, 1]);
/// ```
pub struct MultiMap<K, V, S = RedBlackStore<K, V>> {
    store: S,
    marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, S: OrderedStore<K, V>> MultiMap<K, V, S> {
    /// Creates an empty map ordered by the default comparator.
    #[must_use]
    pub fn new() -> Self
    where
        S::Compare: Default,
    {
        Self::with_comparator(S::Compare::default())
    }

    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    /// use multikey::store::RedBlackStore;
    /// use std::cmp::Ordering;
    ///
    /// type ByLength = fn(&String, &String) -> Ordering;
    /// let mut words: MultiMap<String, u32, RedBlackStore<String, u32, ByLength>> =
    ///     MultiMap::with_comparator((|left: &String, right: &String| left.len().cmp(&right.len())) as ByLength);
    /// words.insert("pear".to_string(), 1);
    /// words.insert("plum".to_string(), 2);
    ///
    /// // "pear" and "plum" are equivalent under this comparator.
    /// assert_eq!(words.count(&"kiwi".to_string()), 2);
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: S::Compare) -> Self {
        Self::from_store(S::with_comparator(comparator))
    }

    /// Wraps an existing store, keeping its entries.
    #[must_use]
    pub const fn from_store(store: S) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes every entry. All handles into the map become stale.
    pub fn clear(&mut self) {
        let dropped = self.store.len();
        self.store.clear();
        log::trace!("MultiMap::clear dropped {dropped} entries");
    }

    /// Returns the comparator the map was built with.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    /// use multikey::compare::{Comparator, ReverseOrder};
    /// use multikey::store::RedBlackStore;
    ///
    /// let map: MultiMap<i32, (), RedBlackStore<i32, (), ReverseOrder>> = MultiMap::new();
    /// assert!(map.comparator().less(&2, &1));
    /// ```
    #[inline]
    pub fn comparator(&self) -> &S::Compare {
        self.store.comparator()
    }

    /// Read access to the underlying store.
    #[inline]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Inserts an entry. Duplicates are always accepted.
    ///
    /// The new entry is placed after every entry with an equivalent key.
    /// Returns its handle.
    pub fn insert(&mut self, key: K, value: V) -> Handle {
        self.store.insert(key, value)
    }

    /// Inserts an entry given as a `(key, value)` pair.
    pub fn insert_entry(&mut self, entry: (K, V)) -> Handle {
        let (key, value) = entry;
        self.store.insert(key, value)
    }

    /// Builds an entry from convertible parts and inserts it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    ///
    /// let mut map: MultiMap<i64, String> = MultiMap::new();
    /// let handle = map.emplace(3_i32, "cherry");
    /// assert_eq!(map.get(handle), Some((&3, &"cherry".to_string())));
    /// ```
    pub fn emplace<A, B>(&mut self, key: A, value: B) -> Handle
    where
        A: Into<K>,
        B: Into<V>,
    {
        self.store.insert(key.into(), value.into())
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes every entry whose key is equivalent to `key`.
    ///
    /// Returns the number of entries removed, 0 if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    ///
    /// let mut map: MultiMap<i32, &str> = [(2, "banana"), (2, "blueberry"), (3, "cherry")].into();
    /// assert_eq!(map.erase(&2), 2);
    /// assert_eq!(map.erase(&2), 0);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn erase(&mut self, key: &K) -> usize {
        let (mut cursor, end) = self.store.equal_range(key);
        let mut removed = 0;
        while let Some(handle) = cursor {
            if Some(handle) == end {
                break;
            }
            // Only the removed entry's handle goes stale, so step first.
            cursor = self.store.next(handle);
            if self.store.remove(handle).is_some() {
                removed += 1;
            }
        }
        log::trace!("MultiMap::erase removed {removed} entries");
        removed
    }

    /// Removes the entry named by `handle`.
    ///
    /// Returns the handle of the entry that followed it (`None` at the end).
    ///
    /// # Errors
    ///
    /// [`MultiMapError::InvalidHandle`] if `handle` is stale; nothing is removed.
    pub fn erase_at(&mut self, handle: Handle) -> Result<Option<Handle>, MultiMapError> {
        if !self.store.contains(handle) {
            return Err(MultiMapError::InvalidHandle);
        }
        let next = self.store.next(handle);
        self.store.remove(handle);
        Ok(next)
    }

    /// Removes the entry named by `handle` and returns it.
    pub fn remove_at(&mut self, handle: Handle) -> Option<(K, V)> {
        self.store.remove(handle)
    }

    /// Removes every entry in `[first, last)`, in forward order.
    ///
    /// `last == None` removes through the end. Returns `last`, which stays
    /// valid since it is not part of the range.
    ///
    /// # Errors
    ///
    /// - [`MultiMapError::InvalidHandle`] if `first` or `last` is stale
    /// - [`MultiMapError::InvalidRange`] if `last` does not follow `first`
    ///
    /// The map is left untouched on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    ///
    /// let mut map: MultiMap<i32, char> = [(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd')].into();
    /// let first = map.find(&2).unwrap();
    /// let last = map.find(&4);
    /// assert_eq!(map.erase_range(first, last), Ok(last));
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 4]);
    /// ```
    pub fn erase_range(
        &mut self,
        first: Handle,
        last: Option<Handle>,
    ) -> Result<Option<Handle>, MultiMapError> {
        if !self.store.contains(first) {
            return Err(MultiMapError::InvalidHandle);
        }
        if let Some(last) = last
            && !self.store.contains(last)
        {
            return Err(MultiMapError::InvalidHandle);
        }

        let mut doomed: SmallVec<[Handle; 8]> = SmallVec::new();
        let mut cursor = Some(first);
        while cursor != last {
            let Some(handle) = cursor else {
                return Err(MultiMapError::InvalidRange);
            };
            doomed.push(handle);
            cursor = self.store.next(handle);
        }

        for handle in &doomed {
            self.store.remove(*handle);
        }
        log::trace!("MultiMap::erase_range removed {} entries", doomed.len());
        Ok(last)
    }

    /// Moves every entry of `other` into `self`, leaving `other` empty.
    ///
    /// Nothing is cloned and nothing is rejected. Moved entries keep their
    /// relative order and land after existing entries with equivalent keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    ///
    /// let mut first: MultiMap<i32, &str> = [(1, "apple"), (3, "cherry")].into();
    /// let mut second: MultiMap<i32, &str> = [(4, "date"), (4, "dragonfruit")].into();
    ///
    /// first.merge(&mut second);
    /// assert!(second.is_empty());
    /// assert_eq!(first.len(), 4);
    /// assert_eq!(first.count(&4), 2);
    /// ```
    pub fn merge<T>(&mut self, other: &mut MultiMap<K, V, T>)
    where
        T: OrderedStore<K, V>,
    {
        let transferred = other.store.len();
        while let Some((key, value)) = other.store.pop_first() {
            self.store.insert(key, value);
        }
        log::trace!("MultiMap::merge transferred {transferred} entries");
    }

    /// Exchanges the contents of two maps without moving any entry.
    ///
    /// Handles follow their entries: a handle taken from `self` now names the
    /// same entry inside `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.store, &mut other.store);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Returns the value of the entry [`find`](Self::find) resolves to.
    ///
    /// With duplicate keys that is the first entry of the equal range.
    ///
    /// # Errors
    ///
    /// [`MultiMapError::KeyNotFound`] if no entry has an equivalent key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::{MultiMap, MultiMapError};
    ///
    /// let map: MultiMap<i32, &str> = [(10, "ten"), (20, "twenty"), (10, "ten-duplicate")].into();
    /// assert_eq!(map.at(&10), Ok(&"ten"));
    /// assert_eq!(map.at(&30), Err(MultiMapError::KeyNotFound));
    /// ```
    pub fn at(&self, key: &K) -> Result<&V, MultiMapError> {
        self.find(key)
            .and_then(|handle| self.store.get(handle))
            .map(|(_, value)| value)
            .ok_or(MultiMapError::KeyNotFound)
    }

    /// Mutable variant of [`at`](Self::at).
    ///
    /// # Errors
    ///
    /// [`MultiMapError::KeyNotFound`] if no entry has an equivalent key.
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V, MultiMapError> {
        let handle = self.find(key).ok_or(MultiMapError::KeyNotFound)?;
        self.store
            .get_mut(handle)
            .map(|(_, value)| value)
            .ok_or(MultiMapError::KeyNotFound)
    }

    /// Returns a handle to an entry with an equivalent key, or `None`.
    #[inline]
    pub fn find(&self, key: &K) -> Option<Handle> {
        self.store.find(key)
    }

    /// Returns `true` if some entry has an equivalent key.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Counts the entries with an equivalent key by walking the equal range.
    pub fn count(&self, key: &K) -> usize {
        self.get_all(key).count()
    }

    /// The first entry whose key is not less than `key`.
    #[inline]
    pub fn lower_bound(&self, key: &K) -> Option<Handle> {
        self.store.lower_bound(key)
    }

    /// The first entry whose key is greater than `key`.
    #[inline]
    pub fn upper_bound(&self, key: &K) -> Option<Handle> {
        self.store.upper_bound(key)
    }

    /// The half-open handle range `[lower_bound(key), upper_bound(key))`.
    #[inline]
    pub fn equal_range(&self, key: &K) -> (Option<Handle>, Option<Handle>) {
        self.store.equal_range(key)
    }

    /// Iterates over every entry with an equivalent key, in insertion order.
    pub fn get_all(&self, key: &K) -> Range<'_, K, V, S> {
        let (start, end) = self.store.equal_range(key);
        Range::new(&self.store, start, end)
    }

    /// Mutable variant of [`get_all`](Self::get_all).
    pub fn get_all_mut(&mut self, key: &K) -> IterMut<'_, K, V> {
        let (start, end) = self.store.equal_range(key);
        IterMut::new(self.store.entries_mut(start, end))
    }

    // =========================================================================
    // Handles
    // =========================================================================

    /// Returns the entry named by `handle`, or `None` if it is stale.
    #[inline]
    pub fn get(&self, handle: Handle) -> Option<(&K, &V)> {
        self.store.get(handle)
    }

    /// Returns the entry named by `handle` with a mutable value.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<(&K, &mut V)> {
        self.store.get_mut(handle)
    }

    /// The handle of the first entry in key order.
    #[inline]
    pub fn first_handle(&self) -> Option<Handle> {
        self.store.first()
    }

    /// The handle of the last entry in key order.
    #[inline]
    pub fn last_handle(&self) -> Option<Handle> {
        self.store.last()
    }

    /// Steps forward from `handle`. `None` is the end marker.
    #[inline]
    pub fn next(&self, handle: Handle) -> Option<Handle> {
        self.store.next(handle)
    }

    /// Steps backward from `position`.
    ///
    /// Stepping back from the end marker (`None`) yields the last entry.
    pub fn prev(&self, position: Option<Handle>) -> Option<Handle> {
        match position {
            Some(handle) => self.store.prev(handle),
            None => self.store.last(),
        }
    }

    /// Returns the first entry in key order.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.store.first().and_then(|handle| self.store.get(handle))
    }

    /// Returns the last entry in key order.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.store.last().and_then(|handle| self.store.get(handle))
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Iterates over all entries in key order. Use `.rev()` for reverse order.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter::new(&self.store)
    }

    /// Iterates over all entries in key order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let start = self.store.first();
        IterMut::new(self.store.entries_mut(start, None))
    }

    /// Iterates over the keys, once per entry.
    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys { inner: self.iter() }
    }

    /// Iterates over the values in key order.
    pub fn values(&self) -> Values<'_, K, V, S> {
        Values { inner: self.iter() }
    }

    /// Iterates over the values in key order, mutably.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Iterates over the handle range `[start, end)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use multikey::MultiMap;
    ///
    /// let map: MultiMap<i32, char> = [(1, 'a'), (2, 'b'), (3, 'c')].into();
    /// let from_two: Vec<char> = map.range(map.lower_bound(&2), None).map(|(_, v)| *v).collect();
    /// assert_eq!(from_two, vec!['b', 'c']);
    /// ```
    pub fn range(&self, start: Option<Handle>, end: Option<Handle>) -> Range<'_, K, V, S> {
        Range::new(&self.store, start, end)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, S> Default for MultiMap<K, V, S>
where
    S: OrderedStore<K, V>,
    S::Compare: Default,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: Clone> Clone for MultiMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            marker: PhantomData,
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for MultiMap<K, V, S>
where
    S: OrderedStore<K, V>,
    S::Compare: Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S, const N: usize> From<[(K, V); N]> for MultiMap<K, V, S>
where
    S: OrderedStore<K, V>,
    S::Compare: Default,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V, S: OrderedStore<K, V>> Extend<(K, V)> for MultiMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.store.insert(key, value);
        }
    }
}

impl<K, V, S: OrderedStore<K, V>> IntoIterator for MultiMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.store)
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> IntoIterator for &'a MultiMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S: OrderedStore<K, V>> IntoIterator for &'a mut MultiMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Structural equality: same length and pairwise-equal entries in traversal order.
///
/// Equality is sensitive to the order of duplicates, so two maps holding the
/// same multiset of entries are unequal if equivalent keys were inserted in a
/// different order. Comparators are not compared.
///
/// ```rust
/// use multikey::MultiMap;
///
/// let first: MultiMap<i32, &str> = [(1, "a"), (1, "b")].into();
/// let second: MultiMap<i32, &str> = [(1, "b"), (1, "a")].into();
/// assert_ne!(first, second);
/// ```
impl<K, V, S, T> PartialEq<MultiMap<K, V, T>> for MultiMap<K, V, S>
where
    K: PartialEq,
    V: PartialEq,
    S: OrderedStore<K, V>,
    T: OrderedStore<K, V>,
{
    fn eq(&self, other: &MultiMap<K, V, T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, S: OrderedStore<K, V>> Eq for MultiMap<K, V, S> {}

impl<K: Hash, V: Hash, S: OrderedStore<K, V>> Hash for MultiMap<K, V, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S: OrderedStore<K, V>> fmt::Debug for MultiMap<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, S: OrderedStore<K, V>> fmt::Display
    for MultiMap<K, V, S>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

/// Serializes as a sequence of `[key, value]` pairs in traversal order, so
/// duplicate keys and their order survive formats whose maps reject duplicates.
#[cfg(feature = "serde")]
impl<K, V, S> serde::Serialize for MultiMap<K, V, S>
where
    K: serde::Serialize,
    V: serde::Serialize,
    S: OrderedStore<K, V>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for entry in self {
            sequence.serialize_element(&entry)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct MultiMapVisitor<K, V, S> {
    marker: PhantomData<fn() -> MultiMap<K, V, S>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::de::Visitor<'de> for MultiMapVisitor<K, V, S>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    S: OrderedStore<K, V>,
    S::Compare: Default,
{
    type Value = MultiMap<K, V, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of key-value pairs")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut map = MultiMap::new();
        while let Some((key, value)) = access.next_element::<(K, V)>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, S> serde::Deserialize<'de> for MultiMap<K, V, S>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    S: OrderedStore<K, V>,
    S::Compare: Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(MultiMapVisitor {
            marker: PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
