//! Iterators over a [`MultiMap`](super::MultiMap).
//!
//! Borrowing iterators walk the store handle by handle from both ends, so all
//! of them are double-ended: `.rev()` is the reverse traversal.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::store::{Handle, OrderedStore};

// =============================================================================
// Cursor
// =============================================================================

/// Two-ended walk over the half-open handle range `[start, end)`.
#[derive(Clone, Copy, Debug)]
struct Cursor {
    front: Option<Handle>,
    back: Option<Handle>,
}

impl Cursor {
    fn new<K, V, S>(store: &S, start: Option<Handle>, end: Option<Handle>) -> Self
    where
        S: OrderedStore<K, V>,
    {
        if start.is_none() || start == end {
            return Self {
                front: None,
                back: None,
            };
        }
        let back = match end {
            Some(end) => store.prev(end),
            None => store.last(),
        };
        Self { front: start, back }
    }

    fn step_front<K, V, S>(&mut self, store: &S) -> Option<Handle>
    where
        S: OrderedStore<K, V>,
    {
        let handle = self.front?;
        if Some(handle) == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = store.next(handle);
        }
        Some(handle)
    }

    fn step_back<K, V, S>(&mut self, store: &S) -> Option<Handle>
    where
        S: OrderedStore<K, V>,
    {
        let handle = self.back?;
        if Some(handle) == self.front {
            self.front = None;
            self.back = None;
        } else {
            self.back = store.prev(handle);
        }
        Some(handle)
    }
}

// =============================================================================
// Iter
// =============================================================================

/// An iterator over all entries of a [`MultiMap`](super::MultiMap), in key order.
pub struct Iter<'a, K, V, S> {
    store: &'a S,
    cursor: Cursor,
    remaining: usize,
    marker: PhantomData<fn() -> (&'a K, &'a V)>,
}

impl<'a, K, V, S: OrderedStore<K, V>> Iter<'a, K, V, S> {
    pub(super) fn new(store: &'a S) -> Self {
        Self {
            store,
            cursor: Cursor::new::<K, V, S>(store, store.first(), None),
            remaining: store.len(),
            marker: PhantomData,
        }
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor.step_front::<K, V, S>(self.store)?;
        self.remaining = self.remaining.saturating_sub(1);
        self.store.get(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> DoubleEndedIterator for Iter<'a, K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.cursor.step_back::<K, V, S>(self.store)?;
        self.remaining = self.remaining.saturating_sub(1);
        self.store.get(handle)
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> ExactSizeIterator for Iter<'a, K, V, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> FusedIterator for Iter<'a, K, V, S> {}

impl<K, V, S> Clone for Iter<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            cursor: self.cursor,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

// =============================================================================
// Range
// =============================================================================

/// An iterator over the entries of a handle range, such as an equal range.
pub struct Range<'a, K, V, S> {
    store: &'a S,
    cursor: Cursor,
    marker: PhantomData<fn() -> (&'a K, &'a V)>,
}

impl<'a, K, V, S: OrderedStore<K, V>> Range<'a, K, V, S> {
    pub(super) fn new(store: &'a S, start: Option<Handle>, end: Option<Handle>) -> Self {
        Self {
            store,
            cursor: Cursor::new::<K, V, S>(store, start, end),
            marker: PhantomData,
        }
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> Iterator for Range<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor.step_front::<K, V, S>(self.store)?;
        self.store.get(handle)
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> DoubleEndedIterator for Range<'a, K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.cursor.step_back::<K, V, S>(self.store)?;
        self.store.get(handle)
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> FusedIterator for Range<'a, K, V, S> {}

// =============================================================================
// Keys / Values
// =============================================================================

/// An iterator over the keys of a [`MultiMap`](super::MultiMap), repeated once per entry.
pub struct Keys<'a, K, V, S> {
    pub(super) inner: Iter<'a, K, V, S>,
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> Iterator for Keys<'a, K, V, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> DoubleEndedIterator for Keys<'a, K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> ExactSizeIterator for Keys<'a, K, V, S> {}

/// An iterator over the values of a [`MultiMap`](super::MultiMap), in key order.
pub struct Values<'a, K, V, S> {
    pub(super) inner: Iter<'a, K, V, S>,
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> Iterator for Values<'a, K, V, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> DoubleEndedIterator for Values<'a, K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<'a, K: 'a, V: 'a, S: OrderedStore<K, V>> ExactSizeIterator for Values<'a, K, V, S> {}

// =============================================================================
// Mutable Iterators
// =============================================================================

/// A mutable iterator over entries of a [`MultiMap`](super::MultiMap).
///
/// Keys stay immutable: changing a key in place could break the ordering.
pub struct IterMut<'a, K, V> {
    entries: std::vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(entries: Vec<(&'a K, &'a mut V)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// A mutable iterator over the values of a [`MultiMap`](super::MultiMap).
pub struct ValuesMut<'a, K, V> {
    pub(super) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

// =============================================================================
// IntoIter
// =============================================================================

/// An owning iterator that drains a [`MultiMap`](super::MultiMap) in key order.
pub struct IntoIter<K, V, S> {
    store: S,
    marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, S> IntoIter<K, V, S> {
    pub(super) const fn new(store: S) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }
}

impl<K, V, S: OrderedStore<K, V>> Iterator for IntoIter<K, V, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.store.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len();
        (remaining, Some(remaining))
    }
}

impl<K, V, S: OrderedStore<K, V>> DoubleEndedIterator for IntoIter<K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.store.pop_last()
    }
}

impl<K, V, S: OrderedStore<K, V>> ExactSizeIterator for IntoIter<K, V, S> {}

impl<K, V, S: OrderedStore<K, V>> FusedIterator for IntoIter<K, V, S> {}
