//! Arena-backed red-black tree that accepts duplicate keys.
//!
//! This module provides [`RedBlackStore`], the default [`OrderedStore`].
//!
//! # Overview
//!
//! Nodes live in a generational arena and refer to each other by slot index,
//! with explicit parent links so that stepping to the successor or predecessor
//! of any entry needs no auxiliary stack. A node never changes slot while it is
//! alive: rebalancing only rewires links. That is what keeps every [`Handle`]
//! valid until its own entry is removed.
//!
//! - O(log N) insert
//! - O(log N) remove by handle
//! - O(log N) `lower_bound` / `upper_bound` / `find`
//! - O(log N) worst case, O(1) amortized, `next` / `prev`
//! - O(1) len and `is_empty`
//!
//! # Internal Structure
//!
//! The tree maintains the usual red-black invariants:
//! 1. Every node is either red or black
//! 2. The root is black
//! 3. Missing children count as black leaves
//! 4. Red nodes have only black children
//! 5. Every path from a node to its leaves has the same number of black nodes
//!
//! Descent on insert goes left only when the new key orders strictly before the
//! node key, so an entry always lands after its equivalent predecessors.

use std::fmt;

use super::arena::Arena;
use super::{Handle, OrderedStore, collect_handles};
use crate::compare::{Comparator, NaturalOrder};

// =============================================================================
// Node Definition
// =============================================================================

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
}

// =============================================================================
// RedBlackStore Definition
// =============================================================================

/// An ordered store backed by a mutable red-black tree.
///
/// # Examples
///
/// ```rust
/// use multikey::store::{OrderedStore, RedBlackStore};
///
/// let mut store: RedBlackStore<i32, &str> = RedBlackStore::default();
/// store.insert(1, "apple");
/// store.insert(1, "avocado");
/// store.insert(2, "banana");
///
/// let (start, end) = store.equal_range(&1);
/// let first = start.unwrap();
/// let second = store.next(first).unwrap();
/// assert_eq!(store.get(first), Some((&1, &"apple")));
/// assert_eq!(store.get(second), Some((&1, &"avocado")));
/// assert_eq!(store.next(second), end);
/// ```
#[derive(Clone)]
pub struct RedBlackStore<K, V, C = NaturalOrder> {
    nodes: Arena<Node<K, V>>,
    root: Option<usize>,
    comparator: C,
}

impl<K, V, C> RedBlackStore<K, V, C> {
    fn handle(&self, index: usize) -> Option<Handle> {
        self.nodes.handle_at(index)
    }

    fn color(&self, link: Option<usize>) -> Color {
        link.map_or(Color::Black, |index| self.nodes[index].color)
    }

    fn is_red(&self, link: Option<usize>) -> bool {
        self.color(link) == Color::Red
    }

    fn set_color(&mut self, link: Option<usize>, color: Color) {
        if let Some(index) = link {
            self.nodes[index].color = color;
        }
    }

    fn leftmost(&self, mut index: usize) -> usize {
        while let Some(left) = self.nodes[index].left {
            index = left;
        }
        index
    }

    fn rightmost(&self, mut index: usize) -> usize {
        while let Some(right) = self.nodes[index].right {
            index = right;
        }
        index
    }

    fn successor(&self, index: usize) -> Option<usize> {
        if let Some(right) = self.nodes[index].right {
            return Some(self.leftmost(right));
        }
        let mut child = index;
        let mut parent = self.nodes[index].parent;
        while let Some(current) = parent {
            if self.nodes[current].left == Some(child) {
                return Some(current);
            }
            child = current;
            parent = self.nodes[current].parent;
        }
        None
    }

    fn predecessor(&self, index: usize) -> Option<usize> {
        if let Some(left) = self.nodes[index].left {
            return Some(self.rightmost(left));
        }
        let mut child = index;
        let mut parent = self.nodes[index].parent;
        while let Some(current) = parent {
            if self.nodes[current].right == Some(child) {
                return Some(current);
            }
            child = current;
            parent = self.nodes[current].parent;
        }
        None
    }

    // =========================================================================
    // Structural Helpers
    // =========================================================================

    /// Points `parent`'s link to `old` (or the root) at `new` instead.
    fn replace_child(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                if self.nodes[parent].left == Some(old) {
                    self.nodes[parent].left = new;
                } else {
                    self.nodes[parent].right = new;
                }
            }
        }
    }

    /// Replaces the subtree rooted at `old` with the one rooted at `new`.
    fn transplant(&mut self, old: usize, new: Option<usize>) {
        let parent = self.nodes[old].parent;
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    fn rotate_left(&mut self, pivot: usize) {
        let Some(right) = self.nodes[pivot].right else {
            return;
        };
        let inner = self.nodes[right].left;
        self.nodes[pivot].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(pivot);
        }
        self.transplant(pivot, Some(right));
        self.nodes[right].left = Some(pivot);
        self.nodes[pivot].parent = Some(right);
    }

    fn rotate_right(&mut self, pivot: usize) {
        let Some(left) = self.nodes[pivot].left else {
            return;
        };
        let inner = self.nodes[left].right;
        self.nodes[pivot].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(pivot);
        }
        self.transplant(pivot, Some(left));
        self.nodes[left].right = Some(pivot);
        self.nodes[pivot].parent = Some(left);
    }

    // =========================================================================
    // Rebalancing
    // =========================================================================

    /// Restores the red-black invariants after `node` was linked in red.
    fn balance_after_insert(&mut self, mut node: usize) {
        while let Some(mut parent) = self.nodes[node].parent {
            if self.nodes[parent].color == Color::Black {
                break;
            }
            // A red node is never the root, so the grandparent exists.
            let Some(grandparent) = self.nodes[parent].parent else {
                break;
            };

            if self.nodes[grandparent].left == Some(parent) {
                let uncle = self.nodes[grandparent].right;
                if self.is_red(uncle) {
                    self.nodes[parent].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[grandparent].color = Color::Red;
                    node = grandparent;
                } else {
                    if self.nodes[parent].right == Some(node) {
                        self.rotate_left(parent);
                        std::mem::swap(&mut node, &mut parent);
                    }
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.nodes[grandparent].left;
                if self.is_red(uncle) {
                    self.nodes[parent].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[grandparent].color = Color::Red;
                    node = grandparent;
                } else {
                    if self.nodes[parent].left == Some(node) {
                        self.rotate_right(parent);
                        std::mem::swap(&mut node, &mut parent);
                    }
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Resolves the extra black left at `node` (a child of `parent`) by a removal.
    fn balance_after_remove(&mut self, mut node: Option<usize>, mut parent: Option<usize>) {
        while node != self.root && !self.is_red(node) {
            let Some(current_parent) = parent else {
                break;
            };

            if self.nodes[current_parent].left == node {
                let Some(mut sibling) = self.nodes[current_parent].right else {
                    break;
                };
                if self.nodes[sibling].color == Color::Red {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[current_parent].color = Color::Red;
                    self.rotate_left(current_parent);
                    let Some(next_sibling) = self.nodes[current_parent].right else {
                        break;
                    };
                    sibling = next_sibling;
                }

                let near = self.nodes[sibling].left;
                let far = self.nodes[sibling].right;
                if !self.is_red(near) && !self.is_red(far) {
                    self.nodes[sibling].color = Color::Red;
                    node = Some(current_parent);
                    parent = self.nodes[current_parent].parent;
                } else {
                    if !self.is_red(far) {
                        self.set_color(near, Color::Black);
                        self.nodes[sibling].color = Color::Red;
                        self.rotate_right(sibling);
                        let Some(next_sibling) = self.nodes[current_parent].right else {
                            break;
                        };
                        sibling = next_sibling;
                    }
                    let parent_color = self.nodes[current_parent].color;
                    self.nodes[sibling].color = parent_color;
                    self.nodes[current_parent].color = Color::Black;
                    let far = self.nodes[sibling].right;
                    self.set_color(far, Color::Black);
                    self.rotate_left(current_parent);
                    node = self.root;
                    parent = None;
                }
            } else {
                let Some(mut sibling) = self.nodes[current_parent].left else {
                    break;
                };
                if self.nodes[sibling].color == Color::Red {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[current_parent].color = Color::Red;
                    self.rotate_right(current_parent);
                    let Some(next_sibling) = self.nodes[current_parent].left else {
                        break;
                    };
                    sibling = next_sibling;
                }

                let near = self.nodes[sibling].right;
                let far = self.nodes[sibling].left;
                if !self.is_red(near) && !self.is_red(far) {
                    self.nodes[sibling].color = Color::Red;
                    node = Some(current_parent);
                    parent = self.nodes[current_parent].parent;
                } else {
                    if !self.is_red(far) {
                        self.set_color(near, Color::Black);
                        self.nodes[sibling].color = Color::Red;
                        self.rotate_left(sibling);
                        let Some(next_sibling) = self.nodes[current_parent].left else {
                            break;
                        };
                        sibling = next_sibling;
                    }
                    let parent_color = self.nodes[current_parent].color;
                    self.nodes[sibling].color = parent_color;
                    self.nodes[current_parent].color = Color::Black;
                    let far = self.nodes[sibling].left;
                    self.set_color(far, Color::Black);
                    self.rotate_right(current_parent);
                    node = self.root;
                    parent = None;
                }
            }
        }
        self.set_color(node, Color::Black);
    }

    /// Unlinks the node at `index` from the tree, leaving it in the arena.
    fn unlink(&mut self, index: usize) {
        let left = self.nodes[index].left;
        let right = self.nodes[index].right;
        let mut removed_color = self.nodes[index].color;

        let replacement;
        let replacement_parent;
        match (left, right) {
            (None, _) => {
                replacement = right;
                replacement_parent = self.nodes[index].parent;
                self.transplant(index, right);
            }
            (_, None) => {
                replacement = left;
                replacement_parent = self.nodes[index].parent;
                self.transplant(index, left);
            }
            (Some(left), Some(right)) => {
                let heir = self.leftmost(right);
                removed_color = self.nodes[heir].color;
                replacement = self.nodes[heir].right;
                if self.nodes[heir].parent == Some(index) {
                    replacement_parent = Some(heir);
                } else {
                    replacement_parent = self.nodes[heir].parent;
                    self.transplant(heir, replacement);
                    self.nodes[heir].right = Some(right);
                    self.nodes[right].parent = Some(heir);
                }
                self.transplant(index, Some(heir));
                self.nodes[heir].left = Some(left);
                self.nodes[left].parent = Some(heir);
                let color = self.nodes[index].color;
                self.nodes[heir].color = color;
            }
        }

        if removed_color == Color::Black {
            self.balance_after_remove(replacement, replacement_parent);
        }
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        std::iter::successors(self.root.map(|root| self.leftmost(root)), |index| {
            self.successor(*index)
        })
        .map(|index| {
            let node = &self.nodes[index];
            (&node.key, &node.value)
        })
    }
}

impl<K, V, C: Default> RedBlackStore<K, V, C> {
    /// Creates an empty store with the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            comparator: C::default(),
        }
    }
}

impl<K, V, C: Default> Default for RedBlackStore<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// OrderedStore Implementation
// =============================================================================

impl<K, V, C: Comparator<K>> OrderedStore<K, V> for RedBlackStore<K, V, C> {
    type Compare = C;

    fn with_comparator(comparator: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            comparator,
        }
    }

    #[inline]
    fn comparator(&self) -> &C {
        &self.comparator
    }

    #[inline]
    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    fn insert(&mut self, key: K, value: V) -> Handle {
        let mut parent = None;
        let mut goes_left = false;
        let mut cursor = self.root;
        while let Some(index) = cursor {
            parent = Some(index);
            goes_left = self.comparator.less(&key, &self.nodes[index].key);
            cursor = if goes_left {
                self.nodes[index].left
            } else {
                self.nodes[index].right
            };
        }

        let handle = self.nodes.insert(Node {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });
        let index = handle.index();
        match parent {
            None => self.root = Some(index),
            Some(parent) if goes_left => self.nodes[parent].left = Some(index),
            Some(parent) => self.nodes[parent].right = Some(index),
        }
        self.balance_after_insert(index);
        handle
    }

    fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        if !self.nodes.contains(handle) {
            return None;
        }
        self.unlink(handle.index());
        let node = self.nodes.remove(handle)?;
        Some((node.key, node.value))
    }

    fn get(&self, handle: Handle) -> Option<(&K, &V)> {
        self.nodes.get(handle).map(|node| (&node.key, &node.value))
    }

    fn get_mut(&mut self, handle: Handle) -> Option<(&K, &mut V)> {
        self.nodes
            .get_mut(handle)
            .map(|node| (&node.key, &mut node.value))
    }

    fn first(&self) -> Option<Handle> {
        self.root
            .map(|root| self.leftmost(root))
            .and_then(|index| self.handle(index))
    }

    fn last(&self) -> Option<Handle> {
        self.root
            .map(|root| self.rightmost(root))
            .and_then(|index| self.handle(index))
    }

    fn next(&self, handle: Handle) -> Option<Handle> {
        if !self.nodes.contains(handle) {
            return None;
        }
        self.successor(handle.index())
            .and_then(|index| self.handle(index))
    }

    fn prev(&self, handle: Handle) -> Option<Handle> {
        if !self.nodes.contains(handle) {
            return None;
        }
        self.predecessor(handle.index())
            .and_then(|index| self.handle(index))
    }

    fn lower_bound(&self, key: &K) -> Option<Handle> {
        let mut candidate = None;
        let mut cursor = self.root;
        while let Some(index) = cursor {
            if self.comparator.less(&self.nodes[index].key, key) {
                cursor = self.nodes[index].right;
            } else {
                candidate = Some(index);
                cursor = self.nodes[index].left;
            }
        }
        candidate.and_then(|index| self.handle(index))
    }

    fn upper_bound(&self, key: &K) -> Option<Handle> {
        let mut candidate = None;
        let mut cursor = self.root;
        while let Some(index) = cursor {
            if self.comparator.less(key, &self.nodes[index].key) {
                candidate = Some(index);
                cursor = self.nodes[index].left;
            } else {
                cursor = self.nodes[index].right;
            }
        }
        candidate.and_then(|index| self.handle(index))
    }

    fn entries_mut(&mut self, start: Option<Handle>, end: Option<Handle>) -> Vec<(&K, &mut V)> {
        let handles = collect_handles::<K, V, Self>(self, start, end);
        self.nodes
            .many_mut(&handles)
            .into_iter()
            .map(|node| (&node.key, &mut node.value))
            .collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RedBlackStore<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.entries()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
