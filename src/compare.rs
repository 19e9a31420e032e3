//! Key comparators.
//!
//! A [`Comparator`] defines the strict weak ordering a store sorts its keys by.
//! Two keys are *equivalent* when neither compares less than the other; the
//! multi-key layer treats equivalent keys as "the same key" for lookup,
//! counting and bulk erase, even when the keys are not identical values.
//!
//! # Examples
//!
//! ```rust
//! use multikey::compare::{Comparator, NaturalOrder, ReverseOrder};
//! use std::cmp::Ordering;
//!
//! assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
//! assert_eq!(ReverseOrder.compare(&1, &2), Ordering::Greater);
//!
//! // Any `Fn(&K, &K) -> Ordering` is a comparator as well.
//! let by_length = |left: &&str, right: &&str| left.len().cmp(&right.len());
//! assert!(by_length.equivalent(&"abc", &"xyz"));
//! ```

use std::cmp::Ordering;

/// A strict weak ordering over keys of type `K`.
///
/// Implementations must be consistent: `compare(a, b)` is `Less` exactly when
/// `compare(b, a)` is `Greater`, and equivalence is transitive.
pub trait Comparator<K: ?Sized> {
    /// Orders `left` relative to `right`.
    fn compare(&self, left: &K, right: &K) -> Ordering;

    /// Returns `true` if `left` orders strictly before `right`.
    #[inline]
    fn less(&self, left: &K, right: &K) -> bool {
        self.compare(left, right) == Ordering::Less
    }

    /// Returns `true` if neither key orders before the other.
    #[inline]
    fn equivalent(&self, left: &K, right: &K) -> bool {
        self.compare(left, right) == Ordering::Equal
    }
}

/// Orders keys by their [`Ord`] implementation. The default comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<K: Ord + ?Sized> Comparator<K> for ReverseOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        right.cmp(left)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self(left, right)
    }
}
