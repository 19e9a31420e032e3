//! Error types for the multi-key map.
//!
//! Lookups that can simply miss (`find`, `get`, the bounds) return `Option`.
//! [`MultiMapError`] is reserved for the checked operations: `at`/`at_mut`,
//! which promise a value, and the handle-taking mutations, which reject stale
//! handles instead of corrupting the map.

use std::fmt;

/// Errors reported by [`MultiMap`](crate::MultiMap) operations.
///
/// # Examples
///
/// ```rust
/// use multikey::{MultiMap, MultiMapError};
///
/// let map: MultiMap<i32, &str> = [(10, "ten"), (20, "twenty")].into();
/// assert_eq!(map.at(&30), Err(MultiMapError::KeyNotFound));
/// assert_eq!(
///     MultiMapError::KeyNotFound.to_string(),
///     "MultiMap::at: key not found"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiMapError {
    /// No entry has a key equivalent to the one requested.
    KeyNotFound,
    /// The handle names an entry that has been removed.
    InvalidHandle,
    /// The end of a handle range does not follow its start.
    InvalidRange,
}

impl fmt::Display for MultiMapError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound => write!(formatter, "MultiMap::at: key not found"),
            Self::InvalidHandle => write!(formatter, "handle does not name a live entry"),
            Self::InvalidRange => {
                write!(formatter, "range end is not reachable from range start")
            }
        }
    }
}

impl std::error::Error for MultiMapError {}
