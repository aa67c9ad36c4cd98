//! Associative combination of error collections.
//!
//! [`Validation`](crate::Validation) uses `Semigroup` to merge the errors of
//! independent checks so a config validator can report every problem at once
//! instead of stopping at the first.
//!
//! # Examples
//!
//! ```
//! use riptide::Semigroup;
//!
//! let first = vec!["baseUrl is required".to_string()];
//! let second = vec!["retries must be between 0 and 5".to_string()];
//! assert_eq!(first.combine(second).len(), 2);
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// Implementations must satisfy the associativity law:
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}
