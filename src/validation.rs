//! Validation type for accumulating errors
//!
//! `Validation` is similar to `Result` but accumulates every error when
//! independent checks are combined, rather than short-circuiting on the first
//! failure. The run-config validator builds on it to report all rule
//! violations in one pass.
//!
//! # Examples
//!
//! ## Accumulating errors
//!
//! ```
//! use riptide::Validation;
//!
//! let v1 = Validation::<i32, _>::failure(vec!["timeoutMs is required"]);
//! let v2 = Validation::<i32, _>::failure(vec!["retries is required"]);
//! let result = v1.and(v2);
//!
//! assert_eq!(
//!     result,
//!     Validation::Failure(vec!["timeoutMs is required", "retries is required"])
//! );
//! ```
//!
//! ## Validating tuples
//!
//! ```
//! use riptide::{Validation, validation::ValidateAll};
//!
//! let result = (
//!     Validation::<_, Vec<&str>>::success(5000),
//!     Validation::<_, Vec<&str>>::success(2),
//! ).validate_all();
//!
//! assert_eq!(result, Validation::Success((5000, 2)));
//! ```

use crate::Semigroup;

/// A validation that either succeeds with a value or fails with accumulated errors
///
/// # Type Parameters
///
/// * `T` - The type of the success value
/// * `E` - The type of the error value (must implement `Semigroup` for accumulation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E> {
    /// Successful validation with a value
    Success(T),
    /// Failed validation with accumulated errors
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// Create a successful validation
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// Create a failed validation
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Create a validation from a Result
    ///
    /// # Examples
    ///
    /// ```
    /// use riptide::Validation;
    ///
    /// let v = Validation::from_result("5000".parse::<i64>().map_err(|e| e.to_string()));
    /// assert_eq!(v, Validation::Success(5000));
    /// ```
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Success(value),
            Err(error) => Validation::Failure(error),
        }
    }

    /// Convert this validation to a Result
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(error),
        }
    }

    /// Check if this validation is successful
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Validation::Success(_))
    }

    /// Transform the success value if present
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Success(value) => Validation::Success(f(value)),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }
}

impl<T, E: Semigroup> Validation<T, E> {
    /// Combine two validations, accumulating errors using the Semigroup instance
    ///
    /// If both validations are successful, returns a success with a tuple of both values.
    /// If either or both fail, accumulates the errors using `Semigroup::combine`.
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) => Validation::Failure(e),
            (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }
}

impl<T, E> Validation<T, E> {
    /// Combine all validations in a tuple
    ///
    /// This is a convenience method that delegates to the `ValidateAll` trait.
    /// It works with tuples of two or four validations.
    pub fn all<V, E2>(validations: V) -> Validation<V::Output, E2>
    where
        E2: Semigroup,
        V: ValidateAll<E2>,
    {
        validations.validate_all()
    }
}

/// Trait for combining multiple validations in a tuple
///
/// Implemented for tuples of validations, allowing the `Validation::all`
/// method to work with heterogeneous validation types.
pub trait ValidateAll<E: Semigroup> {
    /// The output type when all validations succeed
    type Output;

    /// Combine all validations, accumulating errors
    fn validate_all(self) -> Validation<Self::Output, E>;
}

macro_rules! impl_validate_all {
    ($T1:ident, $T2:ident) => {
        impl<E: Semigroup, $T1, $T2> ValidateAll<E> for (Validation<$T1, E>, Validation<$T2, E>) {
            type Output = ($T1, $T2);

            #[allow(non_snake_case)]
            fn validate_all(self) -> Validation<Self::Output, E> {
                let ($T1, $T2) = self;
                $T1.and($T2)
            }
        }
    };

    ($T1:ident, $T2:ident, $T3:ident, $T4:ident) => {
        impl<E: Semigroup, $T1, $T2, $T3, $T4> ValidateAll<E>
            for (
                Validation<$T1, E>,
                Validation<$T2, E>,
                Validation<$T3, E>,
                Validation<$T4, E>,
            )
        {
            type Output = ($T1, $T2, $T3, $T4);

            #[allow(non_snake_case)]
            fn validate_all(self) -> Validation<Self::Output, E> {
                let ($T1, $T2, $T3, $T4) = self;
                $T1.and($T2)
                    .and($T3)
                    .map(|((a, b), c)| (a, b, c))
                    .and($T4)
                    .map(|((a, b, c), d)| (a, b, c, d))
            }
        }
    };
}

impl_validate_all!(T1, T2);
impl_validate_all!(T1, T2, T3, T4);
