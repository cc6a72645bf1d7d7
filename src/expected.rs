//! Result-or-value container returned by the non-throwing API.

use crate::error::RegistryError;
use crate::status::RegResult;

/// Either the value produced by a `try_*` query or the status that made it fail.
///
/// Prefer matching on the variants or calling [`RegExpected::into_result`].
/// [`RegExpected::value`] and [`RegExpected::error`] assert that the matching
/// branch is present and panic otherwise: querying the wrong branch is a
/// programming error, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RegExpected<T> {
    /// The query succeeded.
    Value(T),
    /// The query failed with this status.
    Error(RegResult),
}

impl<T> RegExpected<T> {
    /// Returns true if a value is present.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns the value.
    ///
    /// # Panics
    ///
    /// Panics if the container holds an error.
    pub fn value(&self) -> &T {
        match self {
            Self::Value(value) => value,
            Self::Error(result) => panic!("RegExpected::value called on an error: {result}"),
        }
    }

    /// Consumes the container and returns the value.
    ///
    /// # Panics
    ///
    /// Panics if the container holds an error.
    pub fn into_value(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Error(result) => panic!("RegExpected::into_value called on an error: {result}"),
        }
    }

    /// Returns the failure status.
    ///
    /// # Panics
    ///
    /// Panics if the container holds a value.
    pub fn error(&self) -> RegResult {
        match self {
            Self::Error(result) => *result,
            Self::Value(_) => panic!("RegExpected::error called on a value"),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<T, RegResult> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Error(result) => Err(result),
        }
    }

    /// Returns the value if present.
    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }

    /// Returns the failure status if present.
    pub fn err(self) -> Option<RegResult> {
        self.into_result().err()
    }

    /// Maps the value, leaving an error untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> RegExpected<U> {
        match self {
            Self::Value(value) => RegExpected::Value(f(value)),
            Self::Error(result) => RegExpected::Error(result),
        }
    }
}

impl<T> From<Result<T, RegistryError>> for RegExpected<T> {
    fn from(result: Result<T, RegistryError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(err) => Self::Error(err.result_code()),
        }
    }
}

impl<T> From<RegExpected<T>> for Result<T, RegResult> {
    fn from(expected: RegExpected<T>) -> Self {
        expected.into_result()
    }
}
