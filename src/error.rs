//! Error types for registry operations.
//!
//! This module provides the error signal of the fallible (`?`-style) API.
//! Every variant can be folded back into a [`RegResult`] so that the
//! non-throwing `try_*` surface reports the same failures as status codes.

use crate::status::{codes, RegResult};
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while talking to the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A native registry call returned a failure status.
    #[error("{context} failed: {result}")]
    Native {
        /// Status reported by the native call.
        result: RegResult,
        /// Name of the failing operation.
        context: &'static str,
    },

    /// Data read from the registry does not have the expected layout.
    #[error("Invalid registry data: {0}")]
    InvalidFormat(String),

    /// A host size does not fit the 32-bit size type of the registry API.
    #[error("Size {size} does not fit in the registry size type (max: {max})")]
    Overflow {
        /// The size that was rejected.
        size: usize,
        /// Largest size the registry API accepts.
        max: u32,
    },

    /// A string could not be converted to or from the native wide encoding.
    #[error("Invalid string: {0}")]
    InvalidString(String),
}

impl RegistryError {
    /// Creates a native-call error from a failed status.
    ///
    /// # Arguments
    ///
    /// * `result` - Status returned by the native call
    /// * `context` - Name of the registry operation that failed
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use winreg_kit::{RegResult, RegistryError};
    /// # use winreg_kit::status::codes;
    /// let status = RegResult::new(codes::ERROR_FILE_NOT_FOUND);
    /// let err = RegistryError::native(status, "RegGetValueW");
    /// assert_eq!(err.result_code().code(), codes::ERROR_FILE_NOT_FOUND);
    /// ```
    pub fn native(result: RegResult, context: &'static str) -> Self {
        Self::Native { result, context }
    }

    /// Creates a format error with detailed context.
    pub fn format_error(message: String) -> Self {
        Self::InvalidFormat(message)
    }

    /// Creates a string conversion error.
    pub fn invalid_string(message: impl Into<String>) -> Self {
        Self::InvalidString(message.into())
    }

    /// Returns the status code equivalent of this error.
    ///
    /// Native failures keep their original status; internal failures map onto
    /// the closest Win32 code so they can travel through a [`RegExpected`].
    ///
    /// [`RegExpected`]: crate::RegExpected
    pub fn result_code(&self) -> RegResult {
        match self {
            Self::Native { result, .. } => *result,
            Self::InvalidFormat(_) => RegResult::new(codes::ERROR_INVALID_DATA),
            Self::Overflow { .. } => RegResult::new(codes::ERROR_ARITHMETIC_OVERFLOW),
            Self::InvalidString(_) => RegResult::new(codes::ERROR_NO_UNICODE_TRANSLATION),
        }
    }

    /// Returns true if this error is the native "not found" status.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Native { result, .. } if result.code() == codes::ERROR_FILE_NOT_FOUND)
    }
}

impl From<RegistryError> for RegResult {
    fn from(err: RegistryError) -> Self {
        err.result_code()
    }
}
