//! Registry status codes.
//!
//! Every native registry call reports a signed status code where
//! `ERROR_SUCCESS` (0) means success and every other value is a failure.

use std::fmt;

/// Win32 status codes used by the registry API.
pub mod codes {
    /// The operation completed successfully.
    pub const ERROR_SUCCESS: i32 = 0;
    /// The system cannot find the file specified.
    pub const ERROR_FILE_NOT_FOUND: i32 = 2;
    /// Access is denied.
    pub const ERROR_ACCESS_DENIED: i32 = 5;
    /// The handle is invalid.
    pub const ERROR_INVALID_HANDLE: i32 = 6;
    /// The data is invalid.
    pub const ERROR_INVALID_DATA: i32 = 13;
    /// The parameter is incorrect.
    pub const ERROR_INVALID_PARAMETER: i32 = 87;
    /// More data is available.
    pub const ERROR_MORE_DATA: i32 = 234;
    /// No more data is available.
    pub const ERROR_NO_MORE_ITEMS: i32 = 259;
    /// Arithmetic result exceeded 32 bits.
    pub const ERROR_ARITHMETIC_OVERFLOW: i32 = 534;
    /// The key has been marked for deletion.
    pub const ERROR_KEY_DELETED: i32 = 1018;
    /// No mapping for the Unicode character exists in the target code page.
    pub const ERROR_NO_UNICODE_TRANSLATION: i32 = 1113;
    /// The data type is not supported.
    pub const ERROR_UNSUPPORTED_TYPE: i32 = 1630;
}

/// Language identifier that lets the system pick the message language.
pub const LANG_NEUTRAL: u32 = 0;

/// Wrapper around a native registry status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegResult {
    code: i32,
}

impl RegResult {
    /// Wraps a raw status code.
    pub const fn new(code: i32) -> Self {
        Self { code }
    }

    /// The success status.
    pub const fn success() -> Self {
        Self::new(codes::ERROR_SUCCESS)
    }

    /// Returns true if the status means success.
    pub fn is_ok(&self) -> bool {
        self.code == codes::ERROR_SUCCESS
    }

    /// Returns true if the status means failure.
    pub fn failed(&self) -> bool {
        !self.is_ok()
    }

    /// Returns the raw status code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Formats the status as a message in the default language.
    pub fn message(&self) -> String {
        self.message_with_language(LANG_NEUTRAL)
    }

    /// Formats the status as a message in the given language.
    pub fn message_with_language(&self, language_id: u32) -> String {
        format_message(self.code, language_id)
    }
}

impl Default for RegResult {
    fn default() -> Self {
        Self::success()
    }
}

impl From<i32> for RegResult {
    fn from(code: i32) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for RegResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code)
    }
}

/// Produces a human-readable message for a status code.
#[cfg(windows)]
pub fn format_message(code: i32, language_id: u32) -> String {
    crate::win32::format_system_message(code as u32, language_id)
        .unwrap_or_else(|| fallback_message(code))
}

/// Produces a human-readable message for a status code.
///
/// Off Windows there is no system message table, so the messages of the
/// status codes the registry API reports are built in.
#[cfg(not(windows))]
pub fn format_message(code: i32, _language_id: u32) -> String {
    fallback_message(code)
}

fn fallback_message(code: i32) -> String {
    let message = match code {
        codes::ERROR_SUCCESS => "The operation completed successfully.",
        codes::ERROR_FILE_NOT_FOUND => "The system cannot find the file specified.",
        codes::ERROR_ACCESS_DENIED => "Access is denied.",
        codes::ERROR_INVALID_HANDLE => "The handle is invalid.",
        codes::ERROR_INVALID_DATA => "The data is invalid.",
        codes::ERROR_INVALID_PARAMETER => "The parameter is incorrect.",
        codes::ERROR_MORE_DATA => "More data is available.",
        codes::ERROR_NO_MORE_ITEMS => "No more data is available.",
        codes::ERROR_ARITHMETIC_OVERFLOW => "Arithmetic result exceeded 32 bits.",
        codes::ERROR_KEY_DELETED => {
            "Illegal operation attempted on a registry key that has been marked for deletion."
        }
        codes::ERROR_NO_UNICODE_TRANSLATION => {
            "No mapping for the Unicode character exists in the target multi-byte code page."
        }
        codes::ERROR_UNSUPPORTED_TYPE => "Data of this type is not supported.",
        _ => return format!("Unknown error {:#010x}", code as u32),
    };
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_classification() {
        assert!(RegResult::success().is_ok());
        assert!(!RegResult::success().failed());
        assert!(RegResult::new(codes::ERROR_FILE_NOT_FOUND).failed());
        assert_eq!(RegResult::default(), RegResult::success());
    }

    #[test]
    fn test_message_is_not_empty() {
        let result = RegResult::new(codes::ERROR_FILE_NOT_FOUND);
        assert!(!result.message().is_empty());
        assert!(result.to_string().ends_with("(2)"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unknown_code_message() {
        assert_eq!(RegResult::new(-1).message(), "Unknown error 0xffffffff");
    }
}
