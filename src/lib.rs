//! # Typed Windows Registry Access
//!
//! A safe, typed layer over the procedural Windows registry API.
//!
//! ## Features
//!
//! - **Owned handles**: [`RegKey`] owns one native key handle and closes it on drop
//! - **Typed values**: DWORD, QWORD, strings, expandable strings, multi-strings and binary data
//! - **Two error styles**: every operation returns [`Result`], and has a `try_`
//!   twin that reports a [`RegResult`] or a [`RegExpected`] instead
//! - **Host strings**: keys are generic over [`StringTraits`], UTF-8 by default
//! - **Portable core**: the native calls sit behind [`RegistryApi`]; [`MemoryRegistry`]
//!   implements it in process memory and `Win32Api` implements it on Windows
//!
//! ## Architecture
//!
//! The crate is built in layers:
//!
//! 1. **Status codes** ([`RegResult`]): Win32 status codes with system messages
//! 2. **Containers** ([`RegExpected`], [`RegistryError`]): value-or-status and the error type
//! 3. **Codecs**: wide strings ([`utils`]), multi-string buffers ([`multi_string`]),
//!    size narrowing ([`cast`])
//! 4. **Native interface** ([`RegistryApi`]): one method per registry call
//! 5. **Key manager** ([`RegKey`]): handle ownership and typed operations
//!
//! ## Multi-string Layout
//!
//! `REG_MULTI_SZ` data is a sequence of null-terminated wide strings closed
//! by one extra null:
//!
//! ```text
//! H i \0 H e l l o \0 C i a o \0 \0
//! ```
//!
//! The empty list is stored as two nulls.
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```
//! use winreg_kit::{Access, MemoryRegistry, RawKey, RegKey};
//!
//! # fn main() -> winreg_kit::Result<()> {
//! let registry = MemoryRegistry::new();
//! let key: RegKey<_> =
//!     RegKey::created(registry, RawKey::HKEY_CURRENT_USER, "Software\\Demo", Access::ALL)?;
//!
//! key.set_dword_value("Count", 42)?;
//! assert_eq!(key.get_dword_value("Count")?, 42);
//!
//! key.set_multi_string_value("Names", &["Hi", "Hello", "Ciao"])?;
//! assert_eq!(key.get_multi_string_value("Names")?, vec!["Hi", "Hello", "Ciao"]);
//!
//! for (name, value_type) in key.enum_values()? {
//!     println!("{}: {}", name, value_type);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Without Errors
//!
//! ```
//! use winreg_kit::{codes, Access, MemoryRegistry, RawKey, RegKey};
//!
//! let mut key: RegKey<MemoryRegistry> = RegKey::default();
//! let status = key.try_open(RawKey::HKEY_CURRENT_USER, "Software\\Missing", Access::READ);
//! assert_eq!(status.code(), codes::ERROR_FILE_NOT_FOUND);
//!
//! let value = key.try_get_dword_value("Count");
//! assert!(!value.is_valid());
//! println!("{}", value.error());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod cast;
pub mod error;
pub mod expected;
pub mod key;
pub mod memory;
pub mod multi_string;
pub mod scoped;
pub mod status;
pub mod strings;
pub mod utils;
pub mod value;

// Native backend (only compiled on Windows)
#[cfg(windows)]
pub mod win32;

// Re-export main types for convenience
pub use api::{Access, RawKey, RawKeyInfo, RegistryApi};
pub use error::{RegistryError, Result};
pub use expected::RegExpected;
pub use key::{CreateDisposition, ExpandStringOption, KeyInfo, RegKey, MAX_QUERY_ATTEMPTS};
pub use memory::MemoryRegistry;
pub use scoped::ScopedPtr;
pub use status::{codes, RegResult, LANG_NEUTRAL};
pub use strings::{StringTraits, Utf8Strings, WideStrings};
pub use value::{reg_type_to_string, ValueType};
#[cfg(windows)]
pub use win32::Win32Api;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
