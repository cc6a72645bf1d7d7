//! Host string encodings accepted by [`RegKey`](crate::RegKey).
//!
//! A key is parameterized over a [`StringTraits`] implementation that fixes
//! the string type callers see. Internally every buffer is wide; strings are
//! converted exactly once at the API boundary.

use crate::error::Result;
use crate::utils::{utf8_to_wide, wide_to_utf8};
use std::borrow::Borrow;
use std::fmt::Debug;

/// Conversion between a host string type and the registry's wide encoding.
pub trait StringTraits {
    /// Owned host string returned by queries.
    type Owned: Borrow<Self::Borrowed> + Clone + Debug + PartialEq;

    /// Borrowed host string accepted by every operation.
    type Borrowed: ?Sized;

    /// Builds a host string from native wide code units (no terminator).
    fn construct_from_native(wide: &[u16]) -> Result<Self::Owned>;

    /// Converts a host string to native wide code units (no terminator).
    fn to_native(s: &Self::Borrowed) -> Result<Vec<u16>>;
}

/// Host strings are already wide (`[u16]`); conversion is the identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WideStrings;

impl StringTraits for WideStrings {
    type Owned = Vec<u16>;
    type Borrowed = [u16];

    fn construct_from_native(wide: &[u16]) -> Result<Vec<u16>> {
        Ok(wide.to_vec())
    }

    fn to_native(s: &[u16]) -> Result<Vec<u16>> {
        Ok(s.to_vec())
    }
}

/// Host strings are UTF-8 (`str`), converted through UTF-16.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Strings;

impl StringTraits for Utf8Strings {
    type Owned = String;
    type Borrowed = str;

    fn construct_from_native(wide: &[u16]) -> Result<String> {
        wide_to_utf8(wide)
    }

    fn to_native(s: &str) -> Result<Vec<u16>> {
        utf8_to_wide(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_identity() {
        let wide = [0x48u16, 0x69];
        assert_eq!(WideStrings::to_native(&wide).unwrap(), wide);
        assert_eq!(WideStrings::construct_from_native(&wide).unwrap(), wide);
    }

    #[test]
    fn test_utf8_conversion() {
        let native = Utf8Strings::to_native("Hello").unwrap();
        assert_eq!(native, "Hello".encode_utf16().collect::<Vec<_>>());
        assert_eq!(Utf8Strings::construct_from_native(&native).unwrap(), "Hello");
    }
}
