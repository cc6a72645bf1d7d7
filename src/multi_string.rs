//! REG_MULTI_SZ encoding.
//!
//! A multi-string is stored as a sequence of wide strings, each followed by
//! a null, with one extra null closing the sequence:
//!
//! ```text
//! H i \0 H e l l o \0 C i a o \0 \0
//! ```
//!
//! The empty list is exactly two nulls. Zero-length strings inside the list
//! are kept, even though the registry documentation says an empty string
//! ends the sequence: such values do exist in real registries.

use crate::error::{RegistryError, Result};

/// Encodes a list of wide strings as a double-null-terminated buffer.
///
/// The strings must not contain nulls themselves.
pub fn encode<S: AsRef<[u16]>>(strings: &[S]) -> Vec<u16> {
    if strings.is_empty() {
        return vec![0, 0];
    }

    let total_len = strings
        .iter()
        .map(|s| s.as_ref().len() + 1)
        .sum::<usize>()
        + 1;

    let mut buffer = Vec::with_capacity(total_len);
    for s in strings {
        buffer.extend_from_slice(s.as_ref());
        buffer.push(0);
    }
    buffer.push(0);

    debug_assert_eq!(buffer.len(), total_len);
    buffer
}

/// Decodes a double-null-terminated buffer into its strings.
///
/// The two-null buffer decodes to the empty list.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidFormat`] if the buffer is shorter than two
/// code units or does not end with two nulls.
pub fn decode(buffer: &[u16]) -> Result<Vec<Vec<u16>>> {
    let len = buffer.len();
    if len < 2 || buffer[len - 1] != 0 || buffer[len - 2] != 0 {
        let tail = &buffer[len.saturating_sub(2)..];
        return Err(RegistryError::format_error(format!(
            "multi-string data is not double-null terminated (length {}, tail {})",
            len,
            hex::encode(crate::utils::wide_to_bytes(tail))
        )));
    }

    if len == 2 {
        return Ok(Vec::new());
    }

    // `end` is the position of the closing null
    let end = len - 1;
    let mut strings = Vec::new();
    let mut cursor = 0;
    while cursor < end {
        let run = crate::utils::until_null(&buffer[cursor..end]);
        strings.push(run.to_vec());
        cursor += run.len() + 1;
    }

    Ok(strings)
}
