//! Utility functions for string conversion and raw value data.
//!
//! The registry stores text as UTF-16LE code units. These helpers convert
//! between Rust's UTF-8 strings and that wide representation, and move
//! little-endian words in and out of raw value buffers.

use crate::error::{RegistryError, Result};
use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use encoding_rs::UTF_16LE;

/// Seconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
pub const FILETIME_UNIX_DIFF: i64 = 11_644_473_600;

/// FILETIME ticks (100 ns) per second.
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

/// Converts a UTF-8 string to wide code units (no terminator).
///
/// # Errors
///
/// Returns an error if the string contains an embedded null, which the
/// registry API would treat as the end of the string.
pub fn utf8_to_wide(s: &str) -> Result<Vec<u16>> {
    if s.contains('\0') {
        return Err(RegistryError::invalid_string(format!(
            "embedded null in {:?}",
            s
        )));
    }
    Ok(s.encode_utf16().collect())
}

/// Converts wide code units to a UTF-8 string.
///
/// # Errors
///
/// Returns an error if the data contains unpaired surrogates.
pub fn wide_to_utf8(wide: &[u16]) -> Result<String> {
    if wide.is_empty() {
        return Ok(String::new());
    }

    let bytes = wide_to_bytes(wide);
    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|decoded| decoded.into_owned())
        .ok_or_else(|| {
            RegistryError::invalid_string(format!(
                "invalid UTF-16 sequence ({} code units)",
                wide.len()
            ))
        })
}

/// Serializes wide code units to little-endian bytes.
pub fn wide_to_bytes(wide: &[u16]) -> Vec<u8> {
    let mut bytes = vec![0u8; wide.len() * 2];
    LittleEndian::write_u16_into(wide, &mut bytes);
    bytes
}

/// Deserializes little-endian bytes to wide code units.
///
/// # Errors
///
/// Returns an error if the byte count is odd.
pub fn bytes_to_wide(bytes: &[u8]) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return Err(RegistryError::format_error(format!(
            "wide string data has odd length {}",
            bytes.len()
        )));
    }

    let mut wide = vec![0u16; bytes.len() / 2];
    LittleEndian::read_u16_into(bytes, &mut wide);
    Ok(wide)
}

/// Removes a single trailing null terminator, if present.
pub fn trim_terminator(wide: &mut Vec<u16>) {
    if wide.last() == Some(&0) {
        wide.pop();
    }
}

/// Returns the code units before the first null.
pub fn until_null(wide: &[u16]) -> &[u16] {
    let end = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    &wide[..end]
}

/// Reads a u32 from the start of a value buffer.
pub fn read_u32_le(data: &[u8]) -> Result<u32> {
    if data.len() < 4 {
        return Err(RegistryError::format_error(format!(
            "expected 4 bytes of DWORD data, got {}",
            data.len()
        )));
    }
    Ok(LittleEndian::read_u32(data))
}

/// Reads a u64 from the start of a value buffer.
pub fn read_u64_le(data: &[u8]) -> Result<u64> {
    if data.len() < 8 {
        return Err(RegistryError::format_error(format!(
            "expected 8 bytes of QWORD data, got {}",
            data.len()
        )));
    }
    Ok(LittleEndian::read_u64(data))
}

/// Converts a timestamp to a Windows FILETIME.
pub fn datetime_to_filetime(time: DateTime<Utc>) -> u64 {
    let seconds = (time.timestamp() + FILETIME_UNIX_DIFF).max(0) as u64;
    seconds * FILETIME_TICKS_PER_SECOND + u64::from(time.timestamp_subsec_nanos() / 100)
}

/// Converts a Windows FILETIME to a timestamp.
///
/// Returns `None` for times chrono cannot represent.
pub fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    let seconds = (filetime / FILETIME_TICKS_PER_SECOND) as i64 - FILETIME_UNIX_DIFF;
    let nanos = ((filetime % FILETIME_TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(seconds, nanos)
}

/// Compares two wide names the way the registry does (ASCII case-insensitive).
pub fn wide_eq_ignore_case(a: &[u16], b: &[u16]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(&x, &y)| fold_case(x) == fold_case(y))
}

fn fold_case(c: u16) -> u16 {
    if (u16::from(b'a')..=u16::from(b'z')).contains(&c) {
        c - 0x20
    } else {
        c
    }
}
