//! Checked narrowing of host sizes to the 32-bit sizes of the registry API.

use crate::error::{RegistryError, Result};

/// Returns true if `size` is representable as a registry size.
#[inline]
pub fn fits_u32(size: usize) -> bool {
    u32::try_from(size).is_ok()
}

/// Narrows a host size to the registry API's `u32` size type.
///
/// # Errors
///
/// Returns [`RegistryError::Overflow`] if `size` exceeds `u32::MAX`. This can
/// only happen where `usize` is wider than 32 bits.
#[inline]
pub fn safe_size_to_u32(size: usize) -> Result<u32> {
    if usize::BITS <= u32::BITS {
        debug_assert!(fits_u32(size));
    }

    u32::try_from(size).map_err(|_| RegistryError::Overflow {
        size,
        max: u32::MAX,
    })
}

/// Widens a registry size to a host size.
#[inline]
pub fn u32_to_size(size: u32) -> usize {
    // usize is at least 32 bits on every supported target
    size as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_sizes_fit() {
        assert!(fits_u32(0));
        assert_eq!(safe_size_to_u32(0).unwrap(), 0);
        assert_eq!(safe_size_to_u32(1024).unwrap(), 1024);
        assert_eq!(safe_size_to_u32(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_overflow() {
        let too_big = u32::MAX as usize + 1;
        assert!(!fits_u32(too_big));
        match safe_size_to_u32(too_big) {
            Err(RegistryError::Overflow { size, max }) => {
                assert_eq!(size, too_big);
                assert_eq!(max, u32::MAX);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_widening_is_exact() {
        assert_eq!(u32_to_size(u32::MAX), u32::MAX as usize);
    }
}
