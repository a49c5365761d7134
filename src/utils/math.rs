//! Mathematical utility functions.

use crate::Result;

/// Converts a `usize` to `u32`, returning an error if the value exceeds
/// `u32::MAX`. Constant pools and their offsets are bounded well below this
/// limit.
///
/// # Errors
///
/// Returns an error if `value` exceeds `u32::MAX`.
pub fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| malformed_error!("Value {} exceeds u32::MAX", value))
}

/// Multiplicative inverse of an odd `value` modulo 2^32.
///
/// Returns `None` for even values, which have no inverse.
///
/// # Examples
///
/// ```rust,ignore
/// use dotshield::utils::mod_inverse_u32;
///
/// let inverse = mod_inverse_u32(3).unwrap();
/// assert_eq!(3u32.wrapping_mul(inverse), 1);
/// assert_eq!(mod_inverse_u32(4), None);
/// ```
#[must_use]
pub fn mod_inverse_u32(value: u32) -> Option<u32> {
    if value & 1 == 0 {
        return None;
    }

    // Newton iteration, every round doubles the number of correct low bits
    let mut inverse = value;
    for _ in 0..5 {
        inverse = inverse.wrapping_mul(2u32.wrapping_sub(value.wrapping_mul(inverse)));
    }
    Some(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u32_valid() {
        assert_eq!(to_u32(0).unwrap(), 0);
        assert_eq!(to_u32(1).unwrap(), 1);
        assert_eq!(to_u32(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_to_u32_overflow() {
        assert!(to_u32(u32::MAX as usize + 1).is_err());
        assert!(to_u32(usize::MAX).is_err());
    }

    #[test]
    fn test_mod_inverse() {
        for value in [1u32, 3, 5, 0x2141_2321, 0xDEAD_BEEF, u32::MAX] {
            let inverse = mod_inverse_u32(value).unwrap();
            assert_eq!(value.wrapping_mul(inverse), 1, "value 0x{value:08x}");
        }
    }

    #[test]
    fn test_mod_inverse_even() {
        assert_eq!(mod_inverse_u32(0), None);
        assert_eq!(mod_inverse_u32(2), None);
        assert_eq!(mod_inverse_u32(0x8000_0000), None);
    }
}
