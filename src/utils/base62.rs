//! Base-62 encoding over the `0-9A-Za-z` alphabet.

/// Digit alphabet: `0` is digit 0, `z` is digit 61.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Longest possible encoding of a `u64` (62^11 > 2^64).
const MAX_ENCODED_LEN: usize = 11;

/// Encodes `value` in base 62, most-significant digit first.
///
/// Zero encodes to `"0"`; no other value gets leading zeros.
///
/// ```ignore
/// assert_eq!(encode(0), "0");
/// assert_eq!(encode(61), "z");
/// assert_eq!(encode(62), "10");
/// ```
pub fn encode(value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut buffer = [0u8; MAX_ENCODED_LEN];
    let mut index = MAX_ENCODED_LEN;
    let mut current = value;

    while current > 0 {
        index -= 1;
        buffer[index] = ALPHABET[(current % 62) as usize];
        current /= 62;
    }

    buffer[index..].iter().map(|&b| b as char).collect()
}

/// Returns true if every character of `code` belongs to [`ALPHABET`].
pub fn is_base62(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_zero() {
        assert_eq!(encode(0), "0");
    }

    #[test]
    fn test_encode_single_digits() {
        assert_eq!(encode(1), "1");
        assert_eq!(encode(10), "A");
        assert_eq!(encode(36), "a");
        assert_eq!(encode(61), "z");
    }

    #[test]
    fn test_encode_carries_into_second_digit() {
        assert_eq!(encode(62), "10");
        assert_eq!(encode(62 * 62 - 1), "zz");
        assert_eq!(encode(62 * 62), "100");
    }

    #[test]
    fn test_encode_larger_value() {
        assert_eq!(encode(123_456_789), "8M0kX");
    }

    #[test]
    fn test_encode_max_values_fit_buffer() {
        assert_eq!(encode(u64::MAX).len(), 11);
        assert_eq!(encode(i64::MAX as u64).len(), 11);
    }

    #[test]
    fn test_encode_output_is_base62() {
        for value in [0, 7, 62, 3844, 1 << 40, u64::MAX] {
            assert!(is_base62(&encode(value)), "value {value}");
        }
    }

    #[test]
    fn test_alphabet_is_unique() {
        let unique: std::collections::HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn test_is_base62_rejects_other_chars() {
        assert!(!is_base62(""));
        assert!(!is_base62("abc-123"));
        assert!(!is_base62("abc_123"));
        assert!(is_base62("Abc123"));
    }
}
