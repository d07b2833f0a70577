//! Deterministic short code derivation.
//!
//! A code is derived from a seed string by hashing it with SHA-256, reading
//! the first 8 digest bytes as a big-endian `u64`, clearing the sign bit and
//! base-62 encoding the result. The encoding is truncated to the configured
//! maximum length, keeping the most significant characters.
//!
//! Derivation never looks at the store: collisions are resolved by
//! [`crate::application::services::ShorteningService`].

use crate::error::AppError;
use crate::utils::base62;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Default and upper bound for derived code length.
pub const MAX_CODE_LENGTH: usize = 10;

/// Clears the top bit so the value fits a non-negative 63-bit integer.
const SIGN_BIT_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;

/// Turns a seed into a short code.
///
/// Implementations must be pure: the same seed always yields the same code.
#[cfg_attr(test, mockall::automock)]
pub trait CodeDeriver: Send + Sync {
    /// Derives a code for `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `seed` is blank.
    fn derive(&self, seed: &str) -> Result<String, AppError>;
}

/// SHA-256 + base-62 code deriver.
#[derive(Debug, Clone, Copy)]
pub struct Sha256CodeDeriver {
    max_length: usize,
}

impl Sha256CodeDeriver {
    /// Creates a deriver producing codes of at most `max_length` characters.
    ///
    /// `max_length` is clamped to `1..=MAX_CODE_LENGTH`.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.clamp(1, MAX_CODE_LENGTH),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for Sha256CodeDeriver {
    fn default() -> Self {
        Self::new(MAX_CODE_LENGTH)
    }
}

impl CodeDeriver for Sha256CodeDeriver {
    fn derive(&self, seed: &str) -> Result<String, AppError> {
        derive_code(seed, self.max_length)
    }
}

/// Derives the short code for `seed`, at most `max_length` characters long.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if `seed` is empty or whitespace-only.
///
/// # Examples
///
/// ```ignore
/// let code = derive_code("https://example.com/a", 10)?;
/// assert_eq!(code, "3voipHMxsn");
/// ```
pub fn derive_code(seed: &str, max_length: usize) -> Result<String, AppError> {
    if seed.trim().is_empty() {
        return Err(AppError::bad_request(
            "Seed must not be blank",
            json!({ "seed": seed }),
        ));
    }

    let digest = Sha256::digest(seed.as_bytes());

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix) & SIGN_BIT_MASK;

    let mut code = base62::encode(value);
    // Base-62 output is ASCII, so byte truncation is char truncation.
    code.truncate(max_length);

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_code(code: &str) -> bool {
        (1..=MAX_CODE_LENGTH).contains(&code.len()) && base62::is_base62(code)
    }

    #[test]
    fn test_derive_is_deterministic() {
        let deriver = Sha256CodeDeriver::default();
        let code1 = deriver.derive("https://example.com/a").unwrap();
        let code2 = deriver.derive("https://example.com/a").unwrap();

        assert_eq!(code1, code2);
        assert!(is_valid_code(&code1));
    }

    #[test]
    fn test_derive_known_vectors() {
        assert_eq!(derive_code("https://example.com/a", 10).unwrap(), "3voipHMxsn");
        assert_eq!(derive_code("https://example.com/b", 10).unwrap(), "7YO15AHInf");
        assert_eq!(derive_code("https://example.com", 10).unwrap(), "1NIm5dudJe");
    }

    #[test]
    fn test_derive_retry_seed_differs() {
        assert_eq!(
            derive_code("https://example.com/first", 10).unwrap(),
            "AISheddZXn"
        );
        assert_eq!(
            derive_code("https://example.com/first#1", 10).unwrap(),
            "48zSNbHa04"
        );
    }

    #[test]
    fn test_derive_different_inputs_differ() {
        let deriver = Sha256CodeDeriver::default();
        let a = deriver.derive("https://example.com/a").unwrap();
        let b = deriver.derive("https://example.com/b").unwrap();

        assert!(is_valid_code(&a));
        assert!(is_valid_code(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_truncates_keeping_leading_chars() {
        let full = derive_code("https://example.com/a", 10).unwrap();
        let short = derive_code("https://example.com/a", 6).unwrap();

        assert_eq!(short.len(), 6);
        assert!(full.starts_with(&short));
    }

    #[test]
    fn test_derive_output_matches_alphabet_for_many_seeds() {
        let deriver = Sha256CodeDeriver::default();
        for i in 0..500 {
            let code = deriver.derive(&format!("https://example.com/{i}")).unwrap();
            assert!(is_valid_code(&code), "seed {i} produced {code}");
        }
    }

    #[test]
    fn test_derive_rejects_blank_seed() {
        let deriver = Sha256CodeDeriver::default();

        for seed in ["", " ", "\t\n"] {
            let result = deriver.derive(seed);
            assert!(matches!(result, Err(AppError::Validation { .. })));
        }
    }

    #[test]
    fn test_max_length_is_clamped() {
        assert_eq!(Sha256CodeDeriver::new(0).max_length(), 1);
        assert_eq!(Sha256CodeDeriver::new(64).max_length(), MAX_CODE_LENGTH);
        assert_eq!(Sha256CodeDeriver::new(8).max_length(), 8);
    }

    #[test]
    fn test_short_max_length_applies() {
        let deriver = Sha256CodeDeriver::new(8);
        let code = deriver.derive("https://example.com/a").unwrap();
        assert_eq!(code, "3voipHMx");
    }
}
