//! Pure helper functions shared across layers.
//!
//! - [`base62`] - Base-62 encoding over `0-9A-Za-z`
//! - [`url_normalizer`] - URL validation and canonicalization

pub mod base62;
pub mod url_normalizer;
