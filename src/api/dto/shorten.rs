//! DTOs for the shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Mapping;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// URL to shorten. Scheme, host and canonical length checks happen during
    /// normalization; the bound here mirrors `MAX_URL_LENGTH`.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 characters long"))]
    pub url: String,
}

/// Stored mapping as returned to API clients.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
    /// Canonical form of the submitted URL.
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl ShortenResponse {
    pub fn from_mapping(mapping: Mapping, short_url: String) -> Self {
        Self {
            short_url,
            short_code: mapping.short_code,
            original_url: mapping.original_url,
            created_at: mapping.created_at,
        }
    }
}
