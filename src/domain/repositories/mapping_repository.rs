//! Repository trait for mapping persistence.

use crate::domain::entities::{Mapping, NewMapping};
use crate::error::AppError;
use async_trait::async_trait;

/// Key-value persistence for mappings, keyed independently by original URL
/// and by short code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryMappingRepository`] - Process-local maps
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Finds the mapping for a canonical URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<Mapping>, AppError>;

    /// Finds the mapping owning a short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<Mapping>, AppError>;

    /// Persists a new mapping, assigning its identity and creation time.
    ///
    /// Both uniqueness constraints are checked atomically with the write,
    /// regardless of any lookups the caller performed beforehand.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if either the original URL or the short
    /// code is already taken.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save(&self, new_mapping: NewMapping) -> Result<Mapping, AppError>;

    /// Counts persisted mappings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Lists the most recently created mappings, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Mapping>, AppError>;
}
