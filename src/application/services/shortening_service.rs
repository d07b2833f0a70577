//! URL shortening and resolution service.

use std::borrow::Cow;
use std::sync::Arc;

use metrics::counter;
use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

use crate::domain::code_deriver::CodeDeriver;
use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::{MAX_URL_LENGTH, normalize_url};

/// Default number of deterministic derivation attempts per URL.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Pause before re-running a lookup-then-write sequence that hit a
/// uniqueness violation.
const CONFLICT_RETRY_DELAY_MS: u64 = 10;

/// How many times a uniqueness violation on save re-runs the sequence.
const CONFLICT_RETRIES: usize = 1;

/// Service type used by the HTTP layer, with backends chosen at startup.
pub type DynShorteningService = ShorteningService<dyn MappingRepository, dyn CodeDeriver>;

/// Service for creating and resolving short codes.
///
/// Shortening is idempotent: a canonical URL is mapped exactly once and
/// every later request returns the stored mapping. New codes are derived
/// deterministically from the URL, so the same store state always walks the
/// same sequence of candidates.
pub struct ShorteningService<R, C>
where
    R: MappingRepository + ?Sized,
    C: CodeDeriver + ?Sized,
{
    repository: Arc<R>,
    deriver: Arc<C>,
    max_attempts: usize,
}

impl<R, C> ShorteningService<R, C>
where
    R: MappingRepository + ?Sized,
    C: CodeDeriver + ?Sized,
{
    /// Creates a new shortening service with [`DEFAULT_MAX_ATTEMPTS`].
    pub fn new(repository: Arc<R>, deriver: Arc<C>) -> Self {
        Self {
            repository,
            deriver,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the number of derivation attempts (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns the mapping for `raw_url`, creating it on first request.
    ///
    /// # Flow
    ///
    /// 1. Reject blank input, then normalize
    /// 2. Return the existing mapping for the canonical URL, if any
    /// 3. Otherwise derive candidates from seeds `url`, `url#1`, `url#2`, ...
    ///    and persist the first candidate no other URL owns
    ///
    /// A candidate already owned by the same URL means a concurrent request
    /// created the mapping first; that mapping is returned as-is.
    ///
    /// If the store rejects the write with a uniqueness violation, the whole
    /// sequence is re-run once before giving up.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is blank, fails normalization,
    /// or its canonical form is longer than [`MAX_URL_LENGTH`].
    ///
    /// Returns [`AppError::ExhaustedRetries`] if every attempt collided with
    /// another URL.
    ///
    /// Returns [`AppError::Internal`] if the store keeps rejecting the write
    /// or fails.
    pub async fn shorten(&self, raw_url: &str) -> Result<Mapping, AppError> {
        if raw_url.trim().is_empty() {
            return Err(AppError::bad_request(
                "URL must not be blank",
                json!({ "url": raw_url }),
            ));
        }

        let normalized = normalize_url(raw_url).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
        })?;

        // Percent-encoding can push the canonical form past what the store accepts.
        if normalized.len() > MAX_URL_LENGTH {
            return Err(AppError::bad_request(
                "URL is too long once normalized",
                json!({ "length": normalized.len(), "max_length": MAX_URL_LENGTH }),
            ));
        }

        let this = self;
        let url = normalized.as_str();
        let strategy = FixedInterval::from_millis(CONFLICT_RETRY_DELAY_MS).take(CONFLICT_RETRIES);

        let outcome = RetryIf::spawn(
            strategy,
            move || this.shorten_normalized(url),
            |e: &AppError| {
                if e.is_conflict() {
                    warn!(url, error = %e, "Constraint violation while saving mapping, retrying");
                    true
                } else {
                    false
                }
            },
        )
        .await;

        match outcome {
            Err(e) if e.is_conflict() => {
                counter!("shortener_shorten_total", "outcome" => "conflict").increment(1);
                Err(AppError::internal(
                    "Mapping could not be saved due to a persistent constraint violation",
                    json!({ "url": normalized, "cause": e.to_error_info().details }),
                ))
            }
            other => other,
        }
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is blank or unknown.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if code.trim().is_empty() {
            counter!("shortener_resolve_total", "outcome" => "miss").increment(1);
            return Err(AppError::not_found(
                "Short code must not be blank",
                json!({ "code": code }),
            ));
        }

        match self.repository.find_by_short_code(code).await? {
            Some(mapping) => {
                counter!("shortener_resolve_total", "outcome" => "hit").increment(1);
                Ok(mapping.original_url)
            }
            None => {
                counter!("shortener_resolve_total", "outcome" => "miss").increment(1);
                Err(AppError::not_found(
                    "Unknown short code",
                    json!({ "code": code }),
                ))
            }
        }
    }

    /// Number of persisted mappings.
    pub async fn mapping_count(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Most recently created mappings, newest first.
    pub async fn recent_mappings(&self, limit: i64) -> Result<Vec<Mapping>, AppError> {
        self.repository.list_recent(limit).await
    }

    /// One lookup-then-write pass for an already normalized URL.
    async fn shorten_normalized(&self, normalized: &str) -> Result<Mapping, AppError> {
        if let Some(existing) = self.repository.find_by_original_url(normalized).await? {
            debug!(url = normalized, code = %existing.short_code, "Mapping already exists");
            counter!("shortener_shorten_total", "outcome" => "existing").increment(1);
            return Ok(existing);
        }

        for attempt in 0..self.max_attempts {
            let seed = seed_for_attempt(normalized, attempt);
            let candidate = self.deriver.derive(&seed)?;

            match self.repository.find_by_short_code(&candidate).await? {
                None => {
                    let mapping = self
                        .repository
                        .save(NewMapping::new(normalized, candidate))
                        .await?;

                    info!(
                        url = %mapping.original_url,
                        code = %mapping.short_code,
                        attempt,
                        "Created mapping"
                    );
                    counter!("shortener_shorten_total", "outcome" => "created").increment(1);
                    return Ok(mapping);
                }
                Some(existing) if existing.original_url == normalized => {
                    debug!(url = normalized, code = %existing.short_code, "Converged on concurrent mapping");
                    counter!("shortener_shorten_total", "outcome" => "existing").increment(1);
                    return Ok(existing);
                }
                Some(existing) => {
                    debug!(
                        url = normalized,
                        code = %candidate,
                        owner = %existing.original_url,
                        attempt,
                        "Short code collision"
                    );
                    counter!("shortener_code_collisions_total").increment(1);
                }
            }
        }

        warn!(url = normalized, attempts = self.max_attempts, "Exhausted short code attempts");
        counter!("shortener_shorten_total", "outcome" => "exhausted").increment(1);

        Err(AppError::exhausted_retries(
            "Unable to derive a unique short code",
            json!({ "url": normalized, "attempts": self.max_attempts }),
        ))
    }
}

/// Seed for a derivation attempt: the URL itself first, then `url#<attempt>`.
pub fn seed_for_attempt(normalized: &str, attempt: usize) -> Cow<'_, str> {
    if attempt == 0 {
        Cow::Borrowed(normalized)
    } else {
        Cow::Owned(format!("{normalized}#{attempt}"))
    }
}

/// Builds the public short link for `code`.
///
/// ```ignore
/// assert_eq!(short_url("https://s.example.com/", "abc"), "https://s.example.com/u/abc");
/// ```
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/u/{}", base_url.trim_end_matches('/'), code)
}
