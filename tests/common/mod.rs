#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use shortcode::api;
use shortcode::api::handlers::{health_handler, redirect_handler};
use shortcode::application::services::{DynShorteningService, ShorteningService};
use shortcode::domain::code_deriver::{CodeDeriver, Sha256CodeDeriver, derive_code};
use shortcode::domain::entities::{Mapping, NewMapping};
use shortcode::domain::repositories::MappingRepository;
use shortcode::error::AppError;
use shortcode::infrastructure::cache::{CacheError, CacheResult, CacheService, NullCache};
use shortcode::infrastructure::persistence::InMemoryMappingRepository;
use shortcode::state::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://sho.rt";

/// Router with every public route, without path normalization.
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/u/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api::routes::api_routes())
        .with_state(state)
}

pub fn create_test_state() -> AppState {
    create_test_state_with(
        Arc::new(InMemoryMappingRepository::new()),
        Arc::new(Sha256CodeDeriver::default()),
        Arc::new(NullCache::new()),
    )
}

pub fn create_test_state_with(
    repository: Arc<dyn MappingRepository>,
    deriver: Arc<dyn CodeDeriver>,
    cache: Arc<dyn CacheService>,
) -> AppState {
    let service: DynShorteningService = ShorteningService::new(repository, deriver);
    AppState::new(Arc::new(service), cache, BASE_URL)
}

/// Inserts a mapping directly, bypassing derivation.
pub async fn seed_mapping(repository: &InMemoryMappingRepository, url: &str, code: &str) -> Mapping {
    repository.save(NewMapping::new(url, code)).await.unwrap()
}

/// Deriver returning preset codes for known seeds and the real code otherwise.
/// Every seed it is asked for is recorded.
#[derive(Default)]
pub struct ScriptedDeriver {
    codes: HashMap<String, String>,
    fallback: Option<String>,
    seeds: Mutex<Vec<String>>,
}

impl ScriptedDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, seed: &str, code: &str) -> Self {
        self.codes.insert(seed.to_string(), code.to_string());
        self
    }

    /// Returns `code` for every seed without a preset.
    pub fn always(code: &str) -> Self {
        Self {
            fallback: Some(code.to_string()),
            ..Self::default()
        }
    }

    pub fn seeds(&self) -> Vec<String> {
        self.seeds.lock().unwrap().clone()
    }
}

impl CodeDeriver for ScriptedDeriver {
    fn derive(&self, seed: &str) -> Result<String, AppError> {
        self.seeds.lock().unwrap().push(seed.to_string());

        if let Some(code) = self.codes.get(seed).or(self.fallback.as_ref()) {
            return Ok(code.clone());
        }
        derive_code(seed, 10)
    }
}

/// Cache backed by a hash map, for observing read-through behavior.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, code: &str, url: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(code.to_string(), url.to_string());
    }

    pub fn get(&self, code: &str) -> Option<String> {
        self.entries.lock().unwrap().get(code).cloned()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        Ok(self.get(short_code))
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.insert(short_code, original_url);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Cache whose backend is always unreachable.
pub struct BrokenCache;

#[async_trait]
impl CacheService for BrokenCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Err(CacheError::ConnectionError("connection refused".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
