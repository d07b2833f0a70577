//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::DynShorteningService;
use crate::infrastructure::cache::CacheService;

/// State shared by every request handler.
///
/// Cheap to clone: services are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub shortening_service: Arc<DynShorteningService>,
    pub cache: Arc<dyn CacheService>,
    /// Public prefix used to build short links, e.g. `https://s.example.com`.
    pub base_url: String,
}

impl AppState {
    pub fn new(
        shortening_service: Arc<DynShorteningService>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortening_service,
            cache,
            base_url: base_url.into(),
        }
    }
}
