//! Handler for code resolution, plus the cached lookup shared with redirects.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{debug, error};

use crate::api::dto::resolve::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the original URL behind a short code.
///
/// # Endpoint
///
/// `GET /api/resolve/{code}`
///
/// # Response
///
/// ```json
/// { "url": "https://example.com/a" }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn resolve_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let url = lookup_original_url(&state, &code).await?;

    Ok(Json(ResolveResponse { url }))
}

/// Resolves `code` through the cache, falling back to the store.
///
/// # Cache Strategy
///
/// - **Cache hit**: Returned immediately
/// - **Cache miss**: Resolve from the store, spawn async cache write
/// - **Cache error**: Log and resolve from the store
pub(crate) async fn lookup_original_url(state: &AppState, code: &str) -> Result<String, AppError> {
    match state.cache.get_url(code).await {
        Ok(Some(cached_url)) => {
            debug!("Cache HIT for {}", code);
            Ok(cached_url)
        }
        Ok(None) => {
            debug!("Cache MISS for {}", code);

            let url = state.shortening_service.resolve(code).await?;

            let cache = state.cache.clone();
            let code = code.to_string();
            let url_clone = url.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.set_url(&code, &url_clone, None).await {
                    error!("Failed to cache URL: {}", e);
                }
            });

            Ok(url)
        }
        Err(e) => {
            error!("Cache error: {}", e);
            state.shortening_service.resolve(code).await
        }
    }
}
