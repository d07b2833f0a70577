//! Handler for the shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::short_url;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short link for a URL, creating the mapping on first request.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_url": "http://localhost:3000/u/3voipHMxsn",
///   "short_code": "3voipHMxsn",
///   "original_url": "https://example.com/a",
///   "created_at": "2025-01-01T00:00:00Z"
/// }
/// ```
///
/// Repeating the request returns the same body.
///
/// # Errors
///
/// Returns 400 Bad Request if the URL is blank, too long or not HTTP(S).
/// Returns 500 if no unique code could be derived or the store fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let mapping = state.shortening_service.shorten(&payload.url).await?;
    let short_url = short_url(&state.base_url, &mapping.short_code);

    Ok(Json(ShortenResponse::from_mapping(mapping, short_url)))
}
