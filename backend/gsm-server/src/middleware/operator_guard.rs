//! Operator credential guard for the protected routes
//!
//! Applied once to the protected sub-router instead of per handler.

use crate::{ApiError, AppState};

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Rate limit first, then the API key from the `X-API-Key` header or the
/// `api_key` query parameter.
pub async fn operator_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.rate_limiter.check()?;

    let presented = presented_key(&request);
    if let Err(e) = state.api_key.verify(presented.as_deref()) {
        log::warn!("Rejected {} {}", request.method(), request.uri().path());
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

fn presented_key(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get(API_KEY_HEADER) {
        return value.to_str().ok().map(str::to_string);
    }

    Query::<ApiKeyQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.api_key)
}
