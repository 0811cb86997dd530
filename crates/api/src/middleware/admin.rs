//! Admin token middleware for maintenance routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use homeaccount_shared::AppError;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Requires `Authorization: Bearer <admin token>` when a token is configured.
///
/// Without a configured token every request passes.
pub async fn admin_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token);

    match presented {
        Some(token) if token == expected => next.run(request).await,
        Some(_) => {
            warn!(path = %request.uri().path(), "Rejected maintenance request with wrong token");
            ApiError(AppError::Unauthorized("invalid admin token".into())).into_response()
        }
        None => ApiError(AppError::Unauthorized(
            "Authorization header with Bearer token is required".into(),
        ))
        .into_response(),
    }
}
