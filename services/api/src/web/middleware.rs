//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::{AppState, AuthedClient};

/// The fixed name under which the session token travels (cookie name, and the
/// key the browser keeps it under).
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Reads the session token from `Authorization: Bearer` or the `auth_token` cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix(AUTH_TOKEN_KEY)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Middleware that resolves the session token to a client context.
///
/// If valid, inserts an `AuthedClient` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized, which tells the browser to drop
/// its stored token and go back to the login page.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = token_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let context = state.clients.resolve(&token).await.ok_or_else(|| {
        warn!("Rejected request with unknown session token.");
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(AuthedClient { token, context });

    Ok(next.run(req).await)
}
