//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    Json,
};
use interview_prep_core::domain::AuthGrant;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::web::{
    middleware::{token_from_headers, AUTH_TOKEN_KEY},
    state::{AppState, SESSION_MAX_AGE_SECS},
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl From<AuthGrant> for AuthResponse {
    fn from(grant: AuthGrant) -> Self {
        Self {
            token: grant.token,
            user_id: grant.user.id,
            name: grant.user.name,
            email: grant.user.email,
        }
    }
}

/// A response that also sets or clears the session cookie.
pub type WithCookie<T> = (StatusCode, [(HeaderName, String); 1], T);

fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        AUTH_TOKEN_KEY, token, SESSION_MAX_AGE_SECS
    )
}

fn cleared_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", AUTH_TOKEN_KEY)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account and sign it in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<WithCookie<Json<AuthResponse>>, (StatusCode, String)> {
    let user = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await
        .map_err(|e| {
            error!("Signup rejected: {:?}", e);
            (StatusCode::BAD_REQUEST, format!("Signup failed: {}", e))
        })?;

    let grant = state.clients.open(user).await;
    info!("New client session opened via signup.");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&grant.token))],
        Json(grant.into()),
    ))
}

/// POST /auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<WithCookie<Json<AuthResponse>>, (StatusCode, String)> {
    let user = state
        .auth
        .authenticate(&req.email, &req.password)
        .await
        .map_err(|e| {
            error!("Login rejected: {:?}", e);
            (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
        })?;

    let grant = state.clients.open(user).await;
    info!("New client session opened via login.");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&grant.token))],
        Json(grant.into()),
    ))
}

/// POST /auth/logout - Logout and invalidate the session token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<WithCookie<()>, (StatusCode, String)> {
    let token = token_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    if !state.clients.close(&token).await {
        return Err((StatusCode::UNAUTHORIZED, "No session found".to_string()));
    }
    info!("Client session closed.");

    Ok((StatusCode::OK, [(header::SET_COOKIE, cleared_cookie())], ()))
}
