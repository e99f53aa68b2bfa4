//! services/api/src/web/router.rs
//!
//! Assembles the public and protected routes into one axum `Router`.

use crate::{
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        middleware::require_auth,
        rest::{
            dashboard_handler, get_company_handler, get_progress_handler, get_role_handler,
            get_selection_handler, list_companies_handler, list_dsa_handler, list_mcqs_handler,
            list_roles_handler, me_handler, update_selection_handler, ApiDoc,
        },
        state::AppState,
        ws_handler::criteria_ws_handler,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/roles", get(list_roles_handler))
        .route("/roles/{id}", get(get_role_handler))
        .route("/companies", get(list_companies_handler))
        .route("/companies/{id}", get(get_company_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/me", get(me_handler))
        .route(
            "/selection",
            get(get_selection_handler).put(update_selection_handler),
        )
        .route("/progress", get(get_progress_handler))
        .route("/questions/mcq", get(list_mcqs_handler))
        .route("/questions/dsa", get(list_dsa_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/ws/criteria", get(criteria_ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
