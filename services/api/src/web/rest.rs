//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    auth::{AuthResponse, LoginRequest, SignupRequest},
    state::{AppState, AuthedClient},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use interview_prep_core::{
    domain::{
        CompanySummary, Difficulty, DsaProblem, McqQuestion, ProgressSnapshot, RoleSummary,
    },
    ports::PortError,
    Selection, Session,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        list_roles_handler,
        get_role_handler,
        list_companies_handler,
        get_company_handler,
        get_progress_handler,
        list_mcqs_handler,
        list_dsa_handler,
        me_handler,
        get_selection_handler,
        update_selection_handler,
        dashboard_handler,
    ),
    components(
        schemas(SignupRequest, LoginRequest, AuthResponse, UpdateSelectionRequest)
    ),
    tags(
        (name = "Interview Prep API", description = "Catalog, session and selection endpoints for the interview prep UI.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompanyQuery {
    /// Case-insensitive substring of the company name.
    pub q: Option<String>,
    /// Only companies that hire for this role.
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DsaQuery {
    /// Easy, Medium or Hard.
    pub difficulty: Option<String>,
}

/// Partial update of the selection. An absent field is left alone; `null` clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSelectionRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,
}

/// Marks a field that appeared in the body, even as `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Everything the dashboard page renders.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user_name: String,
    pub selection: Selection,
    pub progress: ProgressSnapshot,
}

type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Maps a port failure onto an HTTP status, logging anything unexpected.
fn port_failure(e: PortError, action: &str) -> (StatusCode, String) {
    match e {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {}", what)),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            error!("Failed to {}: {}", action, msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}", action),
            )
        }
    }
}

//=========================================================================================
// Catalog Handlers
//=========================================================================================

/// List every role the user can prepare for.
#[utoipa::path(get, path = "/roles", responses((status = 200, description = "All roles")))]
pub async fn list_roles_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Vec<RoleSummary>> {
    app_state
        .catalog
        .fetch_roles()
        .await
        .map(Json)
        .map_err(|e| port_failure(e, "load roles"))
}

#[utoipa::path(
    get,
    path = "/roles/{id}",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 200, description = "The role"),
        (status = 404, description = "Unknown role")
    )
)]
pub async fn get_role_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<RoleSummary> {
    app_state
        .catalog
        .fetch_role(&id)
        .await
        .map(Json)
        .map_err(|e| port_failure(e, "load role"))
}

/// List companies, optionally narrowed by name search and by role.
#[utoipa::path(
    get,
    path = "/companies",
    params(CompanyQuery),
    responses((status = 200, description = "Matching companies"))
)]
pub async fn list_companies_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> HandlerResult<Vec<CompanySummary>> {
    let companies = app_state
        .catalog
        .fetch_companies()
        .await
        .map_err(|e| port_failure(e, "load companies"))?;

    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let role = query.role.as_deref().map(str::trim).filter(|r| !r.is_empty());

    Ok(Json(
        companies
            .into_iter()
            .filter(|c| search.map_or(true, |q| c.name_matches(q)))
            .filter(|c| role.map_or(true, |r| c.hires_for(r)))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/companies/{id}",
    params(("id" = String, Path, description = "Company id")),
    responses(
        (status = 200, description = "The company"),
        (status = 404, description = "Unknown company")
    )
)]
pub async fn get_company_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HandlerResult<CompanySummary> {
    app_state
        .catalog
        .fetch_company(&id)
        .await
        .map(Json)
        .map_err(|e| port_failure(e, "load company"))
}

#[utoipa::path(get, path = "/progress", responses((status = 200, description = "Preparation progress")))]
pub async fn get_progress_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<ProgressSnapshot> {
    app_state
        .catalog
        .fetch_progress()
        .await
        .map(Json)
        .map_err(|e| port_failure(e, "load progress"))
}

#[utoipa::path(get, path = "/questions/mcq", responses((status = 200, description = "MCQ bank")))]
pub async fn list_mcqs_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Vec<McqQuestion>> {
    app_state
        .catalog
        .fetch_mcqs()
        .await
        .map(Json)
        .map_err(|e| port_failure(e, "load questions"))
}

#[utoipa::path(
    get,
    path = "/questions/dsa",
    params(DsaQuery),
    responses(
        (status = 200, description = "DSA problems"),
        (status = 400, description = "Unknown difficulty")
    )
)]
pub async fn list_dsa_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DsaQuery>,
) -> HandlerResult<Vec<DsaProblem>> {
    let difficulty = query
        .difficulty
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(str::parse::<Difficulty>)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    app_state
        .catalog
        .fetch_dsa(difficulty)
        .await
        .map(Json)
        .map_err(|e| port_failure(e, "load problems"))
}

//=========================================================================================
// Session and Selection Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Current session"), (status = 401, description = "Not signed in"))
)]
pub async fn me_handler(Extension(client): Extension<AuthedClient>) -> Json<Session> {
    Json(client.context.lock().await.session.snapshot())
}

#[utoipa::path(
    get,
    path = "/selection",
    responses((status = 200, description = "Selected role and company"))
)]
pub async fn get_selection_handler(Extension(client): Extension<AuthedClient>) -> Json<Selection> {
    Json(client.context.lock().await.selection.snapshot())
}

#[utoipa::path(
    put,
    path = "/selection",
    request_body = UpdateSelectionRequest,
    responses((status = 200, description = "Updated selection"))
)]
pub async fn update_selection_handler(
    Extension(client): Extension<AuthedClient>,
    Json(req): Json<UpdateSelectionRequest>,
) -> Json<Selection> {
    let mut context = client.context.lock().await;
    if let Some(role) = req.role {
        context.selection.set_role(role);
    }
    if let Some(company) = req.company {
        context.selection.set_company(company);
    }
    Json(context.selection.snapshot())
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard summary"))
)]
pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(client): Extension<AuthedClient>,
) -> HandlerResult<DashboardResponse> {
    let progress = app_state
        .catalog
        .fetch_progress()
        .await
        .map_err(|e| port_failure(e, "load progress"))?;

    let context = client.context.lock().await;
    let user_name = context
        .session
        .identity()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "Student".to_string());

    Ok(Json(DashboardResponse {
        user_name,
        selection: context.selection.snapshot(),
        progress,
    }))
}
