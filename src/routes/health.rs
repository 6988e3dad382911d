use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::health::{HealthResponse, HomeResponse},
    services::ranking_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service banner", body = HomeResponse))
)]
/// Static banner confirming the API is up.
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse::online())
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Storage reachable", body = HealthResponse),
        (status = 500, description = "Storage unreachable", body = HealthResponse)
    )
)]
/// Report storage health along with the recorded test count.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let response = ranking_service::health(&state).await;
    let status = if response.status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(response))
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/", get(home))
        .route("/health", get(health))
}
