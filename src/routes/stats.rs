use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::stats::StatsResponse, error::AppError, services::ranking_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Aggregate counters", body = StatsResponse),
        (status = 503, description = "Storage unreachable")
    )
)]
/// Total recorded tests and ranked players.
pub async fn get_stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = ranking_service::stats(&state).await?;
    Ok(Json(stats))
}

/// Configure the stats routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/stats", get(get_stats))
}
