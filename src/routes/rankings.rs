use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{dto::rankings::RankingsResponse, services::ranking_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/api/rankings/{mode}",
    tag = "rankings",
    params(("mode" = String, Path, description = "Mode label or `overall`")),
    responses(
        (status = 200, description = "Ranked players, empty for unknown modes", body = RankingsResponse)
    )
)]
/// Leaderboard for one mode, or `overall` across all modes.
pub async fn get_rankings(
    State(state): State<SharedState>,
    Path(mode): Path<String>,
) -> Json<RankingsResponse> {
    Json(ranking_service::rankings(&state, &mode).await)
}

/// Configure the rankings routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/rankings/{mode}", get(get_rankings))
}
