use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::player::PlayerProfile, error::AppError, services::ranking_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/api/player/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Platform user id")),
    responses(
        (status = 200, description = "Player profile with leaderboard position", body = PlayerProfile),
        (status = 404, description = "Player not found"),
        (status = 503, description = "Storage unreachable")
    )
)]
/// Profile and leaderboard position for one player.
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerProfile>, AppError> {
    let profile = ranking_service::player_profile(&state, &id).await?;
    Ok(Json(profile))
}

/// Configure the player routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/player/{id}", get(get_player))
}
