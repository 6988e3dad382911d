use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the tierlist read API.
#[openapi(
    paths(
        crate::routes::health::home,
        crate::routes::health::health,
        crate::routes::rankings::get_rankings,
        crate::routes::player::get_player,
        crate::routes::stats::get_stats,
    ),
    components(
        schemas(
            crate::dto::health::HomeResponse,
            crate::dto::health::HealthResponse,
            crate::dto::rankings::RankingsResponse,
            crate::dto::rankings::RankedPlayer,
            crate::dto::rankings::ModeStanding,
            crate::dto::player::PlayerProfile,
            crate::dto::player::TierStanding,
            crate::dto::stats::StatsResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and storage health"),
        (name = "rankings", description = "Leaderboard projections"),
        (name = "players", description = "Player profiles"),
        (name = "stats", description = "Aggregate counters"),
    )
)]
pub struct ApiDoc;
