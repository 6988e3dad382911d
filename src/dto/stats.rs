use serde::Serialize;
use utoipa::ToSchema;

/// Response for `/api/stats`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of recorded test results.
    pub total_tests: usize,
    /// Number of ranked players.
    pub total_players: usize,
}
