use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

/// Tier and points a player holds in one mode.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModeStanding {
    /// Tier label, e.g. `"HT3"`.
    pub tier: String,
    /// Display form of the tier (same label).
    pub tier_display: String,
    /// Points the tier is worth.
    pub puntos: u32,
}

/// One row of a rankings response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedPlayer {
    /// Platform user id.
    pub id: String,
    /// Minecraft nickname, falling back to the platform display name.
    pub name: String,
    /// Total points across every mode.
    pub points: u32,
    /// Points used for this ranking's ordering (total for `overall`,
    /// per-mode points otherwise).
    pub mode_points: u32,
    /// `"si"` or `"no"`.
    pub es_premium: String,
    /// Standing in every tested mode, keyed by mode label.
    pub modalidades: IndexMap<String, ModeStanding>,
}

/// Response for `/api/rankings/{mode}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankingsResponse {
    /// Echo of the requested mode segment.
    pub mode: String,
    /// Ranked players, best first.
    pub players: Vec<RankedPlayer>,
    /// Number of ranked players.
    pub total_players: usize,
}

impl RankingsResponse {
    /// Empty rankings for a mode, used for unknown modes and degraded mode.
    pub fn empty(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            players: Vec::new(),
            total_players: 0,
        }
    }
}
