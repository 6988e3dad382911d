use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

/// Tier and points in one mode, as shown on a player profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TierStanding {
    /// Tier label, e.g. `"HT3"`.
    pub tier: String,
    /// Points the tier is worth.
    pub puntos: u32,
}

/// Response for `/api/player/{id}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerProfile {
    /// Platform user id.
    pub id: String,
    /// Minecraft nickname.
    pub nick: String,
    /// Platform display name.
    pub discord_name: String,
    /// 1-based leaderboard position: one plus the number of players with a
    /// strictly higher total.
    pub position: usize,
    /// Total points across every mode.
    pub total_points: u32,
    /// Standing in every tested mode, keyed by mode label.
    pub tiers: IndexMap<String, TierStanding>,
    /// `"si"` or `"no"`.
    pub es_premium: String,
}
