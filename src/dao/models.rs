//! Persisted document model. The whole bot state is one JSON document whose
//! top-level keys stay wire-compatible with the historical data files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::tiers::{ALL_MODES, Mode, Tier};

/// Aggregate document owning every piece of ranking state.
///
/// Missing keys deserialize to their empty defaults so documents written by
/// older deployments load without a separate migration step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TierDocument {
    /// Per-mode waitlists (active flag, queue, on-duty testers).
    #[serde(default)]
    pub waitlists: IndexMap<Mode, WaitlistEntity>,
    /// Players keyed by platform user id.
    #[serde(rename = "jugadores", default)]
    pub players: IndexMap<String, PlayerEntity>,
    /// Append-only log of completed test results.
    #[serde(rename = "resultados", default)]
    pub results: Vec<ResultEntity>,
    /// Append-only punishment log (permanent and temporary bans).
    #[serde(rename = "castigos", default)]
    pub punishments: Vec<PunishmentEntity>,
    /// Open tickets keyed by channel id.
    #[serde(default)]
    pub tickets: IndexMap<String, TicketEntity>,
    /// Cooldown ledger keyed by player id.
    #[serde(default)]
    pub cooldowns: IndexMap<String, CooldownSlot>,
    /// Active temporary bans keyed by player id, swept hourly.
    #[serde(rename = "bans_temporales", default)]
    pub temp_bans: IndexMap<String, TempBanEntity>,
    /// Waitlist panel message ids keyed by mode.
    #[serde(default)]
    pub panel_messages: IndexMap<Mode, u64>,
    /// Guild-wide settings updated by admin commands.
    #[serde(default)]
    pub config: GuildConfig,
}

impl TierDocument {
    /// Normalize a freshly loaded document.
    ///
    /// Upgrades legacy single-window cooldown entries to the per-mode shape
    /// (the old bot stored one window for all modes) and makes sure every
    /// known mode has a waitlist entry.
    pub fn normalize(&mut self) {
        for slot in self.cooldowns.values_mut() {
            if let CooldownSlot::Legacy(window) = slot {
                let window = window.clone();
                let per_mode = ALL_MODES
                    .into_iter()
                    .map(|mode| (mode, window.clone()))
                    .collect();
                *slot = CooldownSlot::PerMode(per_mode);
            }
        }

        for mode in ALL_MODES {
            self.waitlists.entry(mode).or_default();
        }
    }

    /// Waitlist for a mode, created closed and empty on first access.
    pub fn waitlist_mut(&mut self, mode: Mode) -> &mut WaitlistEntity {
        self.waitlists.entry(mode).or_default()
    }
}

/// One mode's queue state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitlistEntity {
    /// Whether players may currently join the queue.
    #[serde(default)]
    pub active: bool,
    /// Waiting player ids in FIFO order.
    #[serde(default)]
    pub queue: Vec<String>,
    /// Player ids of testers currently on duty for this mode.
    #[serde(default)]
    pub testers: Vec<String>,
}

/// A ranked player. Created on first recorded result, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Minecraft-style nickname supplied with each result.
    pub nick_mc: String,
    /// Display name on the chat platform.
    pub discord_name: String,
    /// Points for the current tier in each tested mode.
    #[serde(rename = "puntos_por_modalidad", default)]
    pub points_by_mode: IndexMap<Mode, u32>,
    /// Current tier in each tested mode.
    #[serde(rename = "tier_por_modalidad", default)]
    pub tier_by_mode: IndexMap<Mode, Tier>,
    /// Sum of per-mode points, kept in step with `points_by_mode`.
    #[serde(rename = "puntos_totales", default)]
    pub total_points: u32,
    /// Whether the account is premium.
    #[serde(default)]
    pub es_premium: Premium,
}

impl PlayerEntity {
    /// Recompute the derived total from the per-mode points.
    pub fn recompute_total(&mut self) {
        self.total_points = self.points_by_mode.values().sum();
    }
}

/// Premium flag with the historical `si`/`no` wire values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Premium {
    /// Premium Minecraft account.
    #[serde(rename = "si")]
    Yes,
    /// Cracked account.
    #[default]
    #[serde(rename = "no")]
    No,
}

impl Premium {
    /// Wire label, `"si"` or `"no"`.
    pub fn label(self) -> &'static str {
        match self {
            Premium::Yes => "si",
            Premium::No => "no",
        }
    }
}

/// Immutable record of one completed test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultEntity {
    /// Minecraft nickname at the time of the test.
    pub nick_mc: String,
    /// Tested player's platform id.
    #[serde(rename = "jugador_id")]
    pub player_id: String,
    /// Tested player's display name.
    #[serde(rename = "jugador_name")]
    pub player_name: String,
    /// Tester's platform id.
    pub tester_id: String,
    /// Tester's display name.
    pub tester_name: String,
    /// Mode the test was run in.
    #[serde(rename = "modalidad")]
    pub mode: Mode,
    /// Tier held before the test; `None` for a first test.
    #[serde(rename = "tier_antiguo", with = "previous_tier")]
    pub previous_tier: Option<Tier>,
    /// Tier awarded by the test.
    #[serde(rename = "tier_nuevo")]
    pub new_tier: Tier,
    /// Points awarded (the point value of the new tier).
    #[serde(rename = "puntos_obtenidos")]
    pub points_awarded: u32,
    /// Player's total points right after this test.
    #[serde(rename = "puntos_totales")]
    pub total_points: u32,
    /// When the result was recorded.
    #[serde(rename = "fecha", with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

/// Serde helpers for the `tier_antiguo` field, which stores `"Sin Tier"` for
/// players tested for the first time.
mod previous_tier {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::state::tiers::Tier;

    const NO_TIER: &str = "Sin Tier";

    pub fn serialize<S: Serializer>(value: &Option<Tier>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(tier) => ser.serialize_str(tier.label()),
            None => ser.serialize_str(NO_TIER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Tier>, D::Error> {
        let label = String::deserialize(de)?;
        if label == NO_TIER {
            return Ok(None);
        }
        label
            .parse::<Tier>()
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Why a player was banned from the tierlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanReason {
    /// Cheating; permanent ban.
    Chiter,
    /// Alternate account; fixed 30-day ban.
    Alt,
}

/// One entry in the append-only punishment log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PunishmentEntity {
    /// Minecraft nickname of the banned player.
    pub nick_mc: String,
    /// Banned player's platform id.
    #[serde(rename = "jugador_id")]
    pub player_id: String,
    /// Reason for the ban.
    #[serde(rename = "motivo")]
    pub reason: BanReason,
    /// Link to the evidence (video or screenshot).
    #[serde(rename = "evidencia")]
    pub evidence: String,
    /// Whether the ban never expires.
    #[serde(rename = "permanente", default)]
    pub permanent: bool,
    /// Expiry date for temporary bans.
    #[serde(
        rename = "finalizacion_date",
        default,
        with = "time::serde::rfc3339::option"
    )]
    pub ends_at: Option<OffsetDateTime>,
    /// Platform id of the staff member who issued the ban.
    pub staff_id: String,
    /// When the ban was issued.
    #[serde(rename = "fecha", with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
}

/// Entry in the active temporary-ban index, removed by the hourly sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TempBanEntity {
    /// Minecraft nickname of the banned player.
    pub nick_mc: String,
    /// When the ban expires.
    #[serde(rename = "end_date", with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    /// Reason for the ban.
    #[serde(rename = "motivo")]
    pub reason: BanReason,
}

/// One open ticket: a private channel hosting a single test session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketEntity {
    /// Stable identity of the ticket, independent of the channel id.
    #[serde(default = "Uuid::new_v4")]
    pub ticket_id: Uuid,
    /// Player being tested.
    #[serde(rename = "jugador_id")]
    pub player_id: String,
    /// Tester who pulled the player from the queue.
    pub tester_id: String,
    /// Mode being tested.
    #[serde(rename = "modalidad")]
    pub mode: Mode,
    /// When the ticket channel was created.
    #[serde(rename = "fecha", with = "time::serde::rfc3339")]
    pub opened_at: OffsetDateTime,
}

/// Per-player cooldown storage.
///
/// Old documents stored a single window applied to every mode; current
/// documents store one window per mode. [`TierDocument::normalize`] upgrades
/// the legacy shape once at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CooldownSlot {
    /// Pre-migration shape: one window covering all modes.
    Legacy(CooldownWindow),
    /// Current shape: one window per mode.
    PerMode(IndexMap<Mode, CooldownWindow>),
}

impl CooldownSlot {
    /// Per-mode view of the slot; `None` for an unmigrated legacy slot.
    pub fn per_mode(&self) -> Option<&IndexMap<Mode, CooldownWindow>> {
        match self {
            CooldownSlot::PerMode(map) => Some(map),
            CooldownSlot::Legacy(_) => None,
        }
    }

    /// Mutable per-mode view of the slot.
    pub fn per_mode_mut(&mut self) -> Option<&mut IndexMap<Mode, CooldownWindow>> {
        match self {
            CooldownSlot::PerMode(map) => Some(map),
            CooldownSlot::Legacy(_) => None,
        }
    }
}

/// Start/end pair gating re-entry into one mode's queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CooldownWindow {
    /// When the cooldown started.
    #[serde(rename = "start_date", with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// When the cooldown ends; expired once `now >= end`.
    #[serde(rename = "end_date", with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl CooldownWindow {
    /// Shared expiry predicate used by both the lazy path and the sweep.
    pub fn expired(&self, now: OffsetDateTime) -> bool {
        now >= self.end
    }
}

/// Guild-wide settings, updated by admin commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildConfig {
    /// Category channel under which ticket channels are created.
    #[serde(default)]
    pub ticket_category_id: Option<u64>,
    /// Channel receiving closed-ticket summaries and transcripts.
    #[serde(default, alias = "log_channel_id")]
    pub ticket_logs_channel_id: Option<u64>,
    /// Channel receiving public result announcements.
    #[serde(rename = "resultado_channel_id", default)]
    pub results_channel_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn document_serializes_with_wire_keys() {
        let doc = TierDocument::default();
        let value = serde_json::to_value(&doc).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "waitlists",
            "jugadores",
            "resultados",
            "castigos",
            "tickets",
            "cooldowns",
            "bans_temporales",
            "panel_messages",
            "config",
        ] {
            assert!(object.contains_key(key), "missing top-level key `{key}`");
        }
    }

    #[test]
    fn empty_object_loads_as_default_document() {
        let doc: TierDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, TierDocument::default());
    }

    #[test]
    fn legacy_cooldown_shape_is_migrated_at_normalize() {
        let raw = serde_json::json!({
            "cooldowns": {
                "111": {
                    "start_date": "2024-01-01T00:00:00Z",
                    "end_date": "2024-01-11T00:00:00Z"
                },
                "222": {
                    "Sword": {
                        "start_date": "2024-02-01T00:00:00Z",
                        "end_date": "2024-02-11T00:00:00Z"
                    }
                }
            }
        });

        let mut doc: TierDocument = serde_json::from_value(raw).unwrap();
        assert!(matches!(doc.cooldowns["111"], CooldownSlot::Legacy(_)));

        doc.normalize();

        let migrated = doc.cooldowns["111"].per_mode().unwrap();
        assert_eq!(migrated.len(), ALL_MODES.len());
        assert_eq!(migrated[&Mode::Uhc].end, datetime!(2024-01-11 00:00:00 UTC));

        let untouched = doc.cooldowns["222"].per_mode().unwrap();
        assert_eq!(untouched.len(), 1);
        assert!(untouched.contains_key(&Mode::Sword));
    }

    #[test]
    fn normalize_seeds_every_mode_waitlist() {
        let mut doc = TierDocument::default();
        doc.normalize();
        assert_eq!(doc.waitlists.len(), ALL_MODES.len());
        assert!(doc.waitlists.values().all(|w| !w.active));
    }

    #[test]
    fn previous_tier_uses_sin_tier_sentinel() {
        let result = ResultEntity {
            nick_mc: "Steve".into(),
            player_id: "1".into(),
            player_name: "steve#0".into(),
            tester_id: "2".into(),
            tester_name: "tester#0".into(),
            mode: Mode::Uhc,
            previous_tier: None,
            new_tier: Tier::Ht3,
            points_awarded: 6,
            total_points: 6,
            recorded_at: datetime!(2024-03-01 12:00:00 UTC),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["tier_antiguo"], "Sin Tier");
        assert_eq!(value["tier_nuevo"], "HT3");

        let back: ResultEntity = serde_json::from_value(value).unwrap();
        assert_eq!(back.previous_tier, None);
    }

    #[test]
    fn config_accepts_legacy_log_channel_key() {
        let raw = serde_json::json!({ "log_channel_id": 42 });
        let config: GuildConfig = serde_json::from_value(raw).unwrap();
        assert_eq!(config.ticket_logs_channel_id, Some(42));
    }
}
