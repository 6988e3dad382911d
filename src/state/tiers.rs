//! Tier ladder and game mode tables shared by every handler and projection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of days a player waits before re-testing in the same mode.
pub const COOLDOWN_DAYS: i64 = 10;
/// Maximum number of players a mode queue can hold.
pub const MAX_QUEUE_SIZE: usize = 20;
/// Duration of a temporary (alt) ban, in days.
pub const TEMP_BAN_DAYS: i64 = 30;

/// One of the ten ordered ranks a player can hold in a mode.
///
/// The ordering is fixed and shared across modes: `LT5` is the lowest rank,
/// `HT1` the highest. The point value is a pure function of the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Low tier 5, worth 1 point.
    #[serde(rename = "LT5")]
    Lt5,
    /// High tier 5, worth 2 points.
    #[serde(rename = "HT5")]
    Ht5,
    /// Low tier 4, worth 3 points.
    #[serde(rename = "LT4")]
    Lt4,
    /// High tier 4, worth 4 points.
    #[serde(rename = "HT4")]
    Ht4,
    /// Low tier 3, worth 5 points.
    #[serde(rename = "LT3")]
    Lt3,
    /// High tier 3, worth 6 points.
    #[serde(rename = "HT3")]
    Ht3,
    /// Low tier 2, worth 7 points.
    #[serde(rename = "LT2")]
    Lt2,
    /// High tier 2, worth 8 points.
    #[serde(rename = "HT2")]
    Ht2,
    /// Low tier 1, worth 9 points.
    #[serde(rename = "LT1")]
    Lt1,
    /// High tier 1, worth 10 points.
    #[serde(rename = "HT1")]
    Ht1,
}

/// All tiers from lowest to highest.
pub const ALL_TIERS: [Tier; 10] = [
    Tier::Lt5,
    Tier::Ht5,
    Tier::Lt4,
    Tier::Ht4,
    Tier::Lt3,
    Tier::Ht3,
    Tier::Lt2,
    Tier::Ht2,
    Tier::Lt1,
    Tier::Ht1,
];

impl Tier {
    /// Rank of the tier, 1 (lowest) to 10 (highest).
    pub fn rank(self) -> u32 {
        self as u32 + 1
    }

    /// Fixed point value awarded for holding this tier.
    pub fn points(self) -> u32 {
        self.rank()
    }

    /// Canonical wire label, e.g. `"HT3"`.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Lt5 => "LT5",
            Tier::Ht5 => "HT5",
            Tier::Lt4 => "LT4",
            Tier::Ht4 => "HT4",
            Tier::Lt3 => "LT3",
            Tier::Ht3 => "HT3",
            Tier::Lt2 => "LT2",
            Tier::Ht2 => "HT2",
            Tier::Lt1 => "LT1",
            Tier::Ht1 => "HT1",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a tier label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier `{0}`")]
pub struct ParseTierError(pub String);

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TIERS
            .into_iter()
            .find(|tier| tier.label() == s)
            .ok_or_else(|| ParseTierError(s.to_owned()))
    }
}

/// A game discipline with its own queue, cooldown ledger, and tier ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Mace duels.
    Mace,
    /// Sword duels.
    Sword,
    /// Ultra hardcore.
    #[serde(rename = "UHC")]
    Uhc,
    /// End crystal combat.
    Crystal,
    /// Netherite overpowered kits.
    #[serde(rename = "NethOP")]
    NethOp,
    /// Survival multiplayer kits.
    #[serde(rename = "SMP")]
    Smp,
    /// Axe duels.
    Axe,
    /// Diamond potion kits.
    Dpot,
}

/// Every mode the server runs queues for, in panel order.
pub const ALL_MODES: [Mode; 8] = [
    Mode::Mace,
    Mode::Sword,
    Mode::Uhc,
    Mode::Crystal,
    Mode::NethOp,
    Mode::Smp,
    Mode::Axe,
    Mode::Dpot,
];

impl Mode {
    /// Canonical wire label, e.g. `"NethOP"`.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Mace => "Mace",
            Mode::Sword => "Sword",
            Mode::Uhc => "UHC",
            Mode::Crystal => "Crystal",
            Mode::NethOp => "NethOP",
            Mode::Smp => "SMP",
            Mode::Axe => "Axe",
            Mode::Dpot => "Dpot",
        }
    }

    /// Emoji displayed next to the mode in panels and announcements.
    pub fn emoji(self) -> &'static str {
        match self {
            Mode::Mace => "🔨",
            Mode::Sword => "⚔️",
            Mode::Uhc => "❤️",
            Mode::Crystal => "💎",
            Mode::NethOp => "🧪",
            Mode::Smp => "🪓",
            Mode::Axe => "🪓",
            Mode::Dpot => "🧪",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a mode label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode `{0}`")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_MODES
            .into_iter()
            .find(|mode| mode.label() == s)
            .ok_or_else(|| ParseModeError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_values_follow_rank() {
        assert_eq!(Tier::Lt5.points(), 1);
        assert_eq!(Tier::Ht3.points(), 6);
        assert_eq!(Tier::Ht1.points(), 10);

        let mut expected = 1;
        for tier in ALL_TIERS {
            assert_eq!(tier.points(), expected);
            expected += 1;
        }
    }

    #[test]
    fn tiers_are_totally_ordered() {
        assert!(Tier::Lt5 < Tier::Ht5);
        assert!(Tier::Ht5 < Tier::Lt4);
        assert!(Tier::Lt1 < Tier::Ht1);
    }

    #[test]
    fn labels_round_trip() {
        for tier in ALL_TIERS {
            assert_eq!(tier.label().parse::<Tier>().unwrap(), tier);
        }
        for mode in ALL_MODES {
            assert_eq!(mode.label().parse::<Mode>().unwrap(), mode);
        }
        assert!("HT6".parse::<Tier>().is_err());
        assert!("Bed".parse::<Mode>().is_err());
    }

    #[test]
    fn serde_uses_wire_labels() {
        assert_eq!(serde_json::to_string(&Tier::Ht3).unwrap(), "\"HT3\"");
        assert_eq!(serde_json::to_string(&Mode::NethOp).unwrap(), "\"NethOP\"");
        let mode: Mode = serde_json::from_str("\"UHC\"").unwrap();
        assert_eq!(mode, Mode::Uhc);
    }
}
