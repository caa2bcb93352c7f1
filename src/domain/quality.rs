//! Card condition grading.
//!
//! Marketplaces grade condition on the same five-step scale. The scale is
//! used twice: as an eligibility floor on wanted items and as a weight in the
//! quality objective.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Condition tier of a listed card, ordered best first.
///
/// `QualityTier::NearMint < QualityTier::Damaged` in the derived ordering, so
/// "at least as good as" reads as `tier <= floor`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum QualityTier {
    #[serde(rename = "NM", alias = "nm", alias = "near_mint")]
    NearMint,
    #[serde(rename = "LP", alias = "lp", alias = "lightly_played")]
    LightlyPlayed,
    #[serde(rename = "MP", alias = "mp", alias = "moderately_played")]
    ModeratelyPlayed,
    #[serde(rename = "HP", alias = "hp", alias = "heavily_played")]
    HeavilyPlayed,
    #[default]
    #[serde(rename = "DMG", alias = "dmg", alias = "damaged")]
    Damaged,
}

impl QualityTier {
    /// All tiers, best first.
    pub const ALL: [QualityTier; 5] = [
        Self::NearMint,
        Self::LightlyPlayed,
        Self::ModeratelyPlayed,
        Self::HeavilyPlayed,
        Self::Damaged,
    ];

    /// Short marketplace code (`NM`, `LP`, ...).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NearMint => "NM",
            Self::LightlyPlayed => "LP",
            Self::ModeratelyPlayed => "MP",
            Self::HeavilyPlayed => "HP",
            Self::Damaged => "DMG",
        }
    }

    /// Whether a card in this condition satisfies the given floor.
    #[must_use]
    pub fn meets(self, floor: QualityTier) -> bool {
        self <= floor
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for QualityTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NM" | "NEAR_MINT" | "NEAR MINT" | "M" | "MINT" => Ok(Self::NearMint),
            "LP" | "EX" | "LIGHTLY_PLAYED" | "LIGHTLY PLAYED" => Ok(Self::LightlyPlayed),
            "MP" | "VG" | "MODERATELY_PLAYED" | "MODERATELY PLAYED" => Ok(Self::ModeratelyPlayed),
            "HP" | "G" | "HEAVILY_PLAYED" | "HEAVILY PLAYED" => Ok(Self::HeavilyPlayed),
            "DMG" | "D" | "DAMAGED" | "POOR" => Ok(Self::Damaged),
            _ => Err(DomainError::UnknownQuality {
                value: s.to_string(),
            }),
        }
    }
}
