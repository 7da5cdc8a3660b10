//! Builder avatar: colors, XP-gated accessories and their unlock flags.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::color::HexColor;
use crate::constants::{DEFAULT_EYES_HEX, DEFAULT_HAIR_HEX, DEFAULT_SKIN_HEX};
use crate::progress::ProgressError;

/// Accessory slots that unlock with XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarSlot {
    Hat,
    Goggles,
    Gloves,
}

impl AvatarSlot {
    pub const ALL: [Self; 3] = [Self::Hat, Self::Goggles, Self::Gloves];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hat => "hat",
            Self::Goggles => "goggles",
            Self::Gloves => "gloves",
        }
    }
}

impl fmt::Display for AvatarSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AvatarSlot {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.key() == s)
            .ok_or_else(|| ProgressError::UnknownSlot(s.to_string()))
    }
}

/// Colorable avatar parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarPart {
    Hair,
    Eyes,
    Skin,
}

/// XP needed for each accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarThresholds {
    pub hat: u32,
    pub goggles: u32,
    pub gloves: u32,
}

impl Default for AvatarThresholds {
    fn default() -> Self {
        Self {
            hat: 15,
            goggles: 25,
            gloves: 35,
        }
    }
}

impl AvatarThresholds {
    #[must_use]
    pub const fn for_slot(&self, slot: AvatarSlot) -> u32 {
        match slot {
            AvatarSlot::Hat => self.hat,
            AvatarSlot::Goggles => self.goggles,
            AvatarSlot::Gloves => self.gloves,
        }
    }
}

/// Per-slot unlock flags. Flags only ever go from `false` to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AvatarUnlocks {
    #[serde(default)]
    pub hat: bool,
    #[serde(default)]
    pub goggles: bool,
    #[serde(default)]
    pub gloves: bool,
}

impl AvatarUnlocks {
    #[must_use]
    pub const fn is_unlocked(&self, slot: AvatarSlot) -> bool {
        match slot {
            AvatarSlot::Hat => self.hat,
            AvatarSlot::Goggles => self.goggles,
            AvatarSlot::Gloves => self.gloves,
        }
    }

    /// Set a slot's flag; returns `true` if it was previously locked.
    pub fn unlock(&mut self, slot: AvatarSlot) -> bool {
        let flag = match slot {
            AvatarSlot::Hat => &mut self.hat,
            AvatarSlot::Goggles => &mut self.goggles,
            AvatarSlot::Gloves => &mut self.gloves,
        };
        let newly = !*flag;
        *flag = true;
        newly
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Avatar {
    pub hair: HexColor,
    pub eyes: HexColor,
    pub skin: HexColor,
    pub hat: bool,
    pub goggles: bool,
    pub gloves: bool,
    pub unlocked: AvatarUnlocks,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            hair: HexColor::from_static(DEFAULT_HAIR_HEX),
            eyes: HexColor::from_static(DEFAULT_EYES_HEX),
            skin: HexColor::from_static(DEFAULT_SKIN_HEX),
            hat: false,
            goggles: false,
            gloves: false,
            unlocked: AvatarUnlocks::default(),
        }
    }
}

impl Avatar {
    #[must_use]
    pub const fn is_worn(&self, slot: AvatarSlot) -> bool {
        match slot {
            AvatarSlot::Hat => self.hat,
            AvatarSlot::Goggles => self.goggles,
            AvatarSlot::Gloves => self.gloves,
        }
    }

    pub(crate) fn flip(&mut self, slot: AvatarSlot) -> bool {
        let worn = match slot {
            AvatarSlot::Hat => &mut self.hat,
            AvatarSlot::Goggles => &mut self.goggles,
            AvatarSlot::Gloves => &mut self.gloves,
        };
        *worn = !*worn;
        *worn
    }

    pub fn set_color(&mut self, part: AvatarPart, color: HexColor) {
        match part {
            AvatarPart::Hair => self.hair = color,
            AvatarPart::Eyes => self.eyes = color,
            AvatarPart::Skin => self.skin = color,
        }
    }
}
