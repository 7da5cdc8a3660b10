//! Player progress: XP, daily streak, stickers, badges and avatar.
//!
//! All transitions here are plain in-memory updates. XP is unsigned and
//! saturating, and every unlock flag is only ever set, never cleared.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use thiserror::Error;

use crate::avatar::{Avatar, AvatarSlot, AvatarThresholds};
use crate::checklist::ChecklistKind;
use crate::numbers::clamp_i64_to_u32;
use crate::stickers::{CatalogEntry, Sticker, StickerThreshold, badge_sticker_id};
use crate::streak::{StreakChange, advance_streak};

/// Caller errors for progress transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("unknown avatar slot '{0}'")]
    UnknownSlot(String),
    #[error("unknown sticker '{0}'")]
    UnknownSticker(String),
}

/// Result of trying to place a sticker on the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed,
    Locked,
}

/// Result of toggling an avatar accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The accessory is now worn (`true`) or removed (`false`).
    Toggled(bool),
    Locked,
}

/// Items unlocked by one `recompute_unlocks` pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnlockReport {
    pub stickers: SmallVec<[String; 4]>,
    pub slots: SmallVec<[AvatarSlot; 3]>,
}

impl UnlockReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stickers.is_empty() && self.slots.is_empty()
    }
}

/// Persisted progress record (`ta_progress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProgressState {
    pub xp: u32,
    pub streak: u32,
    pub last_active_date: Option<NaiveDate>,
    pub stickers: Vec<Sticker>,
    pub placed_stickers: Vec<String>,
    pub badges: Vec<String>,
    pub avatar: Avatar,
    /// Checklists whose completion XP has been paid.
    pub rewarded_checklists: Vec<ChecklistKind>,
    pub oath_rewarded: bool,
}

impl ProgressState {
    /// Fresh progress with every catalog sticker present and locked.
    #[must_use]
    pub fn with_catalog(catalog: &[CatalogEntry]) -> Self {
        let mut state = Self::default();
        state.sync_catalog(catalog);
        state
    }

    /// Apply an XP delta, clamping at zero. Returns the new total.
    pub fn add_xp(&mut self, delta: i64) -> u32 {
        self.xp = clamp_i64_to_u32(i64::from(self.xp).saturating_add(delta));
        self.xp
    }

    /// Unlock every threshold sticker and avatar slot the current XP reaches.
    ///
    /// Threshold stickers missing from the list are added first. Nothing is
    /// ever re-locked, so running this twice gives the same state as once.
    pub fn recompute_unlocks(
        &mut self,
        sticker_thresholds: &[StickerThreshold],
        avatar_thresholds: &AvatarThresholds,
    ) -> UnlockReport {
        let mut report = UnlockReport::default();

        for threshold in sticker_thresholds {
            let idx = self.ensure_sticker(&threshold.id, &threshold.name);
            let sticker = &mut self.stickers[idx];
            if self.xp >= threshold.xp && !sticker.unlocked {
                sticker.unlocked = true;
                report.stickers.push(sticker.id.clone());
            }
        }

        for slot in AvatarSlot::ALL {
            if self.xp >= avatar_thresholds.for_slot(slot) && self.avatar.unlocked.unlock(slot) {
                report.slots.push(slot);
            }
        }

        if !report.is_empty() {
            log::debug!(
                "xp {} unlocked stickers {:?} slots {:?}",
                self.xp,
                report.stickers,
                report.slots
            );
        }
        report
    }

    #[must_use]
    pub fn sticker(&self, id: &str) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn is_sticker_unlocked(&self, id: &str) -> bool {
        self.sticker(id).is_some_and(|s| s.unlocked)
    }

    /// Append an unlocked sticker to the box; locked stickers are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownSticker` if the id is not in the sticker list.
    pub fn place_sticker(&mut self, id: &str) -> Result<PlaceOutcome, ProgressError> {
        let sticker = self
            .sticker(id)
            .ok_or_else(|| ProgressError::UnknownSticker(id.to_string()))?;
        if !sticker.unlocked {
            return Ok(PlaceOutcome::Locked);
        }
        self.placed_stickers.push(id.to_string());
        Ok(PlaceOutcome::Placed)
    }

    pub fn clear_placed_stickers(&mut self) {
        self.placed_stickers.clear();
    }

    /// Flip an unlocked accessory; locked slots are a no-op.
    pub fn toggle_avatar_item(&mut self, slot: AvatarSlot) -> ToggleOutcome {
        if !self.avatar.unlocked.is_unlocked(slot) {
            return ToggleOutcome::Locked;
        }
        ToggleOutcome::Toggled(self.avatar.flip(slot))
    }

    /// Count `today` toward the all-time daily streak.
    pub fn record_activity(&mut self, today: NaiveDate) -> StreakChange {
        advance_streak(&mut self.streak, &mut self.last_active_date, today)
    }

    /// Unlock a sticker obtained outside the XP ladder (badge, shop, rare).
    ///
    /// Returns `true` if the sticker was previously locked.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownSticker` if the id is not in the sticker list.
    pub fn acquire_sticker(&mut self, id: &str) -> Result<bool, ProgressError> {
        let sticker = self
            .stickers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ProgressError::UnknownSticker(id.to_string()))?;
        let newly = !sticker.unlocked;
        sticker.unlocked = true;
        Ok(newly)
    }

    /// Record an earned badge and unlock its badge sticker.
    ///
    /// Returns `false` if the badge was already recorded.
    pub fn earn_badge(&mut self, reward: &str) -> bool {
        if self.badges.iter().any(|b| b == reward) {
            return false;
        }
        self.badges.push(reward.to_string());
        let id = badge_sticker_id(reward);
        let idx = self.ensure_sticker(&id, reward);
        self.stickers[idx].unlocked = true;
        true
    }

    /// Add catalog entries missing from the sticker list, leaving existing
    /// entries (and their unlock flags) untouched.
    pub fn sync_catalog(&mut self, catalog: &[CatalogEntry]) {
        for entry in catalog {
            if self.sticker(&entry.id).is_none() {
                self.stickers.push(Sticker::locked(entry));
            }
        }
    }

    /// Drop repeated sticker ids, keeping the first entry and its flag.
    ///
    /// Returns how many entries were removed.
    pub fn dedupe_stickers(&mut self) -> usize {
        let before = self.stickers.len();
        let mut seen = HashSet::new();
        self.stickers.retain(|sticker| seen.insert(sticker.id.clone()));
        before - self.stickers.len()
    }

    /// Record that `kind` paid its completion XP. Returns `false` if it
    /// already had.
    pub fn mark_checklist_rewarded(&mut self, kind: ChecklistKind) -> bool {
        if self.rewarded_checklists.contains(&kind) {
            return false;
        }
        self.rewarded_checklists.push(kind);
        true
    }

    /// Record that the oath paid its XP. Returns `false` if it already had.
    pub fn mark_oath_rewarded(&mut self) -> bool {
        !std::mem::replace(&mut self.oath_rewarded, true)
    }

    fn ensure_sticker(&mut self, id: &str, name: &str) -> usize {
        if let Some(idx) = self.stickers.iter().position(|s| s.id == id) {
            return idx;
        }
        self.stickers.push(Sticker {
            id: id.to_string(),
            name: name.to_string(),
            unlocked: false,
        });
        self.stickers.len() - 1
    }
}
