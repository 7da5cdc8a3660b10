//! Progression engine: pure transitions over [`ProgressState`].
//!
//! The engine owns the tuning (`ProgressionConfig`) and the milestone lists in
//! effect. Every transition is deterministic; callers either use the direct
//! methods on the state records or dispatch a [`ProgressEvent`] through
//! [`ProgressionEngine::apply`] and react to the returned effects.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::avatar::{AvatarPart, AvatarSlot};
use crate::color::HexColor;
use crate::config::ProgressionConfig;
use crate::milestones::{Milestone, effective_milestones, milestones_crossed, next_milestone};
use crate::progress::{PlaceOutcome, ProgressError, ProgressState, ToggleOutcome};
use crate::season::{SeasonBadge, SeasonFile, SeasonState};
use crate::stickers::{CatalogEntry, badge_sticker_id};
use crate::streak::StreakChange;

/// Inputs to [`ProgressionEngine::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Apply an XP delta, then recompute unlocks.
    AddXp(i64),
    RecomputeUnlocks,
    PlaceSticker(String),
    ClearPlacedStickers,
    ToggleAvatarItem(AvatarSlot),
    SetAvatarColor(AvatarPart, HexColor),
    /// Count a day toward the all-time streak.
    RecordActivity(NaiveDate),
    AcquireSticker(String),
    /// Record a season badge and grant its sticker.
    EarnBadge(String),
    /// Add catalog entries missing from the sticker list.
    SyncCatalog,
}

/// Observable consequences of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEffect {
    XpChanged { before: u32, after: u32 },
    StickerUnlocked { id: String },
    SlotUnlocked { slot: AvatarSlot },
    MilestoneReached { milestone: Milestone },
    StickerPlaced { id: String },
    StickerLocked { id: String },
    PlacedStickersCleared,
    AvatarToggled { slot: AvatarSlot, worn: bool },
    AvatarLocked { slot: AvatarSlot },
    AvatarColorChanged { part: AvatarPart },
    StreakChanged { change: StreakChange, streak: u32 },
    BadgeEarned { reward: String },
}

impl ProgressEffect {
    /// Effects announced with the "ding" cue.
    #[must_use]
    pub const fn is_celebration(&self) -> bool {
        matches!(
            self,
            Self::StickerUnlocked { .. } | Self::SlotUnlocked { .. } | Self::MilestoneReached { .. }
        )
    }
}

/// New state plus the effects produced by one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ProgressState,
    pub effects: Vec<ProgressEffect>,
}

impl Transition {
    #[must_use]
    pub fn celebrates(&self) -> bool {
        self.effects.iter().any(ProgressEffect::is_celebration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionEngine {
    config: ProgressionConfig,
    /// Base milestone list: the stored list, or the configured default.
    milestones: Vec<Milestone>,
    /// Season file milestones; when non-empty they replace the base list.
    season_milestones: Vec<Milestone>,
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self::new(ProgressionConfig::default_config())
    }
}

impl ProgressionEngine {
    #[must_use]
    pub fn new(config: ProgressionConfig) -> Self {
        let milestones = config.milestones.clone();
        Self {
            config,
            milestones,
            season_milestones: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Replace the base milestone list; an empty list restores the configured default.
    pub fn set_milestones(&mut self, milestones: Vec<Milestone>) {
        self.milestones = if milestones.is_empty() {
            self.config.milestones.clone()
        } else {
            milestones
        };
    }

    /// Install a season file's milestone override.
    pub fn apply_season_file(&mut self, file: &SeasonFile) {
        if !file.milestones.is_empty() {
            log::info!(
                "season file {} overrides {} milestones",
                file.name.as_deref().unwrap_or("(unnamed)"),
                file.milestones.len()
            );
        }
        self.season_milestones.clone_from(&file.milestones);
    }

    /// Milestone list currently in effect.
    #[must_use]
    pub fn active_milestones(&self) -> &[Milestone] {
        effective_milestones(&self.season_milestones, &self.milestones)
    }

    #[must_use]
    pub fn next_milestone(&self, xp: u32) -> Option<&Milestone> {
        next_milestone(xp, &self.season_milestones, &self.milestones)
    }

    /// Sticker catalog for a player holding `badges`.
    #[must_use]
    pub fn catalog(&self, badges: &[String]) -> Vec<CatalogEntry> {
        self.config.catalog(badges)
    }

    /// Fresh progress with the full catalog present.
    #[must_use]
    pub fn new_progress(&self) -> ProgressState {
        ProgressState::with_catalog(&self.catalog(&[]))
    }

    /// Season for the month containing `today`, using the configured template.
    #[must_use]
    pub fn new_season(&self, today: NaiveDate) -> SeasonState {
        SeasonState::for_month(today, &self.config.season)
    }

    /// Roll the season over if needed and count `today` toward its streak.
    ///
    /// A disabled season records nothing. Returns the badges newly earned.
    pub fn record_season_day(&self, season: &mut SeasonState, today: NaiveDate) -> Vec<SeasonBadge> {
        season.roll_over(today);
        if !season.enabled {
            log::debug!("season {} disabled; skipping {today}", season.id);
            return Vec::new();
        }
        season.record_daily_activity(today)
    }

    /// Apply one event to a copy of `state`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownSticker` when the event names a sticker
    /// missing from the sticker list.
    pub fn apply(
        &self,
        state: &ProgressState,
        event: ProgressEvent,
    ) -> Result<Transition, ProgressError> {
        let mut next = state.clone();
        let mut effects = Vec::new();

        match event {
            ProgressEvent::AddXp(delta) => {
                let before = next.xp;
                let after = next.add_xp(delta);
                if before != after {
                    effects.push(ProgressEffect::XpChanged { before, after });
                }
                self.push_unlocks(&mut next, &mut effects);
                effects.extend(
                    milestones_crossed(before, after, &self.season_milestones, &self.milestones)
                        .into_iter()
                        .map(|m| {
                            log::info!("milestone reached: {} at {} xp", m.reward, m.xp_threshold);
                            ProgressEffect::MilestoneReached {
                                milestone: m.clone(),
                            }
                        }),
                );
            }
            ProgressEvent::RecomputeUnlocks => self.push_unlocks(&mut next, &mut effects),
            ProgressEvent::PlaceSticker(id) => match next.place_sticker(&id)? {
                PlaceOutcome::Placed => effects.push(ProgressEffect::StickerPlaced { id }),
                PlaceOutcome::Locked => effects.push(ProgressEffect::StickerLocked { id }),
            },
            ProgressEvent::ClearPlacedStickers => {
                next.clear_placed_stickers();
                effects.push(ProgressEffect::PlacedStickersCleared);
            }
            ProgressEvent::ToggleAvatarItem(slot) => match next.toggle_avatar_item(slot) {
                ToggleOutcome::Toggled(worn) => {
                    effects.push(ProgressEffect::AvatarToggled { slot, worn });
                }
                ToggleOutcome::Locked => effects.push(ProgressEffect::AvatarLocked { slot }),
            },
            ProgressEvent::SetAvatarColor(part, color) => {
                next.avatar.set_color(part, color);
                effects.push(ProgressEffect::AvatarColorChanged { part });
            }
            ProgressEvent::RecordActivity(today) => {
                let change = next.record_activity(today);
                effects.push(ProgressEffect::StreakChanged {
                    change,
                    streak: next.streak,
                });
            }
            ProgressEvent::AcquireSticker(id) => {
                if next.acquire_sticker(&id)? {
                    effects.push(ProgressEffect::StickerUnlocked { id });
                }
            }
            ProgressEvent::EarnBadge(reward) => {
                let sticker_id = badge_sticker_id(&reward);
                let already_unlocked = next.is_sticker_unlocked(&sticker_id);
                if next.earn_badge(&reward) {
                    effects.push(ProgressEffect::BadgeEarned { reward });
                    if !already_unlocked {
                        effects.push(ProgressEffect::StickerUnlocked { id: sticker_id });
                    }
                }
            }
            ProgressEvent::SyncCatalog => {
                let catalog = self.catalog(&next.badges);
                next.sync_catalog(&catalog);
            }
        }

        Ok(Transition {
            state: next,
            effects,
        })
    }

    fn push_unlocks(&self, state: &mut ProgressState, effects: &mut Vec<ProgressEffect>) {
        let report = state.recompute_unlocks(
            &self.config.sticker_thresholds,
            &self.config.avatar_thresholds,
        );
        effects.extend(
            report
                .stickers
                .into_iter()
                .map(|id| ProgressEffect::StickerUnlocked { id }),
        );
        effects.extend(
            report
                .slots
                .into_iter()
                .map(|slot| ProgressEffect::SlotUnlocked { slot }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_xp_event_reports_unlocks_and_milestones() {
        let engine = ProgressionEngine::default();
        let state = engine.new_progress();
        let transition = engine.apply(&state, ProgressEvent::AddXp(20)).unwrap();

        assert_eq!(transition.state.xp, 20);
        assert!(transition.celebrates());
        assert!(
            transition
                .effects
                .contains(&ProgressEffect::XpChanged { before: 0, after: 20 })
        );
        let rewards: Vec<_> = transition
            .effects
            .iter()
            .filter_map(|e| match e {
                ProgressEffect::MilestoneReached { milestone } => Some(milestone.reward.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(rewards, ["Gold Star", "Builder Hat", "Gear"]);
        assert!(transition.state.avatar.unlocked.hat);
        assert!(!transition.state.avatar.unlocked.goggles);
        assert!(!transition.state.is_sticker_unlocked("s_wrench"));
        // input is untouched
        assert_eq!(state.xp, 0);
    }

    #[test]
    fn negative_xp_never_relocks() {
        let engine = ProgressionEngine::default();
        let up = engine
            .apply(&engine.new_progress(), ProgressEvent::AddXp(30))
            .unwrap();
        let down = engine.apply(&up.state, ProgressEvent::AddXp(-100)).unwrap();
        assert_eq!(down.state.xp, 0);
        assert!(down.state.is_sticker_unlocked("s_heart"));
        assert!(!down.celebrates());
    }

    #[test]
    fn season_file_overrides_milestones() {
        let mut engine = ProgressionEngine::default();
        assert_eq!(engine.next_milestone(12).unwrap().reward, "Builder Hat");
        engine.apply_season_file(&SeasonFile {
            name: Some("Spring".into()),
            milestones: vec![Milestone::new(50, "Trophy")],
        });
        assert_eq!(engine.next_milestone(12).unwrap().reward, "Trophy");
        assert!(engine.next_milestone(50).is_none());
        engine.apply_season_file(&SeasonFile::default());
        assert_eq!(engine.next_milestone(12).unwrap().reward, "Builder Hat");
    }

    #[test]
    fn empty_stored_milestones_restore_default() {
        let mut engine = ProgressionEngine::default();
        engine.set_milestones(vec![Milestone::new(3, "Tiny")]);
        assert_eq!(engine.active_milestones().len(), 1);
        engine.set_milestones(Vec::new());
        assert_eq!(engine.active_milestones().len(), 7);
    }

    #[test]
    fn place_events_distinguish_locked_and_unknown() {
        let engine = ProgressionEngine::default();
        let state = engine.new_progress();
        let locked = engine
            .apply(&state, ProgressEvent::PlaceSticker("s_star".into()))
            .unwrap();
        assert_eq!(
            locked.effects,
            vec![ProgressEffect::StickerLocked { id: "s_star".into() }]
        );
        assert_eq!(locked.state, state);
        assert!(
            engine
                .apply(&state, ProgressEvent::PlaceSticker("s_nope".into()))
                .is_err()
        );
    }

    #[test]
    fn badge_event_grants_sticker_once() {
        let engine = ProgressionEngine::default();
        let state = engine.new_progress();
        let first = engine
            .apply(&state, ProgressEvent::EarnBadge("Spark Scout".into()))
            .unwrap();
        assert_eq!(first.effects.len(), 2);
        assert!(first.state.is_sticker_unlocked("badge_spark_scout"));
        let again = engine
            .apply(&first.state, ProgressEvent::EarnBadge("Spark Scout".into()))
            .unwrap();
        assert!(again.effects.is_empty());
    }

    #[test]
    fn disabled_season_records_nothing() {
        let engine = ProgressionEngine::default();
        let mut season = engine.new_season(day(2025, 3, 1));
        season.enabled = false;
        assert!(engine.record_season_day(&mut season, day(2025, 3, 2)).is_empty());
        assert_eq!(season.streak, 0);
        season.enabled = true;
        engine.record_season_day(&mut season, day(2025, 3, 3));
        assert_eq!(season.streak, 1);
    }

    #[test]
    fn season_day_rolls_over_into_a_new_month() {
        let engine = ProgressionEngine::default();
        let mut season = engine.new_season(day(2025, 1, 31));
        engine.record_season_day(&mut season, day(2025, 1, 31));
        assert_eq!(season.streak, 1);
        engine.record_season_day(&mut season, day(2025, 2, 1));
        assert_eq!(season.id, "2025-02");
        assert_eq!(season.streak, 1);
    }

    #[test]
    fn events_serialize_with_kind_tags() {
        let json = serde_json::to_string(&ProgressEvent::AddXp(5)).unwrap();
        assert_eq!(json, r#"{"kind":"add_xp","value":5}"#);
    }
}
