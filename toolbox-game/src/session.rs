//! Session orchestrator binding the engine to storage and feedback.
//!
//! A [`ToolboxSession`] owns one engine, every piece of workshop state and the
//! two injected adapters. Each mutation writes back only the storage keys it
//! touched and routes its side effects through [`Feedback`].
use chrono::NaiveDate;
use serde::Serialize;

use crate::avatar::{AvatarPart, AvatarSlot};
use crate::checklist::{Checklist, ChecklistError, ChecklistKind};
use crate::color::HexColor;
use crate::config::ProgressionConfig;
use crate::constants::{
    KEY_CHECK_COLOR, KEY_CHECK_HANDLE, KEY_COLOR, KEY_COLOR_NAME, KEY_FOCUS, KEY_HANDLE_TYPE,
    KEY_MILESTONES, KEY_PROGRESS, KEY_SEASON, KEY_STEP, KEY_TIMER, KEY_TIMER_RUNNING,
};
use crate::engine::{ProgressEffect, ProgressEvent, ProgressionEngine};
use crate::feedback::{Cue, Feedback, Utterance};
use crate::milestones::Milestone;
use crate::progress::{PlaceOutcome, ProgressError, ProgressState, ToggleOutcome};
use crate::season::{SeasonBadge, SeasonFile, SeasonState, month_id};
use crate::storage::{KeyValueStore, load_or_default, save_value};
use crate::timer::{DryingTimer, TimerPreset, TimerTick};
use crate::wizard::{WizardState, WizardStep};
use crate::workshop::{HandleType, WorkshopPrefs, WorkshopScript};

/// What [`ToolboxSession::begin_day`] changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DayReport {
    /// `today` extended or restarted the all-time streak.
    pub new_day: bool,
    pub streak: u32,
    pub season_rolled_over: bool,
    pub season_streak: u32,
    pub badges: Vec<SeasonBadge>,
    pub effects: Vec<ProgressEffect>,
}

/// One builder's workshop: state, engine and adapters.
pub struct ToolboxSession<S: KeyValueStore, F: Feedback> {
    engine: ProgressionEngine,
    script: WorkshopScript,
    store: S,
    feedback: F,
    progress: ProgressState,
    season: SeasonState,
    prefs: WorkshopPrefs,
    wizard: WizardState,
    handle_checklist: Checklist,
    color_checklist: Checklist,
    timer: DryingTimer,
}

impl<S: KeyValueStore, F: Feedback> ToolboxSession<S, F> {
    /// Rehydrate a session from `store` using the bundled workshop script.
    ///
    /// Missing or undecodable keys fall back to their defaults.
    #[must_use]
    pub fn load(store: S, feedback: F, config: ProgressionConfig) -> Self {
        Self::load_with_script(store, feedback, config, WorkshopScript::default_config())
    }

    #[must_use]
    pub fn load_with_script(
        store: S,
        feedback: F,
        config: ProgressionConfig,
        script: WorkshopScript,
    ) -> Self {
        let mut engine = ProgressionEngine::new(config);

        let default_prefs = WorkshopPrefs::default();
        let prefs = WorkshopPrefs {
            focus_mode: load_or_default(&store, KEY_FOCUS, || default_prefs.focus_mode),
            handle_type: load_or_default(&store, KEY_HANDLE_TYPE, HandleType::default),
            paint_color: load_or_default(&store, KEY_COLOR, || default_prefs.paint_color.clone()),
            paint_name: load_or_default(&store, KEY_COLOR_NAME, || {
                default_prefs.paint_name.clone()
            }),
        };
        let wizard: WizardState = load_or_default(&store, KEY_STEP, WizardState::default);
        let handle_checklist = load_or_default(&store, KEY_CHECK_HANDLE, || {
            script.checklist(ChecklistKind::Handle)
        });
        let color_checklist = load_or_default(&store, KEY_CHECK_COLOR, || {
            script.checklist(ChecklistKind::Color)
        });
        let default_timer = DryingTimer::default();
        let timer = DryingTimer::new(
            load_or_default(&store, KEY_TIMER, || default_timer.remaining_secs),
            load_or_default(&store, KEY_TIMER_RUNNING, || default_timer.running),
        );
        let milestones: Vec<Milestone> =
            load_or_default(&store, KEY_MILESTONES, || engine.config().milestones.clone());
        engine.set_milestones(milestones);
        let season = load_or_default(&store, KEY_SEASON, || {
            SeasonState::unstarted(&engine.config().season)
        });
        let mut progress = load_or_default(&store, KEY_PROGRESS, || engine.new_progress());

        let duplicates = progress.dedupe_stickers();
        if duplicates > 0 {
            log::warn!("dropped {duplicates} duplicate sticker(s) from stored progress");
        }
        let catalog = engine.catalog(&progress.badges);
        progress.sync_catalog(&catalog);
        progress.recompute_unlocks(
            &engine.config().sticker_thresholds,
            &engine.config().avatar_thresholds,
        );

        // A checklist already complete in storage has been paid.
        for (kind, list) in [
            (ChecklistKind::Handle, &handle_checklist),
            (ChecklistKind::Color, &color_checklist),
        ] {
            if !list.is_empty() && list.is_complete() {
                progress.mark_checklist_rewarded(kind);
            }
        }

        log::debug!(
            "session loaded: step {}, xp {}, season {}",
            wizard.active_index(),
            progress.xp,
            season.id
        );

        Self {
            engine,
            script,
            store,
            feedback,
            progress,
            season,
            prefs,
            wizard,
            handle_checklist,
            color_checklist,
            timer,
        }
    }

    // Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    #[must_use]
    pub const fn script(&self) -> &WorkshopScript {
        &self.script
    }

    #[must_use]
    pub const fn progress(&self) -> &ProgressState {
        &self.progress
    }

    #[must_use]
    pub const fn season(&self) -> &SeasonState {
        &self.season
    }

    #[must_use]
    pub const fn prefs(&self) -> &WorkshopPrefs {
        &self.prefs
    }

    #[must_use]
    pub const fn wizard(&self) -> &WizardState {
        &self.wizard
    }

    #[must_use]
    pub const fn timer(&self) -> &DryingTimer {
        &self.timer
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn feedback(&self) -> &F {
        &self.feedback
    }

    pub const fn feedback_mut(&mut self) -> &mut F {
        &mut self.feedback
    }

    #[must_use]
    pub const fn checklist(&self, kind: ChecklistKind) -> &Checklist {
        match kind {
            ChecklistKind::Handle => &self.handle_checklist,
            ChecklistKind::Color => &self.color_checklist,
        }
    }

    #[must_use]
    pub const fn oath_complete(&self) -> bool {
        self.progress.oath_rewarded
    }

    #[must_use]
    pub fn next_milestone(&self) -> Option<&Milestone> {
        self.engine.next_milestone(self.progress.xp)
    }

    /// Whether the presentation layer should enable "next" on the current step.
    ///
    /// Steps with a checklist require it complete; the last step has no next.
    /// Navigation itself never checks this.
    #[must_use]
    pub fn next_enabled(&self) -> bool {
        if self.wizard.is_last() {
            return false;
        }
        self.wizard
            .active()
            .checklist()
            .is_none_or(|kind| self.checklist(kind).is_complete())
    }

    // Days and seasons ----------------------------------------------------

    /// Count `today` as an active day for progress and the season.
    ///
    /// Rolls the season into a new month when needed, awards the daily XP on
    /// a new day, records newly earned badges with their stickers and plays
    /// the dawn cue.
    pub fn begin_day(&mut self, today: NaiveDate) -> DayReport {
        let season_before = self.season.clone();
        let season_rolled_over = self.season.id != month_id(today);
        let badges = self.engine.record_season_day(&mut self.season, today);

        let progress_before = self.progress.clone();
        let mut effects = self.dispatch_logged(ProgressEvent::RecordActivity(today));
        let new_day = effects.iter().any(|effect| {
            matches!(effect, ProgressEffect::StreakChanged { change, .. } if change.counted())
        });
        if new_day {
            let reward = i64::from(self.engine.config().xp_rewards.daily_activity);
            effects.extend(self.dispatch_logged(ProgressEvent::AddXp(reward)));
        }
        for badge in &badges {
            effects.extend(self.dispatch_logged(ProgressEvent::EarnBadge(badge.reward.clone())));
        }

        if self.season != season_before {
            self.persist(KEY_SEASON, &self.season);
        }
        if self.progress != progress_before {
            self.persist(KEY_PROGRESS, &self.progress);
        }
        if new_day {
            log::info!("new active day {today}: streak {}", self.progress.streak);
            self.feedback.cue(Cue::Dawn);
        }
        self.celebrate(&effects);

        DayReport {
            new_day,
            streak: self.progress.streak,
            season_rolled_over,
            season_streak: self.season.streak,
            badges,
            effects,
        }
    }

    pub fn set_season_enabled(&mut self, enabled: bool) {
        if self.season.enabled != enabled {
            self.season.enabled = enabled;
            self.persist(KEY_SEASON, &self.season);
        }
    }

    /// Install a season file; its milestones override the stored list.
    pub fn load_season_file(&mut self, file: &SeasonFile) {
        self.engine.apply_season_file(file);
        if let Some(name) = &file.name {
            if self.season.name != *name {
                self.season.name.clone_from(name);
                self.persist(KEY_SEASON, &self.season);
            }
        }
    }

    /// Replace the stored milestone list.
    pub fn set_milestones(&mut self, milestones: Vec<Milestone>) {
        self.engine.set_milestones(milestones);
        self.persist(KEY_MILESTONES, self.engine.milestones());
    }

    // XP ------------------------------------------------------------------

    /// Apply an XP delta, recompute unlocks and celebrate anything new.
    pub fn add_xp(&mut self, delta: i64) -> Vec<ProgressEffect> {
        let effects = self.dispatch_logged(ProgressEvent::AddXp(delta));
        if !effects.is_empty() {
            self.persist(KEY_PROGRESS, &self.progress);
        }
        self.celebrate(&effects);
        effects
    }

    fn award(&mut self, amount: u32) -> Vec<ProgressEffect> {
        self.add_xp(i64::from(amount))
    }

    // Checklists ------------------------------------------------------------

    /// Mark a checklist item. The first time a checklist turns complete it
    /// awards XP; the returned effects describe that award.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::UnknownItem` if the checklist has no such item.
    pub fn set_check(
        &mut self,
        kind: ChecklistKind,
        id: &str,
        done: bool,
    ) -> Result<Vec<ProgressEffect>, ChecklistError> {
        self.checklist_mut(kind).set_done(id, done)?;
        self.persist_checklist(kind);

        if self.checklist(kind).is_complete() && self.progress.mark_checklist_rewarded(kind) {
            log::info!("{kind:?} checklist complete");
            self.persist(KEY_PROGRESS, &self.progress);
            return Ok(self.award(self.engine.config().xp_rewards.checklist_complete));
        }
        Ok(Vec::new())
    }

    pub fn reset_checklist(&mut self, kind: ChecklistKind) {
        self.checklist_mut(kind).reset();
        self.persist_checklist(kind);
    }

    fn checklist_mut(&mut self, kind: ChecklistKind) -> &mut Checklist {
        match kind {
            ChecklistKind::Handle => &mut self.handle_checklist,
            ChecklistKind::Color => &mut self.color_checklist,
        }
    }

    fn persist_checklist(&self, kind: ChecklistKind) {
        match kind {
            ChecklistKind::Handle => self.persist(KEY_CHECK_HANDLE, &self.handle_checklist),
            ChecklistKind::Color => self.persist(KEY_CHECK_COLOR, &self.color_checklist),
        }
    }

    // Drying timer ----------------------------------------------------------

    /// Advance the drying timer by one second.
    pub fn tick_timer(&mut self) -> TimerTick {
        let tick = self.timer.tick();
        match tick {
            TimerTick::Idle => {}
            TimerTick::Running(_) => self.persist(KEY_TIMER, &self.timer.remaining_secs),
            TimerTick::Finished => {
                self.persist(KEY_TIMER, &self.timer.remaining_secs);
                self.persist(KEY_TIMER_RUNNING, &self.timer.running);
                let line = self.script.timer_complete_line.clone();
                self.feedback.speak(&Utterance::new(line));
                self.award(self.engine.config().xp_rewards.timer_finished);
            }
        }
        tick
    }

    pub fn toggle_timer(&mut self) -> bool {
        let running = self.timer.toggle();
        self.persist(KEY_TIMER_RUNNING, &running);
        running
    }

    pub fn set_timer_minutes(&mut self, minutes: i64) {
        self.timer.set_minutes(minutes);
        self.persist(KEY_TIMER, &self.timer.remaining_secs);
    }

    pub fn apply_timer_preset(&mut self, preset: TimerPreset) {
        self.timer.apply_preset(preset);
        self.persist(KEY_TIMER, &self.timer.remaining_secs);
    }

    // Stickers --------------------------------------------------------------

    /// Put a sticker on the box; plays the clink cue when placed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownSticker` for ids not in the sticker list.
    pub fn place_sticker(&mut self, id: &str) -> Result<PlaceOutcome, ProgressError> {
        let effects = self.dispatch(ProgressEvent::PlaceSticker(id.to_string()))?;
        let placed = effects
            .iter()
            .any(|e| matches!(e, ProgressEffect::StickerPlaced { .. }));
        if placed {
            self.persist(KEY_PROGRESS, &self.progress);
            self.feedback.cue(Cue::Clink);
            Ok(PlaceOutcome::Placed)
        } else {
            Ok(PlaceOutcome::Locked)
        }
    }

    pub fn clear_placed_stickers(&mut self) {
        if self.progress.placed_stickers.is_empty() {
            return;
        }
        self.dispatch_logged(ProgressEvent::ClearPlacedStickers);
        self.persist(KEY_PROGRESS, &self.progress);
    }

    /// Unlock a shop, rare or badge sticker directly.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownSticker` for ids not in the sticker list.
    pub fn acquire_sticker(&mut self, id: &str) -> Result<bool, ProgressError> {
        let effects = self.dispatch(ProgressEvent::AcquireSticker(id.to_string()))?;
        let newly = !effects.is_empty();
        if newly {
            self.persist(KEY_PROGRESS, &self.progress);
        }
        self.celebrate(&effects);
        Ok(newly)
    }

    // Avatar ----------------------------------------------------------------

    pub fn toggle_avatar_item(&mut self, slot: AvatarSlot) -> ToggleOutcome {
        let effects = self.dispatch_logged(ProgressEvent::ToggleAvatarItem(slot));
        let worn = effects.iter().find_map(|effect| match effect {
            ProgressEffect::AvatarToggled { worn, .. } => Some(*worn),
            _ => None,
        });
        match worn {
            Some(worn) => {
                self.persist(KEY_PROGRESS, &self.progress);
                ToggleOutcome::Toggled(worn)
            }
            None => ToggleOutcome::Locked,
        }
    }

    pub fn set_avatar_color(&mut self, part: AvatarPart, color: HexColor) {
        self.dispatch_logged(ProgressEvent::SetAvatarColor(part, color));
        self.persist(KEY_PROGRESS, &self.progress);
    }

    // Wizard navigation -----------------------------------------------------

    pub fn go_to_step(&mut self, target: i64) -> WizardStep {
        let step = self.wizard.advance_step(target);
        self.persist(KEY_STEP, &self.wizard);
        step
    }

    pub fn next_step(&mut self) -> WizardStep {
        let step = self.wizard.next();
        self.persist(KEY_STEP, &self.wizard);
        step
    }

    pub fn back_step(&mut self) -> WizardStep {
        let step = self.wizard.back();
        self.persist(KEY_STEP, &self.wizard);
        step
    }

    // Oath and read-aloud ---------------------------------------------------

    /// Mark the tool oath complete. XP and the level-up line are granted once.
    ///
    /// Returns `false` if the oath was already complete.
    pub fn complete_oath(&mut self) -> bool {
        if !self.progress.mark_oath_rewarded() {
            return false;
        }
        self.persist(KEY_PROGRESS, &self.progress);
        let line = self.script.oath_complete_line.clone();
        self.feedback.speak(&Utterance::new(line));
        self.award(self.engine.config().xp_rewards.oath_complete);
        true
    }

    pub fn read_apprentice_speech(&mut self) {
        let text = self.script.apprentice_speech.clone();
        self.feedback.speak(&Utterance::new(text));
    }

    pub fn read_oath(&mut self) {
        let text = self.script.tool_oath.clone();
        self.feedback.speak(&Utterance::new(text));
    }

    // Preferences -----------------------------------------------------------

    pub fn set_focus_mode(&mut self, on: bool) {
        self.prefs.focus_mode = on;
        self.persist(KEY_FOCUS, &on);
    }

    pub fn set_handle_type(&mut self, handle: HandleType) {
        self.prefs.handle_type = handle;
        self.persist(KEY_HANDLE_TYPE, &handle);
    }

    pub fn set_paint_color(&mut self, color: HexColor) {
        self.persist(KEY_COLOR, &color);
        self.prefs.paint_color = color;
    }

    pub fn set_paint_name(&mut self, name: impl Into<String>) {
        self.prefs.paint_name = name.into();
        self.persist(KEY_COLOR_NAME, &self.prefs.paint_name);
    }

    // Internals -------------------------------------------------------------

    fn dispatch(&mut self, event: ProgressEvent) -> Result<Vec<ProgressEffect>, ProgressError> {
        let transition = self.engine.apply(&self.progress, event)?;
        self.progress = transition.state;
        Ok(transition.effects)
    }

    fn dispatch_logged(&mut self, event: ProgressEvent) -> Vec<ProgressEffect> {
        self.dispatch(event).unwrap_or_else(|err| {
            log::warn!("progress event rejected: {err}");
            Vec::new()
        })
    }

    fn celebrate(&mut self, effects: &[ProgressEffect]) {
        if effects.iter().any(ProgressEffect::is_celebration) {
            self.feedback.cue(Cue::Ding);
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        save_value(&self.store, key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ALL_KEYS;
    use crate::feedback::{FeedbackEvent, RecordingFeedback};
    use crate::storage::MemoryStore;

    type TestSession = ToolboxSession<MemoryStore, RecordingFeedback>;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn fresh() -> (TestSession, MemoryStore, RecordingFeedback) {
        let store = MemoryStore::new();
        let feedback = RecordingFeedback::default();
        let session = ToolboxSession::load(
            store.clone(),
            feedback.clone(),
            ProgressionConfig::default_config(),
        );
        (session, store, feedback)
    }

    #[test]
    fn loading_an_empty_store_writes_nothing() {
        let (session, store, _) = fresh();
        assert!(store.is_empty());
        assert_eq!(session.wizard().active(), WizardStep::Apprentice);
        assert_eq!(session.timer().display(), "15:00");
        assert_eq!(session.progress().stickers.len(), 4);
        assert_eq!(session.checklist(ChecklistKind::Handle).len(), 4);
        assert_eq!(session.next_milestone().unwrap().reward, "Gold Star");
    }

    #[test]
    fn navigation_persists_only_the_step_key() {
        let (mut session, store, _) = fresh();
        assert_eq!(session.go_to_step(99), WizardStep::Oath);
        assert_eq!(store.keys(), vec![KEY_STEP]);
        assert_eq!(store.raw(KEY_STEP).as_deref(), Some("5"));
        assert_eq!(session.back_step(), WizardStep::Avatar);
        assert_eq!(session.go_to_step(-3), WizardStep::Apprentice);
    }

    #[test]
    fn next_is_gated_by_checklist_but_not_enforced() {
        let (mut session, _, _) = fresh();
        assert!(session.next_enabled());
        session.go_to_step(1);
        assert!(!session.next_enabled());
        assert_eq!(session.next_step(), WizardStep::Color);
        for item in ["mark", "pilot", "attach", "test"] {
            session.set_check(ChecklistKind::Handle, item, true).unwrap();
        }
        session.back_step();
        assert!(session.next_enabled());
    }

    #[test]
    fn completing_a_checklist_awards_xp_once() {
        let (mut session, store, _) = fresh();
        let mut effects = Vec::new();
        for item in ["mark", "pilot", "attach", "test"] {
            effects = session.set_check(ChecklistKind::Handle, item, true).unwrap();
        }
        assert!(!effects.is_empty());
        assert_eq!(session.progress().xp, 5);

        session.set_check(ChecklistKind::Handle, "test", false).unwrap();
        let again = session.set_check(ChecklistKind::Handle, "test", true).unwrap();
        assert!(again.is_empty());
        assert_eq!(session.progress().xp, 5);
        assert!(store.raw(KEY_CHECK_HANDLE).is_some());
        assert!(store.raw(KEY_CHECK_COLOR).is_none());

        assert!(matches!(
            session.set_check(ChecklistKind::Color, "glitter", true),
            Err(ChecklistError::UnknownItem(_))
        ));
    }

    fn reload(store: &MemoryStore) -> TestSession {
        ToolboxSession::load(
            store.clone(),
            RecordingFeedback::default(),
            ProgressionConfig::default_config(),
        )
    }

    #[test]
    fn checklist_reward_is_not_paid_again_after_reload() {
        let (mut session, store, _) = fresh();
        for _ in 0..4 {
            for item in ["mark", "pilot", "attach", "test"] {
                session.set_check(ChecklistKind::Handle, item, true).unwrap();
            }
            session.reset_checklist(ChecklistKind::Handle);
            session = reload(&store);
        }
        assert_eq!(session.progress().xp, 5);
        assert_eq!(
            session.progress().rewarded_checklists,
            vec![ChecklistKind::Handle]
        );
    }

    #[test]
    fn complete_checklist_from_older_record_counts_as_paid() {
        let store = MemoryStore::new();
        let done = r#"[{"id":"mark","text":"Mark the spot","done":true}]"#;
        store.set_item(KEY_CHECK_HANDLE, done).unwrap();
        let mut session = reload(&store);
        assert!(session.checklist(ChecklistKind::Handle).is_complete());
        assert_eq!(
            session.progress().rewarded_checklists,
            vec![ChecklistKind::Handle]
        );
        let effects = session.set_check(ChecklistKind::Handle, "mark", true).unwrap();
        assert!(effects.is_empty());
        assert_eq!(session.progress().xp, 0);
    }

    #[test]
    fn timer_finish_speaks_and_awards_once() {
        let (mut session, store, feedback) = fresh();
        session.set_timer_minutes(0);
        assert!(session.toggle_timer());
        assert_eq!(session.tick_timer(), TimerTick::Finished);
        assert_eq!(session.tick_timer(), TimerTick::Idle);
        assert_eq!(
            feedback.spoken(),
            vec!["Timer complete. Nice patience, builder."]
        );
        assert_eq!(session.progress().xp, 3);
        assert_eq!(store.raw(KEY_TIMER_RUNNING).as_deref(), Some("false"));
    }

    #[test]
    fn placing_stickers_clinks_and_locked_is_silent() {
        let (mut session, _, feedback) = fresh();
        assert_eq!(session.place_sticker("s_star"), Ok(PlaceOutcome::Locked));
        assert!(feedback.cues().is_empty());

        session.add_xp(10);
        assert_eq!(feedback.cues(), vec![Cue::Ding]);
        assert_eq!(session.place_sticker("s_star"), Ok(PlaceOutcome::Placed));
        assert_eq!(feedback.cues(), vec![Cue::Ding, Cue::Clink]);
        assert_eq!(session.progress().placed_stickers, vec!["s_star"]);
        session.clear_placed_stickers();
        assert!(session.progress().placed_stickers.is_empty());
        assert!(session.place_sticker("s_ghost").is_err());
    }

    #[test]
    fn begin_day_tracks_streaks_and_badges() {
        let (mut session, store, feedback) = fresh();
        let first = session.begin_day(day(3, 1));
        assert!(first.new_day);
        assert!(first.season_rolled_over);
        assert_eq!(session.season().id, "2025-03");
        assert_eq!(session.progress().xp, 2);
        assert_eq!(feedback.cues(), vec![Cue::Dawn]);

        let repeat = session.begin_day(day(3, 1));
        assert!(!repeat.new_day);
        assert_eq!(session.progress().xp, 2);

        for d in 2..=5 {
            session.begin_day(day(3, d));
        }
        assert_eq!(session.season().streak, 5);
        assert_eq!(session.season().earned, vec!["Spark Scout"]);
        assert_eq!(session.progress().badges, vec!["Spark Scout"]);
        assert!(session.progress().is_sticker_unlocked("badge_spark_scout"));
        assert!(store.raw(KEY_SEASON).is_some());
        assert!(store.raw(KEY_PROGRESS).is_some());
    }

    #[test]
    fn disabled_season_still_counts_progress_days() {
        let (mut session, _, _) = fresh();
        session.set_season_enabled(false);
        let report = session.begin_day(day(4, 1));
        assert!(report.new_day);
        assert_eq!(report.season_streak, 0);
        assert_eq!(report.streak, 1);
    }

    #[test]
    fn oath_completes_once() {
        let (mut session, _, feedback) = fresh();
        assert!(session.complete_oath());
        assert!(!session.complete_oath());
        assert_eq!(session.progress().xp, 10);
        assert_eq!(
            feedback.spoken(),
            vec!["Oath complete! Apprentice leveled up."]
        );
        assert!(session.oath_complete());
    }

    #[test]
    fn oath_is_not_paid_again_after_reload() {
        let (mut session, store, _) = fresh();
        assert!(session.complete_oath());
        for _ in 0..4 {
            session = reload(&store);
            assert!(session.oath_complete());
            assert!(!session.complete_oath());
        }
        assert_eq!(session.progress().xp, 10);
    }

    #[test]
    fn read_aloud_uses_script_text() {
        let (mut session, _, feedback) = fresh();
        session.read_apprentice_speech();
        session.read_oath();
        let spoken = feedback.spoken();
        assert!(spoken[0].starts_with("Apprentice, welcome back"));
        assert!(spoken[1].starts_with("I will treat my tools"));
        assert!(matches!(
            &feedback.events()[0],
            FeedbackEvent::Spoke(u) if u.lang == "en-US"
        ));
    }

    #[test]
    fn avatar_toggle_needs_unlock() {
        let (mut session, store, _) = fresh();
        assert_eq!(
            session.toggle_avatar_item(AvatarSlot::Hat),
            ToggleOutcome::Locked
        );
        assert!(store.raw(KEY_PROGRESS).is_none());
        session.add_xp(15);
        assert_eq!(
            session.toggle_avatar_item(AvatarSlot::Hat),
            ToggleOutcome::Toggled(true)
        );
        session.set_avatar_color(AvatarPart::Hair, HexColor::parse("#AABBCC").unwrap());
        assert_eq!(session.progress().avatar.hair.as_str(), "#aabbcc");
        assert!(reload(&store).progress().avatar.hat);
    }

    #[test]
    fn duplicate_stored_stickers_are_dropped_on_load() {
        let store = MemoryStore::new();
        store
            .set_item(
                KEY_PROGRESS,
                r#"{"xp":0,"stickers":[
                    {"id":"s_star","name":"Gold Star","unlocked":true},
                    {"id":"s_star","name":"Gold Star","unlocked":false},
                    {"id":"s_star","name":"Gold Star","unlocked":false}
                ]}"#,
            )
            .unwrap();
        let session = reload(&store);
        let stars = session
            .progress()
            .stickers
            .iter()
            .filter(|s| s.id == "s_star")
            .count();
        assert_eq!(stars, 1);
        assert!(session.progress().is_sticker_unlocked("s_star"));
    }

    #[test]
    fn state_survives_reload() {
        let (mut session, store, _) = fresh();
        session.set_focus_mode(true);
        session.set_handle_type(HandleType::Wood);
        session.set_paint_color(HexColor::parse("#ff8800").unwrap());
        session.set_paint_name("Sunset");
        session.go_to_step(3);
        session.add_xp(26);
        session.set_milestones(vec![Milestone::new(100, "Master")]);

        let reloaded = ToolboxSession::load(
            store.clone(),
            RecordingFeedback::default(),
            ProgressionConfig::default_config(),
        );
        assert!(reloaded.prefs().focus_mode);
        assert_eq!(reloaded.prefs().handle_type, HandleType::Wood);
        assert_eq!(reloaded.prefs().paint_color.as_str(), "#ff8800");
        assert_eq!(reloaded.prefs().paint_name, "Sunset");
        assert_eq!(reloaded.wizard().active(), WizardStep::Stickers);
        assert_eq!(reloaded.progress().xp, 26);
        assert!(reloaded.progress().avatar.unlocked.goggles);
        assert_eq!(reloaded.next_milestone().unwrap().reward, "Master");
        for key in store.keys() {
            assert!(ALL_KEYS.contains(&key.as_str()));
        }
    }

    #[test]
    fn corrupt_keys_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store.set_item(KEY_PROGRESS, "[[[").unwrap();
        store.set_item(KEY_COLOR, "\"blue\"").unwrap();
        store.set_item(KEY_STEP, "\"two\"").unwrap();
        store.set_item(KEY_HANDLE_TYPE, "\"plastic\"").unwrap();
        let session = ToolboxSession::load(
            store,
            RecordingFeedback::default(),
            ProgressionConfig::default_config(),
        );
        assert_eq!(session.progress().xp, 0);
        assert_eq!(session.prefs().paint_color.as_str(), "#3b82f6");
        assert_eq!(session.wizard().active_index(), 0);
        assert_eq!(session.prefs().handle_type, HandleType::Rope);
    }

    #[test]
    fn season_file_name_and_milestones_apply() {
        let (mut session, _, _) = fresh();
        session.load_season_file(&SeasonFile {
            name: Some("Season of Saws".into()),
            milestones: vec![Milestone::new(7, "Saw Blade")],
        });
        assert_eq!(session.season().name, "Season of Saws");
        assert_eq!(session.next_milestone().unwrap().reward, "Saw Blade");
    }
}
