//! Seeded multi-day builder runs over [`ToolboxSession`].
//!
//! Every visit loads a fresh session from one shared [`MemoryStore`], the way
//! a page reload would, then checks the persisted state against the live one.
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use toolbox_game::constants::ALL_KEYS;
use toolbox_game::{
    AvatarPart, AvatarSlot, ChecklistKind, Cue, FeedbackEvent, HandleType, HexColor,
    KeyValueStore, MemoryStore, PlaceOutcome, ProgressState, ProgressionConfig,
    RecordingFeedback, SeasonState, SilentFeedback, SoundSettings, TimerTick, ToggleOutcome,
    ToolboxSession, WizardState, WizardStep,
};

pub const DEFAULT_SIM_DAYS: u32 = 7;

/// Raw value written over keys a plan marks as corrupt.
pub const CORRUPT_VALUE: &str = "{not json";

const PAINT_SWATCHES: [(&str, &str); 4] = [
    ("#3b82f6", "Blue Bolt"),
    ("#10b981", "Gear Green"),
    ("#f59e0b", "Spark Amber"),
    ("#ef4444", "Hammer Red"),
];

const HAIR_SWATCHES: [&str; 3] = ["#3f2a1d", "#d4a373", "#111827"];

/// How much a simulated builder does on each visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Open the app and leave.
    CheckIn,
    /// Walk every wizard step through to the oath.
    FullWizard,
}

impl Activity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CheckIn => "Check-in",
            Self::FullWizard => "Full wizard",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub days: u32,
    pub start: NaiveDate,
    pub activity: Activity,
    /// Chance that a builder skips a given day.
    pub skip_chance: f64,
    pub sound: SoundSettings,
    pub corrupt_keys: Vec<&'static str>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(activity: Activity) -> Self {
        Self {
            days: DEFAULT_SIM_DAYS,
            start: default_start(),
            activity,
            skip_chance: 0.0,
            sound: SoundSettings::default(),
            corrupt_keys: Vec::new(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    #[must_use]
    pub const fn starting(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_skip_chance(mut self, chance: f64) -> Self {
        self.skip_chance = chance.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub const fn with_sound(mut self, sound: SoundSettings) -> Self {
        self.sound = sound;
        self
    }

    #[must_use]
    pub fn with_corrupt_keys(mut self, keys: &[&'static str]) -> Self {
        self.corrupt_keys.extend_from_slice(keys);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// State observed at the end of one visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRecord {
    pub date: NaiveDate,
    pub xp: u32,
    pub streak: u32,
    pub season_streak: u32,
    pub new_badges: Vec<String>,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub activity: Activity,
    pub days_simulated: u32,
    pub visits: Vec<VisitRecord>,
    pub final_progress: ProgressState,
    pub final_season: SeasonState,
    pub final_wizard: WizardState,
    /// Keys still holding the corrupt marker at the end of the run.
    pub corrupt_keys_left: Vec<String>,
    pub cues: Vec<Cue>,
    pub tones_played: usize,
    pub lines_spoken: usize,
    /// Invariant breaches noticed while running; empty on a healthy run.
    pub violations: Vec<String>,
}

impl SimulationSummary {
    #[must_use]
    pub const fn final_xp(&self) -> u32 {
        self.final_progress.xp
    }

    /// Consecutive visited days ending at the last visit.
    #[must_use]
    pub fn current_run(&self) -> u32 {
        trailing_run(&self.visits, |_| true)
    }

    /// Like [`Self::current_run`] but only counting days in the last visit's month.
    #[must_use]
    pub fn current_month_run(&self) -> u32 {
        let Some(last) = self.visits.last() else {
            return 0;
        };
        let month = (last.date.year(), last.date.month());
        trailing_run(&self.visits, |date| (date.year(), date.month()) == month)
    }

    #[must_use]
    pub fn unlocked_sticker_ids(&self) -> Vec<&str> {
        self.final_progress
            .stickers
            .iter()
            .filter(|s| s.unlocked)
            .map(|s| s.id.as_str())
            .collect()
    }
}

fn trailing_run(visits: &[VisitRecord], include: impl Fn(NaiveDate) -> bool) -> u32 {
    let mut run = 0;
    let mut expected: Option<NaiveDate> = None;
    for visit in visits.iter().rev() {
        if !include(visit.date) {
            break;
        }
        if let Some(expected) = expected
            && visit.date != expected
        {
            break;
        }
        run += 1;
        expected = visit.date.pred_opt();
    }
    run
}

/// Snapshot of monotonic state used to spot regressions between visits.
#[derive(Debug, Clone, Default)]
struct Watermark {
    xp: u32,
    unlocked_stickers: Vec<String>,
    unlocked_slots: Vec<AvatarSlot>,
}

impl Watermark {
    fn capture(progress: &ProgressState) -> Self {
        Self {
            xp: progress.xp,
            unlocked_stickers: progress
                .stickers
                .iter()
                .filter(|s| s.unlocked)
                .map(|s| s.id.clone())
                .collect(),
            unlocked_slots: AvatarSlot::ALL
                .into_iter()
                .filter(|slot| progress.avatar.unlocked.is_unlocked(*slot))
                .collect(),
        }
    }
}

type SimSession = ToolboxSession<MemoryStore, RecordingFeedback>;

/// Headless deterministic runner for builder visits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator {
    verbose: bool,
}

impl Simulator {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let store = MemoryStore::new();
        let feedback = RecordingFeedback::new(plan.sound);
        let mut violations = Vec::new();

        for key in &plan.corrupt_keys {
            if let Err(err) = store.set_item(key, CORRUPT_VALUE) {
                log::warn!("could not corrupt {key}: {err}");
            }
        }

        let mut visits = Vec::new();
        let mut watermark = Watermark::default();
        let mut last_session: Option<SimSession> = None;

        for offset in 0..plan.days {
            let Some(date) = plan.start.checked_add_days(Days::new(u64::from(offset))) else {
                violations.push(format!("day offset {offset} overflows the calendar"));
                break;
            };
            if plan.skip_chance > 0.0 && rng.gen_bool(plan.skip_chance) {
                log::debug!("seed {seed}: builder skipped {date}");
                continue;
            }

            let mut session = ToolboxSession::load(
                store.clone(),
                feedback.clone(),
                ProgressionConfig::default_config(),
            );
            let report = session.begin_day(date);
            if plan.activity == Activity::FullWizard {
                walk_wizard(&mut session, &mut rng, date, &mut violations);
            }

            let visit_number = u32::try_from(visits.len() + 1).unwrap_or(u32::MAX);
            check_invariants(&session, &watermark, date, visit_number, &mut violations);
            check_reload(&session, &store, date, &mut violations);
            watermark = Watermark::capture(session.progress());

            let record = VisitRecord {
                date,
                xp: session.progress().xp,
                streak: session.progress().streak,
                season_streak: session.season().streak,
                new_badges: report.badges.iter().map(|b| b.reward.clone()).collect(),
            };
            if self.verbose {
                println!(
                    "    {date}: xp {} streak {} season {} badges {:?}",
                    record.xp, record.streak, record.season_streak, record.new_badges
                );
            }
            visits.push(record);
            last_session = Some(session);
        }

        let final_session = last_session.unwrap_or_else(|| {
            ToolboxSession::load(
                store.clone(),
                feedback.clone(),
                ProgressionConfig::default_config(),
            )
        });

        let events = feedback.events();
        SimulationSummary {
            seed,
            activity: plan.activity,
            days_simulated: plan.days,
            visits,
            final_progress: final_session.progress().clone(),
            final_season: final_session.season().clone(),
            final_wizard: *final_session.wizard(),
            corrupt_keys_left: store
                .keys()
                .into_iter()
                .filter(|key| store.raw(key).as_deref() == Some(CORRUPT_VALUE))
                .collect(),
            cues: feedback.cues(),
            tones_played: events
                .iter()
                .filter(|e| matches!(e, FeedbackEvent::Tone(_)))
                .count(),
            lines_spoken: feedback.spoken().len(),
            violations,
        }
    }
}

fn walk_wizard(
    session: &mut SimSession,
    rng: &mut ChaCha20Rng,
    date: NaiveDate,
    violations: &mut Vec<String>,
) {
    session.go_to_step(0);
    session.set_focus_mode(rng.gen_bool(0.5));
    session.read_apprentice_speech();
    session.next_step();

    if let Some(handle) = HandleType::ALL.choose(rng) {
        session.set_handle_type(*handle);
    }
    complete_checklist(session, ChecklistKind::Handle, date, violations);
    advance_expecting(session, WizardStep::Color, date, violations);

    if let Some((hex, name)) = PAINT_SWATCHES.choose(rng)
        && let Ok(color) = HexColor::parse(hex)
    {
        session.set_paint_color(color);
        session.set_paint_name(*name);
    }
    complete_checklist(session, ChecklistKind::Color, date, violations);
    run_drying_timer(session, date, violations);
    advance_expecting(session, WizardStep::Stickers, date, violations);

    place_random_sticker(session, rng, date, violations);
    advance_expecting(session, WizardStep::Avatar, date, violations);

    if let Some(slot) = AvatarSlot::ALL.choose(rng) {
        let unlocked = session.progress().avatar.unlocked.is_unlocked(*slot);
        let outcome = session.toggle_avatar_item(*slot);
        if unlocked == (outcome == ToggleOutcome::Locked) {
            violations.push(format!(
                "{date}: toggling {} gave {outcome:?} with unlocked={unlocked}",
                slot.key()
            ));
        }
    }
    if let Some(hex) = HAIR_SWATCHES.choose(rng)
        && let Ok(color) = HexColor::parse(hex)
    {
        session.set_avatar_color(AvatarPart::Hair, color);
    }
    advance_expecting(session, WizardStep::Oath, date, violations);

    session.read_oath();
    let already_sworn = session.oath_complete();
    if session.complete_oath() == already_sworn {
        violations.push(format!(
            "{date}: oath reward repeated or refused (already sworn: {already_sworn})"
        ));
    }
    if session.next_enabled() {
        violations.push(format!("{date}: next is enabled on the last step"));
    }
}

fn complete_checklist(
    session: &mut SimSession,
    kind: ChecklistKind,
    date: NaiveDate,
    violations: &mut Vec<String>,
) {
    let pending: Vec<String> = session
        .checklist(kind)
        .items()
        .iter()
        .filter(|item| !item.done)
        .map(|item| item.id.clone())
        .collect();
    for id in pending {
        if let Err(err) = session.set_check(kind, &id, true) {
            violations.push(format!("{date}: {kind:?} checklist rejected '{id}': {err}"));
        }
    }
    if !session.next_enabled() {
        violations.push(format!("{date}: {kind:?} complete but next is disabled"));
    }
}

fn run_drying_timer(session: &mut SimSession, date: NaiveDate, violations: &mut Vec<String>) {
    session.set_timer_minutes(1);
    if !session.timer().running {
        session.toggle_timer();
    }
    let budget = session.timer().remaining_secs + 1;
    let finished = (0..budget).any(|_| session.tick_timer() == TimerTick::Finished);
    if !finished {
        violations.push(format!("{date}: drying timer never finished"));
    }
    if session.timer().running {
        violations.push(format!("{date}: drying timer still running after finishing"));
    }
}

fn place_random_sticker(
    session: &mut SimSession,
    rng: &mut ChaCha20Rng,
    date: NaiveDate,
    violations: &mut Vec<String>,
) {
    if rng.gen_bool(0.2) {
        session.clear_placed_stickers();
    }
    let unlocked: Vec<String> = session
        .progress()
        .stickers
        .iter()
        .filter(|s| s.unlocked)
        .map(|s| s.id.clone())
        .collect();
    let Some(id) = unlocked.choose(rng) else {
        return;
    };
    match session.place_sticker(id) {
        Ok(PlaceOutcome::Placed) => {}
        Ok(PlaceOutcome::Locked) => {
            violations.push(format!("{date}: unlocked sticker {id} refused placement"));
        }
        Err(err) => violations.push(format!("{date}: placing {id} failed: {err}")),
    }
}

fn advance_expecting(
    session: &mut SimSession,
    expected: WizardStep,
    date: NaiveDate,
    violations: &mut Vec<String>,
) {
    let step = session.next_step();
    if step != expected {
        violations.push(format!("{date}: wizard moved to {step} instead of {expected}"));
    }
}

fn check_invariants(
    session: &SimSession,
    before: &Watermark,
    date: NaiveDate,
    visits: u32,
    violations: &mut Vec<String>,
) {
    let progress = session.progress();
    let after = Watermark::capture(progress);

    if after.xp < before.xp {
        violations.push(format!("{date}: xp fell from {} to {}", before.xp, after.xp));
    }
    for id in &before.unlocked_stickers {
        if !after.unlocked_stickers.contains(id) {
            violations.push(format!("{date}: sticker {id} was re-locked"));
        }
    }
    for slot in &before.unlocked_slots {
        if !after.unlocked_slots.contains(slot) {
            violations.push(format!("{date}: avatar slot {} was re-locked", slot.key()));
        }
    }
    for threshold in &session.engine().config().sticker_thresholds {
        if progress.xp >= threshold.xp && !progress.is_sticker_unlocked(&threshold.id) {
            violations.push(format!(
                "{date}: {} still locked at {} xp",
                threshold.id, progress.xp
            ));
        }
    }
    for placed in &progress.placed_stickers {
        if !progress.is_sticker_unlocked(placed) {
            violations.push(format!("{date}: locked sticker {placed} is placed"));
        }
    }
    if progress.streak > visits || session.season().streak > visits {
        violations.push(format!(
            "{date}: streaks {}/{} exceed {visits} visits",
            progress.streak,
            session.season().streak
        ));
    }
    let mut earned = session.season().earned.clone();
    earned.sort();
    earned.dedup();
    if earned.len() != session.season().earned.len() {
        violations.push(format!("{date}: a season badge was earned twice"));
    }
    for key in session.store().keys() {
        if !ALL_KEYS.contains(&key.as_str()) {
            violations.push(format!("{date}: unexpected storage key {key}"));
        }
    }
}

fn check_reload(
    session: &SimSession,
    store: &MemoryStore,
    date: NaiveDate,
    violations: &mut Vec<String>,
) {
    let reloaded = ToolboxSession::load(
        store.clone(),
        SilentFeedback,
        ProgressionConfig::default_config(),
    );
    if reloaded.progress() != session.progress() {
        violations.push(format!("{date}: reloaded progress differs from live progress"));
    }
    if reloaded.season() != session.season() {
        violations.push(format!("{date}: reloaded season differs from live season"));
    }
    if reloaded.wizard() != session.wizard() {
        violations.push(format!("{date}: reloaded wizard step differs"));
    }
    if reloaded.timer() != session.timer() {
        violations.push(format!("{date}: reloaded drying timer differs"));
    }
    for kind in [ChecklistKind::Handle, ChecklistKind::Color] {
        if reloaded.checklist(kind) != session.checklist(kind) {
            violations.push(format!("{date}: reloaded {kind:?} checklist differs"));
        }
    }
}
