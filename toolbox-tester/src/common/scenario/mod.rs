use anyhow::{Result, ensure};
use chrono::NaiveDate;
use toolbox_game::constants::{
    ALL_KEYS, KEY_CHECK_HANDLE, KEY_PROGRESS, KEY_SEASON, KEY_STEP, KEY_TIMER,
};
use toolbox_game::{AvatarSlot, Cue, ProgressionConfig, SoundSettings, WizardStep};

use crate::logic::{Activity, SimulationPlan, SimulationSummary};

/// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(!summary.visits.is_empty(), "builder should visit at least once");
    ensure!(summary.final_xp() > 0, "a visit should earn XP");
    ensure!(
        summary.final_wizard.active() == WizardStep::Oath,
        "wizard should end on the oath step, found {}",
        summary.final_wizard.active()
    );
    ensure!(
        summary.cues.first() == Some(&Cue::Dawn),
        "first cue should greet the day"
    );
    Ok(())
}

fn unlock_ladder_expectation(summary: &SimulationSummary) -> Result<()> {
    let config = ProgressionConfig::default_config();
    let unlocked = summary.unlocked_sticker_ids();
    for threshold in &config.sticker_thresholds {
        ensure!(
            unlocked.contains(&threshold.id.as_str()),
            "{} should be unlocked at {} xp",
            threshold.id,
            summary.final_xp()
        );
    }
    for slot in AvatarSlot::ALL {
        ensure!(
            summary.final_progress.avatar.unlocked.is_unlocked(slot),
            "{} should be unlocked at {} xp",
            slot.key(),
            summary.final_xp()
        );
    }
    let first_day = summary
        .visits
        .first()
        .map(|v| v.xp)
        .unwrap_or_default();
    let rewards = &config.xp_rewards;
    let expected = rewards.daily_activity
        + 2 * rewards.checklist_complete
        + rewards.timer_finished
        + rewards.oath_complete;
    ensure!(
        first_day == expected,
        "first full visit should earn {expected} xp, earned {first_day}"
    );
    Ok(())
}

fn streak_season_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.final_progress.streak == summary.days_simulated,
        "unbroken visits should give a {} day streak, got {}",
        summary.days_simulated,
        summary.final_progress.streak
    );
    ensure!(
        summary.final_season.id == "2025-02",
        "season should have rolled into February, found {}",
        summary.final_season.id
    );
    ensure!(
        summary.final_season.earned == ["Spark Scout", "Workshop Warden"],
        "February badges were {:?}",
        summary.final_season.earned
    );
    ensure!(
        summary.final_progress.badges.len() == 3,
        "progress should keep each badge once, found {:?}",
        summary.final_progress.badges
    );
    ensure!(
        summary.final_xp() == 2 * summary.days_simulated,
        "check-ins should earn only the daily reward, found {} xp",
        summary.final_xp()
    );
    Ok(())
}

fn gap_days_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.visits.len() < summary.days_simulated as usize,
        "builder should have skipped at least one day"
    );
    ensure!(
        summary.final_progress.streak == summary.current_run(),
        "streak {} should match the trailing run {}",
        summary.final_progress.streak,
        summary.current_run()
    );
    ensure!(
        summary.final_season.streak == summary.current_month_run(),
        "season streak {} should match this month's run {}",
        summary.final_season.streak,
        summary.current_month_run()
    );
    Ok(())
}

fn muted_sound_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.tones_played == 0,
        "muted sound still played {} tones",
        summary.tones_played
    );
    ensure!(!summary.cues.is_empty(), "cues should still be requested");
    ensure!(
        summary.lines_spoken >= 3 * summary.visits.len(),
        "speech should continue while muted, heard {} lines",
        summary.lines_spoken
    );
    Ok(())
}

fn corrupt_storage_expectation(summary: &SimulationSummary) -> Result<()> {
    let first_day = summary
        .visits
        .first()
        .map(|v| v.xp)
        .unwrap_or_default();
    ensure!(
        first_day == 25,
        "a corrupt store should start from scratch, first visit reached {first_day} xp"
    );
    for key in [KEY_PROGRESS, KEY_SEASON, KEY_STEP, KEY_CHECK_HANDLE, KEY_TIMER] {
        ensure!(
            !summary.corrupt_keys_left.iter().any(|k| k == key),
            "{key} should be rewritten after a full visit"
        );
    }
    Ok(())
}

fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(
        "Smoke Test",
        SimulationPlan::new(Activity::FullWizard)
            .with_days(3)
            .with_expectation(smoke_expectation),
    )
}

fn unlock_ladder_scenario() -> TestScenario {
    TestScenario::simulation(
        "Unlock Ladder",
        SimulationPlan::new(Activity::FullWizard)
            .with_days(4)
            .with_expectation(unlock_ladder_expectation),
    )
}

fn streak_season_scenario() -> TestScenario {
    TestScenario::simulation(
        "Streak Across Seasons",
        SimulationPlan::new(Activity::CheckIn)
            .with_days(45)
            .starting(date(2025, 1, 1))
            .with_expectation(streak_season_expectation),
    )
}

fn gap_days_scenario() -> TestScenario {
    TestScenario::simulation(
        "Streak With Gaps",
        SimulationPlan::new(Activity::CheckIn)
            .with_days(40)
            .starting(date(2025, 3, 1))
            .with_skip_chance(0.35)
            .with_expectation(gap_days_expectation),
    )
}

fn muted_sound_scenario() -> TestScenario {
    TestScenario::simulation(
        "Muted Sound",
        SimulationPlan::new(Activity::FullWizard)
            .with_days(2)
            .with_sound(SoundSettings::new(false, 0.3))
            .with_expectation(muted_sound_expectation),
    )
}

fn corrupt_storage_scenario() -> TestScenario {
    TestScenario::simulation(
        "Corrupt Storage",
        SimulationPlan::new(Activity::FullWizard)
            .with_days(3)
            .with_corrupt_keys(&ALL_KEYS)
            .with_expectation(corrupt_storage_expectation),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "unlock-ladder" | "unlocks" => Some(unlock_ladder_scenario()),
        "streak-season" | "seasons" => Some(streak_season_scenario()),
        "gap-days" | "gaps" => Some(gap_days_scenario()),
        "muted-sound" | "muted" => Some(muted_sound_scenario()),
        "corrupt-storage" | "corrupt" => Some(corrupt_storage_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("unlock-ladder", "Unlock Ladder"),
        ("streak-season", "Streak Across Seasons"),
        ("gap-days", "Streak With Gaps"),
        ("muted-sound", "Muted Sound"),
        ("corrupt-storage", "Corrupt Storage"),
    ]
}
