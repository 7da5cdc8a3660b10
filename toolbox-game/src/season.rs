//! Monthly seasons: a calendar-month streak with tiered badges.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::milestones::Milestone;
use crate::streak::{StreakChange, advance_streak};

/// Badge rarity; drives the badge color in the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    #[default]
    #[serde(other)]
    Special,
}

impl BadgeTier {
    #[must_use]
    pub const fn color_hex(self) -> &'static str {
        match self {
            Self::Gold => "#f59e0b",
            Self::Silver => "#9ca3af",
            Self::Bronze => "#b45309",
            Self::Special => "#10b981",
        }
    }
}

/// Streak length required for a named reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonBadge {
    pub days: u32,
    pub reward: String,
    #[serde(default)]
    pub tier: BadgeTier,
}

impl SeasonBadge {
    #[must_use]
    pub fn new(days: u32, reward: impl Into<String>, tier: BadgeTier) -> Self {
        Self {
            days,
            reward: reward.into(),
            tier,
        }
    }
}

/// Static season settings from `progression.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SeasonTemplate {
    pub name: String,
    #[serde(default)]
    pub badges: Vec<SeasonBadge>,
}

/// Optional season file; a non-empty milestone list overrides the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SeasonFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl SeasonFile {
    /// Parse a season file.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a season file.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Persisted season progress (`ta_season`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonState {
    /// Calendar month this season covers, `YYYY-MM`. Empty until first rollover.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
    #[serde(default)]
    pub badges_cfg: Vec<SeasonBadge>,
    #[serde(default)]
    pub earned: Vec<String>,
}

const fn default_enabled() -> bool {
    true
}

impl Default for SeasonState {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            enabled: true,
            streak: 0,
            last_date: None,
            badges_cfg: Vec::new(),
            earned: Vec::new(),
        }
    }
}

/// `YYYY-MM` identifier for the month containing `date`.
#[must_use]
pub fn month_id(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

impl SeasonState {
    /// A season not yet tied to a month; the first `roll_over` starts it.
    #[must_use]
    pub fn unstarted(template: &SeasonTemplate) -> Self {
        Self {
            name: template.name.clone(),
            badges_cfg: template.badges.clone(),
            ..Self::default()
        }
    }

    /// A fresh season for the month containing `today`.
    #[must_use]
    pub fn for_month(today: NaiveDate, template: &SeasonTemplate) -> Self {
        Self {
            id: month_id(today),
            ..Self::unstarted(template)
        }
    }

    /// Start a new season when `today` falls outside the current month.
    ///
    /// Name, enabled flag and badge settings carry over; streak and earned
    /// badges start from zero. Returns `true` when a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        let current = month_id(today);
        if self.id == current {
            return false;
        }
        log::info!("season rollover {} -> {current}", self.id);
        self.id = current;
        self.streak = 0;
        self.last_date = None;
        self.earned.clear();
        true
    }

    #[must_use]
    pub fn has_earned(&self, reward: &str) -> bool {
        self.earned.iter().any(|r| r == reward)
    }

    /// Record activity for `today`; see [`record_daily_activity`].
    pub fn record_daily_activity(&mut self, today: NaiveDate) -> Vec<SeasonBadge> {
        record_daily_activity(self, today)
    }

    /// Badge settings sorted by required days, ties in configured order.
    #[must_use]
    pub fn badges_by_days(&self) -> Vec<&SeasonBadge> {
        let mut sorted: Vec<&SeasonBadge> = self.badges_cfg.iter().collect();
        sorted.sort_by_key(|b| b.days);
        sorted
    }
}

/// Count `today` toward the season streak and award any badges now due.
///
/// A repeated day is a no-op, the following day extends the streak and a gap
/// restarts it at one. Badges are checked in ascending `days` order and each
/// reward is appended to `earned` at most once. Returns the newly earned badges.
pub fn record_daily_activity(season: &mut SeasonState, today: NaiveDate) -> Vec<SeasonBadge> {
    let change = advance_streak(&mut season.streak, &mut season.last_date, today);
    if change == StreakChange::Unchanged {
        return Vec::new();
    }

    let mut newly_earned = Vec::new();
    for badge in season.badges_by_days() {
        if season.streak >= badge.days && !season.has_earned(&badge.reward) {
            newly_earned.push(badge.clone());
        }
    }
    for badge in &newly_earned {
        log::info!(
            "season badge earned: {} ({} days)",
            badge.reward,
            badge.days
        );
        season.earned.push(badge.reward.clone());
    }
    newly_earned
}
