//! Consecutive-day streak counting shared by progress and seasons.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a recorded day changed a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// The day was already counted (or lies before the last counted day).
    Unchanged,
    /// The day directly follows the last counted day.
    Extended(u32),
    /// First activity ever, or a gap of more than one day.
    Restarted,
}

impl StreakChange {
    #[must_use]
    pub const fn counted(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Apply one day of activity to `(streak, last_date)`.
///
/// Dates earlier than `last_date` are ignored so a clock moved backwards
/// cannot shorten or reset a streak.
pub fn advance_streak(
    streak: &mut u32,
    last_date: &mut Option<NaiveDate>,
    today: NaiveDate,
) -> StreakChange {
    let change = match *last_date {
        Some(last) if today <= last => return StreakChange::Unchanged,
        Some(last) if last.succ_opt() == Some(today) => {
            *streak = streak.saturating_add(1);
            StreakChange::Extended(*streak)
        }
        _ => {
            *streak = 1;
            StreakChange::Restarted
        }
    };
    *last_date = Some(today);
    change
}
