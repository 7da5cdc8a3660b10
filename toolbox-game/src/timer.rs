//! Paint drying countdown.
//!
//! The timer does not schedule itself: the presentation layer calls
//! [`DryingTimer::tick`] once per second while it wants the clock to run.
use serde::{Deserialize, Serialize};

use crate::constants::{
    SECS_PER_MINUTE, TIMER_DEFAULT_SECS, TIMER_PRESET_LONG_SECS, TIMER_PRESET_SHORT_SECS,
};
use crate::numbers::clamp_i64_to_u32;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Timer is paused; nothing changed.
    Idle,
    /// One second elapsed; this many remain.
    Running(u32),
    /// The countdown just reached zero and the timer stopped.
    Finished,
}

/// Quick-set durations offered next to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPreset {
    Short,
    Long,
}

impl TimerPreset {
    #[must_use]
    pub const fn secs(self) -> u32 {
        match self {
            Self::Short => TIMER_PRESET_SHORT_SECS,
            Self::Long => TIMER_PRESET_LONG_SECS,
        }
    }
}

/// Remaining seconds (`ta_timer`) and running flag (`ta_timer_run`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryingTimer {
    pub remaining_secs: u32,
    pub running: bool,
}

impl Default for DryingTimer {
    fn default() -> Self {
        Self {
            remaining_secs: TIMER_DEFAULT_SECS,
            running: false,
        }
    }
}

impl DryingTimer {
    #[must_use]
    pub const fn new(remaining_secs: u32, running: bool) -> Self {
        Self {
            remaining_secs,
            running,
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero while running stops the timer and reports `Finished`
    /// exactly once; later ticks are `Idle`.
    pub fn tick(&mut self) -> TimerTick {
        if !self.running {
            return TimerTick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            log::debug!("drying timer finished");
            return TimerTick::Finished;
        }
        TimerTick::Running(self.remaining_secs)
    }

    /// Start or pause. Returns the new running flag.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Set the remaining time in whole minutes; negative input clamps to zero.
    pub fn set_minutes(&mut self, minutes: i64) {
        let secs = minutes.saturating_mul(i64::from(SECS_PER_MINUTE));
        self.remaining_secs = clamp_i64_to_u32(secs);
    }

    pub fn apply_preset(&mut self, preset: TimerPreset) {
        self.remaining_secs = preset.secs();
    }

    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.remaining_secs / SECS_PER_MINUTE
    }

    /// `MM:SS`, minutes zero-padded to at least two digits.
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / SECS_PER_MINUTE,
            self.remaining_secs % SECS_PER_MINUTE
        )
    }
}
