//! Linear six-step wizard navigation.
//!
//! Navigation is ungated: any in-range index may be selected.
//! Disabling "next" until a checklist is complete is a presentation concern
//! (see `ToolboxSession::next_enabled`).
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::checklist::ChecklistKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("unknown wizard step '{0}'")]
    UnknownStep(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Apprentice,
    Handle,
    Color,
    Stickers,
    Avatar,
    Oath,
}

impl WizardStep {
    pub const ALL: [Self; 6] = [
        Self::Apprentice,
        Self::Handle,
        Self::Color,
        Self::Stickers,
        Self::Avatar,
        Self::Oath,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Apprentice => "apprentice",
            Self::Handle => "handle",
            Self::Color => "color",
            Self::Stickers => "stickers",
            Self::Avatar => "avatar",
            Self::Oath => "oath",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Apprentice => "Apprentice Builder: Focus In",
            Self::Handle => "Finish the Handle",
            Self::Color => "Pick a Color & Paint",
            Self::Stickers => "Sticker Time!",
            Self::Avatar => "Build Your Avatar",
            Self::Oath => "Tool Oath",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The checklist that must be complete before leaving this step, if any.
    #[must_use]
    pub const fn checklist(self) -> Option<ChecklistKind> {
        match self {
            Self::Handle => Some(ChecklistKind::Handle),
            Self::Color => Some(ChecklistKind::Color),
            _ => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WizardStep {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.key() == s)
            .ok_or_else(|| WizardError::UnknownStep(s.to_string()))
    }
}

/// Active step index (`ta_step`), always within `[0, COUNT - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "i64", into = "i64")]
pub struct WizardState {
    active_step: usize,
}

impl WizardState {
    const LAST: usize = WizardStep::COUNT - 1;

    /// Build from a stored index, clamping out-of-range values.
    #[must_use]
    pub fn from_index(index: i64) -> Self {
        let mut state = Self::default();
        state.advance_step(index);
        state
    }

    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active_step
    }

    #[must_use]
    pub const fn active(&self) -> WizardStep {
        WizardStep::ALL[self.active_step]
    }

    /// Jump to `target`, clamped into range. Returns the resulting step.
    pub fn advance_step(&mut self, target: i64) -> WizardStep {
        let last = i64::try_from(Self::LAST).unwrap_or(i64::MAX);
        let clamped = target.clamp(0, last);
        self.active_step = usize::try_from(clamped).unwrap_or(0);
        self.active()
    }

    pub fn next(&mut self) -> WizardStep {
        self.active_step = (self.active_step + 1).min(Self::LAST);
        self.active()
    }

    pub fn back(&mut self) -> WizardStep {
        self.active_step = self.active_step.saturating_sub(1);
        self.active()
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.active_step == 0
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.active_step == Self::LAST
    }

    /// Progress bar fill, 0 at the first step and 100 at the last.
    #[must_use]
    pub fn progress_pct(&self) -> u32 {
        crate::numbers::ratio_pct(self.active_step, Self::LAST)
    }

    /// "Step N / 6" label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Step {} / {}", self.active_step + 1, WizardStep::COUNT)
    }
}

impl From<i64> for WizardState {
    fn from(index: i64) -> Self {
        Self::from_index(index)
    }
}

impl From<WizardState> for i64 {
    fn from(state: WizardState) -> Self {
        Self::try_from(state.active_step).unwrap_or_default()
    }
}
