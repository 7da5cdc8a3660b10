//! Toolbox Adventure Game Engine
//!
//! Platform-agnostic progression logic for the Toolbox Adventure workshop
//! wizard. This crate provides XP, unlocks, streaks and seasons, plus the
//! session that persists them, without UI or platform-specific dependencies.
//! Storage and audio/speech are reached only through the [`KeyValueStore`]
//! and [`Feedback`] traits.

pub mod avatar;
pub mod checklist;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod feedback;
pub mod milestones;
pub mod numbers;
pub mod progress;
pub mod season;
pub mod session;
pub mod stickers;
pub mod storage;
pub mod streak;
pub mod timer;
pub mod wizard;
pub mod workshop;

// Re-export commonly used types
pub use avatar::{Avatar, AvatarPart, AvatarSlot, AvatarThresholds, AvatarUnlocks};
pub use checklist::{Checklist, ChecklistError, ChecklistItem, ChecklistKind};
pub use color::{ColorError, HexColor};
pub use config::{ConfigError, ProgressionConfig, XpRewards};
pub use engine::{ProgressEffect, ProgressEvent, ProgressionEngine, Transition};
pub use feedback::{
    Cue, Feedback, FeedbackEvent, RecordingFeedback, SilentFeedback, SoundSettings, Tone,
    Utterance, Waveform,
};
pub use milestones::{Milestone, milestones_crossed, next_milestone};
pub use progress::{PlaceOutcome, ProgressError, ProgressState, ToggleOutcome, UnlockReport};
pub use season::{
    BadgeTier, SeasonBadge, SeasonFile, SeasonState, SeasonTemplate, month_id,
    record_daily_activity,
};
pub use session::{DayReport, ToolboxSession};
pub use stickers::{
    CatalogEntry, CatalogSources, RareSticker, ShopItem, Sticker, StickerThreshold,
    badge_sticker_id, merge_catalog,
};
pub use storage::{KeyValueStore, MemoryStore, MemoryStoreError};
pub use streak::{StreakChange, advance_streak};
pub use timer::{DryingTimer, TimerPreset, TimerTick};
pub use wizard::{WizardError, WizardState, WizardStep};
pub use workshop::{HandleType, WorkshopError, WorkshopPrefs, WorkshopScript};
