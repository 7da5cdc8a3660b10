//! Centralized keys and fixed values for Toolbox Adventure logic.
//!
//! Unlock thresholds and rewards live in `assets/data/progression.json`; the
//! values here are the ones that must not drift between builds because stored
//! data and the presentation layer depend on them.

// Storage keys -------------------------------------------------------------
pub const KEY_FOCUS: &str = "ta_focus";
pub const KEY_STEP: &str = "ta_step";
pub const KEY_HANDLE_TYPE: &str = "ta_handleType";
pub const KEY_COLOR: &str = "ta_color";
pub const KEY_COLOR_NAME: &str = "ta_colorName";
pub const KEY_CHECK_HANDLE: &str = "ta_check_handle";
pub const KEY_CHECK_COLOR: &str = "ta_check_color";
pub const KEY_TIMER: &str = "ta_timer";
pub const KEY_TIMER_RUNNING: &str = "ta_timer_run";
pub const KEY_MILESTONES: &str = "ta_milestones";
pub const KEY_SEASON: &str = "ta_season";
pub const KEY_PROGRESS: &str = "ta_progress";

/// Every key the session reads or writes, in load order.
pub const ALL_KEYS: [&str; 12] = [
    KEY_FOCUS,
    KEY_STEP,
    KEY_HANDLE_TYPE,
    KEY_COLOR,
    KEY_COLOR_NAME,
    KEY_CHECK_HANDLE,
    KEY_CHECK_COLOR,
    KEY_TIMER,
    KEY_TIMER_RUNNING,
    KEY_MILESTONES,
    KEY_SEASON,
    KEY_PROGRESS,
];

// Timer --------------------------------------------------------------------
pub const SECS_PER_MINUTE: u32 = 60;
pub const TIMER_DEFAULT_SECS: u32 = 15 * SECS_PER_MINUTE;
pub const TIMER_PRESET_SHORT_SECS: u32 = 15 * SECS_PER_MINUTE;
pub const TIMER_PRESET_LONG_SECS: u32 = 30 * SECS_PER_MINUTE;

// Workshop defaults --------------------------------------------------------
pub const DEFAULT_PAINT_HEX: &str = "#3b82f6";
pub const DEFAULT_PAINT_NAME: &str = "Blue Bolt";
pub const DEFAULT_HAIR_HEX: &str = "#3f2a1d";
pub const DEFAULT_EYES_HEX: &str = "#1f2937";
pub const DEFAULT_SKIN_HEX: &str = "#f1c27d";

// Stickers -----------------------------------------------------------------
pub const BADGE_STICKER_PREFIX: &str = "badge_";
pub const SHOP_KIND_STICKER: &str = "sticker";

// Speech -------------------------------------------------------------------
pub const SPEECH_RATE: f32 = 0.95;
pub const SPEECH_PITCH: f32 = 1.05;
pub const SPEECH_LANG: &str = "en-US";

// Sound --------------------------------------------------------------------
pub const DEFAULT_VOLUME: f32 = 0.3;
