//! Workshop script text, default checklists and builder preferences.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::checklist::{Checklist, ChecklistItem, ChecklistKind};
use crate::color::HexColor;
use crate::constants::{DEFAULT_PAINT_HEX, DEFAULT_PAINT_NAME};

const DEFAULT_WORKSHOP_DATA: &str = include_str!("../assets/data/workshop.json");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkshopError {
    #[error("unknown handle type '{0}'")]
    UnknownHandle(String),
}

/// Material used for the toolbox handle (`ta_handleType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandleType {
    #[default]
    Rope,
    Metal,
    Wood,
}

impl HandleType {
    pub const ALL: [Self; 3] = [Self::Rope, Self::Metal, Self::Wood];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Rope => "rope",
            Self::Metal => "metal",
            Self::Wood => "wood",
        }
    }
}

impl fmt::Display for HandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for HandleType {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.key() == s)
            .ok_or_else(|| WorkshopError::UnknownHandle(s.to_string()))
    }
}

/// Builder preferences; each field maps to its own storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopPrefs {
    pub focus_mode: bool,
    pub handle_type: HandleType,
    pub paint_color: HexColor,
    pub paint_name: String,
}

impl Default for WorkshopPrefs {
    fn default() -> Self {
        Self {
            focus_mode: false,
            handle_type: HandleType::default(),
            paint_color: HexColor::from_static(DEFAULT_PAINT_HEX),
            paint_name: DEFAULT_PAINT_NAME.to_string(),
        }
    }
}

/// Spoken lines and starting checklists from `workshop.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkshopScript {
    #[serde(default)]
    pub apprentice_speech: String,
    #[serde(default)]
    pub tool_oath: String,
    #[serde(default)]
    pub timer_complete_line: String,
    #[serde(default)]
    pub oath_complete_line: String,
    #[serde(default)]
    pub handle_checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub color_checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub care_ritual: Vec<String>,
}

impl WorkshopScript {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_WORKSHOP_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse a workshop script.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the script layout.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Fresh copy of a starting checklist, every item undone.
    #[must_use]
    pub fn checklist(&self, kind: ChecklistKind) -> Checklist {
        let items = match kind {
            ChecklistKind::Handle => &self.handle_checklist,
            ChecklistKind::Color => &self.color_checklist,
        };
        let mut list = Checklist::new(items.clone());
        list.reset();
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_script_has_both_checklists() {
        let script = WorkshopScript::default_config();
        let handle = script.checklist(ChecklistKind::Handle);
        let ids: Vec<_> = handle.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["mark", "pilot", "attach", "test"]);
        let color = script.checklist(ChecklistKind::Color);
        assert_eq!(color.len(), 5);
        assert_eq!(color.completed_count(), 0);
        assert_eq!(
            script.timer_complete_line,
            "Timer complete. Nice patience, builder."
        );
        assert!(!script.tool_oath.is_empty());
        assert_eq!(script.care_ritual.len(), 4);
    }

    #[test]
    fn handle_type_parses_known_materials() {
        assert_eq!("wood".parse::<HandleType>().unwrap(), HandleType::Wood);
        assert_eq!(
            "plastic".parse::<HandleType>(),
            Err(WorkshopError::UnknownHandle("plastic".to_string()))
        );
        assert_eq!(serde_json::to_string(&HandleType::Metal).unwrap(), "\"metal\"");
    }

    #[test]
    fn prefs_default_to_blue_bolt_rope() {
        let prefs = WorkshopPrefs::default();
        assert!(!prefs.focus_mode);
        assert_eq!(prefs.handle_type, HandleType::Rope);
        assert_eq!(prefs.paint_color.as_str(), "#3b82f6");
        assert_eq!(prefs.paint_name, "Blue Bolt");
    }

    #[test]
    fn script_tolerates_missing_fields() {
        let script = WorkshopScript::from_json(r#"{ "tool_oath": "Be kind." }"#).unwrap();
        assert_eq!(script.tool_oath, "Be kind.");
        assert!(script.checklist(ChecklistKind::Handle).is_empty());
    }
}
