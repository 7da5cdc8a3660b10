//! Progression tuning loaded from `assets/data/progression.json`.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::avatar::AvatarThresholds;
use crate::milestones::Milestone;
use crate::season::SeasonTemplate;
use crate::stickers::{
    CatalogEntry, CatalogSources, RareSticker, ShopItem, StickerThreshold, merge_catalog,
};

const DEFAULT_PROGRESSION_DATA: &str = include_str!("../assets/data/progression.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("progression config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("sticker threshold id '{0}' appears more than once")]
    DuplicateSticker(String),
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("season badge '{reward}' needs at least one day")]
    ZeroDayBadge { reward: String },
}

/// XP granted per workshop action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpRewards {
    #[serde(default = "XpRewards::default_checklist_complete")]
    pub checklist_complete: u32,
    #[serde(default = "XpRewards::default_timer_finished")]
    pub timer_finished: u32,
    #[serde(default = "XpRewards::default_oath_complete")]
    pub oath_complete: u32,
    #[serde(default = "XpRewards::default_daily_activity")]
    pub daily_activity: u32,
}

impl XpRewards {
    #[must_use]
    pub const fn default_checklist_complete() -> u32 {
        5
    }

    #[must_use]
    pub const fn default_timer_finished() -> u32 {
        3
    }

    #[must_use]
    pub const fn default_oath_complete() -> u32 {
        10
    }

    #[must_use]
    pub const fn default_daily_activity() -> u32 {
        2
    }
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            checklist_complete: Self::default_checklist_complete(),
            timer_finished: Self::default_timer_finished(),
            oath_complete: Self::default_oath_complete(),
            daily_activity: Self::default_daily_activity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressionConfig {
    #[serde(default)]
    pub sticker_thresholds: Vec<StickerThreshold>,
    #[serde(default)]
    pub avatar_thresholds: AvatarThresholds,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub season: SeasonTemplate,
    #[serde(default)]
    pub xp_rewards: XpRewards,
    #[serde(default)]
    pub shop: Vec<ShopItem>,
    #[serde(default)]
    pub rare: Vec<RareSticker>,
}

impl ProgressionConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_PROGRESSION_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse and validate a progression config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check catalog and season invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on duplicate sticker ids, an empty ladder or a
    /// badge that requires zero days.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sticker_thresholds.is_empty() {
            return Err(ConfigError::Empty {
                field: "sticker_thresholds",
            });
        }
        let mut seen = HashSet::new();
        for sticker in &self.sticker_thresholds {
            if !seen.insert(sticker.id.as_str()) {
                return Err(ConfigError::DuplicateSticker(sticker.id.clone()));
            }
        }
        if let Some(badge) = self.season.badges.iter().find(|b| b.days == 0) {
            return Err(ConfigError::ZeroDayBadge {
                reward: badge.reward.clone(),
            });
        }
        Ok(())
    }

    /// Full sticker catalog for a player holding `badges`.
    #[must_use]
    pub fn catalog(&self, badges: &[String]) -> Vec<CatalogEntry> {
        merge_catalog(CatalogSources {
            base: &self.sticker_thresholds,
            shop: &self.shop,
            badges,
            rare: &self.rare,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::{BadgeTier, SeasonBadge};

    #[test]
    fn static_config_is_valid() {
        let config = ProgressionConfig::default_config();
        config.validate().unwrap();
        assert_eq!(config.sticker_thresholds.len(), 4);
        assert_eq!(config.avatar_thresholds, AvatarThresholds::default());
        assert_eq!(config.season.name, "Season of Sparks");
        assert_eq!(
            config.season.badges[2],
            SeasonBadge::new(20, "Guardian of Gears", BadgeTier::Gold)
        );
        assert_eq!(config.xp_rewards, XpRewards::default());
    }

    #[test]
    fn duplicate_sticker_ids_are_rejected() {
        let json = r#"{
            "sticker_thresholds": [
                { "id": "s_star", "name": "Star", "xp": 10 },
                { "id": "s_star", "name": "Again", "xp": 20 }
            ]
        }"#;
        let err = ProgressionConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSticker(id) if id == "s_star"));
    }

    #[test]
    fn zero_day_badge_is_rejected() {
        let json = r#"{
            "sticker_thresholds": [{ "id": "s_star", "name": "Star", "xp": 10 }],
            "season": { "name": "Test", "badges": [{ "days": 0, "reward": "Free" }] }
        }"#;
        assert!(matches!(
            ProgressionConfig::from_json(json),
            Err(ConfigError::ZeroDayBadge { .. })
        ));
    }

    #[test]
    fn missing_rewards_fall_back_to_defaults() {
        let json = r#"{
            "sticker_thresholds": [{ "id": "s_star", "name": "Star", "xp": 10 }],
            "xp_rewards": { "oath_complete": 25 }
        }"#;
        let config = ProgressionConfig::from_json(json).unwrap();
        assert_eq!(config.xp_rewards.oath_complete, 25);
        assert_eq!(config.xp_rewards.checklist_complete, 5);
    }

    #[test]
    fn catalog_includes_earned_badges() {
        let config = ProgressionConfig::default_config();
        let catalog = config.catalog(&["Spark Scout".to_string()]);
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog[4].id, "badge_spark_scout");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ProgressionConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
