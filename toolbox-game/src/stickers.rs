//! Sticker catalog: threshold stickers, shop items, badge stickers and rares.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::{BADGE_STICKER_PREFIX, SHOP_KIND_STICKER};

/// A sticker the player owns or can earn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unlocked: bool,
}

impl Sticker {
    #[must_use]
    pub fn locked(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            unlocked: false,
        }
    }
}

/// Base sticker unlocked by reaching an XP threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerThreshold {
    pub id: String,
    pub name: String,
    pub xp: u32,
}

/// Shop listing; only items whose `kind` is `sticker` join the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Rare sticker configured outside the XP ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RareSticker {
    pub id: String,
    pub name: String,
}

/// Identity of a sticker in the merged catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Sticker id derived from a badge name: `badge_` + lowercase, spaces as `_`.
#[must_use]
pub fn badge_sticker_id(badge: &str) -> String {
    format!(
        "{BADGE_STICKER_PREFIX}{}",
        badge.replace(' ', "_").to_lowercase()
    )
}

/// The four catalog sources, listed in merge precedence order.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSources<'a> {
    pub base: &'a [StickerThreshold],
    pub shop: &'a [ShopItem],
    pub badges: &'a [String],
    pub rare: &'a [RareSticker],
}

/// Merge all sticker sources into one catalog.
///
/// Precedence is base, then shop stickers, then badge stickers, then rares.
/// When two sources share an id the earlier one wins.
#[must_use]
pub fn merge_catalog(sources: CatalogSources<'_>) -> Vec<CatalogEntry> {
    let base = sources
        .base
        .iter()
        .map(|s| CatalogEntry::new(&s.id, &s.name));
    let shop = sources
        .shop
        .iter()
        .filter(|item| item.kind == SHOP_KIND_STICKER)
        .map(|item| CatalogEntry::new(&item.id, &item.name));
    let badges = sources
        .badges
        .iter()
        .map(|badge| CatalogEntry::new(badge_sticker_id(badge), badge));
    let rare = sources
        .rare
        .iter()
        .map(|r| CatalogEntry::new(&r.id, &r.name));

    dedupe_by_id(base.chain(shop).chain(badges).chain(rare))
}

/// Keep the first entry for each id, preserving order.
pub fn dedupe_by_id(entries: impl IntoIterator<Item = CatalogEntry>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect()
}
