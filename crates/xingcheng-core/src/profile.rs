//! # Profile
//!
//! The persisted player profile, a.k.a. the save blob.
//!
//! Field names serialize in camelCase so a blob written by the browser
//! client loads unchanged. `position` and `distanceWalkedM` are newer
//! fields and default when absent.

use crate::catalog::Catalog;
use crate::geo::Coordinate;
use crate::primitives::{MUSEUM_PREMIUM_LEVEL, STARTING_CURRENCY, STARTING_LEVEL, STARTING_NAME};
use crate::{AchievementId, Item, ItemId};
use serde::{Deserialize, Serialize};

/// A player's persistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub level: u32,
    pub xp: u64,
    pub name: String,
    /// 通宝
    pub currency: u64,
    /// Days checked in at the current city.
    pub residence_days: u32,
    /// Item ids, duplicates allowed, in acquisition order.
    pub inventory: Vec<ItemId>,
    /// Achievement ids in unlock order.
    pub unlocked_achievements: Vec<AchievementId>,
    /// Last known position.
    #[serde(default)]
    pub position: Option<Coordinate>,
    /// Total distance walked, whole meters.
    #[serde(default)]
    pub distance_walked_m: u64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::initial()
    }
}

impl UserProfile {
    /// A fresh profile.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            level: STARTING_LEVEL,
            xp: 0,
            name: STARTING_NAME.to_string(),
            currency: STARTING_CURRENCY,
            residence_days: 0,
            inventory: Vec::new(),
            unlocked_achievements: Vec::new(),
            position: None,
            distance_walked_m: 0,
        }
    }

    /// Whether an achievement has been unlocked.
    #[must_use]
    pub fn has_unlocked(&self, id: &AchievementId) -> bool {
        self.unlocked_achievements.contains(id)
    }

    /// Resolve inventory ids against the catalog, dropping unknown ids.
    #[must_use]
    pub fn items<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Item> {
        self.inventory
            .iter()
            .filter_map(|id| catalog.item(id))
            .collect()
    }

    /// Number of copies of an item held.
    #[must_use]
    pub fn count_of(&self, id: &ItemId) -> usize {
        self.inventory.iter().filter(|i| *i == id).count()
    }

    /// Total market value of the inventory.
    #[must_use]
    pub fn collection_value(&self, catalog: &Catalog) -> u64 {
        self.items(catalog)
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.price))
    }

    /// The museum tab.
    #[must_use]
    pub fn museum_view(&self, catalog: &Catalog) -> MuseumView {
        let premium = self.level >= MUSEUM_PREMIUM_LEVEL;
        let (title, subtitle) = if premium {
            ("私人博物馆".to_string(), "尊贵馆长".to_string())
        } else {
            (
                "个人藏品".to_string(),
                format!(
                    "等级 {} 解锁博物馆外观 (当前: {})",
                    MUSEUM_PREMIUM_LEVEL, self.level
                ),
            )
        };
        MuseumView {
            premium,
            title,
            subtitle,
            items: self.items(catalog).into_iter().cloned().collect(),
        }
    }
}

/// What the museum tab shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuseumView {
    /// Curator appearance unlocked.
    pub premium: bool,
    pub title: String,
    pub subtitle: String,
    pub items: Vec<Item>,
}

impl MuseumView {
    /// Whether the shelves are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
