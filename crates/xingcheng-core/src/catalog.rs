//! # Catalog
//!
//! The item and achievement databases.
//!
//! Items are keyed in a `BTreeMap` so every listing (market, rarity pools)
//! comes out in the same order on every run. Achievements keep their
//! declaration order, which is also the order unlocks are evaluated in.

use crate::geo::Coordinate;
use crate::primitives::HOMETOWN_RESIDENCE_DAYS;
use crate::{AchievementId, CoreError, Item, ItemId, ItemType, Rarity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// =============================================================================
// ACHIEVEMENTS
// =============================================================================

/// What causes an achievement to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementTrigger {
    /// Unlocks on the first achievement check of a profile.
    FirstLaunch,
    /// Unlocks when the player stands within `radius_m` of `target`.
    Location { target: Coordinate, radius_m: u32 },
    /// Unlocks once the player has checked in for `days` days.
    Residence { days: u32 },
}

/// An achievement definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub trigger: AchievementTrigger,
    pub rarity: Rarity,
    pub reward_item: Option<ItemId>,
    pub reward_xp: u64,
}

// =============================================================================
// MARKET FILTER
// =============================================================================

/// Market listing filter: everything, or a single rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketFilter {
    #[default]
    All,
    Only(Rarity),
}

impl FromStr for MarketFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(MarketFilter::All)
        } else {
            s.parse().map(MarketFilter::Only)
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Item and achievement databases.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: BTreeMap<ItemId, Item>,
    achievements: Vec<Achievement>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Build a catalog from explicit contents.
    #[must_use]
    pub fn new(items: Vec<Item>, achievements: Vec<Achievement>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
            achievements,
        }
    }

    /// The shipped game content.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(standard_items(), standard_achievements())
    }

    /// Look up an item.
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Look up an item, failing on unknown ids.
    pub fn require_item(&self, id: &ItemId) -> Result<&Item, CoreError> {
        self.item(id)
            .ok_or_else(|| CoreError::UnknownItem(id.to_string()))
    }

    /// All items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items of one rarity, in id order.
    #[must_use]
    pub fn items_of_rarity(&self, rarity: Rarity) -> Vec<&Item> {
        self.items.values().filter(|i| i.rarity == rarity).collect()
    }

    /// Market listing under a filter.
    #[must_use]
    pub fn market(&self, filter: MarketFilter) -> Vec<&Item> {
        match filter {
            MarketFilter::All => self.items.values().collect(),
            MarketFilter::Only(rarity) => self.items_of_rarity(rarity),
        }
    }

    /// All achievements in evaluation order.
    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Look up an achievement.
    #[must_use]
    pub fn achievement(&self, id: &AchievementId) -> Option<&Achievement> {
        self.achievements.iter().find(|a| &a.id == id)
    }

    /// Number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// SHIPPED CONTENT
// =============================================================================

fn item(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    item_type: ItemType,
    rarity: Rarity,
    price: u64,
) -> Item {
    Item {
        id: ItemId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        item_type,
        rarity,
        price,
    }
}

fn standard_items() -> Vec<Item> {
    use ItemType::{Artifact, Beast};
    use Rarity::{Common, Epic, Legendary, Rare};

    vec![
        // 凡品
        item(
            "clay_shard",
            "古陶碎片",
            "一块普通的陶器碎片，依稀可见当年的纹路。",
            "🏺",
            Artifact,
            Common,
            10,
        ),
        item("iron_coin", "生锈铁钱", "宋代的铁钱，已经锈迹斑斑。", "🪙", Artifact, Common, 15),
        // 精品
        item(
            "bronze_mirror",
            "海兽葡萄镜",
            "唐代铜镜，背面铸有瑞兽与葡萄纹。",
            "🪞",
            Artifact,
            Rare,
            200,
        ),
        item("pixiu", "玉貔貅", "招财进宝的瑞兽，温润如脂。", "🦁", Beast, Rare, 500),
        // 珍宝
        item(
            "blue_white_bowl",
            "青花瓷碗",
            "色白花青，胎质细腻，明代民窑精品。",
            "🥣",
            Artifact,
            Epic,
            2_000,
        ),
        item(
            "spirit_fox",
            "九尾灵狐",
            "传说中的灵兽，不仅长寿，更能魅惑人心。",
            "🦊",
            Beast,
            Epic,
            3_500,
        ),
        // 传世
        item(
            "gujian_sword",
            "越王勾践剑",
            "天下第一剑，历经千年不锈，锋利无比。",
            "⚔️",
            Artifact,
            Legendary,
            50_000,
        ),
        item(
            "jade_dragon",
            "红山玉龙",
            "中华第一龙，见证了文明的曙光。",
            "🐉",
            Beast,
            Legendary,
            45_000,
        ),
    ]
}

fn standard_achievements() -> Vec<Achievement> {
    vec![
        Achievement {
            id: AchievementId::new("first_steps"),
            title: "初入江湖".to_string(),
            description: "第一次开启「行成」。".to_string(),
            trigger: AchievementTrigger::FirstLaunch,
            rarity: Rarity::Common,
            reward_item: None,
            reward_xp: 50,
        },
        Achievement {
            id: AchievementId::new("forbidden_city"),
            title: "皇城根儿".to_string(),
            description: "造访紫禁城坐标，感受帝王之气。".to_string(),
            trigger: AchievementTrigger::Location {
                target: Coordinate::forbidden_city(),
                radius_m: 600,
            },
            rarity: Rarity::Epic,
            reward_item: Some(ItemId::new("jade_dragon")),
            reward_xp: 1_000,
        },
        Achievement {
            id: AchievementId::new("hometown"),
            title: "故乡".to_string(),
            description: "在一座城市定居超过 5 年 (模拟)。".to_string(),
            trigger: AchievementTrigger::Residence {
                days: HOMETOWN_RESIDENCE_DAYS,
            },
            rarity: Rarity::Legendary,
            reward_item: None,
            reward_xp: 5_000,
        },
        Achievement {
            id: AchievementId::new("olympic_walker"),
            title: "奥林匹克".to_string(),
            description: "造访奥林匹克公园。".to_string(),
            trigger: AchievementTrigger::Location {
                target: Coordinate {
                    lat: 40.00,
                    lng: 116.39,
                },
                radius_m: 1_000,
            },
            rarity: Rarity::Rare,
            reward_item: Some(ItemId::new("bronze_mirror")),
            reward_xp: 300,
        },
    ]
}

// =============================================================================
// TESTS
// =============================================================================
