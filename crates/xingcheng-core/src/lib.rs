//! # Xingcheng Core
//!
//! The rules engine for Xingcheng (行成), a location-based exploration game.
//!
//! A player walks around a real map. Proximity to coded coordinates, timed
//! excavations and weighted rarity rolls unlock collectible items and
//! achievements. This crate owns those rules and nothing else: no rendering,
//! no network, no async.
//!
//! ## Layout
//!
//! - [`progression`]: level formula
//! - [`geo`]: coordinates, Haversine distance, lore seeds
//! - [`catalog`]: item and achievement databases
//! - [`achievements`]: unlock evaluation
//! - [`excavation`]: timed dig + weighted rarity roll
//! - [`lore`]: seeded location lore
//! - [`profile`]: the persisted player profile
//! - [`session`]: the action surface, emitting [`GameEvent`]s
//! - [`report`]: action reports for CLI and API output
//! - [`formats`] / [`storage`]: save blob encodings and profile stores

pub mod achievements;
pub mod catalog;
pub mod config;
pub mod excavation;
pub mod formats;
pub mod geo;
pub mod lore;
pub mod primitives;
pub mod profile;
pub mod progression;
pub mod report;
pub mod session;
pub mod storage;

pub use catalog::{Achievement, AchievementTrigger, Catalog, MarketFilter};
pub use config::GameConfig;
pub use excavation::{Excavation, ExcavationOutcome, ExcavationProgress, RarityTable};
pub use geo::Coordinate;
pub use profile::{MuseumView, UserProfile};
pub use report::Report;
pub use session::{GameEvent, GameSession, WalkProgress};
pub use storage::{JsonFileStore, ProfileStore, RedbStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors produced by the rules engine and its persistence layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coordinate outside the valid latitude/longitude range.
    #[error("invalid coordinate: lat {lat}, lng {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// Item id not present in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Rarity name could not be parsed.
    #[error("unknown rarity: {0}")]
    UnknownRarity(String),

    /// Purchase attempted without enough currency.
    #[error("insufficient currency: need {needed}, have {available}")]
    InsufficientCurrency { needed: u64, available: u64 },

    /// An excavation is already running.
    #[error("excavation already in progress ({remaining}s remaining)")]
    ExcavationInProgress { remaining: u32 },

    /// Rarity table has no positive weight.
    #[error("rarity table has zero total weight")]
    EmptyRarityTable,

    /// Canonical export header did not match.
    #[error("invalid save header")]
    InvalidHeader,

    /// Canonical export was written by an unsupported format version.
    #[error("unsupported save version: {0}")]
    UnsupportedVersion(u8),

    /// Binary encoding failed.
    #[error("binary encoding error: {0}")]
    Binary(#[from] postcard::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedded database failure.
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// RARITY
// =============================================================================

/// Collectible rarity tier, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers in ascending order.
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Display label shown to players.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "凡品",
            Rarity::Rare => "精品",
            Rarity::Epic => "珍宝",
            Rarity::Legendary => "传世",
        }
    }

    /// Lowercase identifier, as used in save blobs and query strings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            other => Err(CoreError::UnknownRarity(other.to_string())),
        }
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Artifact,
    Beast,
    Resource,
}

impl ItemType {
    /// Display label shown to players.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ItemType::Artifact => "文物",
            ItemType::Beast => "瑞兽",
            ItemType::Resource => "资源",
        }
    }
}

/// Stable identifier of an item in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create an item id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of an achievement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(pub String);

impl AchievementId {
    /// Create an achievement id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A collectible item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    /// Emoji icon.
    pub icon: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub rarity: Rarity,
    /// Market price in 通宝.
    pub price: u64,
}

// =============================================================================
// TESTS
// =============================================================================
