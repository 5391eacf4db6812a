//! # Game Configuration
//!
//! Tunable rules. `Default` reproduces the shipped game; a JSON file with
//! any subset of the fields overrides the rest.

use crate::CoreError;
use crate::excavation::RarityTable;
use crate::primitives::{
    DEBUG_CURRENCY_GRANT, DEBUG_XP_GRANT, DEFAULT_RARITY_WEIGHTS, EXCAVATION_DURATION_SECS,
    EXCAVATION_EMPTY_XP, EXCAVATION_FIND_XP,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rules that can be tuned without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds an excavation takes.
    pub excavation_secs: u32,
    /// Weights for common, rare, epic and legendary rolls.
    pub rarity_weights: [u32; 4],
    /// XP for an excavation that found an item.
    pub find_xp: u64,
    /// XP for an excavation that found nothing.
    pub empty_xp: u64,
    /// XP granted by the debug panel.
    pub debug_xp: u64,
    /// Currency granted by the debug panel.
    pub debug_currency: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            excavation_secs: EXCAVATION_DURATION_SECS,
            rarity_weights: DEFAULT_RARITY_WEIGHTS,
            find_xp: EXCAVATION_FIND_XP,
            empty_xp: EXCAVATION_EMPTY_XP,
            debug_xp: DEBUG_XP_GRANT,
            debug_currency: DEBUG_CURRENCY_GRANT,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file and validate.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.rarity_table()?;
        Ok(config)
    }

    /// Rarity table built from the configured weights.
    pub fn rarity_table(&self) -> Result<RarityTable, CoreError> {
        RarityTable::new(self.rarity_weights)
    }
}
