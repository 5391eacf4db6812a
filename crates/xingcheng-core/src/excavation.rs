//! # Excavation
//!
//! A timed dig followed by a weighted rarity roll.
//!
//! The countdown is driven by the caller one second at a time (`tick`), so
//! the CLI can sleep between ticks while the server drives it from an
//! interval timer. Randomness always comes from a caller-supplied `Rng`;
//! tests pass a seeded `ChaCha8Rng`.

use crate::catalog::Catalog;
use crate::{CoreError, Item, Rarity};
use rand::Rng;
use serde::{Deserialize, Serialize};

// =============================================================================
// RARITY TABLE
// =============================================================================

/// Integer weights for each rarity tier.
///
/// A roll draws uniformly from `0..total` and walks the cumulative weights
/// in ascending rarity. With the default 60/30/9/1 this reproduces the
/// 60% / 30% / 9% / 1% split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityTable {
    weights: [u32; 4],
    total: u32,
}

impl RarityTable {
    /// Build a table. Weights are in `Rarity::ALL` order.
    pub fn new(weights: [u32; 4]) -> Result<Self, CoreError> {
        let total = weights
            .iter()
            .try_fold(0u32, |acc, w| acc.checked_add(*w))
            .unwrap_or(u32::MAX);
        if total == 0 {
            return Err(CoreError::EmptyRarityTable);
        }
        Ok(Self { weights, total })
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Weight of a single tier.
    #[must_use]
    pub fn weight(&self, rarity: Rarity) -> u32 {
        self.weights[rarity as usize]
    }

    /// Map a point in `0..total` to its tier.
    #[must_use]
    pub fn rarity_at(&self, point: u32) -> Rarity {
        let mut cumulative = 0u32;
        for (rarity, weight) in Rarity::ALL.iter().zip(self.weights) {
            cumulative = cumulative.saturating_add(weight);
            if point < cumulative {
                return *rarity;
            }
        }
        Rarity::Legendary
    }

    /// Roll a rarity.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> Rarity {
        self.rarity_at(rng.random_range(0..self.total))
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        Self {
            weights: crate::primitives::DEFAULT_RARITY_WEIGHTS,
            total: 100,
        }
    }
}

// =============================================================================
// COUNTDOWN
// =============================================================================

/// State of a running excavation after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExcavationProgress {
    InProgress { remaining: u32 },
    Ready,
}

/// A running excavation countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excavation {
    duration: u32,
    remaining: u32,
}

impl Excavation {
    /// Start a countdown of `duration` seconds.
    #[must_use]
    pub fn start(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Total length of this dig.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Whether the dig can be resolved.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one second.
    pub fn tick(&mut self) -> ExcavationProgress {
        self.remaining = self.remaining.saturating_sub(1);
        self.progress()
    }

    /// Current progress without advancing.
    #[must_use]
    pub fn progress(&self) -> ExcavationProgress {
        if self.remaining == 0 {
            ExcavationProgress::Ready
        } else {
            ExcavationProgress::InProgress {
                remaining: self.remaining,
            }
        }
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// What a finished excavation turned up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ExcavationOutcome {
    /// An item of the rolled rarity.
    Found { item: Item },
    /// The rolled rarity has no items; only dirt.
    Empty { rolled: Rarity },
}

/// Roll a rarity and pick one of its items uniformly.
pub fn resolve<R: Rng>(rng: &mut R, table: &RarityTable, catalog: &Catalog) -> ExcavationOutcome {
    let rolled = table.roll(rng);
    let pool = catalog.items_of_rarity(rolled);
    if pool.is_empty() {
        return ExcavationOutcome::Empty { rolled };
    }
    let pick = rng.random_range(0..pool.len());
    match pool.get(pick) {
        Some(item) => ExcavationOutcome::Found {
            item: (*item).clone(),
        },
        None => ExcavationOutcome::Empty { rolled },
    }
}

// =============================================================================
// TESTS
// =============================================================================
