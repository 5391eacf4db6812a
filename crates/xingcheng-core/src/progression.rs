//! # Progression
//!
//! Level formula: `level = max(1, floor(sqrt(xp / 100)))`.
//!
//! `floor(sqrt(floor(y))) == floor(sqrt(y))` for `y >= 0`, so the formula
//! is evaluated entirely in integers with `u64::isqrt`.

use crate::primitives::{STARTING_LEVEL, XP_PER_LEVEL_UNIT};
use crate::profile::UserProfile;

/// Level reached with the given XP total.
#[must_use]
pub fn level_for_xp(xp: u64) -> u32 {
    let raw = (xp / XP_PER_LEVEL_UNIT).isqrt();
    u32::try_from(raw).unwrap_or(u32::MAX).max(STARTING_LEVEL)
}

/// Minimum XP needed to reach `level`.
#[must_use]
pub fn xp_for_level(level: u32) -> u64 {
    let level = u64::from(level);
    level.saturating_mul(level).saturating_mul(XP_PER_LEVEL_UNIT)
}

/// XP still missing before the next level.
#[must_use]
pub fn xp_to_next_level(xp: u64) -> u64 {
    let next = level_for_xp(xp).saturating_add(1);
    xp_for_level(next).saturating_sub(xp)
}

/// Raise the stored level if the profile's XP earned a higher one.
///
/// The stored level never decreases. Returns the new level when it rose.
pub fn apply_level_up(profile: &mut UserProfile) -> Option<u32> {
    let computed = level_for_xp(profile.xp);
    if computed > profile.level {
        profile.level = computed;
        Some(computed)
    } else {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================
