//! # Achievements
//!
//! Unlock evaluation. Every achievement not yet on the profile is tested
//! against its trigger; the ones that fire are applied in catalog order.

use crate::catalog::{Achievement, AchievementTrigger, Catalog};
use crate::geo::{self, Coordinate};
use crate::profile::UserProfile;
use crate::{AchievementId, ItemId, Rarity};
use serde::{Deserialize, Serialize};

/// Record of one applied unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub id: AchievementId,
    pub title: String,
    pub rarity: Rarity,
    pub reward_xp: u64,
    pub reward_item: Option<ItemId>,
}

/// Whether a trigger fires for this profile at this position.
#[must_use]
pub fn trigger_fires(
    trigger: &AchievementTrigger,
    profile: &UserProfile,
    position: Coordinate,
) -> bool {
    match *trigger {
        AchievementTrigger::FirstLaunch => true,
        AchievementTrigger::Location { target, radius_m } => {
            geo::within_radius(position, target, radius_m)
        }
        AchievementTrigger::Residence { days } => profile.residence_days >= days,
    }
}

/// Achievements that would unlock now, without applying them.
#[must_use]
pub fn pending<'a>(
    profile: &UserProfile,
    position: Coordinate,
    catalog: &'a Catalog,
) -> Vec<&'a Achievement> {
    catalog
        .achievements()
        .iter()
        .filter(|a| !profile.has_unlocked(&a.id))
        .filter(|a| trigger_fires(&a.trigger, profile, position))
        .collect()
}

/// Grant one achievement's rewards and mark it unlocked.
///
/// A second call for the same achievement is a no-op and returns `None`.
pub fn apply_unlock(profile: &mut UserProfile, achievement: &Achievement) -> Option<Unlock> {
    if profile.has_unlocked(&achievement.id) {
        return None;
    }
    profile.xp = profile.xp.saturating_add(achievement.reward_xp);
    if let Some(item) = &achievement.reward_item {
        profile.inventory.push(item.clone());
    }
    profile.unlocked_achievements.push(achievement.id.clone());
    Some(Unlock {
        id: achievement.id.clone(),
        title: achievement.title.clone(),
        rarity: achievement.rarity,
        reward_xp: achievement.reward_xp,
        reward_item: achievement.reward_item.clone(),
    })
}

/// An achievement alongside whether the profile holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub achievement: Achievement,
    pub unlocked: bool,
}

/// Every achievement in catalog order, marked locked or unlocked.
#[must_use]
pub fn status_list(profile: &UserProfile, catalog: &Catalog) -> Vec<AchievementStatus> {
    catalog
        .achievements()
        .iter()
        .map(|a| AchievementStatus {
            unlocked: profile.has_unlocked(&a.id),
            achievement: a.clone(),
        })
        .collect()
}

/// Evaluate and apply every achievement that fires.
pub fn check_achievements(
    profile: &mut UserProfile,
    position: Coordinate,
    catalog: &Catalog,
) -> Vec<Unlock> {
    let fired: Vec<Achievement> = pending(profile, position, catalog)
        .into_iter()
        .cloned()
        .collect();
    fired
        .iter()
        .filter_map(|a| apply_unlock(profile, a))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
