//! # Report Module
//!
//! Structured output of a player action.
//!
//! A report pairs the notifications an action produced with a summary of
//! the profile afterwards. The CLI prints it as a boxed card or as JSON;
//! the API returns the JSON form.

use crate::geo::Coordinate;
use crate::profile::UserProfile;
use crate::progression;
use crate::session::GameEvent;
use serde::{Deserialize, Serialize};

/// Snapshot of the numbers a player cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub currency: u64,
    pub residence_days: u32,
    pub item_count: usize,
    pub achievement_count: usize,
    pub position: Option<Coordinate>,
}

impl From<&UserProfile> for ProfileSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            level: profile.level,
            xp: profile.xp,
            xp_to_next_level: progression::xp_to_next_level(profile.xp),
            currency: profile.currency,
            residence_days: profile.residence_days,
            item_count: profile.inventory.len(),
            achievement_count: profile.unlocked_achievements.len(),
            position: profile.position,
        }
    }
}

/// Result of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Short name of the action, e.g. `"excavate"`.
    pub action: String,
    /// Raw events in emission order.
    pub events: Vec<GameEvent>,
    /// Rendered notifications, one per event.
    pub notifications: Vec<String>,
    /// Profile after the action.
    pub profile: ProfileSummary,
}

impl Report {
    /// Build a report from an action's events.
    #[must_use]
    pub fn new(action: impl Into<String>, events: Vec<GameEvent>, profile: &UserProfile) -> Self {
        let notifications = events.iter().map(ToString::to_string).collect();
        Self {
            action: action.into(),
            events,
            notifications,
            profile: ProfileSummary::from(profile),
        }
    }

    /// Whether the action produced anything worth telling.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.events.is_empty()
    }

    /// Format as a boxed text card.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str(&format!("│ {}\n", self.action.to_uppercase()));
        output.push_str("├─────────────────────────────────────┤\n");

        if self.notifications.is_empty() {
            output.push_str("│ - (nothing happened)\n");
        } else {
            for note in &self.notifications {
                output.push_str(&format!("│ - {}\n", note));
            }
        }

        let p = &self.profile;
        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str(&format!("│ {}  Lv.{}\n", p.name, p.level));
        output.push_str(&format!(
            "│ 阅历 {} (下一级还需 {})\n",
            p.xp, p.xp_to_next_level
        ));
        output.push_str(&format!("│ 通宝 {}  定居 {} 天\n", p.currency, p.residence_days));
        output.push_str(&format!(
            "│ 藏品 {}  成就 {}\n",
            p.item_count, p.achievement_count
        ));
        if let Some(pos) = p.position {
            output.push_str(&format!("│ 位置 {}\n", pos));
        }
        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================
