//! # Game Session
//!
//! The action surface of the game. A session owns one profile, the
//! player's position and an optional running excavation. Every action
//! returns the [`GameEvent`]s it produced; the presentation layer turns
//! them into notifications and never mutates the profile itself.
//!
//! Invariants maintained after every action:
//! - the stored level is `max(stored, level_for_xp(xp))`;
//! - an achievement id appears at most once in the profile;
//! - currency never goes negative.

use crate::achievements::{self, Unlock};
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::excavation::{self, Excavation, ExcavationOutcome, ExcavationProgress, RarityTable};
use crate::geo::{self, Coordinate};
use crate::lore;
use crate::primitives::DAILY_WALK_GOAL_METERS;
use crate::profile::UserProfile;
use crate::progression;
use crate::{CoreError, Item, ItemId, Rarity};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// EVENTS
// =============================================================================

/// Something the player should be told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    AchievementUnlocked { unlock: Unlock },
    LevelUp { level: u32 },
    Moved { to: Coordinate, meters: u64 },
    Teleported { to: Coordinate },
    CheckedIn { residence_days: u32 },
    ExcavationStarted { seconds: u32 },
    ExcavationTick { remaining: u32 },
    ItemFound { item: Item, xp: u64 },
    NothingFound { rolled: Rarity, xp: u64 },
    Purchased { item: Item, price: u64 },
    XpGranted { amount: u64 },
    CurrencyGranted { amount: u64 },
    ProfileReset,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::AchievementUnlocked { unlock } => {
                write!(f, "解锁成就: {} [{}]", unlock.title, unlock.rarity.label())
            }
            GameEvent::LevelUp { level } => write!(f, "恭喜升级！当前等级: {level}"),
            GameEvent::Moved { to, meters } => write!(f, "移动至 {to}，行程 {meters} 米"),
            GameEvent::Teleported { to } => write!(f, "传送至 {to}"),
            GameEvent::CheckedIn { .. } => f.write_str("签到成功！定居天数 +1"),
            GameEvent::ExcavationStarted { seconds } => write!(f, "开始探索... {seconds}s"),
            GameEvent::ExcavationTick { remaining } => write!(f, "挖掘中... {remaining}s"),
            GameEvent::ItemFound { item, .. } => {
                write!(f, "考古发现: {} [{}]", item.name, item.rarity.label())
            }
            GameEvent::NothingFound { .. } => f.write_str("除了一堆泥土，什么也没发现..."),
            GameEvent::Purchased { item, .. } => write!(f, "购入: {}", item.name),
            GameEvent::XpGranted { amount } => write!(f, "+{amount} 阅历"),
            GameEvent::CurrencyGranted { amount } => write!(f, "+{amount} 通宝"),
            GameEvent::ProfileReset => f.write_str("存档已重置"),
        }
    }
}

/// Progress of the daily walk task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkProgress {
    pub walked_m: u64,
    pub goal_m: u64,
    /// 0..=100
    pub percent: u8,
    pub complete: bool,
}

impl WalkProgress {
    fn new(walked_m: u64, goal_m: u64) -> Self {
        let percent = if goal_m == 0 {
            100
        } else {
            (walked_m.saturating_mul(100) / goal_m).min(100) as u8
        };
        Self {
            walked_m,
            goal_m,
            percent,
            complete: walked_m >= goal_m,
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// A single player's game.
#[derive(Debug, Clone)]
pub struct GameSession {
    profile: UserProfile,
    position: Coordinate,
    catalog: Catalog,
    config: GameConfig,
    rarity_table: RarityTable,
    excavation: Option<Excavation>,
}

impl GameSession {
    /// Wrap a loaded profile. Fails if the config's rarity weights are empty.
    pub fn new(
        profile: UserProfile,
        catalog: Catalog,
        config: GameConfig,
    ) -> Result<Self, CoreError> {
        let rarity_table = config.rarity_table()?;
        let position = profile.position.unwrap_or_default();
        Ok(Self {
            profile,
            position,
            catalog,
            config,
            rarity_table,
            excavation: None,
        })
    }

    /// A new player with the shipped catalog and rules.
    #[must_use]
    pub fn with_defaults(profile: UserProfile) -> Self {
        Self {
            position: profile.position.unwrap_or_default(),
            profile,
            catalog: Catalog::standard(),
            config: GameConfig::default(),
            rarity_table: RarityTable::default(),
            excavation: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    #[must_use]
    pub fn into_profile(self) -> UserProfile {
        self.profile
    }

    #[must_use]
    pub fn position(&self) -> Coordinate {
        self.position
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The running excavation, if any.
    #[must_use]
    pub fn excavation(&self) -> Option<&Excavation> {
        self.excavation.as_ref()
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Opening the game: evaluate achievements at the current position.
    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.check_achievements(&mut events);
        self.settle(&mut events);
        events
    }

    /// Walk to a new position. The distance counts toward the walk task.
    pub fn move_to(&mut self, to: Coordinate) -> Vec<GameEvent> {
        let meters = geo::distance_meters(self.position, to);
        self.profile.distance_walked_m = self.profile.distance_walked_m.saturating_add(meters);
        self.set_position(to);

        let mut events = vec![GameEvent::Moved { to, meters }];
        self.check_achievements(&mut events);
        self.settle(&mut events);
        events
    }

    /// Jump to a position without walking there.
    pub fn teleport(&mut self, to: Coordinate) -> Vec<GameEvent> {
        self.set_position(to);
        let mut events = vec![GameEvent::Teleported { to }];
        self.check_achievements(&mut events);
        self.settle(&mut events);
        events
    }

    /// Daily check-in: one more day of residence.
    pub fn check_in(&mut self) -> Vec<GameEvent> {
        self.profile.residence_days = self.profile.residence_days.saturating_add(1);
        let mut events = vec![GameEvent::CheckedIn {
            residence_days: self.profile.residence_days,
        }];
        self.check_achievements(&mut events);
        self.settle(&mut events);
        events
    }

    /// Begin an excavation countdown.
    pub fn start_excavation(&mut self) -> Result<Vec<GameEvent>, CoreError> {
        if let Some(dig) = &self.excavation {
            return Err(CoreError::ExcavationInProgress {
                remaining: dig.remaining(),
            });
        }
        let seconds = self.config.excavation_secs;
        self.excavation = Some(Excavation::start(seconds));
        Ok(vec![GameEvent::ExcavationStarted { seconds }])
    }

    /// Advance the running excavation by one second, resolving it when the
    /// countdown reaches zero. Does nothing when no dig is running.
    pub fn tick_excavation<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        let Some(dig) = self.excavation.as_mut() else {
            return Vec::new();
        };
        match dig.tick() {
            ExcavationProgress::InProgress { remaining } => {
                vec![GameEvent::ExcavationTick { remaining }]
            }
            ExcavationProgress::Ready => {
                self.excavation = None;
                self.finish_excavation(rng)
            }
        }
    }

    /// Start an excavation and run its countdown to completion.
    pub fn excavate_now<R: Rng>(&mut self, rng: &mut R) -> Result<Vec<GameEvent>, CoreError> {
        let mut events = self.start_excavation()?;
        while self.excavation.is_some() {
            events.extend(self.tick_excavation(rng));
        }
        Ok(events)
    }

    fn finish_excavation<R: Rng>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match excavation::resolve(rng, &self.rarity_table, &self.catalog) {
            ExcavationOutcome::Found { item } => {
                let xp = self.config.find_xp;
                self.profile.inventory.push(item.id.clone());
                self.profile.xp = self.profile.xp.saturating_add(xp);
                events.push(GameEvent::ItemFound { item, xp });
            }
            ExcavationOutcome::Empty { rolled } => {
                let xp = self.config.empty_xp;
                self.profile.xp = self.profile.xp.saturating_add(xp);
                events.push(GameEvent::NothingFound { rolled, xp });
            }
        }
        self.settle(&mut events);
        events
    }

    /// Buy an item from the market.
    pub fn buy_item(&mut self, id: &ItemId) -> Result<Vec<GameEvent>, CoreError> {
        let item = self.catalog.require_item(id)?.clone();
        if self.profile.currency < item.price {
            return Err(CoreError::InsufficientCurrency {
                needed: item.price,
                available: self.profile.currency,
            });
        }
        self.profile.currency -= item.price;
        self.profile.inventory.push(item.id.clone());
        let price = item.price;
        Ok(vec![GameEvent::Purchased { item, price }])
    }

    /// Ask the oracle about the current position.
    #[must_use]
    pub fn consult_oracle(&self) -> String {
        lore::generate_location_lore(self.position)
    }

    /// Progress toward the 3 km walk task.
    #[must_use]
    pub fn daily_walk(&self) -> WalkProgress {
        WalkProgress::new(self.profile.distance_walked_m, DAILY_WALK_GOAL_METERS)
    }

    // -------------------------------------------------------------------------
    // Debug panel
    // -------------------------------------------------------------------------

    /// Grant XP (the configured debug amount when `amount` is `None`).
    pub fn grant_xp(&mut self, amount: Option<u64>) -> Vec<GameEvent> {
        let amount = amount.unwrap_or(self.config.debug_xp);
        self.profile.xp = self.profile.xp.saturating_add(amount);
        let mut events = vec![GameEvent::XpGranted { amount }];
        self.settle(&mut events);
        events
    }

    /// Grant currency (the configured debug amount when `amount` is `None`).
    pub fn grant_currency(&mut self, amount: Option<u64>) -> Vec<GameEvent> {
        let amount = amount.unwrap_or(self.config.debug_currency);
        self.profile.currency = self.profile.currency.saturating_add(amount);
        vec![GameEvent::CurrencyGranted { amount }]
    }

    /// Wipe the profile and start over as a new player.
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.profile = UserProfile::initial();
        self.position = Coordinate::initial();
        self.excavation = None;
        let mut events = vec![GameEvent::ProfileReset];
        events.extend(self.start());
        events
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn set_position(&mut self, to: Coordinate) {
        self.position = to;
        self.profile.position = Some(to);
    }

    fn check_achievements(&mut self, events: &mut Vec<GameEvent>) {
        let unlocks =
            achievements::check_achievements(&mut self.profile, self.position, &self.catalog);
        events.extend(
            unlocks
                .into_iter()
                .map(|unlock| GameEvent::AchievementUnlocked { unlock }),
        );
    }

    fn settle(&mut self, events: &mut Vec<GameEvent>) {
        if let Some(level) = progression::apply_level_up(&mut self.profile) {
            events.push(GameEvent::LevelUp { level });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session() -> GameSession {
        GameSession::with_defaults(UserProfile::initial())
    }

    #[test]
    fn start_unlocks_first_steps() {
        let mut s = session();
        let events = s.start();
        assert!(matches!(
            events.first(),
            Some(GameEvent::AchievementUnlocked { unlock }) if unlock.id.as_str() == "first_steps"
        ));
        assert!(s.start().is_empty());
    }

    #[test]
    fn walking_to_forbidden_city_unlocks_and_levels_up() {
        let mut s = session();
        s.start();
        let events = s.move_to(Coordinate::forbidden_city());

        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::AchievementUnlocked { unlock } if unlock.id.as_str() == "forbidden_city"
        )));
        // 50 + 1000 XP -> level 3
        assert!(events.contains(&GameEvent::LevelUp { level: 3 }));
        assert_eq!(s.profile().level, 3);
        assert!(s.profile().distance_walked_m > 1_500);
        assert_eq!(s.profile().position, Some(Coordinate::forbidden_city()));
    }

    #[test]
    fn teleport_does_not_count_as_walking() {
        let mut s = session();
        s.teleport(Coordinate::forbidden_city());
        assert_eq!(s.profile().distance_walked_m, 0);
        assert!(s.profile().has_unlocked(&crate::AchievementId::new("forbidden_city")));
    }

    #[test]
    fn walk_progress_caps_at_goal() {
        let mut s = session();
        assert_eq!(s.daily_walk().percent, 0);
        s.move_to(Coordinate { lat: 40.0, lng: 116.39 });
        let walk = s.daily_walk();
        assert!(walk.complete);
        assert_eq!(walk.percent, 100);
    }

    #[test]
    fn check_in_accumulates_days() {
        let mut s = session();
        s.check_in();
        let events = s.check_in();
        assert_eq!(s.profile().residence_days, 2);
        assert!(events.contains(&GameEvent::CheckedIn { residence_days: 2 }));
    }

    #[test]
    fn excavation_counts_down_then_resolves() {
        let mut s = session();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(s.start_excavation().is_ok());
        assert!(matches!(
            s.start_excavation(),
            Err(CoreError::ExcavationInProgress { remaining: 5 })
        ));

        for remaining in (1..5).rev() {
            assert_eq!(
                s.tick_excavation(&mut rng),
                vec![GameEvent::ExcavationTick { remaining }]
            );
        }
        let events = s.tick_excavation(&mut rng);
        assert!(s.excavation().is_none());
        // Every tier has items in the standard catalog
        assert!(matches!(events.first(), Some(GameEvent::ItemFound { xp: 50, .. })));
        assert_eq!(s.profile().inventory.len(), 1);
        assert_eq!(s.profile().xp, 50);
        assert!(s.tick_excavation(&mut rng).is_empty());
    }

    #[test]
    fn empty_catalog_digs_dirt() {
        let catalog = Catalog::new(Vec::new(), Vec::new());
        let mut s = GameSession::new(UserProfile::initial(), catalog, GameConfig::default())
            .unwrap_or_else(|_| session());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let events = s.excavate_now(&mut rng).unwrap_or_default();
        assert!(events.iter().any(|e| matches!(e, GameEvent::NothingFound { xp: 10, .. })));
        assert_eq!(s.profile().xp, 10);
        assert!(s.profile().inventory.is_empty());
    }

    #[test]
    fn buying_deducts_currency() {
        let mut s = session();
        let events = s.buy_item(&ItemId::new("iron_coin"));
        assert!(events.is_ok());
        assert_eq!(s.profile().currency, 85);
        assert_eq!(s.profile().inventory, vec![ItemId::new("iron_coin")]);
    }

    #[test]
    fn buying_without_funds_changes_nothing() {
        let mut s = session();
        let result = s.buy_item(&ItemId::new("pixiu"));
        assert!(matches!(
            result,
            Err(CoreError::InsufficientCurrency { needed: 500, available: 100 })
        ));
        assert_eq!(s.profile().currency, 100);
        assert!(s.profile().inventory.is_empty());
    }

    #[test]
    fn exact_funds_are_enough() {
        let mut s = session();
        s.grant_currency(Some(100));
        assert!(s.buy_item(&ItemId::new("bronze_mirror")).is_ok());
        assert_eq!(s.profile().currency, 0);
    }

    #[test]
    fn debug_xp_grant_levels_up() {
        let mut s = session();
        let events = s.grant_xp(None);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn reset_starts_over() {
        let mut s = session();
        s.start();
        s.grant_currency(None);
        s.move_to(Coordinate::forbidden_city());
        let events = s.reset();
        assert_eq!(events.first(), Some(&GameEvent::ProfileReset));
        assert_eq!(s.profile().currency, 100);
        assert_eq!(s.profile().unlocked_achievements.len(), 1);
        assert_eq!(s.position(), Coordinate::initial());
    }

    #[test]
    fn oracle_speaks_for_current_position() {
        let mut s = session();
        let here = s.consult_oracle();
        s.teleport(Coordinate::forbidden_city());
        assert_eq!(s.consult_oracle(), lore::generate_location_lore(Coordinate::forbidden_city()));
        assert_eq!(here, lore::generate_location_lore(Coordinate::initial()));
    }

    #[test]
    fn events_render_as_notifications() {
        let text = GameEvent::LevelUp { level: 4 }.to_string();
        assert_eq!(text, "恭喜升级！当前等级: 4");
    }
}
