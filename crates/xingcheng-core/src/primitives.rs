//! # Primitives
//!
//! Fixed constants of the game world.

/// XP divisor in the level formula: `level = floor(sqrt(xp / 100))`.
pub const XP_PER_LEVEL_UNIT: u64 = 100;

/// Level every profile starts at, and the floor of the level formula.
pub const STARTING_LEVEL: u32 = 1;

/// Currency (通宝) granted to a new profile.
pub const STARTING_CURRENCY: u64 = 100;

/// Display name of a new profile.
pub const STARTING_NAME: &str = "行者";

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Starting latitude (Beijing).
pub const INITIAL_LAT: f64 = 39.9042;

/// Starting longitude (Beijing).
pub const INITIAL_LNG: f64 = 116.4074;

/// Forbidden City latitude, the debug teleport target.
pub const FORBIDDEN_CITY_LAT: f64 = 39.9163;

/// Forbidden City longitude, the debug teleport target.
pub const FORBIDDEN_CITY_LNG: f64 = 116.3972;

/// Seconds an excavation takes to complete.
pub const EXCAVATION_DURATION_SECS: u32 = 5;

/// XP for an excavation that turned up an item.
pub const EXCAVATION_FIND_XP: u64 = 50;

/// XP for an excavation that found only dirt.
pub const EXCAVATION_EMPTY_XP: u64 = 10;

/// Residence days needed for the hometown achievement (five years).
pub const HOMETOWN_RESIDENCE_DAYS: u32 = 1825;

/// Level at which the museum switches to the curator appearance.
pub const MUSEUM_PREMIUM_LEVEL: u32 = 10;

/// Goal of the daily walk task, in meters.
pub const DAILY_WALK_GOAL_METERS: u64 = 3000;

/// XP granted by the debug panel.
pub const DEBUG_XP_GRANT: u64 = 500;

/// Currency granted by the debug panel.
pub const DEBUG_CURRENCY_GRANT: u64 = 1000;

/// Key the save blob is stored under.
pub const STORAGE_KEY: &str = "xingcheng_data_v2";

/// Default rarity weights out of 100: common, rare, epic, legendary.
pub const DEFAULT_RARITY_WEIGHTS: [u32; 4] = [60, 30, 9, 1];
