//! # Geo
//!
//! Coordinates and great-circle distance.
//!
//! This is the only module that does floating-point arithmetic; everything
//! else in the crate stays in integers.

#![allow(clippy::float_arithmetic)]

use crate::CoreError;
use crate::primitives::{
    EARTH_RADIUS_METERS, FORBIDDEN_CITY_LAT, FORBIDDEN_CITY_LNG, INITIAL_LAT, INITIAL_LNG,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scale applied to degrees before flooring into a lore seed.
const LORE_SEED_SCALE: f64 = 10_000.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::InvalidCoordinate { lat, lng })
        }
    }

    /// Where every new player starts.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            lat: INITIAL_LAT,
            lng: INITIAL_LNG,
        }
    }

    /// The Forbidden City.
    #[must_use]
    pub const fn forbidden_city() -> Self {
        Self {
            lat: FORBIDDEN_CITY_LAT,
            lng: FORBIDDEN_CITY_LNG,
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Great-circle distance in meters (Haversine formula).
#[must_use]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Whether `a` lies within `radius_m` meters of `b` (inclusive).
#[must_use]
pub fn within_radius(a: Coordinate, b: Coordinate, radius_m: u32) -> bool {
    haversine_distance(a, b) <= f64::from(radius_m)
}

/// Seed used by the lore generator: `floor(lat * 1e4) + floor(lng * 1e4)`.
#[must_use]
pub fn lore_seed(c: Coordinate) -> i64 {
    let lat = (c.lat * LORE_SEED_SCALE).floor() as i64;
    let lng = (c.lng * LORE_SEED_SCALE).floor() as i64;
    lat.saturating_add(lng)
}

/// Distance rounded down to whole meters, for integer bookkeeping.
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> u64 {
    haversine_distance(a, b).floor() as u64
}

// =============================================================================
// TESTS
// =============================================================================
