//! Shared fixtures: a fixed origin and km-based offsets from it.
//!
//! Offsets use the planar approximation, so a household placed `d` km from
//! the origin is exactly `d` km away under [`DistanceMetric::Planar`](crate::geo::DistanceMetric).

use crate::geo::{Coordinate, KM_PER_DEGREE};
use crate::household::{Direction, HouseholdEntry};

/// Latitude/longitude of the fixture origin (central Tokyo).
pub const ORIGIN_LAT: f64 = 35.68;
pub const ORIGIN_LNG: f64 = 139.76;

pub fn origin() -> Coordinate {
    offset_km(0.0, 0.0)
}

/// Coordinate `north_km` north and `east_km` east of [`origin`].
///
/// # Panics
///
/// Panics if the offset leaves the valid coordinate range.
pub fn offset_km(north_km: f64, east_km: f64) -> Coordinate {
    Coordinate::new(
        ORIGIN_LAT + north_km / KM_PER_DEGREE,
        ORIGIN_LNG + east_km / KM_PER_DEGREE,
    )
    .expect("fixture offset should stay within coordinate range")
}

/// Driver for both legs with `capacity` seats and `own_children` children.
pub fn driver(
    name: &str,
    location: Coordinate,
    capacity: i32,
    own_children: usize,
) -> HouseholdEntry {
    HouseholdEntry::new(name, Some(location))
        .with_children(child_names(name, own_children))
        .with_round_trip_capacity(capacity)
}

/// Household that offers no seats on either leg.
pub fn rider(name: &str, location: Coordinate, children: usize) -> HouseholdEntry {
    HouseholdEntry::new(name, Some(location)).with_children(child_names(name, children))
}

/// Driver offering seats on `direction` only.
pub fn one_way_driver(
    name: &str,
    location: Coordinate,
    direction: Direction,
    capacity: i32,
    own_children: usize,
) -> HouseholdEntry {
    HouseholdEntry::new(name, Some(location))
        .with_children(child_names(name, own_children))
        .with_capacity(direction, capacity)
}

/// `"{household}-1"`, `"{household}-2"`, ...
pub fn child_names(household: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{household}-{n}")).collect()
}
