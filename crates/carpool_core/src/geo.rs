//! Geographic primitives: validated coordinates and approximate surface distances.
//!
//! Two distance approximations are provided:
//!
//! - **Planar**: Euclidean distance over degree pairs scaled by 111 km/degree.
//!   Cheap and accurate enough below ~50 km; the near-threshold defaults are
//!   calibrated against it, so it is the default for matching and routing.
//! - **Haversine**: great-circle distance on a sphere of radius 6371 km.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CarpoolError;

/// Kilometres per degree used by the planar approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Mean Earth radius for the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A resolved (latitude, longitude) pair in degrees.
///
/// Construction validates the range, so every `Coordinate` in the engine is
/// finite. An unresolved geocode is modelled as `Option<Coordinate>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CarpoolError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(CarpoolError::InvalidCoordinate {
                latitude: lat,
                longitude: lng,
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Total order over coordinates (latitude first), used to normalize point sets.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.lat
            .total_cmp(&other.lat)
            .then_with(|| self.lng.total_cmp(&other.lng))
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CarpoolError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lng)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            lat: coordinate.lat,
            lng: coordinate.lng,
        }
    }
}

/// Which approximation to use for distance comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Planar,
    Haversine,
}

impl DistanceMetric {
    pub fn distance_km(self, a: Coordinate, b: Coordinate) -> f64 {
        match self {
            DistanceMetric::Planar => planar_distance_km(a, b),
            DistanceMetric::Haversine => haversine_distance_km(a, b),
        }
    }
}

/// Planar approximation: degree-space Euclidean distance × 111 km.
pub fn planar_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = a.lat - b.lat;
    let dlng = a.lng - b.lng;
    (dlat * dlat + dlng * dlng).sqrt() * KM_PER_DEGREE
}

/// Great-circle distance using the haversine formula.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
