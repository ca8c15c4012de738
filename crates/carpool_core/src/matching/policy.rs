use std::cmp::Ordering;

use crate::geo::{Coordinate, DistanceMetric};
use crate::household::DriverState;

/// Whether a driver lies within the near-threshold of a rider group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProximityTier {
    Near,
    Far,
}

/// Ranking key for one driver candidate. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRank {
    pub tier: ProximityTier,
    pub load: usize,
    pub distance_km: f64,
}

impl CandidateRank {
    /// Lexicographic comparison: tier, then load, then distance.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then(self.load.cmp(&other.load))
            .then(self.distance_km.total_cmp(&other.distance_km))
    }
}

/// Scoring inputs shared by both phases.
#[derive(Debug, Clone, Copy)]
pub struct RankingPolicy {
    pub near_threshold_km: f64,
    pub metric: DistanceMetric,
}

impl RankingPolicy {
    /// Rank for atomic placement: proximity tier gates before load.
    pub fn rank_for_group(
        &self,
        rider: Coordinate,
        driver: &DriverState,
        at: Coordinate,
    ) -> CandidateRank {
        let distance_km = self.metric.distance_km(rider, at);
        let tier = if distance_km <= self.near_threshold_km {
            ProximityTier::Near
        } else {
            ProximityTier::Far
        };
        CandidateRank {
            tier,
            load: driver.load(),
            distance_km,
        }
    }

    /// Rank for forced per-child placement: no proximity tier.
    pub fn rank_for_child(
        &self,
        rider: Coordinate,
        driver: &DriverState,
        at: Coordinate,
    ) -> CandidateRank {
        CandidateRank {
            tier: ProximityTier::Near,
            load: driver.load(),
            distance_km: self.metric.distance_km(rider, at),
        }
    }
}

/// Pick the best located driver with at least `seats` free seats.
///
/// Earlier drivers win exact ties, so the result only depends on driver order.
pub fn choose_best_driver(
    drivers: &[DriverState],
    rider: Coordinate,
    seats: usize,
    rank: impl Fn(Coordinate, &DriverState, Coordinate) -> CandidateRank,
) -> Option<(usize, CandidateRank)> {
    let mut best: Option<(usize, CandidateRank)> = None;

    for (index, driver) in drivers.iter().enumerate() {
        if !driver.can_seat(seats) {
            continue;
        }
        let Some(at) = driver.location else {
            continue;
        };
        let candidate = rank(rider, driver, at);

        match best {
            None => best = Some((index, candidate)),
            Some((_, current)) if candidate.compare(&current) == Ordering::Less => {
                best = Some((index, candidate))
            }
            _ => {}
        }
    }

    best
}
