//! Two-phase assignment of rider groups to drivers.
//!
//! Phase A places each sibling group atomically with the best driver that has
//! enough free seats (near tier first, then lowest load, then distance).
//! Groups that fit nowhere are deferred to Phase B, which seats them one child
//! at a time (lowest load, then distance) and flags the household as split.
//! Placements are never revisited.

use tracing::{debug, info, warn};

use crate::geo::{Coordinate, DistanceMetric};
use crate::household::{DriverState, LegRoster, RiderGroup};
use crate::params::CarpoolParams;

use super::ordering::{build_group_ordering, GroupOrdering};
use super::policy::{choose_best_driver, RankingPolicy};
use super::types::{AssignmentResult, DriverAssignment};

pub struct PhasedAssignment {
    policy: RankingPolicy,
    ordering: Box<dyn GroupOrdering>,
}

impl PhasedAssignment {
    pub fn new(
        near_threshold_km: f64,
        metric: DistanceMetric,
        ordering: Box<dyn GroupOrdering>,
    ) -> Self {
        Self {
            policy: RankingPolicy {
                near_threshold_km,
                metric,
            },
            ordering,
        }
    }

    pub fn from_params(params: &CarpoolParams) -> Self {
        Self::new(
            params.near_threshold_km,
            params.distance_metric,
            build_group_ordering(params.group_ordering),
        )
    }

    pub fn assign(&self, roster: LegRoster) -> AssignmentResult {
        let LegRoster {
            direction,
            mut drivers,
            groups,
            unlocated,
        } = roster;

        let mut unplaced = Vec::new();
        let mut split_households = Vec::new();
        let mut deferred: Vec<(&RiderGroup, Coordinate)> = Vec::new();

        // Phase A: whole sibling groups.
        for index in self.ordering.order(&groups) {
            let group = &groups[index];
            let Some(rider_at) = group.location else {
                warn!(
                    household = %group.name,
                    children = group.size(),
                    "rider group has no resolved location; leaving unplaced"
                );
                unplaced.extend(group.children.iter().cloned());
                continue;
            };

            let best = choose_best_driver(&drivers, rider_at, group.size(), |rider, driver, at| {
                self.policy.rank_for_group(rider, driver, at)
            });
            match best {
                Some((driver_index, rank)) => {
                    let driver = &mut drivers[driver_index];
                    debug!(
                        household = %group.name,
                        driver = %driver.name,
                        distance_km = rank.distance_km,
                        tier = ?rank.tier,
                        load = rank.load,
                        "placed sibling group"
                    );
                    for child in &group.children {
                        driver.seat(group.household, child.clone());
                    }
                    if group.overflow {
                        split_households.push(group.name.clone());
                    }
                }
                None => {
                    debug!(
                        household = %group.name,
                        seats = group.size(),
                        "no single vehicle fits the group; deferring"
                    );
                    deferred.push((group, rider_at));
                }
            }
        }

        // Phase B: one child at a time.
        for (group, rider_at) in deferred {
            let separated = self.seat_individually(&mut drivers, group, rider_at, &mut unplaced);
            if separated {
                warn!(household = %group.name, "siblings split across vehicles");
                split_households.push(group.name.clone());
            }
        }

        if !unplaced.is_empty() {
            warn!(
                direction = %direction,
                unplaced = unplaced.len(),
                "not enough seats for every child"
            );
        }

        let assignments: Vec<DriverAssignment> =
            drivers.into_iter().map(DriverAssignment::from).collect();
        let result = AssignmentResult {
            direction,
            assignments,
            unplaced,
            split_households,
            unlocated,
        };
        info!(
            direction = %direction,
            drivers = result.assignments.len(),
            seated = result.seated_count(),
            unplaced = result.unplaced.len(),
            split = result.split_households.len(),
            "leg assigned"
        );
        result
    }

    /// Seat each child of `group` separately. Returns true when the siblings
    /// ended up apart (several vehicles, or some left unplaced).
    fn seat_individually(
        &self,
        drivers: &mut [DriverState],
        group: &RiderGroup,
        rider_at: Coordinate,
        unplaced: &mut Vec<String>,
    ) -> bool {
        let mut vehicles: Vec<usize> = Vec::new();
        let mut missing = 0usize;

        for child in &group.children {
            let best = choose_best_driver(drivers, rider_at, 1, |rider, driver, at| {
                self.policy.rank_for_child(rider, driver, at)
            });
            match best {
                Some((driver_index, _)) => {
                    drivers[driver_index].seat(group.household, child.clone());
                    if !vehicles.contains(&driver_index) {
                        vehicles.push(driver_index);
                    }
                }
                None => {
                    unplaced.push(child.clone());
                    missing += 1;
                }
            }
        }

        if group.overflow {
            return true;
        }
        vehicles.len() > 1 || (!vehicles.is_empty() && missing > 0)
    }
}
