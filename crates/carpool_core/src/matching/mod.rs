pub mod ordering;
pub mod phased;
pub mod policy;
pub mod types;

pub use ordering::{
    build_group_ordering, GroupOrdering, GroupOrderingKind, InputOrder, NameOrder, SeededShuffle,
};
pub use phased::PhasedAssignment;
pub use policy::{CandidateRank, ProximityTier, RankingPolicy};
pub use types::{AssignmentResult, DriverAssignment};

use crate::error::CarpoolError;
use crate::household::{Direction, HouseholdEntry, LegRoster};
use crate::params::CarpoolParams;

/// Assign every child of `households` to a driver for one leg, using default
/// parameters with the given near-threshold.
pub fn assign_carpool(
    households: &[HouseholdEntry],
    direction: Direction,
    near_threshold_km: f64,
) -> Result<AssignmentResult, CarpoolError> {
    let params = CarpoolParams::default().with_near_threshold_km(near_threshold_km);
    assign_carpool_with(households, direction, &params)
}

/// Assign one leg with explicit parameters.
pub fn assign_carpool_with(
    households: &[HouseholdEntry],
    direction: Direction,
    params: &CarpoolParams,
) -> Result<AssignmentResult, CarpoolError> {
    params.validate()?;
    let roster = LegRoster::build(households, direction)?;
    Ok(PhasedAssignment::from_params(params).assign(roster))
}
