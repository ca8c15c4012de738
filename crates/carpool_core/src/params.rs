use serde::{Deserialize, Serialize};

use crate::error::CarpoolError;
use crate::geo::DistanceMetric;
use crate::matching::GroupOrderingKind;

/// Near-threshold of the current matching behaviour (km, planar metric).
pub const DEFAULT_NEAR_THRESHOLD_KM: f64 = 3.0;

/// Near-threshold used by the earlier matching behaviour.
pub const LEGACY_NEAR_THRESHOLD_KM: f64 = 5.0;

/// Default cap on 2-opt improvement passes per route.
pub const DEFAULT_ROUTE_ITERATION_BUDGET: usize = 100;

pub const DEFAULT_MEETING_SPOT_LABEL: &str = "Meeting spot";

/// Parameters for planning one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarpoolParams {
    /// Drivers within this distance of a rider group are preferred regardless of load.
    pub near_threshold_km: f64,
    /// Distance approximation for matching and routing decisions.
    pub distance_metric: DistanceMetric,
    /// Order in which rider groups are offered seats.
    pub group_ordering: GroupOrderingKind,
    /// Maximum 2-opt passes per route. 0 keeps the construction tour.
    pub route_iteration_budget: usize,
    /// Label of the terminal pseudo-stop in rendered routes.
    pub meeting_spot_label: String,
    /// Compute the two legs on the rayon pool instead of sequentially.
    pub parallel_legs: bool,
}

impl Default for CarpoolParams {
    fn default() -> Self {
        Self {
            near_threshold_km: DEFAULT_NEAR_THRESHOLD_KM,
            distance_metric: DistanceMetric::Planar,
            group_ordering: GroupOrderingKind::InputOrder,
            route_iteration_budget: DEFAULT_ROUTE_ITERATION_BUDGET,
            meeting_spot_label: DEFAULT_MEETING_SPOT_LABEL.to_string(),
            parallel_legs: true,
        }
    }
}

impl CarpoolParams {
    pub fn with_near_threshold_km(mut self, km: f64) -> Self {
        self.near_threshold_km = km;
        self
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn with_group_ordering(mut self, ordering: GroupOrderingKind) -> Self {
        self.group_ordering = ordering;
        self
    }

    /// Shuffle rider groups with a fixed seed before matching.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_group_ordering(GroupOrderingKind::SeededShuffle { seed })
    }

    pub fn with_route_iteration_budget(mut self, passes: usize) -> Self {
        self.route_iteration_budget = passes;
        self
    }

    pub fn with_meeting_spot_label(mut self, label: impl Into<String>) -> Self {
        self.meeting_spot_label = label.into();
        self
    }

    pub fn with_parallel_legs(mut self, parallel: bool) -> Self {
        self.parallel_legs = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), CarpoolError> {
        if !self.near_threshold_km.is_finite() || self.near_threshold_km < 0.0 {
            return Err(CarpoolError::InvalidParams(format!(
                "near_threshold_km must be a non-negative number, got {}",
                self.near_threshold_km
            )));
        }
        Ok(())
    }
}
