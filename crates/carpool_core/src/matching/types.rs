use serde::{Deserialize, Serialize};

use crate::household::{Direction, DriverState};

/// Final seating of one driver's vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAssignment {
    /// Index of the driver's household in the input list.
    pub household: usize,
    pub driver: String,
    pub own_children: Vec<String>,
    /// Children from other households, in seating order.
    pub riders: Vec<String>,
    /// Households (by input index) that have a child in this vehicle.
    pub rider_households: Vec<usize>,
    pub capacity: u32,
    pub free_seats: u32,
}

impl DriverAssignment {
    /// Everyone in the vehicle: own children first, then riders.
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.own_children
            .iter()
            .chain(self.riders.iter())
            .map(String::as_str)
    }
}

impl From<DriverState> for DriverAssignment {
    fn from(state: DriverState) -> Self {
        Self {
            household: state.household,
            driver: state.name,
            own_children: state.own_children,
            riders: state.assigned_riders,
            rider_households: state.rider_households,
            capacity: state.capacity,
            free_seats: state.free_seats,
        }
    }
}

/// Outcome of assigning one leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub direction: Direction,
    /// One entry per driver, in input order (including empty vehicles).
    pub assignments: Vec<DriverAssignment>,
    /// Children that could not be seated anywhere.
    pub unplaced: Vec<String>,
    /// Households whose children ended up in more than one vehicle.
    pub split_households: Vec<String>,
    /// Households whose location is unresolved (advisory).
    pub unlocated: Vec<String>,
}

impl AssignmentResult {
    /// Children seated with the first driver named `driver`.
    pub fn riders_of(&self, driver: &str) -> Option<Vec<&str>> {
        self.assignments
            .iter()
            .find(|assignment| assignment.driver == driver)
            .map(|assignment| assignment.children().collect())
    }

    /// Driver carrying `child`, if seated.
    pub fn driver_of(&self, child: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|assignment| assignment.children().any(|name| name == child))
            .map(|assignment| assignment.driver.as_str())
    }

    pub fn seated_count(&self) -> usize {
        self.assignments
            .iter()
            .map(|assignment| assignment.own_children.len() + assignment.riders.len())
            .sum()
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}
