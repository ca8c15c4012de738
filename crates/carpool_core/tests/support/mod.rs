#![allow(dead_code)]

pub mod events;

use std::collections::BTreeMap;

use carpool_core::household::HouseholdEntry;
use carpool_core::matching::AssignmentResult;

/// Every child of every household, with multiplicity.
pub fn all_children(households: &[HouseholdEntry]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for household in households {
        for child in &household.child_names {
            *counts.entry(child.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Children appearing in the result: seated in a vehicle or unplaced.
pub fn accounted_children(result: &AssignmentResult) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let seated = result
        .assignments
        .iter()
        .flat_map(|assignment| assignment.children().map(str::to_string));
    for child in seated.chain(result.unplaced.iter().cloned()) {
        *counts.entry(child).or_insert(0) += 1;
    }
    counts
}

pub fn assert_conservation(households: &[HouseholdEntry], result: &AssignmentResult) {
    assert_eq!(
        all_children(households),
        accounted_children(result),
        "every child must be seated or unplaced exactly once"
    );
}

pub fn assert_capacity_respected(result: &AssignmentResult) {
    for assignment in &result.assignments {
        let occupied = assignment.own_children.len() + assignment.riders.len();
        assert!(
            occupied as u32 <= assignment.capacity,
            "{} carries {} children with {} seats",
            assignment.driver,
            occupied,
            assignment.capacity
        );
        assert_eq!(assignment.free_seats as usize, assignment.capacity as usize - occupied);
    }
}
