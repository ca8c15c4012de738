//! Load tests: large events must still plan quickly.

mod support;

use std::time::Instant;

use carpool_core::household::Direction;
use carpool_core::params::CarpoolParams;
use carpool_core::plan::{build_event_plan, EventSnapshot};
use carpool_core::routing::{sequence_route, NamedCoordinate};
use carpool_core::test_helpers::origin;
use carpool_core::{assign_carpool_with, RsvpRecord};
use support::events::{random_households, EventShape};
use support::{assert_capacity_respected, assert_conservation};

#[test]
#[ignore] // Only run explicitly: cargo test --package carpool_core --test load_tests -- --ignored
fn test_large_event_assignment() {
    let households = random_households(
        42,
        EventShape {
            households: 2_000,
            driver_ratio: 0.3,
            ..Default::default()
        },
    );

    let start = Instant::now();
    let result =
        assign_carpool_with(&households, Direction::Go, &CarpoolParams::default()).unwrap();
    let duration = start.elapsed();

    println!(
        "Assigned {} households in {:.3}s ({} seated, {} unplaced)",
        households.len(),
        duration.as_secs_f64(),
        result.seated_count(),
        result.unplaced.len()
    );
    assert_conservation(&households, &result);
    assert_capacity_respected(&result);
    assert!(duration.as_secs_f64() < 5.0, "assignment took {:.2}s", duration.as_secs_f64());
}

#[test]
#[ignore]
fn test_large_route() {
    let households = random_households(
        7,
        EventShape {
            households: 300,
            unlocated_ratio: 0.0,
            ..Default::default()
        },
    );
    let points: Vec<NamedCoordinate> = households
        .iter()
        .map(|household| NamedCoordinate::new(household.name.clone(), household.location))
        .collect();

    let start = Instant::now();
    let route = sequence_route(&points, origin());
    let duration = start.elapsed();

    println!(
        "Sequenced {} stops in {:.3}s ({:.1} km)",
        route.len(),
        duration.as_secs_f64(),
        route.total_km
    );
    assert_eq!(route.len(), points.len() + 1);
    assert!(duration.as_secs_f64() < 10.0);
}

#[test]
#[ignore]
fn test_large_event_plan() {
    let households = random_households(11, EventShape {
        households: 500,
        ..Default::default()
    });
    let snapshot = EventSnapshot {
        title: "load".to_string(),
        households: households
            .iter()
            .map(|household| RsvpRecord {
                name: household.name.clone(),
                lat: household.location.map(|at| at.lat()),
                lng: household.location.map(|at| at.lng()),
                children: household.child_names.join(","),
                capacity: household.go_capacity,
                go_ok: household.go_capacity > 0,
                back_ok: household.go_capacity > 0,
                ..Default::default()
            })
            .collect(),
        meeting_spot: carpool_core::plan::MeetingSpot {
            location: Some(origin()),
            ..Default::default()
        },
        params: None,
    };

    let start = Instant::now();
    let plan = build_event_plan(&snapshot, &CarpoolParams::default(), &Direction::ALL).unwrap();
    println!(
        "Planned {} legs for {} households in {:.3}s",
        plan.legs.len(),
        households.len(),
        start.elapsed().as_secs_f64()
    );
    assert_eq!(plan.legs.len(), 2);
}
