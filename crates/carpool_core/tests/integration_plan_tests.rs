use std::fs;
use std::path::PathBuf;

use carpool_core::geo::Coordinate;
use carpool_core::geocode::{resolve_snapshot_locations, CachedGeocoder, TableGeocoder};
use carpool_core::household::Direction;
use carpool_core::plan::{build_event_plan, render_route_text, EventSnapshot};
use carpool_core::routing::RouteStop;

fn demo_snapshot() -> EventSnapshot {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/event_snapshot.json");
    let raw = fs::read_to_string(&path).expect("demo snapshot should be readable");
    serde_json::from_str(&raw).expect("demo snapshot should parse")
}

#[test]
fn demo_event_plans_both_legs() {
    let snapshot = demo_snapshot();
    let plan = build_event_plan(&snapshot, &snapshot.effective_params(), &Direction::ALL).unwrap();

    let go = plan.leg(Direction::Go).unwrap();
    assert_eq!(go.assignment.driver_of("Mio"), Some("Aoki"));
    assert_eq!(go.assignment.driver_of("Rin"), Some("Aoki"));
    assert_eq!(go.assignment.driver_of("Yui"), Some("Chiba"));
    assert_eq!(go.assignment.driver_of("Hana"), Some("Chiba"));
    assert_eq!(go.assignment.driver_of("Taro"), Some("Aoki"));
    assert_eq!(go.assignment.split_households, vec!["Doi"]);
    assert_eq!(go.assignment.unplaced, vec!["Aki"]);
    assert_eq!(go.assignment.unlocated, vec!["Fujii"]);

    let back = plan.leg(Direction::Back).unwrap();
    assert_eq!(back.assignment.driver_of("Sora"), Some("Endo"));
    assert_eq!(back.assignment.driver_of("Yui"), Some("Endo"));
    assert!(back.assignment.split_households.is_empty());
    assert_eq!(back.assignment.unplaced, vec!["Aki"]);
}

#[test]
fn vehicle_routes_start_at_home_on_go_and_at_the_spot_on_back() {
    let snapshot = demo_snapshot();
    let plan = build_event_plan(&snapshot, &snapshot.effective_params(), &Direction::ALL).unwrap();

    for route in &plan.leg(Direction::Go).unwrap().routes {
        assert_eq!(
            route.route.stops.first(),
            Some(&RouteStop::Point {
                index: route.household,
                name: route.driver.clone()
            })
        );
        assert_eq!(route.route.stops.last(), Some(&RouteStop::MeetingSpot));
    }
    for route in &plan.leg(Direction::Back).unwrap().routes {
        assert_eq!(route.route.stops.first(), Some(&RouteStop::MeetingSpot));
    }

    // Empty vehicles get no route: Endo carries nobody on the go leg.
    assert!(plan
        .leg(Direction::Go)
        .unwrap()
        .routes
        .iter()
        .all(|route| route.driver != "Endo"));
}

#[test]
fn gathering_route_covers_located_households() {
    let snapshot = demo_snapshot();
    let plan = build_event_plan(&snapshot, &snapshot.effective_params(), &[Direction::Go]).unwrap();

    let text = render_route_text(&plan.gathering_route, &plan.meeting_spot_label);
    assert_eq!(plan.gathering_route.len(), 6);
    assert!(text.ends_with(" → Riverside field"));
    assert!(!text.contains("Fujii"));

    let bodies = plan.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].body.starts_with(&text));
    assert!(bodies[0].body.contains("Unplaced: Aki"));
    assert!(bodies[0].body.contains("Split: Doi"));
}

#[test]
fn geocoding_fills_missing_locations_before_planning() {
    let mut snapshot = demo_snapshot();
    let funabashi = Coordinate::new(35.655, 139.615).unwrap();
    let geocoder = CachedGeocoder::new(
        Box::new(TableGeocoder::new().with_entry("Funabashi 5-2", funabashi)),
        16,
    );

    let report = resolve_snapshot_locations(&mut snapshot, &geocoder);
    assert_eq!(report.resolved, 1);
    assert!(report.unresolved.is_empty());
    assert!(report.meeting_spot_resolved);

    let plan =
        build_event_plan(&snapshot, &snapshot.effective_params(), &[Direction::Back]).unwrap();
    let back = plan.leg(Direction::Back).unwrap();
    assert!(back.assignment.unlocated.is_empty());
    assert!(back.assignment.is_complete());
    assert!(back.assignment.driver_of("Aki").is_some());
}

#[test]
fn fingerprint_changes_when_snapshot_changes() {
    let snapshot = demo_snapshot();
    let params = snapshot.effective_params();
    let before = build_event_plan(&snapshot, &params, &[Direction::Go]).unwrap().fingerprint;

    let mut edited = snapshot.clone();
    edited.households[1].children.push_str(", Sho");
    let after = build_event_plan(&edited, &params, &[Direction::Go]).unwrap().fingerprint;

    assert_ne!(before, after);
}

#[test]
fn blank_rsvp_columns_do_not_abort_the_plan() {
    let snapshot: EventSnapshot = serde_json::from_str(
        r#"{
            "title": "Blank form",
            "meeting_spot": { "location": { "lat": 35.0, "lng": 139.0 } },
            "households": [
                { "name": "Aoki", "lat": 35.01, "lng": 139.0, "children": "Ken",
                  "capacity": 3, "go_ok": true, "back_ok": true, "pickup_only": null },
                { "name": "Baba", "lat": 35.02, "lng": 139.0, "children": "Mio",
                  "capacity": null, "go_ok": null, "back_ok": null, "pickup_only": null },
                { "name": "Chiba", "lat": null, "lng": null, "children": null, "capacity": null }
            ]
        }"#,
    )
    .unwrap();

    let plan = build_event_plan(&snapshot, &snapshot.effective_params(), &Direction::ALL).unwrap();
    for leg in &plan.legs {
        assert_eq!(leg.assignment.driver_of("Mio"), Some("Aoki"));
        assert!(leg.assignment.is_complete());
        assert_eq!(leg.assignment.unlocated, vec!["Chiba"]);
    }
}
