//! Plan a small event in memory and print both legs.
//!
//! Run with `cargo run -p carpool_core --example plan_event`.

use carpool_core::household::{Direction, RsvpRecord};
use carpool_core::params::CarpoolParams;
use carpool_core::plan::{build_event_plan, EventSnapshot, MeetingSpot};
use carpool_core::Coordinate;

fn household(name: &str, lat: f64, lng: f64, children: &str, capacity: i32) -> RsvpRecord {
    RsvpRecord {
        name: name.to_string(),
        lat: Some(lat),
        lng: Some(lng),
        children: children.to_string(),
        capacity,
        go_ok: capacity > 0,
        back_ok: capacity > 0,
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = EventSnapshot {
        title: "Swimming gala".to_string(),
        meeting_spot: MeetingSpot {
            label: "Aquatic centre".to_string(),
            address: None,
            location: Some(Coordinate::new(35.680, 139.760)?),
        },
        households: vec![
            household("Aoki", 35.698, 139.760, "Ken", 4),
            household("Baba", 35.690, 139.770, "Mio, Rin", 0),
            household("Chiba", 35.665, 139.745, "Sora", 2),
            household("Doi", 35.670, 139.752, "Yui", 0),
        ],
        params: None,
    };

    let params = CarpoolParams::default().with_meeting_spot_label("Aquatic centre");
    let plan = build_event_plan(&snapshot, &params, &Direction::ALL)?;

    println!("{} ({})", plan.title, &plan.fingerprint[..12]);
    for body in plan.bodies() {
        println!("\n[{}]\n{}", body.direction, body.body);
    }
    Ok(())
}
