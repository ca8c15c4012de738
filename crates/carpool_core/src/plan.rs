//! Event planning: both legs of an event, seated and sequenced.
//!
//! An [`EventSnapshot`] is everything the persistence layer knows about one
//! event (meeting spot plus stored RSVP records). [`build_event_plan`] turns
//! it into an [`EventPlan`]:
//!
//! - per leg, the seat assignment and one route per occupied vehicle
//!   (`go` starts at the driver's home and ends at the meeting spot, `back`
//!   drives the same path from the meeting spot),
//! - the gathering route over every located household,
//! - a SHA-256 fingerprint of the inputs, so stored plans can be checked for staleness.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::CarpoolError;
use crate::geo::Coordinate;
use crate::household::{Direction, HouseholdEntry, RsvpRecord};
use crate::matching::{assign_carpool_with, AssignmentResult, DriverAssignment};
use crate::params::CarpoolParams;
use crate::routing::{
    sequence_leg, sequence_route_with, NamedCoordinate, RouteOptions, RouteOrder, RouteStop,
};

/// Separator between stop labels in rendered routes.
pub const ROUTE_SEPARATOR: &str = " → ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingSpot {
    /// Display label; falls back to `CarpoolParams::meeting_spot_label` when empty.
    pub label: String,
    pub address: Option<String>,
    pub location: Option<Coordinate>,
}

/// One event as stored: meeting spot, RSVPs and optional planning overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSnapshot {
    pub title: String,
    pub meeting_spot: MeetingSpot,
    pub households: Vec<RsvpRecord>,
    pub params: Option<CarpoolParams>,
}

impl EventSnapshot {
    pub fn household_entries(&self) -> Vec<HouseholdEntry> {
        self.households.iter().map(HouseholdEntry::from_rsvp).collect()
    }

    /// Parameters embedded in the snapshot, or the defaults.
    pub fn effective_params(&self) -> CarpoolParams {
        self.params.clone().unwrap_or_default()
    }
}

/// The sequenced route of one occupied vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRoute {
    /// Index of the driver's household in the snapshot.
    pub household: usize,
    pub driver: String,
    /// Point indices refer to households in the snapshot.
    pub route: RouteOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegPlan {
    pub direction: Direction,
    pub assignment: AssignmentResult,
    pub routes: Vec<DriverRoute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPlan {
    pub title: String,
    pub meeting_spot_label: String,
    pub fingerprint: String,
    pub legs: Vec<LegPlan>,
    /// Open path over every located household, ending at the meeting spot.
    pub gathering_route: RouteOrder,
}

/// Stored text of one leg's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBody {
    pub direction: Direction,
    pub body: String,
}

impl EventPlan {
    pub fn leg(&self, direction: Direction) -> Option<&LegPlan> {
        self.legs.iter().find(|leg| leg.direction == direction)
    }

    /// One text body per planned leg.
    pub fn bodies(&self) -> Vec<PlanBody> {
        self.legs
            .iter()
            .map(|leg| PlanBody {
                direction: leg.direction,
                body: self.render_leg(leg),
            })
            .collect()
    }

    fn render_leg(&self, leg: &LegPlan) -> String {
        let label = self.meeting_spot_label.as_str();
        let mut lines = Vec::new();
        if !self.gathering_route.is_empty() {
            lines.push(render_route_text(&self.gathering_route, label));
        }
        for route in &leg.routes {
            let riders: Vec<&str> = leg
                .assignment
                .assignments
                .iter()
                .find(|assignment| assignment.household == route.household)
                .map(|assignment| assignment.children().collect())
                .unwrap_or_default();
            let path = if route.route.is_empty() {
                "(no route)".to_string()
            } else {
                render_route_text(&route.route, label)
            };
            lines.push(format!("{} [{}]: {}", route.driver, riders.join(", "), path));
        }
        if !leg.assignment.unplaced.is_empty() {
            lines.push(format!("Unplaced: {}", leg.assignment.unplaced.join(", ")));
        }
        if !leg.assignment.split_households.is_empty() {
            lines.push(format!("Split: {}", leg.assignment.split_households.join(", ")));
        }
        lines.join("\n")
    }
}

/// Stop labels joined with [`ROUTE_SEPARATOR`].
pub fn render_route_text(route: &RouteOrder, meeting_spot_label: &str) -> String {
    route.labels(meeting_spot_label).join(ROUTE_SEPARATOR)
}

/// SHA-256 (hex) over the canonical JSON of the snapshot and the parameters.
pub fn snapshot_fingerprint(
    snapshot: &EventSnapshot,
    params: &CarpoolParams,
) -> Result<String, CarpoolError> {
    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut hasher, &(snapshot, params))
        .map_err(|err| CarpoolError::Encode(err.to_string()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Seat and sequence the requested legs of an event.
///
/// Routes are empty when the meeting spot has no resolved location; the
/// assignments are still computed.
pub fn build_event_plan(
    snapshot: &EventSnapshot,
    params: &CarpoolParams,
    directions: &[Direction],
) -> Result<EventPlan, CarpoolError> {
    params.validate()?;
    let households = snapshot.household_entries();
    let spot = snapshot.meeting_spot.location;
    if spot.is_none() {
        warn!(
            event = %snapshot.title,
            "meeting spot has no resolved location; routes will be empty"
        );
    }

    let leg_for = |direction: Direction| plan_leg(&households, direction, spot, params);
    let legs = if params.parallel_legs && directions.len() > 1 {
        directions
            .par_iter()
            .map(|&direction| leg_for(direction))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        directions
            .iter()
            .map(|&direction| leg_for(direction))
            .collect::<Result<Vec<_>, _>>()?
    };

    let gathering_route = match spot {
        Some(spot) => {
            sequence_route_with(&named_points(&households), spot, &RouteOptions::from(params))
        }
        None => RouteOrder::empty(),
    };

    let meeting_spot_label = if snapshot.meeting_spot.label.trim().is_empty() {
        params.meeting_spot_label.clone()
    } else {
        snapshot.meeting_spot.label.clone()
    };

    info!(
        event = %snapshot.title,
        legs = legs.len(),
        gathering_stops = gathering_route.len(),
        "built event plan"
    );
    Ok(EventPlan {
        title: snapshot.title.clone(),
        meeting_spot_label,
        fingerprint: snapshot_fingerprint(snapshot, params)?,
        legs,
        gathering_route,
    })
}

fn named_points(households: &[HouseholdEntry]) -> Vec<NamedCoordinate> {
    households
        .iter()
        .map(|household| NamedCoordinate::new(household.name.clone(), household.location))
        .collect()
}

fn plan_leg(
    households: &[HouseholdEntry],
    direction: Direction,
    spot: Option<Coordinate>,
    params: &CarpoolParams,
) -> Result<LegPlan, CarpoolError> {
    let assignment = assign_carpool_with(households, direction, params)?;
    let options = RouteOptions::from(params);

    let routes = assignment
        .assignments
        .iter()
        .filter(|vehicle| vehicle.children().next().is_some())
        .map(|vehicle| {
            let route = match spot {
                Some(spot) => vehicle_route(households, vehicle, direction, spot, &options),
                None => RouteOrder::empty(),
            };
            DriverRoute {
                household: vehicle.household,
                driver: vehicle.driver.clone(),
                route,
            }
        })
        .collect();

    Ok(LegPlan {
        direction,
        assignment,
        routes,
    })
}

fn vehicle_route(
    households: &[HouseholdEntry],
    vehicle: &DriverAssignment,
    direction: Direction,
    spot: Coordinate,
    options: &RouteOptions,
) -> RouteOrder {
    let mut members = vec![vehicle.household];
    members.extend(
        vehicle
            .rider_households
            .iter()
            .copied()
            .filter(|&household| household != vehicle.household),
    );
    let points: Vec<NamedCoordinate> = members
        .iter()
        .map(|&index| {
            NamedCoordinate::new(households[index].name.clone(), households[index].location)
        })
        .collect();

    let mut route = sequence_leg(&points, 0, spot, options);
    for stop in &mut route.stops {
        if let RouteStop::Point { index, .. } = stop {
            *index = members[*index];
        }
    }

    match direction {
        Direction::Go => route,
        Direction::Back => route.reversed(),
    }
}
