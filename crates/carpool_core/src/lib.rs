//! Carpool assignment and routing for school and club events.
//!
//! Households RSVP with a location, a sibling group and the seats they can
//! offer per leg. [`matching`] seats every child in a vehicle for one leg,
//! keeping siblings together where possible; [`routing`] orders stops into an
//! open path that ends at the meeting spot; [`plan`] combines both for a whole
//! event.

pub mod error;
pub mod geo;
pub mod geocode;
pub mod household;
pub mod matching;
pub mod params;
pub mod plan;
pub mod routing;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::CarpoolError;
pub use geo::{Coordinate, DistanceMetric};
pub use household::{Direction, HouseholdEntry, RsvpRecord};
pub use matching::{assign_carpool, assign_carpool_with, AssignmentResult};
pub use params::CarpoolParams;
pub use plan::{build_event_plan, EventPlan, EventSnapshot};
pub use routing::{sequence_route, NamedCoordinate, RouteOrder, RouteStop};
