//! Household and driver model.
//!
//! A [`HouseholdEntry`] is one RSVP submission. For a given [`Direction`] the
//! entries are split into a [`LegRoster`]: drivers (non-zero capacity for the
//! leg) with their own children pre-seated, and rider groups (sibling groups
//! that need a seat in somebody's vehicle).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CarpoolError;
use crate::geo::Coordinate;

/// Leg of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Outbound: homes → meeting spot.
    Go,
    /// Return: meeting spot → homes.
    Back,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Go, Direction::Back];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Go => "go",
            Direction::Back => "back",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CarpoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" => Ok(Direction::Go),
            "back" => Ok(Direction::Back),
            other => Err(CarpoolError::UnknownDirection(other.to_string())),
        }
    }
}

/// One RSVP submission in engine form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdEntry {
    /// Guardian identifier; unique within an event for matching purposes.
    pub name: String,
    pub location: Option<Coordinate>,
    /// Sibling group, in submission order.
    #[serde(default)]
    pub child_names: Vec<String>,
    #[serde(default)]
    pub go_capacity: i32,
    #[serde(default)]
    pub back_capacity: i32,
}

impl HouseholdEntry {
    pub fn new(name: impl Into<String>, location: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            location,
            child_names: Vec::new(),
            go_capacity: 0,
            back_capacity: 0,
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.child_names = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_capacity(mut self, direction: Direction, seats: i32) -> Self {
        match direction {
            Direction::Go => self.go_capacity = seats,
            Direction::Back => self.back_capacity = seats,
        }
        self
    }

    /// Same capacity for both legs.
    pub fn with_round_trip_capacity(self, seats: i32) -> Self {
        self.with_capacity(Direction::Go, seats)
            .with_capacity(Direction::Back, seats)
    }

    pub fn capacity(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Go => self.go_capacity,
            Direction::Back => self.back_capacity,
        }
    }

    /// Build an entry from the stored RSVP shape.
    ///
    /// `go` seats are offered only when `go_ok` is set and the household is not
    /// pickup-only; `back` seats only when `back_ok` is set. Missing child names
    /// (when `child_cnt` exceeds the parsed list) get positional placeholders so
    /// every child can be accounted for.
    pub fn from_rsvp(record: &RsvpRecord) -> Self {
        let location = match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => match Coordinate::new(lat, lng) {
                Ok(coordinate) => Some(coordinate),
                Err(err) => {
                    tracing::warn!(household = %record.name, %err, "discarding stored coordinate");
                    None
                }
            },
            _ => None,
        };

        let mut child_names: Vec<String> = record
            .children
            .split([',', '、'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        let declared = record.child_cnt.unwrap_or(0) as usize;
        for position in child_names.len()..declared {
            child_names.push(format!("{} #{}", record.name, position + 1));
        }

        let go_capacity = if record.go_ok && !record.pickup_only {
            record.capacity
        } else {
            0
        };
        let back_capacity = if record.back_ok { record.capacity } else { 0 };

        Self {
            name: record.name.clone(),
            location,
            child_names,
            go_capacity,
            back_capacity,
        }
    }
}

/// The stored RSVP record: one capacity plus per-leg availability flags and a
/// comma-separated child list.
///
/// Every stored column is nullable; `null` reads as empty, zero or false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsvpRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub children: String,
    pub child_cnt: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub capacity: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub go_ok: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub back_ok: bool,
    /// Available for the return pickup only.
    #[serde(deserialize_with = "null_as_default")]
    pub pickup_only: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-leg state of one driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverState {
    /// Index of the household in the input list.
    pub household: usize,
    pub name: String,
    pub location: Option<Coordinate>,
    pub capacity: u32,
    pub free_seats: u32,
    /// The driver's own children, seated before anyone else.
    pub own_children: Vec<String>,
    /// Children from other households, in seating order.
    pub assigned_riders: Vec<String>,
    /// Households (by input index) with at least one child in this vehicle.
    pub rider_households: Vec<usize>,
}

impl DriverState {
    /// Riders assigned so far; own children do not count towards load.
    pub fn load(&self) -> usize {
        self.assigned_riders.len()
    }

    /// A driver is a candidate only with a resolved location and enough free seats.
    pub fn can_seat(&self, seats: usize) -> bool {
        seats > 0 && self.location.is_some() && self.free_seats as usize >= seats
    }

    pub(crate) fn seat(&mut self, household: usize, child: String) {
        debug_assert!(self.free_seats > 0, "seat() called on a full vehicle");
        self.free_seats -= 1;
        self.assigned_riders.push(child);
        if !self.rider_households.contains(&household) {
            self.rider_households.push(household);
        }
    }
}

/// A sibling group that needs seats in another household's vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderGroup {
    pub household: usize,
    pub name: String,
    pub location: Option<Coordinate>,
    pub children: Vec<String>,
    /// Children left over after the household's own vehicle filled up; the
    /// rest of the siblings are already riding with their guardian.
    pub overflow: bool,
}

impl RiderGroup {
    pub fn size(&self) -> usize {
        self.children.len()
    }
}

/// Drivers and rider groups for one leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegRoster {
    pub direction: Direction,
    pub drivers: Vec<DriverState>,
    pub groups: Vec<RiderGroup>,
    /// Households excluded from matching because their location is unresolved.
    pub unlocated: Vec<String>,
}

impl LegRoster {
    /// Split the household list into drivers and rider groups for `direction`.
    ///
    /// Returns an error only for a negative declared capacity.
    pub fn build(
        households: &[HouseholdEntry],
        direction: Direction,
    ) -> Result<Self, CarpoolError> {
        let mut drivers = Vec::new();
        let mut groups = Vec::new();
        let mut unlocated = Vec::new();

        for (index, household) in households.iter().enumerate() {
            let capacity = household.capacity(direction);
            if capacity < 0 {
                return Err(CarpoolError::NegativeCapacity {
                    household: household.name.clone(),
                    direction: direction.to_string(),
                    capacity,
                });
            }
            if household.location.is_none() {
                unlocated.push(household.name.clone());
            }

            let children = &household.child_names;
            if capacity == 0 {
                if !children.is_empty() {
                    groups.push(RiderGroup {
                        household: index,
                        name: household.name.clone(),
                        location: household.location,
                        children: children.clone(),
                        overflow: false,
                    });
                }
                continue;
            }

            let capacity = capacity as u32;
            let seated = children.len().min(capacity as usize);
            let (own, rest) = children.split_at(seated);
            drivers.push(DriverState {
                household: index,
                name: household.name.clone(),
                location: household.location,
                capacity,
                free_seats: capacity - seated as u32,
                own_children: own.to_vec(),
                assigned_riders: Vec::new(),
                rider_households: Vec::new(),
            });
            if !rest.is_empty() {
                groups.push(RiderGroup {
                    household: index,
                    name: household.name.clone(),
                    location: household.location,
                    children: rest.to_vec(),
                    overflow: true,
                });
            }
        }

        Ok(Self {
            direction,
            drivers,
            groups,
            unlocated,
        })
    }

    pub fn total_free_seats(&self) -> u32 {
        self.drivers
            .iter()
            .filter(|driver| driver.location.is_some())
            .map(|driver| driver.free_seats)
            .sum()
    }
}
