//! Route sequencing: order stops into one open path that ends at the meeting spot.
//!
//! Points without a resolved location are dropped. The remaining points are
//! normalized (sorted by coordinate, then name) before the distance matrix is
//! built, so the same point set always yields the same tour regardless of the
//! order the caller supplied it in.

pub mod matrix;
pub mod solver;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{Coordinate, DistanceMetric};
use crate::params::{CarpoolParams, DEFAULT_ROUTE_ITERATION_BUDGET};

pub use matrix::DistanceMatrix;
pub use solver::{solve_open_path, PathSolution};

/// A stop candidate: display name plus an optional resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCoordinate {
    pub name: String,
    pub location: Option<Coordinate>,
}

impl NamedCoordinate {
    pub fn new(name: impl Into<String>, location: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// One stop of a sequenced route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteStop {
    /// A caller-supplied point; `index` refers to the caller's slice.
    Point { index: usize, name: String },
    MeetingSpot,
}

impl RouteStop {
    pub fn label<'a>(&'a self, meeting_spot_label: &'a str) -> &'a str {
        match self {
            RouteStop::Point { name, .. } => name.as_str(),
            RouteStop::MeetingSpot => meeting_spot_label,
        }
    }
}

/// Visiting order for one route. Empty means "no route to display".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOrder {
    pub stops: Vec<RouteStop>,
    pub total_km: f64,
}

impl RouteOrder {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn labels<'a>(&'a self, meeting_spot_label: &'a str) -> Vec<&'a str> {
        self.stops
            .iter()
            .map(|stop| stop.label(meeting_spot_label))
            .collect()
    }

    /// Caller indices of the visited points, in order (meeting spot omitted).
    pub fn point_indices(&self) -> Vec<usize> {
        self.stops
            .iter()
            .filter_map(|stop| match stop {
                RouteStop::Point { index, .. } => Some(*index),
                RouteStop::MeetingSpot => None,
            })
            .collect()
    }

    /// The same path driven in the opposite direction (meeting spot first).
    pub fn reversed(&self) -> Self {
        let mut stops = self.stops.clone();
        stops.reverse();
        Self {
            stops,
            total_km: self.total_km,
        }
    }
}

/// Solver knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptions {
    pub metric: DistanceMetric,
    pub pass_budget: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Planar,
            pass_budget: DEFAULT_ROUTE_ITERATION_BUDGET,
        }
    }
}

impl From<&CarpoolParams> for RouteOptions {
    fn from(params: &CarpoolParams) -> Self {
        Self {
            metric: params.distance_metric,
            pass_budget: params.route_iteration_budget,
        }
    }
}

/// Sequence `points` into one path ending at `meeting_spot`, with default options.
pub fn sequence_route(points: &[NamedCoordinate], meeting_spot: Coordinate) -> RouteOrder {
    sequence_route_with(points, meeting_spot, &RouteOptions::default())
}

pub fn sequence_route_with(
    points: &[NamedCoordinate],
    meeting_spot: Coordinate,
    options: &RouteOptions,
) -> RouteOrder {
    let mut nodes = resolved_nodes(points, None);
    if nodes.is_empty() {
        debug!(points = points.len(), "no resolvable points; nothing to sequence");
        return RouteOrder::empty();
    }
    normalize(&mut nodes);
    solve(&nodes, false, meeting_spot, options)
}

/// Sequence a single vehicle's leg: start at `points[start]`, visit the other
/// points, end at `meeting_spot`.
///
/// Returns an empty order when the start itself has no location.
pub fn sequence_leg(
    points: &[NamedCoordinate],
    start: usize,
    meeting_spot: Coordinate,
    options: &RouteOptions,
) -> RouteOrder {
    let Some(origin) = points.get(start).and_then(|point| point.location) else {
        debug!(start, "leg start has no resolved location; nothing to sequence");
        return RouteOrder::empty();
    };

    let mut nodes = vec![Node {
        index: start,
        name: &points[start].name,
        location: origin,
    }];
    let mut rest = resolved_nodes(points, Some(start));
    normalize(&mut rest);
    nodes.extend(rest);
    solve(&nodes, true, meeting_spot, options)
}

struct Node<'a> {
    index: usize,
    name: &'a str,
    location: Coordinate,
}

fn resolved_nodes(points: &[NamedCoordinate], skip: Option<usize>) -> Vec<Node<'_>> {
    points
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .filter_map(|(index, point)| {
            point.location.map(|location| Node {
                index,
                name: &point.name,
                location,
            })
        })
        .collect()
}

fn normalize(nodes: &mut [Node<'_>]) {
    nodes.sort_by(|a, b| {
        a.location
            .total_cmp(&b.location)
            .then_with(|| a.name.cmp(b.name))
            .then(a.index.cmp(&b.index))
    });
}

fn solve(
    nodes: &[Node<'_>],
    fixed_start: bool,
    meeting_spot: Coordinate,
    options: &RouteOptions,
) -> RouteOrder {
    let mut coordinates: Vec<Coordinate> = nodes.iter().map(|node| node.location).collect();
    coordinates.push(meeting_spot);
    let end = nodes.len();

    let matrix = DistanceMatrix::build(&coordinates, options.metric);
    let solution = solve_open_path(&matrix, fixed_start, options.pass_budget);

    let stops = solution
        .order
        .iter()
        .map(|&node| {
            if node == end {
                RouteStop::MeetingSpot
            } else {
                RouteStop::Point {
                    index: nodes[node].index,
                    name: nodes[node].name.to_string(),
                }
            }
        })
        .collect();

    debug!(
        stops = nodes.len() + 1,
        total_km = solution.total_km,
        passes = solution.passes,
        "sequenced route"
    );
    RouteOrder {
        stops,
        total_km: solution.total_km,
    }
}
