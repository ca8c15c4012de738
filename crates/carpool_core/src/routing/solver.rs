//! Open-path sequencing over a distance matrix.
//!
//! The last node is always the fixed end (the meeting spot). When
//! `fixed_start` is set, node 0 is the fixed start (a driver's home).
//!
//! Construction is cheapest-arc-first: extend the path from its anchored end
//! with the cheapest arc to an unvisited node. Without a fixed start the path
//! is grown backwards from the meeting spot and reversed. The tour is then
//! improved with 2-opt segment reversals, bounded by a pass budget. Every
//! step breaks ties by lowest index, so the result depends only on the matrix.

use super::matrix::DistanceMatrix;

/// Improvements smaller than this are treated as noise.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct PathSolution {
    /// Node indices in visiting order; the last one is the fixed end.
    pub order: Vec<usize>,
    pub total_km: f64,
    /// 2-opt passes actually performed.
    pub passes: usize,
}

pub fn solve_open_path(
    matrix: &DistanceMatrix,
    fixed_start: bool,
    pass_budget: usize,
) -> PathSolution {
    let n = matrix.size();
    if n == 0 {
        return PathSolution {
            order: Vec::new(),
            total_km: 0.0,
            passes: 0,
        };
    }

    let mut order = cheapest_arc_path(matrix, fixed_start);
    let passes = two_opt_improve(matrix, &mut order, fixed_start, pass_budget);
    let total_km = matrix.path_cost(&order);
    PathSolution {
        order,
        total_km,
        passes,
    }
}

fn cheapest_arc_path(matrix: &DistanceMatrix, fixed_start: bool) -> Vec<usize> {
    let n = matrix.size();
    let end = n - 1;
    let mut visited = vec![false; n];
    visited[end] = true;

    let anchor = if fixed_start && n > 1 {
        visited[0] = true;
        0
    } else {
        end
    };

    let mut path = Vec::with_capacity(n);
    path.push(anchor);
    let mut current = anchor;

    loop {
        let mut best: Option<(usize, f64)> = None;
        for (candidate, seen) in visited.iter().enumerate() {
            if *seen {
                continue;
            }
            let cost = matrix.get(current, candidate);
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((candidate, cost));
            }
        }
        let Some((next, _)) = best else {
            break;
        };
        visited[next] = true;
        path.push(next);
        current = next;
    }

    if anchor == end {
        path.reverse();
    } else {
        path.push(end);
    }
    path
}

/// First-improvement 2-opt over the movable slice of `order`.
///
/// Returns the number of passes run.
fn two_opt_improve(
    matrix: &DistanceMatrix,
    order: &mut [usize],
    fixed_start: bool,
    pass_budget: usize,
) -> usize {
    let len = order.len();
    let first = usize::from(fixed_start);
    // The final node is the fixed end and never moves.
    if len < 3 || len - 1 <= first + 1 {
        return 0;
    }
    let last = len - 2;

    let mut passes = 0;
    while passes < pass_budget {
        passes += 1;
        let mut improved = false;

        for i in first..last {
            for j in (i + 1)..=last {
                let after = order[j + 1];
                let removed = matrix.get(order[j], after)
                    + if i > 0 { matrix.get(order[i - 1], order[i]) } else { 0.0 };
                let added = matrix.get(order[i], after)
                    + if i > 0 { matrix.get(order[i - 1], order[j]) } else { 0.0 };

                if added + IMPROVEMENT_EPSILON < removed {
                    order[i..=j].reverse();
                    improved = true;
                }
            }
        }

        if !improved {
            break;
        }
    }
    passes
}
