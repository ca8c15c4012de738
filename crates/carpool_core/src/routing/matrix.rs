use crate::geo::{Coordinate, DistanceMetric};

/// Dense symmetric distance matrix, stored flat for cache locality.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    pub fn build(points: &[Coordinate], metric: DistanceMetric) -> Self {
        let size = points.len();
        let mut cells = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = metric.distance_km(points[i], points[j]);
                cells[i * size + j] = d;
                cells[j * size + i] = d;
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.size + to]
    }

    /// Total length of an open path visiting `order` in sequence.
    pub fn path_cost(&self, order: &[usize]) -> f64 {
        order.windows(2).map(|leg| self.get(leg[0], leg[1])).sum()
    }
}
