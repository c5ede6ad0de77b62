//! Pairwise distance matrix over one district's candidate points.

use crate::traits::DistanceMetric;

/// Square, symmetric matrix of distances in kilometers with a zero diagonal.
///
/// Indexed by the order of the coordinates it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Computes every unordered pair once and mirrors it.
    pub fn build<M: DistanceMetric + ?Sized>(locations: &[(f64, f64)], metric: &M) -> Self {
        let size = locations.len();
        let mut values = vec![0.0; size * size];

        for i in 0..size {
            for j in (i + 1)..size {
                let km = metric.distance_km(locations[i], locations[j]).max(0.0);
                values[i * size + j] = km;
                values[j * size + i] = km;
            }
        }

        Self { size, values }
    }

    /// Wraps precomputed rows. Returns `None` unless the rows form a square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        let values = rows.into_iter().flatten().collect();
        Some(Self { size, values })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.values[from * self.size..(from + 1) * self.size]
    }
}
