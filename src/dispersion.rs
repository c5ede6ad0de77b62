//! Greedy max-sum dispersion over a distance matrix.
//!
//! The first pick is the point with the largest summed distance to the
//! whole candidate pool. Every following pick is the remaining point whose
//! summed distance to the already picked points is largest. Ties go to the
//! lowest index. This is an approximation, there is no backtracking.

use crate::error::AllocError;
use crate::matrix::DistanceMatrix;

/// Picks `count` spread-out points and returns their matrix indices in
/// pick order.
///
/// Keeps one running sum per remaining point, so each pick costs a single
/// pass over the pool.
pub fn select_dispersed(matrix: &DistanceMatrix, count: usize) -> Result<Vec<usize>, AllocError> {
    let size = matrix.len();
    if count > size {
        return Err(AllocError::invalid(format!(
            "cannot pick {count} points out of {size}"
        )));
    }

    let mut remaining = vec![true; size];
    let mut picked = Vec::with_capacity(count);

    // Seeded with distances to the full pool for the first pick
    let mut scores: Vec<f64> = (0..size).map(|i| matrix.row(i).iter().sum()).collect();

    for round in 0..count {
        let Some(best) = furthest_remaining(&scores, &remaining) else {
            break;
        };

        remaining[best] = false;
        picked.push(best);

        if round == 0 {
            scores.iter_mut().for_each(|score| *score = 0.0);
        }
        for (candidate, score) in scores.iter_mut().enumerate() {
            if remaining[candidate] {
                *score += matrix.get(candidate, best);
            }
        }
    }

    Ok(picked)
}

fn furthest_remaining(scores: &[f64], remaining: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_score = f64::NEG_INFINITY;
    for (candidate, &score) in scores.iter().enumerate() {
        if remaining[candidate] && score > best_score {
            best = Some(candidate);
            best_score = score;
        }
    }
    // NaN scores never compare greater, fall back to the first remaining
    best.or_else(|| remaining.iter().position(|&open| open))
}
