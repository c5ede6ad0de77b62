//! Splits a bin budget across ranked districts.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::density::partial_densities;

/// What the apportioner needs to know about one ranked district.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistrictDemand {
    /// Share of all cases (not yet renormalized over the ranked set).
    pub density: f64,
    /// Candidate points the district can host a bin at.
    pub available_points: u32,
}

/// The budget could not be met because every district keeps at least one bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetInfeasible {
    pub requested: u32,
    pub achieved: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apportionment {
    /// Densities renormalized over the ranked set, in input order.
    pub partial_densities: Vec<f64>,
    /// Bins per district, in input order.
    pub bin_counts: Vec<u32>,
    /// Set when the total ended up above the budget.
    pub shortfall: Option<BudgetInfeasible>,
}

impl Apportionment {
    pub fn total(&self) -> u32 {
        self.bin_counts.iter().sum()
    }
}

/// Gives each district `round(partial_density * budget)` bins, at least one
/// and at most its available points.
///
/// With `exact` set and the total over budget, districts are walked from the
/// lowest ranked upwards taking one bin at a time (never below one) until
/// the total equals `budget` or every district is down to one bin.
///
/// A total still above `budget` is reported in `shortfall` and logged; it is
/// not an error. Districts without available points get zero bins.
pub fn apportion(demands: &[DistrictDemand], budget: u32, exact: bool) -> Apportionment {
    let densities: Vec<f64> = demands.iter().map(|demand| demand.density).collect();
    let partial_densities = partial_densities(&densities);

    let mut bin_counts: Vec<u32> = demands
        .iter()
        .zip(&partial_densities)
        .map(|(demand, partial)| {
            let picked = (partial * f64::from(budget)).round_ties_even() as u32;
            picked.max(1).min(demand.available_points)
        })
        .collect();

    let mut total: u32 = bin_counts.iter().sum();
    if exact && total > budget {
        total = reconcile(&mut bin_counts, total, budget);
    }

    let shortfall = (total > budget).then(|| {
        warn!(
            requested = budget,
            achieved = total,
            "bin budget too low for one bin per covered district, using {} bins",
            total
        );
        BudgetInfeasible {
            requested: budget,
            achieved: total,
        }
    });

    Apportionment {
        partial_densities,
        bin_counts,
        shortfall,
    }
}

/// Trims trailing districts one bin at a time. Returns the new total.
fn reconcile(bin_counts: &mut [u32], mut total: u32, budget: u32) -> u32 {
    loop {
        let mut reduced = false;
        for count in bin_counts.iter_mut().rev() {
            if total <= budget {
                return total;
            }
            if *count > 1 {
                *count -= 1;
                total -= 1;
                reduced = true;
            }
        }
        if !reduced || total <= budget {
            return total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(density: f64, available_points: u32) -> DistrictDemand {
        DistrictDemand {
            density,
            available_points,
        }
    }

    #[test]
    fn test_proportional_split() {
        let result = apportion(&[demand(0.6, 10), demand(0.4, 10)], 10, false);
        assert_eq!(result.bin_counts, vec![6, 4]);
        assert_eq!(result.shortfall, None);
    }

    #[test]
    fn test_renormalizes_over_ranked_set() {
        // 0.45 and 0.15 of all cases are 0.75 and 0.25 of the ranked ones
        let result = apportion(&[demand(0.45, 10), demand(0.15, 10)], 8, false);
        assert!((result.partial_densities[0] - 0.75).abs() < 1e-12);
        assert_eq!(result.bin_counts, vec![6, 2]);
    }

    #[test]
    fn test_clamps_to_available_points_and_minimum_one() {
        let result = apportion(&[demand(0.9, 5), demand(0.1, 5)], 10, true);
        assert_eq!(result.bin_counts, vec![5, 1]);
        assert_eq!(result.total(), 6);
        assert_eq!(result.shortfall, None);
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 0.25 * 10 = 2.5 -> 2, 0.75 * 10 = 7.5 -> 8
        let result = apportion(&[demand(0.75, 20), demand(0.25, 20)], 10, false);
        assert_eq!(result.bin_counts, vec![8, 2]);
    }

    #[test]
    fn test_exact_trims_from_lowest_ranked() {
        // 3 + 2 + 2 after rounding 1.5 up to 2
        let demands = [demand(0.5, 9), demand(0.25, 9), demand(0.25, 9)];
        let result = apportion(&demands, 6, true);
        assert_eq!(result.bin_counts, vec![3, 2, 1]);
        assert_eq!(result.total(), 6);
        assert_eq!(result.shortfall, None);
    }

    #[test]
    fn test_inexact_keeps_overshoot_and_reports_it() {
        let demands = [demand(0.5, 9), demand(0.25, 9), demand(0.25, 9)];
        let result = apportion(&demands, 6, false);
        assert_eq!(result.bin_counts, vec![3, 2, 2]);
        assert_eq!(
            result.shortfall,
            Some(BudgetInfeasible {
                requested: 6,
                achieved: 7
            })
        );
    }

    #[test]
    fn test_exact_sweeps_until_budget_met() {
        // one big district, many tiny ones lifted to a single bin
        let mut demands = vec![demand(0.7, 30)];
        demands.extend(std::iter::repeat_n(demand(0.025, 3), 12));
        let result = apportion(&demands, 20, true);

        assert_eq!(result.total(), 20);
        assert_eq!(result.bin_counts[0], 8);
        assert!(result.bin_counts[1..].iter().all(|&count| count == 1));
        assert_eq!(result.shortfall, None);
    }

    #[test]
    fn test_infeasible_budget_keeps_one_per_district() {
        let demands = [demand(0.5, 4), demand(0.3, 4), demand(0.2, 4)];
        let result = apportion(&demands, 2, true);
        assert_eq!(result.bin_counts, vec![1, 1, 1]);
        assert_eq!(
            result.shortfall,
            Some(BudgetInfeasible {
                requested: 2,
                achieved: 3
            })
        );
    }

    #[test]
    fn test_district_without_points_gets_nothing() {
        let result = apportion(&[demand(0.8, 4), demand(0.2, 0)], 5, false);
        assert_eq!(result.bin_counts, vec![4, 0]);
    }

    #[test]
    fn test_reapportioning_achieved_total_is_idempotent() {
        let demands = [demand(0.9, 5), demand(0.1, 5)];
        let first = apportion(&demands, 10, true);
        let second = apportion(&demands, first.total(), true);
        assert_eq!(first.bin_counts, second.bin_counts);
    }
}
