//! District ranking by infection case density.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AllocError;
use crate::model::{CaseRecord, DistrictCode};

/// A district's share of all observed cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictDensity {
    pub district: DistrictCode,
    pub case_count: u64,
    /// `case_count / total cases`, in `[0, 1]`.
    pub density: f64,
}

/// Aggregates cases per district and returns the shortest prefix of
/// districts, by descending density, whose cumulative density reaches
/// `coverage`.
///
/// Districts with equal density keep the order in which they first appear
/// in `cases`. Districts with no cases are never returned.
pub fn rank_districts(
    cases: &[CaseRecord],
    coverage: f64,
) -> Result<Vec<DistrictDensity>, AllocError> {
    if cases.is_empty() {
        return Err(AllocError::invalid("no case records"));
    }
    if coverage.is_nan() || coverage <= 0.0 {
        return Err(AllocError::invalid(format!(
            "coverage threshold must be positive, got {coverage}"
        )));
    }

    let mut order: Vec<DistrictCode> = Vec::new();
    let mut totals: HashMap<&DistrictCode, u64> = HashMap::new();
    for record in cases {
        let total = totals.entry(&record.district).or_insert_with(|| {
            order.push(record.district.clone());
            0
        });
        *total += record.case_count;
    }

    let grand_total: u64 = totals.values().sum();
    if grand_total == 0 {
        return Err(AllocError::invalid("case records sum to zero"));
    }

    let mut ranked: Vec<DistrictDensity> = order
        .into_iter()
        .filter_map(|district| {
            let case_count = totals[&district];
            (case_count > 0).then(|| DistrictDensity {
                density: case_count as f64 / grand_total as f64,
                district,
                case_count,
            })
        })
        .collect();

    // stable sort keeps first-seen order among ties
    ranked.sort_by(|a, b| b.density.total_cmp(&a.density));

    let mut cumulative = 0.0;
    let mut cut = ranked.len();
    for (i, district) in ranked.iter().enumerate() {
        cumulative += district.density;
        if cumulative >= coverage {
            cut = i + 1;
            break;
        }
    }
    ranked.truncate(cut);

    debug!(
        districts = ranked.len(),
        coverage,
        grand_total,
        "ranked districts by case density"
    );

    Ok(ranked)
}

/// Renormalizes densities so they sum to one over the given set.
pub fn partial_densities(densities: &[f64]) -> Vec<f64> {
    let total: f64 = densities.iter().sum();
    if total <= 0.0 {
        return vec![0.0; densities.len()];
    }
    densities.iter().map(|density| density / total).collect()
}
