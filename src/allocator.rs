//! Bin allocation over ranked districts.
//!
//! Ranks districts by case density, splits the bin budget across them, and
//! picks spread-out points inside each district. Districts are independent
//! once the budget is split, so the per-district work runs on rayon.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::apportion::{BudgetInfeasible, DistrictDemand, apportion};
use crate::density::{DistrictDensity, partial_densities, rank_districts};
use crate::depletion::{UsageRates, days_to_fill, pickup_date};
use crate::dispersion::select_dispersed;
use crate::error::AllocError;
use crate::matrix::DistanceMatrix;
use crate::model::{Assignment, CandidatePoint, CaseRecord, DistrictCode, HeatPoint};
use crate::traits::DistanceMetric;

/// Heatmap weight per unit of partial density.
const HEATMAP_WEIGHT_SCALE: f64 = 20.0;

fn default_perc_cover() -> f64 {
    1.0
}

fn default_rate() -> f64 {
    1.0 / 3.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocateOptions {
    /// Total bins to place. `None` puts a bin on every usable point.
    #[serde(default)]
    pub max_bins: Option<u32>,
    /// Trim the apportionment down to `max_bins` when rounding overshoots.
    #[serde(default)]
    pub exact_bins: bool,
    /// Cumulative case density the covered districts must reach, in (0, 1].
    #[serde(default = "default_perc_cover")]
    pub perc_cover: f64,
    /// Units one bin holds.
    pub bin_capacity: u32,
    /// Units thrown away per using person per day.
    #[serde(default = "default_rate")]
    pub mask_throw_rate: f64,
    /// Fraction of the population expected to use bins, in (0, 1].
    #[serde(default = "default_rate")]
    pub pop_to_throw_ratio: f64,
}

impl AllocateOptions {
    pub fn new(bin_capacity: u32) -> Self {
        Self {
            max_bins: None,
            exact_bins: false,
            perc_cover: default_perc_cover(),
            bin_capacity,
            mask_throw_rate: default_rate(),
            pop_to_throw_ratio: default_rate(),
        }
    }

    pub fn with_max_bins(mut self, max_bins: u32, exact: bool) -> Self {
        self.max_bins = Some(max_bins);
        self.exact_bins = exact;
        self
    }

    pub fn with_perc_cover(mut self, perc_cover: f64) -> Self {
        self.perc_cover = perc_cover;
        self
    }

    pub fn with_rates(mut self, mask_throw_rate: f64, pop_to_throw_ratio: f64) -> Self {
        self.mask_throw_rate = mask_throw_rate;
        self.pop_to_throw_ratio = pop_to_throw_ratio;
        self
    }

    pub fn validate(&self) -> Result<(), AllocError> {
        if !(self.perc_cover > 0.0 && self.perc_cover <= 1.0) {
            return Err(AllocError::invalid(format!(
                "perc_cover must be in (0, 1], got {}",
                self.perc_cover
            )));
        }
        if self.bin_capacity == 0 {
            return Err(AllocError::invalid("bin_capacity must be positive"));
        }
        if self.max_bins == Some(0) {
            return Err(AllocError::invalid("max_bins must be positive when set"));
        }
        if !(self.mask_throw_rate.is_finite() && self.mask_throw_rate > 0.0) {
            return Err(AllocError::invalid(format!(
                "mask_throw_rate must be positive, got {}",
                self.mask_throw_rate
            )));
        }
        if !(self.pop_to_throw_ratio > 0.0 && self.pop_to_throw_ratio <= 1.0) {
            return Err(AllocError::invalid(format!(
                "pop_to_throw_ratio must be in (0, 1], got {}",
                self.pop_to_throw_ratio
            )));
        }
        Ok(())
    }

    fn usage_rates(&self) -> UsageRates {
        UsageRates {
            bin_capacity: self.bin_capacity,
            mask_throw_rate: self.mask_throw_rate,
            pop_to_throw_ratio: self.pop_to_throw_ratio,
        }
    }
}

/// Per-district outcome of an allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictAllocation {
    pub district: DistrictCode,
    pub case_count: u64,
    pub density: f64,
    pub partial_density: f64,
    pub available_points: u32,
    pub bin_count: u32,
    pub days_to_fill: Option<u64>,
    pub pickup_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Covered districts by descending density.
    pub districts: Vec<DistrictAllocation>,
    /// Selected points, grouped by district in the same order.
    pub assignments: Vec<Assignment>,
    pub budget_shortfall: Option<BudgetInfeasible>,
}

impl AllocationResult {
    pub fn total_bins(&self) -> usize {
        self.assignments.len()
    }

    /// Assignment coordinates weighted by their district's partial density.
    pub fn heatmap(&self) -> Vec<HeatPoint> {
        self.assignments
            .iter()
            .map(|assignment| HeatPoint {
                latitude: assignment.latitude,
                longitude: assignment.longitude,
                weight: assignment.partial_density * HEATMAP_WEIGHT_SCALE,
            })
            .collect()
    }
}

#[derive(Debug)]
struct CoveredDistrict<'a> {
    density: DistrictDensity,
    points: Vec<&'a CandidatePoint>,
}

/// Runs the whole allocation.
///
/// Points without coordinates or outside the covered districts are ignored.
/// Covered districts left without any usable point are dropped before the
/// budget is split. A district without population gets no pickup date.
pub fn allocate<M>(
    cases: &[CaseRecord],
    points: &[CandidatePoint],
    population: &HashMap<DistrictCode, u64>,
    options: &AllocateOptions,
    metric: &M,
    today: NaiveDate,
) -> Result<AllocationResult, AllocError>
where
    M: DistanceMetric + ?Sized,
{
    options.validate()?;
    if points.is_empty() {
        return Err(AllocError::invalid("no candidate points"));
    }

    let ranked = rank_districts(cases, options.perc_cover)?;
    info!(districts = ranked.len(), perc_cover = options.perc_cover, "ranked districts");

    let covered = cover_with_points(ranked, points);
    if covered.is_empty() {
        return Err(AllocError::invalid(
            "no candidate point with coordinates lies in a covered district",
        ));
    }

    let densities: Vec<f64> = covered.iter().map(|c| c.density.density).collect();
    let (partials, selections, budget_shortfall) = match options.max_bins {
        None => {
            let selections: Vec<Vec<&CandidatePoint>> =
                covered.iter().map(|c| c.points.clone()).collect();
            (partial_densities(&densities), selections, None)
        }
        Some(max_bins) => {
            let demands: Vec<DistrictDemand> = covered
                .iter()
                .map(|c| DistrictDemand {
                    density: c.density.density,
                    available_points: c.points.len() as u32,
                })
                .collect();
            let apportionment = apportion(&demands, max_bins, options.exact_bins);
            info!(
                requested = max_bins,
                apportioned = apportionment.total(),
                exact = options.exact_bins,
                "apportioned bin budget"
            );

            let selections = covered
                .par_iter()
                .zip(apportionment.bin_counts.par_iter())
                .map(|(district, &bins)| select_in_district(district, bins as usize, metric))
                .collect::<Result<Vec<_>, _>>()?;

            (
                apportionment.partial_densities,
                selections,
                apportionment.shortfall,
            )
        }
    };

    let rates = options.usage_rates();
    let mut districts = Vec::with_capacity(covered.len());
    let mut assignments = Vec::new();

    for ((district, partial_density), selected) in covered.iter().zip(partials).zip(selections) {
        let code = &district.density.district;
        let bin_count = selected.len() as u32;
        let people = population.get(code).copied().unwrap_or(0);

        let estimate = days_to_fill(code, bin_count, people, &rates)
            .and_then(|days| Ok((days, pickup_date(code, today, days)?)));
        let (days, date) = match estimate {
            Ok((days, date)) => (Some(days), Some(date)),
            Err(err) => {
                warn!(district = %code, population = people, "{}", err);
                (None, None)
            }
        };

        assignments.extend(selected.iter().filter_map(|point| {
            let (latitude, longitude) = point.coords()?;
            Some(Assignment {
                point_id: point.id,
                direction: point.address.clone(),
                latitude,
                longitude,
                district: code.clone(),
                pickup_date: date,
                partial_density,
            })
        }));

        districts.push(DistrictAllocation {
            district: code.clone(),
            case_count: district.density.case_count,
            density: district.density.density,
            partial_density,
            available_points: district.points.len() as u32,
            bin_count,
            days_to_fill: days,
            pickup_date: date,
        });
    }

    info!(
        districts = districts.len(),
        bins = assignments.len(),
        "assigned bins to points"
    );

    Ok(AllocationResult {
        districts,
        assignments,
        budget_shortfall,
    })
}

/// Pairs each ranked district with its geolocated points, dropping
/// districts that end up with none. Ranking order is kept.
fn cover_with_points(
    ranked: Vec<DistrictDensity>,
    points: &[CandidatePoint],
) -> Vec<CoveredDistrict<'_>> {
    let mut by_district: HashMap<&DistrictCode, Vec<&CandidatePoint>> = HashMap::new();
    for point in points.iter().filter(|point| point.coords().is_some()) {
        by_district.entry(&point.district).or_default().push(point);
    }

    ranked
        .into_iter()
        .filter_map(|density| {
            let points = by_district.remove(&density.district)?;
            Some(CoveredDistrict { density, points })
        })
        .collect()
}

fn select_in_district<'a, M>(
    district: &CoveredDistrict<'a>,
    bins: usize,
    metric: &M,
) -> Result<Vec<&'a CandidatePoint>, AllocError>
where
    M: DistanceMetric + ?Sized,
{
    let locations: Vec<(f64, f64)> = district
        .points
        .iter()
        .filter_map(|point| point.coords())
        .collect();
    let matrix = DistanceMatrix::build(&locations, metric);
    let picked = select_dispersed(&matrix, bins)?;

    debug!(
        district = %district.density.district,
        candidates = locations.len(),
        bins,
        "selected dispersed points"
    );

    Ok(picked.into_iter().map(|index| district.points[index]).collect())
}
