//! Estimates when a district's bins will be full.

use chrono::{Days, NaiveDate};

use crate::error::AllocError;
use crate::model::DistrictCode;

/// Usage assumptions shared by every district.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageRates {
    /// Units one bin holds before it needs emptying.
    pub bin_capacity: u32,
    /// Units thrown away per using person per day.
    pub mask_throw_rate: f64,
    /// Fraction of the population expected to use the bins.
    pub pop_to_throw_ratio: f64,
}

/// Whole days until `bin_count` bins are full, rounded half to even.
///
/// Fails with `UndefinedEstimate` when the district produces no waste per
/// day (zero population or zero rates).
pub fn days_to_fill(
    district: &DistrictCode,
    bin_count: u32,
    population: u64,
    rates: &UsageRates,
) -> Result<u64, AllocError> {
    let daily = population as f64 * rates.pop_to_throw_ratio * rates.mask_throw_rate;
    if !daily.is_finite() || daily <= 0.0 {
        return Err(AllocError::UndefinedEstimate {
            district: district.clone(),
        });
    }

    let capacity = f64::from(bin_count) * f64::from(rates.bin_capacity);
    Ok((capacity / daily).round_ties_even() as u64)
}

/// Calendar date `days` after `today`.
pub fn pickup_date(
    district: &DistrictCode,
    today: NaiveDate,
    days: u64,
) -> Result<NaiveDate, AllocError> {
    today
        .checked_add_days(Days::new(days))
        .ok_or_else(|| AllocError::UndefinedEstimate {
            district: district.clone(),
        })
}
