//! Population per district from the health registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AllocError;
use crate::model::DistrictCode;

/// One registry row: official population of a district in a given year,
/// usually split by age band or sex, hence the need to sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub district_number: u32,
    pub year: i32,
    pub population: u64,
}

/// Sums the rows of `year` per zero-padded district code.
pub fn aggregate_population(
    records: &[PopulationRecord],
    year: i32,
) -> Result<HashMap<DistrictCode, u64>, AllocError> {
    let mut totals = HashMap::new();
    for record in records.iter().filter(|record| record.year == year) {
        let code = DistrictCode::from_number(record.district_number)?;
        *totals.entry(code).or_insert(0) += record.population;
    }
    Ok(totals)
}
