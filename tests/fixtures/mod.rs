//! Test fixtures for bin-locator.
//!
//! Provides realistic test data:
//! - Pharmacy sites in Barcelona health districts
//! - Builders for case records and population tables

#![allow(dead_code)]

pub mod barcelona_pharmacies;

pub use barcelona_pharmacies::*;

use std::collections::HashMap;

use bin_locator::model::{CaseRecord, DistrictCode};

pub fn cases(rows: &[(&str, u64)]) -> Vec<CaseRecord> {
    rows.iter()
        .map(|(district, count)| CaseRecord::new(code(district), *count))
        .collect()
}

pub fn population(rows: &[(&str, u64)]) -> HashMap<DistrictCode, u64> {
    rows.iter()
        .map(|(district, people)| (code(district), *people))
        .collect()
}
