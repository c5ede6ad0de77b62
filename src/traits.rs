//! Seams between the allocation core and its collaborators.
//!
//! The core only needs distances; the sources and geocoder are how the
//! input tables get built. Concrete HTTP adapters live in `socrata` and
//! `geocode`, tests provide in-memory versions.

use chrono::{Days, NaiveDate};

use crate::error::SourceError;
use crate::model::CaseRecord;
use crate::pharmacy::PharmacyRecord;

/// Distance in kilometers between two `(lat, lng)` coordinates.
///
/// Implementations must be symmetric and return zero for identical inputs.
pub trait DistanceMetric: Sync {
    fn distance_km(&self, from: (f64, f64), to: (f64, f64)) -> f64;
}

/// Window of case records to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseQuery {
    /// Sanitary region code (7803 is Barcelona city).
    pub sanitary_region: u32,
    /// How many days back from `as_of` to include.
    pub days_before: u32,
    pub as_of: NaiveDate,
}

impl CaseQuery {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            sanitary_region: 7803,
            days_before: 14,
            as_of,
        }
    }

    /// First day included in the window.
    pub fn first_date(&self) -> NaiveDate {
        self.as_of
            .checked_sub_days(Days::new(u64::from(self.days_before)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Provides raw case records for a region and lookback window.
pub trait CaseSource {
    fn case_records(&self, query: &CaseQuery) -> Result<Vec<CaseRecord>, SourceError>;
}

/// Provides the raw pharmacy catalogue.
pub trait PharmacySource {
    fn pharmacies(&self) -> Result<Vec<PharmacyRecord>, SourceError>;
}

/// Resolves a postal address into `(lat, lng)`.
///
/// `Ok(None)` means the address could not be located; the caller keeps the
/// point with missing coordinates so it can be reported and fixed by hand.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, SourceError>;
}
