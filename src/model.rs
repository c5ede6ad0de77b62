//! Value records shared by the allocation stages.
//!
//! Every record here is produced by one stage and consumed read-only by the
//! next; nothing is mutated after construction.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AllocError;

/// Zero-padded three digit code of a basic health area (ABS).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistrictCode(String);

impl DistrictCode {
    const WIDTH: usize = 3;

    /// Parses a code, left-padding shorter digit strings with zeros.
    pub fn parse(raw: &str) -> Result<Self, AllocError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > Self::WIDTH
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AllocError::invalid(format!(
                "district code {raw:?} is not a 1-3 digit number"
            )));
        }
        Ok(Self(format!("{trimmed:0>3}")))
    }

    /// Builds a code from its numeric form, e.g. `80` becomes `"080"`.
    pub fn from_number(number: u32) -> Result<Self, AllocError> {
        if number > 999 {
            return Err(AllocError::invalid(format!(
                "district number {number} does not fit in three digits"
            )));
        }
        Ok(Self(format!("{number:03}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistrictCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DistrictCode {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DistrictCode {
    type Error = AllocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DistrictCode> for String {
    fn from(code: DistrictCode) -> Self {
        code.0
    }
}

/// One row of observed infection cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub district: DistrictCode,
    pub case_count: u64,
    pub date: Option<NaiveDate>,
}

impl CaseRecord {
    pub fn new(district: DistrictCode, case_count: u64) -> Self {
        Self {
            district,
            case_count,
            date: None,
        }
    }
}

/// Identifier of a candidate point, unique within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u32);

/// A site a bin could be placed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoint {
    pub id: PointId,
    pub district: DistrictCode,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CandidatePoint {
    /// `(lat, lng)` when both coordinates are known and finite.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}

/// A selected point with the metadata reported downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub point_id: PointId,
    pub direction: String,
    pub latitude: f64,
    pub longitude: f64,
    pub district: DistrictCode,
    /// `None` when the district's depletion estimate is undefined.
    pub pickup_date: Option<NaiveDate>,
    pub partial_density: f64,
}

/// A weighted coordinate for heatmap rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub weight: f64,
}
