//! bin-locator core
//!
//! Places collection bins at candidate points inside the health districts
//! with the highest infection case density.

pub mod traits;
pub mod error;
pub mod model;
pub mod metric;
pub mod matrix;
pub mod density;
pub mod apportion;
pub mod dispersion;
pub mod depletion;
pub mod allocator;
pub mod population;
pub mod pharmacy;
pub mod socrata;
pub mod geocode;
