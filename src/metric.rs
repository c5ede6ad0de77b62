//! Great-circle and ellipsoidal distance metrics.
//!
//! `Geodesic` is the default metric: it measures on the WGS-84 ellipsoid.
//! `Haversine` treats the earth as a sphere, which is cheaper and within
//! about half a percent at city scale.

use geo::{Distance, Point};

use crate::traits::DistanceMetric;

/// Mean earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Spherical great-circle distance.
#[derive(Debug, Clone, Copy)]
pub struct Haversine {
    /// Sphere radius in kilometers.
    pub radius_km: f64,
}

impl Default for Haversine {
    fn default() -> Self {
        Self {
            radius_km: EARTH_RADIUS_KM,
        }
    }
}

impl Haversine {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }
}

impl DistanceMetric for Haversine {
    fn distance_km(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        self.radius_km * c
    }
}

/// WGS-84 geodesic distance (Karney's algorithm, via `geo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Geodesic;

impl DistanceMetric for Geodesic {
    fn distance_km(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        // geo points are (x = lng, y = lat)
        let origin = Point::new(from.1, from.0);
        let destination = Point::new(to.1, to.0);
        geo::Geodesic.distance(origin, destination) / 1000.0
    }
}
