//! Google Maps geocoding adapter.

use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;
use crate::traits::Geocoder;

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    config: GeocoderConfig,
    client: reqwest::blocking::Client,
}

impl GoogleGeocoder {
    pub fn new(config: GeocoderConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, SourceError> {
        let body: GeocodeResponse = self
            .client
            .get(self.config.base_url.as_str())
            .query(&[("address", address), ("key", self.config.api_key.as_str())])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json())?;

        resolve(address, body)
    }
}

/// Statuses that mean every further request will fail too.
const FATAL_STATUSES: &[&str] = &["REQUEST_DENIED", "INVALID_REQUEST"];

fn resolve(address: &str, body: GeocodeResponse) -> Result<Option<(f64, f64)>, SourceError> {
    if FATAL_STATUSES.contains(&body.status.as_str()) {
        return Err(SourceError::Geocoding(format!(
            "{}: {}",
            body.status,
            body.error_message.unwrap_or_default()
        )));
    }
    if body.status != "OK" {
        debug!(address, status = %body.status, "geocoder returned no match");
        return Ok(None);
    }

    Ok(body
        .results
        .first()
        .map(|result| (result.geometry.location.lat, result.geometry.location.lng)))
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, results: Vec<(f64, f64)>) -> GeocodeResponse {
        GeocodeResponse {
            status: status.to_string(),
            results: results
                .into_iter()
                .map(|(lat, lng)| GeocodeResult {
                    geometry: Geometry {
                        location: LatLng { lat, lng },
                    },
                })
                .collect(),
            error_message: None,
        }
    }

    #[test]
    fn test_ok_takes_first_result() {
        let body = response("OK", vec![(41.40, 2.17), (40.0, 3.0)]);
        assert_eq!(resolve("x", body).unwrap(), Some((41.40, 2.17)));
    }

    #[test]
    fn test_zero_results_is_unresolved() {
        assert_eq!(resolve("x", response("ZERO_RESULTS", vec![])).unwrap(), None);
    }

    #[test]
    fn test_request_denied_is_error() {
        assert!(matches!(
            resolve("x", response("REQUEST_DENIED", vec![])),
            Err(SourceError::Geocoding(_))
        ));
    }
}
