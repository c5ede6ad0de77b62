//! Pharmacy catalogue records and their conversion into candidate points.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::model::{CandidatePoint, DistrictCode, PointId};
use crate::traits::Geocoder;

/// Street number the catalogue uses for sites without one.
const NO_NUMBER: &str = "S/N";

/// One row of the pharmacy catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyRecord {
    pub district: DistrictCode,
    /// Street type abbreviation, e.g. `CR` or `AV`.
    pub street_type: String,
    pub street_name: String,
    pub street_number: String,
    pub postal_code: String,
}

/// A pharmacy with a full postal address, ready to geocode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharmacyAddress {
    pub district: DistrictCode,
    pub address: String,
}

/// Candidate points plus the addresses the geocoder could not place.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPoints {
    pub points: Vec<CandidatePoint>,
    pub unresolved: Vec<String>,
}

pub fn expand_street_type(code: &str) -> Option<&'static str> {
    let name = match code {
        "CR" => "Carrer",
        "GV" => "Gran Via",
        "PL" => "Plaça",
        "RB" => "Rambla",
        "AV" => "Avinguda",
        "TS" => "Travessera",
        "RD" => "Ronda",
        "PS" => "Passeig",
        "MO" => "Monestir",
        "VI" => "Via",
        "PG" => "Passatge",
        "RI" => "Riera",
        "TO" => "Torrent",
        "BX" => "Baixada",
        "CT" => "Carretera",
        _ => return None,
    };
    Some(name)
}

/// Keeps pharmacies in `districts` that have a street number and formats
/// their postal address as `"<type> <name> <number>, <postal> <city>"`.
pub fn prepare_addresses(
    records: &[PharmacyRecord],
    districts: &HashSet<DistrictCode>,
    city: &str,
) -> Vec<PharmacyAddress> {
    let mut skipped_no_number = 0usize;
    let addresses: Vec<PharmacyAddress> = records
        .iter()
        .filter(|record| districts.contains(&record.district))
        .filter(|record| {
            let numbered = record.street_number.trim() != NO_NUMBER;
            if !numbered {
                skipped_no_number += 1;
            }
            numbered
        })
        .map(|record| {
            let street_type = match expand_street_type(record.street_type.trim()) {
                Some(name) => name.to_string(),
                None => {
                    warn!(street_type = %record.street_type, "unknown street type, kept verbatim");
                    record.street_type.trim().to_string()
                }
            };
            PharmacyAddress {
                district: record.district.clone(),
                address: format!(
                    "{} {} {}, {} {}",
                    street_type,
                    record.street_name.trim(),
                    record.street_number.trim(),
                    record.postal_code.trim(),
                    city
                ),
            }
        })
        .collect();

    if skipped_no_number > 0 {
        warn!(count = skipped_no_number, "skipped pharmacies without street number");
    }
    debug!(kept = addresses.len(), total = records.len(), "prepared pharmacy addresses");

    addresses
}

/// Geocodes every address. Points the geocoder cannot place keep missing
/// coordinates and are listed in `unresolved` for manual correction.
///
/// Point ids follow input order, starting at zero.
pub fn geocode_points<G: Geocoder + ?Sized>(
    addresses: &[PharmacyAddress],
    geocoder: &G,
) -> Result<GeocodedPoints, SourceError> {
    let mut points = Vec::with_capacity(addresses.len());
    let mut unresolved = Vec::new();

    for (index, entry) in addresses.iter().enumerate() {
        let coords = geocoder.geocode(&entry.address)?;
        if coords.is_none() {
            warn!(address = %entry.address, "address coordinates could not be found");
            unresolved.push(entry.address.clone());
        }
        points.push(CandidatePoint {
            id: PointId(index as u32),
            district: entry.district.clone(),
            address: entry.address.clone(),
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lng)| lng),
        });
    }

    info!(
        geocoded = points.len() - unresolved.len(),
        unresolved = unresolved.len(),
        "geocoded candidate points"
    );

    Ok(GeocodedPoints { points, unresolved })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn code(raw: &str) -> DistrictCode {
        DistrictCode::parse(raw).unwrap()
    }

    fn record(district: &str, street_type: &str, name: &str, number: &str) -> PharmacyRecord {
        PharmacyRecord {
            district: code(district),
            street_type: street_type.to_string(),
            street_name: name.to_string(),
            street_number: number.to_string(),
            postal_code: "08013".to_string(),
        }
    }

    struct FixedGeocoder(HashMap<String, (f64, f64)>);

    impl Geocoder for FixedGeocoder {
        fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, SourceError> {
            Ok(self.0.get(address).copied())
        }
    }

    #[test]
    fn test_formats_address_with_expanded_street_type() {
        let districts = HashSet::from([code("080")]);
        let addresses = prepare_addresses(
            &[record("080", "AV", "Diagonal", "401")],
            &districts,
            "Barcelona",
        );
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].address, "Avinguda Diagonal 401, 08013 Barcelona");
    }

    #[test]
    fn test_filters_district_and_missing_number() {
        let districts = HashSet::from([code("080")]);
        let addresses = prepare_addresses(
            &[
                record("080", "CR", "Mallorca", "S/N"),
                record("081", "CR", "Provença", "10"),
                record("080", "PL", "Sagrada Família", "5"),
            ],
            &districts,
            "Barcelona",
        );
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].address, "Plaça Sagrada Família 5, 08013 Barcelona");
    }

    #[test]
    fn test_unknown_street_type_kept_verbatim() {
        let districts = HashSet::from([code("080")]);
        let addresses =
            prepare_addresses(&[record("080", "XX", "Nova", "2")], &districts, "Barcelona");
        assert_eq!(addresses[0].address, "XX Nova 2, 08013 Barcelona");
    }

    #[test]
    fn test_geocode_points_keeps_unresolved() {
        let addresses = vec![
            PharmacyAddress {
                district: code("080"),
                address: "Carrer Mallorca 1, 08013 Barcelona".to_string(),
            },
            PharmacyAddress {
                district: code("080"),
                address: "Carrer Inexistent 9, 08013 Barcelona".to_string(),
            },
        ];
        let geocoder = FixedGeocoder(HashMap::from([(
            "Carrer Mallorca 1, 08013 Barcelona".to_string(),
            (41.40, 2.17),
        )]));

        let result = geocode_points(&addresses, &geocoder).unwrap();
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.points[0].coords(), Some((41.40, 2.17)));
        assert_eq!(result.points[1].coords(), None);
        assert_eq!(result.points[1].id, PointId(1));
        assert_eq!(result.unresolved, vec!["Carrer Inexistent 9, 08013 Barcelona"]);
    }
}
