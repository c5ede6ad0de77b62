//! Pharmacy sites in three Barcelona health districts.
//!
//! Coordinates are street-level positions in Eixample Dreta (080),
//! Vila de Gràcia (081) and Sants (082).

use bin_locator::model::{CandidatePoint, DistrictCode, PointId};

/// A named site with coordinates.
#[derive(Debug, Clone)]
pub struct Site {
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Site {
    pub const fn new(address: &'static str, lat: f64, lng: f64) -> Self {
        Self { address, lat, lng }
    }
}

// ============================================================================
// Eixample Dreta
// ============================================================================

pub const EIXAMPLE: &[Site] = &[
    Site::new("Passeig de Gràcia 26, 08007 Barcelona", 41.3907, 2.1675),
    Site::new("Carrer Aragó 255, 08007 Barcelona", 41.3918, 2.1637),
    Site::new("Carrer Mallorca 401, 08013 Barcelona", 41.4030, 2.1735),
    Site::new("Avinguda Diagonal 401, 08008 Barcelona", 41.3962, 2.1600),
    Site::new("Carrer Girona 54, 08009 Barcelona", 41.3936, 2.1724),
];

// ============================================================================
// Vila de Gràcia
// ============================================================================

pub const GRACIA: &[Site] = &[
    Site::new("Carrer Gran de Gràcia 120, 08012 Barcelona", 41.4025, 2.1530),
    Site::new("Travessera de Gràcia 180, 08012 Barcelona", 41.4027, 2.1585),
    Site::new("Carrer Verdi 30, 08012 Barcelona", 41.4040, 2.1570),
    Site::new("Plaça de la Virreina 4, 08024 Barcelona", 41.4048, 2.1603),
    Site::new("Carrer Asturies 20, 08012 Barcelona", 41.4010, 2.1555),
];

// ============================================================================
// Sants
// ============================================================================

pub const SANTS: &[Site] = &[
    Site::new("Carrer de Sants 79, 08014 Barcelona", 41.3755, 2.1360),
    Site::new("Carrer Olzinelles 10, 08014 Barcelona", 41.3735, 2.1330),
    Site::new("Plaça de Sants 2, 08028 Barcelona", 41.3757, 2.1345),
];

pub fn code(raw: &str) -> DistrictCode {
    DistrictCode::parse(raw).unwrap()
}

/// Candidate points for `sites`, with ids starting at `first_id`.
pub fn points(district: &str, sites: &[Site], first_id: u32) -> Vec<CandidatePoint> {
    sites
        .iter()
        .enumerate()
        .map(|(offset, site)| CandidatePoint {
            id: PointId(first_id + offset as u32),
            district: code(district),
            address: site.address.to_string(),
            latitude: Some(site.lat),
            longitude: Some(site.lng),
        })
        .collect()
}

/// Every fixture point: 080 ids 0-4, 081 ids 10-14, 082 ids 20-22.
pub fn all_points() -> Vec<CandidatePoint> {
    let mut all = points("080", EIXAMPLE, 0);
    all.extend(points("081", GRACIA, 10));
    all.extend(points("082", SANTS, 20));
    all
}
