//! Socrata open data HTTP adapter for case records and the pharmacy catalogue.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::model::{CaseRecord, DistrictCode};
use crate::pharmacy::PharmacyRecord;
use crate::traits::{CaseQuery, CaseSource, PharmacySource};

#[derive(Debug, Clone)]
pub struct SocrataConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Rows requested per page (`$limit`).
    pub page_size: usize,
    /// COVID-19 case register dataset id.
    pub cases_dataset: String,
    /// Pharmacy catalogue dataset id.
    pub pharmacies_dataset: String,
}

impl Default for SocrataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://analisi.transparenciacatalunya.cat".to_string(),
            timeout_secs: 10,
            page_size: 1000,
            cases_dataset: "xuwf-dxjd".to_string(),
            pharmacies_dataset: "f446-3fny".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SocrataClient {
    config: SocrataConfig,
    client: reqwest::blocking::Client,
}

impl SocrataClient {
    pub fn new(config: SocrataConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn resource_url(&self, dataset: &str) -> String {
        format!(
            "{}/resource/{}.json",
            self.config.base_url.trim_end_matches('/'),
            dataset
        )
    }

    /// Fetches every row of `dataset`, one page at a time, until a page
    /// comes back shorter than `page_size`.
    fn fetch_all<T: DeserializeOwned>(
        &self,
        dataset: &str,
        filter: Option<&str>,
    ) -> Result<Vec<T>, SourceError> {
        let url = self.resource_url(dataset);
        let page_size = self.config.page_size.max(1);
        let mut rows = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut params = vec![
                ("$limit", page_size.to_string()),
                ("$offset", offset.to_string()),
                ("$order", ":id".to_string()),
            ];
            if let Some(filter) = filter {
                params.push(("$where", filter.to_string()));
            }

            let page: Vec<T> = self
                .client
                .get(url.as_str())
                .query(&params)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.json())?;

            let fetched = page.len();
            debug!(dataset, offset, fetched, "fetched page");
            rows.extend(page);

            if fetched < page_size {
                break;
            }
            offset += fetched;
        }

        Ok(rows)
    }
}

impl CaseSource for SocrataClient {
    fn case_records(&self, query: &CaseQuery) -> Result<Vec<CaseRecord>, SourceError> {
        let first_date = query.first_date();
        let filter = format!(
            "regiosanitariacodi = '{}' AND data >= '{}T00:00:00'",
            query.sanitary_region,
            first_date.format("%Y-%m-%d")
        );
        info!(region = query.sanitary_region, since = %first_date, "fetching case records");

        let rows: Vec<CaseRow> = self.fetch_all(&self.config.cases_dataset, Some(filter.as_str()))?;
        let total = rows.len();
        let records = rows
            .into_iter()
            .filter_map(|row| row.into_record().transpose())
            .collect::<Result<Vec<_>, _>>()?;

        if records.len() < total {
            warn!(
                skipped = total - records.len(),
                "skipped case rows without a usable district code"
            );
        }
        Ok(records)
    }
}

impl PharmacySource for SocrataClient {
    fn pharmacies(&self) -> Result<Vec<PharmacyRecord>, SourceError> {
        info!("fetching pharmacy catalogue");
        let rows: Vec<PharmacyRow> = self.fetch_all(&self.config.pharmacies_dataset, None)?;
        let total = rows.len();
        let records: Vec<PharmacyRecord> = rows
            .into_iter()
            .filter_map(PharmacyRow::into_record)
            .collect();

        if records.len() < total {
            warn!(
                skipped = total - records.len(),
                "skipped pharmacy rows without a usable district code"
            );
        }
        Ok(records)
    }
}

/// Socrata serialises numbers as strings, but not every proxy does.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn value(&self) -> Result<u64, SourceError> {
        match self {
            Count::Number(value) => Ok(*value),
            Count::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| SourceError::Malformed(format!("case count {text:?}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    abscodi: Option<String>,
    numcasos: Option<Count>,
    data: Option<String>,
}

impl CaseRow {
    /// `Ok(None)` for rows that are not attributed to a district.
    fn into_record(self) -> Result<Option<CaseRecord>, SourceError> {
        let Some(district) = self.abscodi.and_then(|raw| DistrictCode::parse(&raw).ok()) else {
            return Ok(None);
        };
        let case_count = match &self.numcasos {
            Some(count) => count.value()?,
            None => return Err(SourceError::Malformed(format!("no case count for {district}"))),
        };
        let date = self.data.as_deref().and_then(parse_date);

        Ok(Some(CaseRecord {
            district,
            case_count,
            date,
        }))
    }
}

/// Accepts `2021-03-01` and floating timestamps like `2021-03-01T00:00:00.000`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Deserialize)]
struct PharmacyRow {
    codi_abs: Option<String>,
    #[serde(default)]
    tipus_via: String,
    #[serde(default)]
    nom_via: String,
    #[serde(default)]
    num_via: String,
    #[serde(default)]
    codi_postal: String,
}

impl PharmacyRow {
    fn into_record(self) -> Option<PharmacyRecord> {
        let district = DistrictCode::parse(self.codi_abs.as_deref()?).ok()?;
        Some(PharmacyRecord {
            district,
            street_type: self.tipus_via,
            street_name: self.nom_via,
            street_number: self.num_via,
            postal_code: self.codi_postal,
        })
    }
}
