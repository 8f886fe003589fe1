//! Toxic-release facility lookups against the Envirofacts REST service.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;
use wren_agent::adapters::EcoSafety;
use wren_core::domain::results::{Facility, SafetyArea, SafetyReport};
use wren_core::errors::ProviderError;

use crate::http::send_json;

const PROVIDER: &str = "envirofacts";
/// Half the side of the box searched around a coordinate, in degrees.
const SEARCH_RADIUS_DEGREES: f64 = 0.05;
/// Release history is fetched for at most this many facilities.
const MAX_FACILITIES_WITH_HISTORY: usize = 25;

pub struct EnvirofactsSafety {
    client: Client,
    base_url: String,
}

impl EnvirofactsSafety {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    fn facilities_url(&self, area: &SafetyArea) -> String {
        match area {
            SafetyArea::Zip(zip) => format!("{}/tri_facility/zip_code/{}/JSON", self.base_url, encode(zip)),
            SafetyArea::Coordinates { latitude, longitude } => format!(
                "{}/tri_facility/pref_latitude/>/{:.4}/pref_latitude/</{:.4}/pref_longitude/>/{:.4}/pref_longitude/</{:.4}/JSON",
                self.base_url,
                latitude - SEARCH_RADIUS_DEGREES,
                latitude + SEARCH_RADIUS_DEGREES,
                longitude - SEARCH_RADIUS_DEGREES,
                longitude + SEARCH_RADIUS_DEGREES,
            ),
        }
    }

    fn reporting_url(&self, facility_id: &str) -> String {
        format!("{}/tri_reporting_form/tri_facility_id/{}/JSON", self.base_url, encode(facility_id))
    }
}

fn encode(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

/// Facility rows, skipping placeholder entries that carry no facility id.
fn facility_rows(rows: Vec<Value>) -> Vec<(String, String)> {
    rows.iter()
        .filter_map(|row| {
            let id = text_field(row, "tri_facility_id")?;
            let name = text_field(row, "facility_name").unwrap_or_else(|| id.clone());
            Some((id, name))
        })
        .collect()
}

/// One release date per reporting year: the last day of that year.
fn release_dates(rows: Vec<Value>) -> Vec<NaiveDate> {
    let mut years: Vec<i32> = rows
        .iter()
        .filter_map(|row| text_field(row, "reporting_year"))
        .filter_map(|year| year.trim().parse().ok())
        .collect();
    years.sort_unstable();
    years.dedup();
    years.into_iter().filter_map(|year| NaiveDate::from_ymd_opt(year, 12, 31)).collect()
}

fn text_field(row: &Value, key: &str) -> Option<String> {
    let value = row.as_object()?.get(key)?;
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[async_trait]
impl EcoSafety for EnvirofactsSafety {
    async fn report(&self, area: &SafetyArea) -> Result<SafetyReport, ProviderError> {
        let rows: Vec<Value> = send_json(PROVIDER, self.client.get(self.facilities_url(area))).await?;
        let mut facilities = facility_rows(rows);
        facilities.dedup_by(|left, right| left.0 == right.0);
        debug!(event_name = "providers.eco.facilities", count = facilities.len(), "facilities found");

        let mut report = SafetyReport::default();
        for (index, (id, name)) in facilities.into_iter().enumerate() {
            let releases = if index < MAX_FACILITIES_WITH_HISTORY {
                let forms: Vec<Value> = send_json(PROVIDER, self.client.get(self.reporting_url(&id))).await?;
                release_dates(forms)
            } else {
                Vec::new()
            };
            report.facilities.push(Facility { name, releases });
        }
        Ok(report)
    }
}
