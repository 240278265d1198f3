/// Per-region ingest pipeline.
///
/// For each region: fetch the hourly feed, decode it, normalize every
/// observation, and load the survivors. Record-level failures are
/// absorbed here and surfaced as report entries; a region-level failure
/// produces a failed report instead of propagating, so one broken region
/// never stalls the rest of a run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{self, LoadFailure};
use crate::ingest::datamart::{self, find_element, ObservationCollection};
use crate::logging::{self, DataSource};
use crate::model::{ObservationRecord, RegionError, ELEM_STATION_NAME};
use crate::normalize;
use crate::regions;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// One observation dropped during normalization.
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    /// Position of the observation within the feed document.
    pub index: usize,
    /// Station name if the feed carried one, empty otherwise.
    pub station_name: String,
    pub error: String,
}

/// Outcome of one region's ingest cycle.
#[derive(Debug, Serialize)]
pub struct RegionReport {
    pub region: String,
    /// Why the whole cycle failed; `None` when the feed was processed.
    pub error: Option<String>,
    /// Observations present in the feed document.
    pub attempted: usize,
    /// Observations that survived normalization.
    pub normalized: usize,
    /// Rows the database accepted.
    pub inserted: usize,
    pub dropped: Vec<RecordFailure>,
    pub insert_failures: Vec<LoadFailure>,
}

impl RegionReport {
    fn failed(region: &str, err: &RegionError) -> Self {
        RegionReport {
            region: region.to_string(),
            error: Some(err.to_string()),
            attempted: 0,
            normalized: 0,
            inserted: 0,
            dropped: Vec::new(),
            insert_failures: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Record-level failures across both stages.
    pub fn records_failed(&self) -> usize {
        self.dropped.len() + self.insert_failures.len()
    }
}

/// Outcome of a whole multi-region run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// UTC hour the feeds were fetched for.
    pub asof: DateTime<Utc>,
    pub regions: Vec<RegionReport>,
}

impl RunReport {
    pub fn regions_failed(&self) -> usize {
        self.regions.iter().filter(|r| r.is_failed()).count()
    }

    pub fn rows_inserted(&self) -> usize {
        self.regions.iter().map(|r| r.inserted).sum()
    }

    pub fn rows_failed(&self) -> usize {
        self.regions.iter().map(|r| r.records_failed()).sum()
    }
}

// ---------------------------------------------------------------------------
// Normalization stage
// ---------------------------------------------------------------------------

/// Normalizes every member of a decoded collection.
///
/// Returns the surviving records plus one failure entry per dropped
/// observation, in document order. The timezone is resolved here because
/// an unregistered region is a configuration gap that fails the whole
/// batch, never individual records.
pub fn normalize_collection(
    collection: &ObservationCollection,
    region_code: &str,
) -> Result<(Vec<ObservationRecord>, Vec<RecordFailure>), RegionError> {
    let tz = regions::resolve_timezone(region_code)
        .ok_or_else(|| RegionError::UnknownTimezone(region_code.to_string()))?;

    let mut records = Vec::new();
    let mut dropped = Vec::new();

    for (index, member) in collection.members.iter().enumerate() {
        match normalize::normalize(&member.observation, tz) {
            Ok(record) => records.push(record),
            Err(e) => {
                let ident = &member.observation.metadata.set.identification_elements.elements;
                let station_name = find_element(ident, ELEM_STATION_NAME)
                    .unwrap_or_default()
                    .to_string();
                logging::warn(
                    DataSource::Datamart,
                    Some(region_code),
                    &format!("dropped observation {} ({}): {}", index, station_name, e),
                );
                dropped.push(RecordFailure {
                    index,
                    station_name,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok((records, dropped))
}

// ---------------------------------------------------------------------------
// Region cycle
// ---------------------------------------------------------------------------

/// Runs one region's full cycle: fetch, decode, normalize, load.
pub fn process_region(
    http: &reqwest::blocking::Client,
    db_client: &mut postgres::Client,
    region_code: &str,
    asof: DateTime<Utc>,
) -> RegionReport {
    let xml = match datamart::fetch_hourly_xml(http, region_code, asof) {
        Ok(xml) => xml,
        Err(e) => {
            logging::error(DataSource::Datamart, Some(region_code), &e.to_string());
            return RegionReport::failed(region_code, &e);
        }
    };

    let collection = match datamart::parse_collection(&xml) {
        Ok(collection) => collection,
        Err(e) => {
            logging::error(DataSource::Datamart, Some(region_code), &e.to_string());
            return RegionReport::failed(region_code, &e);
        }
    };

    let (records, dropped) = match normalize_collection(&collection, region_code) {
        Ok(outcome) => outcome,
        Err(e) => {
            logging::error(DataSource::System, Some(region_code), &e.to_string());
            return RegionReport::failed(region_code, &e);
        }
    };

    let load = db::insert_observations(db_client, &records);

    let report = RegionReport {
        region: region_code.to_string(),
        error: None,
        attempted: collection.members.len(),
        normalized: records.len(),
        inserted: load.inserted,
        dropped,
        insert_failures: load.failures,
    };
    logging::log_region_summary(
        region_code,
        report.attempted,
        report.inserted,
        report.records_failed(),
    );
    report
}

/// Runs every requested region in order. Region failures are recorded in
/// the report and never abort the run.
pub fn run(
    http: &reqwest::blocking::Client,
    db_client: &mut postgres::Client,
    region_codes: &[&str],
    asof: DateTime<Utc>,
) -> RunReport {
    let mut report = RunReport {
        asof,
        regions: Vec::new(),
    };

    for code in region_codes {
        report
            .regions
            .push(process_region(http, db_client, code, asof));
    }

    logging::log_run_summary(
        report.regions.len(),
        report.regions_failed(),
        report.rows_inserted(),
        report.rows_failed(),
    );
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
