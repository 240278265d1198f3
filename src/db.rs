/// Database loading for normalized observations.
///
/// Issues one INSERT per record into the PostGIS-backed
/// `weather_observations` table, deriving the geometry point from the
/// record's coordinates. A failed row is reported and the batch
/// continues; the loader never aborts on a single row. The table carries
/// no uniqueness constraint, so reloading the same feed inserts
/// duplicate rows rather than failing.
///
/// Schema: sql/001_weather_observations.sql

use postgres::{Client, NoTls};
use serde::Serialize;

use crate::logging::{self, DataSource};
use crate::model::ObservationRecord;

// ---------------------------------------------------------------------------
// Insert statement
// ---------------------------------------------------------------------------

// Latitude and longitude are bound as text and cast in SQL: the feed
// does not guarantee numeric formatting, and a value the database cannot
// coerce must fail that one row, not the batch.
const INSERT_OBSERVATION: &str = "
    INSERT INTO weather_observations (
        station_name, latitude, longitude, sampled_at,
        temperature, dew_point, relative_humidity, wind_speed,
        wind_direction, wind_gust_speed, wind_chill, mean_sea_level,
        tendency_amount, tendency_characteristic, present_weather,
        horizontal_visibility, total_cloud_cover, humidex,
        observed_at_utc, observed_at_local, geom
    )
    VALUES (
        $1, $2::numeric, $3::numeric, $4,
        $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
        $19, $20,
        ST_SetSRID(ST_MakePoint($3::double precision, $2::double precision), 4326)
    )
";

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Opens a database connection.
pub fn connect(database_url: &str) -> Result<Client, postgres::Error> {
    Client::connect(database_url, NoTls)
}

// ---------------------------------------------------------------------------
// Load report
// ---------------------------------------------------------------------------

/// One row that the database rejected.
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    /// Position of the record within the batch handed to the loader.
    pub index: usize,
    pub station_name: String,
    pub error: String,
}

/// Outcome of loading one batch of records.
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    pub attempted: usize,
    pub inserted: usize,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Inserts a batch of records, one statement per record.
///
/// Insert failures (constraint violations, coercion failures, lost
/// connectivity) are collected into the report; the remaining records
/// are still attempted.
pub fn insert_observations(client: &mut Client, records: &[ObservationRecord]) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, record) in records.iter().enumerate() {
        report.attempted += 1;

        let result = client.execute(
            INSERT_OBSERVATION,
            &[
                &record.station_name,
                &record.latitude,
                &record.longitude,
                &record.sampled_at,
                &record.temperature,
                &record.dew_point,
                &record.relative_humidity,
                &record.wind_speed,
                &record.wind_direction,
                &record.wind_gust_speed,
                &record.wind_chill,
                &record.mean_sea_level,
                &record.tendency_amount,
                &record.tendency_characteristic,
                &record.present_weather,
                &record.horizontal_visibility,
                &record.total_cloud_cover,
                &record.humidex,
                &record.observed_at_utc,
                &record.observed_at_local,
            ],
        );

        match result {
            Ok(_) => {
                report.inserted += 1;
                logging::debug(
                    DataSource::Database,
                    Some(&record.station_name),
                    &format!(
                        "stored observation at {}",
                        record.observed_at_utc.to_rfc3339()
                    ),
                );
            }
            Err(e) => {
                logging::error(
                    DataSource::Database,
                    Some(&record.station_name),
                    &format!("insert failed: {}", e),
                );
                report.failures.push(LoadFailure {
                    index,
                    station_name: record.station_name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
