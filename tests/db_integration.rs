/// Integration tests for observation loading into PostGIS.
///
/// These tests verify:
/// 1. A normalized record round-trips into weather_observations
/// 2. A row the database rejects does not abort the rest of its batch
/// 3. Reloading the same record inserts a second row (no uniqueness
///    constraint; duplicates are documented behavior, not a bug)
///
/// Prerequisites:
/// - PostgreSQL with PostGIS and sql/001_weather_observations.sql applied
/// - DATABASE_URL set in .env
///
/// These tests are ignored by default so CI does not depend on a live
/// database. Run with:
///   cargo test --test db_integration -- --ignored --test-threads=1

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use ecobs_service::db;
use ecobs_service::model::ObservationRecord;
use postgres::Client;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const TEST_STATION_PREFIX: &str = "ECOBS TEST";

fn test_client() -> Client {
    dotenv::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    db::connect(&database_url).expect("Failed to connect to test database")
}

fn cleanup_test_rows(client: &mut Client) {
    let pattern = format!("{}%", TEST_STATION_PREFIX);
    let _ = client.execute(
        "DELETE FROM weather_observations WHERE station_name LIKE $1",
        &[&pattern],
    );
}

fn test_record(suffix: &str, latitude: &str) -> ObservationRecord {
    let observed_at_utc: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
    let observed_at_local: DateTime<FixedOffset> = FixedOffset::west_opt(4 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .unwrap();

    ObservationRecord {
        station_name: format!("{} {}", TEST_STATION_PREFIX, suffix),
        latitude: latitude.to_string(),
        longitude: "-75.0".to_string(),
        sampled_at: observed_at_utc,
        observed_at_utc,
        observed_at_local,
        temperature: Some("12.3".to_string()),
        dew_point: None,
        relative_humidity: Some("81".to_string()),
        wind_speed: None,
        wind_direction: None,
        wind_gust_speed: None,
        wind_chill: None,
        mean_sea_level: None,
        tendency_amount: None,
        tendency_characteristic: None,
        present_weather: None,
        horizontal_visibility: None,
        total_cloud_cover: None,
        humidex: None,
    }
}

fn count_rows_for(client: &mut Client, station_name: &str) -> i64 {
    let row = client
        .query_one(
            "SELECT COUNT(*) FROM weather_observations WHERE station_name = $1",
            &[&station_name],
        )
        .expect("count query failed");
    row.get(0)
}

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Requires live PostGIS - see module docs
fn test_record_round_trips_into_table() {
    let mut client = test_client();
    cleanup_test_rows(&mut client);

    let record = test_record("ROUNDTRIP", "45.0");
    let report = db::insert_observations(&mut client, &[record.clone()]);

    assert_eq!(report.attempted, 1);
    assert_eq!(report.inserted, 1);
    assert!(report.failures.is_empty());

    let row = client
        .query_one(
            "SELECT latitude::text, longitude::text, temperature, dew_point,
                    observed_at_utc, observed_at_local,
                    ST_Y(geom)::text, ST_X(geom)::text, ST_SRID(geom)
             FROM weather_observations WHERE station_name = $1",
            &[&record.station_name],
        )
        .expect("inserted row should be queryable");

    assert_eq!(row.get::<_, String>(0), "45.0");
    assert_eq!(row.get::<_, String>(1), "-75.0");
    assert_eq!(row.get::<_, Option<String>>(2).as_deref(), Some("12.3"));
    assert_eq!(row.get::<_, Option<String>>(3), None);
    assert_eq!(row.get::<_, DateTime<Utc>>(4), record.observed_at_utc);
    // timestamptz stores the instant; the local column must name the
    // same moment as the UTC column.
    assert_eq!(row.get::<_, DateTime<Utc>>(5), record.observed_at_utc);
    // Geometry point is (longitude, latitude) at SRID 4326.
    assert_eq!(row.get::<_, String>(6), "45");
    assert_eq!(row.get::<_, String>(7), "-75");
    assert_eq!(row.get::<_, i32>(8), 4326);

    cleanup_test_rows(&mut client);
}

// ---------------------------------------------------------------------------
// Partial batch failure
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Requires live PostGIS - see module docs
fn test_rejected_row_does_not_abort_batch() {
    let mut client = test_client();
    cleanup_test_rows(&mut client);

    // Record 2's latitude cannot cast to numeric; the database must
    // reject that row alone.
    let records = vec![
        test_record("BATCH 1", "45.0"),
        test_record("BATCH 2", "not-a-latitude"),
        test_record("BATCH 3", "46.5"),
    ];
    let report = db::insert_observations(&mut client, &records);

    assert_eq!(report.attempted, 3);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(
        report.failures[0].station_name,
        format!("{} BATCH 2", TEST_STATION_PREFIX)
    );

    assert_eq!(count_rows_for(&mut client, &records[0].station_name), 1);
    assert_eq!(count_rows_for(&mut client, &records[1].station_name), 0);
    assert_eq!(count_rows_for(&mut client, &records[2].station_name), 1);

    cleanup_test_rows(&mut client);
}

// ---------------------------------------------------------------------------
// Duplicate loads
// ---------------------------------------------------------------------------

#[test]
#[ignore] // Requires live PostGIS - see module docs
fn test_reloading_same_record_inserts_second_row() {
    let mut client = test_client();
    cleanup_test_rows(&mut client);

    let record = test_record("DUPLICATE", "45.0");

    let first = db::insert_observations(&mut client, &[record.clone()]);
    let second = db::insert_observations(&mut client, &[record.clone()]);
    assert_eq!(first.inserted, 1);
    assert_eq!(second.inserted, 1);

    // Two identical rows is the contract: the loader is insert-only and
    // the table enforces no (station, observation time) uniqueness.
    assert_eq!(count_rows_for(&mut client, &record.station_name), 2);

    cleanup_test_rows(&mut client);
}
