/// Core data types for the Environment Canada observation ingest service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O, only types, feed element names, and
/// error definitions.

use chrono::{DateTime, FixedOffset, Utc};

// ---------------------------------------------------------------------------
// Identification element names
// ---------------------------------------------------------------------------

/// Station name entry in an observation's identification metadata.
pub const ELEM_STATION_NAME: &str = "station_name";

/// Absolute observation timestamp (RFC 3339 with offset).
pub const ELEM_OBSERVATION_DATE_UTC: &str = "observation_date_utc";

/// Region-local observation timestamp with a trailing zone abbreviation,
/// e.g. `2024-05-01T10:00:00.000 EDT`.
pub const ELEM_OBSERVATION_DATE_LOCAL: &str = "observation_date_local_time";

// ---------------------------------------------------------------------------
// Result element names
// ---------------------------------------------------------------------------

// The measured attributes extracted from each observation's result set.
// The feed may carry other element names; anything not listed here is
// ignored by the normalizer.

pub const ELEM_AIR_TEMPERATURE: &str = "air_temperature";
pub const ELEM_DEW_POINT: &str = "dew_point";
pub const ELEM_RELATIVE_HUMIDITY: &str = "relative_humidity";
pub const ELEM_WIND_SPEED: &str = "wind_speed";
pub const ELEM_WIND_DIRECTION: &str = "wind_direction";
pub const ELEM_WIND_GUST_SPEED: &str = "wind_gust_speed";
pub const ELEM_WIND_CHILL: &str = "wind_chill";
pub const ELEM_MEAN_SEA_LEVEL: &str = "mean_sea_level";
pub const ELEM_TENDENCY_AMOUNT: &str = "tendency_amount";
pub const ELEM_TENDENCY_CHARACTERISTIC: &str = "tendency_characteristic";
pub const ELEM_PRESENT_WEATHER: &str = "present_weather";
pub const ELEM_HORIZONTAL_VISIBILITY: &str = "horizontal_visibility";
pub const ELEM_TOTAL_CLOUD_COVER: &str = "total_cloud_cover";
pub const ELEM_HUMIDEX: &str = "humidex";

// ---------------------------------------------------------------------------
// Normalized record
// ---------------------------------------------------------------------------

/// A single station observation, normalized from the feed and ready for
/// storage. Immutable once produced.
///
/// Latitude and longitude are kept as strings: the feed does not guarantee
/// numeric formatting, and coercion is the database's job. The measured
/// attributes are likewise untouched strings, with `None` meaning the
/// station did not report that attribute this hour.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// Station name, empty if the feed omitted it.
    pub station_name: String,
    pub latitude: String,
    pub longitude: String,
    /// Canonical observation instant, from the member's sampling time.
    pub sampled_at: DateTime<Utc>,
    /// Observation timestamp from the identification metadata.
    pub observed_at_utc: DateTime<Utc>,
    /// Same instant in the region's local zone, offset preserved.
    pub observed_at_local: DateTime<FixedOffset>,
    pub temperature: Option<String>,
    pub dew_point: Option<String>,
    pub relative_humidity: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub wind_gust_speed: Option<String>,
    pub wind_chill: Option<String>,
    pub mean_sea_level: Option<String>,
    pub tendency_amount: Option<String>,
    pub tendency_characteristic: Option<String>,
    pub present_weather: Option<String>,
    pub horizontal_visibility: Option<String>,
    pub total_cloud_cover: Option<String>,
    pub humidex: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that abort one region's ingest cycle. The run moves on to the
/// next region.
#[derive(Debug, PartialEq)]
pub enum RegionError {
    /// Transport failure or non-success HTTP status from the feed host.
    Fetch(String),
    /// The feed body could not be decoded as an observation collection.
    MalformedDocument(String),
    /// The region code has no registered timezone. A configuration gap,
    /// not bad data: no record from this feed can be normalized.
    UnknownTimezone(String),
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::Fetch(msg) => write!(f, "Feed fetch failed: {}", msg),
            RegionError::MalformedDocument(msg) => write!(f, "Malformed feed document: {}", msg),
            RegionError::UnknownTimezone(code) => {
                write!(f, "No timezone registered for region: {}", code)
            }
        }
    }
}

impl std::error::Error for RegionError {}

/// Errors that discard a single observation. The rest of the region's
/// batch continues.
#[derive(Debug, PartialEq)]
pub enum RecordError {
    /// The point string did not split into exactly two coordinates.
    MalformedGeometry(String),
    /// A timestamp field was missing or failed to parse.
    TimestampParse {
        field: &'static str,
        message: String,
    },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MalformedGeometry(pos) => {
                write!(f, "Malformed point geometry: '{}'", pos)
            }
            RecordError::TimestampParse { field, message } => {
                write!(f, "Failed to parse {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for RecordError {}
