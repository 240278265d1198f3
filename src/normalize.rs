/// Observation normalization.
///
/// Turns one raw feed observation plus its region's resolved timezone
/// into a typed `ObservationRecord`, or reports why that record must be
/// dropped. This is a pure transformation with no I/O and no clock
/// access, so every failure is deterministic in tests.
///
/// A failure here discards only the offending observation; callers
/// continue with the rest of the batch.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::ingest::datamart::{find_element, RawObservation};
use crate::model::{
    ObservationRecord, RecordError, ELEM_AIR_TEMPERATURE, ELEM_DEW_POINT,
    ELEM_HORIZONTAL_VISIBILITY, ELEM_HUMIDEX, ELEM_MEAN_SEA_LEVEL,
    ELEM_OBSERVATION_DATE_LOCAL, ELEM_OBSERVATION_DATE_UTC, ELEM_PRESENT_WEATHER,
    ELEM_RELATIVE_HUMIDITY, ELEM_STATION_NAME, ELEM_TENDENCY_AMOUNT,
    ELEM_TENDENCY_CHARACTERISTIC, ELEM_TOTAL_CLOUD_COVER, ELEM_WIND_CHILL,
    ELEM_WIND_DIRECTION, ELEM_WIND_GUST_SPEED, ELEM_WIND_SPEED,
};

/// Naive part of the local timestamp, before the zone abbreviation.
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Field label for sampling-time parse failures.
const FIELD_SAMPLING_TIME: &str = "sampling time";

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalizes one raw observation.
///
/// The geometry check runs first: an observation whose point string does
/// not split into exactly two coordinates is rejected before any other
/// field is touched. Timestamp failures are likewise fatal for the
/// record. A missing station name or missing measured attributes are
/// not; stations simply do not report every attribute every hour.
pub fn normalize(obs: &RawObservation, tz: Tz) -> Result<ObservationRecord, RecordError> {
    let pos = obs.feature_of_interest.feature_collection.location.point.pos.as_str();
    let coords: Vec<&str> = pos.split_whitespace().collect();
    if coords.len() != 2 {
        return Err(RecordError::MalformedGeometry(pos.to_string()));
    }
    let latitude = coords[0].to_string();
    let longitude = coords[1].to_string();

    let ident = &obs.metadata.set.identification_elements.elements;
    let station_name = find_element(ident, ELEM_STATION_NAME)
        .unwrap_or_default()
        .to_string();

    let observed_at_utc = parse_utc(
        find_element(ident, ELEM_OBSERVATION_DATE_UTC).unwrap_or_default(),
        ELEM_OBSERVATION_DATE_UTC,
    )?;
    let observed_at_local = parse_local(
        find_element(ident, ELEM_OBSERVATION_DATE_LOCAL).unwrap_or_default(),
        tz,
    )?;
    let sampled_at = parse_utc(&obs.sampling_time.time_instant.time_position, FIELD_SAMPLING_TIME)?;

    let results = &obs.result.elements.elements;
    let attr = |name: &str| find_element(results, name).map(str::to_string);

    Ok(ObservationRecord {
        station_name,
        latitude,
        longitude,
        sampled_at,
        observed_at_utc,
        observed_at_local,
        temperature: attr(ELEM_AIR_TEMPERATURE),
        dew_point: attr(ELEM_DEW_POINT),
        relative_humidity: attr(ELEM_RELATIVE_HUMIDITY),
        wind_speed: attr(ELEM_WIND_SPEED),
        wind_direction: attr(ELEM_WIND_DIRECTION),
        wind_gust_speed: attr(ELEM_WIND_GUST_SPEED),
        wind_chill: attr(ELEM_WIND_CHILL),
        mean_sea_level: attr(ELEM_MEAN_SEA_LEVEL),
        tendency_amount: attr(ELEM_TENDENCY_AMOUNT),
        tendency_characteristic: attr(ELEM_TENDENCY_CHARACTERISTIC),
        present_weather: attr(ELEM_PRESENT_WEATHER),
        horizontal_visibility: attr(ELEM_HORIZONTAL_VISIBILITY),
        total_cloud_cover: attr(ELEM_TOTAL_CLOUD_COVER),
        humidex: attr(ELEM_HUMIDEX),
    })
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

fn parse_utc(value: &str, field: &'static str) -> Result<DateTime<Utc>, RecordError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RecordError::TimestampParse {
            field,
            message: format!("'{}': {}", value, e),
        })
}

/// Parses `YYYY-MM-DDTHH:MM:SS.mmm ZZZ` in the region's resolved zone.
///
/// The trailing abbreviation is stripped and otherwise trusted to agree
/// with the resolved zone; the registry and the feed are maintained
/// together, so it is not cross-checked here. During a fall-back hour the
/// naive time maps to two instants and the earlier one is taken.
fn parse_local(value: &str, tz: Tz) -> Result<DateTime<FixedOffset>, RecordError> {
    let field = ELEM_OBSERVATION_DATE_LOCAL;

    let (naive_part, _abbreviation) =
        value.rsplit_once(' ').ok_or_else(|| RecordError::TimestampParse {
            field,
            message: format!("'{}': missing zone abbreviation", value),
        })?;

    let naive = NaiveDateTime::parse_from_str(naive_part, LOCAL_TIME_FORMAT).map_err(|e| {
        RecordError::TimestampParse {
            field,
            message: format!("'{}': {}", value, e),
        }
    })?;

    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // spring-forward gap: this wall-clock time never occurred
            return Err(RecordError::TimestampParse {
                field,
                message: format!("'{}': not a valid local time in {}", value, tz),
            });
        }
    };

    Ok(local.fixed_offset())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
