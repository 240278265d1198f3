/// Region registry for the Environment Canada observation ingest service.
///
/// Defines the canonical list of province and territory feeds ingested by
/// this service, along with the IANA timezone used to interpret each
/// region's local observation timestamps. This is the single source of
/// truth for region codes; other modules should reference regions from
/// here rather than hardcoding codes.

use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for a single regional feed.
pub struct Region {
    /// Two-letter postal abbreviation, as used in Datamart feed paths.
    pub code: &'static str,
    /// Full province or territory name.
    pub name: &'static str,
    /// Zone used to interpret the region-local observation timestamp.
    /// Provinces spanning several zones use the zone their feed reports in.
    pub timezone: Tz,
}

/// All regional feeds ingested by this service, east to west.
///
/// Sources:
///   - Feed paths: MSC Datamart (dd.weather.gc.ca/observations/xml/)
///   - Zones: the tz database identifiers each feed's local timestamps
///     are published in.
pub static REGION_REGISTRY: &[Region] = &[
    Region {
        code: "NL",
        name: "Newfoundland and Labrador",
        timezone: chrono_tz::America::St_Johns,
    },
    Region {
        code: "NS",
        name: "Nova Scotia",
        timezone: chrono_tz::America::Halifax,
    },
    Region {
        code: "PE",
        name: "Prince Edward Island",
        timezone: chrono_tz::America::Halifax,
    },
    Region {
        code: "NB",
        name: "New Brunswick",
        timezone: chrono_tz::America::Moncton,
    },
    Region {
        code: "QC",
        name: "Quebec",
        timezone: chrono_tz::America::Toronto,
    },
    Region {
        code: "ON",
        name: "Ontario",
        timezone: chrono_tz::America::Toronto,
    },
    Region {
        code: "MB",
        name: "Manitoba",
        timezone: chrono_tz::America::Winnipeg,
    },
    Region {
        code: "SK",
        name: "Saskatchewan",
        timezone: chrono_tz::America::Regina,
    },
    Region {
        code: "AB",
        name: "Alberta",
        timezone: chrono_tz::America::Edmonton,
    },
    Region {
        code: "BC",
        name: "British Columbia",
        timezone: chrono_tz::America::Vancouver,
    },
    Region {
        code: "YT",
        name: "Yukon",
        timezone: chrono_tz::America::Whitehorse,
    },
    Region {
        code: "NT",
        name: "Northwest Territories",
        timezone: chrono_tz::America::Yellowknife,
    },
    Region {
        code: "NU",
        name: "Nunavut",
        timezone: chrono_tz::America::Iqaluit,
    },
];

/// Returns the codes for all registered regions, suitable for driving a
/// full ingest run.
pub fn all_region_codes() -> Vec<&'static str> {
    REGION_REGISTRY.iter().map(|r| r.code).collect()
}

/// Looks up a region by code. Returns `None` if not registered.
pub fn find_region(code: &str) -> Option<&'static Region> {
    REGION_REGISTRY.iter().find(|r| r.code == code)
}

/// Resolves the timezone for a region code. `None` means the region is
/// not registered, which callers must treat as fatal for that region's
/// whole batch.
pub fn resolve_timezone(code: &str) -> Option<Tz> {
    find_region(code).map(|r| r.timezone)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
