/// MSC Datamart hourly observation feed client.
///
/// Retrieves the per-region hourly surface weather observation XML
/// published by Environment and Climate Change Canada and decodes it into
/// raw observation structures for normalization.
///
/// Feed documentation: https://eccc-msc.github.io/open-data/msc-datamart/readme_en/
/// Feed layout: https://dd.weather.gc.ca/observations/xml/{REGION}/hourly/

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::RegionError;

const DATAMART_BASE_URL: &str = "https://dd.weather.gc.ca";

// ============================================================================
// Feed Document Structures
// ============================================================================

// The feed is an OGC-style observation collection. Station fields are not
// a fixed schema: both the identification metadata and the measured
// results are bags of <element name=... value=...> entries, looked up by
// name downstream. Every sub-structure below defaults to empty so that a
// sparse member decodes cleanly and surfaces as lookup misses or a
// geometry failure for that one record, not as a document error.

/// Root of one region's hourly feed.
#[derive(Debug, Default, Deserialize)]
pub struct ObservationCollection {
    #[serde(rename = "om:member", alias = "member", default)]
    pub members: Vec<ObservationMember>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObservationMember {
    #[serde(rename = "om:Observation", alias = "Observation", default)]
    pub observation: RawObservation,
}

/// One station's reading at one instant, as delivered by the feed.
#[derive(Debug, Default, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "om:metadata", alias = "metadata", default)]
    pub metadata: ObservationMetadata,
    #[serde(rename = "om:samplingTime", alias = "samplingTime", default)]
    pub sampling_time: SamplingTime,
    #[serde(rename = "om:featureOfInterest", alias = "featureOfInterest", default)]
    pub feature_of_interest: FeatureOfInterest,
    #[serde(rename = "om:result", alias = "result", default)]
    pub result: ObservationResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObservationMetadata {
    #[serde(rename = "set", default)]
    pub set: MetadataSet,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetadataSet {
    #[serde(rename = "identification-elements", default)]
    pub identification_elements: IdentificationElements,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdentificationElements {
    #[serde(rename = "element", default)]
    pub elements: Vec<NamedElement>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SamplingTime {
    #[serde(rename = "gml:TimeInstant", alias = "TimeInstant", default)]
    pub time_instant: TimeInstant,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeInstant {
    #[serde(rename = "gml:timePosition", alias = "timePosition", default)]
    pub time_position: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureOfInterest {
    #[serde(rename = "gml:FeatureCollection", alias = "FeatureCollection", default)]
    pub feature_collection: FeatureCollection,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "gml:location", alias = "location", default)]
    pub location: FeatureLocation,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureLocation {
    #[serde(rename = "gml:Point", alias = "Point", default)]
    pub point: PointGeometry,
}

#[derive(Debug, Default, Deserialize)]
pub struct PointGeometry {
    /// Two space-separated coordinates, latitude first.
    #[serde(rename = "gml:pos", alias = "pos", default)]
    pub pos: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObservationResult {
    #[serde(rename = "elements", default)]
    pub elements: ResultElements,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResultElements {
    #[serde(rename = "element", default)]
    pub elements: Vec<NamedElement>,
}

/// A named key/value entry from either element bag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedElement {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@uom", default)]
    pub uom: String,
    #[serde(rename = "@value", default)]
    pub value: String,
    #[serde(rename = "qualifier", default)]
    pub qualifiers: Vec<ElementQualifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementQualifier {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@uom", default)]
    pub uom: String,
    #[serde(rename = "@value", default)]
    pub value: String,
}

// ============================================================================
// Element Lookup
// ============================================================================

/// Returns the value of the first element named `name`, or `None` if no
/// such element exists.
///
/// The feed does not guarantee unique names within a bag; when a name
/// repeats, the first occurrence wins. Absence is an expected outcome,
/// not an error.
pub fn find_element<'a>(elements: &'a [NamedElement], name: &str) -> Option<&'a str> {
    elements.iter().find(|e| e.name == name).map(|e| e.value.as_str())
}

// ============================================================================
// Feed Client Functions
// ============================================================================

/// Builds the hourly feed URL for a region at a given UTC hour.
pub fn build_feed_url(region_code: &str, asof: DateTime<Utc>) -> String {
    format!(
        "{}/observations/xml/{}/hourly/hourly_{}_{}_e.xml",
        DATAMART_BASE_URL,
        region_code,
        region_code.to_lowercase(),
        asof.format("%Y%m%d%H"),
    )
}

/// Fetches one region's hourly feed body.
///
/// Any transport failure or non-success status is fatal for the region's
/// cycle; the file for the current hour may simply not be published yet.
pub fn fetch_hourly_xml(
    client: &reqwest::blocking::Client,
    region_code: &str,
    asof: DateTime<Utc>,
) -> Result<String, RegionError> {
    let url = build_feed_url(region_code, asof);

    let response = client
        .get(&url)
        .send()
        .map_err(|e| RegionError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RegionError::Fetch(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }

    response.text().map_err(|e| RegionError::Fetch(e.to_string()))
}

/// Decodes a feed body into an observation collection.
///
/// Unknown elements and attributes are ignored, so schema additions on
/// the feed side do not break decoding. Only a structurally invalid
/// document fails here.
pub fn parse_collection(xml: &str) -> Result<ObservationCollection, RegionError> {
    quick_xml::de::from_str(xml).map_err(|e| RegionError::MalformedDocument(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
