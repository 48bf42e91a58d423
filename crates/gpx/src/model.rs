//! Raw GPX document as read by `serde-xml-rs`. Attributes and child
//! elements both map to plain fields; everything not listed is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Gpx {
    pub version: Option<String>,
    pub creator: Option<String>,
    #[serde(default)]
    pub trk: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: Option<String>,
    pub desc: Option<String>,
    #[serde(default)]
    pub trkseg: Vec<TrackSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackSegment {
    #[serde(default)]
    pub trkpt: Vec<TrackPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPoint {
    /* lat, lon: xml-attributes */
    pub lat: f64,
    pub lon: f64,
    /// Meters above sea level.
    pub ele: Option<f64>,
    pub name: Option<String>,
}
