use model::{
    path::{GeoPath, GeoPoint},
    HALF_MARATHON_DISTANCE_MILES, MARATHON_DISTANCE_MILES,
};
use schemars::JsonSchema;
use serde::Serialize;
use utility::geo::{is_valid_coordinate, meters_to_feet};

use crate::{model::Gpx, GpxError};

pub use crate::model::TrackPoint;

pub const DEFAULT_ROUTE_NAME: &str = "Twin Cities Marathon";

const MILE_LANDMARK_TOLERANCE: f64 = 0.1;
const NAMED_LANDMARK_TOLERANCE: f64 = 0.2;
const WALL_DISTANCE_MILES: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct GpxData {
    pub name: String,
    pub description: Option<String>,
    pub track_points: Vec<TrackPoint>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GpxSummary {
    pub name: String,
    pub description: Option<String>,
    pub point_count: usize,
    pub total_distance: f64,
    /// Feet, rounded.
    pub elevation_gain: f64,
    pub is_marathon_distance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRoute {
    #[serde(flatten)]
    pub summary: GpxSummary,
    pub path: GeoPath,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

impl GpxData {
    /// Reads the first track's name and description and the points of all
    /// track segments in document order.
    pub fn parse(content: &str) -> Result<GpxData, GpxError> {
        let gpx: Gpx = serde_xml_rs::from_str(content)?;
        let first = gpx.trk.first();
        let name = non_empty(first.and_then(|track| track.name.clone()))
            .unwrap_or_else(|| DEFAULT_ROUTE_NAME.to_owned());
        let description = non_empty(first.and_then(|track| track.desc.clone()));

        let track_points = gpx
            .trk
            .into_iter()
            .flat_map(|track| track.trkseg)
            .flat_map(|segment| segment.trkpt)
            .collect::<Vec<_>>();

        for (index, point) in track_points.iter().enumerate() {
            if !is_valid_coordinate(point.lat, point.lon) {
                return Err(GpxError::InvalidTrackPoint {
                    index,
                    reason: format!("coordinate ({}, {}) out of range", point.lat, point.lon),
                });
            }
            if point.ele.is_some_and(|ele| !ele.is_finite()) {
                return Err(GpxError::InvalidTrackPoint {
                    index,
                    reason: "elevation is not a number".to_owned(),
                });
            }
        }

        Ok(GpxData {
            name,
            description,
            track_points,
        })
    }

    pub fn coordinates(&self) -> Vec<GeoPoint> {
        self.track_points
            .iter()
            .map(|point| GeoPoint::new(point.lon, point.lat))
            .collect()
    }

    /// Every track point becomes a route point, elevations are converted to
    /// whole feet and landmarks are inferred from the distance.
    pub fn to_path(&self) -> GeoPath {
        let count = self.track_points.len();
        GeoPath::from_coordinates(self.coordinates()).annotate(|index, point| {
            let track_point = &self.track_points[index];
            let elevation = track_point.ele.map(|ele| meters_to_feet(ele).round());
            let landmark = landmark_for(index, count, point.distance, track_point.name.as_deref());
            (elevation, landmark)
        })
    }

    pub fn summary(&self, path: &GeoPath) -> GpxSummary {
        GpxSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            point_count: path.len(),
            total_distance: path.total_distance(),
            elevation_gain: path.elevation_gain().round(),
            is_marathon_distance: path.is_marathon_distance(),
        }
    }
}

/// Parses a GPX document into a route.
pub fn import(content: &str) -> Result<ImportedRoute, GpxError> {
    let data = GpxData::parse(content)?;
    let path = data.to_path();
    let summary = data.summary(&path);
    log::info!(
        "Imported GPX route '{}': {} points, {:.2} mi, {} ft elevation gain.",
        summary.name,
        summary.point_count,
        summary.total_distance,
        summary.elevation_gain
    );
    Ok(ImportedRoute { summary, path })
}

/// Start and finish prefer the point's own name. In between the halfway
/// point and the wall win over whole miles, a point name comes last.
fn landmark_for(index: usize, count: usize, mile: f64, name: Option<&str>) -> Option<String> {
    let name = name.map(str::trim).filter(|name| !name.is_empty());
    if index == 0 {
        return Some(name.unwrap_or("Start").to_owned());
    }
    if index + 1 == count {
        return Some(name.unwrap_or("Finish").to_owned());
    }
    if (mile - HALF_MARATHON_DISTANCE_MILES).abs() < NAMED_LANDMARK_TOLERANCE {
        return Some("Halfway Point".to_owned());
    }
    if (mile - WALL_DISTANCE_MILES).abs() < NAMED_LANDMARK_TOLERANCE {
        return Some("The Wall".to_owned());
    }
    let whole = mile.round();
    if (mile - whole).abs() < MILE_LANDMARK_TOLERANCE
        && whole >= 1.0
        && whole <= MARATHON_DISTANCE_MILES.floor()
    {
        return Some(format!("Mile {}", whole as u32));
    }
    name.map(str::to_owned)
}
