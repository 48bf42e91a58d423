//! Route geometry: points, cumulative distances and lookups along a route.
//!
//! All distances are statute miles, elevations are feet and coordinates are
//! WGS84 degrees.

use std::{error, fmt};

use itertools::Itertools;
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};
use utility::geo::haversine_distance_miles;

/// Lookups snap to a stored point this close to the requested distance.
pub const EXACT_POINT_TOLERANCE_MILES: f64 = 0.01;

pub const MARATHON_DISTANCE_RANGE: (f64, f64) = (26.0, 26.5);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn from_lon_lat([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }

    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        GeoPath::segment_length(self, other)
    }

    /// Linear interpolation of longitude and latitude. Only a good
    /// approximation for short segments.
    pub fn lerp(&self, other: &GeoPoint, ratio: f64) -> GeoPoint {
        GeoPoint::new(
            self.longitude + (other.longitude - self.longitude) * ratio,
            self.latitude + (other.latitude - self.latitude) * ratio,
        )
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    #[serde(flatten)]
    pub location: GeoPoint,
    /// Cumulative distance from the start of the route.
    pub distance: f64,
    pub elevation: Option<f64>,
    pub landmark: Option<String>,
}

impl RoutePoint {
    pub fn new(location: GeoPoint, distance: f64) -> Self {
        Self {
            location,
            distance,
            elevation: None,
            landmark: None,
        }
    }

    pub fn with_elevation(mut self, elevation: Option<f64>) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_landmark<S: Into<String>>(mut self, landmark: Option<S>) -> Self {
        self.landmark = landmark.map(Into::into);
        self
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.location.latitude
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    FirstPointNotAtStart { distance: f64 },
    DistanceDecreases { index: usize },
    InvalidDistance { index: usize },
}

impl error::Error for PathError {}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathError::FirstPointNotAtStart { distance } => {
                write!(f, "first point must be at distance 0, found {}", distance)
            }
            PathError::DistanceDecreases { index } => {
                write!(f, "distance decreases at point {}", index)
            }
            PathError::InvalidDistance { index } => {
                write!(f, "point {} has no valid distance", index)
            }
        }
    }
}

/// An ordered sequence of route points. Insertion order is traversal order,
/// the first point sits at distance 0 and distances never decrease.
///
/// Paths are replaced as a whole when a route is redrawn or re-imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RoutePoint>", into = "Vec<RoutePoint>")]
pub struct GeoPath {
    points: Vec<RoutePoint>,
}

impl GeoPath {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a path from raw drawn or imported coordinates, chaining
    /// [`GeoPath::segment_length`] into cumulative distances.
    pub fn from_coordinates<I>(coordinates: I) -> Self
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut cumulative = 0.0;
        let mut previous: Option<GeoPoint> = None;
        let points = coordinates
            .into_iter()
            .map(|location| {
                if let Some(previous) = previous {
                    cumulative += Self::segment_length(&previous, &location);
                }
                previous = Some(location);
                RoutePoint::new(location, cumulative)
            })
            .collect();
        Self { points }
    }

    /// Builds a path from points which already carry their distances.
    pub fn from_route_points(points: Vec<RoutePoint>) -> Result<Self, PathError> {
        for (index, point) in points.iter().enumerate() {
            if !point.distance.is_finite() {
                return Err(PathError::InvalidDistance { index });
            }
        }
        if let Some(first) = points.first() {
            if first.distance != 0.0 {
                return Err(PathError::FirstPointNotAtStart {
                    distance: first.distance,
                });
            }
        }
        if let Some((index, _)) = points
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (a, b))| b.distance < a.distance)
        {
            return Err(PathError::DistanceDecreases { index: index + 1 });
        }
        Ok(Self { points })
    }

    /// Sets elevation and landmark of every point. Distances stay untouched.
    pub fn annotate<F>(mut self, mut annotation: F) -> Self
    where
        F: FnMut(usize, &RoutePoint) -> (Option<f64>, Option<String>),
    {
        for (index, point) in self.points.iter_mut().enumerate() {
            let (elevation, landmark) = annotation(index, point);
            point.elevation = elevation;
            point.landmark = landmark;
        }
        self
    }

    /// Great-circle distance in miles (Haversine, earth radius 3959 mi).
    pub fn segment_length(a: &GeoPoint, b: &GeoPoint) -> f64 {
        haversine_distance_miles(a.latitude, a.longitude, b.latitude, b.longitude)
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&RoutePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&RoutePoint> {
        self.points.last()
    }

    pub fn total_distance(&self) -> f64 {
        self.points.last().map(|point| point.distance).unwrap_or(0.0)
    }

    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .map(|point| point.location.lon_lat())
            .collect()
    }

    pub fn is_marathon_distance(&self) -> bool {
        let (min, max) = MARATHON_DISTANCE_RANGE;
        (min..=max).contains(&self.total_distance())
    }

    /// The segment `[a, b]` containing `target` together with the position
    /// of `target` inside it. `None` beyond the end of the path.
    fn segment_at(&self, target: f64) -> Option<(&RoutePoint, &RoutePoint, f64)> {
        self.points
            .iter()
            .tuple_windows()
            .find(|(a, b)| target >= a.distance && target <= b.distance)
            .map(|(a, b)| {
                let length = b.distance - a.distance;
                let ratio = if length > 0.0 {
                    (target - a.distance) / length
                } else {
                    0.0
                };
                (a, b, ratio)
            })
    }

    /// Position `target` miles along the route.
    ///
    /// `None` for an empty path or a negative target; targets beyond the end
    /// of the route resolve to the last point.
    pub fn location_at_distance(&self, target: f64) -> Option<GeoPoint> {
        if self.points.is_empty() || target.is_nan() || target < 0.0 {
            return None;
        }
        match self.segment_at(target) {
            Some((a, _, ratio)) if ratio == 0.0 => Some(a.location),
            Some((a, b, ratio)) => Some(a.location.lerp(&b.location, ratio)),
            None => self.points.last().map(|point| point.location),
        }
    }

    /// Like [`GeoPath::location_at_distance`], but returns a full route point
    /// with interpolated elevation. A stored point within 0.01 miles of the
    /// target is returned as is.
    pub fn point_at_distance(&self, target: f64) -> Option<RoutePoint> {
        if self.points.is_empty() || target.is_nan() || target < 0.0 {
            return None;
        }
        if let Some(exact) = self
            .points
            .iter()
            .find(|point| (point.distance - target).abs() < EXACT_POINT_TOLERANCE_MILES)
        {
            return Some(exact.clone());
        }
        match self.segment_at(target) {
            Some((a, b, ratio)) => {
                let elevation = a
                    .elevation
                    .zip(b.elevation)
                    .map(|(from, to)| from + (to - from) * ratio);
                Some(
                    RoutePoint::new(a.location.lerp(&b.location, ratio), target)
                        .with_elevation(elevation),
                )
            }
            None => self.points.last().cloned(),
        }
    }

    /// Elevation of the first point within `tolerance` miles of `distance`.
    pub fn elevation_near(&self, distance: f64, tolerance: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|point| (point.distance - distance).abs() < tolerance)
            .and_then(|point| point.elevation)
    }

    /// Sum of all climbs between consecutive points with a known elevation.
    pub fn elevation_gain(&self) -> f64 {
        self.points
            .iter()
            .filter_map(|point| point.elevation)
            .tuple_windows()
            .map(|(from, to)| (to - from).max(0.0))
            .sum()
    }

    /// Points on whole miles and points carrying a landmark.
    pub fn mile_markers(&self) -> Vec<&RoutePoint> {
        self.points
            .iter()
            .filter(|point| point.distance.fract() == 0.0 || point.landmark.is_some())
            .collect()
    }
}

impl TryFrom<Vec<RoutePoint>> for GeoPath {
    type Error = PathError;

    fn try_from(points: Vec<RoutePoint>) -> Result<Self, Self::Error> {
        GeoPath::from_route_points(points)
    }
}

impl From<GeoPath> for Vec<RoutePoint> {
    fn from(path: GeoPath) -> Self {
        path.points
    }
}

impl JsonSchema for GeoPath {
    fn schema_name() -> String {
        "GeoPath".to_owned()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <Vec<RoutePoint>>::json_schema(gen)
    }
}
