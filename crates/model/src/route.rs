use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    path::{GeoPath, GeoPoint, RoutePoint},
    ExampleData,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarathonRoute {
    pub name: String,
    pub description: String,
    pub start_location: String,
    pub finish_location: String,
    pub total_distance: f64,
    /// Feet.
    pub elevation_gain: f64,
    pub path: GeoPath,
}

impl HasId for MarathonRoute {
    type IdType = String;
}

/// Catalog listing entry without the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub id: Id<MarathonRoute>,
    pub name: String,
    pub description: String,
    pub start_location: String,
    pub finish_location: String,
    pub total_distance: f64,
    pub elevation_gain: f64,
    pub point_count: usize,
}

impl MarathonRoute {
    pub fn summary(&self, id: Id<MarathonRoute>) -> RouteSummary {
        RouteSummary {
            id,
            name: self.name.clone(),
            description: self.description.clone(),
            start_location: self.start_location.clone(),
            finish_location: self.finish_location.clone(),
            total_distance: self.total_distance,
            elevation_gain: self.elevation_gain,
            point_count: self.path.len(),
        }
    }
}

impl ExampleData for MarathonRoute {
    fn example_data() -> Self {
        MarathonRoute {
            name: "Twin Cities Marathon".to_owned(),
            description: "The most beautiful urban marathon in America".to_owned(),
            start_location: "Minneapolis".to_owned(),
            finish_location: "St. Paul - State Capitol".to_owned(),
            total_distance: 0.0,
            elevation_gain: 0.0,
            path: GeoPath::empty(),
        }
    }
}

type SurveyedPoint = (f64, f64, f64, f64, Option<&'static str>);

fn surveyed_path(points: &[SurveyedPoint]) -> GeoPath {
    let points = points
        .iter()
        .map(|&(longitude, latitude, mile, elevation, landmark)| {
            RoutePoint::new(GeoPoint::new(longitude, latitude), mile)
                .with_elevation(Some(elevation))
                .with_landmark(landmark)
        })
        .collect();
    // The surveyed tables below start at mile 0 and only ever count up.
    GeoPath::from_route_points(points).unwrap_or_default()
}

const NYC_MARATHON: &[SurveyedPoint] = &[
    (-74.0445, 40.6067, 0.0, 50.0, Some("Start - Verrazzano Bridge")),
    (-74.0234, 40.6234, 1.0, 45.0, None),
    (-74.0123, 40.6345, 2.0, 40.0, None),
    (-74.0012, 40.6456, 3.0, 35.0, Some("Brooklyn - Bay Ridge")),
    (-73.9901, 40.6567, 4.0, 30.0, None),
    (-73.9790, 40.6678, 5.0, 25.0, None),
    (-73.9679, 40.6789, 6.0, 20.0, None),
    (-73.9568, 40.6900, 7.0, 15.0, Some("Brooklyn - Sunset Park")),
    (-73.9457, 40.7011, 8.0, 10.0, None),
    (-73.9346, 40.7122, 9.0, 5.0, None),
    (-73.9235, 40.7233, 10.0, 0.0, None),
    (-73.9124, 40.7344, 11.0, 5.0, Some("Brooklyn - Williamsburg")),
    (-73.9013, 40.7455, 12.0, 10.0, None),
    (-73.8902, 40.7566, 13.0, 15.0, Some("Halfway Point!")),
    (-73.8791, 40.7677, 14.0, 20.0, None),
    (-73.8680, 40.7788, 15.0, 25.0, Some("Queens - Long Island City")),
    (-73.8569, 40.7899, 16.0, 30.0, None),
    (-73.8458, 40.8010, 17.0, 35.0, None),
    (-73.8347, 40.8121, 18.0, 40.0, Some("Bronx - South Bronx")),
    (-73.8236, 40.8232, 19.0, 45.0, None),
    (-73.8125, 40.8343, 20.0, 50.0, Some("The Wall - Mile 20")),
    (-73.8014, 40.8454, 21.0, 55.0, None),
    (-73.7903, 40.8565, 22.0, 60.0, Some("Manhattan - Harlem")),
    (-73.7792, 40.8676, 23.0, 65.0, None),
    (-73.7681, 40.8787, 24.0, 70.0, None),
    (-73.7570, 40.8898, 25.0, 75.0, Some("Central Park - Almost There!")),
    (-73.7459, 40.9009, 26.0, 80.0, None),
    (-73.7348, 40.9120, 26.2, 85.0, Some("Finish Line - Central Park")),
];

const BOSTON_MARATHON: &[SurveyedPoint] = &[
    (-71.5226, 42.2287, 0.0, 490.0, Some("Start - Hopkinton")),
    (-71.5115, 42.2398, 1.0, 480.0, None),
    (-71.5004, 42.2509, 2.0, 470.0, None),
    (-71.4893, 42.2620, 3.0, 460.0, Some("Ashland")),
    (-71.4782, 42.2731, 4.0, 450.0, None),
    (-71.4671, 42.2842, 5.0, 440.0, None),
    (-71.4560, 42.2953, 6.0, 430.0, Some("Framingham")),
    (-71.4449, 42.3064, 7.0, 420.0, None),
    (-71.4338, 42.3175, 8.0, 410.0, None),
    (-71.4227, 42.3286, 9.0, 400.0, Some("Natick")),
    (-71.4116, 42.3397, 10.0, 390.0, None),
    (-71.4005, 42.3508, 11.0, 380.0, None),
    (-71.3894, 42.3619, 12.0, 370.0, Some("Wellesley - Scream Tunnel")),
    (-71.3783, 42.3730, 13.0, 360.0, Some("Halfway Point!")),
    (-71.3672, 42.3841, 14.0, 350.0, None),
    (-71.3561, 42.3952, 15.0, 340.0, None),
    (-71.3450, 42.4063, 16.0, 330.0, Some("Newton Lower Falls")),
    (-71.3339, 42.4174, 17.0, 380.0, Some("Newton Hills Begin")),
    (-71.3228, 42.4285, 18.0, 430.0, None),
    (-71.3117, 42.4396, 19.0, 480.0, None),
    (-71.3006, 42.4507, 20.0, 530.0, Some("Heartbreak Hill")),
    (-71.2895, 42.4618, 21.0, 480.0, Some("Boston College")),
    (-71.2784, 42.4729, 22.0, 430.0, None),
    (-71.2673, 42.4840, 23.0, 380.0, None),
    (-71.2562, 42.4951, 24.0, 330.0, Some("Brookline")),
    (-71.2451, 42.5062, 25.0, 280.0, None),
    (-71.2340, 42.5173, 26.0, 230.0, None),
    (-71.2229, 42.5284, 26.2, 180.0, Some("Finish - Copley Square")),
];

/// Read-only set of example routes, in display order.
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: IndexMap<Id<MarathonRoute>, MarathonRoute>,
}

impl RouteCatalog {
    pub fn new<I>(routes: I) -> Self
    where
        I: IntoIterator<Item = (Id<MarathonRoute>, MarathonRoute)>,
    {
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new([
            (
                Id::new("nyc-marathon".to_owned()),
                MarathonRoute {
                    name: "NYC Marathon".to_owned(),
                    description: "The iconic New York City Marathon route through all five boroughs"
                        .to_owned(),
                    start_location: "Staten Island - Verrazzano Bridge".to_owned(),
                    finish_location: "Central Park".to_owned(),
                    total_distance: 26.2,
                    elevation_gain: 312.0,
                    path: surveyed_path(NYC_MARATHON),
                },
            ),
            (
                Id::new("boston-marathon".to_owned()),
                MarathonRoute {
                    name: "Boston Marathon".to_owned(),
                    description: "The historic Boston Marathon route from Hopkinton to Boston"
                        .to_owned(),
                    start_location: "Hopkinton".to_owned(),
                    finish_location: "Copley Square, Boston".to_owned(),
                    total_distance: 26.2,
                    elevation_gain: 450.0,
                    path: surveyed_path(BOSTON_MARATHON),
                },
            ),
        ])
    }

    pub fn get(&self, id: &Id<MarathonRoute>) -> Option<&MarathonRoute> {
        self.routes.get(id)
    }

    pub fn routes(&self) -> impl Iterator<Item = (&Id<MarathonRoute>, &MarathonRoute)> {
        self.routes.iter()
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|(id, route)| route.summary(id.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nyc() -> Id<MarathonRoute> {
        Id::new("nyc-marathon".to_owned())
    }

    #[test]
    fn builtin_routes_keep_their_order() {
        let catalog = RouteCatalog::builtin();
        let names = catalog.summaries().into_iter().map(|s| s.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["NYC Marathon", "Boston Marathon"]);
        assert!(catalog.get(&Id::new("chicago".to_owned())).is_none());
    }

    #[test]
    fn builtin_paths_are_complete() {
        let catalog = RouteCatalog::builtin();
        for (id, route) in catalog.routes() {
            assert_eq!(route.path.len(), 28, "{id}");
            assert_eq!(route.path.total_distance(), route.total_distance);
            assert!(route.path.is_marathon_distance());
        }
    }

    #[test]
    fn lookup_along_the_nyc_route() {
        let catalog = RouteCatalog::builtin();
        let route = catalog.get(&nyc()).unwrap();

        let halfway = route.path.point_at_distance(13.0).unwrap();
        assert_eq!(halfway.landmark.as_deref(), Some("Halfway Point!"));

        let between = route.path.point_at_distance(12.5).unwrap();
        assert!((between.elevation.unwrap() - 12.5).abs() < 1e-9);
        assert!((between.longitude() - (-73.9013 + -73.8902) / 2.0).abs() < 1e-9);

        // whole miles 0..=26 plus the landmark at 26.2
        assert_eq!(route.path.mile_markers().len(), 28);
    }

    #[test]
    fn boston_climbs_the_newton_hills() {
        let catalog = RouteCatalog::builtin();
        let route = catalog.get(&Id::new("boston-marathon".to_owned())).unwrap();
        assert_eq!(route.path.elevation_gain(), 200.0);
    }

    #[test]
    fn summaries_serialize_with_ids() {
        let catalog = RouteCatalog::builtin();
        let json = serde_json::to_value(catalog.summaries()).unwrap();
        assert_eq!(json[0]["id"], "nyc-marathon");
        assert_eq!(json[1]["pointCount"], 28);
    }
}
