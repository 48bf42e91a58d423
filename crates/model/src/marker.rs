use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::{is_valid_coordinate, km_to_miles},
    id::HasId,
    time::format_race_time,
};

use crate::{pace::DistanceTimeSample, ExampleData, WithId};

/// A stored distance marker, optionally carrying the race clock at that
/// distance.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    #[serde(
        serialize_with = "utility::serde::race_time::serialize_option",
        deserialize_with = "utility::serde::race_time::deserialize_option",
        default
    )]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub race_time: Option<Duration>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HasId for Marker {
    type IdType = i64;
}

impl Marker {
    pub fn distance_miles(&self) -> f64 {
        km_to_miles(self.distance_km)
    }

    pub fn sample(&self) -> Option<DistanceTimeSample> {
        self.race_time.map(|elapsed| {
            DistanceTimeSample::new(self.distance_miles(), elapsed).with_note(self.note.clone())
        })
    }
}

impl ExampleData for Marker {
    fn example_data() -> Self {
        let created_at = Utc
            .with_ymd_and_hms(2024, 10, 6, 9, 32, 0)
            .single()
            .unwrap_or_default();
        Marker {
            name: "Half Marathon".to_owned(),
            description: Some("Race marker at Half Marathon (21.1K) - Time: 1:32:00".to_owned()),
            latitude: 44.9537,
            longitude: -93.0900,
            distance_km: 21.1,
            race_time: Some(Duration::seconds(5520)),
            note: None,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Samples of all markers with a race time, ordered by distance.
pub fn markers_to_samples<'a, I>(markers: I) -> Vec<DistanceTimeSample>
where
    I: IntoIterator<Item = &'a Marker>,
{
    let mut samples = markers
        .into_iter()
        .filter_map(Marker::sample)
        .collect::<Vec<_>>();
    samples.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    samples
}

pub fn samples_of(markers: &[WithId<Marker>]) -> Vec<DistanceTimeSample> {
    markers_to_samples(markers.iter().map(|marker| &marker.content))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    InvalidCoordinate,
    InvalidDistance,
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "marker name must not be empty"),
            ValidationError::InvalidCoordinate => {
                write!(f, "latitude and longitude must be valid WGS84 degrees")
            }
            ValidationError::InvalidDistance => {
                write!(f, "distance must be a non-negative number of kilometers")
            }
        }
    }
}

/// Input for creating a marker. Timestamps are assigned by the store.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMarker {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    #[serde(
        serialize_with = "utility::serde::race_time::serialize_option",
        deserialize_with = "utility::serde::race_time::deserialize_option",
        default
    )]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub race_time: Option<Duration>,
    pub note: Option<String>,
}

impl NewMarker {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !is_valid_coordinate(self.latitude, self.longitude) {
            return Err(ValidationError::InvalidCoordinate);
        }
        if !(self.distance_km.is_finite() && self.distance_km >= 0.0) {
            return Err(ValidationError::InvalidDistance);
        }
        Ok(())
    }

    pub fn into_marker(self, now: DateTime<Utc>) -> Marker {
        Marker {
            name: self.name,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            distance_km: self.distance_km,
            race_time: self.race_time,
            note: self.note,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ExampleData for NewMarker {
    fn example_data() -> Self {
        NewMarker {
            name: "10K".to_owned(),
            description: None,
            latitude: 44.9778,
            longitude: -93.2650,
            distance_km: 10.0,
            race_time: Some(Duration::seconds(2610)),
            note: Some("Right on plan".to_owned()),
        }
    }
}

/// Standard race checkpoints markers can be placed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaceDistance {
    pub label: &'static str,
    pub km: f64,
    pub miles: f64,
}

impl RaceDistance {
    pub fn presets() -> Vec<RaceDistance> {
        [
            ("5K", 5.0, 3.11),
            ("10K", 10.0, 6.21),
            ("15K", 15.0, 9.32),
            ("20K", 20.0, 12.43),
            ("Half Marathon", 21.1, 13.1),
            ("25K", 25.0, 15.53),
            ("30K", 30.0, 18.64),
            ("35K", 35.0, 21.75),
            ("40K", 40.0, 24.85),
            ("Finish", 42.2, 26.2),
        ]
        .into_iter()
        .map(|(label, km, miles)| RaceDistance { label, km, miles })
        .collect()
    }

    pub fn find(label: &str) -> Option<RaceDistance> {
        Self::presets()
            .into_iter()
            .find(|distance| distance.label.eq_ignore_ascii_case(label.trim()))
    }

    pub fn default_description(&self, race_time: &Duration) -> String {
        format!(
            "Race marker at {} ({}K) - Time: {}",
            self.label,
            self.km,
            format_race_time(race_time)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility::id::Id;

    fn new_marker() -> NewMarker {
        NewMarker::example_data()
    }

    #[test]
    fn validation() {
        assert_eq!(new_marker().validate(), Ok(()));

        let mut marker = new_marker();
        marker.name = "  ".to_owned();
        assert_eq!(marker.validate(), Err(ValidationError::EmptyName));

        let mut marker = new_marker();
        marker.latitude = 120.0;
        assert_eq!(marker.validate(), Err(ValidationError::InvalidCoordinate));

        let mut marker = new_marker();
        marker.distance_km = -1.0;
        assert_eq!(marker.validate(), Err(ValidationError::InvalidDistance));
    }

    #[test]
    fn samples_only_from_timed_markers() {
        let now = Utc::now();
        let half = Marker::example_data();
        let ten = new_marker().into_marker(now);
        let mut untimed = new_marker().into_marker(now);
        untimed.race_time = None;
        untimed.distance_km = 15.0;

        let markers = vec![
            WithId::new(Id::new(1), half),
            WithId::new(Id::new(2), untimed),
            WithId::new(Id::new(3), ten),
        ];
        let samples = samples_of(&markers);
        assert_eq!(samples.len(), 2);
        assert!((samples[0].distance - 6.21371).abs() < 1e-9);
        assert_eq!(samples[0].note.as_deref(), Some("Right on plan"));
        assert_eq!(samples[1].elapsed, Duration::seconds(5520));
    }

    #[test]
    fn race_distance_presets() {
        let half = RaceDistance::find("half marathon").unwrap();
        assert_eq!(half.miles, 13.1);
        assert_eq!(
            half.default_description(&Duration::seconds(5520)),
            "Race marker at Half Marathon (21.1K) - Time: 1:32:00"
        );
        assert_eq!(
            RaceDistance::find("5K").unwrap().default_description(&Duration::minutes(25)),
            "Race marker at 5K (5K) - Time: 0:25:00"
        );
        assert!(RaceDistance::find("50K").is_none());
    }

    #[test]
    fn marker_json() {
        let json = serde_json::to_value(WithId::new(Id::<Marker>::new(7), Marker::example_data())).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["raceTime"], "1:32:00");
        assert_eq!(json["distanceKm"], 21.1);
        assert!(json.get("note").is_none());

        let parsed: NewMarker = serde_json::from_str(
            r#"{"name":"5K","latitude":44.9,"longitude":-93.2,"distanceKm":5,"raceTime":""}"#,
        )
        .unwrap();
        assert_eq!(parsed.race_time, None);
        assert!(serde_json::from_str::<NewMarker>(
            r#"{"name":"5K","latitude":44.9,"longitude":-93.2,"distanceKm":5,"raceTime":"fast"}"#
        )
        .is_err());
    }

    #[test]
    fn marker_schema_types_the_id() {
        let schema = serde_json::to_value(schemars::schema_for!(WithId<Marker>)).unwrap();
        let id = &schema["definitions"]["MarkerId"];
        assert_eq!(id["type"], "integer");
        assert_eq!(id["format"], "int64");
    }
}
