//! Current pace, trend and finish time projection from recorded samples.

use chrono::Duration;
use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    stats,
    time::{duration_from_secs, parse_pace, race_time_or_zero, seconds},
};

use crate::{path::GeoPath, ExampleData, MARATHON_DISTANCE_MILES};

/// Default target range, 7:00 to 8:10 per mile.
pub const DEFAULT_FAST_PACE_SECS: f64 = 420.0;
pub const DEFAULT_SLOW_PACE_SECS: f64 = 490.0;

/// Width of the band around the target midpoint which still counts as steady.
pub const TREND_TOLERANCE_SECS: f64 = 15.0;

/// Reference pace (7:30 per mile) the elevation penalty is scaled against.
pub const ELEVATION_REFERENCE_PACE_SECS: f64 = 450.0;
pub const SECS_PER_100_FT_CLIMB: f64 = 10.0;
pub const ELEVATION_FACTOR_MIN: f64 = 0.8;
pub const ELEVATION_FACTOR_MAX: f64 = 1.3;

/// Profile points within this many miles of a whole mile are used for the
/// elevation of that mile.
pub const ELEVATION_LOOKUP_TOLERANCE_MILES: f64 = 0.1;

/// Number of trailing splits averaged into the recent pace.
pub const RECENT_SPLIT_COUNT: usize = 3;

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistanceTimeSample {
    /// Miles from the start.
    pub distance: f64,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub elapsed: Duration,
    pub note: Option<String>,
}

impl DistanceTimeSample {
    pub fn new(distance: f64, elapsed: Duration) -> Self {
        Self {
            distance,
            elapsed,
            note: None,
        }
    }

    /// Malformed race times count as zero elapsed time.
    pub fn parse(distance: f64, race_time: &str) -> Self {
        Self::new(distance, race_time_or_zero(race_time))
    }

    pub fn with_note<S: Into<String>>(mut self, note: Option<S>) -> Self {
        self.note = note.map(Into::into);
        self
    }

    pub fn elapsed_secs(&self) -> f64 {
        seconds(&self.elapsed)
    }
}

impl ExampleData for DistanceTimeSample {
    fn example_data() -> Self {
        DistanceTimeSample::new(13.1, Duration::seconds(5520))
            .with_note(Some("Feeling strong at the half"))
    }
}

/// A target pace range in seconds per mile. `fast` is the smaller number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetPace {
    pub fast: f64,
    pub slow: f64,
}

impl TargetPace {
    pub fn new(fast: f64, slow: f64) -> Option<Self> {
        (fast.is_finite() && slow.is_finite() && fast > 0.0 && slow > 0.0 && fast <= slow)
            .then_some(Self { fast, slow })
    }

    /// Parses both ends of the range from `M:SS`.
    pub fn parse(fast: &str, slow: &str) -> Option<Self> {
        Self::new(parse_pace(fast)?, parse_pace(slow)?)
    }

    pub fn midpoint(&self) -> f64 {
        (self.fast + self.slow) / 2.0
    }

    pub fn contains(&self, pace: f64) -> bool {
        (self.fast..=self.slow).contains(&pace)
    }
}

impl Default for TargetPace {
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST_PACE_SECS,
            slow: DEFAULT_SLOW_PACE_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct PacePreset {
    pub name: &'static str,
    #[serde(flatten)]
    pub pace: TargetPace,
}

impl PacePreset {
    pub fn presets() -> Vec<PacePreset> {
        [
            ("Elite", 300.0, 330.0),
            ("Sub-3", 405.0, 415.0),
            ("Sub-3:30", 450.0, 480.0),
            ("Sub-4", 510.0, 550.0),
            ("Sub-5", 630.0, 690.0),
        ]
        .into_iter()
        .map(|(name, fast, slow)| PacePreset {
            name,
            pace: TargetPace { fast, slow },
        })
        .collect()
    }

    pub fn find(name: &str) -> Option<PacePreset> {
        Self::presets()
            .into_iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaceTrend {
    Faster,
    Steady,
    Slower,
}

impl PaceTrend {
    pub fn classify(pace: f64, target: &TargetPace) -> Self {
        let midpoint = target.midpoint();
        if pace < midpoint - TREND_TOLERANCE_SECS {
            PaceTrend::Faster
        } else if pace > midpoint + TREND_TOLERANCE_SECS {
            PaceTrend::Slower
        } else {
            PaceTrend::Steady
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPace {
    pub pace_sec_per_mile: f64,
    pub trend: PaceTrend,
}

/// A sample enriched with the split since the previous sample.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitRecord {
    pub distance: f64,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub elapsed: Duration,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub split: Duration,
    /// Seconds per mile over the split, 0 when no distance was covered.
    pub pace: f64,
    pub note: Option<String>,
}

impl SplitRecord {
    pub fn from_samples<'a, I>(samples: I) -> Vec<SplitRecord>
    where
        I: IntoIterator<Item = &'a DistanceTimeSample>,
    {
        let mut previous = (0.0, Duration::zero());
        samples
            .into_iter()
            .map(|sample| {
                let (previous_distance, previous_elapsed) = previous;
                let split = sample.elapsed - previous_elapsed;
                let covered = sample.distance - previous_distance;
                let pace = if covered > 0.0 {
                    seconds(&split) / covered
                } else {
                    0.0
                };
                previous = (sample.distance, sample.elapsed);
                SplitRecord {
                    distance: sample.distance,
                    elapsed: sample.elapsed,
                    split,
                    pace,
                    note: sample.note.clone(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Projections {
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub best: Duration,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub average: Duration,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub conservative: Duration,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub current: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaceAnalysis {
    pub splits: Vec<SplitRecord>,
    pub fastest_pace: f64,
    pub slowest_pace: f64,
    pub average_pace: f64,
    pub recent_average: f64,
    pub pace_variation: f64,
    pub consistency: f64,
    pub projections: Projections,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishRange {
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub fast: Duration,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub slow: Duration,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub current: Duration,
    pub current_pace: CurrentPace,
}

/// Multiplier applied to the flat pace of a mile climbing `change_ft` feet.
/// Descents give a bonus, both directions are clamped.
pub fn elevation_adjustment(change_ft: f64) -> f64 {
    let penalty = change_ft / 100.0 * SECS_PER_100_FT_CLIMB;
    (1.0 + penalty / ELEVATION_REFERENCE_PACE_SECS).clamp(ELEVATION_FACTOR_MIN, ELEVATION_FACTOR_MAX)
}

/// `100 - CoV` in percent, floored at 0. Fewer than two paces are perfectly
/// consistent.
pub fn split_consistency(paces: &[f64]) -> f64 {
    if paces.len() < 2 {
        return 100.0;
    }
    match stats::coefficient_of_variation(paces) {
        Some(variation) => (100.0 - variation).max(0.0),
        None => 100.0,
    }
}

/// Projects paces and finish times from the samples recorded so far.
///
/// Every projection degrades to a default instead of failing: no samples
/// fall back to the target range, a missing elevation profile to flat
/// running.
#[derive(Debug, Clone)]
pub struct PaceProjector<'a> {
    samples: Vec<&'a DistanceTimeSample>,
    target: TargetPace,
    total_distance: f64,
    profile: Option<&'a GeoPath>,
}

impl<'a> PaceProjector<'a> {
    pub fn new(samples: &'a [DistanceTimeSample], target: TargetPace, total_distance: f64) -> Self {
        let samples = samples
            .iter()
            .sorted_by(|a, b| a.distance.total_cmp(&b.distance))
            .collect();
        Self {
            samples,
            target,
            total_distance,
            profile: None,
        }
    }

    /// Uses the route's length as race distance (26.2 for an empty route)
    /// and its elevations as profile.
    pub fn for_route(samples: &'a [DistanceTimeSample], target: TargetPace, path: &'a GeoPath) -> Self {
        let total = path.total_distance();
        let total = if total > 0.0 { total } else { MARATHON_DISTANCE_MILES };
        Self::new(samples, target, total).with_profile(path)
    }

    pub fn with_profile(mut self, profile: &'a GeoPath) -> Self {
        self.profile = Some(profile).filter(|path| !path.is_empty());
        self
    }

    pub fn target(&self) -> &TargetPace {
        &self.target
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn current_pace(&self) -> CurrentPace {
        let fallback = CurrentPace {
            pace_sec_per_mile: self.target.midpoint(),
            trend: PaceTrend::Steady,
        };
        let [.., earlier, later] = self.samples.as_slice() else {
            return fallback;
        };
        let covered = later.distance - earlier.distance;
        if !(covered > 0.0) {
            return fallback;
        }
        let pace = (later.elapsed_secs() - earlier.elapsed_secs()) / covered;
        CurrentPace {
            pace_sec_per_mile: pace,
            trend: PaceTrend::classify(pace, &self.target),
        }
    }

    /// Predicted clock time at `distance` running `pace` from the latest
    /// sample at or before that distance.
    pub fn projected_time_at(&self, distance: f64, pace: f64) -> Duration {
        let pace = if pace.is_finite() { pace.max(0.0) } else { 0.0 };
        let (start, base) = self
            .samples
            .iter()
            .rev()
            .find(|sample| sample.distance <= distance)
            .map(|sample| (sample.distance, sample.elapsed_secs()))
            .unwrap_or((0.0, 0.0));

        let mut total = base;
        match self.profile {
            Some(profile) => {
                let mut mile = start;
                while mile < distance {
                    let factor = match (
                        profile.elevation_near(mile, ELEVATION_LOOKUP_TOLERANCE_MILES),
                        profile.elevation_near(mile + 1.0, ELEVATION_LOOKUP_TOLERANCE_MILES),
                    ) {
                        (Some(from), Some(to)) => elevation_adjustment(to - from),
                        _ => 1.0,
                    };
                    total += pace * factor * (distance - mile).min(1.0);
                    mile += 1.0;
                }
            }
            None => total += (distance - start).max(0.0) * pace,
        }
        duration_from_secs(total)
    }

    pub fn projected_finish(&self, pace: f64) -> Duration {
        self.projected_time_at(self.total_distance, pace)
    }

    pub fn finish_range(&self) -> FinishRange {
        let current_pace = self.current_pace();
        FinishRange {
            fast: self.projected_finish(self.target.fast),
            slow: self.projected_finish(self.target.slow),
            current: self.projected_finish(current_pace.pace_sec_per_mile),
            current_pace,
        }
    }

    pub fn split_records(&self) -> Vec<SplitRecord> {
        SplitRecord::from_samples(self.samples.iter().copied())
    }

    pub fn analysis(&self) -> Option<PaceAnalysis> {
        let splits = self.split_records();
        let last = splits.last()?;
        let paces = splits.iter().map(|split| split.pace).collect::<Vec<_>>();

        let fastest_pace = stats::min(&paces)?;
        let slowest_pace = stats::max(&paces)?;
        let average_pace = stats::mean(&paces)?;
        let recent_average = stats::mean(&paces[paces.len().saturating_sub(RECENT_SPLIT_COUNT)..])?;

        let total = self.total_distance;
        let remaining = (total - last.distance).max(0.0);
        let projections = Projections {
            best: duration_from_secs(fastest_pace * total),
            average: duration_from_secs(average_pace * total),
            conservative: duration_from_secs(slowest_pace * total),
            current: duration_from_secs(seconds(&last.elapsed) + remaining * recent_average),
        };

        Some(PaceAnalysis {
            fastest_pace,
            slowest_pace,
            average_pace,
            recent_average,
            pace_variation: slowest_pace - fastest_pace,
            consistency: split_consistency(&paces),
            projections,
            splits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{GeoPoint, RoutePoint};
    use proptest::prelude::*;

    fn samples() -> Vec<DistanceTimeSample> {
        vec![
            DistanceTimeSample::parse(10.0, "1:10:00"),
            DistanceTimeSample::parse(5.0, "0:35:00"),
        ]
    }

    fn target() -> TargetPace {
        TargetPace::parse("7:00", "8:10").unwrap()
    }

    fn flat_route(elevations: &[f64]) -> GeoPath {
        GeoPath::from_route_points(
            elevations
                .iter()
                .enumerate()
                .map(|(mile, elevation)| {
                    RoutePoint::new(GeoPoint::new(-93.0, 45.0 + mile as f64 / 60.0), mile as f64)
                        .with_elevation(Some(*elevation))
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn current_pace_from_two_latest_samples() {
        let samples = samples();
        let projector = PaceProjector::new(&samples, target(), MARATHON_DISTANCE_MILES);
        let current = projector.current_pace();
        assert_eq!(current.pace_sec_per_mile, 420.0);
        // midpoint 455, faster than 440
        assert_eq!(current.trend, PaceTrend::Faster);
    }

    #[test]
    fn current_pace_falls_back_to_target_midpoint() {
        let one = vec![DistanceTimeSample::parse(5.0, "0:35:00")];
        let projector = PaceProjector::new(&one, target(), MARATHON_DISTANCE_MILES);
        assert_eq!(
            projector.current_pace(),
            CurrentPace {
                pace_sec_per_mile: 455.0,
                trend: PaceTrend::Steady
            }
        );

        let duplicated = vec![
            DistanceTimeSample::parse(5.0, "0:35:00"),
            DistanceTimeSample::parse(5.0, "0:36:00"),
        ];
        let projector = PaceProjector::new(&duplicated, target(), MARATHON_DISTANCE_MILES);
        assert_eq!(projector.current_pace().trend, PaceTrend::Steady);
        assert_eq!(projector.current_pace().pace_sec_per_mile, 455.0);
    }

    #[test]
    fn trend_band_edges_are_steady() {
        let target = target();
        assert_eq!(PaceTrend::classify(440.0, &target), PaceTrend::Steady);
        assert_eq!(PaceTrend::classify(470.0, &target), PaceTrend::Steady);
        assert_eq!(PaceTrend::classify(439.9, &target), PaceTrend::Faster);
        assert_eq!(PaceTrend::classify(470.1, &target), PaceTrend::Slower);
    }

    #[test]
    fn flat_projection_without_profile() {
        let samples = samples();
        let projector = PaceProjector::new(&samples, target(), 26.0);
        // 1:10:00 + 16 * 7:00
        assert_eq!(projector.projected_finish(420.0), Duration::seconds(4200 + 16 * 420));

        let none: Vec<DistanceTimeSample> = vec![];
        let projector = PaceProjector::new(&none, target(), 26.2);
        assert_eq!(projector.projected_finish(400.0), Duration::seconds(10480));
    }

    #[test]
    fn malformed_times_count_as_zero() {
        let samples = vec![DistanceTimeSample::parse(3.0, "soon")];
        let projector = PaceProjector::new(&samples, target(), 4.0);
        assert_eq!(projector.projected_finish(400.0), Duration::seconds(400));
    }

    #[test]
    fn projection_on_flat_profile_matches_flat_formula() {
        let route = flat_route(&[100.0, 100.0, 100.0, 100.0]);
        let none: Vec<DistanceTimeSample> = vec![];
        let projector = PaceProjector::for_route(&none, target(), &route);
        assert_eq!(projector.total_distance(), 3.0);
        assert_eq!(projector.projected_finish(450.0), Duration::seconds(1350));
    }

    #[test]
    fn climbs_slow_the_projection() {
        let route = flat_route(&[0.0, 100.0, 100.0]);
        let none: Vec<DistanceTimeSample> = vec![];
        let projector = PaceProjector::for_route(&none, target(), &route);
        // first mile climbs 100 ft: 450 * (1 + 10 / 450) = 460
        assert_eq!(projector.projected_finish(450.0), Duration::seconds(460 + 450));
    }

    #[test]
    fn elevation_adjustment_is_clamped() {
        assert_eq!(elevation_adjustment(0.0), 1.0);
        assert_eq!(elevation_adjustment(10_000.0), ELEVATION_FACTOR_MAX);
        assert_eq!(elevation_adjustment(-10_000.0), ELEVATION_FACTOR_MIN);
        assert!((elevation_adjustment(-100.0) - (1.0 - 10.0 / 450.0)).abs() < 1e-12);
    }

    #[test]
    fn consistency() {
        assert_eq!(split_consistency(&[480.0, 480.0, 480.0]), 100.0);
        assert_eq!(split_consistency(&[480.0]), 100.0);
        assert_eq!(split_consistency(&[]), 100.0);
        assert!(split_consistency(&[400.0, 500.0]) < 100.0);
        assert_eq!(split_consistency(&[1.0, 1000.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn analysis_of_recorded_samples() {
        let samples = vec![
            DistanceTimeSample::parse(5.0, "0:40:00"),
            DistanceTimeSample::parse(10.0, "1:15:00"),
            DistanceTimeSample::parse(13.1, "1:37:00"),
        ];
        let projector = PaceProjector::new(&samples, target(), MARATHON_DISTANCE_MILES);
        let analysis = projector.analysis().unwrap();

        assert_eq!(analysis.splits.len(), 3);
        assert_eq!(analysis.splits[0].split, Duration::minutes(40));
        assert_eq!(analysis.splits[1].split, Duration::minutes(35));
        assert_eq!(analysis.fastest_pace, 420.0);
        assert_eq!(analysis.slowest_pace, 480.0);
        assert_eq!(analysis.pace_variation, 60.0);
        assert!(analysis.consistency < 100.0);

        let expected_current = 5820.0 + (26.2 - 13.1) * analysis.recent_average;
        assert!((seconds(&analysis.projections.current) - expected_current).abs() < 0.001);
        assert!(analysis.projections.best < analysis.projections.conservative);
    }

    #[test]
    fn no_analysis_without_samples() {
        let none: Vec<DistanceTimeSample> = vec![];
        assert!(PaceProjector::new(&none, target(), 26.2).analysis().is_none());
    }

    #[test]
    fn target_pace_validation() {
        assert_eq!(TargetPace::new(490.0, 420.0), None);
        assert_eq!(TargetPace::new(0.0, 420.0), None);
        assert_eq!(TargetPace::parse("7:00", "8:10"), Some(TargetPace::default()));
        assert_eq!(TargetPace::parse("7", "8:10"), None);
        assert_eq!(PacePreset::find("sub-3:30").map(|p| p.pace.fast), Some(450.0));
        assert_eq!(PacePreset::presets().len(), 5);
    }

    #[test]
    fn sample_json() {
        let json = serde_json::to_value(DistanceTimeSample::example_data()).unwrap();
        assert_eq!(json["elapsed"], "1:32:00");
        assert_eq!(json["distance"], 13.1);
    }

    proptest! {
        #[test]
        fn constant_paces_are_perfectly_consistent(pace in 1.0f64..2000.0, count in 1usize..20) {
            let paces = vec![pace; count];
            prop_assert!((split_consistency(&paces) - 100.0).abs() < 1e-9);
        }

        #[test]
        fn consistency_stays_in_range(paces in prop::collection::vec(1.0f64..2000.0, 0..20)) {
            let consistency = split_consistency(&paces);
            prop_assert!((0.0..=100.0).contains(&consistency));
        }
    }
}
