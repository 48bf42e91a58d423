use std::{fmt, str::FromStr};

use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::time::{duration_from_secs, seconds};

use crate::{HALF_MARATHON_DISTANCE_MILES, MARATHON_DISTANCE_MILES};

pub const DEFAULT_SPLIT_INTERVAL_MILES: f64 = 5.0;

/// Shortest interval splits are planned at.
pub const MIN_SPLIT_INTERVAL_MILES: f64 = 0.1;

/// Pace adjustment applied to each half for negative and positive splits.
pub const HALF_PACE_ADJUSTMENT: f64 = 0.025;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    #[default]
    Even,
    /// Slower first half, faster second half.
    Negative,
    /// Faster first half, fading second half.
    Positive,
}

impl SplitStrategy {
    /// Pace multipliers for the first and second half.
    fn half_factors(&self) -> (f64, f64) {
        match self {
            SplitStrategy::Even => (1.0, 1.0),
            SplitStrategy::Negative => (1.0 + HALF_PACE_ADJUSTMENT, 1.0 - HALF_PACE_ADJUSTMENT),
            SplitStrategy::Positive => (1.0 - HALF_PACE_ADJUSTMENT, 1.0 + HALF_PACE_ADJUSTMENT),
        }
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SplitStrategy::Even => "even",
            SplitStrategy::Negative => "negative",
            SplitStrategy::Positive => "positive",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl std::error::Error for UnknownStrategy {}

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown split strategy '{}', expected even, negative or positive",
            self.0
        )
    }
}

impl FromStr for SplitStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "even" => Ok(SplitStrategy::Even),
            "negative" => Ok(SplitStrategy::Negative),
            "positive" => Ok(SplitStrategy::Positive),
            _ => Err(UnknownStrategy(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSplit {
    pub distance: f64,
    #[serde(with = "utility::serde::race_time")]
    #[schemars(schema_with = "utility::serde::race_time::schema")]
    pub elapsed: Duration,
    /// Average seconds per mile from the start up to this checkpoint.
    pub pace: f64,
}

/// Plans checkpoint times for a target finish time. Every strategy is a
/// piecewise linear pace schedule with one break at the half marathon.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlanner {
    target_total_secs: f64,
    total_distance: f64,
    strategy: SplitStrategy,
}

impl SplitPlanner {
    pub fn new(target_total: Duration, total_distance: f64, strategy: SplitStrategy) -> Self {
        Self {
            target_total_secs: seconds(&target_total),
            total_distance,
            strategy,
        }
    }

    /// Without a target time the finish is derived from `fallback_pace` over
    /// the whole distance.
    pub fn from_target_or_pace(
        target_total: Option<Duration>,
        fallback_pace: f64,
        total_distance: f64,
        strategy: SplitStrategy,
    ) -> Self {
        let total_distance = if total_distance > 0.0 {
            total_distance
        } else {
            MARATHON_DISTANCE_MILES
        };
        let target_total_secs = target_total
            .map(|target| seconds(&target))
            .unwrap_or(fallback_pace * total_distance);
        Self {
            target_total_secs,
            total_distance,
            strategy,
        }
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    pub fn target_total(&self) -> Duration {
        duration_from_secs(self.target_total_secs)
    }

    pub fn average_pace(&self) -> f64 {
        if self.total_distance > 0.0 {
            self.target_total_secs / self.total_distance
        } else {
            0.0
        }
    }

    /// Planned elapsed seconds at `distance`.
    pub fn elapsed_at(&self, distance: f64) -> f64 {
        let average = self.average_pace();
        match self.strategy {
            SplitStrategy::Even => self.target_total_secs / self.total_distance * distance,
            strategy => {
                let (first, second) = strategy.half_factors();
                let (first, second) = (average * first, average * second);
                if distance <= HALF_MARATHON_DISTANCE_MILES {
                    first * distance
                } else {
                    first * HALF_MARATHON_DISTANCE_MILES
                        + second * (distance - HALF_MARATHON_DISTANCE_MILES)
                }
            }
        }
    }

    /// Checkpoints at whole multiples of `interval` up to the last whole mile
    /// of the race. Intervals below [`MIN_SPLIT_INTERVAL_MILES`] plan nothing.
    pub fn compute_splits(&self, interval: f64) -> Vec<PlannedSplit> {
        if !(interval >= MIN_SPLIT_INTERVAL_MILES) || !(self.total_distance > 0.0) {
            return Vec::new();
        }
        let last = self.total_distance.floor();
        // tolerance keeps e.g. 26.0 / 0.1 from rounding down to 259
        let count = (last / interval + 1e-9).floor() as usize;
        (1..=count)
            .map(|k| (k as f64 * interval).min(last))
            .map(|distance| {
                let elapsed = self.elapsed_at(distance);
                PlannedSplit {
                    distance,
                    elapsed: duration_from_secs(elapsed),
                    pace: elapsed / distance,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(strategy: SplitStrategy) -> SplitPlanner {
        SplitPlanner::new(Duration::seconds(12600), MARATHON_DISTANCE_MILES, strategy)
    }

    #[test]
    fn even_splits_hold_a_constant_pace() {
        let splits = planner(SplitStrategy::Even).compute_splits(DEFAULT_SPLIT_INTERVAL_MILES);
        let distances = splits.iter().map(|s| s.distance).collect::<Vec<_>>();
        assert_eq!(distances, vec![5.0, 10.0, 15.0, 20.0, 25.0]);
        for split in &splits {
            assert!((split.pace - 12600.0 / 26.2).abs() < 1e-9, "{split:?}");
        }
    }

    #[test]
    fn negative_splits_start_slow() {
        let splits = planner(SplitStrategy::Negative).compute_splits(5.0);
        let average = 12600.0 / 26.2;
        assert!((splits[0].pace - average * 1.025).abs() < 1e-9);
        let expected_15 = average * 1.025 * 13.1 + average * 0.975 * 1.9;
        assert!((splits[2].pace - expected_15 / 15.0).abs() < 1e-9);
        assert!(splits[4].pace < splits[0].pace);
    }

    #[test]
    fn positive_splits_fade() {
        let splits = planner(SplitStrategy::Positive).compute_splits(5.0);
        assert!(splits[4].pace > splits[0].pace);
        let finish = planner(SplitStrategy::Positive).elapsed_at(26.2);
        // both halves have the same length, adjustments cancel out
        assert!((finish - 12600.0).abs() < 1e-6);
    }

    #[test]
    fn fallback_to_pace() {
        let planner = SplitPlanner::from_target_or_pace(None, 455.0, 26.2, SplitStrategy::Even);
        assert!((planner.average_pace() - 455.0).abs() < 1e-9);
        assert_eq!(planner.compute_splits(10.0).len(), 2);
        assert!(planner.compute_splits(0.0).is_empty());
        assert!(planner.compute_splits(-5.0).is_empty());
    }

    #[test]
    fn short_intervals_are_bounded() {
        let planner = planner(SplitStrategy::Even);
        assert!(planner.compute_splits(1e-9).is_empty());
        assert!(planner.compute_splits(0.09).is_empty());

        let splits = planner.compute_splits(MIN_SPLIT_INTERVAL_MILES);
        assert_eq!(splits.len(), 260);
        assert_eq!(splits.last().map(|split| split.distance), Some(26.0));
    }

    #[test]
    fn strategy_names() {
        assert_eq!("Negative".parse::<SplitStrategy>(), Ok(SplitStrategy::Negative));
        assert!("sideways".parse::<SplitStrategy>().is_err());
        assert_eq!(SplitStrategy::Positive.to_string(), "positive");
        assert_eq!(serde_json::to_string(&SplitStrategy::Even).unwrap(), "\"even\"");
    }
}
