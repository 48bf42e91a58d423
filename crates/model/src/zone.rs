use schemars::JsonSchema;
use serde::Serialize;

/// Static reference data, seconds per mile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaceZone {
    pub name: &'static str,
    pub min_pace_sec_per_mile: f64,
    pub max_pace_sec_per_mile: f64,
    pub description: &'static str,
}

impl PaceZone {
    pub fn zones() -> Vec<PaceZone> {
        vec![
            PaceZone {
                name: "Easy",
                min_pace_sec_per_mile: 510.0,
                max_pace_sec_per_mile: 570.0,
                description: "Comfortable, conversational pace",
            },
            PaceZone {
                name: "Target",
                min_pace_sec_per_mile: 420.0,
                max_pace_sec_per_mile: 490.0,
                description: "Goal marathon pace",
            },
            PaceZone {
                name: "Aggressive",
                min_pace_sec_per_mile: 390.0,
                max_pace_sec_per_mile: 420.0,
                description: "Fast, challenging pace",
            },
            PaceZone {
                name: "Elite",
                min_pace_sec_per_mile: 300.0,
                max_pace_sec_per_mile: 390.0,
                description: "Professional level pace",
            },
        ]
    }

    pub fn contains(&self, pace: f64) -> bool {
        (self.min_pace_sec_per_mile..=self.max_pace_sec_per_mile).contains(&pace)
    }

    /// First zone in list order containing `pace`. Zones share their edges,
    /// so 7:00 is a target pace, not an aggressive one.
    pub fn zone_for(pace: f64) -> Option<PaceZone> {
        Self::zones().into_iter().find(|zone| zone.contains(pace))
    }
}
