//! A simulated runner moving along a route.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{HALF_MARATHON_DISTANCE_MILES, MARATHON_DISTANCE_MILES};

/// Simulated miles per real second at 1x speed.
pub const MILES_PER_SECOND: f64 = 0.6;
pub const SPEED_PRESETS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];
pub const JUMP_MILES: f64 = 1.0;
pub const MILESTONES: [f64; 5] = [5.0, 10.0, HALF_MARATHON_DISTANCE_MILES, 20.0, MARATHON_DISTANCE_MILES];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub distance: f64,
    pub total_distance: f64,
    pub playing: bool,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimulationEvent {
    Play,
    Pause,
    Toggle,
    JumpForward,
    JumpBackward,
    Reset,
    Seek { distance: f64 },
    SetSpeed { speed: f64 },
    #[serde(rename_all = "camelCase")]
    Tick { elapsed_ms: f64 },
}

impl Simulation {
    pub fn new(total_distance: f64) -> Self {
        Self {
            distance: 0.0,
            total_distance: total_distance.max(0.0),
            playing: false,
            speed: 1.0,
        }
    }

    fn clamp(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            return self.distance;
        }
        distance.clamp(0.0, self.total_distance)
    }

    pub fn is_finished(&self) -> bool {
        self.distance >= self.total_distance
    }

    /// Share of the route covered, 0 to 100.
    pub fn progress(&self) -> f64 {
        if self.total_distance > 0.0 {
            (self.distance / self.total_distance * 100.0).min(100.0)
        } else {
            0.0
        }
    }

    pub fn next_milestone(&self) -> f64 {
        MILESTONES
            .into_iter()
            .find(|milestone| *milestone > self.distance)
            .unwrap_or(MARATHON_DISTANCE_MILES)
    }

    /// Integrates one frame of `elapsed_ms` real time. Reaching the end of
    /// the route stops playback.
    pub fn advance(self, elapsed_ms: f64, speed_multiplier: f64) -> Self {
        if !self.playing || !(elapsed_ms > 0.0) || !(speed_multiplier > 0.0) {
            return self;
        }
        let distance = self.clamp(self.distance + MILES_PER_SECOND * speed_multiplier * elapsed_ms / 1000.0);
        Self {
            distance,
            playing: distance < self.total_distance,
            ..self
        }
    }

    pub fn apply(self, event: SimulationEvent) -> Self {
        match event {
            SimulationEvent::Play if self.total_distance > 0.0 && !self.is_finished() => Self {
                playing: true,
                ..self
            },
            SimulationEvent::Play => self,
            SimulationEvent::Pause => Self {
                playing: false,
                ..self
            },
            SimulationEvent::Toggle if self.playing => self.apply(SimulationEvent::Pause),
            SimulationEvent::Toggle => self.apply(SimulationEvent::Play),
            SimulationEvent::JumpForward => Self {
                distance: self.clamp(self.distance + JUMP_MILES),
                ..self
            },
            SimulationEvent::JumpBackward => Self {
                distance: self.clamp(self.distance - JUMP_MILES),
                ..self
            },
            SimulationEvent::Reset => Self {
                distance: 0.0,
                playing: false,
                ..self
            },
            SimulationEvent::Seek { distance } => Self {
                distance: self.clamp(distance),
                ..self
            },
            SimulationEvent::SetSpeed { speed } if speed.is_finite() && speed > 0.0 => Self {
                speed,
                ..self
            },
            SimulationEvent::SetSpeed { .. } => self,
            SimulationEvent::Tick { elapsed_ms } => self.advance(elapsed_ms, self.speed),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(MARATHON_DISTANCE_MILES)
    }
}
