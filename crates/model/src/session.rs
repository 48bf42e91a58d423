use crate::{
    pace::{DistanceTimeSample, PaceProjector, TargetPace},
    path::{GeoPath, GeoPoint},
    simulation::{Simulation, SimulationEvent},
};

/// Everything a single runner's view holds: the route, recorded samples, the
/// target range and the playback state. Events produce a new session, the
/// previous one is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceSession {
    pub path: GeoPath,
    pub samples: Vec<DistanceTimeSample>,
    pub target_pace: TargetPace,
    pub simulation: Simulation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RouteDrawn(Vec<GeoPoint>),
    RouteImported(GeoPath),
    RouteCleared,
    SampleRecorded(DistanceTimeSample),
    TargetPaceChanged(TargetPace),
    Simulation(SimulationEvent),
}

impl RaceSession {
    pub fn new(path: GeoPath) -> Self {
        Self {
            simulation: Simulation::new(path.total_distance()),
            path,
            samples: Vec::new(),
            target_pace: TargetPace::default(),
        }
    }

    pub fn apply(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::RouteDrawn(points) => self.replace_route(GeoPath::from_coordinates(points)),
            SessionEvent::RouteImported(path) => self.replace_route(path),
            SessionEvent::RouteCleared => self.replace_route(GeoPath::empty()),
            SessionEvent::SampleRecorded(sample) => {
                let farthest = self
                    .samples
                    .iter()
                    .all(|recorded| sample.distance > recorded.distance);
                if !farthest || !(sample.distance >= 0.0) {
                    return self;
                }
                let mut samples = self.samples;
                samples.push(sample);
                Self { samples, ..self }
            }
            SessionEvent::TargetPaceChanged(target_pace) => Self {
                target_pace,
                ..self
            },
            SessionEvent::Simulation(event) => Self {
                simulation: self.simulation.apply(event),
                ..self
            },
        }
    }

    fn replace_route(self, path: GeoPath) -> Self {
        let simulation = Simulation {
            speed: self.simulation.speed,
            ..Simulation::new(path.total_distance())
        };
        Self {
            path,
            simulation,
            ..self
        }
    }

    pub fn runner_position(&self) -> Option<GeoPoint> {
        self.path.location_at_distance(self.simulation.distance)
    }

    pub fn projector(&self) -> PaceProjector<'_> {
        PaceProjector::for_route(&self.samples, self.target_pace, &self.path)
    }
}

impl Default for RaceSession {
    fn default() -> Self {
        Self::new(GeoPath::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn drawn() -> RaceSession {
        RaceSession::default().apply(SessionEvent::RouteDrawn(vec![
            GeoPoint::new(-93.26, 44.95),
            GeoPoint::new(-93.26, 44.95 + 1.0 / 60.0),
            GeoPoint::new(-93.26, 44.95 + 2.0 / 60.0),
        ]))
    }

    #[test]
    fn drawing_replaces_route_and_resets_playback() {
        let session = drawn()
            .apply(SessionEvent::Simulation(SimulationEvent::SetSpeed { speed: 4.0 }))
            .apply(SessionEvent::Simulation(SimulationEvent::Play))
            .apply(SessionEvent::Simulation(SimulationEvent::Tick { elapsed_ms: 500.0 }));
        assert!(session.simulation.distance > 0.0);

        let redrawn = session.apply(SessionEvent::RouteDrawn(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
        ]));
        assert_eq!(redrawn.path.len(), 2);
        assert_eq!(redrawn.simulation.distance, 0.0);
        assert!(!redrawn.simulation.playing);
        assert_eq!(redrawn.simulation.speed, 4.0);
        assert_eq!(redrawn.simulation.total_distance, redrawn.path.total_distance());
    }

    #[test]
    fn clearing_leaves_an_empty_route() {
        let session = drawn().apply(SessionEvent::RouteCleared);
        assert!(session.path.is_empty());
        assert_eq!(session.runner_position(), None);
        assert_eq!(session.simulation.total_distance, 0.0);
    }

    #[test]
    fn samples_must_move_forward() {
        let session = drawn()
            .apply(SessionEvent::SampleRecorded(DistanceTimeSample::new(1.0, Duration::minutes(7))))
            .apply(SessionEvent::SampleRecorded(DistanceTimeSample::new(0.5, Duration::minutes(4))))
            .apply(SessionEvent::SampleRecorded(DistanceTimeSample::new(1.0, Duration::minutes(8))))
            .apply(SessionEvent::SampleRecorded(DistanceTimeSample::new(2.0, Duration::minutes(15))));
        let distances = session.samples.iter().map(|s| s.distance).collect::<Vec<_>>();
        assert_eq!(distances, vec![1.0, 2.0]);
        assert_eq!(session.projector().current_pace().pace_sec_per_mile, 480.0);
    }

    #[test]
    fn runner_starts_at_the_first_point() {
        let session = drawn();
        assert_eq!(session.runner_position(), Some(GeoPoint::new(-93.26, 44.95)));
        let target = TargetPace::new(400.0, 410.0).unwrap();
        assert_eq!(session.apply(SessionEvent::TargetPaceChanged(target)).target_pace, target);
    }
}
