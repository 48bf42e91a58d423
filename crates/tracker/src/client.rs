use chrono::Duration;
use model::{
    marker::{samples_of, Marker, NewMarker, RaceDistance},
    pace::{DistanceTimeSample, FinishRange, PaceAnalysis, PaceProjector, SplitRecord, TargetPace},
    path::GeoPath,
    WithId,
};
use utility::{id::Id, let_also::LetAlso};

use crate::{
    database::{Database, DatabaseError, MarkerRepo},
    not_found_to_none, RequestError, RequestResult,
};

#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub async fn markers(&self) -> RequestResult<Vec<WithId<Marker>>> {
        Ok(self.database.auto().markers().await?)
    }

    pub async fn latest_marker(&self) -> RequestResult<Option<WithId<Marker>>> {
        Ok(self.database.auto().latest_marker().await?)
    }

    pub async fn marker(&self, id: Id<Marker>) -> RequestResult<WithId<Marker>> {
        self.markers()
            .await?
            .into_iter()
            .find(|marker| marker.id == id)
            .ok_or(RequestError::NotFound)
    }

    pub async fn create_marker(&self, marker: NewMarker) -> RequestResult<WithId<Marker>> {
        if let Err(why) = marker.validate() {
            log::warn!("Rejected marker '{}': {}", marker.name, why);
            return Err(why.into());
        }
        let marker = self.database.auto().insert_marker(marker).await?;
        log::info!(
            "Created marker {} '{}' at {} km.",
            marker.id,
            marker.content.name,
            marker.content.distance_km
        );
        Ok(marker)
    }

    pub async fn delete_marker(&self, id: Id<Marker>) -> RequestResult<WithId<Marker>> {
        let marker = self.database.auto().delete_marker(id).await?;
        log::info!("Deleted marker {} '{}'.", marker.id, marker.content.name);
        Ok(marker)
    }

    pub async fn try_delete_marker(&self, id: Id<Marker>) -> RequestResult<Option<WithId<Marker>>> {
        not_found_to_none(self.delete_marker(id).await)
    }

    /// Samples of all timed markers, ordered by distance in miles.
    pub async fn samples(&self) -> RequestResult<Vec<DistanceTimeSample>> {
        self.markers().await?.let_ref(|markers| Ok(samples_of(markers)))
    }

    pub async fn split_records(&self) -> RequestResult<Vec<SplitRecord>> {
        Ok(SplitRecord::from_samples(&self.samples().await?))
    }

    pub async fn pace_analysis(
        &self,
        path: &GeoPath,
        target: TargetPace,
    ) -> RequestResult<Option<PaceAnalysis>> {
        let samples = self.samples().await?;
        Ok(PaceProjector::for_route(&samples, target, path).analysis())
    }

    pub async fn finish_range(&self, path: &GeoPath, target: TargetPace) -> RequestResult<FinishRange> {
        let samples = self.samples().await?;
        Ok(PaceProjector::for_route(&samples, target, path).finish_range())
    }

    /// Places a timed marker at a standard race distance along `path`.
    ///
    /// Markers only move forward: a timed marker at this distance or further
    /// rejects the new one.
    pub async fn place_marker(
        &self,
        path: &GeoPath,
        label: &str,
        race_time: Duration,
        note: Option<String>,
    ) -> RequestResult<WithId<Marker>> {
        let distance = RaceDistance::find(label)
            .ok_or_else(|| RequestError::invalid_input(format!("unknown race distance '{label}'")))?;

        let location = path
            .location_at_distance(distance.miles)
            .ok_or_else(|| RequestError::invalid_input("route coordinates not available"))?;

        let note = note.filter(|note| !note.trim().is_empty());
        let marker = NewMarker {
            name: distance.label.to_owned(),
            description: Some(
                note.clone()
                    .unwrap_or_else(|| distance.default_description(&race_time)),
            ),
            latitude: location.latitude,
            longitude: location.longitude,
            distance_km: distance.km,
            race_time: Some(race_time),
            note,
        };
        marker.validate()?;
        match self.database.auto().insert_marker_ahead(marker).await {
            Ok(marker) => {
                log::info!("Placed marker {} at {}.", marker.id, distance.label);
                Ok(marker)
            }
            Err(DatabaseError::Overtaken(existing)) => {
                log::warn!(
                    "Refused marker at {}, already recorded {:.1} miles.",
                    distance.label,
                    existing.content.distance_miles()
                );
                Err(RequestError::invalid_input(format!(
                    "cannot add marker at {}, a marker at {:.1} miles or higher already exists",
                    distance.label,
                    existing.content.distance_miles()
                )))
            }
            Err(why) => Err(why.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;
    use model::{pace::PaceTrend, route::RouteCatalog};

    fn nyc() -> GeoPath {
        RouteCatalog::builtin()
            .get(&Id::new("nyc-marathon".to_owned()))
            .map(|route| route.path.clone())
            .unwrap()
    }

    fn client() -> Client<InMemoryDatabase> {
        Client::new(InMemoryDatabase::new())
    }

    #[tokio::test]
    async fn placed_markers_sit_on_the_route() {
        let client = client();
        let path = nyc();
        let marker = client
            .place_marker(&path, "10K", Duration::seconds(2610), None)
            .await
            .unwrap();

        let expected = path.location_at_distance(6.21).unwrap();
        assert_eq!(marker.content.latitude, expected.latitude);
        assert_eq!(marker.content.longitude, expected.longitude);
        assert_eq!(marker.content.distance_km, 10.0);
        assert_eq!(
            marker.content.description.as_deref(),
            Some("Race marker at 10K (10K) - Time: 0:43:30")
        );
    }

    #[tokio::test]
    async fn markers_only_move_forward() {
        let client = client();
        let path = nyc();
        client
            .place_marker(&path, "10K", Duration::seconds(2610), None)
            .await
            .unwrap();

        let earlier = client.place_marker(&path, "5K", Duration::seconds(1300), None).await;
        assert!(matches!(earlier, Err(RequestError::InvalidInput(_))));
        let again = client.place_marker(&path, "10K", Duration::seconds(2700), None).await;
        assert!(matches!(again, Err(RequestError::InvalidInput(_))));
        assert_eq!(client.markers().await.unwrap().len(), 1);

        let both = tokio::join!(
            client.place_marker(&path, "15K", Duration::seconds(3915), Some("hot".to_owned())),
            client.place_marker(&path, "15K", Duration::seconds(3920), None),
        );
        assert_eq!(usize::from(both.0.is_ok()) + usize::from(both.1.is_ok()), 1);
        assert_eq!(client.samples().await.unwrap().len(), 2);

        client
            .place_marker(&path, "20K", Duration::seconds(5220), None)
            .await
            .unwrap();
        assert_eq!(client.samples().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn placing_needs_a_route_and_a_known_distance() {
        let client = client();
        let empty = client
            .place_marker(&GeoPath::empty(), "5K", Duration::minutes(25), None)
            .await;
        assert!(matches!(empty, Err(RequestError::InvalidInput(_))));

        let unknown = client.place_marker(&nyc(), "50K", Duration::minutes(25), None).await;
        assert!(matches!(unknown, Err(RequestError::InvalidInput(_))));
        assert!(client.latest_marker().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn analysis_from_stored_markers() {
        let client = client();
        let path = nyc();
        assert!(client
            .pace_analysis(&path, TargetPace::default())
            .await
            .unwrap()
            .is_none());

        client
            .place_marker(&path, "10K", Duration::seconds(2610), None)
            .await
            .unwrap();
        client
            .place_marker(&path, "20K", Duration::seconds(5220), None)
            .await
            .unwrap();

        let analysis = client
            .pace_analysis(&path, TargetPace::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.splits.len(), 2);

        let range = client.finish_range(&path, TargetPace::default()).await.unwrap();
        assert!(range.fast < range.slow);
        // 2610 s per 6.21371 mi, about 7:00 per mile
        assert_eq!(range.current_pace.trend, PaceTrend::Faster);
    }

    #[tokio::test]
    async fn invalid_markers_are_rejected() {
        let client = client();
        let mut marker = NewMarker {
            name: "Bridge".to_owned(),
            description: None,
            latitude: 44.95,
            longitude: -93.1,
            distance_km: 3.0,
            race_time: None,
            note: None,
        };
        marker.longitude = 200.0;
        assert!(matches!(
            client.create_marker(marker).await,
            Err(RequestError::InvalidInput(_))
        ));
        assert!(matches!(
            client.delete_marker(Id::new(1)).await,
            Err(RequestError::NotFound)
        ));
        assert!(matches!(client.marker(Id::new(1)).await, Err(RequestError::NotFound)));
        assert!(client.try_delete_marker(Id::new(1)).await.unwrap().is_none());
    }
}
