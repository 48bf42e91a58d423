use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use model::{
    marker::{Marker, NewMarker},
    WithId,
};
use tokio::sync::RwLock;
use utility::id::Id;

use crate::database::{Database, DatabaseError, MarkerRepo, Result};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    markers: Vec<WithId<Marker>>,
}

impl State {
    fn push(&mut self, marker: NewMarker) -> WithId<Marker> {
        self.next_id += 1;
        let marker = WithId::new(Id::new(self.next_id), marker.into_marker(Utc::now()));
        self.markers.push(marker.clone());
        marker
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<RwLock<State>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database for InMemoryDatabase {
    type Autocommit = InMemoryDatabase;

    fn auto(&self) -> Self::Autocommit {
        self.clone()
    }
}

#[async_trait]
impl MarkerRepo for InMemoryDatabase {
    async fn markers(&mut self) -> Result<Vec<WithId<Marker>>> {
        let mut markers = self.state.read().await.markers.clone();
        markers.sort_by(|a, b| {
            a.content
                .distance_km
                .total_cmp(&b.content.distance_km)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(markers)
    }

    async fn latest_marker(&mut self) -> Result<Option<WithId<Marker>>> {
        Ok(self
            .state
            .read()
            .await
            .markers
            .iter()
            .max_by(|a, b| {
                a.content
                    .created_at
                    .cmp(&b.content.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned())
    }

    async fn insert_marker(&mut self, marker: NewMarker) -> Result<WithId<Marker>> {
        marker
            .validate()
            .map_err(|why| DatabaseError::Other(Box::new(why)))?;
        Ok(self.state.write().await.push(marker))
    }

    async fn insert_marker_ahead(&mut self, marker: NewMarker) -> Result<WithId<Marker>> {
        marker
            .validate()
            .map_err(|why| DatabaseError::Other(Box::new(why)))?;
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .markers
            .iter()
            .filter(|existing| existing.content.race_time.is_some())
            .find(|existing| existing.content.distance_km >= marker.distance_km)
        {
            return Err(DatabaseError::Overtaken(Box::new(existing.clone())));
        }
        Ok(state.push(marker))
    }

    async fn delete_marker(&mut self, id: Id<Marker>) -> Result<WithId<Marker>> {
        let mut state = self.state.write().await;
        let index = state
            .markers
            .iter()
            .position(|marker| marker.id == id)
            .ok_or(DatabaseError::NotFound)?;
        Ok(state.markers.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_marker(name: &str, distance_km: f64) -> NewMarker {
        NewMarker {
            name: name.to_owned(),
            description: None,
            latitude: 44.95,
            longitude: -93.1,
            distance_km,
            race_time: Some(Duration::minutes(distance_km as i64 * 5)),
            note: None,
        }
    }

    #[tokio::test]
    async fn markers_are_listed_by_distance() {
        let mut db = InMemoryDatabase::new().auto();
        db.insert_marker(new_marker("10K", 10.0)).await.unwrap();
        db.insert_marker(new_marker("5K", 5.0)).await.unwrap();
        db.insert_marker(new_marker("15K", 15.0)).await.unwrap();

        let names = db
            .markers()
            .await
            .unwrap()
            .into_iter()
            .map(|marker| marker.content.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["5K", "10K", "15K"]);
    }

    #[tokio::test]
    async fn ids_increase_and_latest_wins_ties() {
        let db = InMemoryDatabase::new();
        let first = db.auto().insert_marker(new_marker("5K", 5.0)).await.unwrap();
        let second = db.auto().insert_marker(new_marker("10K", 10.0)).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(db.auto().latest_marker().await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let mut db = InMemoryDatabase::new().auto();
        let marker = db.insert_marker(new_marker("5K", 5.0)).await.unwrap();
        assert!(matches!(
            db.delete_marker(Id::new(999)).await,
            Err(DatabaseError::NotFound)
        ));
        assert_eq!(db.markers().await.unwrap().len(), 1);

        let removed = db.delete_marker(marker.id).await.unwrap();
        assert_eq!(removed.content.name, "5K");
        assert!(db.markers().await.unwrap().is_empty());
        assert!(db.latest_marker().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_placements_keep_markers_ahead() {
        let db = InMemoryDatabase::new();
        let placements = (0..8).map(|_| {
            let mut db = db.auto();
            tokio::spawn(async move { db.insert_marker_ahead(new_marker("10K", 10.0)).await })
        });
        let mut stored = 0;
        for placement in placements.collect::<Vec<_>>() {
            match placement.await.unwrap() {
                Ok(_) => stored += 1,
                Err(DatabaseError::Overtaken(existing)) => {
                    assert_eq!(existing.content.distance_km, 10.0)
                }
                Err(why) => panic!("unexpected error: {why}"),
            }
        }
        assert_eq!(stored, 1);

        let mut db = db.auto();
        assert!(db.insert_marker_ahead(new_marker("15K", 15.0)).await.is_ok());
        let mut untimed = new_marker("Bridge", 3.0);
        untimed.race_time = None;
        db.insert_marker(untimed).await.unwrap();
        assert!(db.insert_marker_ahead(new_marker("20K", 20.0)).await.is_ok());
        assert_eq!(db.markers().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn invalid_markers_are_not_stored() {
        let mut db = InMemoryDatabase::new().auto();
        assert!(db.insert_marker(new_marker("", 5.0)).await.is_err());
        assert!(db.markers().await.unwrap().is_empty());
    }
}
