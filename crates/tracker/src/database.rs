use std::{error, fmt, result};

use async_trait::async_trait;
use model::{
    marker::{Marker, NewMarker},
    WithId,
};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    /// A timed marker at the same distance or further already exists.
    Overtaken(Box<WithId<Marker>>),
    Other(Box<dyn error::Error + Send + Sync>),
}

impl error::Error for DatabaseError {}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatabaseError::NotFound => write!(f, "Entry not found."),
            DatabaseError::Overtaken(existing) => write!(
                f,
                "A marker at {:.1} miles or higher already exists.",
                existing.content.distance_miles()
            ),
            DatabaseError::Other(why) => write!(f, "Database error: {}", why),
        }
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Marker storage. A failed operation leaves the stored markers unchanged.
#[async_trait]
pub trait MarkerRepo {
    /// All markers, ascending by distance.
    async fn markers(&mut self) -> Result<Vec<WithId<Marker>>>;

    /// The most recently created marker, ties resolved by the higher id.
    async fn latest_marker(&mut self) -> Result<Option<WithId<Marker>>>;

    async fn insert_marker(&mut self, marker: NewMarker) -> Result<WithId<Marker>>;

    /// Inserts the marker only if no timed marker sits at its distance or
    /// further, checked and inserted atomically. `Overtaken` otherwise.
    async fn insert_marker_ahead(&mut self, marker: NewMarker) -> Result<WithId<Marker>>;

    /// Removes and returns the marker, `NotFound` for unknown ids.
    async fn delete_marker(&mut self, id: Id<Marker>) -> Result<WithId<Marker>>;
}

/// A marker database. Concurrent access works by cloning the database
/// object, every clone sees the same markers.
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Autocommit: MarkerRepo + Send;

    fn auto(&self) -> Self::Autocommit;
}
