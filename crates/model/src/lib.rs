use std::fmt::Debug;

use schemars::JsonSchema;
use serde::Serialize;
pub use serde_with;
use utility::id::{HasId, Id};

pub mod marker;
pub mod pace;
pub mod path;
pub mod route;
pub mod session;
pub mod simulation;
pub mod splits;
pub mod zone;

pub const MARATHON_DISTANCE_MILES: f64 = 26.2;
pub const HALF_MARATHON_DISTANCE_MILES: f64 = 13.1;

pub trait ExampleData {
    fn example_data() -> Self;
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone + JsonSchema,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone + JsonSchema,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

impl<V> ExampleData for WithId<V>
where
    V: HasId + ExampleData,
    V::IdType: Serialize + Debug + Clone + JsonSchema + Default,
{
    fn example_data() -> Self {
        WithId::new(Id::new(V::IdType::default()), V::example_data())
    }
}
