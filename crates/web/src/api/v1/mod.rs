use std::sync::Arc;

use axum::{
    routing::{get, on},
    Extension, Router,
};
use serde::Serialize;

use crate::{
    common::{route_not_found, HateoasResult, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

mod markers;
mod pace_zones;
mod routes;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .nest_service("/markers", markers::routes(state.clone()))
        .nest_service("/routes", routes::routes(state.clone()))
        .nest_service("/pace-zones", pace_zones::routes(state.clone()))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Serialize)]
struct IndexDto {
    version: &'static str,
}

async fn index(Extension(base_url): Extension<Arc<BaseUrl>>) -> HateoasResult<IndexDto> {
    Ok(hateoas::Response::builder(IndexDto { version: "v1" }, base_url)
        .link("self", resource!("/"))
        .link("markers", markers::resource!(""))
        .link("routes", routes::resource!(""))
        .link("paceZones", pace_zones::resource!(""))
        .build()
        .json())
}
