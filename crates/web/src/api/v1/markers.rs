use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, on, post},
    Extension, Json, Router,
};
use model::{
    marker::{Marker, NewMarker, RaceDistance},
    route::MarathonRoute,
    WithId,
};
use serde::{Deserialize, Serialize};
use utility::{id::Id, time::parse_race_time};

use crate::{
    common::{
        json_body, route_not_found, schema, HateoasResult, RouteErrorResponse, RouteResult,
        VecResponse, METHOD_FILTER_ALL,
    },
    hateoas::{self, Linked},
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/markers{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

/// Route markers are placed on when the request names none.
const DEFAULT_ROUTE_ID: &str = "nyc-marathon";

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(markers).post(create_marker))
        .route("/latest", get(latest_marker))
        .route("/schema", get(schema::<WithId<Marker>>))
        .route("/distances", get(race_distances))
        .route("/splits.csv", get(split_sheet))
        .route("/place", post(place_marker))
        .route("/:id", get(marker).delete(delete_marker))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

impl Linked for WithId<Marker> {
    fn links(&self) -> Vec<(&'static str, String)> {
        vec![
            ("self", resource!("/{}", self.id)),
            ("markers", resource!("")),
        ]
    }
}

fn marker_id(raw: &str, method: &Method, uri: &str) -> RouteResult<Id<Marker>> {
    raw.parse::<i64>().map(Id::new).map_err(|_| {
        RouteErrorResponse::bad_request(format!("'{raw}' is not a marker id"))
            .with_method(method)
            .with_uri(uri)
    })
}

async fn markers(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tracker_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Marker>>>> {
    let markers = tracker_client.markers().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_message("Could not query markers.")
            .with_uri(original_uri.path())
    })?;

    Ok(VecResponse::new(
        markers
            .into_iter()
            .map(|marker| hateoas::Response::linked(marker, base_url.clone()))
            .collect(),
    )
    .hateoas()
    .json())
}

async fn marker(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tracker_client, .. }): State<WebState>,
    Path(id): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Marker>> {
    let id = marker_id(&id, &Method::GET, original_uri.path())?;
    let marker = tracker_client.marker(id).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;
    Ok(hateoas::Response::linked(marker, base_url).json())
}

#[derive(Serialize)]
struct LatestMarkerDto {
    marker: Option<hateoas::Response<WithId<Marker>>>,
}

async fn latest_marker(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tracker_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<LatestMarkerDto> {
    let marker = tracker_client.latest_marker().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_message("Could not query the latest marker.")
            .with_uri(original_uri.path())
    })?;

    let dto = LatestMarkerDto {
        marker: marker.map(|marker| hateoas::Response::linked(marker, base_url.clone())),
    };
    Ok(hateoas::Response::builder(dto, base_url)
        .link("self", resource!("/latest"))
        .build()
        .json())
}

async fn create_marker(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tracker_client, .. }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    body: Result<Json<NewMarker>, JsonRejection>,
) -> RouteResult<impl IntoResponse> {
    let new_marker = json_body(body, &Method::POST, original_uri.path())?;
    let marker = tracker_client.create_marker(new_marker).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
    })?;
    Ok((StatusCode::CREATED, hateoas::Response::linked(marker, base_url).json()))
}

async fn delete_marker(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tracker_client, .. }): State<WebState>,
    Path(id): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Marker>> {
    let id = marker_id(&id, &Method::DELETE, original_uri.path())?;
    let marker = tracker_client.delete_marker(id).await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::DELETE)
            .with_uri(original_uri.path())
    })?;
    Ok(hateoas::Response::builder(marker, base_url)
        .link("markers", resource!(""))
        .build()
        .json())
}

async fn race_distances(
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<RaceDistance>> {
    Ok(
        hateoas::Response::builder(VecResponse::new(RaceDistance::presets()), base_url)
            .link("self", resource!("/distances"))
            .link("place", resource!("/place"))
            .build()
            .json(),
    )
}

async fn split_sheet(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { tracker_client, .. }): State<WebState>,
) -> RouteResult<impl IntoResponse> {
    let records = tracker_client.split_records().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;
    let sheet = split_sheet::export_splits(&records).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"splits.csv\""),
        ],
        sheet,
    ))
}

fn default_route_id() -> String {
    DEFAULT_ROUTE_ID.to_owned()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceMarkerDto {
    #[serde(default = "default_route_id")]
    route_id: String,
    /// Label of a standard race distance, e.g. `Half Marathon`.
    distance: String,
    /// `H:MM:SS`
    race_time: String,
    #[serde(default)]
    note: Option<String>,
}

async fn place_marker(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        tracker_client,
        catalog,
    }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    body: Result<Json<PlaceMarkerDto>, JsonRejection>,
) -> RouteResult<impl IntoResponse> {
    let uri = original_uri.path();
    let request = json_body(body, &Method::POST, uri)?;

    let race_time = parse_race_time(&request.race_time).ok_or_else(|| {
        log::warn!("Rejected race time '{}'.", request.race_time);
        RouteErrorResponse::bad_request(format!(
            "'{}' is not a race time, expected H:MM:SS",
            request.race_time
        ))
        .with_method(&Method::POST)
        .with_uri(uri)
    })?;

    let route = catalog
        .get(&Id::<MarathonRoute>::new(request.route_id.clone()))
        .ok_or_else(|| {
            RouteErrorResponse::not_found(&Method::POST, uri)
                .with_message(format!("There is no route '{}'.", request.route_id))
        })?;

    let marker = tracker_client
        .place_marker(&route.path, &request.distance, race_time, request.note)
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(uri)
        })?;
    Ok((StatusCode::CREATED, hateoas::Response::linked(marker, base_url).json()))
}
