use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Path, Query, State},
    http::{header, Method},
    response::IntoResponse,
    routing::{get, on, post},
    Extension, Router,
};
use chrono::Duration;
use gpx::import::ImportedRoute;
use model::{
    pace::{CurrentPace, FinishRange, PaceAnalysis, PacePreset, TargetPace},
    path::{GeoPoint, RoutePoint},
    route::{MarathonRoute, RouteCatalog, RouteSummary},
    splits::{
        PlannedSplit, SplitPlanner, SplitStrategy, DEFAULT_SPLIT_INTERVAL_MILES,
        MIN_SPLIT_INTERVAL_MILES,
    },
    zone::PaceZone,
    WithId,
};
use serde::{Deserialize, Serialize};
use utility::{
    id::Id,
    time::{parse_pace, parse_race_time},
};

use crate::{
    common::{
        route_not_found, HateoasResult, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    hateoas::{self, Linked},
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/routes{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(route_summaries))
        .route("/import", post(import_route))
        .route("/:id", get(route))
        .route("/:id/position", get(position))
        .route("/:id/gpx", get(route_gpx))
        .route("/:id/analysis", get(analysis))
        .route("/:id/splits", get(splits))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

fn find_route<'a>(
    catalog: &'a RouteCatalog,
    id: &str,
    uri: &str,
) -> RouteResult<&'a MarathonRoute> {
    catalog.get(&Id::new(id.to_owned())).ok_or_else(|| {
        RouteErrorResponse::not_found(&Method::GET, uri)
            .with_message(format!("There is no route '{id}'."))
    })
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>, uri: &str) -> RouteResult<T> {
    query.map(|Query(params)| params).map_err(|why| {
        log::warn!("Rejected query for {uri}: {why}");
        RouteErrorResponse::bad_request(why.body_text())
            .with_method(&Method::GET)
            .with_uri(uri)
    })
}

fn bad_query(reason: String, uri: &str) -> RouteErrorResponse {
    log::warn!("Rejected query for {uri}: {reason}");
    RouteErrorResponse::bad_request(reason)
        .with_method(&Method::GET)
        .with_uri(uri)
}

impl Linked for RouteSummary {
    fn links(&self) -> Vec<(&'static str, String)> {
        vec![
            ("self", resource!("/{}", self.id)),
            ("gpx", resource!("/{}/gpx", self.id)),
        ]
    }
}

impl Linked for WithId<MarathonRoute> {
    fn links(&self) -> Vec<(&'static str, String)> {
        let id = &self.id;
        vec![
            ("self", resource!("/{}", id)),
            ("position", resource!("/{}/position?distance=0", id)),
            ("gpx", resource!("/{}/gpx", id)),
            ("analysis", resource!("/{}/analysis", id)),
            ("splits", resource!("/{}/splits", id)),
            ("routes", resource!("")),
        ]
    }
}

async fn route_summaries(
    State(catalog): State<Arc<RouteCatalog>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<RouteSummary>>> {
    Ok(VecResponse::new(
        catalog
            .summaries()
            .into_iter()
            .map(|summary| hateoas::Response::linked(summary, base_url.clone()))
            .collect(),
    )
    .hateoas()
    .json())
}

async fn route(
    OriginalUri(original_uri): OriginalUri,
    State(catalog): State<Arc<RouteCatalog>>,
    Path(id): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<MarathonRoute>> {
    let route = find_route(&catalog, &id, original_uri.path())?;
    Ok(hateoas::Response::linked(WithId::new(Id::new(id), route.clone()), base_url).json())
}

#[derive(Deserialize)]
struct PositionQuery {
    distance: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionDto {
    distance: f64,
    total_distance: f64,
    /// Percent of the route covered, 0 to 100.
    progress: f64,
    location: Option<GeoPoint>,
    point: Option<RoutePoint>,
}

async fn position(
    OriginalUri(original_uri): OriginalUri,
    State(catalog): State<Arc<RouteCatalog>>,
    Path(id): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    query: Result<Query<PositionQuery>, QueryRejection>,
) -> HateoasResult<PositionDto> {
    let uri = original_uri.path();
    let route = find_route(&catalog, &id, uri)?;
    let PositionQuery { distance } = query_params(query, uri)?;

    let total_distance = route.path.total_distance();
    let progress = if total_distance > 0.0 {
        (distance / total_distance * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let dto = PositionDto {
        distance,
        total_distance,
        progress,
        location: route.path.location_at_distance(distance),
        point: route.path.point_at_distance(distance),
    };
    Ok(hateoas::Response::builder(dto, base_url)
        .link("route", resource!("/{}", id))
        .build()
        .json())
}

async fn route_gpx(
    OriginalUri(original_uri): OriginalUri,
    State(catalog): State<Arc<RouteCatalog>>,
    Path(id): Path<String>,
) -> RouteResult<impl IntoResponse> {
    let route = find_route(&catalog, &id, original_uri.path())?;
    let points = route
        .path
        .points()
        .iter()
        .map(|point| point.location)
        .collect::<Vec<_>>();
    Ok((
        [
            (header::CONTENT_TYPE, "application/gpx+xml".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{id}.gpx\""),
            ),
        ],
        gpx::export_gpx(&points, &route.name, &route.description),
    ))
}

#[derive(Deserialize)]
struct TargetQuery {
    /// Name of a pace preset, wins over `fast` and `slow`.
    preset: Option<String>,
    /// `M:SS` per mile
    fast: Option<String>,
    /// `M:SS` per mile
    slow: Option<String>,
}

impl TargetQuery {
    fn target(&self) -> Result<TargetPace, String> {
        if let Some(name) = &self.preset {
            return PacePreset::find(name)
                .map(|preset| preset.pace)
                .ok_or_else(|| format!("unknown pace preset '{name}'"));
        }
        let defaults = TargetPace::default();
        let pace = |value: &Option<String>, default: f64| match value {
            Some(value) => parse_pace(value)
                .ok_or_else(|| format!("'{value}' is not a pace, expected M:SS")),
            None => Ok(default),
        };
        let fast = pace(&self.fast, defaults.fast)?;
        let slow = pace(&self.slow, defaults.slow)?;
        TargetPace::new(fast, slow)
            .ok_or_else(|| "the fast pace must not be slower than the slow pace".to_owned())
    }
}

#[serde_with::skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisDto {
    target: TargetPace,
    current_pace: CurrentPace,
    zone: Option<PaceZone>,
    finish_range: FinishRange,
    analysis: Option<PaceAnalysis>,
}

async fn analysis(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        tracker_client,
        catalog,
    }): State<WebState>,
    Path(id): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    query: Result<Query<TargetQuery>, QueryRejection>,
) -> HateoasResult<AnalysisDto> {
    let uri = original_uri.path();
    let route = find_route(&catalog, &id, uri)?;
    let target = query_params(query, uri)?
        .target()
        .map_err(|why| bad_query(why, uri))?;

    let map_err = |why: tracker::RequestError| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_message("Could not analyse the recorded markers.")
            .with_uri(uri)
    };
    let finish_range = tracker_client
        .finish_range(&route.path, target)
        .await
        .map_err(map_err)?;
    let analysis = tracker_client
        .pace_analysis(&route.path, target)
        .await
        .map_err(map_err)?;

    let current_pace = finish_range.current_pace;
    let dto = AnalysisDto {
        target,
        current_pace,
        zone: PaceZone::zone_for(current_pace.pace_sec_per_mile),
        finish_range,
        analysis,
    };
    Ok(hateoas::Response::builder(dto, base_url)
        .link("route", resource!("/{}", id))
        .link("markers", crate::api::v1::markers::resource!(""))
        .build()
        .json())
}

#[derive(Deserialize)]
struct SplitsQuery {
    /// Finish time `H:MM:SS`, derived from the current pace when absent.
    target: Option<String>,
    strategy: Option<String>,
    interval: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SplitsDto {
    strategy: SplitStrategy,
    #[serde(with = "utility::serde::race_time")]
    target_time: Duration,
    average_pace: f64,
    interval: f64,
    splits: Vec<PlannedSplit>,
}

async fn splits(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        tracker_client,
        catalog,
    }): State<WebState>,
    Path(id): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    query: Result<Query<SplitsQuery>, QueryRejection>,
) -> HateoasResult<SplitsDto> {
    let uri = original_uri.path();
    let route = find_route(&catalog, &id, uri)?;
    let params = query_params(query, uri)?;

    let strategy = match &params.strategy {
        Some(strategy) => strategy
            .parse::<SplitStrategy>()
            .map_err(|why| bad_query(why.to_string(), uri))?,
        None => SplitStrategy::default(),
    };
    let target = match &params.target {
        Some(target) => Some(parse_race_time(target).ok_or_else(|| {
            bad_query(format!("'{target}' is not a finish time, expected H:MM:SS"), uri)
        })?),
        None => None,
    };
    let interval = params.interval.unwrap_or(DEFAULT_SPLIT_INTERVAL_MILES);
    if !(interval.is_finite() && interval >= MIN_SPLIT_INTERVAL_MILES) {
        return Err(bad_query(
            format!("interval must be at least {MIN_SPLIT_INTERVAL_MILES} miles, got {interval}"),
            uri,
        ));
    }

    let current_pace = tracker_client
        .finish_range(&route.path, TargetPace::default())
        .await
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(uri)
        })?
        .current_pace;
    let planner = SplitPlanner::from_target_or_pace(
        target,
        current_pace.pace_sec_per_mile,
        route.path.total_distance(),
        strategy,
    );

    let dto = SplitsDto {
        strategy: planner.strategy(),
        target_time: planner.target_total(),
        average_pace: planner.average_pace(),
        interval,
        splits: planner.compute_splits(interval),
    };
    Ok(hateoas::Response::builder(dto, base_url)
        .link("route", resource!("/{}", id))
        .build()
        .json())
}

async fn import_route(
    OriginalUri(original_uri): OriginalUri,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    document: String,
) -> HateoasResult<ImportedRoute> {
    let imported = gpx::import::import(&document).map_err(|why| {
        log::warn!("Rejected GPX upload: {why}");
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_message("The GPX document could not be imported.")
            .with_uri(original_uri.path())
    })?;
    Ok(hateoas::Response::builder(imported, base_url)
        .link("routes", resource!(""))
        .build()
        .json())
}
