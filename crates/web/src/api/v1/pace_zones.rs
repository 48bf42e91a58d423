use std::sync::Arc;

use axum::{
    routing::{get, on},
    Extension, Router,
};
use model::{pace::PacePreset, zone::PaceZone};

use crate::{
    common::{route_not_found, HateoasResult, VecResponse, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::BaseUrl,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/pace-zones{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/", get(pace_zones))
        .route("/presets", get(pace_presets))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn pace_zones(
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<PaceZone>> {
    Ok(
        hateoas::Response::builder(VecResponse::new(PaceZone::zones()), base_url)
            .link("self", resource!(""))
            .link("presets", resource!("/presets"))
            .build()
            .json(),
    )
}

async fn pace_presets(
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<PacePreset>> {
    Ok(
        hateoas::Response::builder(VecResponse::new(PacePreset::presets()), base_url)
            .link("self", resource!("/presets"))
            .link("zones", resource!(""))
            .build()
            .json(),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{get_json, router};

    #[tokio::test]
    async fn zones_in_display_order() {
        let (status, body) = get_json(&router(), "/api/v1/pace-zones").await;
        assert_eq!(status, StatusCode::OK);
        let names = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|zone| zone["name"].as_str().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Easy", "Target", "Aggressive", "Elite"]);
        assert_eq!(body["data"][1]["minPaceSecPerMile"], 420.0);
    }

    #[tokio::test]
    async fn presets_carry_their_range() {
        let (_, body) = get_json(&router(), "/api/v1/pace-zones/presets").await;
        assert_eq!(body["totalItems"], 5);
        assert_eq!(body["data"][0]["name"], "Elite");
        assert_eq!(body["data"][0]["slow"], 330.0);
    }
}
