pub use crate::common::RouteResult;

use std::{env, path::PathBuf, sync::Arc};

use axum::{extract::FromRef, routing::get_service, Router};
use model::route::RouteCatalog;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracker::{client::Client, memory::InMemoryDatabase};

pub mod api;
pub mod common;
pub mod hateoas;
pub mod middleware;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_STATIC_DIR: &str = "./resources/www/";

#[derive(Clone, FromRef)]
pub struct WebState {
    pub tracker_client: Client<InMemoryDatabase>,
    pub catalog: Arc<RouteCatalog>,
}

impl WebState {
    pub fn new(catalog: RouteCatalog) -> Self {
        Self {
            tracker_client: Client::new(InMemoryDatabase::new()),
            catalog: Arc::new(catalog),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub bind_address: String,
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl WebConfig {
    /// Reads `WEB_BIND_ADDRESS` and `WEB_STATIC_DIR`, unset or empty
    /// variables keep their defaults.
    pub fn from_env() -> Self {
        let var = |key: &str| env::var(key).ok().filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Self {
            bind_address: var("WEB_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            static_dir: var("WEB_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }
}

pub fn app(state: WebState, config: &WebConfig) -> Router {
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(static_content_router(config))
}

pub async fn start_web_server(state: WebState, config: WebConfig) -> std::io::Result<()> {
    let routes = app(state, &config);

    let listener = TcpListener::bind(&config.bind_address).await?;
    log::info!(
        "Serving on {} with static files from '{}'.",
        config.bind_address,
        config.static_dir.display()
    );
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

fn static_content_router(config: &WebConfig) -> Router {
    Router::new().nest_service(
        "/",
        get_service(
            ServeDir::new(&config.static_dir)
                .not_found_service(ServeFile::new(config.static_dir.join("error404.html"))),
        ),
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use test_support::{get_json, router, send};

    #[tokio::test]
    async fn ping_pongs() {
        let (status, body) = get_json(&router(), "/api/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "pong!");
        assert_eq!(body["routes"], 2);
    }

    #[tokio::test]
    async fn v1_index_links_resources() {
        let (status, body) = get_json(&router(), "/api/v1").await;
        assert_eq!(status, StatusCode::OK);
        let relations = body["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|link| link["rel"].as_str().unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(relations, vec!["self", "markers", "routes", "paceZones"]);
    }

    #[tokio::test]
    async fn unknown_api_routes_are_json_not_found() {
        let (status, body) = get_json(&router(), "/api/v1/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["httpMethod"], "GET");
        assert_eq!(body["requestedUri"], "/api/v1/nothing-here");
    }

    #[tokio::test]
    async fn missing_static_files_are_not_found() {
        let (status, _) = send(&router(), Method::GET, "/no-such-page.html", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn config_defaults() {
        let config = WebConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.static_dir, PathBuf::from("./resources/www/"));
    }
}
