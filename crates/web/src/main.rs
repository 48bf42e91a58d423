use model::route::RouteCatalog;
use web::{start_web_server, WebConfig, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = WebConfig::from_env();
    let catalog = RouteCatalog::builtin();
    log::info!("Loaded {} example routes.", catalog.len());

    // web server
    if let Err(why) = start_web_server(WebState::new(catalog), config).await {
        log::error!("Web server stopped: {why}");
        std::process::exit(1);
    }
}
