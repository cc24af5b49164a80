use actix::Actor;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;
use std::sync::Arc;

mod config;
mod error;
mod game;
mod hub;
mod identity;
mod models;
mod routes;
mod storage;
mod websocket;

use config::Config;
use hub::Hub;
use identity::{AnonymousIdentity, HeaderIdentity, IdentityProvider};
use models::AppState;
use storage::MemoryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::parse();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_filter));

    let identity: Arc<dyn IdentityProvider> = if config.trust_identity_headers {
        info!("Trusting identity headers from the upstream proxy");
        Arc::new(HeaderIdentity)
    } else {
        Arc::new(AnonymousIdentity)
    };

    let hub = Hub::new(Arc::new(MemoryStore::new())).start();
    let app_state = web::Data::new(AppState { hub, identity });

    info!("Starting chess server at http://{}", config.bind);

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(|cfg| routes::configure_routes(cfg, &static_dir))
    })
    .bind(&config.bind)?
    .run()
    .await
}
