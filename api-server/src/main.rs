// api-server/src/main.rs
use actix_web::{web, App, HttpServer};
use common::{setup_tracing, Config};
use std::sync::Arc;

use api_server::actors::account_actor::AccountActor;
use api_server::actors::content_actor::ContentActor;
use api_server::actors::keyed::Registry;
use api_server::actors::session_actor::SessionActor;
use api_server::api;
use api_server::auth::resolver::{KeyResolver, RpcKeyResolver};
use api_server::storage::{FileStorage, Storage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // Save address before moving config into web::Data
    let server_addr = config.api_server_addr.clone();

    tracing::info!(
        "Starting API Server on {} (wallet network: {})",
        server_addr,
        config.auth.network_id
    );

    // Durable per-key storage shared by all actor registries
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));

    let sessions = Registry::new({
        let storage = storage.clone();
        move |key| SessionActor::new(key, storage.clone())
    });
    let accounts = Registry::new({
        let storage = storage.clone();
        move |key| AccountActor::new(key, storage.clone())
    });
    let contents = Registry::new({
        let storage = storage.clone();
        move |key| ContentActor::new(key, storage.clone())
    });

    let resolver: Arc<dyn KeyResolver> = Arc::new(RpcKeyResolver::new(config.auth.rpc_url.clone()));

    // Create data references
    let config_data = web::Data::new(config);
    let resolver_data = web::Data::new(resolver);
    let sessions_data = web::Data::new(sessions);
    let accounts_data = web::Data::new(accounts);
    let contents_data = web::Data::new(contents);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(resolver_data.clone())
            .app_data(sessions_data.clone())
            .app_data(accounts_data.clone())
            .app_data(contents_data.clone())
            .configure(api::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}
