use std::panic;
use std::process;
use std::sync::Arc;

use coedit_doc::clients::app_service_client::AppServiceClient;
use coedit_doc::config::Config;
use coedit_doc::db::memory::{MemoryDocStore, StaticDirectory};
use coedit_doc::db::pgstore::PgDocStore;
use coedit_doc::db::{DocStore, UserDirectory};
use coedit_doc::{build_app, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration first, the log filter depends on it
    let loaded = Config::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()))
        .init();

    info!("Starting server...");
    if let Err(e) = loaded {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
    }

    // Document store: Postgres when a URL is configured, memory otherwise
    let store: Arc<dyn DocStore> = match &config.db_url {
        Some(db_url) => {
            let pg = match PgDocStore::connect(db_url).await {
                Ok(pg) => pg,
                Err(e) => {
                    error!("Failed to initialize database: {}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = pg.migrate().await {
                error!("Failed to prepare database schema: {}", e);
                process::exit(1);
            }
            info!("Database initialized successfully");
            Arc::new(pg)
        }
        None => {
            warn!("No database URL configured - documents are kept in memory and lost on restart");
            Arc::new(MemoryDocStore::new())
        }
    };

    // Display names come from the user service; without one, users are shown by id
    let directory: Arc<dyn UserDirectory> = match (&config.app_service_url, config.require_jwt_secret()) {
        (Some(url), Ok(secret)) => {
            match AppServiceClient::new(url.clone(), secret.to_string(), config.service_name.clone()) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    error!("Failed to create user service client: {}", e);
                    process::exit(1);
                }
            }
        }
        _ => {
            warn!("No user service configured - users are shown by id");
            Arc::new(StaticDirectory::new())
        }
    };

    let address = config.server_address();
    let state = match AppState::new(config, store, directory) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Cannot start without a token secret: {}", e);
            process::exit(1);
        }
    };

    let app_routes = build_app(state);

    // Start the HTTP/API server
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", address));

    info!("🚀 Server running on http://{}", address);
    info!("📡 WebSocket available at ws://{}/ws", address);
    info!("📚 Swagger UI available at http://{}/swagger", address);

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}
