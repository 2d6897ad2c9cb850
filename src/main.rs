mod config;
mod core;
mod error;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::error::{JsonPayloadError, QueryPayloadError, ResponseError};
use actix_web::{http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::{MatchScorer, RideMatcher};
use routes::rides::AppState;
use services::{
    LogNotifier, Notifier, PostgresStore, RequestLifecycle, RideSearchEngine, SearchCache,
    WebhookNotifier,
};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for payload and query deserialization errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Ridepool matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL store (runs migrations on startup)
    let postgres = Arc::new(
        PostgresStore::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!("PostgreSQL store initialized");

    // Initialize the search cache
    let cache = Arc::new(SearchCache::new(settings.cache.capacity));

    info!(
        "Search cache initialized (capacity: {} entries)",
        settings.cache.capacity
    );

    // Initialize the matcher and search engine
    let matcher = RideMatcher::new(MatchScorer::default());
    let engine = Arc::new(RideSearchEngine::new(
        postgres.clone(),
        cache.clone(),
        matcher,
    ));

    // Initialize the lifecycle notifier
    let notifier: Arc<dyn Notifier> = match &settings.notifier.webhook_url {
        Some(url) => {
            info!("Lifecycle events go to webhook at {}", url);
            Arc::new(
                WebhookNotifier::new(url.clone(), settings.notifier.timeout_secs).unwrap_or_else(
                    |e| {
                        error!("Failed to build webhook client: {}", e);
                        panic!("Notifier error: {}", e);
                    },
                ),
            )
        }
        None => {
            info!("No webhook configured, lifecycle events go to the log");
            Arc::new(LogNotifier)
        }
    };

    let lifecycle = Arc::new(RequestLifecycle::new(
        postgres.clone(),
        postgres.clone(),
        notifier,
    ));

    // Build application state
    let app_state = AppState {
        engine,
        lifecycle,
        rides: postgres.clone(),
        profiles: postgres.clone(),
        cache,
        postgres,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
