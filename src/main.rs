use axum::{Router, http::HeaderValue, routing::get};
use billsplit::{
    BillsplitService,
    api::{handlers::api_routes, openapi::ApiDoc},
    config::CONFIG,
    infrastructure::{
        cache::in_memory::InMemoryCache, events::broadcast::BroadcastPublisher, storage::in_memory::InMemoryStorage,
    },
};
use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Logs every ledger event until the channel closes. Stands in for the push
/// transport, which lives outside this service.
fn spawn_event_logger(events: &BroadcastPublisher) {
    let mut receiver = events.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => debug!(event = event.name(), room = %event.room(), "ledger event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event logger lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level)))
        .init();
    info!(config = ?*CONFIG, "starting billsplit");

    let storage = InMemoryStorage::new();
    let cache = InMemoryCache::new();
    let events = BroadcastPublisher::new(CONFIG.event_channel_capacity);
    spawn_event_logger(&events);

    let service = Arc::new(
        BillsplitService::new(storage, cache, events, CONFIG.jwt_secret.clone())
            .with_summary_ttl(CONFIG.summary_cache_ttl),
    );

    let origins: Vec<HeaderValue> = CONFIG
        .frontend_urls
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let app = Router::new()
        // add / route with a simple health check
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
