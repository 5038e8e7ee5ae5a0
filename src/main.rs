use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

mod catalog;
mod duration;
mod error;
mod handlers;
mod middleware;
mod models;
mod resolver;
mod youtube_client;

// AppState holds the configured YouTube client. When the API key is absent
// the client stays None and every catalog request fails fast with the
// configuration error instead of reaching upstream.
pub struct AppState {
    pub youtube_client: Option<youtube_client::YouTubeClient>,
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging().expect("Failed to initialize logging");

    let youtube_client = match std::env::var("YOUTUBE_API_KEY").ok() {
        Some(api_key) if !api_key.is_empty() => {
            tracing::info!("Initializing YouTube Data API client...");
            Some(youtube_client::YouTubeClient::new(api_key))
        }
        _ => {
            tracing::warn!("YOUTUBE_API_KEY not found. Catalog requests will be rejected.");
            tracing::info!("To enable catalog fetching, set: YOUTUBE_API_KEY");
            None
        }
    };

    let shared_state = Arc::new(AppState { youtube_client });

    // Wildcard origin with a fixed allowed-header set; OPTIONS pre-flights
    // are answered by the CORS layer itself.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let app = Router::new()
        .merge(handlers::catalog::catalog_routes())
        .merge(handlers::captions::caption_routes())
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(cors)
        .layer(Extension(shared_state));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,channel_catalog=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,channel_catalog=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    // JSON logging for log aggregation, human-readable otherwise
    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Channel catalog service starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Build mode: {}",
        if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        }
    );

    Ok(())
}
