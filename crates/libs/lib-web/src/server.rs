//! # Server Setup
//!
//! Tracing initialization, route registration, and HTTP server startup.

// region: --- Imports
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lib_core::{config::{core_config, init_config}, Pipeline};
use lib_utils::{get_env_or, get_env_parse_or};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{log_requests, run_hooks, stamp_req, RequestStamp};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Hooks applied to every record write
    pub pipeline: Pipeline,
    /// Largest JSON body the hook middleware will buffer
    pub max_body_bytes: usize,
}
// endregion: --- AppState

// region: --- Server Configuration
/// Default body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3030")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
    /// Largest JSON body the hook middleware will buffer
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3030".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load from `BIND_ADDRESS`, `ALLOWED_ORIGINS` (comma separated) and
    /// `MAX_BODY_BYTES`, keeping defaults for anything unset.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let bind_address = get_env_or("BIND_ADDRESS", &defaults.bind_address);

        let allowed_origins = match lib_utils::get_env("ALLOWED_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        let max_body_bytes = get_env_parse_or("MAX_BODY_BYTES", defaults.max_body_bytes)
            .map_err(|_| "MAX_BODY_BYTES must be a positive integer".to_string())?;

        if max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be a positive integer".to_string());
        }

        Ok(Self {
            bind_address,
            allowed_origins,
            max_body_bytes,
        })
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Install the global tracing subscriber, level taken from `LOG_LEVEL`.
pub fn init_tracing() -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {
            tracing_subscriber::EnvFilter::new(&log_level)
        }
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    info!(" Log level: {}", log_level);
    Ok(())
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Tracing cannot be installed
/// - Hook configuration loading fails
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing()?;

    info!(" HOOK SERVER STARTING");

    info!("Loading hook configuration...");
    init_config().map_err(|e| anyhow::anyhow!(e))?;
    let hook_config = core_config();
    info!(
        updated_at = %hook_config.updated_at_field,
        created_at = %hook_config.created_at_field,
        stamp_created_at = hook_config.stamp_created_at,
        "Hook configuration loaded"
    );

    let state = AppState {
        pipeline: Pipeline::default_chain(hook_config),
        max_body_bytes: config.max_body_bytes,
    };
    info!(" Pipeline: {:?}", state.pipeline.names());

    let app = build_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(" Server stopped");
    Ok(())
}

/// Create the application router with all routes and middleware.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    use axum::http::{HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route("/api/records", post(handlers::records::create_record))
        .route(
            "/api/records/{id}",
            axum::routing::put(handlers::records::update_record)
                .patch(handlers::records::patch_record),
        )
        .route("/health", get(handlers::health))
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "Route not found") })
        // Record hooks run last, right before the handler
        .layer(from_fn_with_state(state.clone(), run_hooks))
        .layer(from_fn(log_requests))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                },
            ),
        )
        // Outermost so every inner layer sees the stamp
        .layer(from_fn(stamp_req))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!(" Shutdown signal received");
}

/// Log server information
fn log_server_info() {
    info!(" RECORDS:");
    info!("   • POST  /api/records");
    info!("   • PUT   /api/records/{{id}}");
    info!("   • PATCH /api/records/{{id}}");
    info!(" HEALTH:");
    info!("   • GET   /health");
}
// endregion: --- Server Setup
