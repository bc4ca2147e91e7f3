//! HTTP surface: one multipart forecast endpoint plus a liveness probe.
//! Everything past routing is delegated to the forecast pipeline; every
//! error is resolved into exactly one JSON response here.

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ForecastError;
use crate::forecast::{ForecastPipeline, ForecastResult, ModelInvoker};
use crate::subprocess::SubprocessManager;
use crate::upload::UploadStore;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

struct AppState {
    pipeline: ForecastPipeline,
}

/// Build the application router from configuration. Tests call this directly
/// with an isolated config; `serve` wraps it for production.
pub fn app(config: &Config) -> Result<Router> {
    let (program, leading_args) = config.model_program()?;

    let invoker = ModelInvoker::new(
        program,
        leading_args,
        config.model_timeout,
        config.max_concurrent_forecasts,
        SubprocessManager::production(),
    );
    let pipeline = ForecastPipeline::new(UploadStore::new(&config.upload_dir), invoker);
    let state = Arc::new(AppState { pipeline });

    Ok(Router::new()
        .route("/api/predict", post(predict))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer(config.cors_origin.as_deref()))
        .with_state(state))
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: Config) -> Result<()> {
    let router = app(&config)?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    info!("Forecast server listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST]),
        None => CorsLayer::permissive(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/predict`: accept one uploaded history file, run the forecast
/// pipeline, and return the model's JSON verbatim. Requests without a `file`
/// field are rejected before anything touches disk.
async fn predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ForecastResult>, ForecastError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Rejecting malformed multipart request: {}", e);
        ForecastError::NoFile
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read uploaded file: {}", e);
            ForecastError::NoFile
        })?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or(ForecastError::NoFile)?;
    if bytes.is_empty() {
        return Err(ForecastError::NoFile);
    }

    let result = state.pipeline.run(&filename, &bytes).await;
    if let Err(ref e) = result {
        warn!("Forecast request failed: {}", e);
    }

    result.map(Json)
}
