use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use thermo_core::{Config, ForecastService, TokenRegistry};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
    pub tokens: Arc<TokenRegistry>,
}

impl AppState {
    pub fn new(service: ForecastService, tokens: TokenRegistry) -> Self {
        Self {
            service: Arc::new(service),
            tokens: Arc::new(tokens),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/api/predict-temperature", post(routes::predict_temperature))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_token,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/verify-token", post(routes::verify_token))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the model once, then serve until the process is stopped.
pub async fn serve(config: &Config, model_path: Option<&Path>) -> Result<()> {
    let service = ForecastService::load(model_path)
        .with_default_zone(config.default_zone.clone());
    let tokens = config.token_registry();

    if tokens.is_empty() {
        tracing::warn!("no API tokens configured, every forecast request will be rejected");
    }

    let app = router(AppState::new(service, tokens));
    let addr = config.server_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("thermo v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
