use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::translate::{TranslateError, TranslateRequest, TranslateResponse};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))
        .route("/api/translate", post(translate))
}

/// Full application: routes, CORS, request tracing and state
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    Router::new()
        .merge(create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let store_healthy = tokio::time::timeout(
        state.config.store.timeout(),
        state.translator.store().health_check(),
    )
    .await
    .ok()
    .and_then(|r| r.ok())
    .unwrap_or(false);

    Json(json!({
        "status": "ok",
        "store": store_healthy,
        "cache": state.cache().stats(),
        "lookups": state.translator.stats(),
    }))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, AppError> {
    let request_id = Uuid::new_v4();
    handle_translate(state, payload)
        .instrument(info_span!("translate", %request_id))
        .await
}

async fn handle_translate(
    state: AppState,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, AppError> {
    let Json(request) = payload
        .map_err(|rejection| anyhow::anyhow!("Invalid request body: {}", rejection.body_text()))?;

    let text = request.text.unwrap_or_default();
    if text.is_empty() {
        return Err(TranslateError::EmptyInput.into());
    }

    let outcome = state.translator.translate(&text).await?;
    info!(
        "Translated {:?} -> {:?} (cached: {})",
        outcome.original, outcome.translation, outcome.from_cache
    );
    Ok(Json(outcome.into()))
}
