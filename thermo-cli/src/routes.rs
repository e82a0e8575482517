//! API route handlers

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thermo_core::{ErrorBody, ForecastError, ForecastPayload};

use crate::server::AppState;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

fn status_for(err: &ForecastError) -> StatusCode {
    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Liveness plus model status.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
        "model": {
            "loaded": state.service.is_ready(),
            "name": state.service.model_name(),
            "reason": state.service.unavailable_reason(),
        }
    }))
}

pub async fn verify_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.tokens.authenticate(authorization(&headers)) {
        Ok(user) => (StatusCode::OK, Json(json!({ "valid": true, "user": user }))).into_response(),
        Err(_) => (StatusCode::UNAUTHORIZED, Json(json!({ "valid": false }))).into_response(),
    }
}

/// Rejects requests without a known API token.
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state.tokens.authenticate(authorization(request.headers())) {
        Ok(user) => {
            tracing::debug!(user, path = %request.uri().path(), "authenticated request");
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %request.uri().path(), "rejected unauthenticated request");
            error_response(StatusCode::UNAUTHORIZED, err.to_string())
        }
    }
}

pub async fn predict_temperature(
    State(state): State<AppState>,
    payload: Result<Json<ForecastPayload>, JsonRejection>,
) -> Response {
    if !state.service.is_ready() {
        let err = ForecastError::ModelUnavailable;
        tracing::warn!(error = %err, "forecast request rejected");
        return error_response(status_for(&err), err.to_string());
    }

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.service.handle(&payload) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "forecast request failed");
            error_response(status_for(&err), err.to_string())
        }
    }
}
