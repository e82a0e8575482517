use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{error::ForecastError, time};

/// Zone used when a request does not name one.
pub const DEFAULT_ZONE: &str = "Juegos";

/// Inbound JSON body as posted by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(rename = "zoneName", default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
}

impl ForecastPayload {
    pub fn new(timestamp: impl Into<String>, zone_name: Option<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            zone_name,
        }
    }
}

/// Validated forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Timestamp exactly as received, echoed back in the response.
    pub raw_timestamp: String,
    pub base_timestamp: NaiveDateTime,
    pub zone_name: String,
}

impl ForecastRequest {
    pub fn from_payload(payload: &ForecastPayload, default_zone: &str) -> Result<Self, ForecastError> {
        let raw = payload
            .timestamp
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ForecastError::InvalidInput("timestamp field is required".into()))?;

        Ok(Self {
            raw_timestamp: raw.to_string(),
            base_timestamp: time::parse_timestamp(raw)?,
            zone_name: payload
                .zone_name
                .clone()
                .unwrap_or_else(|| default_zone.to_string()),
        })
    }
}

/// Prediction for a single horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    #[serde(rename = "minutos_desde_base")]
    pub offset_minutes: i64,

    #[serde(rename = "timestamp_prediccion", with = "time::iso_seconds")]
    pub predicted_timestamp: NaiveDateTime,

    #[serde(rename = "temperatura_predicha")]
    pub predicted_temperature: f64,

    #[serde(rename = "rh_utilizado")]
    pub humidity_used: f64,

    #[serde(rename = "intervalo")]
    pub interval_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStatus {
    Success,
}

/// Outbound JSON body, predictions ordered by increasing offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(rename = "timestamp_base")]
    pub base_timestamp: String,

    #[serde(rename = "zoneName")]
    pub zone_name: String,

    #[serde(rename = "predicciones")]
    pub predictions: Vec<ForecastResult>,

    pub status: ForecastStatus,
}

/// Error body returned in place of a [`ForecastResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
