//! Core library for the `thermo` building-monitoring backend.
//!
//! This crate defines:
//! - Temperature forecasting over a fixed set of short horizons
//! - Feature engineering (calendar components, humidity, cyclical encodings)
//! - The model boundary and the JSON linear model artifact
//! - Configuration, API tokens and forecast sources (local, remote)
//!
//! It is used by `thermo-cli`, which also hosts the HTTP API.

pub mod auth;
pub mod config;
pub mod error;
pub mod features;
pub mod forecast;
pub mod humidity;
pub mod model;
pub mod predictor;
pub mod source;
pub mod time;

pub use auth::{AuthError, TokenRegistry};
pub use config::{Config, RemoteConfig, ServerConfig};
pub use error::{ForecastError, ModelLoadError};
pub use features::{Cyclical, FeatureRow, FeatureValue, MODEL_SCHEMA};
pub use forecast::{FORECAST_OFFSETS_MINUTES, ForecastService};
pub use humidity::{HUMIDITY_BY_HOUR, HumidityTable};
pub use model::{
    DEFAULT_ZONE, ErrorBody, ForecastPayload, ForecastRequest, ForecastResponse, ForecastResult,
    ForecastStatus,
};
pub use predictor::{LinearModel, TemperatureModel};
pub use source::{ForecastSource, SourceId};
