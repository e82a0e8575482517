//! The regression model boundary.
//!
//! The forecast service only needs `predict(batch) -> temperatures`. The
//! shipped artifact format is a JSON linear model with one-hot categorical
//! offsets; anything else can be plugged in behind [`TemperatureModel`].

use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, ModelLoadError},
    features::{FeatureKind, FeatureRow, FeatureValue, MODEL_SCHEMA},
};

/// Pre-trained model, read-only once loaded.
pub trait TemperatureModel: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// One temperature per row, in row order.
    fn predict(&self, batch: &[FeatureRow]) -> Result<Vec<f64>, ForecastError>;
}

/// Linear regression artifact.
///
/// Example:
/// ```json
/// {
///   "name": "temp-linear-v1",
///   "intercept": 12.0,
///   "features": ["year", "day", "zone_name", "rh", "hour_sin", ...],
///   "coefficients": { "rh": 0.1, "hour_sin": -2.0, ... },
///   "categories": { "zone_name": { "Juegos": 0.5, "Oficina": -0.25 } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub name: String,
    pub intercept: f64,
    pub features: Vec<String>,
    #[serde(default)]
    pub coefficients: HashMap<String, f64>,
    #[serde(default)]
    pub categories: HashMap<String, HashMap<String, f64>>,
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let model: LinearModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Check the artifact against the feature schema the service produces.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        let expected: Vec<&str> = MODEL_SCHEMA.iter().map(|(name, _)| *name).collect();
        if self.features != expected {
            return Err(ModelLoadError::Schema(format!(
                "expected features {expected:?}, artifact declares {:?}",
                self.features
            )));
        }

        for (name, kind) in MODEL_SCHEMA {
            let present = match kind {
                FeatureKind::Numeric => self.coefficients.contains_key(name),
                FeatureKind::Categorical => self.categories.contains_key(name),
            };
            if !present {
                return Err(ModelLoadError::Schema(format!(
                    "no {kind:?} weights for feature '{name}'"
                )));
            }
        }

        Ok(())
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<f64, ForecastError> {
        let mut total = self.intercept;

        for (name, value) in row.model_features() {
            total += match value {
                FeatureValue::Numeric(x) => {
                    let coef = self.coefficients.get(name).ok_or_else(|| {
                        ForecastError::Inference(format!("no coefficient for feature '{name}'"))
                    })?;
                    coef * x
                }
                FeatureValue::Categorical(level) => self
                    .categories
                    .get(name)
                    .and_then(|levels| levels.get(level))
                    .copied()
                    .ok_or_else(|| {
                        ForecastError::Inference(format!(
                            "unknown category '{level}' for feature '{name}'"
                        ))
                    })?,
            };
        }

        Ok(total)
    }
}

impl TemperatureModel for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, batch: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
        batch.iter().map(|row| self.predict_row(row)).collect()
    }
}
