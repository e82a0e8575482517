use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the forecast service.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The model artifact did not load at startup. Every call fails with this
    /// until the process is restarted with a working artifact.
    #[error("model not available")]
    ModelUnavailable,

    #[error("{0}")]
    InvalidInput(String),

    #[error("prediction failed: {0}")]
    FeatureEngineering(String),

    #[error("prediction failed: {0}")]
    Inference(String),
}

impl ForecastError {
    /// HTTP status code the request layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            ForecastError::ModelUnavailable => 500,
            ForecastError::InvalidInput(_)
            | ForecastError::FeatureEngineering(_)
            | ForecastError::Inference(_) => 400,
        }
    }
}

/// Failures while reading a model artifact from disk.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model artifact schema mismatch: {0}")]
    Schema(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_model_is_a_server_error() {
        assert_eq!(ForecastError::ModelUnavailable.http_status(), 500);
        assert_eq!(ForecastError::ModelUnavailable.to_string(), "model not available");
    }

    #[test]
    fn request_failures_are_client_errors() {
        for err in [
            ForecastError::InvalidInput("timestamp field is required".into()),
            ForecastError::FeatureEngineering("bad hour".into()),
            ForecastError::Inference("unknown category".into()),
        ] {
            assert_eq!(err.http_status(), 400);
        }
    }
}
