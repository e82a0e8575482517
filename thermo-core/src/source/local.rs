use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::{ForecastPayload, ForecastResponse, ForecastService};

use super::ForecastSource;

/// Runs the model in-process.
#[derive(Debug, Clone)]
pub struct LocalSource {
    service: Arc<ForecastService>,
}

impl LocalSource {
    pub fn new(service: Arc<ForecastService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ForecastSource for LocalSource {
    async fn forecast(&self, payload: &ForecastPayload) -> Result<ForecastResponse> {
        // Four rows through a loaded model; no need to leave the runtime thread.
        Ok(self.service.handle(payload)?)
    }
}
