use std::{path::Path, sync::Arc};

use chrono::{Duration, NaiveDateTime};

use crate::{
    error::ForecastError,
    features::FeatureRow,
    humidity::{HUMIDITY_BY_HOUR, HumidityTable},
    model::{
        DEFAULT_ZONE, ForecastPayload, ForecastRequest, ForecastResponse, ForecastResult,
        ForecastStatus,
    },
    predictor::{LinearModel, TemperatureModel},
    time,
};

/// Horizons predicted for every request, in minutes from the base timestamp.
pub const FORECAST_OFFSETS_MINUTES: [i64; 4] = [20, 40, 60, 80];

#[derive(Debug, Clone)]
enum ModelState {
    Ready(Arc<dyn TemperatureModel>),
    Unavailable { reason: String },
}

/// Temperature forecaster built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ForecastService {
    model: ModelState,
    humidity: HumidityTable,
    default_zone: String,
}

impl ForecastService {
    pub fn with_model(model: Arc<dyn TemperatureModel>) -> Self {
        Self {
            model: ModelState::Ready(model),
            humidity: HUMIDITY_BY_HOUR,
            default_zone: DEFAULT_ZONE.to_string(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model: ModelState::Unavailable {
                reason: reason.into(),
            },
            humidity: HUMIDITY_BY_HOUR,
            default_zone: DEFAULT_ZONE.to_string(),
        }
    }

    /// Load the model artifact at `path`.
    ///
    /// Never fails: a missing or broken artifact yields a service that answers
    /// every call with [`ForecastError::ModelUnavailable`].
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::error!("no model path configured, forecasting disabled");
            return Self::unavailable("no model path configured");
        };

        match LinearModel::load(path) {
            Ok(model) => {
                tracing::info!(model = %model.name, path = %path.display(), "temperature model loaded");
                Self::with_model(Arc::new(model))
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to load temperature model");
                Self::unavailable(err.to_string())
            }
        }
    }

    pub fn with_default_zone(mut self, zone: impl Into<String>) -> Self {
        self.default_zone = zone.into();
        self
    }

    pub fn with_humidity_table(mut self, table: HumidityTable) -> Self {
        self.humidity = table;
        self
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    pub fn model_name(&self) -> Option<&str> {
        match &self.model {
            ModelState::Ready(model) => Some(model.name()),
            ModelState::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.model {
            ModelState::Ready(_) => None,
            ModelState::Unavailable { reason } => Some(reason),
        }
    }

    /// Entry point for the request layer: availability is checked before the payload.
    pub fn handle(&self, payload: &ForecastPayload) -> Result<ForecastResponse, ForecastError> {
        let model = self.model()?;
        let request = ForecastRequest::from_payload(payload, &self.default_zone)?;
        self.run(model, &request)
    }

    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse, ForecastError> {
        let model = self.model()?;
        self.run(model, request)
    }

    fn model(&self) -> Result<&dyn TemperatureModel, ForecastError> {
        match &self.model {
            ModelState::Ready(model) => Ok(model.as_ref()),
            ModelState::Unavailable { .. } => Err(ForecastError::ModelUnavailable),
        }
    }

    fn run(
        &self,
        model: &dyn TemperatureModel,
        request: &ForecastRequest,
    ) -> Result<ForecastResponse, ForecastError> {
        let rows = FORECAST_OFFSETS_MINUTES
            .iter()
            .map(|&minutes| {
                let at = offset(request.base_timestamp, minutes)?;
                FeatureRow::derive(at, &request.zone_name, &self.humidity)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            rows = rows.len(),
            zone = %request.zone_name,
            base = %request.base_timestamp,
            "running temperature model"
        );

        let predictions = model.predict(&rows)?;
        if predictions.len() != rows.len() {
            return Err(ForecastError::Inference(format!(
                "model returned {} predictions for {} rows",
                predictions.len(),
                rows.len()
            )));
        }

        let predictions = FORECAST_OFFSETS_MINUTES
            .iter()
            .zip(rows)
            .zip(predictions)
            .map(|((&minutes, row), temperature)| ForecastResult {
                offset_minutes: minutes,
                predicted_timestamp: row.timestamp,
                predicted_temperature: temperature,
                humidity_used: row.relative_humidity,
                interval_label: time::interval_label(minutes),
            })
            .collect();

        Ok(ForecastResponse {
            base_timestamp: request.raw_timestamp.clone(),
            zone_name: request.zone_name.clone(),
            predictions,
            status: ForecastStatus::Success,
        })
    }
}

fn offset(base: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime, ForecastError> {
    base.checked_add_signed(Duration::minutes(minutes))
        .ok_or_else(|| ForecastError::InvalidInput(format!("timestamp {base} out of range")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::predictor::tests::humidity_only_json;

    /// Returns fixed values regardless of input.
    #[derive(Debug)]
    struct StubModel(Vec<f64>);

    impl TemperatureModel for StubModel {
        fn name(&self) -> &str {
            "stub"
        }

        fn predict(&self, _batch: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct FailingModel;

    impl TemperatureModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        fn predict(&self, _batch: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
            Err(ForecastError::Inference("feature names mismatch".into()))
        }
    }

    fn stub_service() -> ForecastService {
        ForecastService::with_model(Arc::new(StubModel(vec![20.0, 20.5, 21.0, 21.5])))
    }

    fn payload(ts: &str, zone: Option<&str>) -> ForecastPayload {
        ForecastPayload::new(ts, zone.map(str::to_string))
    }

    #[test]
    fn end_to_end_with_stub_model() {
        let response = stub_service()
            .handle(&payload("2024-03-15T10:00:00", Some("Juegos")))
            .unwrap();

        assert_eq!(response.base_timestamp, "2024-03-15T10:00:00");
        assert_eq!(response.zone_name, "Juegos");
        assert_eq!(response.status, ForecastStatus::Success);

        let offsets: Vec<i64> = response.predictions.iter().map(|p| p.offset_minutes).collect();
        assert_eq!(offsets, vec![20, 40, 60, 80]);

        let stamps: Vec<String> = response
            .predictions
            .iter()
            .map(|p| time::format_timestamp(&p.predicted_timestamp))
            .collect();
        assert_eq!(
            stamps,
            vec![
                "2024-03-15T10:20:00",
                "2024-03-15T10:40:00",
                "2024-03-15T11:00:00",
                "2024-03-15T11:20:00",
            ]
        );

        let humidity: Vec<f64> = response.predictions.iter().map(|p| p.humidity_used).collect();
        assert_eq!(humidity, vec![26.0, 26.0, 28.0, 28.0]);

        let temps: Vec<f64> = response
            .predictions
            .iter()
            .map(|p| p.predicted_temperature)
            .collect();
        assert_eq!(temps, vec![20.0, 20.5, 21.0, 21.5]);

        let labels: Vec<&str> = response
            .predictions
            .iter()
            .map(|p| p.interval_label.as_str())
            .collect();
        assert_eq!(labels, vec!["20min", "40min", "1h 0min", "1h 20min"]);
    }

    #[test]
    fn forecast_takes_a_validated_request() {
        let request = ForecastRequest {
            raw_timestamp: "2024-03-15 10:00".into(),
            base_timestamp: time::parse_timestamp("2024-03-15 10:00").unwrap(),
            zone_name: "Oficina".into(),
        };

        let response = stub_service().forecast(&request).unwrap();

        assert_eq!(response.base_timestamp, "2024-03-15 10:00");
        assert_eq!(response.zone_name, "Oficina");
        assert_eq!(
            time::format_timestamp(&response.predictions[1].predicted_timestamp),
            "2024-03-15T10:40:00"
        );
        assert_eq!(response.predictions[3].predicted_temperature, 21.5);

        let err = ForecastService::unavailable("gone").forecast(&request).unwrap_err();
        assert!(matches!(err, ForecastError::ModelUnavailable));
    }

    #[test]
    fn uses_table_value_for_hour_17() {
        let response = stub_service().handle(&payload("2024-03-15T16:50:00", None)).unwrap();

        // +20 lands on 17:10
        assert_eq!(response.predictions[0].humidity_used, 40.0);
        assert_eq!(response.zone_name, DEFAULT_ZONE);
    }

    #[test]
    fn crossing_midnight_rolls_the_date() {
        let response = stub_service().handle(&payload("2024-12-31T23:30:00", None)).unwrap();

        let last = &response.predictions[3];
        assert_eq!(time::format_timestamp(&last.predicted_timestamp), "2025-01-01T00:50:00");
        assert_eq!(last.humidity_used, 25.0);
    }

    #[test]
    fn is_idempotent() {
        let service = stub_service();
        let p = payload("2024-03-15T10:00:00", Some("Juegos"));

        assert_eq!(service.handle(&p).unwrap(), service.handle(&p).unwrap());
    }

    #[test]
    fn missing_timestamp_is_invalid_input() {
        let err = stub_service().handle(&ForecastPayload::default()).unwrap_err();

        assert!(matches!(err, ForecastError::InvalidInput(_)));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn unparseable_timestamp_is_invalid_input() {
        let err = stub_service().handle(&payload("yesterday", None)).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn unavailable_model_wins_over_valid_input() {
        let service = ForecastService::unavailable("artifact missing");

        for p in [payload("2024-03-15T10:00:00", None), ForecastPayload::default()] {
            let err = service.handle(&p).unwrap_err();
            assert!(matches!(err, ForecastError::ModelUnavailable));
            assert_eq!(err.http_status(), 500);
            assert_eq!(err.to_string(), "model not available");
        }
        assert!(!service.is_ready());
        assert_eq!(service.unavailable_reason(), Some("artifact missing"));
    }

    #[test]
    fn model_errors_surface_as_inference_errors() {
        let service = ForecastService::with_model(Arc::new(FailingModel));
        let err = service.handle(&payload("2024-03-15T10:00:00", None)).unwrap_err();

        assert_eq!(err.http_status(), 400);
        assert!(err.to_string().contains("feature names mismatch"));
    }

    #[test]
    fn short_prediction_batch_is_rejected() {
        let service = ForecastService::with_model(Arc::new(StubModel(vec![20.0])));
        let err = service.handle(&payload("2024-03-15T10:00:00", None)).unwrap_err();

        assert!(matches!(err, ForecastError::Inference(_)));
    }

    #[test]
    fn partial_humidity_table_falls_back_to_mean() {
        const ONLY_MORNING: HumidityTable = HumidityTable::new(&[(10, 20.0), (9, 30.0)]);
        let service = stub_service().with_humidity_table(ONLY_MORNING);

        let response = service.handle(&payload("2024-03-15T10:00:00", None)).unwrap();
        let humidity: Vec<f64> = response.predictions.iter().map(|p| p.humidity_used).collect();
        assert_eq!(humidity, vec![20.0, 20.0, 25.0, 25.0]);
    }

    #[test]
    fn default_zone_is_configurable() {
        let service = stub_service().with_default_zone("Oficina");
        let response = service.handle(&payload("2024-03-15T10:00:00", None)).unwrap();

        assert_eq!(response.zone_name, "Oficina");
    }

    #[test]
    fn load_with_linear_artifact() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(humidity_only_json().as_bytes()).unwrap();

        let service = ForecastService::load(Some(file.path()));
        assert!(service.is_ready());
        assert_eq!(service.model_name(), Some("humidity-only"));

        let response = service.handle(&payload("2024-03-15T10:00:00", None)).unwrap();
        let temps: Vec<f64> = response
            .predictions
            .iter()
            .map(|p| p.predicted_temperature)
            .collect();
        assert_eq!(temps, vec![24.0, 24.0, 25.0, 25.0]);
    }

    #[test]
    fn load_failure_leaves_service_unavailable() {
        let service = ForecastService::load(Some(Path::new("/nonexistent/model.json")));
        assert!(!service.is_ready());

        let service = ForecastService::load(None);
        assert!(matches!(
            service.handle(&payload("2024-03-15T10:00:00", None)),
            Err(ForecastError::ModelUnavailable)
        ));
    }
}
