use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;

use crate::{ErrorBody, ForecastPayload, ForecastResponse, auth::authorization_header};

use super::ForecastSource;

pub const FORECAST_PATH: &str = "/api/predict-temperature";

/// Asks a running `thermo serve` instance over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    token: String,
    http: Client,
}

impl RemoteSource {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url,
            token,
            http: Client::new(),
        }
    }

    pub fn forecast_url(&self) -> String {
        format!("{}{FORECAST_PATH}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ForecastSource for RemoteSource {
    async fn forecast(&self, payload: &ForecastPayload) -> Result<ForecastResponse> {
        let url = self.forecast_url();

        let res = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization_header(&self.token))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to send forecast request to {url}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Forecast request failed with status {}: {}",
                status,
                error_message(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse forecast response JSON")
    }
}

/// The server's `{"error": ..}` message, or the truncated raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let end = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_url_joins_without_double_slash() {
        let source = RemoteSource::new("http://localhost:8080/".into(), "KEY".into());
        assert_eq!(source.forecast_url(), "http://localhost:8080/api/predict-temperature");
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error": "model not available"}"#), "model not available");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn truncates_long_bodies_on_char_boundary() {
        let body = "ñ".repeat(150);
        let out = truncate_body(&body);

        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
