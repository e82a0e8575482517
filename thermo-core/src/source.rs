use crate::{
    Config, ForecastPayload, ForecastResponse, ForecastService,
    source::{local::LocalSource, remote::RemoteSource},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod local;
pub mod remote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Local,
    Remote,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Local => "local",
            SourceId::Remote => "remote",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::Local, SourceId::Remote]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "local" => Ok(SourceId::Local),
            "remote" => Ok(SourceId::Remote),
            _ => Err(anyhow::anyhow!(
                "Unknown source '{value}'. Supported sources: local, remote."
            )),
        }
    }
}

/// Something that can answer a forecast request.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn forecast(&self, payload: &ForecastPayload) -> anyhow::Result<ForecastResponse>;
}

/// Construct a source from config and explicit SourceId.
pub fn source_from_config(id: SourceId, config: &Config) -> anyhow::Result<Box<dyn ForecastSource>> {
    let boxed: Box<dyn ForecastSource> = match id {
        SourceId::Local => {
            let path = config.model_path().ok_or_else(|| {
                anyhow::anyhow!(
                    "No model artifact configured for the local source.\n\
                     Hint: run `thermo configure --model <path>` or set THERMO_MODEL_PATH."
                )
            })?;
            let service = ForecastService::load(Some(path.as_path()))
                .with_default_zone(config.default_zone.clone());
            Box::new(LocalSource::new(Arc::new(service)))
        }
        SourceId::Remote => {
            let remote = config.remote.as_ref().ok_or_else(|| {
                anyhow::anyhow!(
                    "No server configured for the remote source.\n\
                     Hint: run `thermo configure --remote-url <url> --remote-token`."
                )
            })?;
            Box::new(RemoteSource::new(remote.base_url.clone(), remote.token.clone()))
        }
    };

    Ok(boxed)
}

/// Construct the default source from config, using `default_source` field.
pub fn default_source_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastSource>> {
    let id = config.default_source_id()?;
    source_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn source_id_as_str_roundtrip() {
        for id in SourceId::all() {
            let s = id.as_str();
            let parsed = SourceId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn source_id_is_case_insensitive() {
        assert_eq!(SourceId::try_from("REMOTE").unwrap(), SourceId::Remote);
    }

    #[test]
    fn unknown_source_error() {
        let err = SourceId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown source"));
    }

    #[test]
    fn remote_source_errors_when_not_configured() {
        let cfg = Config::default();
        let err = source_from_config(SourceId::Remote, &cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No server configured"));
        assert!(msg.contains("Hint: run `thermo configure"));
    }

    #[test]
    fn remote_source_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_remote("http://localhost:8080".into(), "KEY".into());

        let source = default_source_from_config(&cfg);
        assert!(source.is_ok());
    }
}
