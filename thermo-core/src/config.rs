use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fs, path::PathBuf};

use crate::{auth::TokenRegistry, model::DEFAULT_ZONE, source::SourceId};

pub const MODEL_PATH_ENV: &str = "THERMO_MODEL_PATH";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Where a `remote` forecast source sends its requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the JSON model artifact.
    pub model_path: Option<PathBuf>,

    /// Zone used when a request omits `zoneName`.
    #[serde(default = "default_zone")]
    pub default_zone: String,

    /// Optional default source id, "local" or "remote".
    pub default_source: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    /// Example TOML:
    /// [tokens]
    /// 9f2c... = "operador"
    #[serde(default)]
    pub tokens: HashMap<String, String>,

    pub remote: Option<RemoteConfig>,
}

fn default_zone() -> String {
    DEFAULT_ZONE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: None,
            default_zone: default_zone(),
            default_source: None,
            server: ServerConfig::default(),
            tokens: HashMap::new(),
            remote: None,
        }
    }
}

impl Config {
    /// Default source as a strongly-typed SourceId; `local` when unset.
    pub fn default_source_id(&self) -> Result<SourceId> {
        match self.default_source.as_deref() {
            Some(s) => SourceId::try_from(s),
            None => Ok(SourceId::Local),
        }
    }

    pub fn set_default_source(&mut self, id: SourceId) {
        self.default_source = Some(id.as_str().to_string());
    }

    /// Model path, with `THERMO_MODEL_PATH` taking precedence over the file.
    pub fn model_path(&self) -> Option<PathBuf> {
        env::var_os(MODEL_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| self.model_path.clone())
    }

    /// Apply `HOST` / `PORT` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{port}'"))?;
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "thermo", "thermo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Register (or replace) an API token for `username`.
    pub fn upsert_token(&mut self, token: String, username: String) {
        self.tokens.insert(token, username);
    }

    pub fn username_for_token(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.clone())
    }

    /// Point the remote source at a server. Makes `remote` the default if none was chosen.
    pub fn set_remote(&mut self, base_url: String, token: String) {
        self.remote = Some(RemoteConfig { base_url, token });

        if self.default_source.is_none() {
            self.set_default_source(SourceId::Remote);
        }
    }
}
