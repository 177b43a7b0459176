use crate::config::exchange::{ExchangeConfig, ExchangeKind};
use crate::config::pipeline::PipelineConfig;
use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from("config", env)
    }

    pub fn load_from(dir: &str, env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(Environment::with_prefix("FUNDINGINFRA").separator("__").try_parsing(true))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Snapshots the API and the global ranking read. Unless listed
    /// explicitly these are the files `run` writes for each exchange.
    pub fn snapshot_sources(&self) -> Vec<SnapshotSource> {
        if !self.server.snapshots.is_empty() {
            return self.server.snapshots.clone();
        }

        ExchangeKind::ALL.into_iter()
            .map(|kind| SnapshotSource {
                exchange: kind.display_name().to_string(),
                path: self.output.results_path(kind).to_string_lossy().into_owned(),
            })
            .collect()
    }
}
