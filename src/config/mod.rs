use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::config::exchange::ExchangeKind;

pub mod exchange;
pub mod pipeline;
pub mod loader;

/// Every exchange gets its own universe, results and top files under
/// `data_dir`, named `{prefix}_{exchange key}.json`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: String,
    pub universe_prefix: String,
    pub results_prefix: String,
    pub top_prefix: String,
    pub top_n: usize,
}

impl OutputConfig {
    fn exchange_file(&self, prefix: &str, kind: ExchangeKind) -> PathBuf {
        Path::new(&self.data_dir).join(format!("{}_{}.json", prefix, kind.key()))
    }

    pub fn universe_path(&self, kind: ExchangeKind) -> PathBuf {
        self.exchange_file(&self.universe_prefix, kind)
    }

    pub fn results_path(&self, kind: ExchangeKind) -> PathBuf {
        self.exchange_file(&self.results_prefix, kind)
    }

    pub fn top_path(&self, kind: ExchangeKind) -> PathBuf {
        self.exchange_file(&self.top_prefix, kind)
    }

    /// Cross-exchange ranking, one file per invocation
    pub fn global_top_path(&self, at: DateTime<Utc>) -> PathBuf {
        Path::new(&self.data_dir).join(format!(
            "top{}_all_exchanges_global_{}.json",
            self.top_n,
            at.format("%Y%m%d_%H%M%S")
        ))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            data_dir: "data".to_string(),
            universe_prefix: "trade_pairs".to_string(),
            results_prefix: "funding_results".to_string(),
            top_prefix: "top_funding_results".to_string(),
            top_n: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Exchange display name -> snapshot path. Empty means every known
    /// exchange's results file under `output.data_dir`.
    pub snapshots: Vec<SnapshotSource>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SnapshotSource {
    pub exchange: String,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:5000".to_string(),
            snapshots: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}
