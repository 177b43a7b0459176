use std::collections::BTreeMap;
use std::path::Path;
use serde::Serialize;
use tokio::fs as async_fs;
use crate::config::SnapshotSource;
use crate::error::{Error, Result};
use crate::types::aggregate::AggregateRecord;
use crate::types::symbol::Symbol;

pub type SnapshotData = BTreeMap<Symbol, AggregateRecord>;

/// Snapshot Format
/// - **Serialization**: pretty-printed JSON object keyed by symbol
/// - **Ordering**: keys sorted, so equal result sets encode to equal bytes
/// - **Write**: temp file in the same directory, then rename over the target
pub fn encode_snapshot(results: &SnapshotData) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(results)
        .map_err(|e| Error::SerializationError(e.to_string()))
}

pub async fn write_snapshot(path: &Path, results: &SnapshotData) -> Result<()> {
    write_atomic(path, &encode_snapshot(results)?).await?;
    tracing::info!("Saved snapshot with {} symbols to {:?}", results.len(), path);
    Ok(())
}

/// Pretty JSON through the same tmp-then-rename path as snapshots.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)
        .map_err(|e| Error::SerializationError(e.to_string()))?;
    write_atomic(path, &data).await
}

/// Readers never observe a partially written file.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::SnapshotError(format!("{}: {}", parent.display(), e)))?;
    }

    let tmp = path.with_extension("json.tmp");
    async_fs::write(&tmp, data)
        .await
        .map_err(|e| Error::SnapshotError(format!("{}: {}", tmp.display(), e)))?;
    async_fs::rename(&tmp, path)
        .await
        .map_err(|e| Error::SnapshotError(format!("{}: {}", path.display(), e)))
}

pub async fn load_snapshot(path: &Path) -> Result<SnapshotData> {
    let data = async_fs::read(path).await?;
    serde_json::from_slice(&data)
        .map_err(|e| Error::SerializationError(format!("{}: {}", path.display(), e)))
}

/// Exchange name -> snapshot for every source. Unreadable snapshots become
/// empty exchanges so one broken file does not hide the others.
pub async fn load_snapshots(sources: &[SnapshotSource]) -> BTreeMap<String, SnapshotData> {
    let mut exchanges = BTreeMap::new();

    for source in sources {
        let data = match load_snapshot(Path::new(&source.path)).await {
            Ok(data) => {
                tracing::info!("{}: loaded {} records", source.exchange, data.len());
                data
            }
            Err(e) => {
                tracing::warn!("Snapshot for {} unavailable ({}): {}", source.exchange, source.path, e);
                SnapshotData::new()
            }
        };
        exchanges.insert(source.exchange.clone(), data);
    }

    exchanges
}
