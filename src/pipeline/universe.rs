use std::collections::HashSet;
use std::path::Path;
use tokio::fs as async_fs;
use crate::error::{Error, Result};
use crate::types::symbol::Symbol;

/// Read the discovered symbol list (a JSON array of strings).
///
/// Any failure here is fatal for the run: nothing has been spawned yet.
pub async fn load_universe(path: &Path) -> Result<Vec<Symbol>> {
    let data = async_fs::read(path)
        .await
        .map_err(|e| Error::UniverseError(format!("{}: {}", path.display(), e)))?;

    let symbols: Vec<Symbol> = serde_json::from_slice(&data)
        .map_err(|e| Error::UniverseError(format!("{}: {}", path.display(), e)))?;

    if symbols.is_empty() {
        return Err(Error::UniverseError(format!("{}: symbol list is empty", path.display())));
    }

    tracing::info!("Loaded {} symbols from {:?}", symbols.len(), path);
    Ok(symbols)
}

/// Persist a discovered universe, sorted for stable diffs.
pub async fn write_universe(path: &Path, symbols: &HashSet<Symbol>) -> Result<usize> {
    let mut sorted: Vec<&Symbol> = symbols.iter().collect();
    sorted.sort();

    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    let data = serde_json::to_vec_pretty(&sorted)?;
    async_fs::write(path, data).await?;

    tracing::info!("Saved {} symbols to {:?}", sorted.len(), path);
    Ok(sorted.len())
}

/// Keep symbols the venue currently trades.
///
/// An unknown `BASE/QUOTE` symbol gets one retry as `BASE/ALT:ALT` when an
/// alternate quote is configured. Everything else unknown is dropped with a
/// warning. Duplicates (including ones produced by re-quoting) are removed,
/// first occurrence kept.
pub fn validate_universe(
    requested: Vec<Symbol>,
    tradable: &HashSet<Symbol>,
    alternate_quote: Option<&str>,
) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();

    for symbol in requested {
        let resolved = if tradable.contains(&symbol) {
            Some(symbol.clone())
        } else {
            match alternate_quote.and_then(|alt| symbol.with_alternate_quote(alt)) {
                Some(converted) if tradable.contains(&converted) => {
                    tracing::info!("Symbol {} converted to {}", symbol, converted);
                    Some(converted)
                }
                Some(converted) => {
                    tracing::warn!("Skipping {}: not tradable (also tried {})", symbol, converted);
                    None
                }
                None => {
                    tracing::warn!("Skipping {}: not a tradable perpetual", symbol);
                    None
                }
            }
        };

        if let Some(symbol) = resolved {
            if seen.insert(symbol.clone()) {
                valid.push(symbol);
            }
        }
    }

    valid
}
