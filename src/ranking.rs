use std::cmp::Ordering;
use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::pipeline::snapshot::SnapshotData;
use crate::types::aggregate::AggregateRecord;
use crate::types::symbol::Symbol;
use crate::types::timestamp::Window;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedEntry {
    pub symbol: Symbol,
    #[serde(flatten)]
    pub record: AggregateRecord,
}

/// Highest accumulated funding per window, best first.
#[derive(Clone, Debug, Serialize)]
pub struct TopReport {
    pub top_by_24h: Vec<RankedEntry>,
    pub top_by_48h: Vec<RankedEntry>,
    pub top_by_168h: Vec<RankedEntry>,
}

impl TopReport {
    pub fn build(results: &SnapshotData, n: usize) -> Self {
        TopReport {
            top_by_24h: top_n(results, Window::H24, n),
            top_by_48h: top_n(results, Window::H48, n),
            top_by_168h: top_n(results, Window::H168, n),
        }
    }

    pub fn window(&self, window: Window) -> &[RankedEntry] {
        match window {
            Window::H24 => &self.top_by_24h,
            Window::H48 => &self.top_by_48h,
            Window::H168 => &self.top_by_168h,
        }
    }
}

/// Sort by the window's sum descending; equal sums by symbol so the order is
/// stable across runs.
pub fn top_n(results: &SnapshotData, window: Window, n: usize) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = results.iter()
        .map(|(symbol, record)| RankedEntry {
            symbol: symbol.clone(),
            record: record.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        descending(a.record.sum(window), b.record.sum(window))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    ranked.truncate(n);
    ranked
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// A ranked row tagged with the exchange whose snapshot it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GlobalEntry {
    pub exchange: String,
    pub symbol: Symbol,
    #[serde(flatten)]
    pub record: AggregateRecord,
}

/// Best symbols across every loaded exchange snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct GlobalTopReport {
    pub generated_at: String,
    /// Exchanges that contributed at least one record
    pub exchanges: Vec<String>,
    pub top_by_24h: Vec<GlobalEntry>,
    pub top_by_48h: Vec<GlobalEntry>,
    pub top_by_168h: Vec<GlobalEntry>,
}

impl GlobalTopReport {
    pub fn build(snapshots: &BTreeMap<String, SnapshotData>, n: usize, generated_at: DateTime<Utc>) -> Self {
        GlobalTopReport {
            generated_at: generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            exchanges: snapshots.iter()
                .filter(|(_, data)| !data.is_empty())
                .map(|(exchange, _)| exchange.clone())
                .collect(),
            top_by_24h: global_top_n(snapshots, Window::H24, n),
            top_by_48h: global_top_n(snapshots, Window::H48, n),
            top_by_168h: global_top_n(snapshots, Window::H168, n),
        }
    }

    pub fn window(&self, window: Window) -> &[GlobalEntry] {
        match window {
            Window::H24 => &self.top_by_24h,
            Window::H48 => &self.top_by_48h,
            Window::H168 => &self.top_by_168h,
        }
    }
}

/// Same ordering as [`top_n`] over the union of all snapshots. The same
/// symbol listed on two exchanges competes as two rows.
pub fn global_top_n(snapshots: &BTreeMap<String, SnapshotData>, window: Window, n: usize) -> Vec<GlobalEntry> {
    let mut ranked: Vec<GlobalEntry> = snapshots.iter()
        .flat_map(|(exchange, results)| {
            results.iter().map(move |(symbol, record)| GlobalEntry {
                exchange: exchange.clone(),
                symbol: symbol.clone(),
                record: record.clone(),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        descending(a.record.sum(window), b.record.sum(window))
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.exchange.cmp(&b.exchange))
    });
    ranked.truncate(n);
    ranked
}
