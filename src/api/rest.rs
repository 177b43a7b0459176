use std::collections::BTreeMap;
use std::sync::Arc;
use axum::{
    Router,
    routing::get,
    extract::{Path, State, Json},
    http::StatusCode,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use crate::config::SnapshotSource;
use crate::observability::metrics::gather_metrics;
use crate::pipeline::snapshot::{load_snapshots, SnapshotData};

/// Read-only view over the latest snapshot of each exchange, loaded once at
/// startup.
pub struct ApiState {
    pub exchanges: BTreeMap<String, SnapshotData>,
}

impl ApiState {
    pub async fn load(sources: &[SnapshotSource]) -> Self {
        ApiState { exchanges: load_snapshots(sources).await }
    }
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/exchanges", get(list_exchanges))
        .route("/api/search/:coin", get(search_coin))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    loaded_exchanges: usize,
}

async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        loaded_exchanges: state.exchanges.len(),
    })
}

#[derive(Serialize)]
struct ExchangesResponse {
    exchanges: Vec<String>,
    total_exchanges: usize,
}

async fn list_exchanges(State(state): State<Arc<ApiState>>) -> Json<ExchangesResponse> {
    Json(ExchangesResponse {
        exchanges: state.exchanges.keys().cloned().collect(),
        total_exchanges: state.exchanges.len(),
    })
}

#[derive(Serialize)]
struct SearchResponse {
    coin: String,
    results: BTreeMap<String, SnapshotData>,
    total_matches: usize,
}

async fn search_coin(
    State(state): State<Arc<ApiState>>,
    Path(coin): Path<String>,
) -> Result<Json<SearchResponse>, StatusCode> {
    let needle = coin.trim().to_uppercase();
    if needle.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Case-insensitive substring match on the pair name
    let mut results = BTreeMap::new();
    for (exchange, data) in &state.exchanges {
        let matches: SnapshotData = data.iter()
            .filter(|(symbol, _)| symbol.as_str().to_uppercase().contains(&needle))
            .map(|(symbol, record)| (symbol.clone(), record.clone()))
            .collect();

        if !matches.is_empty() {
            results.insert(exchange.clone(), matches);
        }
    }

    let total_matches = results.values().map(|m| m.len()).sum();
    Ok(Json(SearchResponse {
        coin,
        results,
        total_matches,
    }))
}

async fn metrics() -> String {
    gather_metrics()
}
