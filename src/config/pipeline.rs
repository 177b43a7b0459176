use serde::{Deserialize, Serialize};

/// Assumed payout cadence when no history is available. Most venues this
/// pipeline targets settle hourly.
pub const FALLBACK_INTERVAL_HOURS: u32 = 1;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub concurrency: usize,
    pub liquidity_threshold: f64,
    pub liquidity_depth: usize,
    pub history_page_limit: usize,
    pub max_history_pages: usize,
    pub min_request_interval_ms: u64,
    pub fallback_interval_hours: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            concurrency: 5,
            liquidity_threshold: 3000.0,  // notional per side
            liquidity_depth: 5,
            history_page_limit: 100,
            max_history_pages: 20,
            min_request_interval_ms: 100,
            fallback_interval_hours: FALLBACK_INTERVAL_HOURS,
        }
    }
}
