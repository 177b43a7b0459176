use serde::{Deserialize, Serialize};
use crate::types::timestamp::Window;

/// Per-symbol output of one pipeline run.
///
/// Field names are the snapshot's wire format and are read by the ranking
/// and query layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    #[serde(rename = "sum24h")]
    pub sum_24h: f64,
    #[serde(rename = "sum48h")]
    pub sum_48h: f64,
    #[serde(rename = "sum168h")]
    pub sum_168h: f64,
    #[serde(rename = "currentRate")]
    pub current_rate: Option<f64>,
    #[serde(rename = "intervalHours")]
    pub interval_hours: Option<u32>,
    #[serde(rename = "nextPayoutTime")]
    pub next_payout_time: Option<i64>,
    #[serde(rename = "askNotional")]
    pub ask_notional: f64,
    #[serde(rename = "bidNotional")]
    pub bid_notional: f64,
    /// Sums were projected from the current rate instead of summed history
    #[serde(default)]
    pub approximated: bool,
}

impl AggregateRecord {
    pub fn sum(&self, window: Window) -> f64 {
        match window {
            Window::H24 => self.sum_24h,
            Window::H48 => self.sum_48h,
            Window::H168 => self.sum_168h,
        }
    }
}
