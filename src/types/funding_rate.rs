use serde::{Deserialize, Serialize};

/// One settled funding payment as reported by the exchange.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundingRateRecord {
    /// Milliseconds since epoch
    pub timestamp: i64,
    /// Fraction, not percent
    pub rate: f64,
}

impl FundingRateRecord {
    pub fn new(timestamp: i64, rate: f64) -> Self {
        FundingRateRecord { timestamp, rate }
    }

    pub fn rate_percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// The rate currently accruing for the next payout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentFundingRate {
    /// Fraction, absent when the exchange did not report one
    pub rate: Option<f64>,
    pub next_payout_time: Option<i64>,
}

impl CurrentFundingRate {
    pub fn rate_percent(&self) -> Option<f64> {
        self.rate.map(|r| r * 100.0)
    }
}
