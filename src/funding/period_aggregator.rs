use crate::config::pipeline::FALLBACK_INTERVAL_HOURS;
use crate::funding::interval_detector::detect_interval_hours;
use crate::types::funding_rate::FundingRateRecord;
use crate::types::timestamp::{LookbackWindows, Window};
use crate::utils::helper::round_rate;

/// Where the window sums came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregationMode {
    Historical,
    Approximated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PeriodSums {
    pub sum_24h: f64,
    pub sum_48h: f64,
    pub sum_168h: f64,
    pub interval_hours: Option<u32>,
    pub mode: AggregationMode,
    /// Payouts that fell inside each window, 24h/48h/168h
    pub contributing: [usize; 3],
}

impl PeriodSums {
    fn zero(mode: AggregationMode) -> Self {
        PeriodSums {
            sum_24h: 0.0,
            sum_48h: 0.0,
            sum_168h: 0.0,
            interval_hours: None,
            mode,
            contributing: [0; 3],
        }
    }

    fn add(&mut self, window: Window, value: f64) {
        match window {
            Window::H24 => self.sum_24h += value,
            Window::H48 => self.sum_48h += value,
            Window::H168 => self.sum_168h += value,
        }
    }

    fn round(mut self) -> Self {
        self.sum_24h = round_rate(self.sum_24h);
        self.sum_48h = round_rate(self.sum_48h);
        self.sum_168h = round_rate(self.sum_168h);
        self
    }
}

/// Sums funding payouts (in percent) over the 24h, 48h and 168h windows.
///
/// History that has at least one payout strictly inside the 168h window is
/// summed as is. Otherwise the current rate is projected over each window
/// assuming a payout every `fallback_interval_hours`.
pub struct PeriodAggregator {
    windows: LookbackWindows,
    fallback_interval_hours: u32,
}

impl PeriodAggregator {
    pub fn new(windows: LookbackWindows) -> Self {
        Self::with_fallback_interval(windows, FALLBACK_INTERVAL_HOURS)
    }

    pub fn with_fallback_interval(windows: LookbackWindows, fallback_interval_hours: u32) -> Self {
        PeriodAggregator {
            windows,
            fallback_interval_hours: fallback_interval_hours.max(1),
        }
    }

    /// `history` may be unsorted and may reach outside the windows.
    /// `current_rate_percent` is only used when falling back.
    pub fn aggregate(
        &self,
        history: &[FundingRateRecord],
        current_rate_percent: Option<f64>,
    ) -> PeriodSums {
        let mut in_range: Vec<FundingRateRecord> = history.iter()
            .filter(|r| self.windows.contains(self.windows.outer(), r.timestamp))
            .copied()
            .collect();

        if in_range.is_empty() {
            return self.approximate(current_rate_percent);
        }

        in_range.sort_by_key(|r| r.timestamp);
        self.sum_history(&in_range)
    }

    fn sum_history(&self, history: &[FundingRateRecord]) -> PeriodSums {
        let mut sums = PeriodSums::zero(AggregationMode::Historical);

        for record in history {
            for (slot, window) in Window::ALL.iter().enumerate() {
                if self.windows.contains(*window, record.timestamp) {
                    sums.add(*window, record.rate_percent());
                    sums.contributing[slot] += 1;
                }
            }
        }

        sums.interval_hours = detect_interval_hours(history);
        sums.round()
    }

    /// `rate × round(window / interval)` for each window; all zero without a
    /// current rate.
    pub fn approximate(&self, current_rate_percent: Option<f64>) -> PeriodSums {
        let mut sums = PeriodSums::zero(AggregationMode::Approximated);
        sums.interval_hours = Some(self.fallback_interval_hours);

        if let Some(rate) = current_rate_percent {
            for window in Window::ALL {
                let payouts = (window.hours() as f64 / self.fallback_interval_hours as f64).round();
                sums.add(window, rate * payouts);
            }
        }

        sums.round()
    }
}
