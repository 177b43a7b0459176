use std::sync::Arc;
use serde::Serialize;
use crate::config::pipeline::PipelineConfig;
use crate::exchange::Exchange;
use crate::funding::liquidity_filter::LiquidityFilter;
use crate::funding::paginator::HistoryPaginator;
use crate::funding::period_aggregator::{AggregationMode, PeriodAggregator};
use crate::observability::metrics::{record_api_call, RECORDS_APPROXIMATED};
use crate::throttle::RateGovernor;
use crate::types::aggregate::AggregateRecord;
use crate::types::symbol::Symbol;
use crate::types::timestamp::LookbackWindows;
use crate::utils::helper::round_rate;

/// Why a symbol is missing from the result set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    OrderBookUnavailable { error: String },
    InsufficientLiquidity { ask_notional: f64, bid_notional: f64 },
    CurrentRateUnavailable { error: String },
    GateClosed,
    TaskFailed { error: String },
    /// Same symbol already recorded earlier in the run
    Duplicate,
}

impl ExclusionReason {
    pub fn label(&self) -> &'static str {
        match self {
            ExclusionReason::OrderBookUnavailable { .. } => "order_book_unavailable",
            ExclusionReason::InsufficientLiquidity { .. } => "insufficient_liquidity",
            ExclusionReason::CurrentRateUnavailable { .. } => "current_rate_unavailable",
            ExclusionReason::GateClosed => "gate_closed",
            ExclusionReason::TaskFailed { .. } => "task_failed",
            ExclusionReason::Duplicate => "duplicate",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SymbolOutcome {
    Included(AggregateRecord),
    Excluded(ExclusionReason),
}

impl SymbolOutcome {
    pub fn record(&self) -> Option<&AggregateRecord> {
        match self {
            SymbolOutcome::Included(record) => Some(record),
            SymbolOutcome::Excluded(_) => None,
        }
    }

    pub fn exclusion(&self) -> Option<&ExclusionReason> {
        match self {
            SymbolOutcome::Included(_) => None,
            SymbolOutcome::Excluded(reason) => Some(reason),
        }
    }
}

/// Runs one symbol through the engine.
///
/// Gating (order book + liquidity) → HistoryFetch (current rate, then the
/// 168h history) → Aggregating. Each exchange call first waits on the shared
/// governor. A failed order book, a thin book or a failed current-rate call
/// end the symbol there. A failed history walk does not: the record falls
/// back to the current-rate projection.
pub struct SymbolProcessor {
    exchange: Arc<dyn Exchange>,
    governor: Arc<RateGovernor>,
    filter: LiquidityFilter,
    paginator: HistoryPaginator,
    aggregator: PeriodAggregator,
    windows: LookbackWindows,
    order_book_depth: usize,
}

impl SymbolProcessor {
    pub fn new(
        exchange: Arc<dyn Exchange>,
        governor: Arc<RateGovernor>,
        config: &PipelineConfig,
        order_book_depth: usize,
        windows: LookbackWindows,
    ) -> Self {
        SymbolProcessor {
            exchange,
            governor,
            filter: LiquidityFilter::new(config.liquidity_threshold, config.liquidity_depth),
            paginator: HistoryPaginator::new(config.history_page_limit, config.max_history_pages),
            aggregator: PeriodAggregator::with_fallback_interval(windows, config.fallback_interval_hours),
            windows,
            order_book_depth: order_book_depth.max(config.liquidity_depth),
        }
    }

    pub async fn process(&self, symbol: &Symbol) -> SymbolOutcome {
        // Gating
        self.governor.wait().await;
        let book = self.exchange.fetch_order_book(symbol, self.order_book_depth).await;
        record_api_call("order_book", &book);
        let book = match book {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!("Order book fetch failed for {}: {}", symbol, e);
                return SymbolOutcome::Excluded(ExclusionReason::OrderBookUnavailable { error: e.to_string() });
            }
        };

        let liquidity = self.filter.assess(&book);
        if !liquidity.passed {
            tracing::debug!(
                "{} rejected by liquidity filter: ask={:.2}, bid={:.2}",
                symbol, liquidity.ask_notional, liquidity.bid_notional
            );
            return SymbolOutcome::Excluded(ExclusionReason::InsufficientLiquidity {
                ask_notional: liquidity.ask_notional,
                bid_notional: liquidity.bid_notional,
            });
        }

        // HistoryFetch
        self.governor.wait().await;
        let current = self.exchange.fetch_current_funding_rate(symbol).await;
        record_api_call("current_funding_rate", &current);
        let current = match current {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("Current funding rate fetch failed for {}: {}", symbol, e);
                return SymbolOutcome::Excluded(ExclusionReason::CurrentRateUnavailable { error: e.to_string() });
            }
        };

        let start = self.windows.start_of(self.windows.outer());
        let history = match self.paginator
            .collect(self.exchange.as_ref(), &self.governor, symbol, start, self.windows.now_ms)
            .await
        {
            Ok(history) => history.records,
            Err(e) => {
                tracing::warn!("Funding history unavailable for {}, projecting current rate: {}", symbol, e);
                Vec::new()
            }
        };

        // Aggregating
        let current_rate = current.rate_percent();
        let sums = self.aggregator.aggregate(&history, current_rate);
        let approximated = sums.mode == AggregationMode::Approximated;
        if approximated {
            RECORDS_APPROXIMATED.inc();
            tracing::info!(
                "{}: no payouts in the last 168h, projecting {:?}% over a {}h interval",
                symbol, current_rate, sums.interval_hours.unwrap_or_default()
            );
        }

        SymbolOutcome::Included(AggregateRecord {
            sum_24h: sums.sum_24h,
            sum_48h: sums.sum_48h,
            sum_168h: sums.sum_168h,
            current_rate: current_rate.map(round_rate),
            interval_hours: sums.interval_hours,
            next_payout_time: current.next_payout_time,
            ask_notional: liquidity.ask_notional,
            bid_notional: liquidity.bid_notional,
            approximated,
        })
    }
}
