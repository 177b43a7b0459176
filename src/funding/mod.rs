pub mod liquidity_filter;
pub mod interval_detector;
pub mod period_aggregator;
pub mod paginator;
pub mod processor;

pub use liquidity_filter::{LiquidityAssessment, LiquidityFilter};
pub use interval_detector::detect_interval_hours;
pub use period_aggregator::{AggregationMode, PeriodAggregator, PeriodSums};
pub use paginator::{CollectedHistory, HistoryPaginator};
pub use processor::{ExclusionReason, SymbolOutcome, SymbolProcessor};
