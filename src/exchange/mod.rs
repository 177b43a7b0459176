pub mod kucoin;
pub mod hyperliquid;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use crate::config::exchange::{ExchangeConfig, ExchangeKind};
use crate::error::Result;
use crate::types::funding_rate::{CurrentFundingRate, FundingRateRecord};
use crate::types::order_book::OrderBookSnapshot;
use crate::types::symbol::Symbol;

pub use hyperliquid::Hyperliquid;
pub use kucoin::KucoinFutures;

/// How a venue serves funding history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// `since`/`limit` pages that must be walked with a cursor
    Paged,
    /// Whole look-back window in one response
    Single,
}

/// Capability object for one exchange. Every method is a single network
/// round trip bounded by the adapter's request timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Exchange: Send + Sync {
    fn id(&self) -> &'static str;

    /// Minimum spacing the venue advertises between public requests
    fn rate_limit(&self) -> Duration;

    fn history_mode(&self) -> HistoryMode;

    /// Currently tradable perpetual contracts
    async fn list_perpetuals(&self) -> Result<HashSet<Symbol>>;

    async fn fetch_order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBookSnapshot>;

    async fn fetch_current_funding_rate(&self, symbol: &Symbol) -> Result<CurrentFundingRate>;

    async fn fetch_funding_history(
        &self,
        symbol: &Symbol,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<FundingRateRecord>>;
}

pub fn build_exchange(config: &ExchangeConfig) -> Result<Arc<dyn Exchange>> {
    let exchange: Arc<dyn Exchange> = match config.kind {
        ExchangeKind::Kucoin => Arc::new(KucoinFutures::new(config)?),
        ExchangeKind::Hyperliquid => Arc::new(Hyperliquid::new(config)?),
    };

    tracing::info!("Using exchange adapter: {}", exchange.id());
    Ok(exchange)
}

pub(crate) fn http_client(config: &ExchangeConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?)
}
