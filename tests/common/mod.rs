#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use FundingInfra::error::{Error, Result};
use FundingInfra::exchange::{Exchange, HistoryMode};
use FundingInfra::types::funding_rate::{CurrentFundingRate, FundingRateRecord};
use FundingInfra::types::order_book::{BookLevel, OrderBookSnapshot};
use FundingInfra::types::symbol::Symbol;
use FundingInfra::types::timestamp::MS_PER_HOUR;

pub const NOW: i64 = 1_760_000_000_000;

/// Per-symbol behaviour of the in-memory venue.
#[derive(Clone, Debug)]
pub struct Market {
    pub level_volume: f64,
    pub current_rate: Option<f64>,
    pub history: Vec<FundingRateRecord>,
    pub fail_book: bool,
    pub fail_current: bool,
    pub fail_history: bool,
    pub panic_on_book: bool,
}

impl Market {
    /// Deep book, 8h payouts of `rate` over the whole week.
    pub fn liquid(rate: f64) -> Self {
        let history = (1..=21)
            .map(|i| FundingRateRecord::new(NOW - i * 8 * MS_PER_HOUR + MS_PER_HOUR, rate))
            .collect();

        Market {
            level_volume: 100.0,
            current_rate: Some(rate),
            history,
            fail_book: false,
            fail_current: false,
            fail_history: false,
            panic_on_book: false,
        }
    }

    pub fn thin(rate: f64) -> Self {
        Market { level_volume: 1.0, ..Market::liquid(rate) }
    }
}

/// Scripted exchange used by the pipeline tests. Order book calls sleep
/// briefly so concurrent symbols overlap.
pub struct ScriptedExchange {
    markets: HashMap<Symbol, Market>,
    listed: HashSet<Symbol>,
    book_delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl ScriptedExchange {
    pub fn new(markets: Vec<(&str, Market)>) -> Self {
        let markets: HashMap<Symbol, Market> = markets.into_iter()
            .map(|(symbol, market)| (Symbol::from(symbol), market))
            .collect();
        let listed = markets.keys().cloned().collect();

        ScriptedExchange {
            markets,
            listed,
            book_delay: Duration::from_millis(20),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak_book_calls(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn market(&self, symbol: &Symbol) -> Result<&Market> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.markets.get(symbol)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))
    }
}

#[async_trait]
impl Exchange for ScriptedExchange {
    fn id(&self) -> &'static str {
        "scripted"
    }

    fn rate_limit(&self) -> Duration {
        Duration::ZERO
    }

    fn history_mode(&self) -> HistoryMode {
        HistoryMode::Single
    }

    async fn list_perpetuals(&self) -> Result<HashSet<Symbol>> {
        Ok(self.listed.clone())
    }

    async fn fetch_order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBookSnapshot> {
        let market = self.market(symbol)?.clone();

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.book_delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if market.panic_on_book {
            panic!("order book decoder blew up for {}", symbol);
        }
        if market.fail_book {
            return Err(Error::Transport("connection reset".to_string()));
        }

        Ok(OrderBookSnapshot::new(
            vec![BookLevel::new(100.0, market.level_volume); depth],
            vec![BookLevel::new(100.5, market.level_volume); depth],
        ))
    }

    async fn fetch_current_funding_rate(&self, symbol: &Symbol) -> Result<CurrentFundingRate> {
        let market = self.market(symbol)?;
        if market.fail_current {
            return Err(Error::Timeout("current rate".to_string()));
        }

        Ok(CurrentFundingRate {
            rate: market.current_rate,
            next_payout_time: Some(NOW + MS_PER_HOUR),
        })
    }

    async fn fetch_funding_history(
        &self,
        symbol: &Symbol,
        since: Option<i64>,
        _limit: Option<usize>,
    ) -> Result<Vec<FundingRateRecord>> {
        let market = self.market(symbol)?;
        if market.fail_history {
            return Err(Error::Api { status: "429".to_string(), message: "Too Many Requests".to_string() });
        }

        let since = since.unwrap_or(i64::MIN);
        Ok(market.history.iter()
            .filter(|r| r.timestamp >= since)
            .cloned()
            .collect())
    }
}
