use std::collections::HashSet;
use std::time::Duration;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use crate::config::exchange::ExchangeConfig;
use crate::error::{Error, Result};
use crate::exchange::{http_client, Exchange, HistoryMode};
use crate::types::funding_rate::{CurrentFundingRate, FundingRateRecord};
use crate::types::order_book::{BookLevel, OrderBookSnapshot};
use crate::types::symbol::Symbol;
use crate::types::timestamp::MS_PER_HOUR;
use crate::utils::helper::{current_timestamp_ms, parse_decimal};

const SETTLEMENT_ASSET: &str = "USDC";

/// Hyperliquid `/info` endpoint. Perpetuals settle hourly and the funding
/// history for a week fits in a single response.
pub struct Hyperliquid {
    client: reqwest::Client,
    base_url: String,
    rate_limit: Duration,
}

impl Hyperliquid {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        Ok(Hyperliquid {
            client: http_client(config)?,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            rate_limit: Duration::from_millis(config.rate_limit_ms.unwrap_or(50)),
        })
    }

    pub fn unified_symbol(coin: &str) -> Symbol {
        Symbol::new(format!("{}/{}:{}", coin, SETTLEMENT_ASSET, SETTLEMENT_ASSET))
    }

    async fn info<T: DeserializeOwned>(&self, body: serde_json::Value) -> Result<T> {
        let response = self.client
            .post(format!("{}/info", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16().to_string(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Exchange for Hyperliquid {
    fn id(&self) -> &'static str {
        "hyperliquid"
    }

    fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    fn history_mode(&self) -> HistoryMode {
        HistoryMode::Single
    }

    async fn list_perpetuals(&self) -> Result<HashSet<Symbol>> {
        let meta: HyperMeta = self.info(json!({ "type": "meta" })).await?;

        let symbols: HashSet<Symbol> = meta.universe.iter()
            .filter(|asset| !asset.is_delisted)
            .map(|asset| Self::unified_symbol(&asset.name))
            .collect();

        tracing::info!("Hyperliquid lists {} perpetual contracts", symbols.len());
        Ok(symbols)
    }

    async fn fetch_order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBookSnapshot> {
        let book: HyperL2Book = self.info(json!({ "type": "l2Book", "coin": symbol.base() })).await?;

        let mut sides = book.levels.into_iter();
        let (bids, asks) = match (sides.next(), sides.next()) {
            (Some(bids), Some(asks)) => (bids, asks),
            _ => return Err(Error::DecodeError(format!("l2Book for {} is missing a side", symbol))),
        };

        let to_levels = |raw: Vec<HyperLevel>| -> Result<Vec<BookLevel>> {
            raw.into_iter()
                .take(depth)
                .map(|level| Ok(BookLevel::new(parse_decimal("px", &level.px)?, parse_decimal("sz", &level.sz)?)))
                .collect()
        };

        Ok(OrderBookSnapshot {
            bids: to_levels(bids)?,
            asks: to_levels(asks)?,
            timestamp: book.time,
        })
    }

    async fn fetch_current_funding_rate(&self, symbol: &Symbol) -> Result<CurrentFundingRate> {
        let (meta, contexts): (HyperMeta, Vec<HyperAssetContext>) =
            self.info(json!({ "type": "metaAndAssetCtxs" })).await?;

        let index = meta.universe.iter()
            .position(|asset| asset.name == symbol.base())
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))?;

        let rate = match contexts.get(index).and_then(|ctx| ctx.funding.as_deref()) {
            Some(funding) => Some(parse_decimal("funding", funding)?),
            None => None,
        };

        // Settlement happens on every top of the hour
        let now = current_timestamp_ms();
        let next_payout_time = now - now.rem_euclid(MS_PER_HOUR) + MS_PER_HOUR;

        Ok(CurrentFundingRate {
            rate,
            next_payout_time: Some(next_payout_time),
        })
    }

    async fn fetch_funding_history(
        &self,
        symbol: &Symbol,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<FundingRateRecord>> {
        let start_time = since.unwrap_or_else(|| current_timestamp_ms() - 168 * MS_PER_HOUR);
        let rows: Vec<HyperFundingRow> = self.info(json!({
            "type": "fundingHistory",
            "coin": symbol.base(),
            "startTime": start_time,
        })).await?;

        let mut records = rows.iter()
            .map(|row| Ok(FundingRateRecord::new(row.time, parse_decimal("fundingRate", &row.funding_rate)?)))
            .collect::<Result<Vec<_>>>()?;
        records.sort_by_key(|r| r.timestamp);
        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }
}

#[derive(Deserialize)]
struct HyperMeta {
    universe: Vec<HyperAsset>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HyperAsset {
    name: String,
    #[serde(default)]
    is_delisted: bool,
}

#[derive(Deserialize)]
struct HyperAssetContext {
    funding: Option<String>,
}

#[derive(Deserialize)]
struct HyperL2Book {
    levels: Vec<Vec<HyperLevel>>,
    time: Option<i64>,
}

#[derive(Deserialize)]
struct HyperLevel {
    px: String,
    sz: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HyperFundingRow {
    funding_rate: String,
    time: i64,
}
