use std::collections::HashSet;
use std::time::Duration;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use crate::config::exchange::ExchangeConfig;
use crate::error::{Error, Result};
use crate::exchange::{http_client, Exchange, HistoryMode};
use crate::types::funding_rate::{CurrentFundingRate, FundingRateRecord};
use crate::types::order_book::{BookLevel, OrderBookSnapshot};
use crate::types::symbol::Symbol;
use crate::utils::helper::{current_timestamp_ms, parse_decimal};

const SUCCESS_CODE: &str = "200000";
const PERPETUAL_TYPE: &str = "FFWCSX";

/// KuCoin Futures public REST API. History is served in `from`/`to` ranges
/// of at most 100 rows, so it is walked with the paginator.
pub struct KucoinFutures {
    client: reqwest::Client,
    base_url: String,
    rate_limit: Duration,
    // Contract size per lot, learned from the contract listing
    multipliers: DashMap<String, f64>,
}

impl KucoinFutures {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        Ok(KucoinFutures {
            client: http_client(config)?,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            rate_limit: Duration::from_millis(config.rate_limit_ms.unwrap_or(200)),
            multipliers: DashMap::new(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16().to_string(),
                message: body,
            });
        }

        let envelope: KucoinEnvelope<T> = response.json().await?;
        if envelope.code != SUCCESS_CODE {
            return Err(Error::Api {
                status: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        envelope.data
            .ok_or_else(|| Error::DecodeError(format!("{}: response without data", path)))
    }

    fn multiplier(&self, symbol: &Symbol) -> f64 {
        match self.multipliers.get(symbol.as_str()) {
            Some(m) => *m,
            None => {
                tracing::debug!("No contract multiplier cached for {}, using 1", symbol);
                1.0
            }
        }
    }
}

#[async_trait]
impl Exchange for KucoinFutures {
    fn id(&self) -> &'static str {
        "kucoinfutures"
    }

    fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    fn history_mode(&self) -> HistoryMode {
        HistoryMode::Paged
    }

    async fn list_perpetuals(&self) -> Result<HashSet<Symbol>> {
        let contracts: Vec<KucoinContract> = self.get("/api/v1/contracts/active", &[]).await?;

        let mut symbols = HashSet::new();
        for contract in contracts {
            if contract.contract_type.as_deref() != Some(PERPETUAL_TYPE)
                || contract.status.as_deref() != Some("Open")
            {
                continue;
            }
            if let Some(multiplier) = contract.multiplier {
                self.multipliers.insert(contract.symbol.clone(), multiplier.abs());
            }
            symbols.insert(Symbol::new(contract.symbol));
        }

        tracing::info!("KuCoin lists {} open perpetual contracts", symbols.len());
        Ok(symbols)
    }

    async fn fetch_order_book(&self, symbol: &Symbol, depth: usize) -> Result<OrderBookSnapshot> {
        // Only 20 and 100 level snapshots are published
        let path = if depth <= 20 { "/api/v1/level2/depth20" } else { "/api/v1/level2/depth100" };
        let book: KucoinDepth = self.get(path, &[("symbol", symbol.to_string())]).await?;
        let multiplier = self.multiplier(symbol);

        let to_levels = |raw: Vec<[Decimal; 2]>| -> Result<Vec<BookLevel>> {
            raw.into_iter()
                .take(depth)
                .map(|[price, size]| {
                    Ok(BookLevel::new(price.value("price")?, size.value("size")? * multiplier))
                })
                .collect()
        };

        Ok(OrderBookSnapshot {
            bids: to_levels(book.bids)?,
            asks: to_levels(book.asks)?,
            timestamp: book.ts.map(|ns| ns / 1_000_000),
        })
    }

    async fn fetch_current_funding_rate(&self, symbol: &Symbol) -> Result<CurrentFundingRate> {
        let path = format!("/api/v1/funding-rate/{}/current", symbol);
        let current: KucoinCurrentFunding = self.get(&path, &[]).await?;

        let next_payout_time = match (current.time_point, current.granularity) {
            (Some(point), Some(granularity)) => Some(point + granularity),
            _ => None,
        };

        Ok(CurrentFundingRate {
            rate: current.value,
            next_payout_time,
        })
    }

    async fn fetch_funding_history(
        &self,
        symbol: &Symbol,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<FundingRateRecord>> {
        let to = current_timestamp_ms();
        let from = since.unwrap_or(to - 7 * 24 * 3_600_000);

        let rows: Vec<KucoinFundingRow> = self.get(
            "/api/v1/contract/funding-rates",
            &[
                ("symbol", symbol.to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ],
        ).await?;

        // Rows come newest first; the cursor needs the oldest page
        let mut records: Vec<FundingRateRecord> = rows.into_iter()
            .filter(|row| row.timepoint >= from)
            .map(|row| FundingRateRecord::new(row.timepoint, row.funding_rate))
            .collect();
        records.sort_by_key(|r| r.timestamp);
        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }
}

#[derive(Deserialize)]
struct KucoinEnvelope<T> {
    code: String,
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KucoinContract {
    symbol: String,
    #[serde(rename = "type")]
    contract_type: Option<String>,
    status: Option<String>,
    multiplier: Option<f64>,
}

#[derive(Deserialize)]
struct KucoinDepth {
    bids: Vec<[Decimal; 2]>,
    asks: Vec<[Decimal; 2]>,
    ts: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KucoinCurrentFunding {
    value: Option<f64>,
    time_point: Option<i64>,
    granularity: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KucoinFundingRow {
    funding_rate: f64,
    timepoint: i64,
}

/// Book values arrive as numbers on some endpoints and strings on others
#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

impl Decimal {
    fn value(&self, field: &str) -> Result<f64> {
        match self {
            Decimal::Number(v) => Ok(*v),
            Decimal::Text(s) => parse_decimal(field, s),
        }
    }
}
