use std::collections::BTreeMap;
use crate::error::Result;
use crate::exchange::{Exchange, HistoryMode};
use crate::observability::metrics::{record_api_call, HISTORY_PAGES, PAGINATION_CAP_HITS};
use crate::throttle::RateGovernor;
use crate::types::funding_rate::FundingRateRecord;
use crate::types::symbol::Symbol;

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const DEFAULT_MAX_PAGES: usize = 20;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectedHistory {
    /// Deduplicated by timestamp, oldest first
    pub records: Vec<FundingRateRecord>,
    pub pages: usize,
    /// Stopped by the page cap rather than by reaching the window end
    pub capped: bool,
}

/// Walks an exchange's funding history over `[start, end)`.
///
/// ## Termination
/// - an empty page means the venue has nothing newer
/// - a page reaching `end` covers the window
/// - `max_pages` fetches bound venues whose cursor never advances; the
///   records gathered so far are returned, flagged `capped`
///
/// A failed page aborts the walk and drops everything gathered for the
/// symbol: a partial week would understate the sums.
pub struct HistoryPaginator {
    page_limit: usize,
    max_pages: usize,
}

impl HistoryPaginator {
    pub fn new(page_limit: usize, max_pages: usize) -> Self {
        HistoryPaginator {
            page_limit: page_limit.max(1),
            max_pages: max_pages.max(1),
        }
    }

    pub async fn collect(
        &self,
        exchange: &dyn Exchange,
        governor: &RateGovernor,
        symbol: &Symbol,
        start: i64,
        end: i64,
    ) -> Result<CollectedHistory> {
        match exchange.history_mode() {
            HistoryMode::Single => self.collect_single(exchange, governor, symbol, start, end).await,
            HistoryMode::Paged => self.collect_paged(exchange, governor, symbol, start, end).await,
        }
    }

    async fn collect_single(
        &self,
        exchange: &dyn Exchange,
        governor: &RateGovernor,
        symbol: &Symbol,
        start: i64,
        end: i64,
    ) -> Result<CollectedHistory> {
        governor.wait().await;
        let result = exchange.fetch_funding_history(symbol, Some(start), None).await;
        record_api_call("funding_history", &result);
        let page = result?;
        HISTORY_PAGES.inc();

        let mut collected = BTreeMap::new();
        merge_page(&mut collected, &page, start, end);

        Ok(CollectedHistory {
            records: collected.into_values().collect(),
            pages: 1,
            capped: false,
        })
    }

    async fn collect_paged(
        &self,
        exchange: &dyn Exchange,
        governor: &RateGovernor,
        symbol: &Symbol,
        start: i64,
        end: i64,
    ) -> Result<CollectedHistory> {
        let mut collected = BTreeMap::new();
        let mut since = start;
        let mut pages = 0;
        let mut capped = false;

        loop {
            if pages >= self.max_pages {
                capped = true;
                PAGINATION_CAP_HITS.inc();
                tracing::warn!(
                    "History pagination for {} hit the {} page cap at since={}, keeping {} records",
                    symbol, self.max_pages, since, collected.len()
                );
                break;
            }

            governor.wait().await;
            let result = exchange
                .fetch_funding_history(symbol, Some(since), Some(self.page_limit))
                .await;
            record_api_call("funding_history", &result);
            let page = result?;
            pages += 1;
            HISTORY_PAGES.inc();

            let latest = match page.iter().map(|r| r.timestamp).max() {
                Some(latest) => latest,
                None => break,
            };

            merge_page(&mut collected, &page, start, end);

            if latest >= end {
                break;
            }
            since = latest + 1;
        }

        tracing::debug!("Collected {} history records for {} in {} pages", collected.len(), symbol, pages);

        Ok(CollectedHistory {
            records: collected.into_values().collect(),
            pages,
            capped,
        })
    }
}

impl Default for HistoryPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, DEFAULT_MAX_PAGES)
    }
}

// First record seen for a timestamp wins
fn merge_page(
    collected: &mut BTreeMap<i64, FundingRateRecord>,
    page: &[FundingRateRecord],
    start: i64,
    end: i64,
) {
    for record in page {
        if record.timestamp >= start && record.timestamp < end {
            collected.entry(record.timestamp).or_insert(*record);
        }
    }
}
