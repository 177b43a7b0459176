use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::Instrument;
use crate::config::exchange::ExchangeConfig;
use crate::config::pipeline::PipelineConfig;
use crate::error::{Error, Result};
use crate::exchange::Exchange;
use crate::funding::processor::{ExclusionReason, SymbolOutcome, SymbolProcessor};
use crate::observability::metrics::{record_api_call, RUN_DURATION, SYMBOLS_EXCLUDED, SYMBOLS_INCLUDED};
use crate::observability::tracing::{trace_pipeline_run, trace_symbol_processing};
use crate::pipeline::result_set::ResultSet;
use crate::pipeline::snapshot::{write_snapshot, SnapshotData};
use crate::pipeline::universe::{load_universe, validate_universe};
use crate::throttle::{ConcurrencyGate, RateGovernor};
use crate::types::symbol::Symbol;
use crate::types::timestamp::LookbackWindows;

#[derive(Clone, Debug, Serialize)]
pub struct Exclusion {
    pub symbol: Symbol,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

/// Outcome of one pipeline run. Holds the results in memory so a failed
/// snapshot write can be retried.
#[derive(Debug)]
pub struct RunReport {
    pub exchange: String,
    pub results: SnapshotData,
    pub processed: usize,
    pub excluded: Vec<Exclusion>,
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn included(&self) -> usize {
        self.results.len()
    }

    pub async fn write_snapshot(&self, path: &Path) -> Result<()> {
        write_snapshot(path, &self.results).await
    }
}

/// Fans symbols out to [`SymbolProcessor`] tasks.
///
/// All tasks of a run share one [`RateGovernor`] (owned here, so it outlives
/// individual runs) and one [`ConcurrencyGate`]. A symbol's failure, panics
/// included, only ever removes that symbol from the results.
pub struct Orchestrator {
    exchange: Arc<dyn Exchange>,
    governor: Arc<RateGovernor>,
    config: PipelineConfig,
    order_book_depth: usize,
    alternate_quote: Option<String>,
}

impl Orchestrator {
    pub fn new(exchange: Arc<dyn Exchange>, config: PipelineConfig, exchange_config: &ExchangeConfig) -> Self {
        let governor = RateGovernor::from_rate_limit(
            exchange.rate_limit(),
            Duration::from_millis(config.min_request_interval_ms),
        );
        tracing::info!(
            "Global rate limit for {}: {} ms between calls",
            exchange.id(), governor.min_interval().as_millis()
        );

        Orchestrator {
            exchange,
            governor: Arc::new(governor),
            config,
            order_book_depth: exchange_config.order_book_depth,
            alternate_quote: exchange_config.alternate_quote.clone(),
        }
    }

    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    /// Load the universe file and keep what the venue currently lists.
    pub async fn prepare_universe(&self, path: &Path) -> Result<Vec<Symbol>> {
        let requested = load_universe(path).await?;

        self.governor.wait().await;
        let listed = self.exchange.list_perpetuals().await;
        record_api_call("list_perpetuals", &listed);
        let tradable = listed
            .map_err(|e| Error::UniverseError(format!("cannot load {} markets: {}", self.exchange.id(), e)))?;

        let valid = validate_universe(requested, &tradable, self.alternate_quote.as_deref());
        if valid.is_empty() {
            return Err(Error::EmptyUniverse);
        }

        tracing::info!("{} perpetual contracts to process on {}", valid.len(), self.exchange.id());
        Ok(valid)
    }

    /// Universe load, validation and a full run against the current time.
    pub async fn execute(&self, universe_path: &Path) -> Result<RunReport> {
        let symbols = self.prepare_universe(universe_path).await?;
        Ok(self.run(symbols, LookbackWindows::now()).await)
    }

    pub async fn run(&self, symbols: Vec<Symbol>, windows: LookbackWindows) -> RunReport {
        let started = Instant::now();
        let span = trace_pipeline_run(self.exchange.id(), symbols.len());

        let gate = ConcurrencyGate::new(self.config.concurrency);
        let results = Arc::new(ResultSet::new());
        let processor = Arc::new(SymbolProcessor::new(
            self.exchange.clone(),
            self.governor.clone(),
            &self.config,
            self.order_book_depth,
            windows,
        ));

        let handles: Vec<_> = symbols.into_iter()
            .map(|symbol| {
                let gate = gate.clone();
                let results = results.clone();
                let processor = processor.clone();
                let task_symbol = symbol.clone();

                let handle = tokio::spawn(
                    async move {
                        let _permit = match gate.enter().await {
                            Ok(permit) => permit,
                            Err(_) => return SymbolOutcome::Excluded(ExclusionReason::GateClosed),
                        };

                        match processor.process(&task_symbol).await {
                            SymbolOutcome::Included(record) => {
                                if results.insert_once(task_symbol.clone(), record.clone()) {
                                    SymbolOutcome::Included(record)
                                } else {
                                    tracing::warn!("Duplicate result for {} ignored", task_symbol);
                                    SymbolOutcome::Excluded(ExclusionReason::Duplicate)
                                }
                            }
                            excluded => excluded,
                        }
                    }
                    .instrument(trace_symbol_processing(&symbol)),
                );
                (symbol, handle)
            })
            .collect();

        let processed = handles.len();
        let (symbols, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let outcomes = join_all(handles).instrument(span.clone()).await;

        let mut excluded = Vec::new();
        for (symbol, joined) in symbols.into_iter().zip(outcomes) {
            let outcome = joined.unwrap_or_else(|e| {
                tracing::error!(parent: &span, "Task for {} failed: {}", symbol, e);
                SymbolOutcome::Excluded(ExclusionReason::TaskFailed { error: e.to_string() })
            });

            match outcome {
                SymbolOutcome::Included(_) => SYMBOLS_INCLUDED.inc(),
                SymbolOutcome::Excluded(reason) => {
                    SYMBOLS_EXCLUDED.with_label_values(&[reason.label()]).inc();
                    excluded.push(Exclusion { symbol, reason });
                }
            }
        }

        let elapsed = started.elapsed();
        RUN_DURATION.observe(elapsed.as_secs_f64());

        let report = RunReport {
            exchange: self.exchange.id().to_string(),
            results: results.to_sorted(),
            processed,
            excluded,
            peak_in_flight: gate.peak(),
            elapsed,
        };

        tracing::info!(
            parent: &span,
            "Run finished in {:.1}s: {} processed, {} included, {} excluded",
            elapsed.as_secs_f64(), report.processed, report.included(), report.excluded.len()
        );
        report
    }
}
