use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{bail, Context};
use chrono::Utc;
use FundingInfra::api::rest::{create_router, ApiState};
use FundingInfra::config::exchange::ExchangeKind;
use FundingInfra::config::loader::AppConfig;
use FundingInfra::exchange::{build_exchange, Exchange};
use FundingInfra::observability::metrics::register_metrics;
use FundingInfra::observability::tracing::init_tracing;
use FundingInfra::pipeline::snapshot::{load_snapshots, write_json};
use FundingInfra::pipeline::universe::write_universe;
use FundingInfra::pipeline::{Orchestrator, RunReport};
use FundingInfra::ranking::{GlobalTopReport, TopReport};
use FundingInfra::types::aggregate::AggregateRecord;
use FundingInfra::types::timestamp::{format_utc, Window};

const SNAPSHOT_WRITE_ATTEMPTS: u32 = 2;

/// `funding-infra [discover|run|global-top|serve] [exchange]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("run");
    let env = std::env::var("FUNDINGINFRA_ENV").unwrap_or_else(|_| "development".to_string());

    let mut config = AppConfig::load(&env).context("loading configuration")?;
    if let Some(exchange) = args.get(1) {
        config.exchange.kind = exchange.parse::<ExchangeKind>()?;
    }
    init_tracing(&config.logging);
    register_metrics();

    tracing::info!("Starting FundingInfra `{}` ({} profile)", command, env);

    match command {
        "discover" => discover(&config).await,
        "run" => run(&config).await,
        "global-top" => global_top(&config).await,
        "serve" => serve(&config).await,
        other => bail!("unknown command `{}` (expected discover, run, global-top or serve)", other),
    }
}

async fn discover(config: &AppConfig) -> anyhow::Result<()> {
    let exchange = build_exchange(&config.exchange)?;
    let symbols = exchange.list_perpetuals().await
        .with_context(|| format!("listing perpetuals on {}", exchange.id()))?;

    let path = config.output.universe_path(config.exchange.kind);
    let written = write_universe(&path, &symbols).await?;
    tracing::info!("Wrote {} perpetual pairs to {}", written, path.display());
    Ok(())
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let kind = config.exchange.kind;
    let exchange: Arc<dyn Exchange> = build_exchange(&config.exchange)?;
    let orchestrator = Orchestrator::new(exchange, config.pipeline.clone(), &config.exchange);

    let report = orchestrator.execute(&config.output.universe_path(kind)).await?;
    persist_with_retry(&report, &config.output.results_path(kind)).await?;

    let top = TopReport::build(&report.results, config.output.top_n);
    write_json(&config.output.top_path(kind), &top).await?;

    for window in Window::ALL {
        println!("\nTop by {} funding on {}:", window.label(), kind.display_name());
        for entry in top.window(window) {
            println!("  {:<24} {}", entry.symbol.as_str(), describe(&entry.record, window));
        }
    }
    tracing::info!(
        "Processed {} symbols: {} included, {} excluded, peak concurrency {}, took {:.1}s",
        report.processed,
        report.included(),
        report.excluded.len(),
        report.peak_in_flight,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

async fn persist_with_retry(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    let mut attempt = 1;
    loop {
        match report.write_snapshot(path).await {
            Ok(()) => {
                tracing::info!("Saved {} records to {}", report.included(), path.display());
                return Ok(());
            }
            Err(e) if attempt < SNAPSHOT_WRITE_ATTEMPTS => {
                tracing::warn!("Snapshot write attempt {} failed: {}", attempt, e);
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => return Err(e).context("writing results snapshot"),
        }
    }
}

async fn global_top(config: &AppConfig) -> anyhow::Result<()> {
    let snapshots = load_snapshots(&config.snapshot_sources()).await;
    if snapshots.values().all(|data| data.is_empty()) {
        bail!("no exchange results found; run `run <exchange>` first");
    }

    let now = Utc::now();
    let report = GlobalTopReport::build(&snapshots, config.output.top_n, now);
    let path = config.output.global_top_path(now);
    write_json(&path, &report).await?;

    for window in Window::ALL {
        println!("\nTop by {} funding across {}:", window.label(), report.exchanges.join(", "));
        for entry in report.window(window) {
            println!(
                "  {:<24} {:<12} {}",
                entry.symbol.as_str(),
                entry.exchange,
                describe(&entry.record, window)
            );
        }
    }
    tracing::info!("Saved global ranking to {}", path.display());
    Ok(())
}

fn describe(record: &AggregateRecord, window: Window) -> String {
    let next = record.next_payout_time
        .and_then(format_utc)
        .unwrap_or_else(|| "-".to_string());
    let interval = record.interval_hours
        .map(|h| format!("{}h", h))
        .unwrap_or_else(|| "-".to_string());

    format!("{:>10.6}%  interval {:>4}  next {}", record.sum(window), interval, next)
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(ApiState::load(&config.snapshot_sources()).await);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    tracing::info!("API listening on {}", config.server.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
