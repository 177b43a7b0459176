use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt};
use crate::config::LoggingConfig;
use crate::types::symbol::Symbol;

pub fn trace_symbol_processing(symbol: &Symbol) -> Span {
    tracing::info_span!(
        "symbol",
        symbol = %symbol,
    )
}

pub fn trace_pipeline_run(exchange: &str, symbols: usize) -> Span {
    tracing::info_span!(
        "pipeline_run",
        exchange = exchange,
        symbols = symbols,
    )
}

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let result = if config.json {
        fmt().json().with_env_filter(filter).try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}
