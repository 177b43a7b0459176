use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Exchange metrics
    pub static ref API_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("exchange_api_calls_total", "Outbound exchange API calls by endpoint and outcome"),
        &["endpoint", "outcome"]
    ).unwrap();

    pub static ref GOVERNOR_WAIT: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "rate_governor_wait_seconds",
            "Time spent waiting for the global request spacing"
        ).buckets(vec![0.0, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).unwrap();

    pub static ref HISTORY_PAGES: IntCounter = IntCounter::new(
        "funding_history_pages_total",
        "Funding history pages fetched"
    ).unwrap();

    pub static ref PAGINATION_CAP_HITS: IntCounter = IntCounter::new(
        "funding_history_page_cap_hits_total",
        "Paginations stopped by the page cap"
    ).unwrap();

    // Symbol metrics
    pub static ref SYMBOLS_INCLUDED: IntCounter = IntCounter::new(
        "symbols_included_total",
        "Symbols written to the result set"
    ).unwrap();

    pub static ref SYMBOLS_EXCLUDED: IntCounterVec = IntCounterVec::new(
        Opts::new("symbols_excluded_total", "Symbols excluded from the result set by reason"),
        &["reason"]
    ).unwrap();

    pub static ref RECORDS_APPROXIMATED: IntCounter = IntCounter::new(
        "records_approximated_total",
        "Records built from the current-rate projection"
    ).unwrap();

    pub static ref SYMBOLS_IN_FLIGHT: IntGauge = IntGauge::new(
        "symbols_in_flight",
        "Symbols currently past the concurrency gate"
    ).unwrap();

    // Run metrics
    pub static ref RUN_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "pipeline_run_duration_seconds",
            "Wall time of a full pipeline run"
        ).buckets(vec![10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0])
    ).unwrap();
}

pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(API_CALLS.clone()),
        Box::new(GOVERNOR_WAIT.clone()),
        Box::new(HISTORY_PAGES.clone()),
        Box::new(PAGINATION_CAP_HITS.clone()),
        Box::new(SYMBOLS_INCLUDED.clone()),
        Box::new(SYMBOLS_EXCLUDED.clone()),
        Box::new(RECORDS_APPROXIMATED.clone()),
        Box::new(SYMBOLS_IN_FLIGHT.clone()),
        Box::new(RUN_DURATION.clone()),
    ];

    for collector in collectors {
        // Re-registration only happens when several runs share a process
        if let Err(e) = REGISTRY.register(collector) {
            tracing::debug!("Metric already registered: {}", e);
        }
    }
}

pub fn record_api_call<T, E>(endpoint: &str, result: &std::result::Result<T, E>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    API_CALLS.with_label_values(&[endpoint, outcome]).inc();
}

/// Render the registry in the Prometheus text format
pub fn gather_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
