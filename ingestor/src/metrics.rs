use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use tracing::error;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref READINGS_RECEIVED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_readings_received_total",
        "Total readings posted to the ingestion endpoint"
    ))
    .unwrap();
    pub static ref READINGS_STORED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_readings_stored_total",
        "Total readings persisted"
    ))
    .unwrap();
    pub static ref READINGS_REJECTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_readings_rejected_total",
        "Total readings rejected by validation"
    ))
    .unwrap();
    pub static ref STORAGE_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_storage_failures_total",
        "Total failed storage reads and writes"
    ))
    .unwrap();
    pub static ref WRITE_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ingestor_write_latency_seconds",
            "Time taken to append a reading"
        )
        .buckets(vec![
            0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0
        ])
    )
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(READINGS_RECEIVED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_STORED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_REJECTED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORAGE_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(WRITE_LATENCY_SECONDS.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
