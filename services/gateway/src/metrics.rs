// Prometheus metrics for the connector gateway
// Tracks: HTTP traffic, process creations/transitions, rejected messages

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_with_registry, register_histogram_with_registry, Counter, Encoder, Histogram,
    HistogramOpts, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub http_requests_total: Counter,
    pub http_request_duration_seconds: Histogram,

    // Process metrics
    pub negotiations_created_total: Counter,
    pub negotiation_transitions_total: Counter,
    pub transfers_created_total: Counter,
    pub transfer_transitions_total: Counter,

    // Rejection metrics
    pub decode_errors_total: Counter,
    pub invalid_transitions_total: Counter,
    pub store_conflicts_total: Counter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = register_counter_with_registry!(
            Opts::new("connector_http_requests_total", "Total HTTP requests processed"),
            registry
        )?;

        let http_request_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "connector_http_request_duration_seconds",
                "HTTP request duration in seconds"
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            registry
        )?;

        let negotiations_created_total = register_counter_with_registry!(
            Opts::new("connector_negotiations_created_total", "Negotiation processes created"),
            registry
        )?;

        let negotiation_transitions_total = register_counter_with_registry!(
            Opts::new(
                "connector_negotiation_transitions_total",
                "Successful negotiation transitions"
            ),
            registry
        )?;

        let transfers_created_total = register_counter_with_registry!(
            Opts::new("connector_transfers_created_total", "Transfer processes created"),
            registry
        )?;

        let transfer_transitions_total = register_counter_with_registry!(
            Opts::new(
                "connector_transfer_transitions_total",
                "Successful transfer transitions"
            ),
            registry
        )?;

        let decode_errors_total = register_counter_with_registry!(
            Opts::new("connector_decode_errors_total", "Payloads rejected at decode time"),
            registry
        )?;

        let invalid_transitions_total = register_counter_with_registry!(
            Opts::new(
                "connector_invalid_transitions_total",
                "Messages rejected by the transition tables"
            ),
            registry
        )?;

        let store_conflicts_total = register_counter_with_registry!(
            Opts::new(
                "connector_store_conflicts_total",
                "Submits that lost a concurrent-write race"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            negotiations_created_total,
            negotiation_transitions_total,
            transfers_created_total,
            transfer_transitions_total,
            decode_errors_total,
            invalid_transitions_total,
            store_conflicts_total,
        })
    }

    pub fn export(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub static METRICS: Lazy<Metrics> = Lazy::new(|| Metrics::new().expect("metrics registry"));
