//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    CHANNEL_CLOSED, CHANNEL_CONNECT_ATTEMPTS, CHANNEL_OPEN, CHANNEL_RECONNECTS_SCHEDULED,
    EVENTS_ROUTED, KEEPALIVE_SENT, LIVE_MESSAGES_MALFORMED, LIVE_MESSAGES_RECEIVED,
    REQUESTS_EXHAUSTED, REQUEST_ATTEMPTS, SECTION_ACTIVATIONS, STALE_RESULTS_DISCARDED,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for live channel metrics
pub struct ChannelMetrics;

impl ChannelMetrics {
    pub fn record_connect_attempt() {
        CHANNEL_CONNECT_ATTEMPTS.inc();
    }

    pub fn record_opened() {
        CHANNEL_OPEN.set(1);
    }

    /// Record a close with a short reason label
    pub fn record_closed(reason: &str) {
        CHANNEL_OPEN.set(0);
        CHANNEL_CLOSED.with_label_values(&[reason]).inc();
    }

    pub fn record_reconnect_scheduled() {
        CHANNEL_RECONNECTS_SCHEDULED.inc();
    }

    pub fn record_keepalive() {
        KEEPALIVE_SENT.inc();
    }
}

/// Helper struct for live message metrics
pub struct EventMetrics;

impl EventMetrics {
    pub fn record_received() {
        LIVE_MESSAGES_RECEIVED.inc();
    }

    pub fn record_malformed() {
        LIVE_MESSAGES_MALFORMED.inc();
    }

    pub fn record_routed(kind: &str, outcome: &str) {
        EVENTS_ROUTED.with_label_values(&[kind, outcome]).inc();
    }
}

/// Helper struct for request metrics
pub struct RequestMetrics;

impl RequestMetrics {
    pub fn record_attempt(method: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        REQUEST_ATTEMPTS.with_label_values(&[method, outcome]).inc();
    }

    pub fn record_exhausted() {
        REQUESTS_EXHAUSTED.inc();
    }
}

/// Helper struct for section metrics
pub struct SectionMetrics;

impl SectionMetrics {
    pub fn record_activation(section: &str) {
        SECTION_ACTIVATIONS.with_label_values(&[section]).inc();
    }

    pub fn record_stale_discarded() {
        STALE_RESULTS_DISCARDED.inc();
    }
}
