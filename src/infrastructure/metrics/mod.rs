//! Prometheus metrics for the console's live-sync core.
//!
//! - Live channel metrics (opens, closes, reconnects, keep-alive probes)
//! - Live message metrics (received, malformed, routed by kind)
//! - Request metrics (attempts by outcome)
//! - Section metrics (activations, stale results discarded)

mod helpers;

pub use helpers::{encode_metrics, ChannelMetrics, EventMetrics, RequestMetrics, SectionMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "console";

lazy_static! {
    // ============================================================================
    // Live Channel Metrics
    // ============================================================================

    /// Live channel status (1 = open, 0 = connecting or closed)
    pub static ref CHANNEL_OPEN: IntGauge = register_int_gauge!(
        format!("{}_channel_open", METRIC_PREFIX),
        "Live channel status (1=open, 0=connecting or closed)"
    ).unwrap();

    /// Channel open attempts
    pub static ref CHANNEL_CONNECT_ATTEMPTS: IntCounter = register_int_counter!(
        format!("{}_channel_connect_attempts_total", METRIC_PREFIX),
        "Total live channel open attempts"
    ).unwrap();

    /// Channel closes by reason
    pub static ref CHANNEL_CLOSED: IntCounterVec = register_int_counter_vec!(
        format!("{}_channel_closed_total", METRIC_PREFIX),
        "Total live channel closes",
        &["reason"]
    ).unwrap();

    /// Reconnects scheduled after a close
    pub static ref CHANNEL_RECONNECTS_SCHEDULED: IntCounter = register_int_counter!(
        format!("{}_channel_reconnects_scheduled_total", METRIC_PREFIX),
        "Total reconnect attempts scheduled"
    ).unwrap();

    /// Keep-alive probes written to the channel
    pub static ref KEEPALIVE_SENT: IntCounter = register_int_counter!(
        format!("{}_keepalive_sent_total", METRIC_PREFIX),
        "Total keep-alive probes sent"
    ).unwrap();

    // ============================================================================
    // Live Message Metrics
    // ============================================================================

    /// Frames received on the live channel
    pub static ref LIVE_MESSAGES_RECEIVED: IntCounter = register_int_counter!(
        format!("{}_live_messages_received_total", METRIC_PREFIX),
        "Total frames received on the live channel"
    ).unwrap();

    /// Frames dropped because they could not be parsed
    pub static ref LIVE_MESSAGES_MALFORMED: IntCounter = register_int_counter!(
        format!("{}_live_messages_malformed_total", METRIC_PREFIX),
        "Total malformed live frames dropped"
    ).unwrap();

    /// Routed events by kind and outcome
    pub static ref EVENTS_ROUTED: IntCounterVec = register_int_counter_vec!(
        format!("{}_events_routed_total", METRIC_PREFIX),
        "Total live events routed",
        &["kind", "outcome"]
    ).unwrap();

    // ============================================================================
    // Request Metrics
    // ============================================================================

    /// Request attempts by method and outcome
    pub static ref REQUEST_ATTEMPTS: IntCounterVec = register_int_counter_vec!(
        format!("{}_request_attempts_total", METRIC_PREFIX),
        "Total resource API attempts",
        &["method", "outcome"]
    ).unwrap();

    /// Requests that failed after exhausting every attempt
    pub static ref REQUESTS_EXHAUSTED: IntCounter = register_int_counter!(
        format!("{}_requests_exhausted_total", METRIC_PREFIX),
        "Total requests that failed after all attempts"
    ).unwrap();

    // ============================================================================
    // Section Metrics
    // ============================================================================

    /// Section activations
    pub static ref SECTION_ACTIVATIONS: IntCounterVec = register_int_counter_vec!(
        format!("{}_section_activations_total", METRIC_PREFIX),
        "Total section activations",
        &["section"]
    ).unwrap();

    /// Pull results discarded because a newer activation superseded them
    pub static ref STALE_RESULTS_DISCARDED: IntCounter = register_int_counter!(
        format!("{}_stale_results_discarded_total", METRIC_PREFIX),
        "Total stale pull results discarded"
    ).unwrap();
}
