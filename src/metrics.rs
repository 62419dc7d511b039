//! Prometheus metrics collection for chanrelay.
//!
//! Every metric lives in a `OnceLock` so recording is a no-op until
//! [`init`] runs. The binary calls [`init`] only when a metrics port is
//! configured; tests and embedded servers never pay for registration.
//!
//! - `chanrelay_command_total{command}` - Commands processed by name
//! - `chanrelay_command_duration_seconds{command}` - Command latency histogram
//! - `chanrelay_command_errors_total{command,error}` - Failed commands by error code
//! - `chanrelay_message_fanout` - Recipients per channel relay or broadcast

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Lines dropped because a recipient's outgoing queue was full.
pub static MESSAGES_DROPPED: OnceLock<IntCounter> = OnceLock::new();

/// Connections closed for exceeding the flood limit.
pub static RATE_LIMITED: OnceLock<IntCounter> = OnceLock::new();

/// Logins refused with a password mismatch.
pub static LOGINS_REJECTED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Currently connected clients, logged in or not.
pub static CONNECTED_CLIENTS: OnceLock<IntGauge> = OnceLock::new();

/// Registered channels.
pub static ACTIVE_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Command metrics
// ========================================================================

/// Commands processed by name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command processing latency by name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by name and error code.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Recipients per relayed or broadcast line.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; later calls leave the first set of
/// metrics in place.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(MESSAGES_DROPPED, IntCounter::new("chanrelay_messages_dropped_total", "Lines dropped on full outgoing queues"));
    register!(RATE_LIMITED, IntCounter::new("chanrelay_rate_limited_total", "Connections closed for flooding"));
    register!(LOGINS_REJECTED, IntCounter::new("chanrelay_logins_rejected_total", "Logins refused for a bad password"));
    register!(CONNECTED_CLIENTS, IntGauge::new("chanrelay_connected_clients", "Currently connected clients"));
    register!(ACTIVE_CHANNELS, IntGauge::new("chanrelay_active_channels", "Registered channels"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("chanrelay_command_total", "Commands processed by name"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("chanrelay_command_duration_seconds", "Command latency by name")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("chanrelay_command_errors_total", "Command errors by name and code"), &["command", "error"]));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("chanrelay_message_fanout", "Recipients per relayed line")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record how many recipients a relayed line reached.
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn record_dropped() {
    if let Some(c) = MESSAGES_DROPPED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_rate_limited() {
    if let Some(c) = RATE_LIMITED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_login_rejected() {
    if let Some(c) = LOGINS_REJECTED.get() {
        c.inc();
    }
}

#[inline]
pub fn client_connected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.inc();
    }
}

#[inline]
pub fn client_disconnected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.dec();
    }
}

#[inline]
pub fn channel_created() {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.inc();
    }
}

#[inline]
pub fn channel_removed() {
    if let Some(g) = ACTIVE_CHANNELS.get() {
        g.dec();
    }
}
