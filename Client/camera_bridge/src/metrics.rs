use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::types::Channel;

/// Counters shared by the exported entry points.
static METRICS: Lazy<BridgeMetrics> = Lazy::new(BridgeMetrics::new);

pub fn global() -> &'static BridgeMetrics {
    &METRICS
}

/// Per-channel delivery counters, kept in their own registry so the host
/// process's default registry is never touched.
#[derive(Clone)]
pub struct BridgeMetrics {
    registry: Registry,
    delivered: IntCounterVec,
    dropped: IntCounterVec,
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let delivered = IntCounterVec::new(
            Opts::new(
                "frames_delivered_total",
                "Events handed to a registered engine callback",
            ),
            &["channel"],
        )
        .expect("Failed to create frames_delivered_total counter");

        let dropped = IntCounterVec::new(
            Opts::new(
                "frames_dropped_total",
                "Events discarded before reaching the engine",
            ),
            &["channel", "reason"],
        )
        .expect("Failed to create frames_dropped_total counter");

        registry
            .register(Box::new(delivered.clone()))
            .expect("Failed to register frames_delivered_total");
        registry
            .register(Box::new(dropped.clone()))
            .expect("Failed to register frames_dropped_total");

        Self {
            registry,
            delivered,
            dropped,
        }
    }

    pub fn record_delivered(&self, channel: Channel) {
        self.delivered.with_label_values(&[channel.name()]).inc();
    }

    pub fn record_dropped(&self, channel: Channel, reason: &str) {
        self.dropped.with_label_values(&[channel.name(), reason]).inc();
    }

    pub fn delivered(&self, channel: Channel) -> u64 {
        self.delivered.with_label_values(&[channel.name()]).get()
    }

    pub fn dropped(&self, channel: Channel, reason: &str) -> u64 {
        self.dropped.with_label_values(&[channel.name(), reason]).get()
    }

    /// Renders every counter in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
