use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct AtomicMetrics {
    authorized: AtomicU64,
    captured: AtomicU64,
    voided: AtomicU64,
    rejected: AtomicU64,
    gateway_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub authorized: u64,
    pub captured: u64,
    pub voided: u64,
    pub rejected: u64,
    pub gateway_failures: u64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_authorized(&self) {
        self.authorized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_captured(&self) {
        self.captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_voided(&self) {
        self.voided.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_gateway_failures(&self) {
        self.gateway_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            authorized: self.authorized.load(Ordering::Relaxed),
            captured: self.captured.load(Ordering::Relaxed),
            voided: self.voided.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            gateway_failures: self.gateway_failures.load(Ordering::Relaxed),
        }
    }
}
