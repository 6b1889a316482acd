//! Collector configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for [`SystemCollector`](crate::metrics::SystemCollector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// CPU utilization sampling window in milliseconds
    pub cpu_sample_ms: u64,
    /// Upper bound for a single collector, in milliseconds
    pub collector_timeout_ms: u64,
    /// Probe the GPU management library at startup
    pub enable_gpu: bool,
    /// Query the container runtime
    pub enable_containers: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            cpu_sample_ms: crate::DEFAULT_CPU_SAMPLE_MS,
            collector_timeout_ms: crate::DEFAULT_COLLECTOR_TIMEOUT_MS,
            enable_gpu: true,
            enable_containers: true,
        }
    }
}

impl CollectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CPU sampling window.
    pub fn with_cpu_sample_ms(mut self, ms: u64) -> Self {
        self.cpu_sample_ms = ms;
        self
    }

    /// Set the per-collector timeout.
    pub fn with_collector_timeout_ms(mut self, ms: u64) -> Self {
        self.collector_timeout_ms = ms;
        self
    }

    /// Enable or disable GPU probing.
    pub fn with_gpu(mut self, enable: bool) -> Self {
        self.enable_gpu = enable;
        self
    }

    /// Enable or disable container queries.
    pub fn with_containers(mut self, enable: bool) -> Self {
        self.enable_containers = enable;
        self
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_millis(self.collector_timeout_ms)
    }
}
