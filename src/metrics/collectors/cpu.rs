//! Compute collector.

use crate::error::CollectError;
use crate::metrics::data::CpuRecord;
use crate::metrics::traits::{CpuIdentity, CpuSample, HostSource, SensorReading};
use crate::metrics::units::round_to;
use std::time::Duration;
use tracing::warn;

/// Collect CPU identity, utilization over `window`, and temperature.
///
/// Blocks for `window`; the sampling delay trades latency for accuracy.
/// Only a missing identity fails the collector. A failed sample leaves
/// utilization and frequencies at zero.
pub fn collect(host: &dyn HostSource, window: Duration) -> Result<CpuRecord, CollectError> {
    let identity = host.cpu_identity()?;
    let sample = host.cpu_sample(window).unwrap_or_else(|err| {
        warn!(subsystem = "compute", error = %err, "CPU sampling failed");
        CpuSample::default()
    });

    Ok(to_record(identity, sample, &host.sensors()))
}

pub fn to_record(identity: CpuIdentity, sample: CpuSample, sensors: &[SensorReading]) -> CpuRecord {
    let mut per_core = sample.per_core;
    per_core.resize(identity.logical_cores as usize, 0.0);

    let model = if identity.model.is_empty() {
        "Unknown".to_string()
    } else {
        identity.model
    };

    CpuRecord {
        model,
        architecture: identity.architecture,
        physical_cores: identity.physical_cores,
        logical_cores: identity.logical_cores,
        utilization: sample.utilization,
        utilization_per_core: per_core,
        frequencies: sample.frequencies.into_iter().map(|f| round_to(f, 2)).collect(),
        temperature: cpu_temperature(sensors),
    }
}

/// First sensor whose label contains "cpu" or "core", case-insensitively.
///
/// Which sensors exist is host-dependent; no match means no temperature.
pub fn cpu_temperature(sensors: &[SensorReading]) -> Option<f32> {
    sensors
        .iter()
        .filter(|sensor| {
            let label = sensor.label.to_lowercase();
            label.contains("cpu") || label.contains("core")
        })
        .find_map(|sensor| sensor.celsius.filter(|c| c.is_finite()))
}
