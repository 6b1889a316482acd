//! Accelerator collector.

use crate::metrics::capability::GpuCapability;
use crate::metrics::data::AcceleratorRecord;
use crate::metrics::units::bytes_to_mb;
use tracing::warn;

/// One record per readable device.
///
/// Empty when the library is unavailable. A device whose metrics cannot be
/// read is logged and skipped; the others are still reported.
pub fn collect(capability: &GpuCapability) -> Vec<AcceleratorRecord> {
    capability
        .with_library(|library| {
            (0..capability.device_count())
                .filter_map(|index| match library.device(index) {
                    Ok(reading) => Some(AcceleratorRecord {
                        id: index,
                        name: reading.name,
                        temperature: reading.temperature,
                        memory_total: bytes_to_mb(reading.memory_total),
                        memory_used: bytes_to_mb(reading.memory_used),
                        memory_free: bytes_to_mb(reading.memory_free),
                        utilization: reading.utilization,
                    }),
                    Err(err) => {
                        warn!(subsystem = "accelerators", index, error = %err, "Failed to read GPU");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}
