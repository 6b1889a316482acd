//! Storage collector.

use crate::error::CollectError;
use crate::metrics::data::StorageRecord;
use crate::metrics::traits::HostSource;
use crate::metrics::units::{bytes_to_gb, percent_of};
use tracing::{debug, warn};

/// Usage of every readable partition.
///
/// A partition whose usage cannot be read is left out; only failing to list
/// partitions at all is an error.
pub fn collect(host: &dyn HostSource) -> Result<Vec<StorageRecord>, CollectError> {
    let partitions = host.partitions()?;
    let mut records = Vec::with_capacity(partitions.len());

    for partition in partitions {
        let usage = match host.partition_usage(&partition) {
            Ok(usage) => usage,
            Err(err) if err.is_permission_denied() => {
                debug!(mountpoint = %partition.mountpoint, "Skipping unreadable partition");
                continue;
            }
            Err(err) => {
                warn!(mountpoint = %partition.mountpoint, error = %err, "Skipping partition");
                continue;
            }
        };

        records.push(StorageRecord {
            device: partition.device,
            mountpoint: partition.mountpoint,
            fstype: partition.fstype,
            total: bytes_to_gb(usage.total),
            used: bytes_to_gb(usage.used),
            free: bytes_to_gb(usage.free),
            utilization: percent_of(usage.used, usage.used + usage.free),
        });
    }

    Ok(records)
}
