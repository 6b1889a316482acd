//! Memory collector.

use crate::error::CollectError;
use crate::metrics::data::MemoryRecord;
use crate::metrics::traits::{HostSource, MemoryCounters};
use crate::metrics::units::{bytes_to_mb, percent_of};

pub fn collect(host: &dyn HostSource) -> Result<MemoryRecord, CollectError> {
    host.memory().map(|counters| to_record(&counters))
}

/// `free` is the available figure, which counts reclaimable memory.
pub fn to_record(counters: &MemoryCounters) -> MemoryRecord {
    let used = counters.used.min(counters.total);
    let available = counters.available.min(counters.total);

    MemoryRecord {
        total: bytes_to_mb(counters.total),
        used: bytes_to_mb(used),
        free: bytes_to_mb(available),
        utilization: percent_of(counters.total - available, counters.total),
    }
}
