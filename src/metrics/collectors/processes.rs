//! Process collector.

use crate::error::CollectError;
use crate::metrics::data::ProcessRecord;
use crate::metrics::traits::{HostSource, ProcessEntry};
use std::cmp::Ordering;
use tracing::debug;

/// Username used when no identity information is available.
pub const UNKNOWN_USER: &str = "unknown";

/// All readable processes, by memory usage descending.
///
/// Processes that vanish or deny access mid-scan are left out. Ties keep the
/// order in which the process table listed them.
pub fn collect(host: &dyn HostSource) -> Result<Vec<ProcessRecord>, CollectError> {
    let mut records: Vec<ProcessRecord> = host
        .processes()?
        .into_iter()
        .filter_map(|row| match row {
            Ok(entry) => Some(to_record(entry, |uid| host.lookup_user(uid))),
            Err(err) => {
                debug!(error = %err, "Skipping process");
                None
            }
        })
        .collect();

    sort_by_memory(&mut records);
    Ok(records)
}

/// Stable sort, highest memory usage first.
pub fn sort_by_memory(records: &mut [ProcessRecord]) {
    records.sort_by(|a, b| {
        b.memory_percent
            .partial_cmp(&a.memory_percent)
            .unwrap_or(Ordering::Equal)
    });
}

/// Apply field defaults: missing numbers become 0, a missing command line
/// becomes empty.
pub fn to_record(entry: ProcessEntry, directory: impl Fn(u32) -> Option<String>) -> ProcessRecord {
    let username = resolve_username(entry.username, entry.uid, directory);

    ProcessRecord {
        pid: entry.pid,
        name: entry.name.unwrap_or_default(),
        username,
        status: entry.status.unwrap_or_else(|| "unknown".to_string()),
        cpu_percent: entry.cpu_percent.unwrap_or(0.0),
        memory_percent: entry.memory_percent.unwrap_or(0.0),
        created_time: entry.create_time.unwrap_or(0.0),
        cmdline: entry.cmdline.unwrap_or_default(),
        num_threads: entry.num_threads.unwrap_or(0),
        nice: entry.nice,
    }
}

/// Reported name, else the user directory entry for `uid`, else the numeric
/// uid, else "unknown".
pub fn resolve_username(
    reported: Option<String>,
    uid: Option<u32>,
    directory: impl Fn(u32) -> Option<String>,
) -> String {
    if let Some(name) = reported.filter(|name| !name.is_empty()) {
        return name;
    }
    match uid {
        Some(uid) => directory(uid).unwrap_or_else(|| uid.to_string()),
        None => UNKNOWN_USER.to_string(),
    }
}
