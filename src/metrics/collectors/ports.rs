//! Socket collector.

use crate::error::CollectError;
use crate::metrics::data::{PortRecord, Protocol};
use crate::metrics::traits::HostSource;
use tracing::debug;

/// Open sockets from the TCP table, then the UDP table.
///
/// Rows without a local address are skipped, as are TCP rows in state "NONE".
/// An owner whose name cannot be resolved leaves `process_name` null.
pub fn collect(host: &dyn HostSource) -> Result<Vec<PortRecord>, CollectError> {
    let mut records = Vec::new();

    for protocol in [Protocol::Tcp, Protocol::Udp] {
        for entry in host.socket_table(protocol)? {
            let Some(local) = entry.local else {
                continue;
            };
            if protocol == Protocol::Tcp && (entry.status.is_empty() || entry.status == "NONE") {
                continue;
            }

            let process_name = entry.pid.and_then(|pid| match host.process_name(pid) {
                Ok(name) => Some(name),
                Err(err) => {
                    debug!(pid, error = %err, "Could not resolve socket owner");
                    None
                }
            });

            records.push(PortRecord {
                local_ip: local.ip().to_string(),
                local_port: local.port(),
                remote_ip: entry.remote.map(|r| r.ip().to_string()),
                remote_port: entry.remote.map(|r| r.port()),
                status: entry.status,
                pid: entry.pid,
                process_name,
                protocol,
            });
        }
    }

    Ok(records)
}
