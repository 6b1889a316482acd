//! Data structures returned to API callers.
//!
//! Field names follow the JSON contract consumed by the dashboard, so some
//! Rust names carry a `serde(rename)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One point-in-time read of host state.
///
/// All eight fields are always present. A failed or missing subsystem leaves
/// an empty list, or default values for `cpu` and `ram`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    #[serde(rename = "cpu")]
    pub compute: CpuRecord,
    #[serde(rename = "gpu")]
    pub accelerators: Vec<AcceleratorRecord>,
    #[serde(rename = "ram")]
    pub memory: MemoryRecord,
    #[serde(rename = "disk")]
    pub storage: Vec<StorageRecord>,
    pub interfaces: Vec<InterfaceRecord>,
    #[serde(rename = "container")]
    pub containers: Vec<ContainerRecord>,
    #[serde(rename = "ports")]
    pub sockets: Vec<PortRecord>,
    pub processes: Vec<ProcessRecord>,
}

/// CPU identification and utilization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuRecord {
    /// CPU model name
    pub model: String,
    /// CPU architecture (e.g., "x86_64")
    pub architecture: String,
    pub physical_cores: u32,
    pub logical_cores: u32,
    /// Aggregate usage over the sampling window (0.0 to 100.0)
    pub utilization: f32,
    /// One entry per logical core
    pub utilization_per_core: Vec<f32>,
    /// Current per-core frequencies in MHz
    pub frequencies: Vec<f64>,
    /// CPU temperature in Celsius, absent when no sensor matched
    pub temperature: Option<f32>,
}

/// Memory usage in MB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub total: u64,
    pub used: u64,
    /// Immediately available memory, not `total - used`
    pub free: u64,
    pub utilization: f32,
}

/// Usage of one mounted partition, sizes in GB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageRecord {
    /// Device path (e.g., "/dev/nvme0n1p2")
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub utilization: f32,
}

/// Addresses and cumulative counters of one network interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub mac: Option<String>,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

/// One GPU as reported by the accelerator library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceleratorRecord {
    /// Device index
    pub id: u32,
    pub name: String,
    /// Core temperature in Celsius
    pub temperature: u32,
    /// Memory figures in MB
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_free: u64,
    /// Core utilization percentage
    pub utilization: u32,
}

/// One running container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Short identifier (first 12 characters)
    pub id: String,
    pub name: String,
    /// First image tag, or "untagged"
    pub image: String,
    pub status: String,
    /// Port mapping table exactly as the runtime reports it
    pub ports: serde_json::Map<String, serde_json::Value>,
}

/// Transport protocol of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
        }
    }
}

/// One open socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub local_ip: String,
    pub local_port: u16,
    pub remote_ip: Option<String>,
    pub remote_port: Option<u16>,
    /// Connection state (e.g., "LISTEN"); "NONE" for UDP
    pub status: String,
    pub pid: Option<u32>,
    pub process_name: Option<String>,
    pub protocol: Protocol,
}

/// One process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub username: String,
    pub status: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    /// Creation time as seconds since the Unix epoch
    pub created_time: f64,
    pub cmdline: Vec<String>,
    pub num_threads: u32,
    pub nice: Option<i32>,
}
