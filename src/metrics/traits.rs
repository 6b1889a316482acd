//! Interfaces of the external collaborators the collectors read from.
//!
//! The kernel tables, the GPU vendor library and the container runtime are
//! not part of this crate. Collectors only see them through these traits, so
//! every collector can be driven by an in-memory implementation in tests.

use crate::error::CollectError;
use crate::metrics::data::Protocol;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

/// Static CPU identification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuIdentity {
    pub model: String,
    pub architecture: String,
    pub physical_cores: u32,
    pub logical_cores: u32,
}

/// CPU utilization measured over a sampling window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSample {
    pub utilization: f32,
    pub per_core: Vec<f32>,
    /// Per-core frequency in MHz
    pub frequencies: Vec<f64>,
}

/// One temperature sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub label: String,
    pub celsius: Option<f32>,
}

/// Raw memory counters in bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryCounters {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

/// A mounted partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

/// Usage of one partition in bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionUsage {
    pub total: u64,
    pub used: u64,
    /// Space available to unprivileged users
    pub free: u64,
}

/// Cumulative IO counters of one interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceCounters {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

/// Address family tag reported for an interface address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Inet,
    Inet6,
    Link,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceAddress {
    pub family: AddressFamily,
    pub address: String,
}

/// One row of a socket table.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketEntry {
    /// `None` when the local address cannot be resolved
    pub local: Option<SocketAddr>,
    pub remote: Option<SocketAddr>,
    pub status: String,
    pub pid: Option<u32>,
}

/// One row of the process table.
///
/// Every field except `pid` may be missing, depending on platform and privileges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: Option<String>,
    /// Username as reported by the process table, if it reports one
    pub username: Option<String>,
    /// Real user id
    pub uid: Option<u32>,
    pub status: Option<String>,
    pub cpu_percent: Option<f32>,
    pub memory_percent: Option<f32>,
    pub create_time: Option<f64>,
    pub cmdline: Option<Vec<String>>,
    pub num_threads: Option<u32>,
    pub nice: Option<i32>,
}

/// Kernel and OS metric sources.
///
/// Calls may block; the aggregator runs them off the async executor.
pub trait HostSource: Send + Sync {
    fn cpu_identity(&self) -> Result<CpuIdentity, CollectError>;

    /// Measure utilization over `window`. Blocks for that long.
    fn cpu_sample(&self, window: Duration) -> Result<CpuSample, CollectError>;

    /// All exposed temperature sensors, flattened in group order.
    fn sensors(&self) -> Vec<SensorReading>;

    fn memory(&self) -> Result<MemoryCounters, CollectError>;

    fn partitions(&self) -> Result<Vec<Partition>, CollectError>;

    fn partition_usage(&self, partition: &Partition) -> Result<PartitionUsage, CollectError>;

    fn interface_counters(&self) -> Result<Vec<InterfaceCounters>, CollectError>;

    fn interface_addresses(&self) -> Result<HashMap<String, Vec<InterfaceAddress>>, CollectError>;

    fn socket_table(&self, protocol: Protocol) -> Result<Vec<SocketEntry>, CollectError>;

    fn process_name(&self, pid: u32) -> Result<String, CollectError>;

    /// Every process; a row that could not be read is an `Err`.
    fn processes(&self) -> Result<Vec<Result<ProcessEntry, CollectError>>, CollectError>;

    /// Resolve a user id against the system user directory.
    fn lookup_user(&self, uid: u32) -> Option<String>;
}

/// Metrics of one GPU as the vendor library reports them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceleratorReading {
    pub name: String,
    pub temperature: u32,
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_free: u64,
    pub utilization: u32,
}

/// GPU vendor management library.
pub trait AcceleratorLibrary: Send + Sync {
    fn device_count(&self) -> Result<u32, CollectError>;

    fn device(&self, index: u32) -> Result<AcceleratorReading, CollectError>;

    /// Release the library handle.
    fn shutdown(self: Box<Self>) -> Result<(), CollectError>;
}

/// A running container as the runtime reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerEntry {
    pub id: String,
    pub name: String,
    pub image_tags: Vec<String>,
    pub state: String,
    pub ports: serde_json::Map<String, serde_json::Value>,
}

/// Container runtime API.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn running_containers(&self) -> Result<Vec<ContainerEntry>, CollectError>;
}
