//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use host_probe::error::CollectError;
use host_probe::metrics::traits::*;
use host_probe::{CollectorConfig, GpuCapability, Protocol, SystemCollector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const GB: u64 = 1024 * 1024 * 1024;

/// Host whose tables are plain fields.
#[derive(Clone, Default)]
pub struct MockHost {
    pub identity: Option<CpuIdentity>,
    pub sample: CpuSample,
    pub sample_fails: bool,
    pub sensors: Vec<SensorReading>,
    pub memory: Option<MemoryCounters>,
    pub memory_delay: Option<Duration>,
    pub partitions: Vec<Partition>,
    pub denied_mounts: Vec<String>,
    pub counters: Vec<InterfaceCounters>,
    pub addresses: HashMap<String, Vec<InterfaceAddress>>,
    pub tcp: Vec<SocketEntry>,
    pub udp: Vec<SocketEntry>,
    pub names: HashMap<u32, String>,
    pub processes: Option<Vec<Result<ProcessEntry, CollectError>>>,
    pub users: HashMap<u32, String>,
}

impl MockHost {
    /// A small but complete host.
    pub fn healthy() -> Self {
        Self {
            identity: Some(CpuIdentity {
                model: "Mock CPU @ 3.00GHz".to_string(),
                architecture: "x86_64".to_string(),
                physical_cores: 2,
                logical_cores: 4,
            }),
            sample: CpuSample {
                utilization: 12.5,
                per_core: vec![10.0, 15.0, 5.0, 20.0],
                frequencies: vec![2999.999, 3000.004, 2800.0, 3100.126],
            },
            sensors: vec![
                SensorReading {
                    label: "acpitz temp1".to_string(),
                    celsius: Some(30.0),
                },
                SensorReading {
                    label: "coretemp Package id 0".to_string(),
                    celsius: Some(48.0),
                },
            ],
            memory: Some(MemoryCounters {
                total: 16 * GB,
                used: 6 * GB,
                available: 8 * GB,
            }),
            partitions: vec![
                partition("/dev/sda1", "/", "ext4"),
                partition("/dev/sda2", "/home", "ext4"),
                partition("/dev/sdb1", "/mnt/secret", "xfs"),
            ],
            counters: vec![
                InterfaceCounters {
                    name: "lo".to_string(),
                    bytes_sent: 1000,
                    bytes_recv: 1000,
                    ..Default::default()
                },
                InterfaceCounters {
                    name: "eth0".to_string(),
                    bytes_sent: 5000,
                    bytes_recv: 9000,
                    ..Default::default()
                },
            ],
            addresses: HashMap::from([(
                "lo".to_string(),
                vec![InterfaceAddress {
                    family: AddressFamily::Inet,
                    address: "127.0.0.1".to_string(),
                }],
            )]),
            tcp: vec![
                socket(Some("0.0.0.0:22"), None, "LISTEN", Some(1)),
                socket(Some("10.0.0.2:22"), Some("10.0.0.9:50000"), "ESTABLISHED", Some(77)),
                socket(None, None, "LISTEN", Some(1)),
                socket(Some("10.0.0.2:80"), None, "NONE", None),
            ],
            udp: vec![socket(Some("0.0.0.0:68"), None, "NONE", None)],
            names: HashMap::from([(1, "sshd".to_string())]),
            processes: Some(vec![
                Ok(process(10, Some(1000), 1.5)),
                Err(CollectError::transient(11, "exited")),
                Ok(process(12, Some(0), 4.0)),
                Err(CollectError::PermissionDenied("/proc/13".to_string())),
                Ok(process(14, None, 1.5)),
            ]),
            users: HashMap::from([(1000, "alice".to_string()), (0, "root".to_string())]),
            ..Default::default()
        }
    }

    /// A host on which every query fails.
    pub fn broken() -> Self {
        Self::default()
    }
}

pub fn partition(device: &str, mountpoint: &str, fstype: &str) -> Partition {
    Partition {
        device: device.to_string(),
        mountpoint: mountpoint.to_string(),
        fstype: fstype.to_string(),
    }
}

pub fn socket(local: Option<&str>, remote: Option<&str>, status: &str, pid: Option<u32>) -> SocketEntry {
    SocketEntry {
        local: local.map(|a| a.parse().unwrap()),
        remote: remote.map(|a| a.parse().unwrap()),
        status: status.to_string(),
        pid,
    }
}

pub fn process(pid: u32, uid: Option<u32>, memory_percent: f32) -> ProcessEntry {
    ProcessEntry {
        pid,
        name: Some(format!("proc-{pid}")),
        uid,
        status: Some("sleeping".to_string()),
        cpu_percent: Some(0.5),
        memory_percent: Some(memory_percent),
        create_time: Some(1_700_000_000.0),
        cmdline: Some(vec![format!("/usr/bin/proc-{pid}")]),
        num_threads: Some(1),
        nice: Some(0),
        ..Default::default()
    }
}

fn unavailable(what: &'static str) -> CollectError {
    CollectError::unavailable(what, "mock host has no data")
}

impl HostSource for MockHost {
    fn cpu_identity(&self) -> Result<CpuIdentity, CollectError> {
        self.identity.clone().ok_or_else(|| unavailable("compute"))
    }

    fn cpu_sample(&self, _window: Duration) -> Result<CpuSample, CollectError> {
        if self.sample_fails {
            return Err(CollectError::Io("/proc/stat: read failed".to_string()));
        }
        Ok(self.sample.clone())
    }

    fn sensors(&self) -> Vec<SensorReading> {
        self.sensors.clone()
    }

    fn memory(&self) -> Result<MemoryCounters, CollectError> {
        if let Some(delay) = self.memory_delay {
            std::thread::sleep(delay);
        }
        self.memory.clone().ok_or_else(|| unavailable("memory"))
    }

    fn partitions(&self) -> Result<Vec<Partition>, CollectError> {
        if self.identity.is_none() && self.partitions.is_empty() {
            return Err(unavailable("storage"));
        }
        Ok(self.partitions.clone())
    }

    fn partition_usage(&self, partition: &Partition) -> Result<PartitionUsage, CollectError> {
        if self.denied_mounts.contains(&partition.mountpoint) {
            return Err(CollectError::PermissionDenied(partition.mountpoint.clone()));
        }
        Ok(PartitionUsage {
            total: 100 * GB,
            used: 40 * GB,
            free: 50 * GB,
        })
    }

    fn interface_counters(&self) -> Result<Vec<InterfaceCounters>, CollectError> {
        if self.counters.is_empty() {
            return Err(unavailable("interfaces"));
        }
        Ok(self.counters.clone())
    }

    fn interface_addresses(&self) -> Result<HashMap<String, Vec<InterfaceAddress>>, CollectError> {
        Ok(self.addresses.clone())
    }

    fn socket_table(&self, protocol: Protocol) -> Result<Vec<SocketEntry>, CollectError> {
        if self.identity.is_none() {
            return Err(CollectError::Unsupported("socket tables"));
        }
        Ok(match protocol {
            Protocol::Tcp => self.tcp.clone(),
            Protocol::Udp => self.udp.clone(),
        })
    }

    fn process_name(&self, pid: u32) -> Result<String, CollectError> {
        self.names
            .get(&pid)
            .cloned()
            .ok_or_else(|| CollectError::transient(pid, "gone"))
    }

    fn processes(&self) -> Result<Vec<Result<ProcessEntry, CollectError>>, CollectError> {
        self.processes.clone().ok_or_else(|| unavailable("processes"))
    }

    fn lookup_user(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    }
}

/// GPU library with a fixed set of devices; index 1 fails when `flaky`.
pub struct MockLibrary {
    pub devices: u32,
    pub flaky: bool,
    pub stall: Option<Duration>,
    pub releases: Arc<AtomicUsize>,
}

impl AcceleratorLibrary for MockLibrary {
    fn device_count(&self) -> Result<u32, CollectError> {
        Ok(self.devices)
    }

    fn device(&self, index: u32) -> Result<AcceleratorReading, CollectError> {
        if let Some(stall) = self.stall {
            std::thread::sleep(stall);
        }
        if self.flaky && index == 1 {
            return Err(CollectError::unavailable("accelerators", "device lost"));
        }
        Ok(AcceleratorReading {
            name: format!("Mock GPU {index}"),
            temperature: 55,
            memory_total: 8 * GB,
            memory_used: 2 * GB,
            memory_free: 6 * GB,
            utilization: 30,
        })
    }

    fn shutdown(self: Box<Self>) -> Result<(), CollectError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn gpu(devices: u32, flaky: bool, releases: &Arc<AtomicUsize>) -> GpuCapability {
    library(MockLibrary {
        devices,
        flaky,
        stall: None,
        releases: releases.clone(),
    })
}

/// One GPU whose every read blocks for `stall`.
pub fn stalled_gpu(stall: Duration, releases: &Arc<AtomicUsize>) -> GpuCapability {
    library(MockLibrary {
        devices: 1,
        flaky: false,
        stall: Some(stall),
        releases: releases.clone(),
    })
}

fn library(library: MockLibrary) -> GpuCapability {
    GpuCapability::probe(move || Ok(Box::new(library) as Box<dyn AcceleratorLibrary>))
}

pub enum MockRuntime {
    Running(Vec<ContainerEntry>),
    Unreachable,
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn running_containers(&self) -> Result<Vec<ContainerEntry>, CollectError> {
        match self {
            MockRuntime::Running(entries) => Ok(entries.clone()),
            MockRuntime::Unreachable => Err(CollectError::connectivity(
                "docker",
                "connection refused",
            )),
        }
    }
}

pub fn container(id: &str, name: &str) -> ContainerEntry {
    ContainerEntry {
        id: id.to_string(),
        name: name.to_string(),
        image_tags: vec!["redis:7".to_string()],
        state: "running".to_string(),
        ports: serde_json::Map::new(),
    }
}

pub fn fast_config() -> CollectorConfig {
    CollectorConfig::new()
        .with_cpu_sample_ms(0)
        .with_collector_timeout_ms(2000)
}

pub fn collector(
    host: MockHost,
    gpu: GpuCapability,
    runtime: Option<MockRuntime>,
    config: CollectorConfig,
) -> SystemCollector {
    SystemCollector::with_sources(
        Arc::new(host),
        Arc::new(gpu),
        runtime.map(|r| Arc::new(r) as Arc<dyn ContainerRuntime>),
        config,
    )
}
