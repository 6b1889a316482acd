//! Live host metrics from sysinfo and, on Linux, `/proc`.

use crate::error::CollectError;
use crate::metrics::data::Protocol;
use crate::metrics::traits::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, Pid, Process,
    ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, RefreshKind, System, Users,
    MINIMUM_CPU_UPDATE_INTERVAL,
};

#[cfg(target_os = "linux")]
use crate::metrics::procfs;
#[cfg(target_os = "linux")]
use std::fs;

/// [`HostSource`] backed by the running kernel.
pub struct LiveHost {
    /// Kept across calls so per-process CPU usage is a delta between polls.
    system: Mutex<System>,
    users: Mutex<Users>,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    proc_root: PathBuf,
}

impl LiveHost {
    pub fn new() -> Self {
        Self::with_proc_root("/proc")
    }

    /// Read Linux tables from a different procfs mount (e.g. `/host/proc`).
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            system: Mutex::new(System::new()),
            users: Mutex::new(Users::new_with_refreshed_list()),
            proc_root: proc_root.into(),
        }
    }

    fn cpu_system() -> System {
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()))
    }

    fn process_entry(&self, process: &Process, total_memory: u64) -> Result<ProcessEntry, CollectError> {
        let pid = process.pid().as_u32();
        let sched = self.sched_fields(pid)?;

        #[cfg(unix)]
        let uid = process.user_id().map(|uid| **uid);
        #[cfg(not(unix))]
        let uid = None;

        let memory_percent = if total_memory > 0 {
            Some((process.memory() as f64 / total_memory as f64 * 100.0) as f32)
        } else {
            None
        };

        Ok(ProcessEntry {
            pid,
            name: Some(process.name().to_string_lossy().into_owned()),
            username: None,
            uid,
            status: Some(status_name(process.status()).to_string()),
            cpu_percent: Some(process.cpu_usage()),
            memory_percent,
            create_time: Some(process.start_time() as f64),
            cmdline: Some(
                process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect(),
            ),
            num_threads: sched
                .map(|s| s.1)
                .or_else(|| process.tasks().map(|tasks| tasks.len() as u32)),
            nice: sched.map(|s| s.0),
        })
    }

    /// `(nice, num_threads)` from `/proc/[pid]/stat`.
    #[cfg(target_os = "linux")]
    fn sched_fields(&self, pid: u32) -> Result<Option<(i32, u32)>, CollectError> {
        let path = self.proc_root.join(pid.to_string()).join("stat");
        match fs::read_to_string(&path) {
            Ok(content) => Ok(procfs::parse_stat_fields(&content)
                .ok()
                .map(|f| (f.nice, f.num_threads))),
            Err(err) => match CollectError::from_process_io(err, pid) {
                transient @ CollectError::ProcessTransient { .. } => Err(transient),
                _ => Ok(None),
            },
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn sched_fields(&self, _pid: u32) -> Result<Option<(i32, u32)>, CollectError> {
        Ok(None)
    }

    /// Map socket inode to owning pid by walking `/proc/[pid]/fd`.
    #[cfg(target_os = "linux")]
    fn socket_owners(&self) -> HashMap<u64, u32> {
        let mut owners = HashMap::new();
        let Ok(entries) = fs::read_dir(&self.proc_root) else {
            return owners;
        };

        for entry in entries.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|n| n.parse::<u32>().ok()) else {
                continue;
            };
            // Other users' fds are unreadable without privileges
            let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
                continue;
            };
            for fd in fds.flatten() {
                let inode = fs::read_link(fd.path())
                    .ok()
                    .and_then(|target| target.to_str().and_then(procfs::parse_socket_inode));
                if let Some(inode) = inode {
                    owners.entry(inode).or_insert(pid);
                }
            }
        }

        owners
    }
}

impl Default for LiveHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase status names as used by common process tools.
fn status_name(status: ProcessStatus) -> &'static str {
    match status {
        ProcessStatus::Run => "running",
        ProcessStatus::Sleep => "sleeping",
        ProcessStatus::Idle => "idle",
        ProcessStatus::Stop => "stopped",
        ProcessStatus::Zombie => "zombie",
        ProcessStatus::Tracing => "tracing-stop",
        ProcessStatus::Dead => "dead",
        ProcessStatus::Wakekill => "wake-kill",
        ProcessStatus::Waking => "waking",
        ProcessStatus::Parked => "parked",
        ProcessStatus::LockBlocked => "locked",
        ProcessStatus::UninterruptibleDiskSleep => "disk-sleep",
        _ => "unknown",
    }
}

#[cfg(unix)]
fn statvfs(path: &std::path::Path) -> std::io::Result<PartitionUsage> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    // SAFETY: statvfs only writes into the zeroed struct we own.
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }

    let fragment = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * fragment;
    let free_for_root = stat.f_bfree as u64 * fragment;
    let available = stat.f_bavail as u64 * fragment;

    Ok(PartitionUsage {
        total,
        used: total.saturating_sub(free_for_root),
        free: available,
    })
}

impl HostSource for LiveHost {
    fn cpu_identity(&self) -> Result<CpuIdentity, CollectError> {
        let system = Self::cpu_system();
        let cpus = system.cpus();
        if cpus.is_empty() {
            return Err(CollectError::unavailable("compute", "No CPU information available"));
        }

        Ok(CpuIdentity {
            model: cpus[0].brand().trim().to_string(),
            architecture: System::cpu_arch(),
            physical_cores: System::physical_core_count().unwrap_or(0) as u32,
            logical_cores: cpus.len() as u32,
        })
    }

    fn cpu_sample(&self, window: Duration) -> Result<CpuSample, CollectError> {
        let mut system = Self::cpu_system();
        system.refresh_cpu_usage();
        std::thread::sleep(window.max(MINIMUM_CPU_UPDATE_INTERVAL));
        system.refresh_cpu_all();

        let cpus = system.cpus();
        Ok(CpuSample {
            utilization: system.global_cpu_usage(),
            per_core: cpus.iter().map(|cpu| cpu.cpu_usage()).collect(),
            frequencies: cpus.iter().map(|cpu| cpu.frequency() as f64).collect(),
        })
    }

    fn sensors(&self) -> Vec<SensorReading> {
        Components::new_with_refreshed_list()
            .iter()
            .map(|component| SensorReading {
                label: component.label().to_string(),
                celsius: component.temperature(),
            })
            .collect()
    }

    fn memory(&self) -> Result<MemoryCounters, CollectError> {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        Ok(MemoryCounters {
            total: system.total_memory(),
            used: system.used_memory(),
            available: system.available_memory(),
        })
    }

    fn partitions(&self) -> Result<Vec<Partition>, CollectError> {
        Ok(Disks::new_with_refreshed_list()
            .iter()
            .map(|disk| Partition {
                device: disk.name().to_string_lossy().into_owned(),
                mountpoint: disk.mount_point().to_string_lossy().into_owned(),
                fstype: disk.file_system().to_string_lossy().into_owned(),
            })
            .collect())
    }

    #[cfg(unix)]
    fn partition_usage(&self, partition: &Partition) -> Result<PartitionUsage, CollectError> {
        statvfs(std::path::Path::new(&partition.mountpoint))
            .map_err(|e| CollectError::from_io(e, &partition.mountpoint))
    }

    #[cfg(not(unix))]
    fn partition_usage(&self, partition: &Partition) -> Result<PartitionUsage, CollectError> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .iter()
            .find(|disk| disk.mount_point().to_string_lossy() == partition.mountpoint)
            .ok_or_else(|| CollectError::Io(format!("{}: not mounted", partition.mountpoint)))?;
        let total = disk.total_space();
        let free = disk.available_space();
        Ok(PartitionUsage {
            total,
            used: total.saturating_sub(free),
            free,
        })
    }

    #[cfg(target_os = "linux")]
    fn interface_counters(&self) -> Result<Vec<InterfaceCounters>, CollectError> {
        let path = self.proc_root.join("net").join("dev");
        let content =
            fs::read_to_string(&path).map_err(|e| CollectError::from_io(e, path.display().to_string()))?;
        Ok(procfs::parse_net_dev(&content))
    }

    #[cfg(not(target_os = "linux"))]
    fn interface_counters(&self) -> Result<Vec<InterfaceCounters>, CollectError> {
        // No per-direction drop counters outside Linux
        Ok(Networks::new_with_refreshed_list()
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.clone(),
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
                packets_sent: data.total_packets_transmitted(),
                packets_recv: data.total_packets_received(),
                errin: data.total_errors_on_received(),
                errout: data.total_errors_on_transmitted(),
                dropin: 0,
                dropout: 0,
            })
            .collect())
    }

    fn interface_addresses(&self) -> Result<HashMap<String, Vec<InterfaceAddress>>, CollectError> {
        Ok(Networks::new_with_refreshed_list()
            .iter()
            .map(|(name, data)| {
                let mut addresses: Vec<InterfaceAddress> = data
                    .ip_networks()
                    .iter()
                    .map(|network| InterfaceAddress {
                        family: if network.addr.is_ipv4() {
                            AddressFamily::Inet
                        } else {
                            AddressFamily::Inet6
                        },
                        address: network.addr.to_string(),
                    })
                    .collect();
                addresses.push(InterfaceAddress {
                    family: AddressFamily::Link,
                    address: data.mac_address().to_string(),
                });
                (name.clone(), addresses)
            })
            .collect())
    }

    #[cfg(target_os = "linux")]
    fn socket_table(&self, protocol: Protocol) -> Result<Vec<SocketEntry>, CollectError> {
        let tables = match protocol {
            Protocol::Tcp => ["tcp", "tcp6"],
            Protocol::Udp => ["udp", "udp6"],
        };
        let owners = self.socket_owners();
        let mut entries = Vec::new();

        for table in tables {
            let path = self.proc_root.join("net").join(table);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                // IPv6 disabled
                Err(e) if e.kind() == std::io::ErrorKind::NotFound && table.ends_with('6') => continue,
                Err(e) => return Err(CollectError::from_io(e, path.display().to_string())),
            };

            entries.extend(procfs::parse_socket_table(&content).into_iter().map(|line| {
                let status = match protocol {
                    Protocol::Tcp => procfs::tcp_state_name(line.state),
                    Protocol::Udp => "NONE",
                };
                SocketEntry {
                    local: line.local,
                    remote: line.remote,
                    status: status.to_string(),
                    pid: owners.get(&line.inode).copied(),
                }
            }));
        }

        Ok(entries)
    }

    #[cfg(not(target_os = "linux"))]
    fn socket_table(&self, _protocol: Protocol) -> Result<Vec<SocketEntry>, CollectError> {
        Err(CollectError::Unsupported("socket tables"))
    }

    fn process_name(&self, pid: u32) -> Result<String, CollectError> {
        let pid = Pid::from_u32(pid);
        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        system
            .process(pid)
            .map(|process| process.name().to_string_lossy().into_owned())
            .ok_or_else(|| CollectError::transient(pid.as_u32(), "no such process"))
    }

    fn processes(&self) -> Result<Vec<Result<ProcessEntry, CollectError>>, CollectError> {
        *self.users.lock() = Users::new_with_refreshed_list();

        let mut system = self.system.lock();
        system.refresh_memory();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        let total_memory = system.total_memory();

        let mut processes: Vec<&Process> = system.processes().values().collect();
        processes.sort_by_key(|process| process.pid());

        Ok(processes
            .into_iter()
            .map(|process| self.process_entry(process, total_memory))
            .collect())
    }

    #[cfg(unix)]
    fn lookup_user(&self, uid: u32) -> Option<String> {
        self.users
            .lock()
            .list()
            .iter()
            .find(|user| **user.id() == uid)
            .map(|user| user.name().to_string())
    }

    #[cfg(not(unix))]
    fn lookup_user(&self, _uid: u32) -> Option<String> {
        None
    }
}
