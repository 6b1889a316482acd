//! Snapshot aggregation with per-collector failure isolation.

use crate::error::CollectError;
use crate::metrics::capability::GpuCapability;
use crate::metrics::collectors::{self, Subsystem};
use crate::metrics::config::CollectorConfig;
use crate::metrics::data::*;
use crate::metrics::docker::DockerRuntime;
use crate::metrics::host::LiveHost;
use crate::metrics::traits::{ContainerRuntime, HostSource};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs the collectors and assembles [`SystemSnapshot`]s.
///
/// Every public collection method is infallible: a collector that errors,
/// panics or exceeds its time bound yields that field's default value and a
/// warning carrying the subsystem name.
pub struct SystemCollector {
    host: Arc<dyn HostSource>,
    gpu: Arc<GpuCapability>,
    runtime: Option<Arc<dyn ContainerRuntime>>,
    config: CollectorConfig,
}

impl SystemCollector {
    /// Collector over the live host, probing the GPU library and connecting
    /// to the container runtime as enabled in `config`.
    pub fn new(config: CollectorConfig) -> Self {
        let gpu = if config.enable_gpu {
            GpuCapability::probe_vendor()
        } else {
            info!(subsystem = "accelerators", "GPU probing disabled");
            GpuCapability::unavailable()
        };

        let runtime = if config.enable_containers {
            match DockerRuntime::connect() {
                Ok(runtime) => Some(Arc::new(runtime) as Arc<dyn ContainerRuntime>),
                Err(err) => {
                    warn!(subsystem = "containers", error = %err, "Container runtime unavailable");
                    None
                }
            }
        } else {
            info!(subsystem = "containers", "Container queries disabled");
            None
        };

        Self::with_sources(Arc::new(LiveHost::new()), Arc::new(gpu), runtime, config)
    }

    /// Collector over explicit collaborators.
    pub fn with_sources(
        host: Arc<dyn HostSource>,
        gpu: Arc<GpuCapability>,
        runtime: Option<Arc<dyn ContainerRuntime>>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            host,
            gpu,
            runtime,
            config,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The GPU capability determined at startup.
    pub fn capability(&self) -> &GpuCapability {
        &self.gpu
    }

    /// Collect every subsystem, in a fixed order.
    pub async fn snapshot(&self) -> SystemSnapshot {
        debug!("Collecting system snapshot");

        SystemSnapshot {
            compute: self.cpu().await,
            memory: self.memory().await,
            storage: self.disks().await,
            interfaces: self.network().await,
            accelerators: self.gpus().await,
            containers: self.containers().await,
            sockets: self.ports().await,
            processes: self.processes().await,
        }
    }

    pub async fn cpu(&self) -> CpuRecord {
        let window = self.config.cpu_sample_window();
        let bound = self.config.collector_timeout() + window;
        self.run_host(Subsystem::Compute, bound, move |host| {
            collectors::cpu::collect(host, window)
        })
        .await
    }

    pub async fn memory(&self) -> MemoryRecord {
        self.run_host(Subsystem::Memory, self.config.collector_timeout(), |host| {
            collectors::memory::collect(host)
        })
        .await
    }

    pub async fn disks(&self) -> Vec<StorageRecord> {
        self.run_host(Subsystem::Storage, self.config.collector_timeout(), |host| {
            collectors::storage::collect(host)
        })
        .await
    }

    pub async fn network(&self) -> Vec<InterfaceRecord> {
        self.run_host(Subsystem::Interfaces, self.config.collector_timeout(), |host| {
            collectors::network::collect(host)
        })
        .await
    }

    pub async fn gpus(&self) -> Vec<AcceleratorRecord> {
        if !self.gpu.is_available() {
            return Vec::new();
        }
        let gpu = self.gpu.clone();
        let task = blocking(self.config.collector_timeout(), move || {
            Ok(collectors::gpu::collect(&gpu))
        });
        degrade(Subsystem::Accelerators, task.await)
    }

    pub async fn containers(&self) -> Vec<ContainerRecord> {
        let Some(runtime) = &self.runtime else {
            return Vec::new();
        };
        let bound = self.config.collector_timeout();
        let result = bounded(bound, collectors::containers::collect(runtime.as_ref())).await;
        degrade(Subsystem::Containers, result)
    }

    pub async fn ports(&self) -> Vec<PortRecord> {
        self.run_host(Subsystem::Sockets, self.config.collector_timeout(), |host| {
            collectors::ports::collect(host)
        })
        .await
    }

    pub async fn processes(&self) -> Vec<ProcessRecord> {
        self.run_host(Subsystem::Processes, self.config.collector_timeout(), |host| {
            collectors::processes::collect(host)
        })
        .await
    }

    /// Release the GPU library. Safe to call more than once.
    ///
    /// Waits at most one collector timeout for a GPU read still in flight.
    pub fn shutdown(&self) {
        self.gpu.shutdown_within(self.config.collector_timeout());
    }

    async fn run_host<T, F>(&self, subsystem: Subsystem, bound: Duration, f: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&dyn HostSource) -> Result<T, CollectError> + Send + 'static,
    {
        let host = self.host.clone();
        let result = blocking(bound, move || f(host.as_ref())).await;
        degrade(subsystem, result)
    }
}

/// Run `f` on the blocking pool, bounded by `bound`.
///
/// On timeout the task is left to finish in the background; its result is
/// discarded.
async fn blocking<T, F>(bound: Duration, f: F) -> Result<T, CollectError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CollectError> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    bounded(bound, async move {
        task.await.map_err(|e| CollectError::Task(e.to_string()))?
    })
    .await
}

async fn bounded<T>(
    bound: Duration,
    future: impl Future<Output = Result<T, CollectError>>,
) -> Result<T, CollectError> {
    timeout(bound, future)
        .await
        .unwrap_or(Err(CollectError::Timeout(bound)))
}

fn degrade<T: Default>(subsystem: Subsystem, result: Result<T, CollectError>) -> T {
    result.unwrap_or_else(|err| {
        warn!(subsystem = %subsystem, error = %err, "Collector failed, reporting empty value");
        T::default()
    })
}
