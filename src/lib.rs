//! # host_probe - host resource snapshots over HTTP
//!
//! A read-only JSON API reporting a point-in-time view of the machine it runs
//! on: CPU, memory, disks, network interfaces, NVIDIA GPUs, Docker containers,
//! open sockets and processes.
//!
//! ## Features
//!
//! - **Failure isolation**: each subsystem is collected independently; one that
//!   fails reports an empty value instead of failing the request
//! - **Optional collaborators**: the GPU library (cargo feature `nvml`) and the
//!   container runtime are detected at startup and degrade to `[]` when absent
//! - **Library + Binary**: use as a crate or standalone server
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use host_probe::{start_web_server, CollectorConfig, SystemCollector, WebConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collector = Arc::new(SystemCollector::new(CollectorConfig::default()));
//!     start_web_server(WebConfig::default(), collector).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod metrics;
pub mod web;

// Re-export public API
pub use error::{CollectError, Result, SystemError};
pub use metrics::{
    collector::SystemCollector,
    config::CollectorConfig,
    data::{
        AcceleratorRecord, ContainerRecord, CpuRecord, InterfaceRecord, MemoryRecord,
        PortRecord, ProcessRecord, Protocol, StorageRecord, SystemSnapshot,
    },
    GpuCapability,
};

pub use web::{start_web_server, WebConfig};

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 8000;

/// The default CPU utilization sampling window in milliseconds
pub const DEFAULT_CPU_SAMPLE_MS: u64 = 1000;

/// The default upper bound for one collector in milliseconds
pub const DEFAULT_COLLECTOR_TIMEOUT_MS: u64 = 5000;
