//! Host metrics collection and data structures.
//!
//! Collaborators ([`HostSource`], [`AcceleratorLibrary`], [`ContainerRuntime`])
//! supply raw readings, the [`collectors`] turn them into records and the
//! [`SystemCollector`] assembles them into a [`SystemSnapshot`].

pub mod capability;
pub mod collector;
pub mod collectors;
pub mod config;
pub mod data;
pub mod docker;
pub mod host;
pub mod procfs;
pub mod traits;
pub mod units;

#[cfg(feature = "nvml")]
pub mod nvml;

// Re-export commonly used items
pub use capability::GpuCapability;
pub use collector::SystemCollector;
pub use config::CollectorConfig;
pub use data::SystemSnapshot;
pub use traits::{AcceleratorLibrary, ContainerRuntime, HostSource};
