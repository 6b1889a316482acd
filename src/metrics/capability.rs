//! One-time detection of the GPU management library.
//!
//! The library is initialized once at startup and never retried. The handle is
//! shared read-only by every request and released exactly once at shutdown.

use crate::error::CollectError;
use crate::metrics::traits::AcceleratorLibrary;
use parking_lot::RwLock;
use std::time::Duration;
use tracing::{info, warn};

/// How long [`GpuCapability::shutdown`] waits for in-flight readers.
pub const RELEASE_WAIT: Duration = Duration::from_secs(2);

/// Availability of the accelerator library plus the live handle.
pub struct GpuCapability {
    available: bool,
    device_count: u32,
    library: RwLock<Option<Box<dyn AcceleratorLibrary>>>,
}

impl GpuCapability {
    /// Initialize the library with `init` and count devices.
    ///
    /// Any failure yields an unavailable capability; nothing is raised.
    pub fn probe<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn AcceleratorLibrary>, CollectError>,
    {
        let library = match init() {
            Ok(library) => library,
            Err(err) => {
                warn!(subsystem = "accelerators", error = %err, "GPU library initialization failed");
                return Self::unavailable();
            }
        };

        match library.device_count() {
            Ok(device_count) => {
                info!(subsystem = "accelerators", device_count, "GPU library initialized");
                Self {
                    available: true,
                    device_count,
                    library: RwLock::new(Some(library)),
                }
            }
            Err(err) => {
                warn!(subsystem = "accelerators", error = %err, "Failed to count GPU devices");
                if let Err(err) = library.shutdown() {
                    warn!(subsystem = "accelerators", error = %err, "Failed to release GPU library");
                }
                Self::unavailable()
            }
        }
    }

    /// Probe the vendor library compiled into this build.
    pub fn probe_vendor() -> Self {
        Self::probe(init_vendor_library)
    }

    /// A capability that reports no accelerators.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            device_count: 0,
            library: RwLock::new(None),
        }
    }

    /// `(available, device_count)` as determined at probe time.
    pub fn status(&self) -> (bool, u32) {
        (self.available, self.device_count)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn device_count(&self) -> u32 {
        self.device_count
    }

    /// Run `f` against the library handle.
    ///
    /// Returns `None` when the library is unavailable or already released.
    pub fn with_library<T>(&self, f: impl FnOnce(&dyn AcceleratorLibrary) -> T) -> Option<T> {
        if !self.available {
            return None;
        }
        let guard = self.library.read();
        guard.as_ref().map(|library| f(library.as_ref()))
    }

    /// Release the library handle. A no-op when it was never acquired or
    /// has already been released.
    pub fn shutdown(&self) {
        self.shutdown_within(RELEASE_WAIT);
    }

    /// Release the library handle, waiting at most `wait` for in-flight
    /// readers. A reader stuck inside the library keeps the handle alive;
    /// the release is then skipped so shutdown can proceed.
    pub fn shutdown_within(&self, wait: Duration) {
        if !self.available {
            return;
        }
        let Some(mut guard) = self.library.try_write_for(wait) else {
            warn!(
                subsystem = "accelerators",
                wait_ms = wait.as_millis() as u64,
                "GPU library busy, skipping release"
            );
            return;
        };
        let taken = guard.take();
        drop(guard);
        if let Some(library) = taken {
            release(library);
        }
    }
}

impl Drop for GpuCapability {
    fn drop(&mut self) {
        // No other reference exists, so no reader can hold the lock
        if let Some(library) = self.library.get_mut().take() {
            release(library);
        }
    }
}

fn release(library: Box<dyn AcceleratorLibrary>) {
    match library.shutdown() {
        Ok(()) => info!(subsystem = "accelerators", "GPU library released"),
        Err(err) => {
            warn!(subsystem = "accelerators", error = %err, "Failed to release GPU library")
        }
    }
}

#[cfg(feature = "nvml")]
fn init_vendor_library() -> Result<Box<dyn AcceleratorLibrary>, CollectError> {
    crate::metrics::nvml::NvmlLibrary::init()
        .map(|library| Box::new(library) as Box<dyn AcceleratorLibrary>)
}

#[cfg(not(feature = "nvml"))]
fn init_vendor_library() -> Result<Box<dyn AcceleratorLibrary>, CollectError> {
    Err(CollectError::unavailable(
        "accelerators",
        "built without NVML support",
    ))
}
