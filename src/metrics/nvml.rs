//! NVIDIA GPUs through NVML, the library behind `nvidia-smi`.

use crate::error::CollectError;
use crate::metrics::traits::{AcceleratorLibrary, AcceleratorReading};
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::error::NvmlError;
use nvml_wrapper::Nvml;

/// Initialized NVML handle. NVML must be initialized once only.
pub struct NvmlLibrary {
    nvml: Nvml,
}

impl NvmlLibrary {
    pub fn init() -> Result<Self, CollectError> {
        Nvml::init()
            .map(|nvml| Self { nvml })
            .map_err(|e| CollectError::unavailable("accelerators", e.to_string()))
    }
}

fn device_error(index: u32, err: NvmlError) -> CollectError {
    CollectError::unavailable("accelerators", format!("GPU {index}: {err}"))
}

impl AcceleratorLibrary for NvmlLibrary {
    fn device_count(&self) -> Result<u32, CollectError> {
        self.nvml
            .device_count()
            .map_err(|e| CollectError::unavailable("accelerators", e.to_string()))
    }

    fn device(&self, index: u32) -> Result<AcceleratorReading, CollectError> {
        let device = self
            .nvml
            .device_by_index(index)
            .map_err(|e| device_error(index, e))?;

        let memory = device.memory_info().map_err(|e| device_error(index, e))?;
        let utilization = device
            .utilization_rates()
            .map_err(|e| device_error(index, e))?;
        let temperature = device
            .temperature(TemperatureSensor::Gpu)
            .map_err(|e| device_error(index, e))?;
        let name = device.name().map_err(|e| device_error(index, e))?;

        Ok(AcceleratorReading {
            name,
            temperature,
            memory_total: memory.total,
            memory_used: memory.used,
            memory_free: memory.free,
            utilization: utilization.gpu,
        })
    }

    fn shutdown(self: Box<Self>) -> Result<(), CollectError> {
        self.nvml
            .shutdown()
            .map_err(|e| CollectError::unavailable("accelerators", e.to_string()))
    }
}
