use crate::error::{Result, ServeError};
use candle_core::Device;

/// Request for a specific device, used by pipeline builders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    #[default]
    Cpu,
    /// Select a specific CUDA device by index.
    Cuda(usize),
}

impl DeviceRequest {
    /// `None` means CPU.
    pub fn from_cuda_index(index: Option<usize>) -> Self {
        index.map_or(DeviceRequest::Cpu, DeviceRequest::Cuda)
    }

    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                ServeError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}
