// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("{0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("No such adapter")]
    NoSuchAdapter,
    #[cfg(feature = "app_window")]
    #[error("Surface offers no formats on this adapter")]
    IncompatibleSurface,
    #[error("Adapter {0} cannot write storage buffers from fragment shaders")]
    MissingFragmentStorage(String),
    #[error("{0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("Canvas {width}x{height} exceeds the device texture limit of {limit}")]
    CanvasTooLarge { width: u32, height: u32, limit: u32 },
    #[error("Validation failed while creating {stage}: {message}")]
    Validation { stage: &'static str, message: String },
    #[error("No variant at index {0}")]
    NoSuchVariant(usize),
    #[error("Failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("Device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),
}
