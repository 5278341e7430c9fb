// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//!Cross-platform device wrappers
use std::fmt::Formatter;
use std::sync::Arc;

use crate::config::DeviceSelector;
use crate::entry_point::EntryPoint;
use crate::imp;

///Cross-platform unbound device
pub(crate) struct UnboundDevice(pub(crate) crate::imp::UnboundDevice);
impl UnboundDevice {
    /// Picks an adapter according to `selector`, compatible with `surface` when given.
    pub(crate) async fn pick(
        selector: &DeviceSelector,
        surface: Option<&wgpu::Surface<'static>>,
        entry_point: &EntryPoint,
    ) -> Result<UnboundDevice, PickError> {
        crate::imp::UnboundDevice::pick(selector, surface, entry_point)
            .await
            .map(UnboundDevice)
            .map_err(PickError)
    }
}

#[derive(Debug)]
pub struct PickError(imp::Error);
impl std::fmt::Display for PickError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for PickError {}

///Cross-platform bound device
#[derive(Debug)]
pub struct BoundDevice(pub(crate) imp::BoundDevice);

#[derive(Debug)]
pub struct BindError(imp::Error);
impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for BindError {}

/// Either half of acquiring a device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error(transparent)]
    EntryPoint(#[from] crate::entry_point::EntryPointError),
    #[error(transparent)]
    Pick(#[from] PickError),
    #[error(transparent)]
    Bind(#[from] BindError),
}

impl BoundDevice {
    pub(crate) async fn bind(
        unbound_device: UnboundDevice,
        entry_point: Arc<EntryPoint>,
    ) -> Result<Self, BindError> {
        let bind = crate::imp::BoundDevice::bind(unbound_device, entry_point)
            .await
            .map_err(BindError)?;
        Ok(Self(bind))
    }

    /**
    Picks and binds a device with no surface attached.

    This is how headless runs and tests get a device.
    */
    pub async fn headless(selector: &DeviceSelector) -> Result<Self, DeviceError> {
        let entry_point = Arc::new(EntryPoint::new().await?);
        Self::for_entry_point(selector, None, entry_point).await
    }

    pub(crate) async fn for_entry_point(
        selector: &DeviceSelector,
        surface: Option<&wgpu::Surface<'static>>,
        entry_point: Arc<EntryPoint>,
    ) -> Result<Self, DeviceError> {
        let unbound_device = UnboundDevice::pick(selector, surface, &entry_point).await?;
        Ok(Self::bind(unbound_device, entry_point).await?)
    }

    /// Name of the adapter this device runs on.
    pub fn adapter_name(&self) -> String {
        self.0.adapter_name()
    }

    /// Largest width or height a texture may have.  Offscreen surfaces are clamped to it.
    pub fn max_texture_dimension(&self) -> u32 {
        self.0.max_texture_dimension()
    }
}

// Boilerplate implementations

impl Clone for BoundDevice {
    fn clone(&self) -> Self {
        // resources are shared via Arc in the backend
        Self(self.0.clone())
    }
}
