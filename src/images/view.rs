// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Native windows, via app_window.
use std::sync::Arc;

use crate::config::DeviceSelector;
use crate::entry_point::{EntryPoint, EntryPointError};
use crate::images::device::{BoundDevice, DeviceError};
use crate::images::surface::{SurfaceError, WindowSurface};
use crate::imp;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    EntryPoint(#[from] EntryPointError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A window's drawable area.
pub struct View(app_window::surface::Surface);

impl View {
    /**
    Creates the view from an app_window surface.
    */
    pub fn from_surface(surface: app_window::surface::Surface) -> Self {
        Self(surface)
    }

    /// Drawable size in physical pixels.
    pub async fn size(&self) -> (u32, u32) {
        let (width, height, scale) = self.0.size_scale().await;
        (
            (width as f64 * scale) as u32,
            (height as f64 * scale) as u32,
        )
    }

    /**
    Picks a device that can present to this view, and configures a surface for it.
    */
    pub async fn bind(
        &self,
        selector: &DeviceSelector,
    ) -> Result<(BoundDevice, WindowSurface), ViewError> {
        let entry_point = Arc::new(EntryPoint::new().await?);
        //SAFETY: the window outlives the surface; both live for the whole run
        let surface = unsafe {
            imp::create_surface(
                &entry_point,
                self.0.raw_display_handle(),
                self.0.raw_window_handle(),
            )
        }
        .map_err(SurfaceError)?;
        let device = BoundDevice::for_entry_point(selector, Some(&surface), entry_point).await?;
        let (width, height) = self.size().await;
        let window_surface = WindowSurface::new(surface, &device, width, height)?;
        Ok((device, window_surface))
    }
}
