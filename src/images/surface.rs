// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Where composited frames go.

A [`SurfaceProvider`] hands the frame driver one [`AcquiredSurface`] per frame, or nothing
when no texture is available this tick.  `WindowSurface` (with the `app_window` feature)
presents to a native window;
[`OffscreenSurface`] renders into a texture that can be read back, for headless runs and
tests.
*/
use std::fmt::Formatter;

use crate::images::device::BoundDevice;
use crate::imp;

/// A texture to composite one frame into.
#[derive(Debug)]
pub struct AcquiredSurface(pub(crate) imp::AcquiredSurface);

impl AcquiredSurface {
    /// Shows the frame.  Offscreen frames have nothing to present.
    pub fn present(self) {
        self.0.present()
    }
}

/// Source of composite targets, one per frame.
pub trait SurfaceProvider {
    /// Format every acquired texture has.
    fn format(&self) -> wgpu::TextureFormat;
    /// Adopts a new drawable size.  Sizes with a zero dimension are ignored.
    fn resize(&mut self, width: u32, height: u32);
    /// The texture for this frame, if one can be had.
    fn acquire(&mut self) -> Option<AcquiredSurface>;
}

#[derive(Debug)]
pub struct SurfaceError(pub(crate) imp::Error);
impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for SurfaceError {}

/// A configured native window surface.
#[cfg(feature = "app_window")]
#[derive(Debug)]
pub struct WindowSurface(imp::WindowSurface);

#[cfg(feature = "app_window")]
impl WindowSurface {
    pub(crate) fn new(
        surface: wgpu::Surface<'static>,
        bound_device: &BoundDevice,
        width: u32,
        height: u32,
    ) -> Result<Self, SurfaceError> {
        imp::WindowSurface::new(surface, &bound_device.0, width, height)
            .map(WindowSurface)
            .map_err(SurfaceError)
    }
}

#[cfg(feature = "app_window")]
impl SurfaceProvider for WindowSurface {
    fn format(&self) -> wgpu::TextureFormat {
        self.0.format()
    }
    fn resize(&mut self, width: u32, height: u32) {
        self.0.resize(width, height)
    }
    fn acquire(&mut self) -> Option<AcquiredSurface> {
        self.0.acquire().map(AcquiredSurface)
    }
}

/**
A texture standing in for a window.

```no_run
# test_executors::sleep_on(async {
use raster_order::config::DeviceSelector;
use raster_order::images::BoundDevice;
use raster_order::images::surface::{OffscreenSurface, SurfaceProvider};

let device = BoundDevice::headless(&DeviceSelector::SystemDefault).await.unwrap();
let mut surface = OffscreenSurface::new(&device, 64, 32);
assert!(surface.acquire().is_some());
let pixels = surface.read_rgba().await.unwrap();
assert_eq!(pixels.len(), 64 * 32 * 4);
# });
```
*/
#[derive(Debug)]
pub struct OffscreenSurface(imp::OffscreenSurface);

impl OffscreenSurface {
    /// Sizes past [`BoundDevice::max_texture_dimension`] are clamped to it.
    pub fn new(bound_device: &BoundDevice, width: u32, height: u32) -> Self {
        OffscreenSurface(imp::OffscreenSurface::new(&bound_device.0, width, height))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// The last composite, RGBA8, rows top to bottom.
    pub async fn read_rgba(&self) -> Result<Vec<u8>, SurfaceError> {
        self.0.read_rgba().await.map_err(SurfaceError)
    }
}

impl SurfaceProvider for OffscreenSurface {
    fn format(&self) -> wgpu::TextureFormat {
        imp::OFFSCREEN_FORMAT
    }
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.0.resize(width, height)
    }
    fn acquire(&mut self) -> Option<AcquiredSurface> {
        self.0.acquire().map(AcquiredSurface)
    }
}
