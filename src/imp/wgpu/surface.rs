// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
#[cfg(feature = "app_window")]
use crate::entry_point::EntryPoint;
use crate::imp::Error;
use crate::imp::wgpu::BoundDevice;
use crate::imp::wgpu::readback::read_texture;
#[cfg(feature = "app_window")]
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

/// A texture to composite into this frame.
#[derive(Debug)]
pub struct AcquiredSurface {
    pub(super) view: wgpu::TextureView,
    frame: Option<wgpu::SurfaceTexture>,
}

impl AcquiredSurface {
    pub fn present(self) {
        if let Some(frame) = self.frame {
            frame.present();
        }
    }
}

#[cfg(feature = "app_window")]
/**
Creates a wgpu surface for a native window.

# Safety
The handles must stay valid for as long as the returned surface lives.
*/
pub unsafe fn create_surface(
    entry_point: &EntryPoint,
    raw_display_handle: RawDisplayHandle,
    raw_window_handle: RawWindowHandle,
) -> Result<wgpu::Surface<'static>, Error> {
    let target = wgpu::SurfaceTargetUnsafe::RawHandle {
        raw_display_handle,
        raw_window_handle,
    };
    let surface = unsafe { entry_point.0.0.create_surface_unsafe(target) }?;
    Ok(surface)
}

#[cfg(feature = "app_window")]
#[derive(Debug)]
pub struct WindowSurface {
    //surface must drop before the device it was configured with
    surface: wgpu::Surface<'static>,
    bound_device: BoundDevice,
    configuration: wgpu::SurfaceConfiguration,
}

#[cfg(feature = "app_window")]
impl WindowSurface {
    pub fn new(
        surface: wgpu::Surface<'static>,
        bound_device: &BoundDevice,
        width: u32,
        height: u32,
    ) -> Result<Self, Error> {
        let capabilities = surface.get_capabilities(bound_device.adapter());
        //prefer an sRGB format, like every other presentable surface we make
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(Error::IncompatibleSurface)?;
        let configuration = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 1,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
        };
        surface.configure(bound_device.device(), &configuration);
        Ok(WindowSurface {
            surface,
            bound_device: bound_device.clone(),
            configuration,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.configuration.format
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            //minimized; keep the last configuration
            return;
        }
        self.configuration.width = width;
        self.configuration.height = height;
        self.surface
            .configure(self.bound_device.device(), &self.configuration);
    }

    pub fn acquire(&mut self) -> Option<AcquiredSurface> {
        match self.surface.get_current_texture() {
            Ok(frame) => {
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Some(AcquiredSurface {
                    view,
                    frame: Some(frame),
                })
            }
            Err(e) => {
                logwise::warn_sync!(
                    "Could not acquire surface texture: {e}",
                    e = logwise::privacy::LogIt(&e)
                );
                if matches!(e, wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) {
                    self.surface
                        .configure(self.bound_device.device(), &self.configuration);
                }
                None
            }
        }
    }
}

/// Format of offscreen composite targets.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug)]
pub struct OffscreenSurface {
    bound_device: BoundDevice,
    texture: wgpu::Texture,
}

/// Clamps a requested offscreen size into `1..=limit` on both axes.
pub(crate) fn clamp_extent(width: u32, height: u32, limit: u32) -> (u32, u32) {
    (width.clamp(1, limit), height.clamp(1, limit))
}

fn offscreen_texture(bound_device: &BoundDevice, width: u32, height: u32) -> wgpu::Texture {
    let limit = bound_device.max_texture_dimension();
    let (clamped_width, clamped_height) = clamp_extent(width, height, limit);
    if (clamped_width, clamped_height) != (width, height) {
        logwise::warn_sync!(
            "Offscreen surface {width}x{height} clamped to {clamped_width}x{clamped_height}",
            width = width,
            height = height,
            clamped_width = clamped_width,
            clamped_height = clamped_height
        );
    }
    bound_device.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen surface"),
        size: wgpu::Extent3d {
            width: clamped_width,
            height: clamped_height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

impl OffscreenSurface {
    pub fn new(bound_device: &BoundDevice, width: u32, height: u32) -> Self {
        OffscreenSurface {
            bound_device: bound_device.clone(),
            texture: offscreen_texture(bound_device, width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let limit = self.bound_device.max_texture_dimension();
        if clamp_extent(width, height, limit) == (self.width(), self.height()) {
            return;
        }
        self.texture = offscreen_texture(&self.bound_device, width, height);
    }

    pub fn acquire(&mut self) -> Option<AcquiredSurface> {
        Some(AcquiredSurface {
            view: self
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
            frame: None,
        })
    }

    /// Composite pixels, RGBA8, rows top to bottom.
    pub async fn read_rgba(&self) -> Result<Vec<u8>, Error> {
        read_texture(
            &self.bound_device,
            &self.texture,
            wgpu::TextureAspect::All,
            4,
        )
        .await
    }
}
