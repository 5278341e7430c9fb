// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Drives the pipeline from host callbacks.

A [`FrameDriver`] is built once, which allocates everything and, for one-shot
configurations, records.  The host then calls [`FrameHost::on_frame`] on every display
tick and [`FrameHost::on_resize`] whenever its drawable changes size.

```no_run
# test_executors::sleep_on(async {
use raster_order::config::{CanvasSize, Configuration, DeviceSelector};
use raster_order::images::BoundDevice;
use raster_order::images::driver::{FrameDriver, FrameHost};
use raster_order::images::surface::{OffscreenSurface, SurfaceProvider};

let config = Configuration::default().with_canvas_size(CanvasSize::new(64, 64));
let device = BoundDevice::headless(&DeviceSelector::SystemDefault).await.unwrap();
let mut surface = OffscreenSurface::new(&device, 128, 64);
let mut driver = FrameDriver::new(&device, config, surface.format()).await.unwrap();
driver.on_frame(&mut surface);
# });
```
*/
use std::fmt::Formatter;

use crate::config::Configuration;
use crate::images::clock::AnimationClock;
use crate::images::device::BoundDevice;
use crate::images::fence::FenceSchedule;
use crate::images::surface::SurfaceProvider;
use crate::imp;
use crate::software::{OrderIndexMap, RevealMask};

/// Callbacks a host window or loop delivers.
pub trait FrameHost {
    /// The drawable changed size.  The canvas the variants are recorded at does not.
    fn on_resize(&mut self, width: u32, height: u32);
    /// Time to draw a frame into `surface`.
    fn on_frame(&mut self, surface: &mut dyn SurfaceProvider);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Resources are being created.
    Initializing,
    /// Every frame replays, and re-records when live.
    SteadyState,
}

/// Fatal failure while building a [`FrameDriver`].
#[derive(Debug)]
pub struct InitError(imp::Error);
impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for InitError {}

#[derive(Debug)]
pub struct ReadbackError(imp::Error);
impl std::fmt::Display for ReadbackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
impl std::error::Error for ReadbackError {}

fn check_schedule(schedule: &FenceSchedule) {
    if let Err(e) = schedule.validate() {
        logwise::error_sync!(
            "Recording broke the fence protocol: {e}",
            e = logwise::privacy::LogIt(&e)
        );
        debug_assert!(false, "recording broke the fence protocol: {e}");
    }
}

#[derive(Debug)]
pub struct FrameDriver {
    config: Configuration,
    renderer: imp::Renderer,
    clock: AnimationClock,
    state: DriverState,
    pending_resize: Option<(u32, u32)>,
    last_schedule: Option<FenceSchedule>,
    frames: u64,
}

impl FrameDriver {
    /**
    Allocates every resource and, unless `config` is live, records once.

    `surface_format` is the format of the textures the surface provider will hand out.
    */
    pub async fn new(
        bound_device: &BoundDevice,
        config: Configuration,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, InitError> {
        logwise::info_sync!(
            "Initializing with {config}",
            config = logwise::privacy::LogIt(&config)
        );
        let renderer = imp::Renderer::new(&bound_device.0, &config, surface_format)
            .await
            .map_err(InitError)?;
        let clock = AnimationClock::start(config.reveal_seconds(), config.canvas_size());
        let mut driver = FrameDriver {
            config,
            renderer,
            clock,
            state: DriverState::Initializing,
            pending_resize: None,
            last_schedule: None,
            frames: 0,
        };
        if !driver.config.live() {
            let schedule = driver.renderer.record();
            check_schedule(&schedule);
            driver.last_schedule = Some(schedule);
        }
        //the reveal starts once recording is in flight
        driver.clock = AnimationClock::start(
            driver.config.reveal_seconds(),
            driver.config.canvas_size(),
        );
        driver.state = DriverState::SteadyState;
        Ok(driver)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fence events of the most recent recording.
    pub fn last_schedule(&self) -> Option<&FenceSchedule> {
        self.last_schedule.as_ref()
    }

    /**
    Draws one frame at an explicit threshold instead of the clock's.

    Everything else matches [`FrameHost::on_frame`].
    */
    pub fn frame_at(&mut self, surface: &mut dyn SurfaceProvider, threshold: u32) {
        if let Some((width, height)) = self.pending_resize.take() {
            surface.resize(width, height);
        }
        let acquired = surface.acquire();
        if acquired.is_none() {
            logwise::warn_sync!("No surface this frame; skipping presentation");
        }
        let schedule = self.renderer.frame(
            self.config.live(),
            threshold,
            acquired.as_ref().map(|surface| &surface.0),
        );
        if let Some(schedule) = schedule {
            check_schedule(&schedule);
            self.last_schedule = Some(schedule);
        }
        if let Some(acquired) = acquired {
            acquired.present();
        }
        self.frames += 1;
        logwise::trace_sync!(
            "frame {frame} threshold {threshold}",
            frame = self.frames,
            threshold = threshold
        );
    }

    /// Reads back the order indices of the variant at `variant_index`.
    pub async fn read_order_indices(
        &self,
        variant_index: usize,
    ) -> Result<OrderIndexMap, ReadbackError> {
        self.renderer
            .read_order_indices(variant_index)
            .await
            .map_err(ReadbackError)
    }

    /// Reads back the reveal of the most recent frame for the variant at `variant_index`.
    pub async fn read_reveal(&self, variant_index: usize) -> Result<RevealMask, ReadbackError> {
        self.renderer
            .read_reveal(variant_index)
            .await
            .map_err(ReadbackError)
    }
}

impl FrameHost for FrameDriver {
    fn on_resize(&mut self, width: u32, height: u32) {
        logwise::info_sync!(
            "Resized to {width}x{height}",
            width = width,
            height = height
        );
        self.pending_resize = Some((width, height));
    }

    fn on_frame(&mut self, surface: &mut dyn SurfaceProvider) {
        let threshold = self.clock.threshold();
        self.frame_at(surface, threshold);
    }
}
