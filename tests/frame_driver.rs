// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Drives frames into offscreen surfaces the way a host window would.

Like the recording tests these need a GPU and pass with a message when there is none.
*/

use raster_order::config::{CanvasSize, Configuration, DeviceSelector};
use raster_order::images::surface::{AcquiredSurface, OffscreenSurface, SurfaceProvider};
use raster_order::images::{BoundDevice, DriverState, FrameDriver, FrameHost};
use raster_order::pixel_formats::OutputKind;
use raster_order::software::{RevealMask, summarize};
use raster_order::variant::TestVariant;

use test_executors::async_test;

const CANVAS: CanvasSize = CanvasSize::new(8, 8);

async fn device() -> Option<BoundDevice> {
    match BoundDevice::headless(&DeviceSelector::SystemDefault).await {
        Ok(device) => Some(device),
        Err(e) => {
            println!("skipping, no usable adapter: {e}");
            None
        }
    }
}

fn config(live: bool, flip: bool) -> Configuration {
    Configuration::default()
        .with_live(live)
        .with_flip(flip)
        .with_output(OutputKind::Color)
        .with_canvas_size(CANVAS)
        .with_variants(&TestVariant::DEFAULT_PAIR)
}

/// Surface exactly one canvas wide per strip, so composite pixels map 1:1 onto reveal texels.
fn exact_surface(device: &BoundDevice) -> OffscreenSurface {
    OffscreenSurface::new(
        device,
        CANVAS.width() * TestVariant::DEFAULT_PAIR.len() as u32,
        CANVAS.height(),
    )
}

/// Red channel of every composite pixel, row-major.
async fn composite_red(surface: &OffscreenSurface) -> Vec<u8> {
    let rgba = surface.read_rgba().await.expect("readback");
    assert_eq!(
        rgba.len(),
        surface.width() as usize * surface.height() as usize * 4
    );
    rgba.chunks_exact(4).map(|pixel| pixel[0]).collect()
}

/// A host with no drawable.
struct NoSurface;

impl SurfaceProvider for NoSurface {
    fn format(&self) -> wgpu::TextureFormat {
        wgpu::TextureFormat::Rgba8Unorm
    }
    fn resize(&mut self, _width: u32, _height: u32) {}
    fn acquire(&mut self) -> Option<AcquiredSurface> {
        None
    }
}

#[async_test]
async fn one_shot_records_during_init() {
    logwise::info_sync!("Starting one_shot_records_during_init");
    let Some(device) = device().await else { return };
    let surface = exact_surface(&device);
    let driver = FrameDriver::new(&device, config(false, false), surface.format())
        .await
        .expect("driver");
    assert_eq!(driver.state(), DriverState::SteadyState);
    assert_eq!(driver.frames(), 0);
    assert!(driver.last_schedule().is_some());
}

#[async_test]
async fn live_records_every_frame() {
    logwise::info_sync!("Starting live_records_every_frame");
    let Some(device) = device().await else { return };
    let mut surface = exact_surface(&device);
    let mut driver = FrameDriver::new(&device, config(true, false), surface.format())
        .await
        .expect("driver");
    assert_eq!(driver.state(), DriverState::SteadyState);
    assert!(driver.last_schedule().is_none());
    driver.on_frame(&mut surface);
    driver.on_frame(&mut surface);
    assert_eq!(driver.frames(), 2);
    let schedule = driver.last_schedule().expect("live frames record");
    assert!(schedule.validate().is_ok());
}

#[async_test]
async fn live_recordings_restart_the_counter() {
    logwise::info_sync!("Starting live_recordings_restart_the_counter");
    let Some(device) = device().await else { return };
    for output in [OutputKind::Color, OutputKind::Depth] {
        let mut surface = exact_surface(&device);
        let live = config(true, false).with_output(output);
        let mut driver = FrameDriver::new(&device, live, surface.format())
            .await
            .expect("driver");
        //the first recording would pass on a freshly zeroed buffer alone
        for _ in 0..3 {
            driver.on_frame(&mut surface);
        }
        for (i, variant) in TestVariant::DEFAULT_PAIR.iter().enumerate() {
            let summary = summarize(&driver.read_order_indices(i).await.expect("readback"));
            assert!(summary.is_dense(), "{variant} {output:?}: {summary:?}");
            assert_eq!(
                summary.max_index,
                Some(CANVAS.pixel_count() as u32 - 1),
                "{variant} {output:?}"
            );
        }
    }
}

#[async_test]
async fn offscreen_surfaces_stay_within_the_texture_limit() {
    logwise::info_sync!("Starting offscreen_surfaces_stay_within_the_texture_limit");
    let Some(device) = device().await else { return };
    let limit = device.max_texture_dimension();
    let mut surface = OffscreenSurface::new(&device, limit.saturating_add(1), 1);
    assert_eq!((surface.width(), surface.height()), (limit, 1));

    let mut driver = FrameDriver::new(&device, config(false, false), surface.format())
        .await
        .expect("driver");
    driver.on_resize(limit.saturating_mul(3), 2);
    driver.on_frame(&mut surface);
    assert_eq!((surface.width(), surface.height()), (limit, 2));
    assert_eq!(driver.frames(), 1);
}

#[async_test]
async fn composite_is_black_then_white() {
    logwise::info_sync!("Starting composite_is_black_then_white");
    let Some(device) = device().await else { return };
    let mut surface = exact_surface(&device);
    let mut driver = FrameDriver::new(&device, config(false, false), surface.format())
        .await
        .expect("driver");

    driver.frame_at(&mut surface, 0);
    assert!(composite_red(&surface).await.iter().all(|&r| r == 0));

    //every variant covers the canvas, so a saturated threshold lights everything
    driver.frame_at(&mut surface, u32::MAX);
    assert!(composite_red(&surface).await.iter().all(|&r| r == 255));
}

async fn assert_strips_match(driver: &FrameDriver, surface: &OffscreenSurface, flip: bool) {
    let red = composite_red(surface).await;
    let width = CANVAS.width() as usize;
    let surface_width = surface.width() as usize;
    for strip in 0..TestVariant::DEFAULT_PAIR.len() {
        let mask: RevealMask = driver.read_reveal(strip).await.expect("readback");
        for (texel, lit) in mask.texels() {
            let x = texel.x as usize;
            let column = if flip { width - 1 - x } else { x };
            let composite = red[texel.y as usize * surface_width + strip * width + column];
            assert_eq!(
                composite == 255,
                *lit,
                "strip {strip} texel {texel:?} flip {flip}"
            );
        }
    }
}

#[async_test]
async fn strips_show_each_reveal_in_order() {
    logwise::info_sync!("Starting strips_show_each_reveal_in_order");
    let Some(device) = device().await else { return };
    for flip in [false, true] {
        let mut surface = exact_surface(&device);
        let mut driver = FrameDriver::new(&device, config(false, flip), surface.format())
            .await
            .expect("driver");
        //a partial reveal, so the strips are not uniform
        driver.frame_at(&mut surface, (CANVAS.pixel_count() / 2) as u32);
        assert_strips_match(&driver, &surface, flip).await;
    }
}

#[async_test]
async fn resize_applies_on_the_next_frame() {
    logwise::info_sync!("Starting resize_applies_on_the_next_frame");
    let Some(device) = device().await else { return };
    let mut surface = exact_surface(&device);
    let mut driver = FrameDriver::new(&device, config(false, false), surface.format())
        .await
        .expect("driver");
    driver.on_resize(40, 10);
    assert_eq!(surface.width(), CANVAS.width() * 2);
    driver.on_frame(&mut surface);
    assert_eq!((surface.width(), surface.height()), (40, 10));
    assert_eq!(composite_red(&surface).await.len(), 400);

    //minimized windows report zero; the last size stays
    driver.on_resize(0, 10);
    driver.on_frame(&mut surface);
    assert_eq!((surface.width(), surface.height()), (40, 10));
}

#[async_test]
async fn frames_continue_without_a_surface() {
    logwise::info_sync!("Starting frames_continue_without_a_surface");
    let Some(device) = device().await else { return };
    let mut host = NoSurface;
    let mut driver = FrameDriver::new(&device, config(true, false), host.format())
        .await
        .expect("driver");
    driver.frame_at(&mut host, u32::MAX);
    assert_eq!(driver.frames(), 1);
    //replay still ran
    let mask = driver.read_reveal(0).await.expect("readback");
    assert!(mask.as_slice().iter().all(|lit| *lit));
}
