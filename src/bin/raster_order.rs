// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Records fragment order for the configured variants and animates the reveal.

Configuration comes from the environment: `LIVE`, `FLIP`, `DEPTH`, `TIME`, `WIDTH`,
`HEIGHT`, `TESTS` and `GPU`.  Built with the `app_window` feature this opens a window;
otherwise it renders offscreen for one reveal and prints what the hardware recorded.
*/
use std::time::Duration;

use raster_order::config::{Configuration, DeviceSelector};

/// Roughly 60 Hz.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[cfg(feature = "app_window")]
fn main() {
    app_window::application::main(|| {
        app_window::wgpu::wgpu_begin_context(async move {
            app_window::wgpu::wgpu_in_context(run_windowed())
        })
    });
}

#[cfg(feature = "app_window")]
async fn run_windowed() {
    use app_window::coordinates::{Position, Size};
    use app_window::window::Window;
    use raster_order::images::FrameDriver;
    use raster_order::images::driver::FrameHost;
    use raster_order::images::surface::SurfaceProvider;
    use raster_order::images::view::View;

    let config = Configuration::from_env();
    let selector = DeviceSelector::from_env();
    let mut window = Window::new(
        Position::default(),
        Size::new(800.0, 600.0),
        "raster_order".to_string(),
    )
    .await;
    let view = View::from_surface(window.surface().await);
    let (device, mut surface) = match view.bind(&selector).await {
        Ok(bound) => bound,
        Err(e) => {
            eprintln!("Could not set up a device: {e}");
            std::process::exit(1);
        }
    };
    let mut driver = match FrameDriver::new(&device, config, surface.format()).await {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Initialization failed: {e}");
            std::process::exit(1);
        }
    };
    let mut size = view.size().await;
    loop {
        let current = view.size().await;
        if current != size {
            size = current;
            driver.on_resize(size.0, size.1);
        }
        driver.on_frame(&mut surface);
        portable_async_sleep::async_sleep(FRAME_INTERVAL).await;
    }
}

#[cfg(not(feature = "app_window"))]
fn main() -> std::process::ExitCode {
    test_executors::sleep_on(run_headless())
}

#[cfg(not(feature = "app_window"))]
async fn run_headless() -> std::process::ExitCode {
    use raster_order::EntryPoint;
    use raster_order::images::BoundDevice;
    use raster_order::images::FrameDriver;
    use raster_order::images::driver::FrameHost;
    use raster_order::images::surface::{OffscreenSurface, SurfaceProvider};
    use raster_order::software::summarize;
    use std::process::ExitCode;

    let config = Configuration::from_env();
    let selector = DeviceSelector::from_env();
    println!("{config}");
    match EntryPoint::new().await {
        Ok(entry_point) => {
            for (index, name) in entry_point.adapter_names().iter().enumerate() {
                println!("GPU={index}: {name}");
            }
        }
        Err(e) => eprintln!("Could not list adapters: {e}"),
    }
    let device = match BoundDevice::headless(&selector).await {
        Ok(device) => device,
        Err(e) => {
            eprintln!("Could not set up a device: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("Running on {}", device.adapter_name());

    let canvas = config.canvas_size();
    let strips = config.variants().len() as u32;
    let mut surface = OffscreenSurface::new(&device, canvas.width() * strips, canvas.height());
    let variants = config.variants().to_vec();
    let mut driver = match FrameDriver::new(&device, config, surface.format()).await {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Initialization failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let reveal = driver.clock().fully_revealed_after();
    loop {
        let done = driver.clock().elapsed() >= reveal;
        driver.on_frame(&mut surface);
        if driver.frames() % 60 == 0 {
            logwise::info_sync!(
                "frame {frame}, threshold {threshold}",
                frame = driver.frames(),
                threshold = driver.clock().threshold()
            );
        }
        //one more frame after the reveal completes
        if done {
            break;
        }
        portable_async_sleep::async_sleep(FRAME_INTERVAL).await;
    }

    for (index, variant) in variants.iter().enumerate() {
        match driver.read_order_indices(index).await {
            Ok(map) => {
                let summary = summarize(&map);
                println!(
                    "{variant}: {covered} of {pixels} pixels covered, max index {max:?}, {duplicates} duplicates, {missing} missing",
                    covered = summary.covered,
                    pixels = canvas.pixel_count(),
                    max = summary.max_index,
                    duplicates = summary.duplicates,
                    missing = summary.missing,
                );
            }
            Err(e) => {
                eprintln!("{variant}: readback failed: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
