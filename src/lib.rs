// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! raster_order measures the order in which a GPU completes fragments, and plays that
order back as an animation.

For a handful of fixed draw shapes (one oversized triangle, a quad as a triangle strip, the
same quad as two separate draws) it asks: does the hardware finish fragments in a stable,
primitive-ordered sequence, and does that sequence change between color and depth-only
output?

# How it works

1. **Record.**  Every fragment of a test draw does an `atomicAdd` on a per-variant counter
   and writes the value it got back into its pixel.  The result is an order-index texture:
   each pixel holds the position at which the hardware finished it.
2. **Replay.**  Each frame, a full-screen pass lights every pixel whose index is below a
   threshold.  The threshold grows with wall time, so the picture fills in in the order
   the hardware drew it.
3. **Composite.**  The reveal of every variant is laid side by side on screen.

Recording uses the color path (stamps spread over the bytes of an `Rgba8Unorm` target) or
the depth path (stamps written as `frag_depth`), see [pixel_formats::OutputKind].

# Layout

| Module            | Contents                                                        |
|-------------------|-----------------------------------------------------------------|
| [config]          | Resolved knobs, read from an abstract key/value lookup          |
| [variant]         | The catalog of test draws                                       |
| [images]          | Devices, surfaces, the fence schedule, clock, and frame driver  |
| [software]        | CPU reference model of recording and replay                     |
| [tile_rank]       | Ranks pixels within 32x32 tiles of a PNG                        |

# Backends

All GPU work goes through [wgpu](https://wgpu.rs).  Recording needs fragment shaders to
write storage buffers, which rules out WebGL and a few older mobile drivers.

# Example

```no_run
# test_executors::sleep_on(async {
use raster_order::config::{CanvasSize, Configuration, DeviceSelector};
use raster_order::images::{BoundDevice, FrameDriver};
use raster_order::images::surface::{OffscreenSurface, SurfaceProvider};
use raster_order::software::summarize;

let config = Configuration::default().with_canvas_size(CanvasSize::new(256, 256));
let device = BoundDevice::headless(&DeviceSelector::SystemDefault).await.unwrap();
let surface = OffscreenSurface::new(&device, 512, 256);
let driver = FrameDriver::new(&device, config, surface.format()).await.unwrap();
let order = driver.read_order_indices(0).await.unwrap();
println!("{:?}", summarize(&order));
# });
```
*/

pub mod bittricks;
pub mod config;
mod entry_point;
pub mod images;
mod imp;
pub mod pixel_formats;
pub mod software;
pub mod tile_rank;
pub mod variant;

pub use entry_point::{EntryPoint, EntryPointError};
