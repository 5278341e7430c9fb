// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
mod bound_device;
mod compositor;
mod entry_point;
mod error;
mod readback;
mod recorder;
mod renderer;
mod replayer;
mod surface;
mod unbound_device;
mod validation;

pub use bound_device::BoundDevice;
pub use entry_point::EntryPoint;
pub(crate) use error::Error;
pub use renderer::Renderer;
pub use surface::{AcquiredSurface, OFFSCREEN_FORMAT, OffscreenSurface};
#[cfg(feature = "app_window")]
pub use surface::{WindowSurface, create_surface};
pub use unbound_device::UnboundDevice;
