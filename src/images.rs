// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! The rendering side: devices, surfaces, and the frame loop that records, replays and
composites. */

pub mod clock;
pub(crate) mod device;
pub mod driver;
pub mod fence;
pub mod surface;
#[cfg(feature = "app_window")]
pub mod view;

pub use device::{BindError, BoundDevice, DeviceError, PickError};
pub use driver::{DriverState, FrameDriver, FrameHost, InitError, ReadbackError};
