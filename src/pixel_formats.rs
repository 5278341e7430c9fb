// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pixel formats used by the order-recording pipeline.
//!
//! A recording can be captured through one of two output paths:
//!
//! - [`OutputKind::Color`] - the fragment stage writes its stamp as a color, spread over the
//!   four bytes of an `Rgba8Unorm` target.
//! - [`OutputKind::Depth`] - the fragment stage writes its stamp as `frag_depth` into a
//!   `Depth32Float` target with no color attachment.
//!
//! Both paths agree on the background: a cleared target (zero color, or depth `0.0`)
//! decodes to "never written".  Everything that differs between the two paths, such as
//! formats, clear values, and how the replay pass decodes a stamp, is answered by
//! [`OutputKind`] so the rest of the pipeline stays single-sourced.
//!
//! # Examples
//!
//! ```
//! use raster_order::pixel_formats::OutputKind;
//!
//! let kind = OutputKind::from_depth_flag(true);
//! assert_eq!(kind, OutputKind::Depth);
//! assert_eq!(kind.bytes_per_pixel(), 4);
//! ```

use wgpu::TextureFormat;

/// Format of the per-variant reveal textures.
pub const REVEAL_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Which output path the order recorder writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputKind {
    #[default]
    Color,
    Depth,
}

impl OutputKind {
    pub const fn from_depth_flag(depth: bool) -> Self {
        if depth {
            OutputKind::Depth
        } else {
            OutputKind::Color
        }
    }

    /// Format of the order-index texture.
    pub const fn order_format(self) -> TextureFormat {
        match self {
            OutputKind::Color => TextureFormat::Rgba8Unorm,
            OutputKind::Depth => TextureFormat::Depth32Float,
        }
    }

    pub const fn bytes_per_pixel(self) -> u32 {
        //both formats happen to be 4 bytes wide
        match self {
            OutputKind::Color => 4,
            OutputKind::Depth => 4,
        }
    }

    /// Aspect to copy when reading an order-index texture back.
    pub const fn copy_aspect(self) -> wgpu::TextureAspect {
        match self {
            OutputKind::Color => wgpu::TextureAspect::All,
            OutputKind::Depth => wgpu::TextureAspect::DepthOnly,
        }
    }

    /// Background value of a color order target.
    pub const fn clear_color() -> wgpu::Color {
        wgpu::Color::TRANSPARENT
    }

    /// Background value of a depth order target.  With a `Greater` comparator every stamp
    /// passes against it.
    pub const fn clear_depth() -> f32 {
        0.0
    }

    /// Name of the replay fragment entry point that decodes this kind of target.
    pub(crate) const fn replay_entry_point(self) -> &'static str {
        match self {
            OutputKind::Color => "fs_replay_color",
            OutputKind::Depth => "fs_replay_depth",
        }
    }

    /// Name of the record fragment entry point that writes this kind of target.
    pub(crate) const fn record_entry_point(self) -> &'static str {
        match self {
            OutputKind::Color => "fs_record_color",
            OutputKind::Depth => "fs_record_depth",
        }
    }

    /// Decodes one texel of read-back order data into a stamp.
    pub(crate) fn decode_stamp(self, bytes: [u8; 4]) -> u32 {
        match self {
            OutputKind::Color => crate::bittricks::rgba8_to_stamp(bytes),
            OutputKind::Depth => crate::bittricks::depth_to_stamp(f32::from_le_bytes(bytes)),
        }
    }
}
