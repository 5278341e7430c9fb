// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
bit packing for order stamps.

A stamp is `order_index + 1`, so that the zero background of a freshly cleared
target reads as "never written".  These functions mirror what the WGSL side does with
`unpack4x8unorm`/`pack4x8unorm` and `frag_depth`.
*/

/// Scale between a stamp and its depth encoding.  Stamps up to `2^24` are exact in `f32`.
pub const DEPTH_STAMP_SCALE: f32 = 16_777_216.0;

/// Largest stamp a depth target holds without rounding.
pub const MAX_EXACT_DEPTH_STAMP: u32 = 1 << 24;

pub const fn index_to_stamp(index: u32) -> u32 {
    index.wrapping_add(1)
}

pub const fn stamp_to_index(stamp: u32) -> Option<u32> {
    if stamp == 0 { None } else { Some(stamp - 1) }
}

/// Little-endian spread of a stamp over RGBA8 bytes, R carries the low byte.
pub const fn stamp_to_rgba8(stamp: u32) -> [u8; 4] {
    stamp.to_le_bytes()
}

pub const fn rgba8_to_stamp(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

pub fn stamp_to_depth(stamp: u32) -> f32 {
    stamp as f32 / DEPTH_STAMP_SCALE
}

pub fn depth_to_stamp(depth: f32) -> u32 {
    (depth * DEPTH_STAMP_SCALE).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_never_written() {
        assert_eq!(stamp_to_index(0), None);
        assert_eq!(stamp_to_index(rgba8_to_stamp([0, 0, 0, 0])), None);
        assert_eq!(stamp_to_index(depth_to_stamp(0.0)), None);
    }

    #[test]
    fn first_fragment_is_index_zero() {
        let stamp = index_to_stamp(0);
        assert_eq!(stamp, 1);
        assert_eq!(stamp_to_rgba8(stamp), [1, 0, 0, 0]);
        assert_eq!(stamp_to_index(stamp), Some(0));
    }

    #[test]
    fn rgba_spreads_little_endian() {
        assert_eq!(stamp_to_rgba8(0x0403_0201), [1, 2, 3, 4]);
        assert_eq!(rgba8_to_stamp([0xff, 0, 0, 0x80]), 0x8000_00ff);
    }

    #[test]
    fn depth_is_exact_below_limit() {
        for stamp in [1, 2, 255, 65_536, 2_073_600, MAX_EXACT_DEPTH_STAMP] {
            let depth = stamp_to_depth(stamp);
            assert!(depth > 0.0 && depth <= 1.0);
            assert_eq!(depth_to_stamp(depth), stamp);
        }
    }

    #[test]
    fn depth_grows_with_stamp() {
        assert!(stamp_to_depth(10) < stamp_to_depth(11));
    }
}
