// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! CPU-side representations of recorded order.

[`OrderIndexMap`] is what an order-index texture means once decoded: `Some(index)` for a
pixel some fragment wrote, `None` for background.  [`RevealMask`] is the decoded reveal
texture.  [`replay`] is the reference for the GPU replay pass, and [`raster::record`] is a
reference recorder.

```
use raster_order::config::CanvasSize;
use raster_order::pixel_formats::OutputKind;
use raster_order::software::{raster, replay};
use raster_order::variant::TestVariant;

let map = raster::record(TestVariant::SingleTriangle, CanvasSize::new(4, 4), OutputKind::Color);
let mask = replay(&map, 8);
assert_eq!(mask.as_slice().iter().filter(|lit| **lit).count(), 8);
```
*/

use std::collections::BTreeSet;

use crate::software::texture::{Texel, Texture};

pub mod raster;
pub mod texture;

/// Decoded order-index texture.
pub type OrderIndexMap = Texture<Option<u32>>;

/// Decoded reveal texture: `true` where lit.
pub type RevealMask = Texture<bool>;

/// Lights every pixel whose recorded index is below `threshold`.
pub fn replay(map: &OrderIndexMap, threshold: u32) -> RevealMask {
    map.map(|index| index.is_some_and(|i| i < threshold))
}

/// Pixels written by at least one fragment.
pub fn covered_set(map: &OrderIndexMap) -> BTreeSet<Texel> {
    map.texels()
        .filter(|(_, index)| index.is_some())
        .map(|(texel, _)| texel)
        .collect()
}

/// Pixels lit in a reveal.
pub fn lit_set(mask: &RevealMask) -> BTreeSet<Texel> {
    mask.texels()
        .filter(|(_, lit)| **lit)
        .map(|(texel, _)| texel)
        .collect()
}

/// Shape of the indices in one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    /// Pixels holding an index.
    pub covered: u64,
    pub max_index: Option<u32>,
    /// Pixels holding an index some other pixel also holds.
    pub duplicates: u64,
    /// Values in `0..=max_index` no pixel holds.
    pub missing: u64,
}

impl OrderSummary {
    /// True when the indices are exactly `0..covered`, each once.
    pub fn is_dense(&self) -> bool {
        self.duplicates == 0 && self.missing == 0
    }
}

pub fn summarize(map: &OrderIndexMap) -> OrderSummary {
    let mut indices: Vec<u32> = map.as_slice().iter().flatten().copied().collect();
    indices.sort_unstable();
    let covered = indices.len() as u64;
    let before = indices.len();
    indices.dedup();
    let duplicates = (before - indices.len()) as u64;
    let max_index = indices.last().copied();
    let missing = match max_index {
        None => 0,
        Some(max) => max as u64 + 1 - indices.len() as u64,
    };
    OrderSummary {
        covered,
        max_index,
        duplicates,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasSize;
    use crate::pixel_formats::OutputKind;
    use crate::variant::TestVariant;

    fn sample_map() -> OrderIndexMap {
        Texture::from_vec(3, 1, vec![Some(2), None, Some(0)])
    }

    #[test]
    fn threshold_zero_reveals_nothing() {
        for variant in TestVariant::ALL {
            for output in [OutputKind::Color, OutputKind::Depth] {
                let map = raster::record(variant, CanvasSize::new(6, 5), output);
                assert!(lit_set(&replay(&map, 0)).is_empty());
            }
        }
    }

    #[test]
    fn reveal_is_monotone_in_threshold() {
        let map = raster::record(TestVariant::QuadAsTwoDraws, CanvasSize::new(9, 7), OutputKind::Color);
        let mut previous = lit_set(&replay(&map, 0));
        for threshold in 1..=70 {
            let current = lit_set(&replay(&map, threshold));
            assert!(previous.is_subset(&current), "threshold {threshold}");
            previous = current;
        }
        assert_eq!(previous, covered_set(&map));
    }

    #[test]
    fn background_never_lights() {
        let mask = replay(&sample_map(), u32::MAX);
        assert_eq!(mask.as_slice(), &[true, false, true]);
    }

    #[test]
    fn summary_finds_gaps_and_duplicates() {
        let summary = summarize(&sample_map());
        assert_eq!(summary.covered, 2);
        assert_eq!(summary.missing, 1);
        assert!(!summary.is_dense());

        let dup = Texture::from_vec(2, 1, vec![Some(0), Some(0)]);
        let summary = summarize(&dup);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.missing, 0);

        let empty: OrderIndexMap = Texture::new(2, 2, None);
        assert!(summarize(&empty).is_dense());
        assert_eq!(summarize(&empty).max_index, None);
    }

    #[test]
    fn four_by_four_end_to_end() {
        let map = raster::record(TestVariant::SingleTriangle, CanvasSize::new(4, 4), OutputKind::Color);
        let mut indices: Vec<u32> = map.as_slice().iter().flatten().copied().collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..16).collect::<Vec<_>>());
        let mask = replay(&map, 8);
        let lit = lit_set(&mask);
        assert_eq!(lit.len(), 8);
        for texel in lit {
            assert!(map[texel].unwrap() < 8);
        }
    }
}
