// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The catalog of test geometries.
//!
//! Each [`TestVariant`] is a fixed draw-call shape with explicit clip-space vertices.  The
//! recorder uploads [`TestVariant::vertices`] verbatim and issues the draws named by
//! [`TestVariant::draws`].

use std::ops::Range;

/// A clip-space position, `(x, y, z, w)`.
pub type ClipPosition = [f32; 4];

const SINGLE_TRIANGLE: [ClipPosition; 3] = [
    [-1.0, 1.0, 0.0, 1.0],
    [3.0, 1.0, 0.0, 1.0],
    [-1.0, -3.0, 0.0, 1.0],
];

const QUAD_STRIP: [ClipPosition; 4] = [
    [-1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [-1.0, -1.0, 0.0, 1.0],
    [1.0, -1.0, 0.0, 1.0],
];

const QUAD_TWO_DRAWS: [ClipPosition; 6] = [
    [-1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [-1.0, -1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [-1.0, -1.0, 0.0, 1.0],
    [1.0, -1.0, 0.0, 1.0],
];

/// A fixed test geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestVariant {
    /// One oversized triangle covering the whole viewport.
    SingleTriangle,
    /// A full-viewport quad as one 4-vertex triangle strip.
    QuadAsStrip,
    /// The same quad as two separate 3-vertex triangle draws sharing one counter.
    QuadAsTwoDraws,
}

/// Primitive topology of a single draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
}

/// One draw call: a topology over a vertex range of [`TestVariant::vertices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub topology: Topology,
    pub vertices: Range<u32>,
}

impl TestVariant {
    pub const ALL: [TestVariant; 3] = [
        TestVariant::SingleTriangle,
        TestVariant::QuadAsStrip,
        TestVariant::QuadAsTwoDraws,
    ];

    /// The pair used when configuration selects nothing usable.
    pub const DEFAULT_PAIR: [TestVariant; 2] =
        [TestVariant::SingleTriangle, TestVariant::QuadAsStrip];

    pub const fn vertices(self) -> &'static [ClipPosition] {
        match self {
            TestVariant::SingleTriangle => &SINGLE_TRIANGLE,
            TestVariant::QuadAsStrip => &QUAD_STRIP,
            TestVariant::QuadAsTwoDraws => &QUAD_TWO_DRAWS,
        }
    }

    /// The draw calls, in submission order.
    pub fn draws(self) -> Vec<Draw> {
        match self {
            TestVariant::SingleTriangle => vec![Draw {
                topology: Topology::TriangleList,
                vertices: 0..3,
            }],
            TestVariant::QuadAsStrip => vec![Draw {
                topology: Topology::TriangleStrip,
                vertices: 0..4,
            }],
            TestVariant::QuadAsTwoDraws => vec![
                Draw {
                    topology: Topology::TriangleList,
                    vertices: 0..3,
                },
                Draw {
                    topology: Topology::TriangleList,
                    vertices: 3..6,
                },
            ],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TestVariant::SingleTriangle => "single triangle",
            TestVariant::QuadAsStrip => "quad as strip",
            TestVariant::QuadAsTwoDraws => "quad as two draws",
        }
    }

    /**
    Parses a configuration token.

    Tokens are compared case-insensitively after dropping everything that is not a letter
    or digit, so `"Quad-2-Draws"` and `"quad2draws"` are the same token.
    */
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "0" | "fstriangle" | "singletriangle" => Some(TestVariant::SingleTriangle),
            "1" | "quadstrip" | "quad" | "quadasstrip" => Some(TestVariant::QuadAsStrip),
            "2" | "quadmulti" | "quad2draws" | "quadastwodraws" => {
                Some(TestVariant::QuadAsTwoDraws)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for TestVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_inside_vertex_lists() {
        for variant in TestVariant::ALL {
            let len = variant.vertices().len() as u32;
            for draw in variant.draws() {
                assert!(draw.vertices.end <= len, "{variant} overruns its vertices");
                match draw.topology {
                    Topology::TriangleList => assert_eq!(draw.vertices.len() % 3, 0),
                    Topology::TriangleStrip => assert!(draw.vertices.len() >= 3),
                }
            }
        }
    }

    #[test]
    fn two_draws_cover_the_strip_corners() {
        let strip = TestVariant::QuadAsStrip.vertices();
        let two = TestVariant::QuadAsTwoDraws.vertices();
        for corner in strip {
            assert!(two.contains(corner));
        }
        assert_eq!(TestVariant::QuadAsTwoDraws.draws().len(), 2);
    }

    #[test]
    fn tokens() {
        assert_eq!(TestVariant::from_token("0"), Some(TestVariant::SingleTriangle));
        assert_eq!(TestVariant::from_token("FS_Triangle"), Some(TestVariant::SingleTriangle));
        assert_eq!(TestVariant::from_token(" quad "), Some(TestVariant::QuadAsStrip));
        assert_eq!(TestVariant::from_token("Quad-2-Draws"), Some(TestVariant::QuadAsTwoDraws));
        assert_eq!(TestVariant::from_token("quadmulti"), Some(TestVariant::QuadAsTwoDraws));
        assert_eq!(TestVariant::from_token("hexagon"), None);
        assert_eq!(TestVariant::from_token(""), None);
    }
}
