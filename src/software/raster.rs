// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
CPU reference recorder.

Rasterizes a [`TestVariant`] the way the recording pass does, but in one fixed serial
order: draws in submission order, primitives in order, pixels row-major within each
primitive.  The result is the order-index map a perfectly primitive-ordered rasterizer
would produce, which makes it a useful baseline to diff hardware readbacks against.

Coverage follows the usual GPU conventions: a pixel is covered when its center lies
inside the triangle, and pixels exactly on a shared edge belong to the triangle for which
that edge is a top or left edge.
*/

use crate::config::CanvasSize;
use crate::pixel_formats::OutputKind;
use crate::software::OrderIndexMap;
use crate::software::texture::{Texel, Texture};
use crate::variant::{ClipPosition, TestVariant, Topology};

#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowPoint {
    x: f32,
    y: f32,
}

fn to_window(position: ClipPosition, canvas: CanvasSize) -> WindowPoint {
    let [x, y, _z, w] = position;
    let (ndc_x, ndc_y) = (x / w, y / w);
    WindowPoint {
        x: (ndc_x * 0.5 + 0.5) * canvas.width() as f32,
        //window space grows downward
        y: (0.5 - ndc_y * 0.5) * canvas.height() as f32,
    }
}

fn edge(a: WindowPoint, b: WindowPoint, p: WindowPoint) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left rule for an edge of a triangle with positive [`edge`] area.
fn is_top_left(a: WindowPoint, b: WindowPoint) -> bool {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

/// Calls `visit` for every covered pixel of one triangle, row-major.
fn rasterize_triangle<F: FnMut(Texel)>(
    mut v: [WindowPoint; 3],
    canvas: CanvasSize,
    mut visit: F,
) {
    let mut area = edge(v[0], v[1], v[2]);
    if area == 0.0 {
        return;
    }
    if area < 0.0 {
        v.swap(1, 2);
        area = -area;
    }
    debug_assert!(area > 0.0);
    let edges = [(v[1], v[2]), (v[2], v[0]), (v[0], v[1])];
    let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(canvas.width());
    let y1 = (max_y.ceil().max(0.0) as u32).min(canvas.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let p = WindowPoint {
                x: x as f32 + 0.5,
                y: y as f32 + 0.5,
            };
            let inside = edges.iter().all(|&(a, b)| {
                let e = edge(a, b, p);
                e > 0.0 || (e == 0.0 && is_top_left(a, b))
            });
            if inside {
                visit(Texel { x, y });
            }
        }
    }
}

/// Splits a draw's vertices into triangles according to its topology.
fn triangles(topology: Topology, vertices: &[ClipPosition]) -> Vec<[ClipPosition; 3]> {
    match topology {
        Topology::TriangleList => vertices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect(),
        Topology::TriangleStrip => vertices
            .windows(3)
            .enumerate()
            .map(|(i, w)| {
                if i % 2 == 0 {
                    [w[0], w[1], w[2]]
                } else {
                    [w[1], w[0], w[2]]
                }
            })
            .collect(),
    }
}

/**
Records `variant` on the CPU.

Each covered fragment takes the next value of a counter that starts at zero.  Where two
fragments land on the same pixel, the surviving value follows `output`: the last write for
[`OutputKind::Color`], the greatest stamp for [`OutputKind::Depth`] (a `Greater` test).
*/
pub fn record(variant: TestVariant, canvas: CanvasSize, output: OutputKind) -> OrderIndexMap {
    let mut map: OrderIndexMap = Texture::new(canvas.width(), canvas.height(), None);
    let mut counter = 0u32;
    let all_vertices = variant.vertices();
    for draw in variant.draws() {
        let range = draw.vertices.start as usize..draw.vertices.end as usize;
        for triangle in triangles(draw.topology, &all_vertices[range]) {
            let window = triangle.map(|p| to_window(p, canvas));
            rasterize_triangle(window, canvas, |texel| {
                let index = counter;
                counter += 1;
                let slot = &mut map[texel];
                *slot = match (output, *slot) {
                    (OutputKind::Depth, Some(existing)) => Some(existing.max(index)),
                    _ => Some(index),
                };
            });
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::software::{covered_set, summarize};

    #[test]
    fn single_triangle_covers_everything() {
        let canvas = CanvasSize::new(4, 4);
        let map = record(TestVariant::SingleTriangle, canvas, OutputKind::Color);
        let summary = summarize(&map);
        assert_eq!(summary.covered, 16);
        assert!(summary.is_dense());
        assert_eq!(summary.max_index, Some(15));
    }

    #[test]
    fn strip_and_two_draws_cover_the_same_pixels() {
        for (w, h) in [(4, 4), (7, 5), (33, 17), (1, 1)] {
            let canvas = CanvasSize::new(w, h);
            let strip = record(TestVariant::QuadAsStrip, canvas, OutputKind::Color);
            let two = record(TestVariant::QuadAsTwoDraws, canvas, OutputKind::Color);
            assert_eq!(covered_set(&strip), covered_set(&two), "{w}x{h}");
            assert_eq!(covered_set(&strip).len() as u64, canvas.pixel_count());
        }
    }

    #[test]
    fn diagonal_is_not_covered_twice() {
        let canvas = CanvasSize::new(8, 8);
        let map = record(TestVariant::QuadAsTwoDraws, canvas, OutputKind::Depth);
        let summary = summarize(&map);
        assert_eq!(summary.duplicates, 0);
        assert!(summary.is_dense());
    }

    #[test]
    fn second_draw_continues_the_count() {
        let canvas = CanvasSize::new(4, 4);
        let map = record(TestVariant::QuadAsTwoDraws, canvas, OutputKind::Color);
        //top-left corner belongs to the first triangle, bottom-right to the second
        let first = map[Texel { x: 0, y: 0 }].unwrap();
        let second = map[Texel { x: 3, y: 3 }].unwrap();
        assert!(first < second);
    }

    #[test]
    fn degenerate_triangle_covers_nothing() {
        let canvas = CanvasSize::new(4, 4);
        let p = WindowPoint { x: 1.0, y: 1.0 };
        let mut hits = 0;
        rasterize_triangle([p, p, p], canvas, |_| hits += 1);
        assert_eq!(hits, 0);
    }

    #[test]
    fn strip_alternates_winding() {
        let v = TestVariant::QuadAsStrip.vertices();
        let tris = triangles(Topology::TriangleStrip, v);
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1], [v[2], v[1], v[3]]);
    }
}
