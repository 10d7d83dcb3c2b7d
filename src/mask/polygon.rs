//! Lasso selection: polygon rasterization via odd-even scanline fill.

use ndarray::Array2;

use crate::geometry::Rect;
use crate::mask::Region;

/// Rasterize the interior of a polygon into a freeform region.
///
/// # Arguments
/// * `vertices` - Ordered vertex list in pixel coordinates (at least 3)
/// * `canvas_width`, `canvas_height` - Clipping extent
///
/// # Returns
/// A tight (bounds, mask) [`Region`], or `None` when fewer than 3 vertices
/// are given or no pixel falls inside the polygon.
///
/// Scanlines are evaluated at pixel-row centers (y + 0.5) with the standard
/// odd-even rule, so degenerate and self-intersecting polygons still resolve
/// deterministically.
pub fn polygon_select(
    vertices: &[(f32, f32)],
    canvas_width: usize,
    canvas_height: usize,
) -> Option<Region> {
    if vertices.len() < 3 || canvas_width == 0 || canvas_height == 0 {
        return None;
    }

    let mut mask = Array2::<u8>::zeros((canvas_height, canvas_width));
    let mut pixel_count = 0usize;
    let mut min_x = canvas_width;
    let mut min_y = canvas_height;
    let mut max_x = 0usize;
    let mut max_y = 0usize;

    // Vertical extent of the polygon, clamped to the canvas.
    let poly_min_y = vertices.iter().map(|v| v.1).fold(f32::INFINITY, f32::min);
    let poly_max_y = vertices
        .iter()
        .map(|v| v.1)
        .fold(f32::NEG_INFINITY, f32::max);
    let row_start = (poly_min_y.floor().max(0.0)) as usize;
    let row_end = (poly_max_y.ceil() as i64).min(canvas_height as i64).max(0) as usize;

    let mut crossings: Vec<f32> = Vec::new();
    for y in row_start..row_end {
        let yc = y as f32 + 0.5;

        crossings.clear();
        for i in 0..vertices.len() {
            let (x0, y0) = vertices[i];
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            // Half-open straddle test: counts each crossing exactly once,
            // including at shared vertices.
            if (y0 <= yc && yc < y1) || (y1 <= yc && yc < y0) {
                crossings.push(x0 + (yc - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in crossings.chunks_exact(2) {
            let (xa, xb) = (pair[0], pair[1]);
            let start = xa.ceil().max(0.0) as usize;
            for x in start..canvas_width {
                if (x as f32) >= xb {
                    break;
                }
                if mask[[y, x]] == 0 {
                    mask[[y, x]] = 255;
                    pixel_count += 1;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
    }

    if pixel_count == 0 {
        return None;
    }

    let bounds = Rect::new(
        min_x as i32,
        min_y as i32,
        (max_x - min_x) as u32 + 1,
        (max_y - min_y) as u32 + 1,
    );
    let tight = mask
        .slice(ndarray::s![min_y..=max_y, min_x..=max_x])
        .to_owned();
    Region::freeform(bounds, tight).ok()
}
