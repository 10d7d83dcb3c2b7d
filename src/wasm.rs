//! WebAssembly exports for the selection and transform engine.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Buffers
//! cross the boundary as flat arrays (row-major RGBA for images, row-major
//! bytes for masks); dimensions travel alongside them.

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::clean_edge::{self, CleanEdgeOptions, EdgePriority, Quality};
use crate::mask::{self, FloodOptions};
use crate::selection::contour;

fn options_from_args(
    line_width: f32,
    prefer_darker: bool,
    cleanup: bool,
    similar_threshold: f32,
) -> CleanEdgeOptions {
    CleanEdgeOptions {
        line_width,
        edge_priority: if prefer_darker {
            EdgePriority::Darker
        } else {
            EdgePriority::Lighter
        },
        cleanup,
        similar_threshold,
    }
}

// ============================================================================
// Selection Rasterizers
// ============================================================================

/// Magic-wand selection: flood fill from a seed pixel.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width`, `height` - Canvas size in pixels
/// * `seed_x`, `seed_y` - Clicked pixel
///
/// # Returns
/// A full-canvas mask (length = width * height, 255 = selected), or an
/// empty array when the seed is out of bounds.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn flood_select_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    seed_x: i32,
    seed_y: i32,
    tolerance: u8,
    contiguous: bool,
    diagonal: bool,
) -> Vec<u8> {
    let input = Array3::from_shape_vec(
        (height, width, 4),
        data.to_vec()
    ).expect("Invalid dimensions");

    let options = FloodOptions {
        tolerance,
        contiguous,
        diagonal,
    };
    match mask::flood_select(input.view(), seed_x, seed_y, &options) {
        Some(region) => canvas_mask(&region, width, height),
        None => Vec::new(),
    }
}

/// Lasso selection: rasterize a closed polygon with the odd-even rule.
///
/// # Arguments
/// * `vertices` - Flat array of vertex coordinates [x1, y1, x2, y2, ...]
///
/// # Returns
/// A full-canvas mask (length = width * height), or an empty array when no
/// pixel center falls inside the polygon.
#[wasm_bindgen]
pub fn polygon_select_wasm(
    vertices: &[f32],
    width: usize,
    height: usize,
) -> Vec<u8> {
    let points: Vec<(f32, f32)> = vertices
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    match mask::polygon_select(&points, width, height) {
        Some(region) => canvas_mask(&region, width, height),
        None => Vec::new(),
    }
}

/// Expand a region's tight mask into a full-canvas mask.
fn canvas_mask(region: &mask::Region, width: usize, height: usize) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    let bounds = region.bounds;
    for y in bounds.y.max(0)..bounds.bottom().min(height as i32) {
        for x in bounds.x.max(0)..bounds.right().min(width as i32) {
            if region.contains(x, y) {
                out[y as usize * width + x as usize] = 255;
            }
        }
    }
    out
}

// ============================================================================
// Edge-Preserving Transform
// ============================================================================

/// Size of the buffer [`clean_edge_rotate_wasm`] will produce, as
/// `[width, height]`. Call this first to allocate the output canvas.
#[wasm_bindgen]
pub fn rotated_extent_wasm(width: usize, height: usize, angle_degrees: f32) -> Vec<u32> {
    let angle = clean_edge::normalize_angle(angle_degrees);
    if angle == 0.0 {
        return vec![width as u32, height as u32];
    }
    let (w, h) = clean_edge::rotated_extent(width, height, angle);
    vec![w as u32, h as u32]
}

/// Rotate an RGBA buffer, keeping pixel-art edges crisp.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `angle_degrees` - Any angle; normalized to [0, 360)
/// * `draft` - Use the fast preview quality instead of final
///
/// # Returns
/// Flat RGBA bytes sized to [`rotated_extent_wasm`].
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn clean_edge_rotate_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    angle_degrees: f32,
    draft: bool,
    line_width: f32,
    prefer_darker: bool,
    cleanup: bool,
    similar_threshold: f32,
) -> Vec<u8> {
    let input = Array3::from_shape_vec(
        (height, width, 4),
        data.to_vec()
    ).expect("Invalid dimensions");

    let quality = if draft { Quality::Draft } else { Quality::Final };
    let options = options_from_args(line_width, prefer_darker, cleanup, similar_threshold);
    let result = clean_edge::rotate(input.view(), angle_degrees, quality, &options);
    result.into_raw_vec_and_offset().0
}

/// Scale an RGBA buffer, keeping pixel-art edges crisp where possible.
///
/// # Returns
/// Flat RGBA bytes, sized `max(1, round(width * sx))` by
/// `max(1, round(height * sy))`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn clean_edge_scale_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    sx: f32,
    sy: f32,
    line_width: f32,
    prefer_darker: bool,
    cleanup: bool,
    similar_threshold: f32,
) -> Vec<u8> {
    let input = Array3::from_shape_vec(
        (height, width, 4),
        data.to_vec()
    ).expect("Invalid dimensions");

    let options = options_from_args(line_width, prefer_darker, cleanup, similar_threshold);
    let result = clean_edge::scale(input.view(), sx, sy, &options);
    result.into_raw_vec_and_offset().0
}

// ============================================================================
// Contours
// ============================================================================

/// Extract marching-ants outlines from a selection mask.
///
/// # Arguments
/// * `mask` - Flat mask bytes (length = width * height, 0 = unselected)
///
/// # Returns
/// Flat array: `[num_contours, len1, x1, y1, x2, y2, ..., len2, ...]`
#[wasm_bindgen]
pub fn extract_contours_wasm(mask: &[u8], width: usize, height: usize) -> Vec<f32> {
    let input = Array2::from_shape_vec(
        (height, width),
        mask.to_vec()
    ).expect("Invalid dimensions");

    contour::extract_contours_flat(input.view())
}
