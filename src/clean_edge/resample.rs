//! Resampling primitives for the edge-preserving transform.
//!
//! These are the "dumb" halves of the pipeline: nearest-neighbor rotation
//! (safe on an already edge-sliced, up-sampled buffer), block area
//! down-sampling with hard-edged binary alpha, and a general weighted-area
//! resampler for non-uniform scales.

use ndarray::{Array3, ArrayView3};

/// Sine/cosine of an angle in degrees, exact at multiples of 90.
///
/// Transcendental sin/cos of 90.0_f32 is not exactly (1, 0); the rotation
/// extent math needs the exact values so a 90 degree rotation of a w x h
/// buffer is exactly h x w.
pub(crate) fn snapped_sin_cos(angle_degrees: f32) -> (f32, f32) {
    if angle_degrees == 0.0 {
        (0.0, 1.0)
    } else if angle_degrees == 90.0 {
        (1.0, 0.0)
    } else if angle_degrees == 180.0 {
        (0.0, -1.0)
    } else if angle_degrees == 270.0 {
        (-1.0, 0.0)
    } else {
        let rad = angle_degrees.to_radians();
        (rad.sin(), rad.cos())
    }
}

/// Size of the axis-aligned bounding box of a w x h rect rotated by the
/// given angle (degrees, normalized to [0, 360)).
pub fn rotated_extent(width: usize, height: usize, angle_degrees: f32) -> (usize, usize) {
    let (sin, cos) = snapped_sin_cos(angle_degrees);
    let w = width as f32;
    let h = height as f32;
    let out_w = (w * cos.abs() + h * sin.abs()).ceil() as usize;
    let out_h = (w * sin.abs() + h * cos.abs()).ceil() as usize;
    (out_w.max(1), out_h.max(1))
}

/// Rotate with pure nearest-neighbor sampling about the buffer center.
///
/// # Arguments
/// * `image` - RGBA source, shape (height, width, 4)
/// * `angle_degrees` - Rotation angle, normalized to [0, 360)
/// * `out_w`, `out_h` - Output size (the caller picks the rotated extent)
///
/// Output pixels that map outside the source are fully transparent.
pub fn rotate_nearest(
    image: ArrayView3<u8>,
    angle_degrees: f32,
    out_w: usize,
    out_h: usize,
) -> Array3<u8> {
    let (src_h, src_w, _) = image.dim();
    let (sin, cos) = snapped_sin_cos(angle_degrees);

    let src_cx = src_w as f32 / 2.0;
    let src_cy = src_h as f32 / 2.0;
    let dst_cx = out_w as f32 / 2.0;
    let dst_cy = out_h as f32 / 2.0;

    let mut output = Array3::<u8>::zeros((out_h, out_w, 4));
    for oy in 0..out_h {
        for ox in 0..out_w {
            let dx = ox as f32 + 0.5 - dst_cx;
            let dy = oy as f32 + 0.5 - dst_cy;
            // Inverse rotation of the destination sample point.
            let sx = dx * cos + dy * sin + src_cx;
            let sy = -dx * sin + dy * cos + src_cy;
            let sxi = sx.floor() as i64;
            let syi = sy.floor() as i64;
            if sxi >= 0 && sxi < src_w as i64 && syi >= 0 && syi < src_h as i64 {
                for c in 0..4 {
                    output[[oy, ox, c]] = image[[syi as usize, sxi as usize, c]];
                }
            }
        }
    }
    output
}

/// Down-sample by averaging each `factor x factor` block.
///
/// Color is the mean of the block's opaque sub-pixels. Alpha stays binary:
/// 255 when at least half the block is opaque, 0 otherwise, keeping the
/// silhouette hard-edged instead of producing semi-transparent rims.
pub fn downsample_area(image: ArrayView3<u8>, factor: usize) -> Array3<u8> {
    let (src_h, src_w, _) = image.dim();
    debug_assert!(factor > 0 && src_w % factor == 0 && src_h % factor == 0);
    let out_w = src_w / factor;
    let out_h = src_h / factor;
    let block = (factor * factor) as u32;

    let mut output = Array3::<u8>::zeros((out_h, out_w, 4));
    for oy in 0..out_h {
        for ox in 0..out_w {
            let mut sum = [0u32; 3];
            let mut opaque = 0u32;
            for sy in oy * factor..(oy + 1) * factor {
                for sx in ox * factor..(ox + 1) * factor {
                    if image[[sy, sx, 3]] != 0 {
                        opaque += 1;
                        for c in 0..3 {
                            sum[c] += image[[sy, sx, c]] as u32;
                        }
                    }
                }
            }
            if opaque * 2 >= block {
                for c in 0..3 {
                    output[[oy, ox, c]] = ((sum[c] + opaque / 2) / opaque) as u8;
                }
                output[[oy, ox, 3]] = 255;
            }
        }
    }
    output
}

/// General weighted-area resampler (bilinear area overlap).
///
/// Each output pixel covers a rectangular window of the source; source
/// pixels contribute proportionally to their overlap with that window. No
/// edge reconstruction happens here, so this is only used for non-uniform
/// and non-integer scales where the slice algorithm's uniform-geometry
/// assumption does not hold. Alpha stays binary: 255 when at least half the
/// covered area is opaque.
pub fn area_resample(image: ArrayView3<u8>, out_w: usize, out_h: usize) -> Array3<u8> {
    let (src_h, src_w, _) = image.dim();
    debug_assert!(out_w > 0 && out_h > 0);
    let x_ratio = src_w as f64 / out_w as f64;
    let y_ratio = src_h as f64 / out_h as f64;

    let mut output = Array3::<u8>::zeros((out_h, out_w, 4));
    for oy in 0..out_h {
        let y0 = oy as f64 * y_ratio;
        let y1 = (oy + 1) as f64 * y_ratio;
        for ox in 0..out_w {
            let x0 = ox as f64 * x_ratio;
            let x1 = (ox + 1) as f64 * x_ratio;

            let mut sum = [0.0f64; 3];
            let mut opaque_area = 0.0f64;
            let total_area = (x1 - x0) * (y1 - y0);

            let sy_start = y0.floor() as usize;
            let sy_end = (y1.ceil() as usize).min(src_h);
            let sx_start = x0.floor() as usize;
            let sx_end = (x1.ceil() as usize).min(src_w);

            for sy in sy_start..sy_end {
                let overlap_y = (y1.min((sy + 1) as f64) - y0.max(sy as f64)).max(0.0);
                if overlap_y <= 0.0 {
                    continue;
                }
                for sx in sx_start..sx_end {
                    let overlap_x = (x1.min((sx + 1) as f64) - x0.max(sx as f64)).max(0.0);
                    if overlap_x <= 0.0 {
                        continue;
                    }
                    let area = overlap_x * overlap_y;
                    if image[[sy, sx, 3]] != 0 {
                        opaque_area += area;
                        for c in 0..3 {
                            sum[c] += image[[sy, sx, c]] as f64 * area;
                        }
                    }
                }
            }

            if opaque_area * 2.0 >= total_area {
                for c in 0..3 {
                    output[[oy, ox, c]] = (sum[c] / opaque_area).round() as u8;
                }
                output[[oy, ox, 3]] = 255;
            }
        }
    }
    output
}
