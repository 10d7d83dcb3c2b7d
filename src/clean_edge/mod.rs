//! Edge-preserving rotation and scaling for pixel art ("clean edge").
//!
//! Naive rotation or scaling of pixel art either blurs diagonal edges or
//! turns them into ragged staircases. This transform keeps them crisp:
//!
//! 1. Up-sample the source by an integer factor with the slice-distance
//!    algorithm ([`slice`]), converting diagonal staircases into straight
//!    sub-pixel segments.
//! 2. Rotate the up-sampled buffer with pure nearest-neighbor sampling.
//! 3. Down-sample back with area averaging and binary alpha, so the result
//!    stays hard-edged.
//!
//! The up-sample factor is the draft/final quality knob: 2 during live
//! drags, 4 for the committed result.

pub mod resample;
pub mod slice;

use ndarray::{Array3, ArrayView3};

pub use resample::{area_resample, downsample_area, rotate_nearest, rotated_extent};
pub use slice::{upscale, LINE_WIDTH_MAX, LINE_WIDTH_MIN};

/// Preview fidelity of the transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quality {
    /// Fast: up-sample by 2. Used for live previews during a drag.
    Draft,
    /// Full: up-sample by 4. Used on commit.
    #[default]
    Final,
}

impl Quality {
    /// Integer up-sample factor of the edge slicing pass.
    pub fn factor(&self) -> usize {
        match self {
            Quality::Draft => 2,
            Quality::Final => 4,
        }
    }
}

/// Which side of a luminance tie owns a contested sub-pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EdgePriority {
    /// Darker colors win. Matches the usual pixel-art convention of dark
    /// outlines dominating lighter fills.
    #[default]
    Darker,
    /// Lighter colors win.
    Lighter,
}

/// Tuning knobs of the edge slicing pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CleanEdgeOptions {
    /// Width of the reconstructed cut. Clamped to
    /// [[`LINE_WIDTH_MIN`], [`LINE_WIDTH_MAX`]] on use.
    pub line_width: f32,
    /// Tie-break side for contested sub-pixels.
    pub edge_priority: EdgePriority,
    /// Secondary refinement that widens/narrows cuts at compound corners.
    pub cleanup: bool,
    /// Color distance below which two pixels count as the same region.
    /// 0 = exact match, the right setting for flat-color pixel art.
    pub similar_threshold: f32,
}

impl Default for CleanEdgeOptions {
    fn default() -> Self {
        CleanEdgeOptions {
            line_width: 1.0,
            edge_priority: EdgePriority::Darker,
            cleanup: true,
            similar_threshold: 0.0,
        }
    }
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_angle(angle_degrees: f32) -> f32 {
    let a = angle_degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs.
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Rotate an RGBA buffer by `angle_degrees`, preserving hard pixel-art
/// edges.
///
/// # Arguments
/// * `image` - RGBA source, shape (height, width, 4)
/// * `angle_degrees` - Any angle; normalized to [0, 360)
/// * `quality` - Draft (live preview) or Final (commit)
/// * `options` - Edge slicing knobs
///
/// # Returns
/// The rotated buffer, sized to the bounding box of the rotated rect. An
/// effective angle of exactly 0 returns a byte-identical copy.
pub fn rotate(
    image: ArrayView3<u8>,
    angle_degrees: f32,
    quality: Quality,
    options: &CleanEdgeOptions,
) -> Array3<u8> {
    let angle = normalize_angle(angle_degrees);
    if angle == 0.0 {
        return image.to_owned();
    }

    let (height, width, _) = image.dim();
    let factor = quality.factor();
    let up = slice::upscale(image, factor, options);

    // Output extent is decided at the original scale so the rotation canvas
    // divides evenly back down.
    let (out_w, out_h) = resample::rotated_extent(width, height, angle);
    let rotated = resample::rotate_nearest(up.view(), angle, out_w * factor, out_h * factor);
    resample::downsample_area(rotated.view(), factor)
}

/// Scale an RGBA buffer by (sx, sy), preserving hard pixel-art edges where
/// the geometry allows it.
///
/// Uniform upscales go through the slice-distance up-sampler (smallest
/// integer factor >= the requested scale, then area-averaged down to the
/// exact target). Clean integer downscales use direct area averaging.
/// Everything else falls back to the general weighted-area resampler, since
/// the edge algorithm assumes uniform geometry.
pub fn scale(image: ArrayView3<u8>, sx: f32, sy: f32, options: &CleanEdgeOptions) -> Array3<u8> {
    let (height, width, _) = image.dim();
    if sx <= 0.0 || sy <= 0.0 {
        log::warn!("ignoring non-positive scale ({}, {})", sx, sy);
        return image.to_owned();
    }

    let target_w = ((width as f32 * sx).round() as usize).max(1);
    let target_h = ((height as f32 * sy).round() as usize).max(1);
    if target_w == width && target_h == height {
        return image.to_owned();
    }

    // Uniform upscale: edge-sliced integer up-sample, then exact-size
    // area reduction.
    if sx == sy && sx > 1.0 {
        let factor = sx.ceil() as usize;
        let up = slice::upscale(image, factor, options);
        if target_w == width * factor && target_h == height * factor {
            return up;
        }
        return resample::area_resample(up.view(), target_w, target_h);
    }

    // Clean integer downscale.
    if width % target_w == 0 && height % target_h == 0 && width / target_w == height / target_h {
        return resample::downsample_area(image, width / target_w);
    }

    resample::area_resample(image, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn solid(width: usize, height: usize, color: [u8; 4]) -> Array3<u8> {
        Array3::from_shape_fn((height, width, 4), |(_, _, c)| color[c])
    }

    fn sprite_2x3() -> Array3<u8> {
        // Distinct opaque colors per pixel so permutations are traceable.
        Array3::from_shape_fn((3, 2, 4), |(y, x, c)| match c {
            0 => (y * 2 + x) as u8 * 40 + 10,
            3 => 255,
            _ => 0,
        })
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(450.0), 90.0);
    }

    #[test]
    fn test_rotate_zero_is_byte_identical() {
        let image = sprite_2x3();
        for quality in [Quality::Draft, Quality::Final] {
            let out = rotate(
                image.view(),
                0.0,
                quality,
                &CleanEdgeOptions::default(),
            );
            assert_eq!(out, image);
        }
    }

    #[test]
    fn test_rotate_full_turn_equals_zero() {
        let image = sprite_2x3();
        let out = rotate(
            image.view(),
            360.0,
            Quality::Final,
            &CleanEdgeOptions::default(),
        );
        assert_eq!(out, image);
    }

    #[test]
    fn test_rotate_90_swaps_dimensions() {
        let image = sprite_2x3();
        for quality in [Quality::Draft, Quality::Final] {
            let out = rotate(
                image.view(),
                90.0,
                quality,
                &CleanEdgeOptions::default(),
            );
            assert_eq!(out.dim(), (2, 3, 4));
        }
    }

    #[test]
    fn test_rotate_90_of_solid_stays_solid() {
        let image = solid(4, 2, [30, 60, 90, 255]);
        let out = rotate(
            image.view(),
            90.0,
            Quality::Final,
            &CleanEdgeOptions::default(),
        );
        assert_eq!(out.dim(), (4, 2, 4));
        for y in 0..4 {
            for x in 0..2 {
                assert_eq!(
                    [out[[y, x, 0]], out[[y, x, 1]], out[[y, x, 2]], out[[y, x, 3]]],
                    [30, 60, 90, 255]
                );
            }
        }
    }

    #[test]
    fn test_rotate_45_alpha_stays_binary() {
        let image = solid(6, 4, [200, 100, 50, 255]);
        let out = rotate(
            image.view(),
            45.0,
            Quality::Draft,
            &CleanEdgeOptions::default(),
        );
        for v in out.iter().enumerate().filter(|(i, _)| i % 4 == 3) {
            assert!(*v.1 == 0 || *v.1 == 255);
        }
    }

    #[test]
    fn test_scale_identity() {
        let image = sprite_2x3();
        let out = scale(image.view(), 1.0, 1.0, &CleanEdgeOptions::default());
        assert_eq!(out, image);
    }

    #[test]
    fn test_scale_integer_upscale() {
        let image = solid(3, 2, [10, 20, 30, 255]);
        let out = scale(image.view(), 2.0, 2.0, &CleanEdgeOptions::default());
        assert_eq!(out.dim(), (4, 6, 4));
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(out[[y, x, 0]], 10);
                assert_eq!(out[[y, x, 3]], 255);
            }
        }
    }

    #[test]
    fn test_scale_fractional_upscale_hits_exact_target() {
        let image = solid(4, 4, [1, 2, 3, 255]);
        let out = scale(image.view(), 1.5, 1.5, &CleanEdgeOptions::default());
        assert_eq!(out.dim(), (6, 6, 4));
    }

    #[test]
    fn test_scale_integer_downscale() {
        let image = solid(6, 4, [77, 88, 99, 255]);
        let out = scale(image.view(), 0.5, 0.5, &CleanEdgeOptions::default());
        assert_eq!(out.dim(), (2, 3, 4));
        assert_eq!(out[[1, 2, 0]], 77);
        assert_eq!(out[[1, 2, 3]], 255);
    }

    #[test]
    fn test_scale_non_uniform() {
        let image = solid(4, 4, [5, 6, 7, 255]);
        let out = scale(image.view(), 2.0, 0.75, &CleanEdgeOptions::default());
        assert_eq!(out.dim(), (3, 8, 4));
        assert_eq!(out[[1, 3, 0]], 5);
    }

    #[test]
    fn test_scale_non_positive_is_a_copy() {
        let image = sprite_2x3();
        let out = scale(image.view(), 0.0, 1.0, &CleanEdgeOptions::default());
        assert_eq!(out, image);
    }
}
