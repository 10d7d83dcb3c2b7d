//! PixelGrove selection and transform engine.
//!
//! The selection and pixel-transform core of the PixelGrove editor,
//! implemented in Rust with Python bindings via PyO3 and WASM bindings for
//! JavaScript.
//!
//! ## Image Format
//! All buffers are RGBA u8 with shape (height, width, 4). Selection masks
//! are (height, width) u8 arrays where 0 = unselected and 255 = selected.
//!
//! ## Modules
//! - [`geometry`]: integer rects and analytic shape membership
//! - [`mask`]: regions, flood fill, polygon scanfill and mask algebra
//! - [`clean_edge`]: edge-preserving rotation and scaling for pixel art
//! - [`selection`]: the selection state machine and transform workflow

pub mod clean_edge;
pub mod geometry;
pub mod mask;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::prelude::*;

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

    // ========================================================================
    // Selection Rasterizers
    // ========================================================================

    /// Magic-wand selection: flood fill from a seed pixel.
    ///
    /// # Returns
    /// `(x, y, width, height, mask)` of the tight selection bounds, or
    /// `None` when the seed is out of bounds.
    #[pyfunction]
    #[pyo3(signature = (image, seed_x, seed_y, tolerance=0, contiguous=true, diagonal=false))]
    pub fn flood_select<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        seed_x: i32,
        seed_y: i32,
        tolerance: u8,
        contiguous: bool,
        diagonal: bool,
    ) -> Option<(i32, i32, u32, u32, Bound<'py, PyArray2<u8>>)> {
        let options = FloodOptions {
            tolerance,
            contiguous,
            diagonal,
        };
        let region = mask::flood_select(image.as_array(), seed_x, seed_y, &options)?;
        let bounds = region.bounds;
        let mask = region.to_mask();
        Some((
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            mask.into_pyarray(py),
        ))
    }

    /// Lasso selection: rasterize a closed polygon with the odd-even rule.
    ///
    /// # Returns
    /// `(x, y, width, height, mask)` of the tight selection bounds, or
    /// `None` when no pixel center falls inside the polygon.
    #[pyfunction]
    pub fn polygon_select<'py>(
        py: Python<'py>,
        vertices: Vec<(f32, f32)>,
        canvas_width: usize,
        canvas_height: usize,
    ) -> Option<(i32, i32, u32, u32, Bound<'py, PyArray2<u8>>)> {
        let region = mask::polygon_select(&vertices, canvas_width, canvas_height)?;
        let bounds = region.bounds;
        let mask = region.to_mask();
        Some((
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            mask.into_pyarray(py),
        ))
    }

    // ========================================================================
    // Edge-Preserving Transform
    // ========================================================================

    /// Rotate an RGBA buffer, keeping pixel-art edges crisp.
    ///
    /// # Arguments
    /// * `image` - RGBA buffer, shape (height, width, 4)
    /// * `angle_degrees` - Any angle; normalized to [0, 360)
    /// * `draft` - Use the fast preview quality instead of final
    #[pyfunction]
    #[pyo3(signature = (image, angle_degrees, draft=false, line_width=1.0, prefer_darker=true, cleanup=true, similar_threshold=0.0))]
    #[allow(clippy::too_many_arguments)]
    pub fn clean_edge_rotate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        angle_degrees: f32,
        draft: bool,
        line_width: f32,
        prefer_darker: bool,
        cleanup: bool,
        similar_threshold: f32,
    ) -> Bound<'py, PyArray3<u8>> {
        let quality = if draft { Quality::Draft } else { Quality::Final };
        let options = options_from_args(line_width, prefer_darker, cleanup, similar_threshold);
        let result = clean_edge::rotate(image.as_array(), angle_degrees, quality, &options);
        result.into_pyarray(py)
    }

    /// Scale an RGBA buffer, keeping pixel-art edges crisp where possible.
    #[pyfunction]
    #[pyo3(signature = (image, sx, sy, line_width=1.0, prefer_darker=true, cleanup=true, similar_threshold=0.0))]
    #[allow(clippy::too_many_arguments)]
    pub fn clean_edge_scale<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sx: f32,
        sy: f32,
        line_width: f32,
        prefer_darker: bool,
        cleanup: bool,
        similar_threshold: f32,
    ) -> Bound<'py, PyArray3<u8>> {
        let options = options_from_args(line_width, prefer_darker, cleanup, similar_threshold);
        let result = clean_edge::scale(image.as_array(), sx, sy, &options);
        result.into_pyarray(py)
    }

    // ========================================================================
    // Contours
    // ========================================================================

    /// Extract marching-ants outlines from a selection mask.
    ///
    /// # Returns
    /// Flat array: `[num_contours, len1, x1, y1, x2, y2, ..., len2, ...]`
    #[pyfunction]
    pub fn extract_contours(mask: PyReadonlyArray2<u8>) -> Vec<f32> {
        contour::extract_contours_flat(mask.as_array())
    }

    /// PixelGrove Rust extension module
    #[pymodule]
    pub fn pixelgrove_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(flood_select, m)?)?;
        m.add_function(wrap_pyfunction!(polygon_select, m)?)?;
        m.add_function(wrap_pyfunction!(clean_edge_rotate, m)?)?;
        m.add_function(wrap_pyfunction!(clean_edge_scale, m)?)?;
        m.add_function(wrap_pyfunction!(extract_contours, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::pixelgrove_rust;
