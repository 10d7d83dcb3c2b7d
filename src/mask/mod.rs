//! Selection regions: rasterizers and bitmask algebra.
//!
//! A selection is represented as a [`Region`] — an integer bounding box plus
//! a membership rule. Rectangle and ellipse regions are bounds-only (their
//! membership is computed analytically); freeform regions always carry an
//! explicit bitmask sized to their bounds, with 255 = selected and 0 = not
//! (boolean semantics only, no intermediate values).
//!
//! Rasterizers (`flood_fill`, `polygon`) build freeform regions from pixel
//! data; `algebra` combines regions with set operations and trims them tight.

pub mod algebra;
pub mod flood_fill;
pub mod polygon;

pub use algebra::{combine, trim_to_content, CombineOp};
pub use flood_fill::{flood_select, FloodOptions};
pub use polygon::polygon_select;

use ndarray::Array2;
use thiserror::Error;

use crate::geometry::{ellipse_contains, Rect};

/// Membership rule of a selection region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Rectangle,
    Ellipse,
    Freeform,
}

/// Errors for contract-level misuse of region constructors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("mask is {actual_h}x{actual_w} but bounds require {expected_h}x{expected_w}")]
    MaskSizeMismatch {
        expected_w: u32,
        expected_h: u32,
        actual_w: usize,
        actual_h: usize,
    },

    #[error("region bounds have zero width or height")]
    ZeroDimension,
}

/// A selection region: bounding box, shape tag, and (for freeform) a bitmask.
///
/// Invariant: `shape == Freeform` exactly when `mask` is present, and a
/// present mask is shaped `(bounds.height, bounds.width)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub bounds: Rect,
    pub shape: Shape,
    pub mask: Option<Array2<u8>>,
}

impl Region {
    pub fn rectangle(bounds: Rect) -> Self {
        Region {
            bounds,
            shape: Shape::Rectangle,
            mask: None,
        }
    }

    pub fn ellipse(bounds: Rect) -> Self {
        Region {
            bounds,
            shape: Shape::Ellipse,
            mask: None,
        }
    }

    /// Build a freeform region, validating that the mask matches the bounds.
    pub fn freeform(bounds: Rect, mask: Array2<u8>) -> Result<Self, SelectionError> {
        if bounds.is_empty() {
            return Err(SelectionError::ZeroDimension);
        }
        let (mh, mw) = mask.dim();
        if mw != bounds.width as usize || mh != bounds.height as usize {
            return Err(SelectionError::MaskSizeMismatch {
                expected_w: bounds.width,
                expected_h: bounds.height,
                actual_w: mw,
                actual_h: mh,
            });
        }
        Ok(Region {
            bounds,
            shape: Shape::Freeform,
            mask: Some(mask),
        })
    }

    /// Whether the pixel (x, y), in canvas coordinates, is selected.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        if !self.bounds.contains(x, y) {
            return false;
        }
        match self.shape {
            Shape::Rectangle => true,
            Shape::Ellipse => ellipse_contains(&self.bounds, x, y),
            Shape::Freeform => {
                debug_assert!(self.mask.is_some(), "freeform region without mask");
                match &self.mask {
                    Some(mask) => {
                        let my = (y - self.bounds.y) as usize;
                        let mx = (x - self.bounds.x) as usize;
                        mask[[my, mx]] != 0
                    }
                    None => false,
                }
            }
        }
    }

    /// Rasterize the membership rule into an explicit mask over the bounds.
    ///
    /// For freeform regions this is a clone of the stored mask; for analytic
    /// shapes the rule is evaluated per pixel.
    pub fn to_mask(&self) -> Array2<u8> {
        if let Some(mask) = &self.mask {
            return mask.clone();
        }
        let h = self.bounds.height as usize;
        let w = self.bounds.width as usize;
        Array2::from_shape_fn((h, w), |(my, mx)| {
            let x = self.bounds.x + mx as i32;
            let y = self.bounds.y + my as i32;
            if self.contains(x, y) {
                255
            } else {
                0
            }
        })
    }

    /// Number of selected pixels.
    pub fn pixel_count(&self) -> usize {
        match &self.mask {
            Some(mask) => mask.iter().filter(|&&v| v != 0).count(),
            None => match self.shape {
                Shape::Rectangle => self.bounds.area(),
                _ => self.to_mask().iter().filter(|&&v| v != 0).count(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeform_validates_mask_size() {
        let bounds = Rect::new(0, 0, 3, 2);
        let mask = Array2::<u8>::zeros((2, 3));
        assert!(Region::freeform(bounds, mask).is_ok());

        let wrong = Array2::<u8>::zeros((3, 3));
        assert_eq!(
            Region::freeform(bounds, wrong),
            Err(SelectionError::MaskSizeMismatch {
                expected_w: 3,
                expected_h: 2,
                actual_w: 3,
                actual_h: 3,
            })
        );
    }

    #[test]
    fn test_freeform_rejects_empty_bounds() {
        let mask = Array2::<u8>::zeros((0, 0));
        assert_eq!(
            Region::freeform(Rect::default(), mask),
            Err(SelectionError::ZeroDimension)
        );
    }

    #[test]
    fn test_rectangle_membership() {
        let r = Region::rectangle(Rect::new(1, 1, 2, 2));
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(!r.contains(3, 1));
        assert!(!r.contains(0, 0));
        assert_eq!(r.pixel_count(), 4);
    }

    #[test]
    fn test_ellipse_to_mask_matches_contains() {
        let r = Region::ellipse(Rect::new(2, 3, 5, 5));
        let mask = r.to_mask();
        for my in 0..5 {
            for mx in 0..5 {
                let expected = r.contains(2 + mx as i32, 3 + my as i32);
                assert_eq!(mask[[my, mx]] != 0, expected);
            }
        }
    }

    #[test]
    fn test_freeform_membership_offset_bounds() {
        let mut mask = Array2::<u8>::zeros((2, 2));
        mask[[0, 1]] = 255;
        let r = Region::freeform(Rect::new(10, 20, 2, 2), mask).unwrap();
        assert!(r.contains(11, 20));
        assert!(!r.contains(10, 20));
        assert!(!r.contains(11, 21));
        assert_eq!(r.pixel_count(), 1);
    }
}
