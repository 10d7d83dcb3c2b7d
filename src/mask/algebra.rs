//! Set algebra over selection regions.
//!
//! Combines two regions with replace/add/subtract/intersect semantics and
//! keeps results tight: trailing all-zero rows and columns are stripped so a
//! region's bounds always form the minimal rectangle enclosing its selected
//! pixels. An all-zero result is `None`, signaling the caller to clear the
//! selection instead of storing an empty region.

use ndarray::{Array2, ArrayView2, ArrayView3};

use crate::geometry::Rect;
use crate::mask::Region;

/// How a new region interacts with the existing selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CombineOp {
    /// Drop the old selection, keep the new region.
    #[default]
    Replace,
    /// Union of both regions.
    Add,
    /// Old minus new.
    Subtract,
    /// Pixels present in both.
    Intersect,
}

/// Combine two regions. Membership is re-evaluated per pixel through each
/// region's own shape rule, so analytic regions never need a cached mask.
///
/// # Returns
/// The combined region tightened to its minimal bounds, or `None` when the
/// result is empty. All non-`Replace` results are freeform.
pub fn combine(old: &Region, new: &Region, op: CombineOp) -> Option<Region> {
    let bounds = match op {
        CombineOp::Replace => return Some(new.clone()),
        CombineOp::Add => old.bounds.union(&new.bounds),
        CombineOp::Subtract => old.bounds,
        CombineOp::Intersect => old.bounds.intersection(&new.bounds)?,
    };
    if bounds.is_empty() {
        return None;
    }

    let h = bounds.height as usize;
    let w = bounds.width as usize;
    let mask = Array2::from_shape_fn((h, w), |(my, mx)| {
        let x = bounds.x + mx as i32;
        let y = bounds.y + my as i32;
        let selected = match op {
            CombineOp::Replace => unreachable!(),
            CombineOp::Add => old.contains(x, y) || new.contains(x, y),
            CombineOp::Subtract => old.contains(x, y) && !new.contains(x, y),
            CombineOp::Intersect => old.contains(x, y) && new.contains(x, y),
        };
        if selected {
            255
        } else {
            0
        }
    });

    let (tight_bounds, tight_mask) = tighten(&bounds, mask.view())?;
    Region::freeform(tight_bounds, tight_mask).ok()
}

/// Strip all-zero border rows/columns, returning the minimal bounds and the
/// cropped mask. `None` when every value is zero.
pub fn tighten(bounds: &Rect, mask: ArrayView2<u8>) -> Option<(Rect, Array2<u8>)> {
    let (h, w) = mask.dim();
    let mut min_x = w;
    let mut min_y = h;
    let mut max_x = 0usize;
    let mut max_y = 0usize;
    let mut any = false;

    for ((y, x), &v) in mask.indexed_iter() {
        if v != 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if !any {
        return None;
    }

    let tight = Rect::new(
        bounds.x + min_x as i32,
        bounds.y + min_y as i32,
        (max_x - min_x) as u32 + 1,
        (max_y - min_y) as u32 + 1,
    );
    let cropped = mask
        .slice(ndarray::s![min_y..=max_y, min_x..=max_x])
        .to_owned();
    Some((tight, cropped))
}

/// Intersect a region with the non-transparent pixels of the surface under
/// it and re-tighten the bounds.
///
/// # Arguments
/// * `surface` - RGBA raster surface, shape (height, width, 4)
/// * `region` - Selection to trim, in surface coordinates
///
/// # Returns
/// The trimmed freeform region, or `None` when every selected pixel sits on
/// transparent surface. Idempotent: trimming a trimmed region is a no-op.
pub fn trim_to_content(surface: ArrayView3<u8>, region: &Region) -> Option<Region> {
    let (height, width, _) = surface.dim();
    let surface_rect = Rect::new(0, 0, width as u32, height as u32);
    let bounds = region.bounds.intersection(&surface_rect)?;

    let h = bounds.height as usize;
    let w = bounds.width as usize;
    let mask = Array2::from_shape_fn((h, w), |(my, mx)| {
        let x = bounds.x + mx as i32;
        let y = bounds.y + my as i32;
        let opaque = surface[[y as usize, x as usize, 3]] != 0;
        if opaque && region.contains(x, y) {
            255
        } else {
            0
        }
    });

    let (tight_bounds, tight_mask) = tighten(&bounds, mask.view())?;
    Region::freeform(tight_bounds, tight_mask).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn freeform_from(bounds: Rect, on: &[(i32, i32)]) -> Region {
        let mask = Array2::from_shape_fn(
            (bounds.height as usize, bounds.width as usize),
            |(my, mx)| {
                let p = (bounds.x + mx as i32, bounds.y + my as i32);
                if on.contains(&p) {
                    255
                } else {
                    0
                }
            },
        );
        Region::freeform(bounds, mask).unwrap()
    }

    #[test]
    fn test_replace_passes_through() {
        let a = Region::rectangle(Rect::new(0, 0, 4, 4));
        let b = Region::ellipse(Rect::new(2, 2, 6, 6));
        let r = combine(&a, &b, CombineOp::Replace).unwrap();
        assert_eq!(r, b);
    }

    #[test]
    fn test_add_is_commutative() {
        let a = Region::rectangle(Rect::new(0, 0, 3, 3));
        let b = Region::ellipse(Rect::new(2, 1, 5, 5));
        let ab = combine(&a, &b, CombineOp::Add).unwrap();
        let ba = combine(&b, &a, CombineOp::Add).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.bounds, Rect::new(0, 0, 7, 6));
    }

    #[test]
    fn test_intersect_is_commutative() {
        let a = Region::rectangle(Rect::new(0, 0, 5, 5));
        let b = Region::ellipse(Rect::new(2, 2, 5, 5));
        let ab = combine(&a, &b, CombineOp::Intersect).unwrap();
        let ba = combine(&b, &a, CombineOp::Intersect).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_intersect_disjoint_is_none() {
        let a = Region::rectangle(Rect::new(0, 0, 2, 2));
        let b = Region::rectangle(Rect::new(5, 5, 2, 2));
        assert!(combine(&a, &b, CombineOp::Intersect).is_none());
    }

    #[test]
    fn test_subtract_self_is_none() {
        let a = Region::rectangle(Rect::new(1, 1, 4, 3));
        assert!(combine(&a, &a, CombineOp::Subtract).is_none());
        let e = Region::ellipse(Rect::new(0, 0, 5, 5));
        assert!(combine(&e, &e, CombineOp::Subtract).is_none());
    }

    #[test]
    fn test_subtract_then_add_restores() {
        // add(A, subtract(A, B)) == A when B is inside A (mod tightening).
        let a = Region::rectangle(Rect::new(0, 0, 4, 4));
        let b = Region::rectangle(Rect::new(1, 1, 2, 2));
        let diff = combine(&a, &b, CombineOp::Subtract).unwrap();
        let restored = combine(&diff, &b, CombineOp::Add).unwrap();
        assert_eq!(restored.bounds, a.bounds);
        for y in 0..4 {
            for x in 0..4 {
                assert!(restored.contains(x, y));
            }
        }
    }

    #[test]
    fn test_subtract_tightens_bounds() {
        // Removing the left half leaves bounds hugging the right half.
        let a = Region::rectangle(Rect::new(0, 0, 4, 4));
        let b = Region::rectangle(Rect::new(0, 0, 2, 4));
        let r = combine(&a, &b, CombineOp::Subtract).unwrap();
        assert_eq!(r.bounds, Rect::new(2, 0, 2, 4));
    }

    #[test]
    fn test_freeform_and_analytic_combine() {
        let scattered = freeform_from(Rect::new(0, 0, 4, 4), &[(0, 0), (3, 3)]);
        let corner = Region::rectangle(Rect::new(0, 0, 2, 2));
        let r = combine(&scattered, &corner, CombineOp::Intersect).unwrap();
        assert_eq!(r.bounds, Rect::new(0, 0, 1, 1));
        assert!(r.contains(0, 0));
    }

    #[test]
    fn test_trim_to_content() {
        // 4x4 surface, only (1,1) and (2,1) opaque.
        let mut surface = Array3::<u8>::zeros((4, 4, 4));
        surface[[1, 1, 3]] = 255;
        surface[[1, 2, 3]] = 255;

        let region = Region::rectangle(Rect::new(0, 0, 4, 4));
        let trimmed = trim_to_content(surface.view(), &region).unwrap();
        assert_eq!(trimmed.bounds, Rect::new(1, 1, 2, 1));
        assert_eq!(trimmed.pixel_count(), 2);

        // Idempotent.
        let again = trim_to_content(surface.view(), &trimmed).unwrap();
        assert_eq!(again, trimmed);
    }

    #[test]
    fn test_trim_fully_transparent_is_none() {
        let surface = Array3::<u8>::zeros((4, 4, 4));
        let region = Region::rectangle(Rect::new(0, 0, 4, 4));
        assert!(trim_to_content(surface.view(), &region).is_none());
    }

    #[test]
    fn test_trim_region_outside_surface() {
        let surface = Array3::<u8>::zeros((4, 4, 4));
        let region = Region::rectangle(Rect::new(10, 10, 2, 2));
        assert!(trim_to_content(surface.view(), &region).is_none());
    }
}
