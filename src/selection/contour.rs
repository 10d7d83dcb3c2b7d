//! Contour extraction from selection masks.
//!
//! Produces the polygon outlines used to draw the marching-ants overlay.
//! Boundary pixels are traced with the Moore neighborhood walk; disjoint
//! blobs yield separate contours.

use std::collections::HashSet;

use ndarray::ArrayView2;

/// Moore neighborhood, clockwise starting from "right".
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Extract every closed contour of a mask.
///
/// # Arguments
/// * `mask` - Selection mask, shape (height, width); 0 = unselected
///
/// # Returns
/// One point list per blob outline, in mask-local coordinates. Points sit
/// at pixel centers (x + 0.5, y + 0.5) so the overlay renderer can expand
/// them to pixel edges.
pub fn extract_contours(mask: ArrayView2<u8>) -> Vec<Vec<(f32, f32)>> {
    let (height, width) = mask.dim();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut contours = Vec::new();
    let mut visited: HashSet<(i32, i32)> = HashSet::new();

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if is_boundary(&mask, x, y) && !visited.contains(&(x, y)) {
                let contour = trace_boundary(&mask, x, y, &mut visited);
                if !contour.is_empty() {
                    contours.push(contour);
                }
            }
        }
    }

    contours
}

#[inline]
fn is_selected(mask: &ArrayView2<u8>, x: i32, y: i32) -> bool {
    let (height, width) = mask.dim();
    x >= 0
        && y >= 0
        && (x as usize) < width
        && (y as usize) < height
        && mask[[y as usize, x as usize]] != 0
}

/// Selected with at least one unselected 4-neighbor.
#[inline]
fn is_boundary(mask: &ArrayView2<u8>, x: i32, y: i32) -> bool {
    if !is_selected(mask, x, y) {
        return false;
    }
    !is_selected(mask, x - 1, y)
        || !is_selected(mask, x + 1, y)
        || !is_selected(mask, x, y - 1)
        || !is_selected(mask, x, y + 1)
}

fn trace_boundary(
    mask: &ArrayView2<u8>,
    start_x: i32,
    start_y: i32,
    visited: &mut HashSet<(i32, i32)>,
) -> Vec<(f32, f32)> {
    let (height, width) = mask.dim();
    let mut contour = Vec::new();

    // Initial backtrack direction: the first unselected neighbor.
    let mut dir = 0usize;
    for (i, &(dx, dy)) in DIRECTIONS.iter().enumerate() {
        if !is_selected(mask, start_x + dx, start_y + dy) {
            dir = i;
            break;
        }
    }

    let mut x = start_x;
    let mut y = start_y;

    // Each boundary pixel can be entered from at most 8 directions.
    let max_steps = width * height * 2;
    let mut steps = 0usize;

    loop {
        if !visited.contains(&(x, y)) {
            contour.push((x as f32 + 0.5, y as f32 + 0.5));
            visited.insert((x, y));
        }

        // Resume the clockwise scan three slots behind the entry direction.
        let search_start = (dir + 5) % 8;
        let mut found = false;
        for i in 0..8 {
            let check_dir = (search_start + i) % 8;
            let (dx, dy) = DIRECTIONS[check_dir];
            let nx = x + dx;
            let ny = y + dy;

            if is_selected(mask, nx, ny) {
                if nx == start_x && ny == start_y && steps > 0 {
                    return contour;
                }
                if is_boundary(mask, nx, ny) {
                    x = nx;
                    y = ny;
                    dir = check_dir;
                    found = true;
                    break;
                }
            }
        }

        // Isolated pixel: its one-point contour is complete.
        if !found {
            break;
        }

        steps += 1;
        if steps >= max_steps {
            break;
        }
    }

    contour
}

/// Flat encoding of [`extract_contours`] for FFI surfaces that cannot pass
/// nested lists: `[num_contours, len1, x1, y1, ..., len2, ...]`.
pub fn extract_contours_flat(mask: ArrayView2<u8>) -> Vec<f32> {
    let contours = extract_contours(mask);

    let mut result = Vec::new();
    result.push(contours.len() as f32);
    for contour in contours {
        result.push(contour.len() as f32);
        for (x, y) in contour {
            result.push(x);
            result.push(y);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_empty_mask() {
        let mask = Array2::<u8>::zeros((10, 10));
        assert!(extract_contours(mask.view()).is_empty());
    }

    #[test]
    fn test_full_mask_has_one_outline() {
        let mask = Array2::<u8>::from_elem((5, 5), 255);
        let contours = extract_contours(mask.view());
        assert_eq!(contours.len(), 1);
        // The outline is the 16-pixel border ring; interior pixels have no
        // unselected 4-neighbor.
        assert_eq!(contours[0].len(), 16);
    }

    #[test]
    fn test_single_pixel() {
        let mut mask = Array2::<u8>::zeros((5, 5));
        mask[[2, 2]] = 255;
        let contours = extract_contours(mask.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0], vec![(2.5, 2.5)]);
    }

    #[test]
    fn test_rectangle_outline() {
        let mut mask = Array2::<u8>::zeros((10, 10));
        for y in 2..5 {
            for x in 3..7 {
                mask[[y, x]] = 255;
            }
        }
        let contours = extract_contours(mask.view());
        assert_eq!(contours.len(), 1);
        // 4x3 rect: every pixel except the two 1-wide interior ones is on
        // the boundary.
        assert_eq!(contours[0].len(), 10);
        for &(x, y) in &contours[0] {
            assert!((3.5..=6.5).contains(&x));
            assert!((2.5..=4.5).contains(&y));
        }
    }

    #[test]
    fn test_two_blobs_two_contours() {
        let mut mask = Array2::<u8>::zeros((8, 8));
        mask[[1, 1]] = 255;
        for y in 4..7 {
            for x in 4..7 {
                mask[[y, x]] = 255;
            }
        }
        let contours = extract_contours(mask.view());
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn test_flat_encoding() {
        let mut mask = Array2::<u8>::zeros((4, 4));
        mask[[1, 1]] = 255;
        let flat = extract_contours_flat(mask.view());
        assert_eq!(flat, vec![1.0, 1.0, 1.5, 1.5]);
    }
}
