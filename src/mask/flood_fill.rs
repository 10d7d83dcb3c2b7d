//! Magic wand selection using flood fill.
//!
//! Grows a selected set of pixels whose color is within a tolerance of the
//! seed color, either by connectivity (queue-based flood) or globally over
//! the whole buffer.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView3};

use crate::geometry::Rect;
use crate::mask::Region;

/// Options controlling a magic wand selection.
#[derive(Clone, Copy, Debug)]
pub struct FloodOptions {
    /// Per-channel color tolerance (0 = exact match).
    pub tolerance: u8,
    /// If true, only pixels connected to the seed are selected; if false,
    /// every matching pixel in the buffer is selected.
    pub contiguous: bool,
    /// If true, connectivity is 8-way (diagonals connect); otherwise 4-way.
    pub diagonal: bool,
}

impl Default for FloodOptions {
    fn default() -> Self {
        FloodOptions {
            tolerance: 0,
            contiguous: true,
            diagonal: false,
        }
    }
}

const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Perform a magic wand selection seeded at (seed_x, seed_y).
///
/// # Arguments
/// * `image` - RGBA image, shape (height, width, 4)
/// * `seed_x`, `seed_y` - Seed coordinates in pixel space
/// * `options` - Tolerance and connectivity settings
///
/// # Returns
/// A freeform [`Region`] whose mask is cropped tight to the minimal bounding
/// rectangle of the selected pixels, or `None` for an out-of-bounds seed or
/// zero matches.
pub fn flood_select(
    image: ArrayView3<u8>,
    seed_x: i32,
    seed_y: i32,
    options: &FloodOptions,
) -> Option<Region> {
    let (height, width, channels) = image.dim();
    debug_assert_eq!(channels, 4, "flood_select expects RGBA input");

    if width == 0 || height == 0 {
        return None;
    }
    if seed_x < 0 || seed_y < 0 || seed_x as usize >= width || seed_y as usize >= height {
        return None;
    }
    let sx = seed_x as usize;
    let sy = seed_y as usize;

    let reference = [
        image[[sy, sx, 0]],
        image[[sy, sx, 1]],
        image[[sy, sx, 2]],
        image[[sy, sx, 3]],
    ];
    let tol = options.tolerance as i32;

    let mut mask = Array2::<u8>::zeros((height, width));
    let mut pixel_count = 0usize;
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0usize;
    let mut max_y = 0usize;

    let mut select = |mask: &mut Array2<u8>, x: usize, y: usize| {
        mask[[y, x]] = 255;
        pixel_count += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    };

    if options.contiguous {
        let neighbors: &[(i32, i32)] = if options.diagonal {
            &NEIGHBORS_8
        } else {
            &NEIGHBORS_4
        };

        let mut queue = VecDeque::new();
        let mut visited = Array2::<bool>::default((height, width));
        queue.push_back((sx, sy));
        visited[[sy, sx]] = true;

        while let Some((x, y)) = queue.pop_front() {
            if !color_matches(&image, x, y, &reference, tol) {
                continue;
            }
            select(&mut mask, x, y);

            for &(dx, dy) in neighbors {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx >= 0 && nx < width as i32 && ny >= 0 && ny < height as i32 {
                    let (nx, ny) = (nx as usize, ny as usize);
                    if !visited[[ny, nx]] {
                        visited[[ny, nx]] = true;
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    } else {
        for y in 0..height {
            for x in 0..width {
                if color_matches(&image, x, y, &reference, tol) {
                    select(&mut mask, x, y);
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

    // The tight crop always matches the bounds computed above.
    Region::freeform(bounds, tight).ok()
}

/// Check if the pixel at (x, y) is within tolerance of the reference color.
/// Every RGBA channel must be within tolerance independently.
#[inline]
fn color_matches(
    image: &ArrayView3<u8>,
    x: usize,
    y: usize,
    reference: &[u8; 4],
    tolerance: i32,
) -> bool {
    (0..4).all(|c| (image[[y, x, c]] as i32 - reference[c] as i32).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn solid(width: usize, height: usize, color: [u8; 4]) -> Array3<u8> {
        Array3::from_shape_fn((height, width, 4), |(_, _, c)| color[c])
    }

    fn put(image: &mut Array3<u8>, x: usize, y: usize, color: [u8; 4]) {
        for c in 0..4 {
            image[[y, x, c]] = color[c];
        }
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn test_uniform_buffer_selects_everything() {
        let image = solid(10, 10, RED);
        for seed in [(0, 0), (5, 5), (9, 9)] {
            let region =
                flood_select(image.view(), seed.0, seed.1, &FloodOptions::default()).unwrap();
            assert_eq!(region.bounds, Rect::new(0, 0, 10, 10));
            assert_eq!(region.pixel_count(), 100);
        }
    }

    #[test]
    fn test_out_of_bounds_seed() {
        let image = solid(4, 4, RED);
        let opts = FloodOptions::default();
        assert!(flood_select(image.view(), -1, 0, &opts).is_none());
        assert!(flood_select(image.view(), 0, 4, &opts).is_none());
    }

    #[test]
    fn test_contiguous_stops_at_color_boundary() {
        // Left half red, right half blue.
        let mut image = solid(4, 4, RED);
        for y in 0..4 {
            for x in 2..4 {
                put(&mut image, x, y, BLUE);
            }
        }
        let region = flood_select(image.view(), 0, 0, &FloodOptions::default()).unwrap();
        assert_eq!(region.bounds, Rect::new(0, 0, 2, 4));
        assert_eq!(region.pixel_count(), 8);
    }

    #[test]
    fn test_checkerboard_component_inside_border() {
        // 6x6 red border enclosing a 4x4 red/blue checkerboard. Seeding on a
        // blue interior square with 4-way connectivity must select only blue
        // squares, tight bounds around them.
        let mut image = solid(6, 6, RED);
        for y in 1..5 {
            for x in 1..5 {
                if (x + y) % 2 == 0 {
                    put(&mut image, x, y, BLUE);
                }
            }
        }
        let region = flood_select(image.view(), 1, 1, &FloodOptions::default()).unwrap();
        // 4-way: only the seeded blue square, diagonals do not connect.
        assert_eq!(region.pixel_count(), 1);
        assert_eq!(region.bounds, Rect::new(1, 1, 1, 1));

        // 8-way: all 8 blue squares of the checkerboard connect.
        let opts = FloodOptions {
            diagonal: true,
            ..FloodOptions::default()
        };
        let region = flood_select(image.view(), 1, 1, &opts).unwrap();
        assert_eq!(region.pixel_count(), 8);
        assert_eq!(region.bounds, Rect::new(1, 1, 4, 4));
        for y in 1..5 {
            for x in 1..5 {
                assert_eq!(region.contains(x, y), (x + y) % 2 == 0);
            }
        }
    }

    #[test]
    fn test_non_contiguous_selects_all_matches() {
        let mut image = solid(5, 5, RED);
        put(&mut image, 0, 0, BLUE);
        put(&mut image, 4, 4, BLUE);
        let opts = FloodOptions {
            contiguous: false,
            ..FloodOptions::default()
        };
        let region = flood_select(image.view(), 0, 0, &opts).unwrap();
        assert_eq!(region.pixel_count(), 2);
        assert_eq!(region.bounds, Rect::new(0, 0, 5, 5));
        assert!(region.contains(0, 0));
        assert!(region.contains(4, 4));
        assert!(!region.contains(2, 2));
    }

    #[test]
    fn test_tolerance_expands_match() {
        let mut image = solid(3, 1, [100, 0, 0, 255]);
        put(&mut image, 1, 0, [110, 0, 0, 255]);
        put(&mut image, 2, 0, [130, 0, 0, 255]);

        let opts = FloodOptions {
            tolerance: 10,
            ..FloodOptions::default()
        };
        let region = flood_select(image.view(), 0, 0, &opts).unwrap();
        // 130 is within tolerance of nothing reachable: the flood compares
        // against the seed color, so only 100 and 110 match.
        assert_eq!(region.pixel_count(), 2);
        assert_eq!(region.bounds, Rect::new(0, 0, 2, 1));
    }
}
