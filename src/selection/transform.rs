//! The transform-drag workflow: rotation/scale/offset of a floating
//! selection, with frame-throttled preview regeneration.
//!
//! Previews are always recomputed from the original (untransformed) buffer,
//! never composed incrementally, so repeated drags cannot accumulate
//! resampling loss. During a drag, regeneration is throttled to once per
//! display refresh at draft quality; drag end forces one final-quality pass.

use ndarray::{Array2, Array3};

use crate::clean_edge::{self, Quality};
use crate::geometry::Rect;
use crate::mask::{Region, Shape};
use crate::selection::state::{Selection, SelectionEngine, TransformSnapshot};

/// "Pending request + single in-flight task" guard.
///
/// Portable stand-in for a requestAnimationFrame-style scheduler: the host
/// calls [`SelectionEngine::frame_tick`] once per display refresh and the
/// throttle makes sure at most one preview regeneration runs per tick, with
/// the latest requested parameters.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: bool,
    in_flight: bool,
}

impl FrameThrottle {
    /// Record that parameters changed and a new preview is wanted.
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Claim the pending request for this frame. Returns false when there
    /// is nothing to do or a regeneration is already running.
    pub fn take(&mut self) -> bool {
        if self.pending && !self.in_flight {
            self.pending = false;
            self.in_flight = true;
            true
        } else {
            false
        }
    }

    /// The claimed regeneration finished; the next tick may run again.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    /// Drop any pending request (drag ended or transform left).
    pub fn reset(&mut self) {
        self.pending = false;
        self.in_flight = false;
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

/// Everything the command layer needs to write a committed transform back
/// to the raster surface (and to undo it later).
#[derive(Clone, Debug, PartialEq)]
pub struct TransformCommit {
    pub original_image: Array3<u8>,
    pub original_bounds: Rect,
    /// Final-quality transformed pixels.
    pub transformed_image: Array3<u8>,
    /// Where the transformed pixels land, offset included.
    pub current_bounds: Rect,
    pub rotation_degrees: f32,
    pub scale: (f32, f32),
    pub offset: (i32, i32),
    pub shape: Shape,
    pub mask: Option<Array2<u8>>,
}

impl SelectionEngine {
    /// `floating -> transforming`: begin a rotation/scale drag. The
    /// floating buffer becomes the transform's original; parameters start
    /// at identity.
    pub fn start_transform(&mut self) {
        let Selection::Floating { image, region } = &self.current else {
            log::debug!("start_transform ignored: nothing floating");
            return;
        };
        let snapshot = TransformSnapshot {
            original_image: image.clone(),
            original_bounds: region.bounds,
            current_bounds: region.bounds,
            offset: (0, 0),
            rotation_degrees: 0.0,
            scale: (1.0, 1.0),
            preview_image: None,
            shape: region.shape,
            mask: region.mask.clone(),
        };
        self.throttle.reset();
        self.current = Selection::Transforming(snapshot);
    }

    /// Update the requested rotation angle (degrees). Takes effect on the
    /// next frame tick.
    pub fn set_rotation(&mut self, degrees: f32) {
        let Selection::Transforming(snapshot) = &mut self.current else {
            log::debug!("set_rotation ignored: not transforming");
            return;
        };
        snapshot.rotation_degrees = clean_edge::normalize_angle(degrees);
        snapshot.current_bounds = placed_bounds(snapshot);
        self.throttle.request();
    }

    /// Update the requested scale factors. Takes effect on the next frame
    /// tick.
    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        let Selection::Transforming(snapshot) = &mut self.current else {
            log::debug!("set_scale ignored: not transforming");
            return;
        };
        if sx <= 0.0 || sy <= 0.0 {
            log::warn!("ignoring non-positive scale ({sx}, {sy})");
            return;
        }
        snapshot.scale = (sx, sy);
        snapshot.current_bounds = placed_bounds(snapshot);
        self.throttle.request();
    }

    /// Move the live preview by setting the offset from the original
    /// position. Cheap: no preview regeneration, only placement.
    pub fn set_offset(&mut self, dx: i32, dy: i32) {
        let Selection::Transforming(snapshot) = &mut self.current else {
            log::debug!("set_offset ignored: not transforming");
            return;
        };
        snapshot.offset = (dx, dy);
        snapshot.current_bounds = placed_bounds(snapshot);
    }

    /// One display refresh: regenerate a draft-quality preview if
    /// parameters changed since the last tick. Returns whether a
    /// regeneration ran (the host redraws only in that case).
    pub fn frame_tick(&mut self) -> bool {
        if !self.is_transforming() {
            return false;
        }
        if !self.throttle.take() {
            return false;
        }
        self.regenerate_preview(Quality::Draft);
        self.throttle.complete();
        true
    }

    /// Drag ended: drop any pending throttled request and force one
    /// final-quality regeneration so no draft preview is left visible.
    pub fn end_drag(&mut self) {
        if !self.is_transforming() {
            log::debug!("end_drag ignored: not transforming");
            return;
        }
        self.throttle.reset();
        self.regenerate_preview(Quality::Final);
    }

    /// Commit the transform.
    ///
    /// Returns `None` — silently cancelling back to `floating` — when
    /// nothing actually changed (identity rotation, scale and offset).
    /// Otherwise hands the final buffers to the command layer and clears to
    /// `none`; the command layer owns writing them into the surface.
    pub fn commit_transform(&mut self) -> Option<TransformCommit> {
        let Selection::Transforming(snapshot) = &self.current else {
            log::debug!("commit_transform ignored: not transforming");
            return None;
        };
        let identity = snapshot.rotation_degrees == 0.0
            && snapshot.scale == (1.0, 1.0)
            && snapshot.offset == (0, 0);
        if identity {
            self.cancel_transform();
            return None;
        }

        // Make sure the handed-off buffer is final quality even if the host
        // skipped end_drag.
        self.regenerate_preview(Quality::Final);
        let Selection::Transforming(snapshot) = std::mem::take(&mut self.current) else {
            return None;
        };
        self.throttle.reset();

        let transformed_image = snapshot
            .preview_image
            .unwrap_or_else(|| snapshot.original_image.clone());
        Some(TransformCommit {
            original_image: snapshot.original_image,
            original_bounds: snapshot.original_bounds,
            transformed_image,
            current_bounds: snapshot.current_bounds,
            rotation_degrees: snapshot.rotation_degrees,
            scale: snapshot.scale,
            offset: snapshot.offset,
            shape: snapshot.shape,
            mask: snapshot.mask,
        })
    }

    /// `transforming -> floating`: discard rotation, scale AND offset,
    /// restoring the pre-transform image at its pre-transform bounds.
    ///
    /// The move offset does not survive cancel: a cancelled transform
    /// returns the selection exactly where the transform started.
    pub fn cancel_transform(&mut self) {
        if !self.is_transforming() {
            log::debug!("cancel_transform ignored: not transforming");
            return;
        }
        let Selection::Transforming(snapshot) = std::mem::take(&mut self.current) else {
            return;
        };
        self.throttle.reset();

        let region = restore_region(
            snapshot.original_bounds,
            snapshot.shape,
            snapshot.mask,
        );
        self.current = Selection::Floating {
            image: snapshot.original_image,
            region,
        };
    }

    /// Borrow the current preview, if one has been generated this drag.
    pub fn preview(&self) -> Option<&Array3<u8>> {
        match &self.current {
            Selection::Transforming(snapshot) => snapshot.preview_image.as_ref(),
            _ => None,
        }
    }

    fn regenerate_preview(&mut self, quality: Quality) {
        let options = self.clean_edge;
        let Selection::Transforming(snapshot) = &mut self.current else {
            return;
        };
        let scaled = if snapshot.scale != (1.0, 1.0) {
            clean_edge::scale(
                snapshot.original_image.view(),
                snapshot.scale.0,
                snapshot.scale.1,
                &options,
            )
        } else {
            snapshot.original_image.clone()
        };
        let transformed = if snapshot.rotation_degrees != 0.0 {
            clean_edge::rotate(scaled.view(), snapshot.rotation_degrees, quality, &options)
        } else {
            scaled
        };
        snapshot.preview_image = Some(transformed);
        snapshot.current_bounds = placed_bounds(snapshot);
    }
}

/// Placement of the transformed buffer: scaled then rotated extent,
/// centered on the original center, shifted by the offset.
fn placed_bounds(snapshot: &TransformSnapshot) -> Rect {
    let scaled_w =
        ((snapshot.original_bounds.width as f32 * snapshot.scale.0).round() as u32).max(1);
    let scaled_h =
        ((snapshot.original_bounds.height as f32 * snapshot.scale.1).round() as u32).max(1);
    let (w, h) = clean_edge::rotated_extent(
        scaled_w as usize,
        scaled_h as usize,
        snapshot.rotation_degrees,
    );

    let (cx, cy) = snapshot.original_bounds.center();
    let x = (cx - w as f32 / 2.0).round() as i32 + snapshot.offset.0;
    let y = (cy - h as f32 / 2.0).round() as i32 + snapshot.offset.1;
    Rect::new(x, y, w as u32, h as u32)
}

/// Rebuild the floating region for a cancelled transform.
fn restore_region(bounds: Rect, shape: Shape, mask: Option<Array2<u8>>) -> Region {
    match (shape, mask) {
        (Shape::Freeform, Some(mask)) => {
            Region::freeform(bounds, mask).unwrap_or_else(|err| {
                // Contract violation: the snapshot was built from a valid
                // region, so the mask cannot have changed size.
                debug_assert!(false, "snapshot mask inconsistent: {err}");
                Region::rectangle(bounds)
            })
        }
        (Shape::Rectangle, _) => Region::rectangle(bounds),
        (Shape::Ellipse, _) => Region::ellipse(bounds),
        (Shape::Freeform, None) => {
            debug_assert!(false, "freeform snapshot without mask");
            Region::rectangle(bounds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::Shape;

    fn solid(width: usize, height: usize, color: [u8; 4]) -> Array3<u8> {
        Array3::from_shape_fn((height, width, 4), |(_, _, c)| color[c])
    }

    /// Engine in `floating` state over a w x h buffer at (x, y).
    fn floating_engine(bounds: Rect) -> SelectionEngine {
        let mut engine = SelectionEngine::new();
        engine.start_selection(Shape::Rectangle, (bounds.x, bounds.y));
        engine.update_selection((bounds.right() - 1, bounds.bottom() - 1), false);
        engine.finalize_selection();
        engine.set_floating(
            solid(bounds.width as usize, bounds.height as usize, [50, 60, 70, 255]),
            Region::rectangle(bounds),
        );
        assert!(matches!(engine.selection(), Selection::Floating { .. }));
        engine
    }

    #[test]
    fn test_start_transform_is_identity() {
        let mut engine = floating_engine(Rect::new(2, 2, 6, 4));
        engine.start_transform();
        assert!(engine.is_transforming());
        assert_eq!(engine.visible_bounds(), Some(Rect::new(2, 2, 6, 4)));
        assert!(engine.preview().is_none());
    }

    #[test]
    fn test_frame_throttle_coalesces_updates() {
        let mut engine = floating_engine(Rect::new(0, 0, 4, 4));
        engine.start_transform();

        // Many parameter updates within one frame produce one regeneration.
        engine.set_rotation(10.0);
        engine.set_rotation(20.0);
        engine.set_rotation(30.0);
        assert!(engine.throttle.has_pending());
        assert!(engine.frame_tick());
        assert!(engine.preview().is_some());

        // Nothing new requested: the next tick is idle.
        assert!(!engine.throttle.has_pending());
        assert!(!engine.frame_tick());

        engine.set_rotation(40.0);
        assert!(engine.frame_tick());
    }

    #[test]
    fn test_frame_tick_outside_transform_is_idle() {
        let mut engine = floating_engine(Rect::new(0, 0, 4, 4));
        assert!(!engine.frame_tick());
    }

    #[test]
    fn test_end_drag_clears_pending_and_forces_final() {
        let mut engine = floating_engine(Rect::new(0, 0, 4, 4));
        engine.start_transform();
        engine.set_rotation(45.0);
        engine.end_drag();
        assert!(engine.preview().is_some());
        // The throttled request was consumed by the final pass.
        assert!(!engine.frame_tick());
    }

    #[test]
    fn test_rotation_90_swaps_current_bounds() {
        let mut engine = floating_engine(Rect::new(10, 20, 6, 2));
        engine.start_transform();
        engine.set_rotation(90.0);
        engine.end_drag();

        let bounds = engine.visible_bounds().unwrap();
        assert_eq!((bounds.width, bounds.height), (2, 6));
        // Still centered on the original center (13, 21).
        assert_eq!(bounds, Rect::new(12, 18, 2, 6));

        let commit = engine.commit_transform().unwrap();
        assert_eq!(commit.original_bounds, Rect::new(10, 20, 6, 2));
        assert_eq!(
            (commit.current_bounds.width, commit.current_bounds.height),
            (2, 6)
        );
        assert_eq!(commit.transformed_image.dim(), (6, 2, 4));
        assert_eq!(*engine.selection(), Selection::None);
    }

    #[test]
    fn test_identity_commit_is_a_silent_cancel() {
        let mut engine = floating_engine(Rect::new(3, 3, 4, 4));
        engine.start_transform();
        assert!(engine.commit_transform().is_none());
        assert!(matches!(engine.selection(), Selection::Floating { .. }));
        assert_eq!(engine.visible_bounds(), Some(Rect::new(3, 3, 4, 4)));
    }

    #[test]
    fn test_full_turn_commit_with_offset_still_commits() {
        // Rotating a full 360 normalizes to 0, but a non-zero offset still
        // counts as a change.
        let mut engine = floating_engine(Rect::new(0, 0, 4, 4));
        engine.start_transform();
        engine.set_rotation(360.0);
        engine.set_offset(5, 0);
        let commit = engine.commit_transform().unwrap();
        assert_eq!(commit.rotation_degrees, 0.0);
        assert_eq!(commit.current_bounds, Rect::new(5, 0, 4, 4));
    }

    #[test]
    fn test_cancel_restores_pretransform_state() {
        let mut engine = floating_engine(Rect::new(4, 4, 4, 2));
        engine.start_transform();
        engine.set_rotation(90.0);
        engine.set_scale(2.0, 2.0);
        engine.set_offset(7, -3);
        engine.frame_tick();

        engine.cancel_transform();
        match engine.selection() {
            Selection::Floating { image, region } => {
                // Offset is discarded along with rotation and scale.
                assert_eq!(region.bounds, Rect::new(4, 4, 4, 2));
                assert_eq!(image.dim(), (2, 4, 4));
            }
            other => panic!("expected Floating, got {other:?}"),
        }
    }

    #[test]
    fn test_scale_changes_current_bounds() {
        let mut engine = floating_engine(Rect::new(0, 0, 4, 4));
        engine.start_transform();
        engine.set_scale(2.0, 1.5);
        engine.end_drag();
        let bounds = engine.visible_bounds().unwrap();
        assert_eq!((bounds.width, bounds.height), (8, 6));
        let commit = engine.commit_transform().unwrap();
        assert_eq!(commit.transformed_image.dim(), (6, 8, 4));
    }

    #[test]
    fn test_transform_mutators_noop_when_floating() {
        let mut engine = floating_engine(Rect::new(0, 0, 4, 4));
        let before = engine.selection().clone();
        engine.set_rotation(45.0);
        engine.set_scale(2.0, 2.0);
        engine.set_offset(1, 1);
        engine.end_drag();
        assert!(engine.commit_transform().is_none());
        assert_eq!(*engine.selection(), before);
    }
}
