//! The selection state machine.
//!
//! Exactly one [`Selection`] value exists per engine instance. Every public
//! mutator pattern-matches the current variant first and is a silent no-op
//! (never an error) when called from an incompatible state; each legal
//! transition fully replaces the previous value, so observers always see a
//! self-consistent snapshot between events.
//!
//! ```text
//! none -> selecting -> selected <-> floating <-> transforming
//!            |             |            |             |
//!            +------------ clear / commit ------------+-> none
//! ```

use ndarray::{Array2, Array3, ArrayView3};

use crate::clean_edge::CleanEdgeOptions;
use crate::geometry::Rect;
use crate::mask::{algebra, Region, Shape};
use crate::selection::transform::FrameThrottle;

/// The current selection, as a tagged union.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Selection {
    /// No selection.
    #[default]
    None,
    /// A drag is in progress; bounds follow the pointer.
    Selecting {
        shape: Shape,
        anchor: (i32, i32),
        bounds: Rect,
    },
    /// A finalized selection. The pixels still live in the raster surface.
    Selected { region: Region },
    /// The pixels have been lifted out of the surface into `image` and can
    /// be moved before being committed back.
    Floating { image: Array3<u8>, region: Region },
    /// A rotation/scale drag of a floating selection is in progress.
    Transforming(TransformSnapshot),
}

/// Working data of an in-progress transform. Lives only inside
/// [`Selection::Transforming`]; destroyed on commit or cancel.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSnapshot {
    /// The untransformed pixels. Previews are always regenerated from this,
    /// never from a previous preview, to avoid cumulative quality loss.
    pub original_image: Array3<u8>,
    pub original_bounds: Rect,
    /// Placement of the current preview (rotated extent, offset applied).
    pub current_bounds: Rect,
    pub offset: (i32, i32),
    pub rotation_degrees: f32,
    pub scale: (f32, f32),
    pub preview_image: Option<Array3<u8>>,
    pub shape: Shape,
    pub mask: Option<Array2<u8>>,
}

/// Owned service object holding the single current selection.
///
/// Tools and commands receive a `&mut SelectionEngine`; there is no hidden
/// global.
#[derive(Debug, Default)]
pub struct SelectionEngine {
    pub(crate) current: Selection,
    pub(crate) clean_edge: CleanEdgeOptions,
    pub(crate) throttle: FrameThrottle,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(clean_edge: CleanEdgeOptions) -> Self {
        SelectionEngine {
            clean_edge,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.current
    }

    pub fn is_transforming(&self) -> bool {
        matches!(self.current, Selection::Transforming(_))
    }

    /// Bounds of the selection as currently visible, if any.
    pub fn visible_bounds(&self) -> Option<Rect> {
        match &self.current {
            Selection::None => None,
            Selection::Selecting { bounds, .. } => Some(*bounds),
            Selection::Selected { region } | Selection::Floating { region, .. } => {
                Some(region.bounds)
            }
            Selection::Transforming(snapshot) => Some(snapshot.current_bounds),
        }
    }

    /// `none -> selecting`: anchor a new drag at `point`.
    pub fn start_selection(&mut self, shape: Shape, point: (i32, i32)) {
        if !matches!(self.current, Selection::None) {
            log::debug!("start_selection ignored: selection already active");
            return;
        }
        self.current = Selection::Selecting {
            shape,
            anchor: point,
            bounds: Rect::from_points(point.0, point.1, point.0, point.1),
        };
    }

    /// `selecting -> selecting`: recompute bounds from the drag anchor.
    /// With `square`, the shorter side is stretched to the longer one,
    /// growing away from the anchor.
    pub fn update_selection(&mut self, point: (i32, i32), square: bool) {
        let Selection::Selecting { anchor, bounds, .. } = &mut self.current else {
            log::debug!("update_selection ignored: not selecting");
            return;
        };
        let mut rect = Rect::from_points(anchor.0, anchor.1, point.0, point.1);
        if square {
            let side = rect.width.max(rect.height);
            if point.0 < anchor.0 {
                rect.x = anchor.0 - side as i32 + 1;
            }
            if point.1 < anchor.1 {
                rect.y = anchor.1 - side as i32 + 1;
            }
            rect.width = side;
            rect.height = side;
        }
        *bounds = rect;
    }

    /// `selecting -> selected` for rectangle/ellipse shapes. Degenerate
    /// drags (smaller than 2x1 or 1x2) are discarded back to `none`.
    pub fn finalize_selection(&mut self) {
        let &Selection::Selecting { shape, bounds, .. } = &self.current else {
            log::debug!("finalize_selection ignored: not selecting");
            return;
        };
        if bounds.width * bounds.height < 2 {
            self.current = Selection::None;
            return;
        }
        let region = match shape {
            Shape::Rectangle => Region::rectangle(bounds),
            Shape::Ellipse => Region::ellipse(bounds),
            // Freeform drags must come with a mask; see
            // finalize_freeform_selection.
            Shape::Freeform => {
                log::warn!("freeform selection finalized without a mask; clearing");
                self.current = Selection::None;
                return;
            }
        };
        self.current = Selection::Selected { region };
    }

    /// Finalize a freeform (lasso / magic wand) selection from an
    /// externally rasterized region. An inconsistent region is rejected and
    /// the selection cleared rather than left half-valid.
    pub fn finalize_freeform_selection(&mut self, bounds: Rect, mask: Array2<u8>) {
        if !matches!(
            self.current,
            Selection::None | Selection::Selecting { .. }
        ) {
            log::debug!("finalize_freeform_selection ignored: selection already active");
            return;
        }
        match Region::freeform(bounds, mask) {
            Ok(region) => self.current = Selection::Selected { region },
            Err(err) => {
                log::warn!("rejecting freeform selection: {err}");
                self.current = Selection::None;
            }
        }
    }

    /// Replace a `selected` region wholesale (selection-mode combine
    /// results land here).
    pub fn replace_selected(&mut self, region: Region) {
        if !matches!(
            self.current,
            Selection::Selected { .. } | Selection::None
        ) {
            log::debug!("replace_selected ignored: wrong state");
            return;
        }
        self.current = Selection::Selected { region };
    }

    /// `selected -> floating`: a cut command has lifted `image` out of the
    /// raster surface.
    pub fn set_floating(&mut self, image: Array3<u8>, region: Region) {
        if !matches!(self.current, Selection::Selected { .. }) {
            log::debug!("set_floating ignored: nothing selected");
            return;
        }
        debug_assert_eq!(
            image.dim(),
            (
                region.bounds.height as usize,
                region.bounds.width as usize,
                4
            ),
            "floating image must match its bounds"
        );
        self.current = Selection::Floating { image, region };
    }

    /// `floating -> selected`: inverse of [`set_floating`], driven by a cut
    /// command's undo. The lifted pixels go back to the surface, the engine
    /// only drops its copy.
    ///
    /// [`set_floating`]: SelectionEngine::set_floating
    pub fn set_selected(&mut self, region: Region) {
        if !matches!(self.current, Selection::Floating { .. }) {
            log::debug!("set_selected ignored: nothing floating");
            return;
        }
        self.current = Selection::Selected { region };
    }

    /// `floating -> floating`: move the lifted pixels by a delta.
    pub fn nudge(&mut self, dx: i32, dy: i32) {
        let Selection::Floating { region, .. } = &mut self.current else {
            log::debug!("nudge ignored: nothing floating");
            return;
        };
        region.bounds = region.bounds.translated(dx, dy);
    }

    /// `selected -> selected`: trim bounds/mask to the smallest rectangle
    /// containing non-transparent surface pixels. Falls through to `none`
    /// when the selection only covers transparency.
    pub fn shrink_to_content(&mut self, surface: ArrayView3<u8>) {
        let Selection::Selected { region } = &self.current else {
            log::debug!("shrink_to_content ignored: nothing selected");
            return;
        };
        self.current = match algebra::trim_to_content(surface, region) {
            Some(trimmed) => Selection::Selected { region: trimmed },
            None => Selection::None,
        };
    }

    /// Any state -> `none`.
    pub fn clear(&mut self) {
        self.current = Selection::None;
        self.throttle.reset();
    }

    /// `selected | floating | transforming -> none`, driven externally once
    /// the command layer has written pixels back to the surface.
    pub fn clear_after_commit(&mut self) {
        if matches!(self.current, Selection::None | Selection::Selecting { .. }) {
            log::debug!("clear_after_commit ignored: nothing to commit");
            return;
        }
        self.clear();
    }
}
