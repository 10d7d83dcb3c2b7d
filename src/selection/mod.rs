//! Selection state and the transform-drag workflow.
//!
//! [`state`] owns the single-selection state machine, [`transform`] drives
//! rotation/scale previews on top of it, and [`contour`] turns masks into
//! the outlines the marching-ants overlay draws.

pub mod contour;
pub mod state;
pub mod transform;

pub use contour::{extract_contours, extract_contours_flat};
pub use state::{Selection, SelectionEngine, TransformSnapshot};
pub use transform::{FrameThrottle, TransformCommit};
