use thiserror::Error;

use crate::axis::{Axis, AxisDirection};

/// Fatal configuration errors surfaced by viewport layout.
///
/// Scroll-offset corrections are not errors; they are the normal convergence
/// mechanism and are reported as plain values by the layout sequencer.
#[derive(Debug, Error)]
pub enum ViewportError {
    /// A fixed-size viewport was given an unbounded extent on one of its
    /// axes. Such a viewport expands to fill its container, which is
    /// meaningless inside an unbounded context.
    #[error(
        "{axis:?} viewport (axis direction {axis_direction:?}) was given unbounded \
         {axis:?} constraints: a viewport expands to fill its container along both axes, \
         so it cannot be placed inside a context with infinite {axis:?} extent; \
         either bound that axis or use a shrink-wrapping viewport"
    )]
    UnboundedAxis {
        axis: Axis,
        axis_direction: AxisDirection,
    },

    /// The anchored fixed-point loop did not settle within its iteration
    /// cap, which indicates a non-converging interaction between children's
    /// scroll-offset corrections and the scroll position.
    #[error(
        "viewport layout attempted {cycles} correction cycles without converging: \
         a child sliver and the scroll position keep demanding corrections of each other; \
         this is a defect in one of the attached slivers"
    )]
    DidNotConverge { cycles: usize },

    /// A child sliver reported a geometry that violates the sliver contract.
    #[error("sliver child {child} produced invalid geometry: {reason}")]
    InvalidGeometry { child: isize, reason: &'static str },
}
