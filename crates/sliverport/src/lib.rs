//! A constraint-propagating scroll layout engine.
//!
//! Content is composed of "slivers": segments laid out along a single main
//! axis that each occupy a window of the scrollable content. A viewport
//! gives each sliver [`sliver::SliverConstraints`] describing the portion of
//! itself currently scrolled into view and reads back a
//! [`sliver::SliverGeometry`]; the viewport variants in [`anchored`] and
//! [`shrink_wrap`] drive that protocol, converge on a stable scroll
//! position, and dispatch painting and hit testing.

pub mod anchored;
pub mod axis;
pub mod box_constraints;
pub mod error;
pub mod object;
pub mod paint;
pub mod shrink_wrap;
pub mod sliver;
#[cfg(test)]
mod testing;
pub mod tree;
pub mod viewport;
pub mod viewport_offset;

pub use anchored::Viewport;
pub use axis::{Axis, AxisDirection};
pub use box_constraints::BoxConstraints;
pub use error::ViewportError;
pub use hit_test::{SliverHitTestEntry, SliverHitTestResult};
pub use object::RenderSliver;
pub use paint::{PaintCtx, RenderBackend};
pub use shrink_wrap::ShrinkWrappingViewport;
pub use sliver::{GrowthDirection, ScrollDirection, SliverConstraints, SliverGeometry};
pub use tree::{Children, SliverChild};
pub use viewport::{AbstractViewport, RevealTarget, ViewportBase};
pub use viewport_offset::{ListenerGuard, OffsetHandle, ScrollPosition, ViewportOffset};
