use std::any::type_name;
use std::ops::{Index, IndexMut};

use kurbo::Vec2;

use crate::hit_test::{SliverHitTestEntry, SliverHitTestResult};
use crate::object::RenderSliver;
use crate::paint::PaintCtx;
use crate::sliver::{SliverConstraints, SliverGeometry};

/// The ordered sibling list of a viewport.
///
/// The viewport owns the list exclusively. Children may be added or removed
/// between layout passes, never during one; handles into the list are plain
/// indices, and bidirectional traversal is index arithmetic.
#[derive(Default)]
pub struct Children {
    renders: Vec<SliverChild>,
}

/// A sliver plus the side-channel state its parent viewport keeps for it.
pub struct SliverChild {
    name: &'static str,
    object: Box<dyn RenderSliver>,
    pub(crate) state: ChildState,
}

/// Per-child layout/paint state owned by the parent.
///
/// Recomputed every layout pass; between passes it is stale for children the
/// last pass visited and never read for ones it did not.
pub(crate) struct ChildState {
    pub(crate) constraints: Option<SliverConstraints>,
    pub(crate) geometry: SliverGeometry,
    pub(crate) position: ChildPosition,
}

/// Where a child was placed, in the parent's terms.
///
/// The anchored viewport resolves placement to an absolute 2-D paint offset
/// at store time; the shrink-wrapping viewport stores the main-axis layout
/// offset scalar and resolves it to a paint offset on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ChildPosition {
    Physical(Vec2),
    Logical(f64),
}

impl Default for ChildPosition {
    fn default() -> Self {
        ChildPosition::Physical(Vec2::ZERO)
    }
}

impl Children {
    pub fn new() -> Self {
        Children::default()
    }

    pub fn len(&self) -> usize {
        self.renders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renders.is_empty()
    }

    pub fn push(&mut self, child: SliverChild) {
        self.renders.push(child);
    }

    pub fn remove(&mut self, index: usize) -> SliverChild {
        self.renders.remove(index)
    }
}

impl Index<usize> for Children {
    type Output = SliverChild;

    fn index(&self, index: usize) -> &Self::Output {
        &self.renders[index]
    }
}

impl IndexMut<usize> for Children {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.renders[index]
    }
}

impl SliverChild {
    pub fn new<T>(object: T) -> Self
    where
        T: RenderSliver + 'static,
    {
        SliverChild {
            name: type_name::<T>(),
            object: Box::new(object),
            state: ChildState {
                constraints: None,
                geometry: SliverGeometry::ZERO,
                position: ChildPosition::default(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The geometry produced by the most recent layout. [`SliverGeometry::ZERO`]
    /// before the first pass.
    pub fn geometry(&self) -> &SliverGeometry {
        &self.state.geometry
    }

    /// The constraints used by the most recent layout.
    pub fn constraints(&self) -> Option<&SliverConstraints> {
        self.state.constraints.as_ref()
    }

    pub fn center_offset_adjustment(&self) -> f64 {
        self.object.center_offset_adjustment()
    }

    /// Lays the sliver out and records both the constraints and the
    /// resulting geometry.
    pub(crate) fn layout_sliver(&mut self, constraints: &SliverConstraints) -> SliverGeometry {
        let name = self.name;
        let span = tracing::span!(tracing::Level::DEBUG, "layout_sliver", name, ?constraints);
        let _h = span.enter();

        let geometry = self.object.layout(constraints);
        self.state.constraints = Some(constraints.clone());
        self.state.geometry = geometry.clone();
        geometry
    }

    pub(crate) fn paint(&mut self, ctx: &mut PaintCtx<'_>, offset: Vec2) {
        let name = self.name;
        let span = tracing::span!(tracing::Level::DEBUG, "paint_sliver", name, ?offset);
        let _h = span.enter();

        self.object.paint(ctx, offset);
    }

    /// Gates the hit position against this sliver's hit-test and cross
    /// extents, delegates to the sliver, and records an entry on acceptance.
    pub(crate) fn hit_test(
        &mut self,
        result: &mut SliverHitTestResult,
        main_axis_position: f64,
        cross_axis_position: f64,
    ) -> bool {
        let hit_test_extent = self.state.geometry.hit_test_extent;
        let cross_axis_extent = self
            .state
            .constraints
            .as_ref()
            .map(|c| c.cross_axis_extent)
            .unwrap_or(0.0);
        if main_axis_position >= 0.0
            && main_axis_position < hit_test_extent
            && cross_axis_position >= 0.0
            && cross_axis_position < cross_axis_extent
        {
            if self
                .object
                .hit_test(result, main_axis_position, cross_axis_position)
            {
                result.add(SliverHitTestEntry {
                    name: self.name,
                    main_axis_position,
                    cross_axis_position,
                });
                return true;
            }
        }
        false
    }
}
