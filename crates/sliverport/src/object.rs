use kurbo::Vec2;

use crate::hit_test::SliverHitTestResult;
use crate::paint::PaintCtx;
use crate::sliver::{SliverConstraints, SliverGeometry};

/// The contract a segment node offers its enclosing viewport.
///
/// Given constraints, a sliver deterministically produces a geometry; the
/// viewport stores the result alongside the child and never calls back into
/// the sliver for the rest of the pass. A sliver's layout must not mutate the
/// viewport's child list.
pub trait RenderSliver {
    /// Computes this sliver's geometry for the given constraints.
    ///
    /// A non-zero [`SliverGeometry::scroll_offset_correction`] aborts the
    /// enclosing layout attempt; the sliver will be laid out again in the
    /// same pass once the correction has been applied, so it need not fill
    /// in the rest of the geometry in that case.
    fn layout(&mut self, constraints: &SliverConstraints) -> SliverGeometry;

    /// Paints this sliver with its paint origin at `offset`.
    fn paint(&mut self, _ctx: &mut PaintCtx<'_>, _offset: Vec2) {}

    /// Hit-tests this sliver's content.
    ///
    /// `main_axis_position` and `cross_axis_position` are already translated
    /// into this sliver's coordinate space, and the enclosing viewport has
    /// already checked them against the sliver's hit-test extent and cross
    /// extent. Returns true if the sliver claims the hit.
    fn hit_test(
        &mut self,
        _result: &mut SliverHitTestResult,
        _main_axis_position: f64,
        _cross_axis_position: f64,
    ) -> bool {
        false
    }

    /// An adjustment to the anchored viewport's center offset requested by
    /// this sliver when it is the center child, e.g. to visually center
    /// itself on the anchor line.
    fn center_offset_adjustment(&self) -> f64 {
        0.0
    }
}
