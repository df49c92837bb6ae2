//! The viewport base driver: state shared by both viewport variants and the
//! main-axis layout sequencer that walks a run of sliver children.

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};

use crate::axis::{axis_direction_to_axis, Axis, AxisDirection};
use crate::error::ViewportError;
use crate::hit_test::SliverHitTestResult;
use crate::paint::PaintCtx;
use crate::sliver::{
    apply_growth_direction_to_axis_direction, apply_growth_direction_to_scroll_direction,
    GrowthDirection, SliverConstraints, SliverGeometry,
};
use crate::tree::Children;
use crate::viewport_offset::{ListenerGuard, OffsetHandle, ViewportOffset};

/// State every viewport variant carries: the axes, the scroll position it is
/// driven by, its laid-out size, and the scroll-position subscription.
pub struct ViewportBase {
    pub axis_direction: AxisDirection,
    pub cross_axis_direction: AxisDirection,
    offset: OffsetHandle,
    pub size: Size,
    needs_layout: Rc<Cell<bool>>,
    subscription: Option<ListenerGuard>,
}

impl ViewportBase {
    pub fn new(
        axis_direction: AxisDirection,
        cross_axis_direction: AxisDirection,
        offset: OffsetHandle,
    ) -> Self {
        ViewportBase {
            axis_direction,
            cross_axis_direction,
            offset,
            size: Size::ZERO,
            needs_layout: Rc::new(Cell::new(true)),
            subscription: None,
        }
    }

    pub fn axis(&self) -> Axis {
        axis_direction_to_axis(self.axis_direction)
    }

    pub fn offset(&self) -> &OffsetHandle {
        &self.offset
    }

    pub fn pixels(&self) -> f64 {
        self.offset.borrow().pixels()
    }

    /// Whether a scroll-position change has been observed since the last
    /// layout pass.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout.get()
    }

    pub fn mark_needs_layout(&self) {
        self.needs_layout.set(true);
    }

    pub(crate) fn clear_needs_layout(&self) {
        self.needs_layout.set(false);
    }

    /// Subscribes to the scroll position so that any pixel change flags this
    /// viewport for relayout.
    pub fn attach(&mut self) {
        let needs_layout = self.needs_layout.clone();
        let id = self
            .offset
            .borrow_mut()
            .add_listener(Box::new(move || needs_layout.set(true)));
        self.subscription = Some(ListenerGuard::new(&self.offset, id));
    }

    pub fn detach(&mut self) {
        self.subscription = None;
    }

    /// Swaps in a different scroll position.
    ///
    /// Always flags relayout, even if the new position reads the same pixel
    /// value: the viewport must re-report its dimensions and content extent
    /// to the new object.
    pub fn set_offset(&mut self, offset: OffsetHandle) {
        let was_attached = self.subscription.is_some();
        self.subscription = None;
        self.offset = offset;
        if was_attached {
            self.attach();
        }
        self.needs_layout.set(true);
    }

    pub fn main_axis_extent(&self) -> f64 {
        match self.axis() {
            Axis::Vertical => self.size.height,
            Axis::Horizontal => self.size.width,
        }
    }
}

/// A descendant to scroll into view, already resolved against this
/// viewport's child list.
///
/// Resolving a render-tree node down to the enclosing top-level sliver (and,
/// for box descendants, to the pivot box directly under a sliver) is the
/// widget layer's job; this type carries the result of that walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealTarget {
    /// The viewport itself, or a node not under any child: nothing to do.
    Viewport,
    /// A top-level sliver child, to be revealed in its entirety.
    Child(usize),
    /// A box descendant of child `child`.
    Descendant {
        child: usize,
        /// The scroll offsets of the pivot accumulated through any sliver
        /// ancestors between the pivot and the top-level child.
        ancestor_scroll_offset: f64,
        /// The size of the pivot box directly under a sliver.
        pivot_size: Size,
        /// The target's bounding rectangle in the pivot's coordinate space.
        bounds: Rect,
    },
}

/// The capability interface shared by the two viewport variants, plus the
/// variant-agnostic drivers built on it.
///
/// The provided methods implement everything that does not depend on how a
/// variant stores child offsets or aggregates extents: the child-run layout
/// sequencer, paint and hit-test dispatch, and reveal-offset computation.
/// The required methods are the variant hooks those drivers delegate to.
pub trait AbstractViewport {
    fn base(&self) -> &ViewportBase;
    fn base_mut(&mut self) -> &mut ViewportBase;
    fn children(&self) -> &Children;
    fn children_mut(&mut self) -> &mut Children;

    /// Whether the last layout pass left content that paints outside the
    /// viewport bounds.
    fn has_visual_overflow(&self) -> bool;

    /// Records where a child just laid out by the sequencer was placed.
    /// `layout_offset` is measured from the run's growth-direction origin.
    fn store_child_layout_offset(
        &mut self,
        index: usize,
        layout_offset: f64,
        growth_direction: GrowthDirection,
    );

    /// Folds one child's geometry into the variant's accumulated totals.
    fn update_out_of_band_data(&mut self, growth_direction: GrowthDirection, geometry: &SliverGeometry);

    /// Child indices back-to-front.
    fn paint_order(&self) -> Vec<usize>;

    /// The absolute paint offset of a laid-out child.
    fn paint_offset_of(&self, index: usize) -> Vec2;

    /// Converts a scroll offset within child `index` into this viewport's
    /// own scroll-offset space.
    fn scroll_offset_of(&self, index: usize, scroll_offset_within_child: f64) -> f64;

    /// Translates a main-axis hit position in the viewport's coordinate
    /// space into child `index`'s own space.
    fn compute_child_main_axis_position(&self, index: usize, parent_main_axis_position: f64)
        -> f64;

    /// A diagnostic index for the child, as this variant counts children.
    fn child_label(&self, index: usize) -> isize;

    /// Child indices front-to-back. Topmost-painted is tested first.
    fn hit_test_order(&self) -> Vec<usize> {
        let mut order = self.paint_order();
        order.reverse();
        order
    }

    /// Lays out one growth-direction run of children.
    ///
    /// Returns `Ok(0.0)` on a clean run, `Ok(correction)` as soon as any
    /// child demands a scroll-offset correction (the rest of the run is not
    /// visited), or an error for a child geometry that violates the sliver
    /// contract. `advance` yields the next child in the run, if any.
    #[allow(clippy::too_many_arguments)]
    fn layout_child_sequence(
        &mut self,
        first: Option<usize>,
        scroll_offset: f64,
        overlap: f64,
        layout_offset: f64,
        remaining_paint_extent: f64,
        main_axis_extent: f64,
        cross_axis_extent: f64,
        growth_direction: GrowthDirection,
        advance: &dyn Fn(usize) -> Option<usize>,
    ) -> Result<f64, ViewportError> {
        let initial_layout_offset = layout_offset;
        let mut scroll_offset = scroll_offset;
        let mut layout_offset = layout_offset;

        let (axis_direction, cross_axis_direction, user_scroll_direction) = {
            let base = self.base();
            (
                base.axis_direction,
                base.cross_axis_direction,
                base.offset().borrow().user_scroll_direction(),
            )
        };
        let adjusted_user_scroll_direction =
            apply_growth_direction_to_scroll_direction(user_scroll_direction, growth_direction);

        let mut max_paint_offset = layout_offset + overlap;
        let mut preceding_scroll_extent = 0.0;

        let mut current = first;
        while let Some(index) = current {
            let sliver_scroll_offset = scroll_offset.max(0.0);
            let child_constraints = SliverConstraints {
                axis_direction,
                growth_direction,
                user_scroll_direction: adjusted_user_scroll_direction,
                scroll_offset: sliver_scroll_offset,
                preceding_scroll_extent,
                overlap: max_paint_offset - layout_offset,
                remaining_paint_extent: (remaining_paint_extent - layout_offset
                    + initial_layout_offset)
                    .max(0.0),
                cross_axis_extent,
                cross_axis_direction,
                viewport_main_axis_extent: main_axis_extent,
            };
            let geometry = self.children_mut()[index].layout_sliver(&child_constraints);

            if geometry.scroll_offset_correction != 0.0 {
                return Ok(geometry.scroll_offset_correction);
            }
            if let Some(reason) = geometry.validity_error() {
                return Err(ViewportError::InvalidGeometry {
                    child: self.child_label(index),
                    reason,
                });
            }

            let effective_layout_offset = layout_offset + geometry.paint_origin;
            if geometry.visible || sliver_scroll_offset > 0.0 {
                self.store_child_layout_offset(index, effective_layout_offset, growth_direction);
            } else {
                self.store_child_layout_offset(
                    index,
                    -scroll_offset + initial_layout_offset,
                    growth_direction,
                );
            }

            max_paint_offset = (effective_layout_offset + geometry.paint_extent).max(max_paint_offset);
            scroll_offset -= geometry.scroll_extent;
            preceding_scroll_extent += geometry.scroll_extent;
            layout_offset += geometry.layout_extent;

            self.update_out_of_band_data(growth_direction, &geometry);

            current = advance(index);
        }
        Ok(0.0)
    }

    /// Paints all visible children in paint order, clipped to the viewport
    /// bounds when the last layout detected visual overflow.
    fn paint(&mut self, ctx: &mut PaintCtx<'_>) {
        if self.children().is_empty() {
            return;
        }
        if self.has_visual_overflow() {
            let bounds = self.base().size.to_rect();
            ctx.with_save(|ctx| {
                ctx.render_ctx.clip_rect(bounds);
                self.paint_contents(ctx);
            });
        } else {
            self.paint_contents(ctx);
        }
    }

    fn paint_contents(&mut self, ctx: &mut PaintCtx<'_>) {
        for index in self.paint_order() {
            if !self.children()[index].geometry().visible {
                continue;
            }
            let offset = self.paint_offset_of(index);
            self.children_mut()[index].paint(ctx, offset);
        }
    }

    /// Hit-tests `position` (in the viewport's coordinate space) against
    /// children front-to-back, stopping at the first that claims the hit.
    fn hit_test(&mut self, result: &mut SliverHitTestResult, position: Point) -> bool {
        let (main_axis_position, cross_axis_position) = match self.base().axis() {
            Axis::Vertical => (position.y, position.x),
            Axis::Horizontal => (position.x, position.y),
        };
        for index in self.hit_test_order() {
            if !self.children()[index].geometry().visible {
                continue;
            }
            let child_main = self.compute_child_main_axis_position(index, main_axis_position);
            if self.children_mut()[index].hit_test(result, child_main, cross_axis_position) {
                return true;
            }
        }
        false
    }

    /// The scroll pixel value that places `target` at the position
    /// interpolated between the viewport's leading edge (`alignment` 0) and
    /// trailing edge (`alignment` 1).
    fn get_offset_to_reveal(&self, target: &RevealTarget, alignment: f64) -> f64 {
        let (child, offset_within_child, target_main_axis_extent) = match *target {
            RevealTarget::Viewport => return self.base().pixels(),
            RevealTarget::Child(index) => {
                (index, 0.0, self.children()[index].geometry().scroll_extent)
            }
            RevealTarget::Descendant {
                child,
                ancestor_scroll_offset,
                pivot_size,
                bounds,
            } => {
                let growth_direction = child_growth_direction(self.children(), child);
                let (leading, extent) = match apply_growth_direction_to_axis_direction(
                    self.base().axis_direction,
                    growth_direction,
                ) {
                    AxisDirection::Up => (pivot_size.height - bounds.y1, bounds.height()),
                    AxisDirection::Right => (bounds.x0, bounds.width()),
                    AxisDirection::Down => (bounds.y0, bounds.height()),
                    AxisDirection::Left => (pivot_size.width - bounds.x1, bounds.width()),
                };
                (child, ancestor_scroll_offset + leading, extent)
            }
        };

        let mut leading_scroll_offset = self.scroll_offset_of(child, offset_within_child);
        if child_growth_direction(self.children(), child) == GrowthDirection::Reverse {
            leading_scroll_offset -= target_main_axis_extent;
        }

        let main_axis_extent = self.base().main_axis_extent();
        leading_scroll_offset - (main_axis_extent - target_main_axis_extent) * alignment
    }

    /// Resolves a main-axis layout offset and paint extent into an absolute
    /// 2-D paint offset within the viewport, honoring the effective axis
    /// direction of the run the child belongs to.
    fn compute_absolute_paint_offset(
        &self,
        layout_offset: f64,
        paint_extent: f64,
        growth_direction: GrowthDirection,
    ) -> Vec2 {
        let base = self.base();
        match apply_growth_direction_to_axis_direction(base.axis_direction, growth_direction) {
            AxisDirection::Up => Vec2::new(0.0, base.size.height - (layout_offset + paint_extent)),
            AxisDirection::Right => Vec2::new(layout_offset, 0.0),
            AxisDirection::Down => Vec2::new(0.0, layout_offset),
            AxisDirection::Left => Vec2::new(base.size.width - (layout_offset + paint_extent), 0.0),
        }
    }
}

fn child_growth_direction(children: &Children, index: usize) -> GrowthDirection {
    children[index]
        .constraints()
        .map(|c| c.growth_direction)
        .unwrap_or(GrowthDirection::Forward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::RenderSliver;
    use crate::testing::{CorrectingSliver, FixedExtentSliver};
    use crate::tree::SliverChild;
    use crate::viewport_offset::{ScrollPosition, ViewportOffset};

    /// A minimal forward-only variant: offsets in a plain vector, extents
    /// summed, paint order front-to-back.
    struct MockViewport {
        base: ViewportBase,
        children: Children,
        stored: Vec<f64>,
        total_scroll_extent: f64,
        overflow: bool,
    }

    impl MockViewport {
        fn new(cross_extent: f64, main_extent: f64) -> Self {
            crate::testing::init_tracing();
            let offset = ScrollPosition::new_handle(0.0);
            let mut base = ViewportBase::new(AxisDirection::Down, AxisDirection::Right, offset);
            base.size = Size::new(cross_extent, main_extent);
            MockViewport {
                base,
                children: Children::new(),
                stored: Vec::new(),
                total_scroll_extent: 0.0,
                overflow: false,
            }
        }

        fn push(&mut self, sliver: impl RenderSliver + 'static) {
            self.children.push(SliverChild::new(sliver));
        }

        fn run(&mut self, scroll_offset: f64, overlap: f64) -> Result<f64, ViewportError> {
            let count = self.children.len();
            self.stored = vec![f64::NAN; count];
            self.total_scroll_extent = 0.0;
            let main = self.base.size.height;
            let cross = self.base.size.width;
            self.layout_child_sequence(
                (count > 0).then_some(0),
                scroll_offset,
                overlap,
                0.0,
                main,
                main,
                cross,
                GrowthDirection::Forward,
                &move |index| (index + 1 < count).then_some(index + 1),
            )
        }
    }

    impl AbstractViewport for MockViewport {
        fn base(&self) -> &ViewportBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ViewportBase {
            &mut self.base
        }

        fn children(&self) -> &Children {
            &self.children
        }

        fn children_mut(&mut self) -> &mut Children {
            &mut self.children
        }

        fn has_visual_overflow(&self) -> bool {
            self.overflow
        }

        fn store_child_layout_offset(
            &mut self,
            index: usize,
            layout_offset: f64,
            _growth_direction: GrowthDirection,
        ) {
            self.stored[index] = layout_offset;
        }

        fn update_out_of_band_data(
            &mut self,
            _growth_direction: GrowthDirection,
            geometry: &SliverGeometry,
        ) {
            self.total_scroll_extent += geometry.scroll_extent;
            self.overflow |= geometry.has_visual_overflow;
        }

        fn paint_order(&self) -> Vec<usize> {
            (0..self.children.len()).collect()
        }

        fn paint_offset_of(&self, index: usize) -> Vec2 {
            self.compute_absolute_paint_offset(
                self.stored[index],
                self.children[index].geometry().paint_extent,
                GrowthDirection::Forward,
            )
        }

        fn scroll_offset_of(&self, index: usize, scroll_offset_within_child: f64) -> f64 {
            (0..index)
                .map(|i| self.children[i].geometry().scroll_extent)
                .sum::<f64>()
                + scroll_offset_within_child
        }

        fn compute_child_main_axis_position(
            &self,
            index: usize,
            parent_main_axis_position: f64,
        ) -> f64 {
            parent_main_axis_position - self.stored[index]
        }

        fn child_label(&self, index: usize) -> isize {
            index as isize
        }
    }

    struct BrokenSliver;

    impl RenderSliver for BrokenSliver {
        fn layout(&mut self, _constraints: &SliverConstraints) -> SliverGeometry {
            SliverGeometry {
                scroll_extent: -1.0,
                ..SliverGeometry::ZERO
            }
        }
    }

    #[test]
    fn sequencer_threads_constraints_through_a_run() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(100.0));
        viewport.push(FixedExtentSliver::new(200.0));
        viewport.push(FixedExtentSliver::new(150.0));

        let correction = viewport.run(50.0, 0.0).unwrap();
        assert_eq!(correction, 0.0);
        assert_eq!(viewport.total_scroll_extent, 450.0);

        let first = viewport.children[0].constraints().unwrap();
        assert_eq!(first.scroll_offset, 50.0);
        assert_eq!(first.preceding_scroll_extent, 0.0);
        assert_eq!(first.remaining_paint_extent, 200.0);
        assert_eq!(viewport.children[0].geometry().paint_extent, 50.0);
        assert_eq!(viewport.stored[0], 0.0);

        let second = viewport.children[1].constraints().unwrap();
        assert_eq!(second.scroll_offset, 0.0);
        assert_eq!(second.preceding_scroll_extent, 100.0);
        assert_eq!(second.remaining_paint_extent, 150.0);
        assert_eq!(viewport.children[1].geometry().paint_extent, 150.0);
        assert_eq!(viewport.stored[1], 50.0);

        // The third child is entirely past the visible window: zero budget,
        // not visible, offset stored in scroll-offset terms.
        let third = viewport.children[2].constraints().unwrap();
        assert_eq!(third.remaining_paint_extent, 0.0);
        assert!(!viewport.children[2].geometry().visible);
        assert_eq!(viewport.stored[2], 250.0);
    }

    #[test]
    fn sequencer_stops_at_first_correction() {
        use std::cell::Cell;
        use std::rc::Rc;

        let tail_layouts = Rc::new(Cell::new(0));
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(100.0));
        viewport.push(CorrectingSliver::new(100.0, 25.0));
        viewport.push(FixedExtentSliver::counted(100.0, tail_layouts.clone()));

        assert_eq!(viewport.run(0.0, 0.0).unwrap(), 25.0);
        assert_eq!(tail_layouts.get(), 0);

        // Once the correction is consumed the same run completes cleanly.
        assert_eq!(viewport.run(25.0, 0.0).unwrap(), 0.0);
        assert_eq!(tail_layouts.get(), 1);
    }

    #[test]
    fn sequencer_propagates_overlap_through_the_run() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(10.0));
        viewport.push(FixedExtentSliver::new(100.0));

        viewport.run(0.0, 30.0).unwrap();

        assert_eq!(viewport.children[0].constraints().unwrap().overlap, 30.0);
        // The first child only extends to 10, so 20 of the initial overlap
        // still covers the second child.
        assert_eq!(viewport.children[1].constraints().unwrap().overlap, 20.0);
    }

    #[test]
    fn sequencer_rejects_invalid_geometry() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(100.0));
        viewport.push(BrokenSliver);

        match viewport.run(0.0, 0.0) {
            Err(ViewportError::InvalidGeometry { child, .. }) => assert_eq!(child, 1),
            other => panic!("expected invalid geometry, got {other:?}"),
        }
    }

    #[test]
    fn hit_test_order_is_reverse_paint_order() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(100.0));
        viewport.push(FixedExtentSliver::new(100.0));
        viewport.push(FixedExtentSliver::new(100.0));

        assert_eq!(viewport.paint_order(), vec![0, 1, 2]);
        assert_eq!(viewport.hit_test_order(), vec![2, 1, 0]);
    }

    #[test]
    fn reveal_offsets_for_a_sole_child() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(500.0));
        viewport.run(0.0, 0.0).unwrap();

        let target = RevealTarget::Child(0);
        assert_eq!(viewport.get_offset_to_reveal(&target, 0.0), 0.0);
        assert_eq!(viewport.get_offset_to_reveal(&target, 1.0), 300.0);
    }

    #[test]
    fn reveal_offset_for_a_box_descendant() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(100.0));
        viewport.push(FixedExtentSliver::new(500.0));
        viewport.run(0.0, 0.0).unwrap();

        // A 50-tall box at y=120 inside the second child, on a downward axis.
        let target = RevealTarget::Descendant {
            child: 1,
            ancestor_scroll_offset: 0.0,
            pivot_size: Size::new(300.0, 500.0),
            bounds: Rect::new(0.0, 120.0, 300.0, 170.0),
        };
        assert_eq!(viewport.get_offset_to_reveal(&target, 0.0), 220.0);
        assert_eq!(viewport.get_offset_to_reveal(&target, 1.0), 70.0);
    }

    #[test]
    fn absolute_paint_offset_covers_all_axis_directions() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.push(FixedExtentSliver::new(100.0));

        viewport.base.axis_direction = AxisDirection::Down;
        assert_eq!(
            viewport.compute_absolute_paint_offset(40.0, 60.0, GrowthDirection::Forward),
            Vec2::new(0.0, 40.0)
        );
        assert_eq!(
            viewport.compute_absolute_paint_offset(40.0, 60.0, GrowthDirection::Reverse),
            Vec2::new(0.0, 100.0)
        );

        viewport.base.axis_direction = AxisDirection::Right;
        assert_eq!(
            viewport.compute_absolute_paint_offset(40.0, 60.0, GrowthDirection::Forward),
            Vec2::new(40.0, 0.0)
        );
        assert_eq!(
            viewport.compute_absolute_paint_offset(40.0, 60.0, GrowthDirection::Reverse),
            Vec2::new(200.0, 0.0)
        );
    }

    #[test]
    fn swapping_the_offset_always_flags_relayout() {
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.base.attach();
        viewport.base.clear_needs_layout();

        viewport.base.set_offset(ScrollPosition::new_handle(0.0));
        assert!(viewport.base.needs_layout());
    }

    #[test]
    fn attach_subscribes_to_pixel_changes() {
        let offset = ScrollPosition::new_handle(0.0);
        offset.borrow_mut().apply_content_dimensions(0.0, 500.0);
        let mut viewport = MockViewport::new(300.0, 200.0);
        viewport.base.set_offset(offset.clone());
        viewport.base.attach();
        viewport.base.clear_needs_layout();

        offset.borrow_mut().jump_to(40.0);
        assert!(viewport.base.needs_layout());

        viewport.base.clear_needs_layout();
        viewport.base.detach();
        offset.borrow_mut().jump_to(80.0);
        assert!(!viewport.base.needs_layout());
    }
}
