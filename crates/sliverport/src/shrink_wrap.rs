//! The shrink-wrapping viewport: main-axis size matches its content, up to
//! the incoming constraint.

use kurbo::{Size, Vec2};

use crate::axis::{Axis, AxisDirection};
use crate::box_constraints::BoxConstraints;
use crate::error::ViewportError;
use crate::sliver::{GrowthDirection, SliverGeometry};
use crate::tree::{ChildPosition, Children, SliverChild};
use crate::viewport::{AbstractViewport, ViewportBase};
use crate::viewport_offset::{OffsetHandle, ViewportOffset};

/// A scrollable viewport that sizes itself to the total maximum paint extent
/// of its children instead of filling its container.
///
/// Children grow in a single direction from the leading edge; there is no
/// anchor and no center. Because the viewport's own main-axis size depends
/// on child layout, child placement is stored as a main-axis scalar and
/// only resolved to a paint offset once the final size is known.
pub struct ShrinkWrappingViewport {
    base: ViewportBase,
    children: Children,
    max_scroll_extent: f64,
    shrink_wrap_extent: f64,
    has_visual_overflow: bool,
}

impl ShrinkWrappingViewport {
    pub fn new(
        axis_direction: AxisDirection,
        cross_axis_direction: AxisDirection,
        offset: OffsetHandle,
    ) -> Self {
        ShrinkWrappingViewport {
            base: ViewportBase::new(axis_direction, cross_axis_direction, offset),
            children: Children::new(),
            max_scroll_extent: 0.0,
            shrink_wrap_extent: 0.0,
            has_visual_overflow: false,
        }
    }

    pub fn push_child(&mut self, child: SliverChild) {
        self.children.push(child);
        self.base.mark_needs_layout();
    }

    pub fn max_scroll_extent(&self) -> f64 {
        self.max_scroll_extent
    }

    /// Lays out the child run until the scroll position has accepted both
    /// the resulting viewport dimension and the content bounds.
    ///
    /// The main axis may be unbounded; the cross axis may not, since every
    /// child is given the full cross extent.
    pub fn layout(&mut self, constraints: &BoxConstraints) -> Result<Size, ViewportError> {
        let span = tracing::span!(
            tracing::Level::DEBUG,
            "shrink_wrap_layout",
            axis_direction = ?self.base.axis_direction,
        );
        let _h = span.enter();

        let axis = self.base.axis();
        let cross_bounded = match axis {
            Axis::Vertical => constraints.has_bounded_width(),
            Axis::Horizontal => constraints.has_bounded_height(),
        };
        if !cross_bounded {
            return Err(ViewportError::UnboundedAxis {
                axis: axis.flip(),
                axis_direction: self.base.cross_axis_direction,
            });
        }

        self.base.clear_needs_layout();

        if self.children.is_empty() {
            self.base.size = match axis {
                Axis::Vertical => Size::new(constraints.max_width, constraints.min_height),
                Axis::Horizontal => Size::new(constraints.min_width, constraints.max_height),
            };
            self.max_scroll_extent = 0.0;
            self.shrink_wrap_extent = 0.0;
            self.has_visual_overflow = false;
            let mut offset = self.base.offset().borrow_mut();
            offset.apply_viewport_dimension(0.0);
            offset.apply_content_dimensions(0.0, 0.0);
            drop(offset);
            return Ok(self.base.size);
        }

        let (main_axis_extent, cross_axis_extent) = match axis {
            Axis::Vertical => (constraints.max_height, constraints.max_width),
            Axis::Horizontal => (constraints.max_width, constraints.max_height),
        };

        let effective_extent = loop {
            let pixels = self.base.pixels();
            let correction = self.attempt_layout(main_axis_extent, cross_axis_extent, pixels)?;
            if correction != 0.0 {
                self.base.offset().borrow_mut().correct_by(correction);
                continue;
            }
            let effective_extent = match axis {
                Axis::Vertical => constraints.constrain_height(self.shrink_wrap_extent),
                Axis::Horizontal => constraints.constrain_width(self.shrink_wrap_extent),
            };
            let mut offset = self.base.offset().borrow_mut();
            let accepted_dimension = offset.apply_viewport_dimension(effective_extent);
            let accepted_content = offset.apply_content_dimensions(
                0.0,
                (self.max_scroll_extent - effective_extent).max(0.0),
            );
            if accepted_dimension && accepted_content {
                break effective_extent;
            }
        };

        self.base.size = match axis {
            Axis::Vertical => constraints.constrain(Size::new(cross_axis_extent, effective_extent)),
            Axis::Horizontal => {
                constraints.constrain(Size::new(effective_extent, cross_axis_extent))
            }
        };
        Ok(self.base.size)
    }

    fn attempt_layout(
        &mut self,
        main_axis_extent: f64,
        cross_axis_extent: f64,
        corrected_offset: f64,
    ) -> Result<f64, ViewportError> {
        self.max_scroll_extent = 0.0;
        self.shrink_wrap_extent = 0.0;
        self.has_visual_overflow = false;

        let count = self.children.len();
        self.layout_child_sequence(
            Some(0),
            corrected_offset.max(0.0),
            corrected_offset.min(0.0),
            (-corrected_offset).max(0.0),
            main_axis_extent + corrected_offset.min(0.0),
            main_axis_extent,
            cross_axis_extent,
            GrowthDirection::Forward,
            &move |index| (index + 1 < count).then_some(index + 1),
        )
    }

    fn layout_offset_of(&self, index: usize) -> f64 {
        match self.children[index].state.position {
            ChildPosition::Logical(layout_offset) => layout_offset,
            ChildPosition::Physical(_) => 0.0,
        }
    }
}

impl AbstractViewport for ShrinkWrappingViewport {
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
        self.has_visual_overflow
    }

    fn store_child_layout_offset(
        &mut self,
        index: usize,
        layout_offset: f64,
        _growth_direction: GrowthDirection,
    ) {
        self.children[index].state.position = ChildPosition::Logical(layout_offset);
    }

    fn update_out_of_band_data(
        &mut self,
        _growth_direction: GrowthDirection,
        geometry: &SliverGeometry,
    ) {
        self.max_scroll_extent += geometry.scroll_extent;
        self.shrink_wrap_extent += geometry.max_paint_extent;
        if geometry.has_visual_overflow {
            self.has_visual_overflow = true;
        }
    }

    fn paint_order(&self) -> Vec<usize> {
        (0..self.children.len()).collect()
    }

    fn paint_offset_of(&self, index: usize) -> Vec2 {
        self.compute_absolute_paint_offset(
            self.layout_offset_of(index),
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
        let layout_offset = self.layout_offset_of(index);
        match self.base.axis_direction {
            AxisDirection::Down | AxisDirection::Right => {
                parent_main_axis_position - layout_offset
            }
            AxisDirection::Up => (self.base.size.height - parent_main_axis_position) - layout_offset,
            AxisDirection::Left => (self.base.size.width - parent_main_axis_position) - layout_offset,
        }
    }

    fn child_label(&self, index: usize) -> isize {
        index as isize
    }
}
