//! The anchored bidirectional viewport: fixed main-axis size, children
//! growing away from an anchor line in both directions.

use kurbo::{Size, Vec2};

use crate::axis::{Axis, AxisDirection};
use crate::box_constraints::BoxConstraints;
use crate::error::ViewportError;
use crate::sliver::{apply_growth_direction_to_axis_direction, GrowthDirection, SliverGeometry};
use crate::tree::{ChildPosition, Children, SliverChild};
use crate::viewport::{AbstractViewport, ViewportBase};
use crate::viewport_offset::{OffsetHandle, ViewportOffset};

/// Correction/adjustment cycles before layout is declared divergent.
const MAX_LAYOUT_CYCLES: usize = 10;

/// A scrollable viewport that fills its container and lays its children out
/// bidirectionally around a center child.
///
/// `anchor` places scroll offset zero within the viewport: 0.0 is the
/// leading edge, 1.0 the trailing edge. The child at `center` is the first
/// of the forward run; children before it form the reverse run and occupy
/// negative scroll offsets.
pub struct Viewport {
    base: ViewportBase,
    children: Children,
    anchor: f64,
    center: usize,
    min_scroll_extent: f64,
    max_scroll_extent: f64,
    has_visual_overflow: bool,
}

impl Viewport {
    pub fn new(
        axis_direction: AxisDirection,
        cross_axis_direction: AxisDirection,
        offset: OffsetHandle,
        anchor: f64,
    ) -> Self {
        debug_assert!((0.0..=1.0).contains(&anchor));
        Viewport {
            base: ViewportBase::new(axis_direction, cross_axis_direction, offset),
            children: Children::new(),
            anchor,
            center: 0,
            min_scroll_extent: 0.0,
            max_scroll_extent: 0.0,
            has_visual_overflow: false,
        }
    }

    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    pub fn center(&self) -> usize {
        self.center
    }

    /// Selects which child starts the forward run. Children before it grow
    /// in the reverse direction.
    pub fn set_center(&mut self, center: usize) {
        debug_assert!(center < self.children.len().max(1));
        self.center = center;
        self.base.mark_needs_layout();
    }

    pub fn push_child(&mut self, child: SliverChild) {
        self.children.push(child);
        self.base.mark_needs_layout();
    }

    /// The accumulated scroll extent of the reverse run, as a non-positive
    /// offset. Valid after layout.
    pub fn min_scroll_extent(&self) -> f64 {
        self.min_scroll_extent
    }

    /// The accumulated scroll extent of the forward run. Valid after layout.
    pub fn max_scroll_extent(&self) -> f64 {
        self.max_scroll_extent
    }

    /// Sizes the viewport to the biggest size its constraints allow and runs
    /// the correction loop until the scroll position accepts the resulting
    /// content dimensions.
    pub fn layout(&mut self, constraints: &BoxConstraints) -> Result<Size, ViewportError> {
        let span = tracing::span!(
            tracing::Level::DEBUG,
            "viewport_layout",
            axis_direction = ?self.base.axis_direction,
            anchor = self.anchor,
        );
        let _h = span.enter();

        match self.base.axis() {
            Axis::Vertical => {
                if !constraints.has_bounded_height() {
                    return Err(ViewportError::UnboundedAxis {
                        axis: Axis::Vertical,
                        axis_direction: self.base.axis_direction,
                    });
                }
                if !constraints.has_bounded_width() {
                    return Err(ViewportError::UnboundedAxis {
                        axis: Axis::Horizontal,
                        axis_direction: self.base.cross_axis_direction,
                    });
                }
            }
            Axis::Horizontal => {
                if !constraints.has_bounded_width() {
                    return Err(ViewportError::UnboundedAxis {
                        axis: Axis::Horizontal,
                        axis_direction: self.base.axis_direction,
                    });
                }
                if !constraints.has_bounded_height() {
                    return Err(ViewportError::UnboundedAxis {
                        axis: Axis::Vertical,
                        axis_direction: self.base.cross_axis_direction,
                    });
                }
            }
        }

        self.base.size = constraints.biggest();
        self.base.clear_needs_layout();
        let (main_axis_extent, cross_axis_extent) = match self.base.axis() {
            Axis::Vertical => (self.base.size.height, self.base.size.width),
            Axis::Horizontal => (self.base.size.width, self.base.size.height),
        };

        self.base
            .offset()
            .borrow_mut()
            .apply_viewport_dimension(main_axis_extent);

        if self.children.is_empty() {
            self.min_scroll_extent = 0.0;
            self.max_scroll_extent = 0.0;
            self.has_visual_overflow = false;
            self.base
                .offset()
                .borrow_mut()
                .apply_content_dimensions(0.0, 0.0);
            return Ok(self.base.size);
        }

        let mut cycles = 0;
        loop {
            let center_offset_adjustment = self.children[self.center].center_offset_adjustment();
            let corrected_offset = self.base.pixels() + center_offset_adjustment;
            let correction =
                self.attempt_layout(main_axis_extent, cross_axis_extent, corrected_offset)?;
            if correction != 0.0 {
                self.base.offset().borrow_mut().correct_by(correction);
            } else {
                let min = (self.min_scroll_extent + main_axis_extent * self.anchor).min(0.0);
                let max =
                    (self.max_scroll_extent - main_axis_extent * (1.0 - self.anchor)).max(0.0);
                if self
                    .base
                    .offset()
                    .borrow_mut()
                    .apply_content_dimensions(min, max)
                {
                    break;
                }
            }
            cycles += 1;
            if cycles >= MAX_LAYOUT_CYCLES {
                return Err(ViewportError::DidNotConverge { cycles });
            }
        }
        Ok(self.base.size)
    }

    /// One pass over both runs. Returns the pending scroll-offset
    /// correction, zero if both runs were clean.
    fn attempt_layout(
        &mut self,
        main_axis_extent: f64,
        cross_axis_extent: f64,
        corrected_offset: f64,
    ) -> Result<f64, ViewportError> {
        self.min_scroll_extent = 0.0;
        self.max_scroll_extent = 0.0;
        self.has_visual_overflow = false;

        // Where scroll offset zero lands within the viewport, in paint
        // coordinates along the main axis.
        let center_offset = main_axis_extent * self.anchor - corrected_offset;
        let reverse_remaining_paint_extent = center_offset.clamp(0.0, main_axis_extent);
        let forward_remaining_paint_extent =
            (main_axis_extent - center_offset).clamp(0.0, main_axis_extent);

        let has_reverse_run = self.center > 0;
        if has_reverse_run {
            let correction = self.layout_child_sequence(
                Some(self.center - 1),
                main_axis_extent.max(center_offset) - main_axis_extent,
                0.0,
                forward_remaining_paint_extent,
                reverse_remaining_paint_extent,
                main_axis_extent,
                cross_axis_extent,
                GrowthDirection::Reverse,
                &|index| index.checked_sub(1),
            )?;
            if correction != 0.0 {
                // Reverse-run corrections are expressed against the reverse
                // scroll coordinate; flip into the viewport's own.
                return Ok(-correction);
            }
        }

        let count = self.children.len();
        self.layout_child_sequence(
            Some(self.center),
            (-center_offset).max(0.0),
            if has_reverse_run {
                0.0
            } else {
                (-center_offset).min(0.0)
            },
            if center_offset >= main_axis_extent {
                center_offset
            } else {
                reverse_remaining_paint_extent
            },
            forward_remaining_paint_extent,
            main_axis_extent,
            cross_axis_extent,
            GrowthDirection::Forward,
            &move |index| (index + 1 < count).then_some(index + 1),
        )
    }
}

impl AbstractViewport for Viewport {
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
        growth_direction: GrowthDirection,
    ) {
        let paint_extent = self.children[index].geometry().paint_extent;
        let paint_offset =
            self.compute_absolute_paint_offset(layout_offset, paint_extent, growth_direction);
        self.children[index].state.position = ChildPosition::Physical(paint_offset);
    }

    fn update_out_of_band_data(
        &mut self,
        growth_direction: GrowthDirection,
        geometry: &SliverGeometry,
    ) {
        match growth_direction {
            GrowthDirection::Forward => self.max_scroll_extent += geometry.scroll_extent,
            GrowthDirection::Reverse => self.min_scroll_extent -= geometry.scroll_extent,
        }
        if geometry.has_visual_overflow {
            self.has_visual_overflow = true;
        }
    }

    /// Reverse-run children back-to-front toward the anchor, then forward-run
    /// children back-to-front from the far end, the center painted last.
    fn paint_order(&self) -> Vec<usize> {
        (0..self.center)
            .chain((self.center..self.children.len()).rev())
            .collect()
    }

    fn paint_offset_of(&self, index: usize) -> Vec2 {
        match self.children[index].state.position {
            ChildPosition::Physical(offset) => offset,
            ChildPosition::Logical(layout_offset) => self.compute_absolute_paint_offset(
                layout_offset,
                self.children[index].geometry().paint_extent,
                GrowthDirection::Forward,
            ),
        }
    }

    fn scroll_offset_of(&self, index: usize, scroll_offset_within_child: f64) -> f64 {
        if index >= self.center {
            (self.center..index)
                .map(|i| self.children[i].geometry().scroll_extent)
                .sum::<f64>()
                + scroll_offset_within_child
        } else {
            -(index + 1..self.center)
                .map(|i| self.children[i].geometry().scroll_extent)
                .sum::<f64>()
                - scroll_offset_within_child
        }
    }

    fn compute_child_main_axis_position(
        &self,
        index: usize,
        parent_main_axis_position: f64,
    ) -> f64 {
        let child = &self.children[index];
        let paint_offset = self.paint_offset_of(index);
        let growth_direction = child
            .constraints()
            .map(|c| c.growth_direction)
            .unwrap_or(GrowthDirection::Forward);
        match apply_growth_direction_to_axis_direction(self.base.axis_direction, growth_direction) {
            AxisDirection::Down => parent_main_axis_position - paint_offset.y,
            AxisDirection::Right => parent_main_axis_position - paint_offset.x,
            AxisDirection::Up => {
                child.geometry().paint_extent - (parent_main_axis_position - paint_offset.y)
            }
            AxisDirection::Left => {
                child.geometry().paint_extent - (parent_main_axis_position - paint_offset.x)
            }
        }
    }

    /// The center child is 0; reverse-run children count down from -1,
    /// forward-run children up from 1.
    fn child_label(&self, index: usize) -> isize {
        index as isize - self.center as isize
    }
}
