//! Sliver and backend stubs shared by the crate's tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Rect, Vec2};

use crate::hit_test::SliverHitTestResult;
use crate::object::RenderSliver;
use crate::paint::{PaintCtx, RenderBackend};
use crate::sliver::{calculate_paint_offset, SliverConstraints, SliverGeometry};

/// Routes layout/paint spans to the test harness output.
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// A sliver with a fixed scroll extent that paints whatever portion of
/// itself falls inside the visible window.
pub(crate) struct FixedExtentSliver {
    extent: f64,
    layout_count: Rc<Cell<usize>>,
}

impl FixedExtentSliver {
    pub fn new(extent: f64) -> Self {
        FixedExtentSliver {
            extent,
            layout_count: Rc::new(Cell::new(0)),
        }
    }

    pub fn counted(extent: f64, layout_count: Rc<Cell<usize>>) -> Self {
        FixedExtentSliver {
            extent,
            layout_count,
        }
    }
}

impl RenderSliver for FixedExtentSliver {
    fn layout(&mut self, constraints: &SliverConstraints) -> SliverGeometry {
        self.layout_count.set(self.layout_count.get() + 1);
        let paint_extent = calculate_paint_offset(constraints, 0.0, self.extent);
        SliverGeometry::new(self.extent, paint_extent, self.extent)
    }
}

/// Demands a scroll-offset correction on its next layout, then behaves like
/// a fixed-extent sliver.
pub(crate) struct CorrectingSliver {
    extent: f64,
    pending_correction: Option<f64>,
}

impl CorrectingSliver {
    pub fn new(extent: f64, correction: f64) -> Self {
        CorrectingSliver {
            extent,
            pending_correction: Some(correction),
        }
    }
}

impl RenderSliver for CorrectingSliver {
    fn layout(&mut self, constraints: &SliverConstraints) -> SliverGeometry {
        if let Some(correction) = self.pending_correction.take() {
            return SliverGeometry::scroll_offset_corrected_by(correction);
        }
        let paint_extent = calculate_paint_offset(constraints, 0.0, self.extent);
        SliverGeometry::new(self.extent, paint_extent, self.extent)
    }
}

/// A fixed-extent sliver that asks the anchored viewport to shift the
/// anchor line by half its own extent, visually centering it.
pub(crate) struct CenteredSliver {
    extent: f64,
}

impl CenteredSliver {
    pub fn new(extent: f64) -> Self {
        CenteredSliver { extent }
    }
}

impl RenderSliver for CenteredSliver {
    fn layout(&mut self, constraints: &SliverConstraints) -> SliverGeometry {
        let paint_extent = calculate_paint_offset(constraints, 0.0, self.extent);
        SliverGeometry::new(self.extent, paint_extent, self.extent)
    }

    fn center_offset_adjustment(&self) -> f64 {
        self.extent / 2.0
    }
}

/// A fixed-extent sliver that logs paint and hit-test calls under a tag, so
/// tests can observe traversal order.
pub(crate) struct TagSliver {
    tag: &'static str,
    extent: f64,
    accept_hits: bool,
    hit_log: Option<Rc<RefCell<Vec<&'static str>>>>,
}

impl TagSliver {
    pub fn new(tag: &'static str, extent: f64) -> Self {
        TagSliver {
            tag,
            extent,
            accept_hits: false,
            hit_log: None,
        }
    }

    pub fn accepting_hits(mut self) -> Self {
        self.accept_hits = true;
        self
    }

    pub fn with_hit_log(mut self, log: Rc<RefCell<Vec<&'static str>>>) -> Self {
        self.hit_log = Some(log);
        self
    }
}

impl RenderSliver for TagSliver {
    fn layout(&mut self, constraints: &SliverConstraints) -> SliverGeometry {
        let paint_extent = calculate_paint_offset(constraints, 0.0, self.extent);
        SliverGeometry::new(self.extent, paint_extent, self.extent)
    }

    fn paint(&mut self, ctx: &mut PaintCtx<'_>, offset: Vec2) {
        if let Some(backend) = ctx.render_ctx.as_any().downcast_mut::<RecordingBackend>() {
            backend.ops.push(PaintOp::Sliver(self.tag, offset));
        }
    }

    fn hit_test(
        &mut self,
        _result: &mut SliverHitTestResult,
        _main_axis_position: f64,
        _cross_axis_position: f64,
    ) -> bool {
        if let Some(log) = &self.hit_log {
            log.borrow_mut().push(self.tag);
        }
        self.accept_hits
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum PaintOp {
    Save,
    Restore,
    Clip(Rect),
    Sliver(&'static str, Vec2),
}

/// Records the paint calls a viewport issues.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub ops: Vec<PaintOp>,
}

impl RenderBackend for RecordingBackend {
    fn save(&mut self) {
        self.ops.push(PaintOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(PaintOp::Restore);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(PaintOp::Clip(rect));
    }

    fn as_any(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl RecordingBackend {
    /// The tags painted, in order, ignoring save/restore/clip bookkeeping.
    pub fn painted_tags(&self) -> Vec<&'static str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PaintOp::Sliver(tag, _) => Some(*tag),
                _ => None,
            })
            .collect()
    }
}
