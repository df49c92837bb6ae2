use crate::axis::{axis_direction_to_axis, Axis, AxisDirection};

/// The direction in which a sliver's contents are ordered, relative to the
/// scroll offset axis.
///
/// For example, a vertical alphabetical list that is going
/// [`AxisDirection::Down`] with a [`GrowthDirection::Forward`] would have the
/// A at the top and the Z at the bottom, with the A adjacent to the origin.
/// The same list going [`AxisDirection::Down`] with
/// [`GrowthDirection::Reverse`] would have the Z at the top (at scroll offset
/// zero) and the A below it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GrowthDirection {
    /// This sliver's contents are ordered in the same direction as the
    /// [`AxisDirection`].
    Forward,

    /// This sliver's contents are ordered in the opposite direction of the
    /// [`AxisDirection`].
    Reverse,
}

/// The direction in which the user is scrolling, relative to the positive
/// scroll-offset axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScrollDirection {
    Forward,
    Idle,
    Reverse,
}

impl Default for ScrollDirection {
    fn default() -> Self {
        ScrollDirection::Idle
    }
}

impl ScrollDirection {
    pub fn flip(&self) -> ScrollDirection {
        match self {
            ScrollDirection::Forward => ScrollDirection::Reverse,
            ScrollDirection::Idle => ScrollDirection::Idle,
            ScrollDirection::Reverse => ScrollDirection::Forward,
        }
    }
}

/// Flips the [`ScrollDirection`] if the [`GrowthDirection`] is
/// [`GrowthDirection::Reverse`].
///
/// Useful for slivers that are given both a scroll direction and a growth
/// direction and wish to compute the direction in which growth will occur.
pub fn apply_growth_direction_to_scroll_direction(
    scroll_direction: ScrollDirection,
    growth_direction: GrowthDirection,
) -> ScrollDirection {
    match growth_direction {
        GrowthDirection::Forward => scroll_direction,
        GrowthDirection::Reverse => scroll_direction.flip(),
    }
}

/// Flips the [`AxisDirection`] if the [`GrowthDirection`] is
/// [`GrowthDirection::Reverse`].
pub fn apply_growth_direction_to_axis_direction(
    axis_direction: AxisDirection,
    growth_direction: GrowthDirection,
) -> AxisDirection {
    match growth_direction {
        GrowthDirection::Forward => axis_direction,
        GrowthDirection::Reverse => axis_direction.flip(),
    }
}

/// Layout input for a sliver.
///
/// Unlike box constraints, sliver constraints do not describe a range of
/// acceptable sizes: they describe the window a viewport is asking the sliver
/// to fill, expressed in scroll-offset space.
#[derive(Clone, Debug, PartialEq)]
pub struct SliverConstraints {
    /// The direction in which the [`scroll_offset`](Self::scroll_offset) and
    /// [`remaining_paint_extent`](Self::remaining_paint_extent) increase.
    pub axis_direction: AxisDirection,

    /// The direction in which the contents of slivers are ordered, relative
    /// to the [`axis_direction`](Self::axis_direction).
    ///
    /// In an anchored viewport, slivers before the absolute zero offset grow
    /// with [`GrowthDirection::Reverse`]; they still see only positive scroll
    /// offsets, with zero at the absolute zero point and positive numbers
    /// going away from there.
    pub growth_direction: GrowthDirection,

    /// The direction in which the user is attempting to scroll, relative to
    /// the [`axis_direction`](Self::axis_direction) and
    /// [`growth_direction`](Self::growth_direction).
    pub user_scroll_direction: ScrollDirection,

    /// The scroll offset, in this sliver's coordinate system, that
    /// corresponds to the earliest visible part of this sliver.
    ///
    /// For example, with [`AxisDirection::Down`] and
    /// [`GrowthDirection::Forward`], this is the amount the top of the sliver
    /// has been scrolled past the top of the viewport. Slivers not yet
    /// scrolled past the leading edge see a scroll offset of `0`.
    pub scroll_offset: f64,

    /// The scroll distance consumed by all slivers that came before this one
    /// in the current run.
    pub preceding_scroll_extent: f64,

    /// The number of pixels from where the pixels corresponding to the
    /// [`scroll_offset`](Self::scroll_offset) will be painted up to the first
    /// pixel that has not yet been painted on by an earlier sliver.
    ///
    /// For example, if the previous sliver had a paint extent of 100.0 but a
    /// layout extent of only 50.0, the overlap of this sliver is 50.0.
    pub overlap: f64,

    /// The number of pixels of content the sliver should consider providing;
    /// providing more than this is inefficient.
    ///
    /// May be infinite (an unconstrained shrink-wrapping viewport), or 0.0
    /// (the sliver is scrolled off the trailing edge).
    pub remaining_paint_extent: f64,

    /// The number of pixels in the cross axis.
    pub cross_axis_extent: f64,

    /// The direction in which children should be placed in the cross axis.
    pub cross_axis_direction: AxisDirection,

    /// The number of pixels the viewport can display in the main axis.
    pub viewport_main_axis_extent: f64,
}

impl SliverConstraints {
    pub fn axis(&self) -> Axis {
        axis_direction_to_axis(self.axis_direction)
    }

    /// The growth direction rephrased in absolute terms: the direction in
    /// which coordinates increase on screen, regardless of whether the axis
    /// direction itself is reversed.
    pub fn normalized_growth_direction(&self) -> GrowthDirection {
        match self.axis_direction {
            AxisDirection::Down | AxisDirection::Right => self.growth_direction,
            AxisDirection::Up | AxisDirection::Left => match self.growth_direction {
                GrowthDirection::Forward => GrowthDirection::Reverse,
                GrowthDirection::Reverse => GrowthDirection::Forward,
            },
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.scroll_offset.is_finite()
            && self.scroll_offset >= 0.0
            && self.cross_axis_extent >= 0.0
            && axis_direction_to_axis(self.axis_direction)
                != axis_direction_to_axis(self.cross_axis_direction)
            && self.viewport_main_axis_extent >= 0.0
            && self.remaining_paint_extent >= 0.0
    }
}

/// Layout output of a sliver.
#[derive(Debug, PartialEq, Clone)]
pub struct SliverGeometry {
    /// The (estimated) total scrollable extent this sliver has content for:
    /// the amount of scrolling needed to get from its beginning to its end.
    ///
    /// Used to compute the scroll offset of all subsequent slivers in the
    /// run, so it must be provided whether or not the sliver is currently
    /// visible.
    pub scroll_extent: f64,

    /// The visual location of the first visible part of this sliver relative
    /// to its layout position.
    ///
    /// A sliver that wishes to paint before its layout position reports a
    /// negative paint origin. This does not affect where subsequent slivers
    /// are placed, but it does affect the overlap handed to the next sliver.
    pub paint_origin: f64,

    /// The amount of visible space the sliver occupied, measured from its
    /// paint origin. Must be between zero and
    /// [`SliverConstraints::remaining_paint_extent`].
    pub paint_extent: f64,

    /// The distance from this sliver's first visible part to the first
    /// visible part of the next sliver, assuming the next sliver's scroll
    /// offset is zero. Must be between zero and
    /// [`paint_extent`](Self::paint_extent).
    pub layout_extent: f64,

    /// The (estimated) total paint extent this sliver could provide if the
    /// remaining paint extent were infinite. Used by shrink-wrapping
    /// viewports. By definition, cannot be less than
    /// [`paint_extent`](Self::paint_extent).
    pub max_paint_extent: f64,

    /// The distance from where this sliver started painting to the edge of
    /// where it accepts hits. Defaults to
    /// [`paint_extent`](Self::paint_extent).
    pub hit_test_extent: f64,

    /// Whether this sliver should be painted.
    pub visible: bool,

    /// Whether this sliver paints outside its layout bounds; if any sliver in
    /// a viewport does, the viewport clips its children.
    pub has_visual_overflow: bool,

    /// If non-zero, the whole layout attempt must be rerun with the scroll
    /// offset adjusted by this amount.
    ///
    /// A sliver reporting a correction does not need to fill in the rest of
    /// its geometry; it will be laid out again in the same pass once the
    /// correction has been applied.
    pub scroll_offset_correction: f64,
}

impl SliverGeometry {
    pub const ZERO: SliverGeometry = SliverGeometry {
        scroll_extent: 0.0,
        paint_origin: 0.0,
        paint_extent: 0.0,
        layout_extent: 0.0,
        max_paint_extent: 0.0,
        hit_test_extent: 0.0,
        visible: false,
        has_visual_overflow: false,
        scroll_offset_correction: 0.0,
    };

    /// A geometry for a sliver whose layout extent equals its paint extent,
    /// the common case.
    pub fn new(scroll_extent: f64, paint_extent: f64, max_paint_extent: f64) -> SliverGeometry {
        SliverGeometry {
            scroll_extent,
            paint_origin: 0.0,
            paint_extent,
            layout_extent: paint_extent,
            max_paint_extent,
            hit_test_extent: paint_extent,
            visible: paint_extent > 0.0,
            has_visual_overflow: false,
            scroll_offset_correction: 0.0,
        }
    }

    /// A geometry demanding that the enclosing layout attempt restart with
    /// the scroll offset shifted by `correction`.
    pub fn scroll_offset_corrected_by(correction: f64) -> SliverGeometry {
        SliverGeometry {
            scroll_offset_correction: correction,
            ..SliverGeometry::ZERO
        }
    }

    /// Checks the invariants a viewport relies on when consuming a child's
    /// geometry. Returns a description of the first violation, if any.
    pub fn validity_error(&self) -> Option<&'static str> {
        if !self.scroll_extent.is_finite() || self.scroll_extent < 0.0 {
            return Some("scroll_extent must be finite and non-negative");
        }
        if !self.paint_origin.is_finite() {
            return Some("paint_origin must be finite");
        }
        if !self.paint_extent.is_finite() || self.paint_extent < 0.0 {
            return Some("paint_extent must be finite and non-negative");
        }
        if !self.layout_extent.is_finite() || self.layout_extent < 0.0 {
            return Some("layout_extent must be finite and non-negative");
        }
        if !self.max_paint_extent.is_finite() || self.max_paint_extent < self.paint_extent {
            return Some("max_paint_extent must be finite and at least paint_extent");
        }
        if !self.hit_test_extent.is_finite() || self.hit_test_extent < 0.0 {
            return Some("hit_test_extent must be finite and non-negative");
        }
        if !self.scroll_offset_correction.is_finite() {
            return Some("scroll_offset_correction must be finite");
        }
        None
    }
}

impl Default for SliverGeometry {
    fn default() -> Self {
        SliverGeometry::ZERO
    }
}

/// Computes the portion of the region from `from` to `to` that is visible,
/// assuming that only the region from the scroll offset that is
/// `remaining_paint_extent` high is visible, and that the relationship
/// between scroll offsets and paint offsets is linear.
///
/// For example, if the constraints have a scroll offset of 100 and a
/// remaining paint extent of 100, and the arguments describe the region
/// 50..150, the result is 50 (from scroll offset 100 to scroll offset 150).
pub fn calculate_paint_offset(sc: &SliverConstraints, from: f64, to: f64) -> f64 {
    assert!(from <= to);
    let a = sc.scroll_offset;
    let b = sc.scroll_offset + sc.remaining_paint_extent;
    (to.clamp(a, b) - from.clamp(a, b)).clamp(0.0, sc.remaining_paint_extent)
}
