use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::sliver::ScrollDirection;

/// A shared handle to the scroll state a viewport is driven by.
pub type OffsetHandle = Rc<RefCell<dyn ViewportOffset>>;

pub type ListenerId = usize;

/// Which part of the content, in pixels, is visible through a viewport.
///
/// The viewport reads [`pixels`](ViewportOffset::pixels) during layout and
/// reports its dimensions back through the two `apply_*` methods; a report
/// that returns false tells the viewport the scroll state had to change in
/// response and layout must run again against the new pixel value.
pub trait ViewportOffset {
    /// The number of pixels of content scrolled off in the direction of
    /// increasing scroll offset.
    fn pixels(&self) -> f64;

    /// The direction the user is currently moving the content, relative to
    /// the scroll offset axis. [`ScrollDirection::Idle`] when no gesture is
    /// in progress.
    fn user_scroll_direction(&self) -> ScrollDirection;

    /// Reports the viewport's main-axis extent. Returns true if the current
    /// pixel value is still valid against it.
    fn apply_viewport_dimension(&mut self, viewport_dimension: f64) -> bool;

    /// Reports the range of scroll offsets the content spans. Returns true
    /// if the current pixel value lies within the range; otherwise the
    /// value is clamped into range and layout must run again.
    fn apply_content_dimensions(&mut self, min_scroll_extent: f64, max_scroll_extent: f64) -> bool;

    /// Shifts the pixel value without notifying listeners.
    ///
    /// Only for use during layout, when a child has reported a
    /// scroll-offset correction: the visible content does not move, the
    /// coordinate it is described in does.
    fn correct_by(&mut self, correction: f64);

    fn add_listener(&mut self, listener: Box<dyn FnMut()>) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}

/// Removes its listener from the offset when dropped.
///
/// Holds the offset weakly so a guard outliving the offset is harmless.
pub struct ListenerGuard {
    offset: Weak<RefCell<dyn ViewportOffset>>,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn new(offset: &OffsetHandle, id: ListenerId) -> Self {
        ListenerGuard {
            offset: Rc::downgrade(offset),
            id,
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(offset) = self.offset.upgrade() {
            offset.borrow_mut().remove_listener(self.id);
        }
    }
}

/// The standard [`ViewportOffset`]: a clamped scroll position.
///
/// Pointer scrolls move the pixel value within the content dimensions most
/// recently reported by the viewport; programmatic jumps and out-of-range
/// clamping notify listeners, corrections do not.
pub struct ScrollPosition {
    pixels: f64,
    min_scroll_extent: f64,
    max_scroll_extent: f64,
    viewport_dimension: f64,
    user_scroll_direction: ScrollDirection,
    listeners: Vec<(ListenerId, Box<dyn FnMut()>)>,
    next_listener_id: ListenerId,
}

impl ScrollPosition {
    pub fn new(initial_pixels: f64) -> Self {
        ScrollPosition {
            pixels: initial_pixels,
            min_scroll_extent: 0.0,
            max_scroll_extent: 0.0,
            viewport_dimension: 0.0,
            user_scroll_direction: ScrollDirection::Idle,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Wraps a fresh position in the shared handle viewports attach to.
    pub fn new_handle(initial_pixels: f64) -> Rc<RefCell<ScrollPosition>> {
        Rc::new(RefCell::new(ScrollPosition::new(initial_pixels)))
    }

    pub fn min_scroll_extent(&self) -> f64 {
        self.min_scroll_extent
    }

    pub fn max_scroll_extent(&self) -> f64 {
        self.max_scroll_extent
    }

    pub fn viewport_dimension(&self) -> f64 {
        self.viewport_dimension
    }

    /// The quantity of content conceptually "above" the visible region.
    pub fn extent_before(&self) -> f64 {
        (self.pixels - self.min_scroll_extent).max(0.0)
    }

    pub fn extent_inside(&self) -> f64 {
        self.viewport_dimension
            - (self.min_scroll_extent - self.pixels).clamp(0.0, self.viewport_dimension)
            - (self.pixels - self.max_scroll_extent).clamp(0.0, self.viewport_dimension)
    }

    /// The quantity of content conceptually "below" the visible region.
    pub fn extent_after(&self) -> f64 {
        (self.max_scroll_extent - self.pixels).max(0.0)
    }

    pub fn out_of_range(&self) -> bool {
        self.pixels < self.min_scroll_extent || self.pixels > self.max_scroll_extent
    }

    pub fn at_edge(&self) -> bool {
        self.pixels == self.min_scroll_extent || self.pixels == self.max_scroll_extent
    }

    /// Applies a pointer scroll delta, clamped to the content dimensions,
    /// and notifies listeners if the pixel value moved.
    pub fn pointer_scroll(&mut self, delta: f64) {
        self.user_scroll_direction = if delta > 0.0 {
            ScrollDirection::Reverse
        } else if delta < 0.0 {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Idle
        };

        let target = (self.pixels + delta).clamp(self.min_scroll_extent, self.max_scroll_extent);
        if target != self.pixels {
            self.pixels = target;
            self.notify_listeners();
        }
    }

    /// Jumps straight to `pixels`, without clamping, and notifies listeners.
    pub fn jump_to(&mut self, pixels: f64) {
        self.user_scroll_direction = ScrollDirection::Idle;
        if pixels != self.pixels {
            self.pixels = pixels;
            self.notify_listeners();
        }
    }

    fn notify_listeners(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }
    }
}

impl ViewportOffset for ScrollPosition {
    fn pixels(&self) -> f64 {
        self.pixels
    }

    fn user_scroll_direction(&self) -> ScrollDirection {
        self.user_scroll_direction
    }

    fn apply_viewport_dimension(&mut self, viewport_dimension: f64) -> bool {
        self.viewport_dimension = viewport_dimension;
        true
    }

    fn apply_content_dimensions(&mut self, min_scroll_extent: f64, max_scroll_extent: f64) -> bool {
        self.min_scroll_extent = min_scroll_extent;
        self.max_scroll_extent = max_scroll_extent;
        if self.pixels < min_scroll_extent || self.pixels > max_scroll_extent {
            self.pixels = self.pixels.clamp(min_scroll_extent, max_scroll_extent);
            self.notify_listeners();
            return false;
        }
        true
    }

    fn correct_by(&mut self, correction: f64) {
        self.pixels += correction;
    }

    fn add_listener(&mut self, listener: Box<dyn FnMut()>) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}
