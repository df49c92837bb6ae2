use std::any::Any;

use kurbo::Rect;

/// The narrow painting interface a viewport drives.
///
/// The viewport itself only needs save/restore and rectangular clipping;
/// slivers that draw actual content can recover their concrete backend
/// through [`RenderBackend::as_any`].
pub trait RenderBackend {
    fn save(&mut self);
    fn restore(&mut self);
    fn clip_rect(&mut self, rect: Rect);
    fn as_any(&mut self) -> &mut dyn Any;
}

/// Paint pass state handed down the tree.
pub struct PaintCtx<'a> {
    pub render_ctx: &'a mut dyn RenderBackend,
}

impl<'a> PaintCtx<'a> {
    pub fn new(render_ctx: &'a mut dyn RenderBackend) -> Self {
        PaintCtx { render_ctx }
    }

    /// Runs `f` between a save/restore pair so that clips and transforms it
    /// pushes do not leak into later painting.
    pub fn with_save(&mut self, f: impl FnOnce(&mut Self)) {
        self.render_ctx.save();
        f(self);
        self.render_ctx.restore();
    }
}
